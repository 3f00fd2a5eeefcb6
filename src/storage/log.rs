//! Reading append-only JSONL logs

use crate::storage::StorageResult;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::Path;

/// Reads a whole log file as text
///
/// A missing file reads as empty; invalid UTF-8 is replaced, not rejected.
pub fn read_log(path: &Path) -> StorageResult<String> {
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Splits log text into numbered non-blank lines, 1-based
///
/// Blank lines are dropped but still counted, so line numbers match what an
/// editor shows.
pub fn split_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parses numbered lines into records, skipping any that do not deserialize
pub fn parse_records<'a, T, I>(source: &'a str, lines: I) -> impl Iterator<Item = (usize, T)> + 'a
where
    T: DeserializeOwned + 'a,
    I: IntoIterator<Item = (usize, &'a str)>,
    I::IntoIter: 'a,
{
    lines
        .into_iter()
        .filter_map(move |(n, line)| match serde_json::from_str::<T>(line) {
            Ok(record) => Some((n, record)),
            Err(e) => {
                tracing::debug!("Skipping malformed line {}:{}: {}", source, n, e);
                None
            }
        })
}
