//! Pure provenance fold and manifest dedup
//!
//! Nothing here touches the filesystem; the cataloger feeds in log text and
//! file snapshots and writes out what comes back.

use crate::storage::{normalize_path, parse_records, split_lines, ArtifactKind, ManifestRecord};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where a raw file came from, per the crawl logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub source_url: Option<String>,

    /// `<host-log-filename>:<line-number>`
    pub raw_id: String,
}

/// The fields of a log line the fold reads; everything else is ignored
#[derive(Debug, Deserialize)]
struct ProvenanceLine {
    #[serde(default)]
    path: Option<String>,

    #[serde(default)]
    url: Option<String>,
}

/// Folds log lines into a path -> provenance map
///
/// `logs` yields `(log file name, log text)` pairs and should be in file-name
/// order. Later lines overwrite earlier ones for the same normalized path.
pub fn fold_provenance<'a, I>(logs: I) -> HashMap<PathBuf, Provenance>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut provenance = HashMap::new();

    for (log_name, content) in logs {
        for (line, record) in parse_records::<ProvenanceLine, _>(log_name, split_lines(content)) {
            let Some(path) = record.path.filter(|p| !p.is_empty()) else {
                continue;
            };
            provenance.insert(
                normalize_path(Path::new(&path)),
                Provenance {
                    source_url: record.url,
                    raw_id: format!("{}:{}", log_name, line),
                },
            );
        }
    }

    provenance
}

/// A raw file as observed on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSnapshot {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: u64,
    pub mtime: i64,
}

/// A file left out of the manifest because its content was already listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub path: PathBuf,
    pub duplicate_of: PathBuf,
}

#[derive(Debug, Default)]
pub struct ManifestBuild {
    pub records: Vec<ManifestRecord>,
    pub duplicates: Vec<Duplicate>,
}

/// Turns snapshots into manifest records, keeping the first file per hash
///
/// Snapshots must arrive in catalog order (HTML store sorted by name, then
/// PDF store sorted by name) for the surviving path to be deterministic.
pub fn build_manifest<I>(
    snapshots: I,
    provenance: &HashMap<PathBuf, Provenance>,
    seen_at: i64,
) -> ManifestBuild
where
    I: IntoIterator<Item = ArtifactSnapshot>,
{
    let mut build = ManifestBuild::default();
    let mut first_path: HashMap<String, PathBuf> = HashMap::new();

    for snapshot in snapshots {
        let path = normalize_path(&snapshot.path);

        if let Some(first) = first_path.get(&snapshot.sha256) {
            build.duplicates.push(Duplicate {
                path,
                duplicate_of: first.clone(),
            });
            continue;
        }
        first_path.insert(snapshot.sha256.clone(), path.clone());

        let origin = provenance.get(&path);
        build.records.push(ManifestRecord {
            kind: snapshot.kind,
            path: path.to_string_lossy().into_owned(),
            sha256: snapshot.sha256,
            seen_at,
            size_bytes: snapshot.size_bytes,
            mtime: snapshot.mtime,
            source_url: origin.and_then(|p| p.source_url.clone()),
            raw_id: origin.map(|p| p.raw_id.clone()),
        });
    }

    build
}
