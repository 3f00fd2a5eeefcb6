//! Filesystem-backed raw store
//!
//! Layout:
//!
//! ```text
//! <html-dir>/<safe-name>.html
//! <pdf-dir>/<safe-name>.pdf
//! <meta-dir>/<host>.jsonl      append-only crawl log per host
//! <meta-dir>/manifest.jsonl    rebuilt by the cataloger
//! ```

use crate::config::StorageConfig;
use crate::storage::{ArtifactKind, StorageResult};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// File name of the consolidated manifest inside the metadata directory
pub const MANIFEST_FILE: &str = "manifest.jsonl";

const LOG_EXTENSION: &str = "jsonl";

/// Raw store rooted at three directories
#[derive(Debug, Clone)]
pub struct RawStore {
    html_dir: PathBuf,
    pdf_dir: PathBuf,
    meta_dir: PathBuf,
}

impl RawStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self::from_dirs(&config.html_dir, &config.pdf_dir, &config.meta_dir)
    }

    pub fn from_dirs(html_dir: &Path, pdf_dir: &Path, meta_dir: &Path) -> Self {
        Self {
            html_dir: html_dir.to_path_buf(),
            pdf_dir: pdf_dir.to_path_buf(),
            meta_dir: meta_dir.to_path_buf(),
        }
    }

    /// Store rooted at `root/{html,pdfs,metadata}`
    pub fn under(root: &Path) -> Self {
        Self::from_dirs(&root.join("html"), &root.join("pdfs"), &root.join("metadata"))
    }

    /// Creates all store directories
    pub fn ensure_dirs(&self) -> StorageResult<()> {
        for dir in [&self.html_dir, &self.pdf_dir, &self.meta_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn dir_for(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Html => &self.html_dir,
            ArtifactKind::Pdf => &self.pdf_dir,
        }
    }

    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    /// Where an artifact with the given derived file name lives
    pub fn artifact_path(&self, kind: ArtifactKind, file_name: &str) -> PathBuf {
        self.dir_for(kind).join(file_name)
    }

    /// Writes `body` to `path` unless a file is already there
    ///
    /// Returns `true` when the file was created by this call.
    pub fn write_if_absent(&self, path: &Path, body: &[u8]) -> StorageResult<bool> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(body).and_then(|_| file.sync_data()) {
            // Never leave a truncated artifact behind; the next run retries it
            drop(file);
            let _ = fs::remove_file(path);
            return Err(e.into());
        }

        Ok(true)
    }

    /// Path of the crawl log for a host key
    pub fn host_log_path(&self, host: &str) -> PathBuf {
        self.meta_dir.join(format!("{}.{}", host, LOG_EXTENSION))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.meta_dir.join(MANIFEST_FILE)
    }

    /// Appends one JSON line to the host's crawl log
    pub fn append_log<T: Serialize>(&self, host: &str, record: &T) -> StorageResult<()> {
        append_jsonl(&self.host_log_path(host), record)
    }

    /// All per-host crawl logs, sorted by file name, excluding the manifest
    ///
    /// A missing metadata directory yields an empty list.
    pub fn host_logs(&self) -> StorageResult<Vec<PathBuf>> {
        let mut logs: Vec<PathBuf> = list_files(&self.meta_dir)?
            .into_iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == LOG_EXTENSION))
            .filter(|p| p.file_name().is_some_and(|name| name != MANIFEST_FILE))
            .collect();
        logs.sort();
        Ok(logs)
    }

    /// All regular files of one artifact kind, sorted by file name
    ///
    /// A missing directory yields an empty list.
    pub fn list_artifacts(&self, kind: ArtifactKind) -> StorageResult<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = list_files(self.dir_for(kind))?
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !n.starts_with('.'))
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

/// Appends `record` as one JSON line, creating the file and its parent if needed
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');

    // A single write keeps each line intact for concurrent appenders
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(&line)?;
    Ok(())
}

/// Lexically normalizes a path: drops `.` components and folds `..` into
/// the preceding component, without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

fn list_files(dir: &Path) -> StorageResult<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}
