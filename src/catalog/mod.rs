//! Raw cataloger
//!
//! Rebuilds `manifest.jsonl` from scratch: folds every host log into a
//! provenance map, hashes every raw file, and writes one record per distinct
//! content hash.

mod fold;

pub use fold::{
    build_manifest, fold_provenance, ArtifactSnapshot, Duplicate, ManifestBuild, Provenance,
};

use crate::output::CatalogStats;
use crate::storage::{read_log, ArtifactKind, RawStore, StorageResult};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Rebuilds the manifest of a raw store
pub struct Cataloger<'a> {
    store: &'a RawStore,
}

impl<'a> Cataloger<'a> {
    pub fn new(store: &'a RawStore) -> Self {
        Self { store }
    }

    /// Deletes and regenerates `manifest.jsonl`
    ///
    /// Missing directories and logs yield an empty manifest. Unreadable logs
    /// and unreadable raw files are logged and left out.
    ///
    /// # Returns
    ///
    /// * `Ok(CatalogStats)` - The manifest was written
    /// * `Err(StorageError)` - A directory could not be listed or the
    ///   manifest could not be written
    pub fn rebuild(&self) -> StorageResult<CatalogStats> {
        let manifest_path = self.store.manifest_path();
        match fs::remove_file(&manifest_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let provenance = self.load_provenance()?;

        let mut stats = CatalogStats::default();
        let mut snapshots = Vec::new();
        for kind in [ArtifactKind::Html, ArtifactKind::Pdf] {
            for path in self.store.list_artifacts(kind)? {
                stats.files_scanned += 1;
                match snapshot(kind, &path) {
                    Ok(snapshot) => snapshots.push(snapshot),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable {}: {}", path.display(), e);
                        stats.unreadable += 1;
                    }
                }
            }
        }

        let seen_at = chrono::Utc::now().timestamp();
        let build = build_manifest(snapshots, &provenance, seen_at);
        for duplicate in &build.duplicates {
            tracing::debug!(
                "{} duplicates {}",
                duplicate.path.display(),
                duplicate.duplicate_of.display()
            );
        }

        fs::create_dir_all(self.store.meta_dir())?;
        let mut writer = BufWriter::new(File::create(&manifest_path)?);
        for record in &build.records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        stats.records = build.records.len();
        stats.duplicates = build.duplicates.len();
        stats.with_provenance = build
            .records
            .iter()
            .filter(|r| r.source_url.is_some())
            .count();

        tracing::info!(
            "Manifest written to {} with {} records ({} duplicates dropped)",
            manifest_path.display(),
            stats.records,
            stats.duplicates
        );
        Ok(stats)
    }

    fn load_provenance(&self) -> StorageResult<HashMap<PathBuf, Provenance>> {
        let mut logs = Vec::new();
        for path in self.store.host_logs()? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match read_log(&path) {
                Ok(content) => logs.push((name, content)),
                Err(e) => tracing::warn!("Skipping unreadable log {}: {}", path.display(), e),
            }
        }

        Ok(fold_provenance(
            logs.iter().map(|(name, content)| (name.as_str(), content.as_str())),
        ))
    }
}

/// Hashes and stats one raw file
fn snapshot(kind: ArtifactKind, path: &Path) -> io::Result<ArtifactSnapshot> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;

    let metadata = file.metadata()?;
    let mtime = metadata
        .modified()
        .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp())
        .unwrap_or(0);

    Ok(ArtifactSnapshot {
        kind,
        path: path.to_path_buf(),
        sha256: hex::encode(hasher.finalize()),
        size_bytes: metadata.len(),
        mtime,
    })
}
