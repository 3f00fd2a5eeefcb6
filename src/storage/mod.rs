//! Storage module for the raw corpus
//!
//! This module owns everything that touches disk: raw artifact files,
//! per-host crawl logs, and the manifest's record shapes.

mod log;
mod raw_store;
mod records;

pub use log::{parse_records, read_log, split_lines};
pub use raw_store::{append_jsonl, normalize_path, RawStore, MANIFEST_FILE};
pub use records::{ArtifactKind, ManifestRecord, RawLogRecord};

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Hex-encoded SHA-256 of `bytes`; the content address of an artifact
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
