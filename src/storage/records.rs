//! JSONL record shapes shared with downstream stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of raw artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Html,
    Pdf,
}

impl ArtifactKind {
    /// Extension appended to derived file names that lack one
    pub fn extension_hint(&self) -> &'static str {
        match self {
            Self::Html => ".html",
            Self::Pdf => ".pdf",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of a saved artifact, appended to `<host>.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLogRecord {
    #[serde(rename = "type")]
    pub kind: ArtifactKind,

    /// URL the artifact was requested from
    pub url: String,

    /// Path of the raw file as written
    pub path: String,

    /// Hex SHA-256 of the response body
    pub sha256: String,

    #[serde(alias = "status")]
    pub http_status: u16,

    pub content_type: String,

    /// Unix seconds
    pub fetched_at: i64,

    /// Link depth from the target's start URLs (HTML only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

/// One deduplicated entry of `manifest.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub kind: ArtifactKind,

    /// Lexically normalized raw file path
    pub path: String,

    pub sha256: String,

    /// Unix seconds when this catalog run observed the file
    pub seen_at: i64,

    pub size_bytes: u64,

    /// File modification time, unix seconds
    pub mtime: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// Provenance id, `<host-log-filename>:<line-number>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<String>,
}
