//! URL handling module for corpus-ingest
//!
//! This module provides URL normalization, host keys, target scope checks,
//! and the URL-to-filename mapping used by the raw store.

mod domain;
mod filename;
mod normalize;
mod scope;

pub use domain::host_key;
pub use filename::safe_filename_from_url;
pub use normalize::{normalize_url, resolve_and_normalize};
pub use scope::{is_allowed_path, looks_like_pdf, TargetScope};
