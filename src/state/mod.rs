//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: visited set and saved-page counter for one target traversal
//! - `SkipReason`: why a URL was dropped without being saved

mod crawl_state;
mod skip_reason;

// Re-export main types
pub use crawl_state::CrawlState;
pub use skip_reason::SkipReason;
