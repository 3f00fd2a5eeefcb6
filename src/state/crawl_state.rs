use std::collections::HashSet;
use url::Url;

/// Per-target traversal state
///
/// Owned by a single frontier run and dropped when it ends; nothing here is
/// persisted, so a later run starts with an empty visited set.
#[derive(Debug, Default)]
pub struct CrawlState {
    /// Normalized URLs dequeued during this run
    visited: HashSet<String>,

    /// Pages saved during this run
    saved: u32,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Marks `url` visited; returns `false` if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    pub fn record_saved(&mut self) {
        self.saved += 1;
    }

    pub fn saved(&self) -> u32 {
        self.saved
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
