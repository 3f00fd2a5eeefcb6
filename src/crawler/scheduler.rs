//! Scheduler for managing the crawl frontier
//!
//! This module handles:
//! - FIFO (breadth-first) ordering of URLs to crawl
//! - The visited set guarding against revisits within a run
//! - The saved-page budget

use crate::state::CrawlState;
use std::collections::VecDeque;
use url::Url;

/// A URL queued for fetching with its link depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The normalized URL to fetch
    pub url: Url,

    /// Link distance from the target's start URLs
    pub depth: u32,
}

/// Scheduler manages the frontier queue for one target traversal
///
/// Entries leave the queue exactly once. A URL is marked visited the moment
/// it is dequeued, before any network I/O, so a URL enqueued twice (from two
/// different pages) is processed only once.
#[derive(Debug)]
pub struct Scheduler {
    /// Pending URLs in discovery order
    frontier: VecDeque<QueuedUrl>,

    state: CrawlState,

    /// Maximum number of saved pages
    max_pages: u32,
}

impl Scheduler {
    pub fn new(max_pages: u32) -> Self {
        Self {
            frontier: VecDeque::new(),
            state: CrawlState::new(),
            max_pages,
        }
    }

    /// Adds a start URL at depth 0
    pub fn seed(&mut self, url: Url) {
        self.frontier.push_back(QueuedUrl { url, depth: 0 });
    }

    /// Gets the next URL to process
    ///
    /// # Returns
    ///
    /// * `Some(QueuedUrl)` - An unvisited URL, now marked visited
    /// * `None` - The frontier is empty or the page budget is spent
    pub fn next_url(&mut self) -> Option<QueuedUrl> {
        while !self.budget_exhausted() {
            let queued = self.frontier.pop_front()?;
            if self.state.mark_visited(&queued.url) {
                return Some(queued);
            }
            tracing::trace!("Skipping already visited {}", queued.url);
        }
        None
    }

    /// Enqueues a discovered URL unless it was already visited
    ///
    /// # Returns
    ///
    /// `true` if the URL was added to the frontier
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        if self.state.is_visited(&url) {
            return false;
        }
        self.frontier.push_back(QueuedUrl { url, depth });
        true
    }

    /// Counts one saved page against the budget
    pub fn record_saved(&mut self) {
        self.state.record_saved();
    }

    pub fn budget_exhausted(&self) -> bool {
        self.state.saved() >= self.max_pages
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }
}
