//! Robots.txt caching implementation
//!
//! Each origin's robots.txt is fetched at most once per process. Concurrent
//! callers for the same origin wait on the first fetch instead of issuing
//! their own.

use crate::robots::ParsedRobots;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Arc<ParsedRobots>>>;

/// Process-lifetime robots.txt cache keyed by origin
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, Slot>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached rules for `origin`, running `fetch` on first use
    pub async fn get_or_fetch<F, Fut>(&self, origin: &str, fetch: F) -> Arc<ParsedRobots>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ParsedRobots>,
    {
        let slot = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.entry(origin.to_string()).or_default().clone()
        };

        slot.get_or_init(|| async move { Arc::new(fetch().await) })
            .await
            .clone()
    }

    /// Rules already loaded for `origin`, if any
    pub fn get(&self, origin: &str) -> Option<Arc<ParsedRobots>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(origin).and_then(|slot| slot.get().cloned())
    }

    /// Number of origins with loaded rules
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
