//! Crawler module for fetching and harvesting documents
//!
//! This module contains the network-facing stages, including:
//! - The `Transport` capability and its HTTP implementation
//! - HTML link extraction
//! - The breadth-first frontier and its scheduler
//! - PDF link harvesting
//! - Overall pipeline coordination

mod coordinator;
mod fetcher;
mod frontier;
mod harvester;
mod parser;
mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{run_pipeline, Coordinator, Stage};
pub use fetcher::{build_http_client, fetch_url, FetchedResponse, HttpFetcher, Transport};
pub use frontier::HtmlCrawler;
pub use harvester::{is_allowed_by_map, PdfHarvester};
pub use parser::extract_links;
pub use scheduler::{QueuedUrl, Scheduler};
