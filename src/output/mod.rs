//! Output module for run summaries and store statistics
//!
//! This module handles:
//! - The per-stage stats structs returned by the pipeline
//! - Printing a summary at the end of a run
//! - Reading statistics back from the raw store

pub mod stats;

pub use stats::{
    load_statistics, print_pipeline_summary, print_statistics, CatalogStats, CrawlStats,
    HarvestStats, HostLogStatistics, PipelineStats, SkipTally, StoreStatistics,
};
