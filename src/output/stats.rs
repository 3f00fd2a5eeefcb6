//! Run statistics and raw store statistics
//!
//! Each stage reports a stats struct; the coordinator aggregates them into
//! [`PipelineStats`]. [`load_statistics`] reads the raw store from disk for
//! the `--stats` command.

use crate::state::SkipReason;
use crate::storage::{
    parse_records, read_log, split_lines, ArtifactKind, ManifestRecord, RawLogRecord, RawStore,
    StorageResult,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-reason tally of skipped URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipTally(BTreeMap<SkipReason, u32>);

impl SkipTally {
    pub fn record(&mut self, reason: SkipReason) {
        *self.0.entry(reason).or_insert(0) += 1;
    }

    pub fn get(&self, reason: SkipReason) -> u32 {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn merge(&mut self, other: &SkipTally) {
        for (reason, count) in &other.0 {
            *self.0.entry(*reason).or_insert(0) += count;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkipReason, u32)> + '_ {
        self.0.iter().map(|(reason, count)| (*reason, *count))
    }
}

/// Outcome of the HTML crawl stage
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// Targets traversed (fully or until cancelled)
    pub targets: usize,

    /// Pages that produced a log record
    pub pages_saved: u32,

    /// Raw files newly created; re-crawled pages leave existing files alone
    pub files_written: u32,

    pub links_enqueued: u32,

    pub skipped: SkipTally,

    pub cancelled: bool,
}

impl CrawlStats {
    pub fn merge(&mut self, other: &CrawlStats) {
        self.targets += other.targets;
        self.pages_saved += other.pages_saved;
        self.files_written += other.files_written;
        self.links_enqueued += other.links_enqueued;
        self.skipped.merge(&other.skipped);
        self.cancelled |= other.cancelled;
    }
}

/// Outcome of the PDF harvest stage
#[derive(Debug, Clone, Default)]
pub struct HarvestStats {
    /// PDF links found in saved HTML pages
    pub discovered: usize,

    /// Distinct candidates after adding seeds
    pub candidates: usize,

    pub downloaded: u32,
    pub files_written: u32,
    pub skipped: SkipTally,
    pub cancelled: bool,
}

/// Outcome of a manifest rebuild
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub files_scanned: usize,

    /// Records written to the manifest
    pub records: usize,

    /// Files dropped because their content hash was already cataloged
    pub duplicates: usize,

    /// Files that could not be read and were left out
    pub unreadable: usize,

    /// Records carrying a source URL from the crawl logs
    pub with_provenance: usize,
}

/// Combined result of a pipeline invocation
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub crawl: Option<CrawlStats>,
    pub harvest: Option<HarvestStats>,
    pub catalog: Option<CatalogStats>,
    pub cancelled: bool,
}

/// Prints a pipeline summary to stdout
pub fn print_pipeline_summary(stats: &PipelineStats) {
    println!("=== Ingest Summary ===\n");

    if let Some(crawl) = &stats.crawl {
        println!("HTML crawl:");
        println!("  Targets: {}", crawl.targets);
        println!("  Pages saved: {}", crawl.pages_saved);
        println!("  New files: {}", crawl.files_written);
        println!("  Links enqueued: {}", crawl.links_enqueued);
        print_skips(&crawl.skipped);
        println!();
    }

    if let Some(harvest) = &stats.harvest {
        println!("PDF harvest:");
        println!("  Discovered links: {}", harvest.discovered);
        println!("  Candidates: {}", harvest.candidates);
        println!("  Downloaded: {}", harvest.downloaded);
        println!("  New files: {}", harvest.files_written);
        print_skips(&harvest.skipped);
        println!();
    }

    if let Some(catalog) = &stats.catalog {
        println!("Catalog:");
        println!("  Files scanned: {}", catalog.files_scanned);
        println!("  Manifest records: {}", catalog.records);
        println!("  Duplicates dropped: {}", catalog.duplicates);
        println!("  With provenance: {}", catalog.with_provenance);
        if catalog.unreadable > 0 {
            println!("  Unreadable: {}", catalog.unreadable);
        }
        println!();
    }

    if stats.cancelled {
        println!("Run was cancelled; later stages were skipped.");
    }
}

fn print_skips(skipped: &SkipTally) {
    if skipped.total() == 0 {
        return;
    }
    println!("  Skipped: {}", skipped.total());
    for (reason, count) in skipped.iter() {
        println!("    {}: {}", reason, count);
    }
}

/// Per-host record counts from `<host>.jsonl`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostLogStatistics {
    pub html_records: u64,
    pub pdf_records: u64,
}

/// Snapshot of the raw store on disk
#[derive(Debug, Clone, Default)]
pub struct StoreStatistics {
    /// Manifest records by kind
    pub manifest_by_kind: BTreeMap<ArtifactKind, u64>,

    /// Sum of `size_bytes` over the manifest
    pub total_bytes: u64,

    pub with_provenance: u64,

    /// Keyed by log file stem (the host key)
    pub hosts: BTreeMap<String, HostLogStatistics>,
}

impl StoreStatistics {
    pub fn manifest_records(&self) -> u64 {
        self.manifest_by_kind.values().sum()
    }
}

/// Loads statistics from the raw store
///
/// # Arguments
///
/// * `store` - The raw store to inspect
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Statistics; empty when nothing was crawled yet
/// * `Err(StorageError)` - A log or the manifest exists but could not be read
pub fn load_statistics(store: &RawStore) -> StorageResult<StoreStatistics> {
    let mut stats = StoreStatistics::default();

    let manifest_path = store.manifest_path();
    let manifest = read_log(&manifest_path)?;
    let manifest_label = file_label(&manifest_path);
    for (_, record) in parse_records::<ManifestRecord, _>(&manifest_label, split_lines(&manifest)) {
        *stats.manifest_by_kind.entry(record.kind).or_insert(0) += 1;
        stats.total_bytes += record.size_bytes;
        if record.source_url.is_some() {
            stats.with_provenance += 1;
        }
    }

    for log_path in store.host_logs()? {
        let content = read_log(&log_path)?;
        let label = file_label(&log_path);
        let host = log_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| label.clone());

        let entry = stats.hosts.entry(host).or_default();
        for (_, record) in parse_records::<RawLogRecord, _>(&label, split_lines(&content)) {
            match record.kind {
                ArtifactKind::Html => entry.html_records += 1,
                ArtifactKind::Pdf => entry.pdf_records += 1,
            }
        }
    }

    Ok(stats)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Prints store statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Raw Store Statistics ===\n");

    println!("Manifest:");
    println!("  Records: {}", stats.manifest_records());
    for (kind, count) in &stats.manifest_by_kind {
        println!("    {}: {}", kind, count);
    }
    println!("  Total bytes: {}", stats.total_bytes);
    println!("  With provenance: {}", stats.with_provenance);
    println!();

    if stats.hosts.is_empty() {
        println!("No host logs found.");
        return;
    }

    println!("Host logs ({}):", stats.hosts.len());
    for (host, counts) in &stats.hosts {
        println!(
            "  {}: {} html, {} pdf",
            host, counts.html_records, counts.pdf_records
        );
    }
}
