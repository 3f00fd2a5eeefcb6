//! Breadth-first HTML crawl of one target
//!
//! Each dequeued URL passes, in order: the scope check, the robots check, the
//! politeness wait, the fetch, and the HTML check. Pages that get through are
//! written to the raw store (never overwriting) and logged to `<host>.jsonl`.

use crate::config::{CrawlerConfig, TargetConfig};
use crate::crawler::scheduler::{QueuedUrl, Scheduler};
use crate::crawler::{extract_links, Transport};
use crate::output::CrawlStats;
use crate::robots::PolitenessGate;
use crate::state::SkipReason;
use crate::storage::{sha256_hex, ArtifactKind, RawLogRecord, RawStore};
use crate::url::{normalize_url, safe_filename_from_url, TargetScope};
use crate::{Result, UrlError};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Saved pages between progress log lines
const PROGRESS_INTERVAL: u32 = 10;

/// What happened to one dequeued URL
#[derive(Debug)]
enum Visit {
    Saved { written: bool, links: Vec<Url> },
    Skipped(SkipReason),
    Cancelled,
}

/// Crawls targets through a shared transport, gate and store
pub struct HtmlCrawler<'a> {
    transport: &'a dyn Transport,
    gate: &'a PolitenessGate,
    store: &'a RawStore,
    max_depth: u32,
    max_pages: u32,
    cancel: &'a CancellationToken,
}

impl<'a> HtmlCrawler<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        gate: &'a PolitenessGate,
        store: &'a RawStore,
        config: &CrawlerConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            transport,
            gate,
            store,
            max_depth: config.max_depth,
            max_pages: config.max_pages,
            cancel,
        }
    }

    /// Runs one full traversal of a target
    ///
    /// Visited URLs and the page budget are local to this call; a second
    /// call for the same target starts fresh.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - The traversal ended normally or was cancelled
    /// * `Err(IngestError)` - The target base is unusable or the store failed
    pub async fn crawl_target(&self, target: &TargetConfig) -> Result<CrawlStats> {
        let base = Url::parse(&target.base)?;
        let scope = TargetScope::new(&base, &target.allow_paths);
        let host = scope.host().ok_or(UrlError::MissingHost)?.to_string();

        let mut scheduler = Scheduler::new(self.max_pages);
        for start in &target.start_urls {
            match normalize_url(start) {
                Ok(url) => scheduler.seed(url),
                Err(e) => tracing::warn!("Ignoring start URL {}: {}", start, e),
            }
        }

        let mut stats = CrawlStats {
            targets: 1,
            ..Default::default()
        };

        tracing::info!(
            "Crawling {} (paths {:?}, max depth {}, max pages {})",
            host,
            target.allow_paths,
            self.max_depth,
            self.max_pages
        );

        loop {
            if self.cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }

            let Some(queued) = scheduler.next_url() else {
                break;
            };

            match self.visit(&scope, &host, &queued).await? {
                Visit::Saved { written, links } => {
                    for link in links {
                        if scope.admits(&link) && scheduler.enqueue(link, queued.depth + 1) {
                            stats.links_enqueued += 1;
                        }
                    }

                    scheduler.record_saved();
                    stats.pages_saved += 1;
                    if written {
                        stats.files_written += 1;
                    }

                    if stats.pages_saved % PROGRESS_INTERVAL == 0 {
                        tracing::info!(
                            "{}: {} pages saved, {} queued",
                            host,
                            stats.pages_saved,
                            scheduler.frontier_size()
                        );
                    }
                }
                Visit::Skipped(reason) => {
                    tracing::debug!("Skipped {} ({})", queued.url, reason);
                    stats.skipped.record(reason);
                }
                Visit::Cancelled => {
                    stats.cancelled = true;
                    break;
                }
            }
        }

        if scheduler.budget_exhausted() {
            tracing::info!("{}: page budget of {} reached", host, self.max_pages);
        }
        tracing::info!(
            "Finished {}: {} pages saved, {} new files, {} skipped",
            host,
            stats.pages_saved,
            stats.files_written,
            stats.skipped.total()
        );

        Ok(stats)
    }

    async fn visit(&self, scope: &TargetScope, host: &str, queued: &QueuedUrl) -> Result<Visit> {
        let url = &queued.url;

        if !scope.admits(url) {
            return Ok(Visit::Skipped(SkipReason::OutOfScope));
        }

        if !self.gate.can_fetch(self.transport, url).await {
            return Ok(Visit::Skipped(SkipReason::RobotsDisallowed));
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(Visit::Cancelled),
            _ = self.gate.wait() => {}
        }

        let Some(response) = self.transport.get(url).await else {
            return Ok(Visit::Skipped(SkipReason::FetchFailed));
        };
        if !response.is_ok() {
            return Ok(Visit::Skipped(SkipReason::HttpStatus));
        }
        if !response.looks_like_html() {
            return Ok(Visit::Skipped(SkipReason::ContentMismatch));
        }

        let kind = ArtifactKind::Html;
        let path = self
            .store
            .artifact_path(kind, &safe_filename_from_url(url, kind.extension_hint()));
        let written = self.store.write_if_absent(&path, &response.body)?;

        let record = RawLogRecord {
            kind,
            url: url.to_string(),
            path: path.to_string_lossy().into_owned(),
            sha256: sha256_hex(&response.body),
            http_status: response.status,
            content_type: response.content_type.clone(),
            fetched_at: chrono::Utc::now().timestamp(),
            depth: Some(queued.depth),
        };
        self.store.append_log(host, &record)?;

        let links = if queued.depth < self.max_depth {
            extract_links(&response.text(), url)
        } else {
            Vec::new()
        };

        Ok(Visit::Saved { written, links })
    }
}
