//! PDF link harvesting
//!
//! Discovery works from the crawl logs rather than the HTML directory: every
//! `html` record names both the saved file and the URL it came from, so
//! relative links resolve against the right page.

use crate::config::PdfConfig;
use crate::crawler::{extract_links, Transport};
use crate::output::HarvestStats;
use crate::robots::PolitenessGate;
use crate::state::SkipReason;
use crate::storage::{
    parse_records, read_log, sha256_hex, split_lines, ArtifactKind, RawLogRecord, RawStore,
};
use crate::url::{host_key, is_allowed_path, looks_like_pdf, normalize_url, safe_filename_from_url};
use crate::Result;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Debug)]
enum Download {
    Saved { written: bool },
    Skipped(SkipReason),
    Cancelled,
}

/// Finds PDF links in crawled pages and downloads the allowed ones
pub struct PdfHarvester<'a> {
    transport: &'a dyn Transport,
    gate: &'a PolitenessGate,
    store: &'a RawStore,
    config: &'a PdfConfig,
    cancel: &'a CancellationToken,
}

impl<'a> PdfHarvester<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        gate: &'a PolitenessGate,
        store: &'a RawStore,
        config: &'a PdfConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            transport,
            gate,
            store,
            config,
            cancel,
        }
    }

    /// Collects PDF-looking links from every saved HTML page in the logs
    ///
    /// Unreadable logs, log records whose file is gone, and records whose
    /// URL does not parse are skipped. A page logged more than once is read
    /// once.
    pub fn discover(&self) -> Result<BTreeSet<String>> {
        let mut found = BTreeSet::new();
        let mut seen_pages = HashSet::new();

        for log_path in self.store.host_logs()? {
            let content = match read_log(&log_path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping unreadable log {}: {}", log_path.display(), e);
                    continue;
                }
            };
            let label = log_path.display().to_string();

            for (line, record) in parse_records::<RawLogRecord, _>(&label, split_lines(&content)) {
                if record.kind != ArtifactKind::Html {
                    continue;
                }
                if !seen_pages.insert((record.path.clone(), record.url.clone())) {
                    continue;
                }

                let Ok(base) = Url::parse(&record.url) else {
                    tracing::debug!("Bad URL in {}:{}: {}", label, line, record.url);
                    continue;
                };
                let html = match fs::read(&record.path) {
                    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Err(e) => {
                        tracing::debug!("Cannot read {} from {}:{}: {}", record.path, label, line, e);
                        continue;
                    }
                };

                found.extend(
                    extract_links(&html, &base)
                        .into_iter()
                        .filter(looks_like_pdf)
                        .map(String::from),
                );
            }
        }

        Ok(found)
    }

    /// True when the URL's host is in the allow-map and its path is under
    /// one of that host's prefixes
    pub fn is_allowed(&self, url: &Url) -> bool {
        is_allowed_by_map(&self.config.allow, url)
    }

    /// Discovers, filters and downloads PDFs
    ///
    /// Candidates (discovered links plus configured seeds) are processed in
    /// sorted order, each at most once.
    pub async fn run(&self) -> Result<HarvestStats> {
        let discovered = self.discover()?;
        let mut stats = HarvestStats {
            discovered: discovered.len(),
            ..Default::default()
        };

        let mut candidates = discovered;
        for seed in &self.config.seeds {
            match normalize_url(seed) {
                Ok(url) => {
                    candidates.insert(url.into());
                }
                Err(e) => tracing::warn!("Ignoring PDF seed {}: {}", seed, e),
            }
        }
        stats.candidates = candidates.len();
        tracing::info!("Found {} candidate PDF links", stats.candidates);

        for candidate in &candidates {
            if self.cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }

            let Ok(url) = Url::parse(candidate) else {
                stats.skipped.record(SkipReason::OutOfScope);
                continue;
            };

            match self.download(&url).await? {
                Download::Saved { written } => {
                    stats.downloaded += 1;
                    if written {
                        stats.files_written += 1;
                    }
                }
                Download::Skipped(reason) => {
                    tracing::debug!("Skipped {} ({})", url, reason);
                    stats.skipped.record(reason);
                }
                Download::Cancelled => {
                    stats.cancelled = true;
                    break;
                }
            }
        }

        tracing::info!(
            "PDF collection complete: {} downloaded, {} new files, {} skipped",
            stats.downloaded,
            stats.files_written,
            stats.skipped.total()
        );
        Ok(stats)
    }

    async fn download(&self, url: &Url) -> Result<Download> {
        let Some(host) = host_key(url) else {
            return Ok(Download::Skipped(SkipReason::OutOfScope));
        };
        if !self.is_allowed(url) {
            return Ok(Download::Skipped(SkipReason::OutOfScope));
        }

        if !self.gate.can_fetch(self.transport, url).await {
            return Ok(Download::Skipped(SkipReason::RobotsDisallowed));
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(Download::Cancelled),
            _ = self.gate.wait() => {}
        }

        let Some(response) = self.transport.get(url).await else {
            return Ok(Download::Skipped(SkipReason::FetchFailed));
        };
        if !response.is_ok() {
            return Ok(Download::Skipped(SkipReason::HttpStatus));
        }
        if !response.is_pdf_content_type() && !looks_like_pdf(url) {
            return Ok(Download::Skipped(SkipReason::ContentMismatch));
        }

        let kind = ArtifactKind::Pdf;
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
            depth: None,
        };
        self.store.append_log(&host, &record)?;

        Ok(Download::Saved { written })
    }
}

/// Allow-map check shared by discovery results and seeds
pub fn is_allowed_by_map(allow: &BTreeMap<String, Vec<String>>, url: &Url) -> bool {
    let Some(host) = host_key(url) else {
        return false;
    };
    match allow.get(&host) {
        Some(prefixes) if !prefixes.is_empty() => is_allowed_path(url, prefixes),
        _ => false,
    }
}
