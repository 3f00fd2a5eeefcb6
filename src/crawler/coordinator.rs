//! Pipeline coordinator - stage orchestration
//!
//! This module ties the stages together:
//! - Building the transport, politeness gate and raw store from config
//! - Running the HTML crawl per target (sequentially or grouped by host)
//! - Running the PDF harvest and the catalog rebuild
//! - Stopping cleanly when the cancellation token fires

use crate::catalog::Cataloger;
use crate::config::{Config, TargetConfig};
use crate::crawler::frontier::HtmlCrawler;
use crate::crawler::harvester::PdfHarvester;
use crate::crawler::{HttpFetcher, Transport};
use crate::output::{CatalogStats, CrawlStats, HarvestStats, PipelineStats};
use crate::robots::PolitenessGate;
use crate::storage::RawStore;
use crate::url::host_key;
use crate::Result;
use clap::ValueEnum;
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Which part of the pipeline to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Stage {
    /// Crawl, then harvest PDFs, then rebuild the manifest
    #[default]
    All,
    /// HTML crawl only
    Crawl,
    /// PDF harvest only
    Pdfs,
    /// Manifest rebuild only
    Catalog,
}

impl Stage {
    fn runs_crawl(self) -> bool {
        matches!(self, Self::All | Self::Crawl)
    }

    fn runs_pdfs(self) -> bool {
        matches!(self, Self::All | Self::Pdfs)
    }

    fn runs_catalog(self) -> bool {
        matches!(self, Self::All | Self::Catalog)
    }
}

/// Main pipeline coordinator structure
pub struct Coordinator {
    config: Config,
    transport: Arc<dyn Transport>,
    gate: PolitenessGate,
    store: RawStore,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(IngestError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.crawler)?;
        Ok(Self::with_transport(config, Arc::new(fetcher)))
    }

    /// Creates a coordinator over any transport
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        let gate = PolitenessGate::new(&config.crawler);
        let store = RawStore::new(&config.storage);
        Self {
            config,
            transport,
            gate,
            store,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token, e.g. with one wired to Ctrl-C
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn store(&self) -> &RawStore {
        &self.store
    }

    /// Runs the selected stages in order
    ///
    /// Once a stage observes cancellation, later stages are skipped.
    pub async fn run(&self, stage: Stage) -> Result<PipelineStats> {
        self.store.ensure_dirs()?;
        let mut stats = PipelineStats::default();

        if stage.runs_crawl() {
            let crawl = self.crawl_html().await?;
            stats.cancelled |= crawl.cancelled;
            stats.crawl = Some(crawl);
        }

        if stage.runs_pdfs() && !self.stopped(&stats) {
            let harvest = self.harvest_pdfs().await?;
            stats.cancelled |= harvest.cancelled;
            stats.harvest = Some(harvest);
        }

        if stage.runs_catalog() && !self.stopped(&stats) {
            stats.catalog = Some(self.build_manifest()?);
        }

        if stats.cancelled {
            tracing::warn!("Run cancelled; remaining stages skipped");
        }
        Ok(stats)
    }

    fn stopped(&self, stats: &PipelineStats) -> bool {
        stats.cancelled || self.cancel.is_cancelled()
    }

    /// Crawls every configured target
    ///
    /// Targets run in configured order. With `parallel-targets`, targets are
    /// grouped by host and the groups run concurrently; each group still
    /// walks its targets one at a time.
    pub async fn crawl_html(&self) -> Result<CrawlStats> {
        tracing::info!("Starting HTML crawl of {} targets", self.config.targets.len());
        let crawler = HtmlCrawler::new(
            self.transport.as_ref(),
            &self.gate,
            &self.store,
            &self.config.crawler,
            &self.cancel,
        );

        let mut stats = CrawlStats::default();
        if self.config.crawler.parallel_targets {
            let groups = group_by_host(&self.config.targets)?;
            tracing::info!("Crawling {} host groups concurrently", groups.len());

            let results = join_all(
                groups
                    .iter()
                    .map(|group| self.crawl_sequential(&crawler, group)),
            )
            .await;
            for result in results {
                stats.merge(&result?);
            }
        } else {
            let targets: Vec<&TargetConfig> = self.config.targets.iter().collect();
            stats = self.crawl_sequential(&crawler, &targets).await?;
        }

        tracing::info!(
            "HTML crawl complete: {} pages saved across {} targets",
            stats.pages_saved,
            stats.targets
        );
        Ok(stats)
    }

    async fn crawl_sequential(
        &self,
        crawler: &HtmlCrawler<'_>,
        targets: &[&TargetConfig],
    ) -> Result<CrawlStats> {
        let mut stats = CrawlStats::default();
        for target in targets {
            if self.cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }
            stats.merge(&crawler.crawl_target(target).await?);
        }
        Ok(stats)
    }

    /// Harvests PDFs linked from crawled pages plus configured seeds
    pub async fn harvest_pdfs(&self) -> Result<HarvestStats> {
        tracing::info!("Starting PDF harvest");
        PdfHarvester::new(
            self.transport.as_ref(),
            &self.gate,
            &self.store,
            &self.config.pdf,
            &self.cancel,
        )
        .run()
        .await
    }

    /// Rebuilds `manifest.jsonl` from the raw store
    pub fn build_manifest(&self) -> Result<CatalogStats> {
        tracing::info!("Rebuilding manifest");
        Ok(Cataloger::new(&self.store).rebuild()?)
    }
}

/// Groups targets by base host, keeping first-appearance order
fn group_by_host(targets: &[TargetConfig]) -> Result<Vec<Vec<&TargetConfig>>> {
    let mut groups: Vec<(String, Vec<&TargetConfig>)> = Vec::new();
    for target in targets {
        let host = host_key(&Url::parse(&target.base)?).unwrap_or_default();
        match groups.iter_mut().find(|(h, _)| *h == host) {
            Some((_, group)) => group.push(target),
            None => groups.push((host, vec![target])),
        }
    }
    Ok(groups.into_iter().map(|(_, group)| group).collect())
}

/// Runs the pipeline over HTTP with the given cancellation token
///
/// This is the main entry point used by the binary.
pub async fn run_pipeline(
    config: Config,
    stage: Stage,
    cancel: CancellationToken,
) -> Result<PipelineStats> {
    Coordinator::new(config)?
        .with_cancellation(cancel)
        .run(stage)
        .await
}
