use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for an ingestion run
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Sites to crawl, in the order they are processed
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetConfig>,

    #[serde(default)]
    pub pdf: PdfConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Fixed delay before every fetch attempt (seconds)
    #[serde(rename = "throttle-seconds", default = "default_throttle_seconds")]
    pub throttle_seconds: f64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Maximum link depth followed from the start URLs
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages saved per target
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Crawl targets on distinct hosts concurrently
    #[serde(rename = "parallel-targets", default)]
    pub parallel_targets: bool,
}

impl CrawlerConfig {
    /// The politeness delay; out-of-range values saturate instead of panicking
    pub fn throttle(&self) -> Duration {
        Duration::try_from_secs_f64(self.throttle_seconds.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            throttle_seconds: default_throttle_seconds(),
            request_timeout: default_request_timeout(),
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            parallel_targets: false,
        }
    }
}

/// Raw store layout
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(rename = "html-dir", default = "default_html_dir")]
    pub html_dir: PathBuf,

    #[serde(rename = "pdf-dir", default = "default_pdf_dir")]
    pub pdf_dir: PathBuf,

    /// Holds `<host>.jsonl` logs and `manifest.jsonl`
    #[serde(rename = "meta-dir", default = "default_meta_dir")]
    pub meta_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            html_dir: default_html_dir(),
            pdf_dir: default_pdf_dir(),
            meta_dir: default_meta_dir(),
        }
    }
}

/// One allow-listed site
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Base origin, e.g. "https://www.example.com"
    pub base: String,

    /// Path prefixes the crawl may enter
    #[serde(rename = "allow-paths")]
    pub allow_paths: Vec<String>,

    /// Seed URLs, enqueued at depth 0
    #[serde(rename = "start-urls")]
    pub start_urls: Vec<String>,
}

/// PDF download policy
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdfConfig {
    /// Host -> path prefixes from which documents may be downloaded
    #[serde(default)]
    pub allow: BTreeMap<String, Vec<String>>,

    /// Document URLs fetched without discovery
    #[serde(default)]
    pub seeds: Vec<String>,
}

fn default_user_agent() -> String {
    "AgenticRAG-DevScraper/0.1 (+local dev)".to_string()
}

fn default_throttle_seconds() -> f64 {
    0.75
}

fn default_request_timeout() -> u64 {
    20
}

fn default_max_depth() -> u32 {
    3
}

fn default_max_pages() -> u32 {
    250
}

fn default_html_dir() -> PathBuf {
    PathBuf::from("data/raw/html")
}

fn default_pdf_dir() -> PathBuf {
    PathBuf::from("data/raw/pdfs")
}

fn default_meta_dir() -> PathBuf {
    PathBuf::from("data/raw/metadata")
}
