//! Politeness gate: robots.txt checks and the fixed inter-request delay

use crate::config::CrawlerConfig;
use crate::crawler::Transport;
use crate::robots::{fetch_robots, product_token, ParsedRobots, RobotsCache};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Gate every outbound page fetch passes through
///
/// Built from the crawler configuration; holds no global state, so
/// independent gates can coexist in tests.
#[derive(Debug)]
pub struct PolitenessGate {
    /// Product token matched against robots.txt groups
    agent_token: String,

    /// Delay applied before every fetch attempt
    throttle: Duration,

    robots: RobotsCache,
}

impl PolitenessGate {
    pub fn new(config: &CrawlerConfig) -> Self {
        Self::with_throttle(&config.user_agent, config.throttle())
    }

    pub fn with_throttle(user_agent: &str, throttle: Duration) -> Self {
        Self {
            agent_token: product_token(user_agent).to_string(),
            throttle,
            robots: RobotsCache::new(),
        }
    }

    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Returns the robots.txt rules for the URL's origin, fetching them once
    pub async fn robots_for(&self, transport: &dyn Transport, url: &Url) -> Arc<ParsedRobots> {
        let origin = url.origin().ascii_serialization();
        self.robots
            .get_or_fetch(&origin, || fetch_robots(transport, url))
            .await
    }

    /// Checks whether robots.txt permits fetching `url`
    pub async fn can_fetch(&self, transport: &dyn Transport, url: &Url) -> bool {
        let robots = self.robots_for(transport, url).await;
        robots.is_allowed(url.as_str(), &self.agent_token)
    }

    /// Sleeps for the configured delay
    ///
    /// Called before every fetch attempt whatever its outcome, which is what
    /// bounds the request rate per host.
    pub async fn wait(&self) {
        if !self.throttle.is_zero() {
            tokio::time::sleep(self.throttle).await;
        }
    }
}
