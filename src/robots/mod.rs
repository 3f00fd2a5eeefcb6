//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching
//! robots.txt files, and the politeness gate built on top of them.

mod cache;
mod gate;
mod parser;

pub use cache::RobotsCache;
pub use gate::PolitenessGate;
pub use parser::{product_token, ParsedRobots};

use crate::crawler::Transport;
use url::Url;

/// Fetches robots.txt for the origin of `url`
///
/// Never fails: a transport error, a non-200 status, or an unreadable body
/// all produce an empty ruleset that allows everything.
pub async fn fetch_robots(transport: &dyn Transport, url: &Url) -> ParsedRobots {
    let robots_url = match url.join("/robots.txt") {
        Ok(u) => u,
        Err(_) => return ParsedRobots::allow_all(),
    };

    match transport.get(&robots_url).await {
        Some(response) if response.is_ok() => {
            tracing::debug!("Loaded robots.txt from {}", robots_url);
            ParsedRobots::from_content(&response.text())
        }
        Some(response) => {
            tracing::debug!(
                "robots.txt at {} returned HTTP {}, assuming no restrictions",
                robots_url,
                response.status
            );
            ParsedRobots::allow_all()
        }
        None => {
            tracing::debug!(
                "robots.txt at {} unreachable, assuming no restrictions",
                robots_url
            );
            ParsedRobots::allow_all()
        }
    }
}
