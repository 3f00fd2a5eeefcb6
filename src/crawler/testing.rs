//! In-memory `Transport` for unit tests

use crate::crawler::{FetchedResponse, Transport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Serves canned responses keyed by exact URL
///
/// Unknown URLs answer 404. URLs registered with `unreachable` behave like a
/// connection failure.
#[derive(Debug, Default)]
pub(crate) struct StaticTransport {
    routes: HashMap<String, Option<FetchedResponse>>,
    requests: Mutex<Vec<String>>,
}

impl StaticTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn status(mut self, url: &str, status: u16, content_type: &str, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            Some(FetchedResponse {
                status,
                content_type: content_type.to_string(),
                body: body.as_bytes().to_vec(),
            }),
        );
        self
    }

    pub(crate) fn html(self, url: &str, body: &str) -> Self {
        self.status(url, 200, "text/html; charset=utf-8", body)
    }

    pub(crate) fn pdf(self, url: &str, body: &str) -> Self {
        self.status(url, 200, "application/pdf", body)
    }

    pub(crate) fn robots(self, origin: &str, content: &str) -> Self {
        self.status(&format!("{}/robots.txt", origin), 200, "text/plain", content)
    }

    pub(crate) fn unreachable(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), None);
        self
    }

    /// Every URL requested so far, in order
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| u.as_str() == url).count()
    }

    /// Requested URLs other than robots.txt
    pub(crate) fn page_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|u| !u.ends_with("/robots.txt"))
            .collect()
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, url: &Url) -> Option<FetchedResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.routes.get(url.as_str()) {
            Some(route) => route.clone(),
            None => Some(FetchedResponse {
                status: 404,
                content_type: "text/html".to_string(),
                body: b"<html><body>Not Found</body></html>".to_vec(),
            }),
        }
    }
}

/// Cancels a token as soon as any robots.txt is requested
///
/// Models an interrupt that lands between the loop's cancellation check and
/// the page fetch.
pub(crate) struct CancelOnRobots {
    pub(crate) inner: StaticTransport,
    pub(crate) cancel: CancellationToken,
}

#[async_trait]
impl Transport for CancelOnRobots {
    async fn get(&self, url: &Url) -> Option<FetchedResponse> {
        if url.path() == "/robots.txt" {
            self.cancel.cancel();
        }
        self.inner.get(url).await
    }
}
