use crate::url::host_key;
use url::Url;

/// Host and path-prefix allow-list for one crawl target
#[derive(Debug, Clone)]
pub struct TargetScope {
    host: Option<String>,
    allow_paths: Vec<String>,
}

impl TargetScope {
    pub fn new(base: &Url, allow_paths: &[String]) -> Self {
        Self {
            host: host_key(base),
            allow_paths: allow_paths.to_vec(),
        }
    }

    /// Host key of the target base
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// True when `url` is on the target host and under an allowed prefix
    pub fn admits(&self, url: &Url) -> bool {
        self.host.is_some()
            && host_key(url) == self.host
            && is_allowed_path(url, &self.allow_paths)
    }
}

/// True when the URL path (or `/` if empty) starts with any of `prefixes`
///
/// Matching is plain string-prefix: `/help` admits `/helpdesk` as well.
pub fn is_allowed_path(url: &Url, prefixes: &[String]) -> bool {
    let path = match url.path() {
        "" => "/",
        p => p,
    };
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

/// True when the URL path ends in `.pdf`, ignoring case
pub fn looks_like_pdf(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}
