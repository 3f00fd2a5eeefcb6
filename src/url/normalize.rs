use crate::UrlError;
use url::Url;

/// Normalizes a URL for frontier membership and logging
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not http or https
/// 3. Require a host (the `url` crate lowercases it)
/// 4. Remove fragment (everything after #)
/// 5. Trim whitespace from the query; drop it if that leaves it empty
/// 6. Collapse a trailing run of slashes into a single slash
///
/// A single trailing slash is kept: `/help/` and `/help` are distinct pages.
///
/// # Examples
///
/// ```
/// use corpus_ingest::url::normalize_url;
///
/// let url = normalize_url("https://X.test/help//#top").unwrap();
/// assert_eq!(url.as_str(), "https://x.test/help/");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Resolves `href` against `base` and normalizes the result
///
/// Returns `None` for hrefs that cannot be resolved to an http(s) URL.
pub fn resolve_and_normalize(base: &Url, href: &str) -> Option<Url> {
    let joined = base.join(href.trim()).ok()?;
    normalize_parsed(joined).ok()
}

fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if let Some(query) = url.query() {
        let trimmed = query.trim().to_string();
        if trimmed.is_empty() {
            url.set_query(None);
        } else if trimmed.len() != query.len() {
            url.set_query(Some(&trimmed));
        }
    }

    let path = url.path();
    if path.ends_with("//") {
        let collapsed = format!("{}/", path.trim_end_matches('/'));
        url.set_path(&collapsed);
    }

    Ok(url)
}
