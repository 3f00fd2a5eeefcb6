//! HTML link extraction
//!
//! Links are taken from `<a href>` and `<area href>`, resolved against the
//! page URL, normalized, and deduplicated in document order.

use crate::url::resolve_and_normalize;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts all followable links from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` (including `download` links, which often point at documents)
/// - `<area href="...">`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:`, `data:` hrefs
/// - Fragment-only hrefs (same-page anchors)
/// - Anything that does not resolve to an http(s) URL
///
/// # Example
///
/// ```
/// use corpus_ingest::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="a">A</a><a href="/b#top">B</a></body></html>"#;
/// let base = Url::parse("https://x.test/help/").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links[0].as_str(), "https://x.test/help/a");
/// assert_eq!(links[1].as_str(), "https://x.test/b");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let selector = match Selector::parse("a[href], area[href]") {
        Ok(selector) => selector,
        Err(_) => return links,
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(url) = resolve_link(href, base_url) {
            if seen.insert(url.as_str().to_string()) {
                links.push(url);
            }
        }
    }

    links
}

/// Resolves a link href to a normalized absolute URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    resolve_and_normalize(base_url, href)
}
