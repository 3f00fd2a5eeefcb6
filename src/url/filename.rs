use crate::storage::sha256_hex;
use crate::url::host_key;
use url::Url;

/// Names longer than this are shortened and suffixed with a URL digest
const MAX_STEM_LEN: usize = 180;

/// Derives a filesystem-safe file name from a URL
///
/// The name is `host + path` with slashes trimmed and every run of characters
/// outside `[A-Za-z0-9._-]` replaced by `_`. When the last path segment has no
/// extension, `ext_hint` is appended. Query strings do not participate, so
/// URLs differing only in their query share a name.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use corpus_ingest::url::safe_filename_from_url;
///
/// let url = Url::parse("https://x.test/help/getting-started").unwrap();
/// assert_eq!(safe_filename_from_url(&url, ".html"), "x.test_help_getting-started.html");
///
/// let url = Url::parse("https://x.test/docs/Guide%20v2.pdf").unwrap();
/// assert_eq!(safe_filename_from_url(&url, ".pdf"), "x.test_docs_Guide_20v2.pdf");
/// ```
pub fn safe_filename_from_url(url: &Url, ext_hint: &str) -> String {
    let raw = format!("{}{}", host_key(url).unwrap_or_default(), url.path());
    let mut stem = sanitize(raw.trim_matches('/'));

    if stem.is_empty() {
        return format!("index{}", ext_hint);
    }

    if stem.len() > MAX_STEM_LEN {
        let digest = sha256_hex(url.as_str().as_bytes());
        let keep: String = stem.chars().take(MAX_STEM_LEN - 17).collect();
        stem = format!("{}_{}", keep, &digest[..16]);
        return format!("{}{}", stem, ext_hint);
    }

    if has_extension(url) {
        stem
    } else {
        format!("{}{}", stem, ext_hint)
    }
}

fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_run = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// True when the last non-empty path segment carries a `.ext` suffix
fn has_extension(url: &Url) -> bool {
    let last = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("");

    match last.rfind('.') {
        Some(idx) => idx > 0 && idx + 1 < last.len(),
        None => false,
    }
}
