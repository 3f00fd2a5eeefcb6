use url::Url;

/// Returns the host key of a URL: lowercase host plus `:port` when the URL
/// carries a non-default port
///
/// The host key names per-host log files and indexes the PDF allow-map.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use corpus_ingest::url::host_key;
///
/// let url = Url::parse("https://Example.com/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
