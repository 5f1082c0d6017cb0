use axum::extract::Host;
use url::Url;

/// Absolute base URI of the current request, taken from its `Host` (`localhost` when absent).
pub fn base_url(host: Option<Host>) -> Result<Url, url::ParseError> {
    let host = host
        .map(|Host(host)| host)
        .unwrap_or_else(|| "localhost".to_string());
    Url::parse(&format!("http://{}/", host))
}

/// Appends percent-encoded path segments to `base`.
pub fn resource_uri(base: &Url, segments: &[&str]) -> Url {
    let mut uri = base.clone();
    if let Ok(mut path) = uri.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    uri
}
