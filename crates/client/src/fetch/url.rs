//! URLs the scraper requests for a host.

use std::fmt;

use url::Url;

/// Error type for host URL construction failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty host")]
    Empty,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Scheme used for a request; HTTPS is always tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    /// Schemes in the order they are attempted.
    pub const FALLBACK_ORDER: [Scheme; 2] = [Scheme::Https, Scheme::Http];

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build `<scheme>://<host><path>`.
///
/// `host` may carry a port. `path` must start with `/`.
pub fn host_url(scheme: Scheme, host: &str, path: &str) -> Result<Url, UrlError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(UrlError::Empty);
    }

    Url::parse(&format!("{scheme}://{host}{path}")).map_err(|e| UrlError::InvalidUrl(e.to_string()))
}

/// The homepage URL of `host`.
pub fn homepage(scheme: Scheme, host: &str) -> Result<Url, UrlError> {
    host_url(scheme, host, "/")
}

/// The conventional favicon URL of `host`.
pub fn favicon(scheme: Scheme, host: &str) -> Result<Url, UrlError> {
    host_url(scheme, host, "/favicon.ico")
}

/// `host[:port]` of a URL, as it appears in the URL.
pub fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}
