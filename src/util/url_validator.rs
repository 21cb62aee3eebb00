use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Reasons a base URL for the emoji feeds is rejected.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain http is only accepted for loopback hosts (local mirrors, tests).
    #[error("Insecure base URL: HTTPS required (except localhost)")]
    Insecure,
    /// Feed names are appended as path segments, so these would be lost.
    #[error("Base URL must not carry a query string or fragment")]
    HasQueryOrFragment,
}

/// Validates the directory URL that feed files are fetched from.
///
/// Accepts `https` URLs, and `http` URLs whose host is loopback
/// (`localhost`, `127.0.0.1`, `::1`).
///
/// ```
/// use emojifeed::util::validate_base_url;
///
/// assert!(validate_base_url("https://unicode.org/Public/emoji/latest").is_ok());
/// assert!(validate_base_url("http://127.0.0.1:8080/emoji").is_ok());
/// assert!(validate_base_url("http://unicode.org/Public/emoji/latest").is_err());
/// assert!(validate_base_url("file:///usr/share/unicode").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "https" => {}
        "http" if is_loopback_host(&url) => {}
        "http" => return Err(UrlValidationError::Insecure),
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(UrlValidationError::HasQueryOrFragment);
    }

    Ok(url)
}

fn is_loopback_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if host == "localhost" {
        return true;
    }

    // Strip brackets from IPv6 addresses for parsing
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    host_for_parse
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
