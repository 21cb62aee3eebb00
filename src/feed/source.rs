use crate::config::Config;
use crate::util::{validate_base_url, UrlValidationError};
use futures::StreamExt;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while obtaining the raw text of a feed.
///
/// Parsing never fails, so these are the only failures a feed can produce.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,
    /// Server returned 429 Too Many Requests after max retries
    #[error("rate limited after {0} retries")]
    RateLimited(u32),
    /// Response body exceeded the configured size limit
    #[error("response too large (limit {0} bytes)")]
    ResponseTooLarge(usize),
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Local feed file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Source has no feed with this name
    #[error("unknown feed: {0}")]
    UnknownFeed(String),
    /// Feed name cannot be mapped to a file or URL path segment
    #[error("invalid feed name: {0:?}")]
    InvalidFeedName(String),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] UrlValidationError),
}

/// Anything that can produce the raw bytes of a named feed.
///
/// The provider treats feed names as opaque and hands them straight to the
/// source; where the bytes come from (network, disk, memory) is up to the
/// implementation.
pub trait FeedSource {
    fn fetch(&self, name: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Feed names become file names and URL segments, so keep them to a single
/// plain path component.
fn check_feed_name(name: &str) -> Result<(), FetchError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(FetchError::InvalidFeedName(name.to_string()))
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches `<base_url>/<name>.txt` over HTTP.
///
/// - Each attempt (headers and body) is bounded by the configured timeout
/// - 429 and 5xx responses are retried with exponential backoff
/// - Other non-2xx statuses fail immediately
/// - Bodies are streamed and capped at the configured size
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    max_size: usize,
    retry_base_delay: Duration,
}

impl HttpSource {
    /// Builds a source from the fetch settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if `config.base_url` is not an
    /// acceptable http(s) URL.
    pub fn new(client: reqwest::Client, config: &Config) -> Result<Self, FetchError> {
        let base_url = validate_base_url(&config.base_url)?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            max_size: config.max_feed_size_bytes,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// URL the feed `name` is downloaded from.
    pub fn feed_url(&self, name: &str) -> String {
        format!("{}/{}.txt", self.base_url, name)
    }

    fn backoff(&self, retry: u32) -> Duration {
        self.retry_base_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut retry_count = 0;

        loop {
            tracing::debug!(url = %url, attempt = retry_count + 1, "Fetching emoji feed");

            // One deadline covers both the response headers and the body
            let deadline = tokio::time::Instant::now() + self.timeout;

            let response = tokio::time::timeout_at(deadline, self.client.get(url).send())
                .await
                .map_err(|_| FetchError::Timeout)?
                .map_err(FetchError::Network)?;

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                if retry_count >= self.max_retries {
                    return Err(if status.is_server_error() {
                        FetchError::HttpStatus(status.as_u16())
                    } else {
                        FetchError::RateLimited(self.max_retries)
                    });
                }

                let delay = self.backoff(retry_count);
                tracing::warn!(
                    url = %url,
                    status = %status,
                    retry = retry_count,
                    delay_ms = delay.as_millis() as u64,
                    "Feed request failed, retrying after delay"
                );

                tokio::time::sleep(delay).await;
                retry_count += 1;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::HttpStatus(status.as_u16()));
            }

            let body = tokio::time::timeout_at(deadline, read_limited_bytes(response, self.max_size))
                .await
                .map_err(|_| FetchError::Timeout)?;

            match body {
                Ok(bytes) => return Ok(bytes),
                Err(FetchError::IncompleteResponse { expected, received })
                    if retry_count < self.max_retries =>
                {
                    let delay = self.backoff(retry_count);
                    tracing::debug!(
                        url = %url,
                        expected = expected,
                        received = received,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying incomplete download"
                    );

                    tokio::time::sleep(delay).await;
                    retry_count += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl FeedSource for HttpSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        check_feed_name(name)?;
        self.fetch_url(&self.feed_url(name)).await
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

// ============================================================================
// Local directory
// ============================================================================

/// Reads `<dir>/<name>.txt` from disk, e.g. a mirror of the Unicode data files.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn feed_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.txt"))
    }
}

impl FeedSource for DirSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        check_feed_name(name)?;
        let path = self.feed_path(name);
        tracing::debug!(path = %path.display(), "Reading emoji feed from disk");
        Ok(tokio::fs::read(&path).await?)
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Serves feed text held in memory. Unknown names fail with
/// [`FetchError::UnknownFeed`].
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    feeds: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.feeds.insert(name.into(), text.into());
        self
    }
}

impl FeedSource for StaticSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        self.feeds
            .get(name)
            .map(|text| text.clone().into_bytes())
            .ok_or_else(|| FetchError::UnknownFeed(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> Config {
        Config {
            base_url: base_url.to_string(),
            retry_base_delay_ms: 1,
            ..Config::default()
        }
    }

    fn http_source(base_url: &str) -> HttpSource {
        HttpSource::new(reqwest::Client::new(), &test_config(base_url)).unwrap()
    }

    #[test]
    fn test_feed_url_joins_base_and_name() {
        let source = http_source("https://unicode.org/Public/emoji/latest/");
        assert_eq!(
            source.feed_url("emoji-test"),
            "https://unicode.org/Public/emoji/latest/emoji-test.txt"
        );
    }

    #[test]
    fn test_insecure_remote_base_url_rejected() {
        let result = HttpSource::new(reqwest::Client::new(), &test_config("http://unicode.org/x"));
        assert!(matches!(result, Err(FetchError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_feed_name_checks() {
        assert!(check_feed_name("emoji-zwj-sequences").is_ok());
        assert!(check_feed_name("emoji_test.v2").is_ok());
        assert!(check_feed_name("").is_err());
        assert!(check_feed_name("../etc/passwd").is_err());
        assert!(check_feed_name("a/b").is_err());
        assert!(check_feed_name(".hidden").is_err());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/emoji-test.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# emoji-test\n"))
            .mount(&mock_server)
            .await;

        let bytes = http_source(&mock_server.uri())
            .fetch("emoji-test")
            .await
            .unwrap();
        assert_eq!(bytes, b"# emoji-test\n");
    }

    #[tokio::test]
    async fn test_fetch_404_fails_without_retry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = http_source(&mock_server.uri()).fetch("emoji-test").await;
        match result {
            Err(FetchError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_500_retries_then_fails() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4) // Initial request + 3 retries
            .mount(&mock_server)
            .await;

        let result = http_source(&mock_server.uri()).fetch("emoji-test").await;
        match result {
            Err(FetchError::HttpStatus(500)) => {}
            other => panic!("Expected HttpStatus(500), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_503_retry_then_success() {
        let mock_server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let bytes = http_source(&mock_server.uri())
            .fetch("emoji-test")
            .await
            .unwrap();
        assert_eq!(bytes, b"ok");
    }

    #[tokio::test]
    async fn test_fetch_rate_limited_after_retries() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let result = http_source(&mock_server.uri()).fetch("emoji-test").await;
        assert!(matches!(result, Err(FetchError::RateLimited(3))));
    }

    #[tokio::test]
    async fn test_fetch_oversized_body_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&mock_server)
            .await;

        let config = Config {
            max_feed_size_bytes: 16,
            ..test_config(&mock_server.uri())
        };
        let source = HttpSource::new(reqwest::Client::new(), &config).unwrap();

        let result = source.fetch("emoji-test").await;
        assert!(matches!(result, Err(FetchError::ResponseTooLarge(16))));
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Server sends headers and a few body bytes, then goes silent
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n1F600 ; f")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let config = Config {
            timeout_secs: 1,
            ..test_config(&format!("http://{addr}"))
        };
        let source = HttpSource::new(reqwest::Client::new(), &config).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), source.fetch("emoji-test"))
            .await
            .expect("fetch should give up on its own before 5s");
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_static_source_unknown_feed() {
        let source = StaticSource::new().with_feed("emoji-test", "");
        assert!(source.fetch("emoji-test").await.unwrap().is_empty());
        assert!(matches!(
            source.fetch("emoji-sequences").await,
            Err(FetchError::UnknownFeed(name)) if name == "emoji-sequences"
        ));
    }

    #[tokio::test]
    async fn test_dir_source_missing_file_is_io_error() {
        let dir = std::env::temp_dir().join("emojifeed_source_test_missing");
        std::fs::create_dir_all(&dir).unwrap();

        let result = DirSource::new(&dir).fetch("emoji-test").await;
        assert!(matches!(result, Err(FetchError::Io(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
