//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the shared client with the identity header and TLS roots
//! - GET requests for page HTML (buffered) and images (streamed)
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::HttpConfig;
use crate::harvest::retry::RetryPolicy;
use crate::{FetchError, FetchResult};
use reqwest::{Client, Response};
use std::time::Duration;

/// Size of the buffer image bodies are written through
pub const CHUNK_SIZE: usize = 8192;

/// Per-client request settings
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub user_agent: String,
    /// Timeout for page fetches
    pub page_timeout: Duration,
    /// Timeout for image downloads
    pub image_timeout: Duration,
    pub retry: RetryPolicy,
}

impl From<&HttpConfig> for FetchSettings {
    fn from(config: &HttpConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            page_timeout: Duration::from_secs(config.fetch_timeout_seconds),
            image_timeout: Duration::from_secs(config.image_timeout_seconds),
            retry: RetryPolicy::from(config),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

/// Builds an HTTP client with proper configuration
///
/// Certificates are verified against the bundled webpki root store, so the
/// trust bundle does not depend on what the host happens to have installed.
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::harvest::build_http_client;
///
/// let client = build_http_client("MyHarvester/1.0").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .build()
}

/// GET client shared by the page extractor and the image downloader
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    settings: FetchSettings,
}

impl HttpClient {
    pub fn new(settings: FetchSettings) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&settings.user_agent)?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Fetches a page and returns its whole body as text
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Timeout | Retry with backoff |
    /// | Connection error | Retry with backoff |
    /// | Body cut short | Retry with backoff |
    /// | Non-2xx status | Fail immediately |
    /// | Anything else | Fail immediately |
    ///
    /// The body read is part of each attempt, so a truncated body is
    /// retried like a dropped connection.
    pub async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        self.settings.retry.run(|| self.get_text_once(url)).await
    }

    /// Sends a GET request for a streamed download
    ///
    /// Only the request itself is retried. The caller pulls the body with
    /// [`Response::chunk`] so large files never sit in memory whole.
    pub async fn fetch_stream(&self, url: &str) -> FetchResult<Response> {
        self.settings
            .retry
            .run(|| self.send(url, self.settings.image_timeout))
            .await
    }

    async fn get_text_once(&self, url: &str) -> FetchResult<String> {
        let response = self.send(url, self.settings.page_timeout).await?;
        response.text().await.map_err(|e| classify_error(url, e))
    }

    async fn send(&self, url: &str, timeout: Duration) -> FetchResult<Response> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }
}

/// Maps a reqwest error onto the harvester's fetch error taxonomy
pub(crate) fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    let url = url.to_string();

    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() && is_resolve_failure(&error) {
        FetchError::Resolve {
            url,
            message: error.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url,
            message: error.to_string(),
        }
    } else if error.is_body() || error.is_decode() {
        FetchError::Truncated {
            url,
            message: error.to_string(),
        }
    } else if error.is_builder() {
        FetchError::InvalidUrl {
            url,
            message: error.to_string(),
        }
    } else if let Some(status) = error.status() {
        FetchError::Status { url, status }
    } else {
        FetchError::Request {
            url,
            message: error.to_string(),
        }
    }
}

/// Returns true when a connect error came from host name resolution
///
/// hyper's connector labels resolver failures "dns error"; the label is the
/// only marker that survives reqwest's boxing.
fn is_resolve_failure(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        if cause.to_string().starts_with("dns error") {
            return true;
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_settings() -> FetchSettings {
        FetchSettings {
            user_agent: "TestHarvester/1.0".to_string(),
            page_timeout: Duration::from_millis(300),
            image_timeout: Duration::from_millis(300),
            retry: RetryPolicy {
                max_attempts: 3,
                initial_backoff: Duration::from_millis(10),
                max_backoff: Duration::from_millis(40),
            },
        }
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client("TestHarvester/1.0").is_ok());
    }

    #[test]
    fn test_settings_from_config() {
        let settings = FetchSettings::default();
        assert_eq!(settings.page_timeout, Duration::from_secs(20));
        assert_eq!(settings.image_timeout, Duration::from_secs(25));
        assert_eq!(settings.retry, RetryPolicy::default());
    }

    #[tokio::test]
    async fn test_fetch_text_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "TestHarvester/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(test_settings()).unwrap();
        let body = client
            .fetch_text(&format!("{}/page", server.uri()))
            .await
            .unwrap();

        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_status_error_fails_on_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(test_settings()).unwrap();
        let result = client.fetch_text(&format!("{}/broken", server.uri())).await;

        match result {
            Err(FetchError::Status { status, .. }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE)
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeouts_are_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
            .mount(&server)
            .await;

        let client = HttpClient::new(test_settings()).unwrap();
        let body = client
            .fetch_text(&format!("{}/slow", server.uri()))
            .await
            .unwrap();

        assert_eq!(body, "finally");
    }

    #[tokio::test]
    async fn test_timeouts_exhaust_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stuck"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .expect(3)
            .mount(&server)
            .await;

        let client = HttpClient::new(test_settings()).unwrap();
        let result = client.fetch_text(&format!("{}/stuck", server.uri())).await;

        assert!(matches!(result, Err(FetchError::Timeout { .. })));
    }

    /// Serves a response promising 100 bytes but sending fewer, then closes
    async fn spawn_truncating_server(connections: Arc<AtomicUsize>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                connections.fetch_add(1, Ordering::SeqCst);

                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buffer = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buffer).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buffer[..n]),
                        }
                    }

                    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 100\r\n\r\n<html>cut";
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}/page", address)
    }

    #[tokio::test]
    async fn test_truncated_body_is_retried() {
        let connections = Arc::new(AtomicUsize::new(0));
        let url = spawn_truncating_server(connections.clone()).await;

        let client = HttpClient::new(test_settings()).unwrap();
        let result = client.fetch_text(&url).await;

        match result {
            Err(FetchError::Truncated { url: failed, .. }) => assert_eq!(failed, url),
            other => panic!("expected truncated error, got {:?}", other),
        }
        assert_eq!(connections.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_not_retried() {
        let settings = FetchSettings {
            page_timeout: Duration::from_secs(10),
            ..test_settings()
        };
        let client = HttpClient::new(settings).unwrap();

        // The .invalid TLD never resolves
        let result = client.fetch_text("http://harvest-test.invalid/page").await;

        match result {
            Err(error @ FetchError::Resolve { .. }) => assert!(!error.is_transient()),
            other => panic!("expected resolve error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_retried() {
        let client = HttpClient::new(test_settings()).unwrap();
        let result = client.fetch_text("not a url").await;

        assert!(result.is_err());
        assert!(!result.unwrap_err().is_transient());
    }
}
