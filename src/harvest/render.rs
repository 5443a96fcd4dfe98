//! Browser-rendered page source backed by a WebDriver endpoint

use crate::config::RenderConfig;
use crate::ExtractionError;
use fantoccini::ClientBuilder;
use std::time::Duration;

/// Fetches fully rendered HTML through a WebDriver session
///
/// Each render opens its own session and closes it afterwards, so one
/// crashed page cannot poison the next. Renders are not retried; the per-URL
/// rate gate still applies because it is taken before extraction starts.
#[derive(Debug, Clone)]
pub struct WebDriverRenderer {
    webdriver_url: String,
    timeout: Duration,
}

impl WebDriverRenderer {
    pub fn new(webdriver_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(
            config.webdriver_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    /// Navigates to `url` and returns the page source after load
    pub async fn render(&self, url: &str) -> Result<String, ExtractionError> {
        let render_error = |message: String| ExtractionError::Render {
            url: url.to_string(),
            message,
        };

        let client = ClientBuilder::native()
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| {
                render_error(format!(
                    "failed to connect to WebDriver at {}: {}",
                    self.webdriver_url, e
                ))
            })?;

        tracing::debug!("Rendering {} via {}", url, self.webdriver_url);

        let outcome = tokio::time::timeout(self.timeout, async {
            client.goto(url).await?;
            client.source().await
        })
        .await;

        if let Err(e) = client.close().await {
            tracing::debug!("Failed to close WebDriver session for {}: {}", url, e);
        }

        match outcome {
            Ok(Ok(html)) => Ok(html),
            Ok(Err(e)) => Err(render_error(e.to_string())),
            Err(_) => Err(render_error(format!("timed out after {:?}", self.timeout))),
        }
    }
}
