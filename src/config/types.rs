use serde::Deserialize;
use std::time::Duration;

/// Identity header sent with every request unless overridden
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; WebScraperDownloader/1.0)";

/// Main configuration structure for Sumi-Harvest
///
/// Every section is optional; a missing file is equivalent to `Config::default()`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub render: Option<RenderConfig>,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

/// Run-level harvesting behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Minimum seconds between the start of two successive URLs
    #[serde(rename = "min-interval-seconds")]
    pub min_interval_seconds: f64,

    /// Maximum image URLs kept per page
    #[serde(rename = "max-images")]
    pub max_images: usize,

    /// Maximum links kept per page
    #[serde(rename = "max-links")]
    pub max_links: usize,

    /// Maximum characters in the text preview
    #[serde(rename = "text-preview-limit")]
    pub text_preview_limit: usize,

    /// Only URLs containing this substring are processed
    #[serde(rename = "only-domain")]
    pub only_domain: Option<String>,

    /// Also write a consolidated `data.csv` next to the report
    #[serde(rename = "export-csv")]
    pub export_csv: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            min_interval_seconds: 0.8,
            max_images: 20,
            max_links: 30,
            text_preview_limit: 700,
            only_domain: None,
            export_csv: false,
        }
    }
}

impl HarvestConfig {
    /// The rate gate interval; saturates for values validation would reject
    pub fn min_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.min_interval_seconds).unwrap_or(Duration::MAX)
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for page fetches
    #[serde(rename = "fetch-timeout-seconds")]
    pub fetch_timeout_seconds: u64,

    /// Timeout for image downloads
    #[serde(rename = "image-timeout-seconds")]
    pub image_timeout_seconds: u64,

    /// Total attempts for a request failing with a transient error
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    #[serde(rename = "initial-backoff-ms")]
    pub initial_backoff_ms: u64,

    #[serde(rename = "max-backoff-ms")]
    pub max_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_seconds: 20,
            image_timeout_seconds: 25,
            max_attempts: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 8000,
        }
    }
}

/// WebDriver endpoint used by site extractors with `render = true`
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    #[serde(rename = "timeout-seconds", default = "default_render_timeout")]
    pub timeout_seconds: u64,
}

fn default_render_timeout() -> u64 {
    30
}

/// A site-specific extractor definition
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Domain pattern (e.g., "example.com" or "*.example.com")
    pub domain: String,

    #[serde(rename = "title-selector")]
    pub title_selector: Option<String>,

    #[serde(rename = "description-selector")]
    pub description_selector: Option<String>,

    /// Selector for `<img>` elements, tried before the page-wide `img` scan
    #[serde(rename = "image-selector")]
    pub image_selector: Option<String>,

    /// Fetch this site through the WebDriver instead of plain HTTP
    #[serde(default)]
    pub render: bool,
}
