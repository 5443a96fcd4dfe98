//! Sumi-Harvest: a batch web-content harvester
//!
//! This crate fetches a list of pages, extracts structured metadata from each
//! one (title, description, Open Graph fields, links, images), downloads a
//! bounded set of images per page, and writes per-URL JSON records plus a
//! run-level CSV report. One failing page or image never aborts the run.

pub mod config;
pub mod harvest;
pub mod input;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to write JSON record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::ItemState,
        to: state::ItemState,
    },
}

/// Configuration-specific errors
///
/// Every variant is fatal and is raised before any network activity begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("CSV file {path} must contain a 'url' column")]
    MissingUrlColumn { path: String },
}

/// Errors raised by the HTTP client
///
/// `Timeout`, `Connect` and `Truncated` are transient and retried by the
/// client's backoff policy. Everything else, host resolution failures
/// included, surfaces after the first attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection error for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Could not resolve host for {url}: {message}")]
    Resolve { url: String, message: String },

    #[error("Truncated response from {url}: {message}")]
    Truncated { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl FetchError {
    /// Returns true for failures worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connect { .. } | Self::Truncated { .. }
        )
    }

    /// The URL the failed request was sent to
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Resolve { url, .. }
            | Self::Truncated { url, .. }
            | Self::Status { url, .. }
            | Self::Request { url, .. }
            | Self::InvalidUrl { url, .. } => url,
        }
    }
}

/// Page-level extraction failures
///
/// No partial item is ever produced alongside one of these.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Failed to render {url}: {message}")]
    Render { url: String, message: String },

    #[error("Invalid page URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: ::url::ParseError,
    },
}

impl ExtractionError {
    /// The page URL that could not be extracted
    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url, .. } | Self::Render { url, .. } | Self::InvalidUrl { url, .. } => {
                url
            }
        }
    }
}

/// Result type alias for Sumi-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for HTTP fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{run_harvest, Coordinator, ExtractedItem, RunReport};
pub use output::{ReportRow, ReportStatus};
pub use state::ItemState;
