//! Harvest pipeline
//!
//! This module contains the fetch-extract-download pipeline:
//! - HTTP client with retry and exponential backoff
//! - Global rate gate between URLs
//! - Page extraction and extractor selection
//! - Optional WebDriver page source
//! - Image downloads
//! - The run coordinator

mod coordinator;
mod downloader;
mod extractor;
mod fetcher;
mod limiter;
mod registry;
mod render;
mod retry;

pub use coordinator::{run_harvest, Coordinator, RunReport, IMAGES_DIR};
pub use downloader::{filename_from_url, DownloadResult, ImageDownloadError, ImageDownloader};
pub use extractor::{extract_from_html, ExtractedItem, ExtractionLimits, SiteSelectors};
pub use fetcher::{build_http_client, FetchSettings, HttpClient, CHUNK_SIZE};
pub use limiter::RateLimiter;
pub use registry::{Extractor, ExtractorRegistry, GenericExtractor, PageSource, SiteExtractor};
pub use render::WebDriverRenderer;
pub use retry::RetryPolicy;
