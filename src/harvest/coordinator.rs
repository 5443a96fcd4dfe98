//! Harvest coordinator - main run orchestration logic
//!
//! This module contains the per-URL loop that ties the pieces together:
//! - Gating each URL through the global rate limiter
//! - Selecting an extractor and extracting the page
//! - Downloading the page's images
//! - Assembling and persisting the JSON record
//! - Recording one report row per URL and writing the report files
//!
//! A failure on one URL becomes an error row and the loop moves on; only
//! configuration problems and failures to write the run-level files abort
//! a run.

use crate::config::Config;
use crate::harvest::downloader::ImageDownloader;
use crate::harvest::fetcher::{FetchSettings, HttpClient};
use crate::harvest::limiter::RateLimiter;
use crate::harvest::registry::ExtractorRegistry;
use crate::harvest::render::WebDriverRenderer;
use crate::input::{filter_by_domain, read_url_list};
use crate::output::{
    write_data_csv, write_record, write_report_csv, ExportRow, ItemRecord, ReportRow,
    RunStatistics, EXPORT_FILE_NAME, REPORT_FILE_NAME,
};
use crate::state::ItemState;
use crate::url::item_dir_name;
use crate::HarvestError;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Subdirectory of an item directory that receives its images
pub const IMAGES_DIR: &str = "images";

/// How often (in URLs) a progress line is logged
const PROGRESS_INTERVAL: usize = 10;

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One row per processed URL, in processing order
    pub rows: Vec<ReportRow>,
    pub report_path: PathBuf,
    /// Set when the consolidated export was written
    pub export_path: Option<PathBuf>,
    pub statistics: RunStatistics,
}

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Config,
    registry: ExtractorRegistry,
    downloader: ImageDownloader,
    limiter: RateLimiter,
    output_dir: PathBuf,
}

impl Coordinator {
    /// Creates a new coordinator writing under `output_dir`
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client or the extractor list could not be built
    pub fn new(config: Config, output_dir: impl Into<PathBuf>) -> Result<Self, HarvestError> {
        let http = HttpClient::new(FetchSettings::from(&config.http))?;
        let renderer = config.render.as_ref().map(WebDriverRenderer::from_config);
        let registry = ExtractorRegistry::from_config(&config, http.clone(), renderer)?;
        let limiter = RateLimiter::new(config.harvest.min_interval());

        tracing::debug!(
            "Coordinator ready: {} extractors, {:?} between URLs",
            registry.len(),
            limiter.min_interval()
        );

        Ok(Self {
            config,
            registry,
            downloader: ImageDownloader::new(http),
            limiter,
            output_dir: output_dir.into(),
        })
    }

    /// Processes every URL in order and writes the run-level files
    ///
    /// Each URL yields exactly one report row, whether it succeeded or not.
    ///
    /// # Errors
    ///
    /// Only failures to create the output directory or to write `report.csv`
    /// (or `data.csv`) are returned; per-URL failures end up in the rows.
    pub async fn run(&mut self, urls: &[String]) -> Result<RunReport, HarvestError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let started_at = Utc::now();
        let total = urls.len();
        let mut rows = Vec::with_capacity(total);
        let mut exports = Vec::new();
        let mut images_downloaded = 0;

        tracing::info!("Harvesting {} URLs into {}", total, self.output_dir.display());

        for (position, url) in urls.iter().enumerate() {
            self.limiter.wait().await;

            let index = position + 1;
            let item_dir = self.output_dir.join(item_dir_name(url, index));
            let mut state = ItemState::Pending;

            match self.process_url(url, &item_dir, &mut state).await {
                Ok(record) => {
                    tracing::info!("[OK] {} -> {}", url, item_dir.display());
                    images_downloaded += record.counts.images_downloaded;
                    if self.config.harvest.export_csv {
                        exports.push(ExportRow::from(&record));
                    }
                    rows.push(ReportRow::ok(url.as_str(), &item_dir));
                }
                Err(e) => {
                    tracing::info!("[ERR] {} -> {}", url, e);
                    tracing::debug!("{} failed while {}", url, state);
                    state = state.advance(ItemState::Failed)?;
                    rows.push(ReportRow::error(url.as_str(), &item_dir, e.to_string()));
                }
            }

            tracing::trace!("{} finished as {}", url, state);

            if index % PROGRESS_INTERVAL == 0 && index < total {
                tracing::info!("Progress: {}/{} URLs processed", index, total);
            }
        }

        let report_path = self.output_dir.join(REPORT_FILE_NAME);
        write_report_csv(&report_path, &rows)?;

        let export_path = if self.config.harvest.export_csv {
            let path = self.output_dir.join(EXPORT_FILE_NAME);
            write_data_csv(&path, &exports)?;
            Some(path)
        } else {
            None
        };

        let statistics = RunStatistics::from_rows(&rows, images_downloaded, started_at, Utc::now());
        tracing::info!(
            "Harvest complete: {} ok, {} errors",
            statistics.ok,
            statistics.errors
        );

        Ok(RunReport {
            rows,
            report_path,
            export_path,
            statistics,
        })
    }

    /// Extracts, downloads and persists one URL
    ///
    /// `state` tracks how far the item got, so a failure can be attributed
    /// to the step that raised it.
    async fn process_url(
        &self,
        url: &str,
        item_dir: &Path,
        state: &mut ItemState,
    ) -> Result<ItemRecord, HarvestError> {
        *state = state.advance(ItemState::Extracting)?;
        let extractor = self.registry.select(url);
        tracing::debug!("Extracting {} with the {} extractor", url, extractor.name());
        let item = extractor.extract(url).await?;

        *state = state.advance(ItemState::Downloading)?;
        let saved = self
            .downloader
            .download_all(&item.image_urls, &item_dir.join(IMAGES_DIR))
            .await?;

        let record = ItemRecord::assemble(item, &saved);
        write_record(&record, item_dir).await?;
        *state = state.advance(ItemState::Assembled)?;

        Ok(record)
    }
}

/// Runs a complete harvest from an input CSV
///
/// The URL list is read and filtered before any network activity, so a bad
/// input file fails fast with a configuration error.
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `input` - CSV file with a `url` column
/// * `output_dir` - Directory receiving item directories and the report
pub async fn run_harvest(
    config: Config,
    input: &Path,
    output_dir: &Path,
) -> Result<RunReport, HarvestError> {
    let urls = read_url_list(input)?;
    let read = urls.len();
    let urls = filter_by_domain(urls, config.harvest.only_domain.as_deref());

    if urls.len() < read {
        tracing::info!(
            "Domain filter kept {} of {} URLs",
            urls.len(),
            read
        );
    }

    let mut coordinator = Coordinator::new(config, output_dir)?;
    coordinator.run(&urls).await
}
