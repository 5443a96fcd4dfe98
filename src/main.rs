//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest batch harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_harvest::config::{load_config_with_hash, validate, Config};
use sumi_harvest::output::print_statistics;
use sumi_harvest::run_harvest;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a batch web-content harvester
///
/// Sumi-Harvest reads URLs from a CSV file, extracts page metadata, downloads
/// a bounded set of images per page, and writes one JSON record per URL plus
/// a run-level report.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A batch web-content harvester", long_about = None)]
struct Cli {
    /// CSV file with a `url` column
    #[arg(long, value_name = "CSV")]
    input: PathBuf,

    /// Directory receiving item directories and report.csv
    #[arg(long, value_name = "DIR")]
    output: PathBuf,

    /// Optional TOML configuration file
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Minimum seconds between URLs
    #[arg(long)]
    rate: Option<f64>,

    /// Maximum images extracted per page
    #[arg(long)]
    max_images: Option<usize>,

    /// Maximum links extracted per page
    #[arg(long)]
    max_links: Option<usize>,

    /// Maximum characters in the text preview
    #[arg(long)]
    text_preview: Option<usize>,

    /// Process only URLs containing this text (e.g. example.com)
    #[arg(long)]
    only_domain: Option<String>,

    /// Also write a consolidated data.csv
    #[arg(long)]
    export_csv: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Layers command-line flags over file (or default) settings
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(rate) = self.rate {
            config.harvest.min_interval_seconds = rate;
        }
        if let Some(max_images) = self.max_images {
            config.harvest.max_images = max_images;
        }
        if let Some(max_links) = self.max_links {
            config.harvest.max_links = max_links;
        }
        if let Some(limit) = self.text_preview {
            config.harvest.text_preview_limit = limit;
        }
        // An empty filter means "no filter"
        if let Some(domain) = &self.only_domain {
            config.harvest.only_domain = Some(domain.clone()).filter(|d| !d.trim().is_empty());
        }
        if self.export_csv {
            config.harvest.export_csv = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    validate(&config).context("invalid configuration")?;

    let report = match run_harvest(config, &cli.input, &cli.output).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    if !cli.quiet {
        println!();
        print_statistics(&report.statistics);
        println!("\nReport: {}", report.report_path.display());
        if let Some(export) = &report.export_path {
            println!("Export: {}", export.display());
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
