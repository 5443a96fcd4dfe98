//! Configuration module for Sumi-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Command-line flags are layered on top by the binary,
//! after which [`validate`] runs again.
//!
//! # Example
//!
//! ```no_run
//! use sumi_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Rate gate: {}s", config.harvest.min_interval_seconds);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, HarvestConfig, HttpConfig, RenderConfig, SiteEntry, DEFAULT_USER_AGENT,
};

pub use parser::{
    compute_config_hash, hash_config_content, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
