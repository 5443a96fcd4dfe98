use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates TOML configuration text
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of configuration text, as logged at startup
pub fn hash_config_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Reads, parses and validates a configuration file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Max images: {}", config.harvest.max_images);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Hashes a configuration file without parsing it
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_config_content(&std::fs::read_to_string(path)?))
}

/// Loads a configuration together with the hash of the exact bytes parsed
///
/// The file is read once, so the hash always describes the settings in use.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!("Parsed configuration from {}", path.display());
    Ok((config, hash_config_content(&content)))
}
