//! Input URL list
//!
//! URLs come from a CSV file with a `url` column. Any other columns are
//! ignored.

use crate::ConfigError;
use std::fs::File;
use std::path::Path;

const URL_COLUMN: &str = "url";

/// Reads the `url` column of a CSV file
///
/// Values are trimmed and blank ones are skipped. Rows keep their file order.
///
/// # Errors
///
/// * `ConfigError::Io` - The file could not be opened
/// * `ConfigError::MissingUrlColumn` - The header has no `url` column
/// * `ConfigError::Csv` - The file is not valid CSV
pub fn read_url_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let column = reader
        .headers()?
        .iter()
        .position(|header| header.trim_start_matches('\u{feff}').trim() == URL_COLUMN)
        .ok_or_else(|| ConfigError::MissingUrlColumn {
            path: path.display().to_string(),
        })?;

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(column).map(str::trim) {
            if !value.is_empty() {
                urls.push(value.to_string());
            }
        }
    }

    tracing::debug!("Read {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

/// Keeps only the URLs containing `only_domain` as a substring
///
/// `None` keeps every URL.
pub fn filter_by_domain(urls: Vec<String>, only_domain: Option<&str>) -> Vec<String> {
    match only_domain {
        Some(needle) => urls.into_iter().filter(|url| url.contains(needle)).collect(),
        None => urls,
    }
}
