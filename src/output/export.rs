//! Consolidated `data.csv` export, one row per successful item

use crate::output::record::ItemRecord;
use serde::Serialize;
use std::path::Path;

/// Name of the export file in the output directory
pub const EXPORT_FILE_NAME: &str = "data.csv";

const EXPORT_HEADERS: [&str; 12] = [
    "url",
    "title",
    "h1",
    "description",
    "canonical_url",
    "og_title",
    "og_description",
    "og_image",
    "images_found",
    "images_downloaded",
    "links_found",
    "text_preview",
];

/// Flattened view of an [`ItemRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub url: String,
    pub title: String,
    pub h1: String,
    pub description: String,
    pub canonical_url: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub images_found: usize,
    pub images_downloaded: usize,
    pub links_found: usize,
    pub text_preview: String,
}

impl From<&ItemRecord> for ExportRow {
    fn from(record: &ItemRecord) -> Self {
        let og = |key: &str| record.og.get(key).cloned().unwrap_or_default();

        Self {
            url: record.url.clone(),
            title: record.title.clone(),
            h1: record.h1.clone(),
            description: record.description.clone(),
            canonical_url: record.canonical_url.clone(),
            og_title: og("og:title"),
            og_description: og("og:description"),
            og_image: og("og:image"),
            images_found: record.counts.images_found,
            images_downloaded: record.counts.images_downloaded,
            links_found: record.counts.links_found,
            text_preview: record.text_preview.clone(),
        }
    }
}

/// Writes the export file; the header is present even with no rows
pub fn write_data_csv(path: &Path, rows: &[ExportRow]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(EXPORT_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
