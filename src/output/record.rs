//! Per-item JSON record

use crate::harvest::ExtractedItem;
use crate::url::netloc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the record file inside each item directory
pub const RECORD_FILE_NAME: &str = "data.json";

/// Size counters stored alongside the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemCounts {
    pub images_found: usize,
    pub links_found: usize,
    pub images_downloaded: usize,
}

/// Everything persisted for one successfully harvested URL
///
/// Field order is the key order of `data.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub url: String,
    pub title: String,
    pub h1: String,
    pub description: String,
    pub canonical_url: String,
    pub og: BTreeMap<String, String>,
    pub text_preview: String,
    pub links: Vec<String>,
    pub counts: ItemCounts,
    pub images: Vec<String>,
    pub domain: String,
}

impl ItemRecord {
    /// Combines an extracted page with the images actually saved for it
    pub fn assemble(item: ExtractedItem, saved_images: &[PathBuf]) -> Self {
        let counts = ItemCounts {
            images_found: item.image_urls.len(),
            links_found: item.links.len(),
            images_downloaded: saved_images.len(),
        };
        let domain = netloc(&item.url);

        Self {
            url: item.url,
            title: item.title,
            h1: item.h1,
            description: item.description,
            canonical_url: item.canonical_url,
            og: item.open_graph,
            text_preview: item.text_preview,
            links: item.links,
            counts,
            images: saved_images
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            domain,
        }
    }
}

/// Writes `record` as pretty-printed JSON to `<item_dir>/data.json`
///
/// Creates `item_dir` if needed and returns the path written.
pub async fn write_record(record: &ItemRecord, item_dir: &Path) -> crate::Result<PathBuf> {
    tokio::fs::create_dir_all(item_dir).await?;

    let path = item_dir.join(RECORD_FILE_NAME);
    let json = serde_json::to_string_pretty(record)?;
    tokio::fs::write(&path, json).await?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item() -> ExtractedItem {
        let mut open_graph = BTreeMap::new();
        open_graph.insert("og:title".to_string(), "Hello".to_string());

        ExtractedItem {
            url: "https://example.com:8080/page".to_string(),
            title: "Hello".to_string(),
            description: "World".to_string(),
            h1: "Heading".to_string(),
            canonical_url: String::new(),
            open_graph,
            image_urls: vec![
                "https://example.com/a.jpg".to_string(),
                "https://example.com/b.jpg".to_string(),
            ],
            links: vec!["https://example.com/next".to_string()],
            text_preview: "Heading body".to_string(),
        }
    }

    #[test]
    fn test_assemble_counts() {
        let saved = vec![PathBuf::from("out/x/images/a.jpg")];
        let record = ItemRecord::assemble(item(), &saved);

        assert_eq!(
            record.counts,
            ItemCounts {
                images_found: 2,
                links_found: 1,
                images_downloaded: 1,
            }
        );
        assert_eq!(record.images, vec!["out/x/images/a.jpg"]);
        assert_eq!(record.domain, "example.com:8080");
        assert_eq!(record.og["og:title"], "Hello");
    }

    #[test]
    fn test_json_key_order() {
        let record = ItemRecord::assemble(item(), &[]);
        let json = serde_json::to_string(&record).unwrap();

        let keys = [
            "\"url\"",
            "\"title\"",
            "\"h1\"",
            "\"description\"",
            "\"canonical_url\"",
            "\"og\"",
            "\"text_preview\"",
            "\"links\"",
            "\"counts\"",
            "\"images\"",
            "\"domain\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|key| json.find(key).unwrap()).collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn test_write_record_creates_directory() {
        let dir = TempDir::new().unwrap();
        let item_dir = dir.path().join("example-com-page-1");
        let record = ItemRecord::assemble(item(), &[]);

        let path = write_record(&record, &item_dir).await.unwrap();

        assert_eq!(path, item_dir.join("data.json"));
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["title"], "Hello");
        assert_eq!(written["counts"]["images_found"], 2);
        assert_eq!(written["images"], serde_json::json!([]));
    }
}
