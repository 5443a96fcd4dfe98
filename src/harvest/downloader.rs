//! Image downloader
//!
//! Downloads a page's images into one directory, one file per URL. A failing
//! image is logged and skipped; it never fails the page.

use crate::harvest::fetcher::{classify_error, HttpClient, CHUNK_SIZE};
use crate::FetchError;
use reqwest::Response;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufWriter};
use url::Url;

/// Extension used when a filename has to be invented or renamed without one
const DEFAULT_EXTENSION: &str = "jpg";

/// Per-image failures; always absorbed by [`ImageDownloader::download_all`]
#[derive(Debug, Error)]
pub enum ImageDownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Paths written by one call to [`ImageDownloader::download_all`], in order
pub type DownloadResult = Vec<PathBuf>;

#[derive(Debug, Clone)]
pub struct ImageDownloader {
    http: HttpClient,
}

impl ImageDownloader {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Downloads every URL into `destination`, skipping the ones that fail
    ///
    /// # Filenames
    ///
    /// The last path segment of the URL is used, or `img_<n>.jpg` when there
    /// is none (`n` is the 1-based position in `image_urls`). If that name
    /// already exists in `destination`, the file is saved as
    /// `<stem>_<n><ext>` instead, keeping the `.jpg` fallback extension.
    ///
    /// # Returns
    ///
    /// * `Ok(DownloadResult)` - Paths of the images written, possibly fewer than requested
    /// * `Err(std::io::Error)` - `destination` could not be created
    pub async fn download_all(
        &self,
        image_urls: &[String],
        destination: &Path,
    ) -> std::io::Result<DownloadResult> {
        tokio::fs::create_dir_all(destination).await?;

        let mut saved = Vec::with_capacity(image_urls.len());

        for (position, url) in image_urls.iter().enumerate() {
            let index = position + 1;
            match self.download_one(url, index, destination).await {
                Ok(path) => saved.push(path),
                Err(e) => tracing::debug!("Skipping image {} ({}): {}", index, url, e),
            }
        }

        tracing::debug!(
            "Downloaded {}/{} images into {}",
            saved.len(),
            image_urls.len(),
            destination.display()
        );

        Ok(saved)
    }

    async fn download_one(
        &self,
        url: &str,
        index: usize,
        destination: &Path,
    ) -> Result<PathBuf, ImageDownloadError> {
        let mut response = self.http.fetch_stream(url).await?;

        let filename = filename_from_url(url, index);
        let path = collision_safe_path(destination, &filename, index).await;

        if let Err(e) = write_body(&mut response, &path, url).await {
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                tracing::trace!("Could not remove partial {}: {}", path.display(), cleanup);
            }
            return Err(e);
        }

        Ok(path)
    }
}

/// Derives a filename from the last path segment of an image URL
///
/// Query strings and fragments never reach the name. Falls back to
/// `img_<index>.jpg` when the URL has no usable final segment.
///
/// # Examples
///
/// ```
/// use sumi_harvest::harvest::filename_from_url;
///
/// assert_eq!(filename_from_url("https://cdn.example.com/a/photo.png?w=300", 1), "photo.png");
/// assert_eq!(filename_from_url("https://cdn.example.com/gallery/", 4), "img_4.jpg");
/// ```
pub fn filename_from_url(url: &str, index: usize) -> String {
    let fallback = || format!("img_{}.{}", index, DEFAULT_EXTENSION);

    let Ok(parsed) = Url::parse(url) else {
        return fallback();
    };

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|segment| segment.split(['?', '#']).next().unwrap_or(""))
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .unwrap_or_else(fallback)
}

/// Returns `destination/filename`, or a renamed path if that file exists
async fn collision_safe_path(destination: &Path, filename: &str, index: usize) -> PathBuf {
    let path = destination.join(filename);
    if !matches!(tokio::fs::try_exists(&path).await, Ok(true)) {
        return path;
    }

    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let extension = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    destination.join(format!("{}_{}.{}", stem, index, extension))
}

/// Streams the response body to `path` without buffering it whole
async fn write_body(
    response: &mut Response,
    path: &Path,
    url: &str,
) -> Result<(), ImageDownloadError> {
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| classify_error(url, e))?
    {
        writer.write_all(&chunk).await?;
    }

    writer.flush().await?;
    Ok(())
}
