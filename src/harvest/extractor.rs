//! HTML extraction into an [`ExtractedItem`]
//!
//! Field resolution is a strict priority chain per field; the first
//! non-empty candidate wins:
//!
//! | Field | Candidates |
//! |-------|------------|
//! | title | site selector, `og:title`, `<title>`, first `<h1>` |
//! | description | site selector, `og:description`, `meta[name=description]`, first `<p>` |
//! | h1 | first `<h1>` |
//! | canonical_url | `<link rel="canonical">` |
//!
//! Relative references are always resolved against the requested page URL,
//! never against a redirect target.

use crate::config::{HarvestConfig, SiteEntry};
use crate::url::resolve_reference;
use crate::{ConfigError, ExtractionError};
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Elements whose text never counts as visible page text
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Structured result of extracting one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedItem {
    /// The URL that was requested
    pub url: String,
    pub title: String,
    pub description: String,
    pub h1: String,
    pub canonical_url: String,
    /// `og:*` property to content; `og:image` is made absolute
    pub open_graph: BTreeMap<String, String>,
    /// Deduplicated in first-seen order, at most `max_images` long
    pub image_urls: Vec<String>,
    /// Deduplicated in first-seen order, at most `max_links` long
    pub links: Vec<String>,
    /// Whitespace-collapsed visible text, at most `text_preview_limit` chars
    pub text_preview: String,
}

/// Bounds applied to every extracted item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionLimits {
    pub max_images: usize,
    pub max_links: usize,
    pub text_preview_limit: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self::from(&HarvestConfig::default())
    }
}

impl From<&HarvestConfig> for ExtractionLimits {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            max_images: config.max_images,
            max_links: config.max_links,
            text_preview_limit: config.text_preview_limit,
        }
    }
}

/// Site-specific selectors tried ahead of the generic candidates
#[derive(Debug, Clone, Default)]
pub struct SiteSelectors {
    pub title: Option<Selector>,
    pub description: Option<Selector>,
    /// Tried before the page-wide `img` scan, which runs only if this finds nothing
    pub images: Option<Selector>,
}

impl SiteSelectors {
    pub fn from_entry(entry: &SiteEntry) -> Result<Self, ConfigError> {
        Ok(Self {
            title: parse_selector(entry.title_selector.as_deref())?,
            description: parse_selector(entry.description_selector.as_deref())?,
            images: parse_selector(entry.image_selector.as_deref())?,
        })
    }
}

fn parse_selector(css: Option<&str>) -> Result<Option<Selector>, ConfigError> {
    css.map(|css| {
        Selector::parse(css)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", css, e)))
    })
    .transpose()
}

/// Extracts an item from already-fetched HTML
///
/// This is deterministic: the same `url` and `html` always produce an
/// identical item.
///
/// # Example
///
/// ```
/// use sumi_harvest::harvest::{extract_from_html, ExtractionLimits};
///
/// let html = r#"<html><head><title>Home</title></head><body><a href="/about">About</a></body></html>"#;
/// let item = extract_from_html("https://example.com/", html, &ExtractionLimits::default(), None).unwrap();
/// assert_eq!(item.title, "Home");
/// assert_eq!(item.links, vec!["https://example.com/about".to_string()]);
/// ```
pub fn extract_from_html(
    url: &str,
    html: &str,
    limits: &ExtractionLimits,
    selectors: Option<&SiteSelectors>,
) -> Result<ExtractedItem, ExtractionError> {
    let base = Url::parse(url).map_err(|source| ExtractionError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    let document = Html::parse_document(html);

    let h1 = first_text(&document, "h1").unwrap_or_default();

    Ok(ExtractedItem {
        url: url.to_string(),
        title: extract_title(&document, selectors).unwrap_or_default(),
        description: extract_description(&document, selectors).unwrap_or_default(),
        h1,
        canonical_url: extract_canonical(&document, &base).unwrap_or_default(),
        open_graph: extract_open_graph(&document, &base),
        image_urls: extract_images(&document, &base, selectors, limits.max_images),
        links: extract_links(&document, &base, limits.max_links),
        text_preview: truncate_chars(&visible_text(&document), limits.text_preview_limit),
    })
}

fn extract_title(document: &Html, selectors: Option<&SiteSelectors>) -> Option<String> {
    selectors
        .and_then(|s| s.title.as_ref())
        .and_then(|selector| first_text_with(document, selector))
        .or_else(|| meta_content(document, r#"meta[property="og:title"]"#))
        .or_else(|| {
            select_first(document, "title")
                .map(|element| element.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .or_else(|| first_text(document, "h1"))
}

fn extract_description(document: &Html, selectors: Option<&SiteSelectors>) -> Option<String> {
    selectors
        .and_then(|s| s.description.as_ref())
        .and_then(|selector| first_text_with(document, selector))
        .or_else(|| meta_content(document, r#"meta[property="og:description"]"#))
        .or_else(|| meta_content(document, r#"meta[name="description"]"#))
        .or_else(|| first_text(document, "p"))
}

fn extract_canonical(document: &Html, base: &Url) -> Option<String> {
    let selector = Selector::parse(r#"link[rel~="canonical"][href]"#).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| resolve_reference(base, href))
}

fn extract_open_graph(document: &Html, base: &Url) -> BTreeMap<String, String> {
    let mut open_graph = BTreeMap::new();

    let Ok(selector) = Selector::parse(r#"meta[property^="og:"]"#) else {
        return open_graph;
    };

    for element in document.select(&selector) {
        let property = element.value().attr("property").unwrap_or("").trim();
        let content = element.value().attr("content").unwrap_or("").trim();
        if property.is_empty() || content.is_empty() {
            continue;
        }

        let content = if property == "og:image" {
            resolve_reference(base, content).unwrap_or_else(|| content.to_string())
        } else {
            content.to_string()
        };

        open_graph.insert(property.to_string(), content);
    }

    open_graph
}

fn extract_images(
    document: &Html,
    base: &Url,
    selectors: Option<&SiteSelectors>,
    limit: usize,
) -> Vec<String> {
    let mut candidates = Vec::new();

    if let Some(og_image) = meta_content(document, r#"meta[property="og:image"]"#) {
        candidates.extend(resolve_reference(base, &og_image));
    }

    let site_images = selectors
        .and_then(|s| s.images.as_ref())
        .map(|selector| image_sources(document, selector, base))
        .unwrap_or_default();

    // A site selector that matches nothing falls back to every <img>
    if site_images.is_empty() {
        if let Ok(selector) = Selector::parse("img") {
            candidates.extend(image_sources(document, &selector, base));
        }
    } else {
        candidates.extend(site_images);
    }

    dedupe_and_truncate(candidates, limit)
}

fn image_sources(document: &Html, selector: &Selector, base: &Url) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| resolve_reference(base, src))
        .collect()
}

fn extract_links(document: &Html, base: &Url, limit: usize) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let links = document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_reference(base, href));

    dedupe_and_truncate(links, limit)
}

/// Collects all text outside hidden elements, whitespace-collapsed
fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });

        if !hidden {
            parts.push(&**text);
        }
    }

    collapse_whitespace(&parts.join(" "))
}

/// Keeps the first occurrence of each entry, stopping at `limit` entries
fn dedupe_and_truncate<I>(candidates: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for candidate in candidates {
        if out.len() >= limit {
            break;
        }
        if seen.insert(candidate.clone()) {
            out.push(candidate);
        }
    }

    out
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

/// Text of the first element matching `css`, if non-empty
fn first_text(document: &Html, css: &str) -> Option<String> {
    select_first(document, css)
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn first_text_with(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Trimmed `content` of the first element matching `css`, if non-empty
fn meta_content(document: &Html, css: &str) -> Option<String> {
    select_first(document, css)
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, limit: usize) -> String {
    let truncated: String = text.chars().take(limit).collect();
    truncated.trim_end().to_string()
}
