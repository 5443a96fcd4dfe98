//! Extractor selection
//!
//! Extractors form an ordered list scanned linearly: site-specific ones in
//! configuration order, then the generic extractor, which accepts every URL.

use crate::config::Config;
use crate::harvest::extractor::{extract_from_html, ExtractedItem, ExtractionLimits, SiteSelectors};
use crate::harvest::fetcher::HttpClient;
use crate::harvest::render::WebDriverRenderer;
use crate::url::{extract_host, matches_domain_pattern};
use crate::{ConfigError, ExtractionError};

/// Where page HTML comes from
#[derive(Debug, Clone)]
pub enum PageSource {
    /// Plain GET through the retrying HTTP client
    Http(HttpClient),
    /// Browser-rendered through a WebDriver endpoint
    Rendered(WebDriverRenderer),
}

impl PageSource {
    pub async fn fetch_html(&self, url: &str) -> Result<String, ExtractionError> {
        match self {
            Self::Http(client) => {
                client
                    .fetch_text(url)
                    .await
                    .map_err(|source| ExtractionError::Fetch {
                        url: url.to_string(),
                        source,
                    })
            }
            Self::Rendered(renderer) => renderer.render(url).await,
        }
    }
}

/// Fallback extractor that accepts any URL
#[derive(Debug, Clone)]
pub struct GenericExtractor {
    source: PageSource,
    limits: ExtractionLimits,
}

impl GenericExtractor {
    pub fn new(source: PageSource, limits: ExtractionLimits) -> Self {
        Self { source, limits }
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractedItem, ExtractionError> {
        let html = self.source.fetch_html(url).await?;
        extract_from_html(url, &html, &self.limits, None)
    }
}

/// Extractor bound to a domain pattern with its own selectors
#[derive(Debug, Clone)]
pub struct SiteExtractor {
    domain: String,
    selectors: SiteSelectors,
    source: PageSource,
    limits: ExtractionLimits,
}

impl SiteExtractor {
    pub fn new(
        domain: impl Into<String>,
        selectors: SiteSelectors,
        source: PageSource,
        limits: ExtractionLimits,
    ) -> Self {
        Self {
            domain: domain.into(),
            selectors,
            source,
            limits,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn supports(&self, url: &str) -> bool {
        extract_host(url).is_some_and(|host| matches_domain_pattern(&self.domain, &host))
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractedItem, ExtractionError> {
        let html = self.source.fetch_html(url).await?;
        extract_from_html(url, &html, &self.limits, Some(&self.selectors))
    }
}

/// One entry of the extractor list
#[derive(Debug, Clone)]
pub enum Extractor {
    Site(SiteExtractor),
    Generic(GenericExtractor),
}

impl Extractor {
    /// Returns true if this extractor handles `url`
    pub fn supports(&self, url: &str) -> bool {
        match self {
            Self::Site(site) => site.supports(url),
            Self::Generic(_) => true,
        }
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractedItem, ExtractionError> {
        match self {
            Self::Site(site) => site.extract(url).await,
            Self::Generic(generic) => generic.extract(url).await,
        }
    }

    /// Short label for logs
    pub fn name(&self) -> &str {
        match self {
            Self::Site(site) => site.domain(),
            Self::Generic(_) => "generic",
        }
    }
}

/// Ordered extractor list with a guaranteed generic fallback
#[derive(Debug, Clone)]
pub struct ExtractorRegistry {
    extractors: Vec<Extractor>,
    fallback: Extractor,
}

impl ExtractorRegistry {
    pub fn new(fallback: GenericExtractor) -> Self {
        Self {
            extractors: Vec::new(),
            fallback: Extractor::Generic(fallback),
        }
    }

    /// Builds the registry from `[[site]]` entries, in file order
    ///
    /// Sites with `render = true` use `renderer`; everything else shares
    /// `http`.
    pub fn from_config(
        config: &Config,
        http: HttpClient,
        renderer: Option<WebDriverRenderer>,
    ) -> Result<Self, ConfigError> {
        let limits = ExtractionLimits::from(&config.harvest);
        let mut registry = Self::new(GenericExtractor::new(PageSource::Http(http.clone()), limits));

        for site in &config.sites {
            let source = match (&renderer, site.render) {
                (Some(renderer), true) => PageSource::Rendered(renderer.clone()),
                (None, true) => {
                    return Err(ConfigError::Validation(format!(
                        "site '{}' needs a renderer but none is configured",
                        site.domain
                    )))
                }
                (_, false) => PageSource::Http(http.clone()),
            };

            let selectors = SiteSelectors::from_entry(site)?;
            registry.push(Extractor::Site(SiteExtractor::new(
                site.domain.clone(),
                selectors,
                source,
                limits,
            )));
        }

        Ok(registry)
    }

    /// Appends an extractor; it is consulted before the generic fallback
    pub fn push(&mut self, extractor: Extractor) {
        self.extractors.push(extractor);
    }

    /// Returns the first extractor supporting `url`
    pub fn select(&self, url: &str) -> &Extractor {
        self.extractors
            .iter()
            .find(|extractor| extractor.supports(url))
            .unwrap_or(&self.fallback)
    }

    /// Number of extractors, the fallback included
    pub fn len(&self) -> usize {
        self.extractors.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}
