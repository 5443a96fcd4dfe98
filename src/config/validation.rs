use crate::config::types::{Config, HarvestConfig, HttpConfig, RenderConfig, SiteEntry};
use crate::ConfigError;
use scraper::Selector;
use std::time::Duration;
use url::Url;

/// Validates the entire configuration
///
/// Called after CLI overrides are applied, so every value reaching the
/// harvester has passed through here.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_http_config(&config.http)?;
    if let Some(render) = &config.render {
        validate_render_config(render)?;
    }
    validate_sites(&config.sites, config.render.is_some())?;
    Ok(())
}

fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    // Also rules out NaN, infinities and values too large for a Duration
    if Duration::try_from_secs_f64(config.min_interval_seconds).is_err() {
        return Err(ConfigError::Validation(format!(
            "min_interval_seconds must be a non-negative number of representable seconds, got {}",
            config.min_interval_seconds
        )));
    }

    if let Some(only_domain) = &config.only_domain {
        if only_domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "only_domain cannot be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.fetch_timeout_seconds < 1 || config.image_timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got fetch={}s image={}s",
            config.fetch_timeout_seconds, config.image_timeout_seconds
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.initial_backoff_ms > config.max_backoff_ms {
        return Err(ConfigError::Validation(format!(
            "initial_backoff_ms ({}) cannot exceed max_backoff_ms ({})",
            config.initial_backoff_ms, config.max_backoff_ms
        )));
    }

    Ok(())
}

fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.webdriver_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "webdriver_url '{}' must use http or https",
            config.webdriver_url
        )));
    }

    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(
            "render timeout_seconds must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_sites(sites: &[SiteEntry], has_renderer: bool) -> Result<(), ConfigError> {
    for site in sites {
        validate_domain_pattern(&site.domain)?;

        for selector in [
            &site.title_selector,
            &site.description_selector,
            &site.image_selector,
        ]
        .into_iter()
        .flatten()
        {
            validate_selector(selector)?;
        }

        if site.render && !has_renderer {
            return Err(ConfigError::Validation(format!(
                "site '{}' sets render = true but no [render] section is configured",
                site.domain
            )));
        }
    }

    Ok(())
}

fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' is malformed",
            domain
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::RenderConfig;

    fn site(domain: &str) -> SiteEntry {
        SiteEntry {
            domain: domain.to_string(),
            title_selector: None,
            description_selector: None,
            image_selector: None,
            render: false,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_domain_pattern() {
        assert!(validate_domain_pattern("example.com").is_ok());
        assert!(validate_domain_pattern("*.example.com").is_ok());
        assert!(validate_domain_pattern("localhost").is_ok());

        assert!(validate_domain_pattern("").is_err());
        assert!(validate_domain_pattern("*.").is_err());
        assert!(validate_domain_pattern(".example.com").is_err());
        assert!(validate_domain_pattern("example..com").is_err());
        assert!(validate_domain_pattern("exa mple.com").is_err());
    }

    #[test]
    fn test_negative_interval_rejected() {
        let mut config = Config::default();
        config.harvest.min_interval_seconds = -1.0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));

        config.harvest.min_interval_seconds = f64::NAN;
        assert!(validate(&config).is_err());

        config.harvest.min_interval_seconds = 0.0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_oversized_interval_rejected() {
        let mut config = Config::default();
        config.harvest.min_interval_seconds = 1e20;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));

        config.harvest.min_interval_seconds = f64::INFINITY;
        assert!(validate(&config).is_err());

        config.harvest.min_interval_seconds = 86_400.0;
        assert!(validate(&config).is_ok());
        assert_eq!(config.harvest.min_interval(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_backoff_bounds() {
        let mut config = Config::default();
        config.http.initial_backoff_ms = 9000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut config = Config::default();
        let mut entry = site("example.com");
        entry.title_selector = Some("h1[".to_string());
        config.sites.push(entry);

        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_render_requires_webdriver() {
        let mut config = Config::default();
        let mut entry = site("example.com");
        entry.render = true;
        config.sites.push(entry);

        assert!(validate(&config).is_err());

        config.render = Some(RenderConfig {
            webdriver_url: "http://localhost:4444".to_string(),
            timeout_seconds: 30,
        });
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_webdriver_url() {
        let mut config = Config::default();
        config.render = Some(RenderConfig {
            webdriver_url: "ftp://localhost:4444".to_string(),
            timeout_seconds: 30,
        });
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }
}
