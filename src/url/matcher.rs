/// Checks if a host matches a site domain pattern
///
/// Two pattern shapes are supported:
/// 1. Exact: "example.com" matches only "example.com"
/// 2. Wildcard: "*.example.com" matches "example.com" and any subdomain of it
///
/// Comparison is ASCII case-insensitive and ignores a trailing root dot on
/// the host, so "Shop.Example.COM." still matches "*.example.com".
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::matches_domain_pattern;
///
/// assert!(matches_domain_pattern("example.com", "example.com"));
/// assert!(!matches_domain_pattern("example.com", "blog.example.com"));
///
/// assert!(matches_domain_pattern("*.example.com", "example.com"));
/// assert!(matches_domain_pattern("*.example.com", "api.v2.example.com"));
/// assert!(!matches_domain_pattern("*.example.com", "notexample.com"));
/// ```
pub fn matches_domain_pattern(pattern: &str, host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host).to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();

    if host.is_empty() {
        return false;
    }

    match pattern.strip_prefix("*.") {
        Some(base) => host == base || host.ends_with(&format!(".{}", base)),
        None => host == pattern,
    }
}
