use url::Url;

/// Extracts the lowercase host of a URL string, if it parses
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Returns the network location of a URL string, as written
///
/// The authority is taken verbatim from the input, so an explicit default
/// port (`:443` on https) or userinfo is kept. Unparseable input and URLs
/// without a host yield an empty string, which is what ends up in the
/// `domain` field of the item record.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::netloc;
///
/// assert_eq!(netloc("https://example.com/path"), "example.com");
/// assert_eq!(netloc("http://127.0.0.1:8080/"), "127.0.0.1:8080");
/// assert_eq!(netloc("https://example.com:443/a"), "example.com:443");
/// assert_eq!(netloc("not a url"), "");
/// ```
pub fn netloc(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    let written = url
        .trim()
        .split_once("://")
        .and_then(|(_, rest)| rest.split(['/', '\\', '?', '#']).next())
        .filter(|authority| !authority.is_empty());

    match (written, parsed.port()) {
        (Some(authority), _) => authority.to_string(),
        (None, Some(port)) => format!("{}:{}", host, port),
        (None, None) => host.to_string(),
    }
}
