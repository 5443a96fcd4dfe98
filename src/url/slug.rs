use url::Url;

/// Lowercases text and collapses every run of non `[a-z0-9]` characters into
/// a single hyphen. Returns `"item"` when nothing usable is left.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::slugify;
///
/// assert_eq!(slugify("  Hello, World!  "), "hello-world");
/// assert_eq!(slugify("---"), "item");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        "item".to_string()
    } else {
        slug
    }
}

/// Builds the per-item directory name from a URL and its 1-based position
///
/// The name is `slug(<netloc>-<path>-<index>)`, with `site` standing in for
/// a missing host and `root` for an empty path. The index keeps names unique
/// when the same URL appears twice in the input.
pub fn item_dir_name(url: &str, index: usize) -> String {
    let (host, path) = match Url::parse(url) {
        Ok(parsed) => (super::netloc(url), parsed.path().to_string()),
        Err(_) => (String::new(), url.to_string()),
    };

    let host = if host.is_empty() { "site" } else { host.as_str() };
    let path = path.trim_matches('/');
    let path = if path.is_empty() { "root" } else { path };

    slugify(&format!("{}-{}-{}", host, path, index))
}
