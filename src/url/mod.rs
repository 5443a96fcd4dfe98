//! URL handling module for Sumi-Harvest
//!
//! This module provides site domain-pattern matching, network-location
//! extraction, relative reference resolution, and the slugs used to name
//! per-item output directories.

mod domain;
mod matcher;
mod slug;

pub use domain::{extract_host, netloc};
pub use matcher::matches_domain_pattern;
pub use slug::{item_dir_name, slugify};

use url::Url;

/// Resolves a (possibly relative) reference against a page URL
///
/// The reference is trimmed first. Empty references and references the
/// `url` crate cannot join yield `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_harvest::url::resolve_reference;
///
/// let base = Url::parse("http://example.com/dir/page").unwrap();
/// assert_eq!(
///     resolve_reference(&base, " /a.jpg "),
///     Some("http://example.com/a.jpg".to_string())
/// );
/// assert_eq!(
///     resolve_reference(&base, "b.jpg"),
///     Some("http://example.com/dir/b.jpg".to_string())
/// );
/// assert_eq!(resolve_reference(&base, "   "), None);
/// ```
pub fn resolve_reference(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    base.join(reference).ok().map(|u| u.to_string())
}
