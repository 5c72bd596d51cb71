// src/utils/url.rs

//! URL manipulation utilities.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Reduce a listing URL to scheme, authority and path.
///
/// Query and fragment are dropped so tracking parameters do not change a
/// listing's identity. Unparseable input is cut at the first `?` or `#`.
///
/// # Examples
/// ```
/// use listing_watcher::utils::url::normalize;
///
/// assert_eq!(
///     normalize("https://example.com/item_1?context=abc#photos"),
///     "https://example.com/item_1"
/// );
/// ```
pub fn normalize(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            url[..end].to_string()
        }
    }
}

/// Make a listing href absolute against the marketplace origin.
///
/// # Examples
/// ```
/// use listing_watcher::utils::url::resolve;
///
/// assert_eq!(
///     resolve("https://example.com", "/moskva/item_1"),
///     "https://example.com/moskva/item_1"
/// );
/// ```
pub fn resolve(base: &str, href: &str) -> String {
    // Already absolute
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    match Url::parse(base).and_then(|b| b.join(href)) {
        Ok(joined) => joined.to_string(),
        Err(_) => format!("{}{}", base.trim_end_matches('/'), href),
    }
}

/// Extract the numeric listing id marketplaces append to listing paths
/// (`/moskva/videokarty/rx_580_4012345678`).
pub fn extract_listing_id(url: &str) -> Option<String> {
    static TRAILING_ID: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = TRAILING_ID
        .get_or_init(|| Regex::new(r"_(\d{5,})/?$").ok())
        .as_ref()?;

    let path = normalize(url);
    pattern
        .captures(&path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
