//! URL helpers
//!
//! Comparison of effective and requested URLs, link resolution, and the URL
//! shapes of the scraped site (review listings, listing pagination).

use crate::constants::{LISTING_PAGE_SIZE, REVIEWS_SUFFIX};
use url::Url;

/// Returns true when two URLs name the same page
///
/// Both sides are parsed so that equivalent spellings (default ports, an empty
/// root path) compare equal. Unparseable input falls back to string equality.
///
/// # Examples
///
/// ```
/// use anime_harvest::url::same_page;
///
/// assert!(same_page("https://example.com", "https://example.com/"));
/// assert!(!same_page("https://example.com/a", "https://example.com/b"));
/// ```
pub fn same_page(current: &str, requested: &str) -> bool {
    match (Url::parse(current), Url::parse(requested)) {
        (Ok(current), Ok(requested)) => current == requested,
        _ => current == requested,
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - invalid URLs
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    base_url.join(href).ok().map(|url| url.to_string())
}

/// Review listing URL of an anime page
///
/// URLs already pointing at the review listing are returned unchanged.
pub fn review_target(anime_url: &str) -> String {
    if anime_url.ends_with(REVIEWS_SUFFIX) {
        anime_url.to_string()
    } else {
        format!("{}{}", anime_url.trim_end_matches('/'), REVIEWS_SUFFIX)
    }
}

/// Anime page a review listing belongs to, keeping the trailing slash
pub fn anime_page_url(review_url: &str) -> String {
    review_url
        .strip_suffix(&REVIEWS_SUFFIX[1..])
        .unwrap_or(review_url)
        .to_string()
}

/// URL of the `page_index`-th page (zero based) of a listing
///
/// Listings page through an offset passed as `limit`, in steps of
/// [`LISTING_PAGE_SIZE`]. Page 0 is the seed itself.
pub fn listing_page_url(seed: &str, page_index: usize) -> String {
    if page_index == 0 {
        return seed.to_string();
    }

    let offset = LISTING_PAGE_SIZE * page_index;
    let separator = if seed.contains('?') { '&' } else { '?' };
    format!("{}{}limit={}", seed, separator, offset)
}
