//! Fixed tables and selectors for the scraped site
//!
//! These are read-only process-wide values; nothing here has a lifecycle.

/// Listing pages crawled when no source file is given
pub const DEFAULT_LISTING_SEEDS: &[&str] = &[
    "https://myanimelist.net/topanime.php?type=tv",
    "https://myanimelist.net/topanime.php",
    "https://myanimelist.net/topanime.php?type=bypopularity",
];

/// Month abbreviations in calendar order
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Review verdict labels and their scores
pub const SENTIMENT_SCORES: &[(&str, u8)] = &[
    ("Recommended", 3),
    ("Mixed Feelings", 2),
    ("Not Recommended", 1),
];

/// Path suffix of an anime's review listing
pub const REVIEWS_SUFFIX: &str = "/reviews";

/// Entries per listing page; the `limit` query parameter is an offset in these units
pub const LISTING_PAGE_SIZE: usize = 50;

/// Elements whose presence means a human verification prompt is showing
pub const CHALLENGE_SELECTORS: &[&str] = &["#captcha-container", ".amzn-captcha-modal"];

/// Cookie consent button shown on the first visit
pub const CONSENT_BUTTON: &str = "#accept-btn";

/// Links to detail pages on a listing page
pub const LISTING_LINK: &str = ".anime_ranking_h3 > a.hoverinfo_trigger";

/// Selectors on an anime detail page
pub mod detail {
    pub const TITLE: &str = ".title-name";
    pub const ENGLISH_TITLE: &str = ".title-english";
    pub const COVER: &str = ".leftside img.lazyloaded";
    pub const SCORE: &str = ".score";
    pub const SCORE_LABEL: &str = ".score-label";
    pub const RANKED: &str = ".numbers.ranked";
    pub const POPULARITY: &str = ".numbers.popularity";
    pub const MEMBERS: &str = ".numbers.members";
    pub const SYNOPSIS: &str = "p[itemprop=\"description\"]";
    pub const GENRE: &str = "span[itemprop=\"genre\"]";

    /// Character lengths of "Ranked #", "Popularity #" and "Members "
    pub const RANKED_PREFIX_LEN: usize = 8;
    pub const POPULARITY_PREFIX_LEN: usize = 12;
    pub const MEMBERS_PREFIX_LEN: usize = 8;

    /// Credit line appended to rewritten synopses
    pub const SYNOPSIS_CREDIT: &str = "[Written by MAL Rewrite]";
}

/// Selectors on a review page
pub mod review {
    pub const TITLE: &str = ".title-name";
    pub const ENTRY: &str = ".review-element.js-review-element";
    pub const USERNAME: &str = ".username > a";
    pub const DATE: &str = ".update_at";
    pub const VERDICT: &str = ".tags > .tag:first-child";
    pub const BODY: &str = ".text";
    pub const BODY_HIDDEN: &str = ".js-hidden";
    pub const AVATAR: &str = ".thumb img.lazyloaded";
    pub const MORE_REVIEWS: &str = ".ga-click[data-ga-click-type=\"review-more-reviews\"]";

    /// Ellipsis shown in place of the collapsed part of a long review
    pub const TRUNCATION_MARKER: &str = "...";
}
