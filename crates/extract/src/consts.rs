use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Every catalog data script wraps its JSON payload in the same IIFE-style
/// call; anything not starting with this marker is unrelated page script.
pub(crate) const PAYLOAD_GUARD: &str = "catpagejs(";

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Start of an embedded payload: an object opening at a known key prefix
// ("s1" on the composer index, "p<N>" on category pages).
regex!(PAYLOAD_KEY_REGEX, r#"\{"(?:s|p)\d+":"#);

// Scripts carrying the composer index payload on the catalog root.
selector!(INDEX_SCRIPT_SELECTOR, "div.mw-content-ltr > div > script");
// Scripts carrying per-relation works payloads, one per category tab.
selector!(WORKS_SCRIPT_SELECTOR, "div.jq-ui-tabs > div > script");

// Score listing on a work page.
selector!(SCORE_TABS_SELECTOR, "div#wpscore_tabs > div.jq-ui-tabs");
selector!(SCORE_BLOCK_SELECTOR, "div.we > div[id]");
selector!(TYPED_LINK_SELECTOR, "span.mh555 > a[title]");
selector!(TITLE_SPAN_SELECTOR, "span[title]");
selector!(ANCHOR_SELECTOR, "a");

// Interstitial download pages.
selector!(PAGE_TITLE_SELECTOR, "head > title");
selector!(MIRROR_LINK_SELECTOR, "tr > td > center > a");
selector!(WAIT_SPAN_SELECTOR, "span#sm_dl_wait");
