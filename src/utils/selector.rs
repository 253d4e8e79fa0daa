//! CSS selector parsing utilities.

use scraper::Selector;

const MATCH_NOTHING: &str = "*:not(*)";

/// Parses a selector built at runtime (e.g. from an extraction rule).
///
/// A bad selector is logged and replaced by one that matches nothing, so the
/// affected field simply comes back empty.
pub fn parse_selector_with_fallback(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        log::error!(
            "Failed to parse CSS selector '{}' in {}: {}. Field will not match.",
            selector_str,
            context,
            e
        );
        parse_selector_unsafe(MATCH_NOTHING, "fallback selector")
    })
}

/// Parses a selector that is a compile-time constant.
///
/// # Panics
///
/// Panics if the selector cannot be parsed, which is a programming error.
pub fn parse_selector_unsafe(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        panic!(
            "Failed to parse CSS selector '{}' in {}: {}. This is a programming error.",
            selector_str, context, e
        )
    })
}
