//! Text helpers over `scraper` element trees.

use scraper::ElementRef;

/// Joins whitespace runs into single spaces and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the element's direct text children only, collapsed.
///
/// `<span>€ 12,500<sup>1</sup></span>` has own text `€ 12,500`.
pub fn own_text(element: ElementRef<'_>) -> String {
    let raw: String = element
        .children()
        .filter_map(|child| child.value().as_text().map(|t| t.to_string()))
        .collect();
    collapse_whitespace(&raw)
}

/// Every descendant text node, trimmed, in document order, skipping blanks.
pub fn non_empty_text_nodes(element: ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty())
        .collect()
}
