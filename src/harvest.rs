//! Detail-link harvesting from listing pages.

use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

const ITEM_LINK_SELECTOR_STR: &str = "div[class*=\"ListItem_header\"] > a[href]";

static ITEM_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    crate::utils::parse_selector_unsafe(ITEM_LINK_SELECTOR_STR, "ITEM_LINK_SELECTOR")
});

/// Collects detail-page URLs from one listing page.
///
/// Anchors that are direct children of a listing-row header are resolved
/// against `page_url` and returned in document order. Duplicates within the page
/// are dropped (exact string match after resolution); cross-page duplicates are
/// the scheduler's business. Hrefs that do not resolve are skipped.
pub fn harvest(document: &Html, page_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&ITEM_LINK_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() {
            continue;
        }
        match page_url.join(href) {
            Ok(resolved) => {
                let resolved = resolved.to_string();
                if seen.insert(resolved.clone()) {
                    links.push(resolved);
                }
            }
            Err(e) => {
                log::debug!("Skipping unresolvable href '{}' on {}: {}", href, page_url, e);
            }
        }
    }

    links
}
