//! Listing pagination.
//!
//! The first page of a query carries the navigation block from which the total
//! page count is read; everything else about a query's pages is derived from
//! the seed.

use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::models::ListingQuery;

const PAGINATION_ITEM_SELECTOR_STR: &str = "nav[aria-label=\"Pagination\"] li";

static PAGINATION_ITEM_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    crate::utils::parse_selector_unsafe(PAGINATION_ITEM_SELECTOR_STR, "PAGINATION_ITEM_SELECTOR")
});

/// Reads the total number of result pages from a listing page.
///
/// The last item of the pagination navigation whose text is a positive integer
/// wins; "next"/"previous" controls and ellipses are skipped. Returns `None`
/// when there is no navigation block or none of its items is a number, which
/// callers treat as "nothing beyond the seed page".
pub fn parse_total_pages(document: &Html) -> Option<u32> {
    document
        .select(&PAGINATION_ITEM_SELECTOR)
        .filter_map(|li| {
            crate::utils::collapse_whitespace(&li.text().collect::<String>())
                .parse::<u32>()
                .ok()
        })
        .filter(|n| *n > 0)
        .last()
}

/// Lazy sequence of listing queries for pages `1..=total`.
#[derive(Debug, Clone)]
pub struct PagePlan {
    seed: ListingQuery,
    next: u32,
    last: u32,
}

impl Iterator for PagePlan {
    type Item = ListingQuery;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == 0 || self.next > self.last {
            return None;
        }
        let page = self.seed.with_page(self.next);
        self.next = self.next.checked_add(1).unwrap_or(0);
        Some(page)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.next == 0 || self.next > self.last {
            0
        } else {
            (self.last - self.next + 1) as usize
        };
        (remaining, Some(remaining))
    }
}

/// Plans every page of `seed`'s result set.
///
/// Each planned query differs from the seed only in `page`. A missing count
/// yields an empty plan. No upper bound is applied here.
pub fn plan(seed: &ListingQuery, total_pages: Option<u32>) -> PagePlan {
    PagePlan {
        seed: seed.clone(),
        next: 1,
        last: total_pages.unwrap_or(0),
    }
}
