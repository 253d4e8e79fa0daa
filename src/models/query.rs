//! Seed queries and listing pages.

use serde::{Deserialize, Serialize};

/// Lower-cases a make and replaces spaces with hyphens.
///
/// ```
/// assert_eq!(car_crawler::models::normalize_make("Alfa Romeo"), "alfa-romeo");
/// ```
pub fn normalize_make(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "-")
}

/// Like [`normalize_make`], and additionally percent-encodes `/` so models such
/// as "CR-V/HR-V" stay a single path segment.
pub fn normalize_model(raw: &str) -> String {
    normalize_make(raw).replace('/', "%2F")
}

/// One search over the catalog: a make, a model, a filter string and a page.
///
/// Make and model are stored normalized; constructing the same query twice from
/// the same raw strings always yields the same URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingQuery {
    pub make: String,
    pub model: String,
    pub query: String,
    pub page: u32,
}

impl ListingQuery {
    pub fn new(make: &str, model: &str, query: &str, page: u32) -> Self {
        Self {
            make: normalize_make(make),
            model: normalize_model(model),
            query: query.trim_start_matches(['?', '&']).to_string(),
            page,
        }
    }

    /// Copy of this query pointing at another page.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Absolute listing URL under `base_url`.
    pub fn listing_url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if self.query.is_empty() {
            format!("{}/lst/{}/{}?page={}", base, self.make, self.model, self.page)
        } else {
            format!(
                "{}/lst/{}/{}?{}&page={}",
                base, self.make, self.model, self.query, self.page
            )
        }
    }

    /// File name used when archiving this listing page.
    pub fn archive_file_name(&self) -> String {
        format!(
            "{}-{}-{}.html",
            self.make,
            self.model.replace("%2F", "_"),
            self.page
        )
    }
}

/// A fetched and harvested listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub query: ListingQuery,
    /// Only read from the first page of a query.
    pub total_pages: Option<u32>,
    pub item_links: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_make() {
        assert_eq!(normalize_make("Alfa Romeo"), "alfa-romeo");
        assert_eq!(normalize_make("BMW"), "bmw");
        assert_eq!(normalize_make("  Land Rover "), "land-rover");
    }

    #[test]
    fn test_normalize_model_encodes_slash() {
        assert_eq!(normalize_model("CR-V/HR-V"), "cr-v%2Fhr-v");
        assert_eq!(normalize_model("Grand Cherokee"), "grand-cherokee");
    }

    #[test]
    fn test_normalization_is_pure() {
        let a = ListingQuery::new("Mercedes Benz", "C 200", "sort=standard", 1);
        let b = ListingQuery::new("Mercedes Benz", "C 200", "sort=standard", 1);
        assert_eq!(a, b);
        assert_eq!(a.listing_url("https://x.test"), b.listing_url("https://x.test"));
    }

    #[test]
    fn test_listing_url_with_query() {
        let q = ListingQuery::new("Audi", "A4", "sort=standard&desc=0", 3);
        assert_eq!(
            q.listing_url("https://www.autoscout24.com/"),
            "https://www.autoscout24.com/lst/audi/a4?sort=standard&desc=0&page=3"
        );
    }

    #[test]
    fn test_listing_url_without_query() {
        let q = ListingQuery::new("Audi", "A4", "", 1);
        assert_eq!(
            q.listing_url("https://www.autoscout24.com"),
            "https://www.autoscout24.com/lst/audi/a4?page=1"
        );
    }

    #[test]
    fn test_with_page_only_changes_page() {
        let q = ListingQuery::new("Audi", "A4", "priceto=6000", 1);
        let p = q.with_page(7);
        assert_eq!(p.page, 7);
        assert_eq!(p.make, q.make);
        assert_eq!(p.model, q.model);
        assert_eq!(p.query, q.query);
    }

    #[test]
    fn test_archive_file_name() {
        let q = ListingQuery::new("Honda", "CR-V/HR-V", "", 2);
        assert_eq!(q.archive_file_name(), "honda-cr-v_hr-v-2.html");
    }
}
