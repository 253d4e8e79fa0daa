// Shared fixtures for the integration tests: a recording sink, minimal
// listing/detail pages in the marketplace's markup, and mock-server wiring.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use car_crawler::{CarRecord, Config, ListingQuery, RecordSink, SeedSource, SinkError};

/// Keeps every accepted record in memory.
#[derive(Default, Clone)]
#[allow(dead_code)]
pub struct MemorySink {
    pub records: Arc<Mutex<Vec<CarRecord>>>,
}

#[allow(dead_code)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .records
            .lock()
            .await
            .iter()
            .map(|r| r.url.clone())
            .collect();
        urls.sort();
        urls
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn accept(&self, record: CarRecord) -> Result<(), SinkError> {
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Path of the `index`-th detail page. The suffix is a valid correlation key.
#[allow(dead_code)]
pub fn detail_path(page: u32, index: usize) -> String {
    format!(
        "/offers/audi-a4-avant-diesel-{:08x}-1111-2222-3333-{:012x}",
        page,
        index
    )
}

/// A listing page linking to `links` with an optional pagination block.
#[allow(dead_code)]
pub fn listing_page(links: &[String], total_pages: Option<u32>) -> String {
    let mut html = String::from("<!DOCTYPE html><html><body><main>");
    for link in links {
        html.push_str(&format!(
            r#"<article><div class="ListItem_header__abc"><a href="{}">Audi A4</a></div></article>"#,
            link
        ));
    }
    html.push_str("</main>");
    if let Some(total) = total_pages {
        html.push_str(r#"<nav aria-label="Pagination"><ul><li>Previous</li>"#);
        for n in 1..=total {
            html.push_str(&format!("<li><button>{}</button></li>", n));
        }
        html.push_str("<li>Next</li></ul></nav>");
    }
    html.push_str("</body></html>");
    html
}

/// A detail page with a price and a couple of overview fields.
#[allow(dead_code)]
pub fn detail_page(price: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body>
<div class="PriceInfo"><span class="PriceInfo_price">€ {}</span></div>
<div class="VehicleOverview">
  <div class="Item"><div>Mileage</div><div>80,000 km</div></div>
  <div class="Item"><div>Gearbox</div><div>Automatic</div></div>
</div>
<dl><dt><span>Colour</span></dt><dd>Blue</dd></dl>
</body></html>"#,
        price
    )
}

/// Serves `pages` listing pages for audi/a4, each linking to `per_page`
/// detail pages, plus every detail page.
#[allow(dead_code)]
pub async fn mount_catalog(server: &MockServer, pages: u32, per_page: usize) {
    for page in 1..=pages {
        let links: Vec<String> = (0..per_page).map(|i| detail_path(page, i)).collect();
        let total = if page == 1 { Some(pages) } else { None };
        Mock::given(method("GET"))
            .and(path("/lst/audi/a4"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&links, total)))
            .expect(1)
            .mount(server)
            .await;

        for link in &links {
            Mock::given(method("GET"))
                .and(path(link.as_str()))
                .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("9,900")))
                .mount(server)
                .await;
        }
    }
}

/// Crawl configuration pointed at the mock server, enrichment off.
#[allow(dead_code)]
pub fn test_config(base_url: &str) -> Config {
    Config {
        seed: Some(SeedSource::Single(ListingQuery::new("Audi", "A4", "", 1))),
        base_url: base_url.to_string(),
        listing_concurrency: 2,
        detail_concurrency: 4,
        timeout_seconds: 5,
        user_agent: "car_crawler_test/1.0".to_string(),
        enable_enrichment: false,
        retry_initial_delay_ms: 10,
        ..Default::default()
    }
}
