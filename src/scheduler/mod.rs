//! Crawl scheduler.
//!
//! Three stages joined by bounded channels:
//!
//! 1. Listing: fetches seed pages under the listing permit limit, reads the
//!    page count from each seed response and schedules the remaining planned
//!    pages. Every listing page's item links go to the detail channel.
//! 2. Detail: skips URLs already seen in this run, fetches under the detail
//!    permit limit, extracts, releases the permit, enriches, then sends the
//!    record on.
//! 3. Sink: one consumer calling [`RecordSink::accept`] per record.
//!
//! Cancelling the token stops new dispatches. Work already in flight finishes
//! and records already handed to the sink are kept.

mod ledger;
mod report;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use scraper::Html;
use strum::IntoEnumIterator;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::enrichment::EnrichmentClient;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats, WarningType};
use crate::extract::{extract, ExtractContext};
use crate::fetch::Fetcher;
use crate::harvest::harvest;
use crate::initialization::init_semaphore;
use crate::models::{CarRecord, ListingPage, ListingQuery};
use crate::pagination::{parse_total_pages, plan};
use crate::sink::RecordSink;

pub use ledger::{Ledger, RequestState};
pub use report::{CrawlCounters, CrawlReport};

/// A detail URL with the listing context it was found under.
#[derive(Debug, Clone)]
struct DetailJob {
    url: String,
    context: ExtractContext,
}

/// Drives one crawl run. Owns the fetcher, the ledger and the counters.
pub struct Scheduler {
    base_url: String,
    fetcher: Fetcher,
    enrichment: Option<EnrichmentClient>,
    ledger: Ledger,
    counters: Arc<CrawlCounters>,
    stats: Arc<ProcessingStats>,
    listing_permits: Arc<Semaphore>,
    detail_permits: Arc<Semaphore>,
    queue_capacity: usize,
    save_pages: Option<PathBuf>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(
        config: &Config,
        fetcher: Fetcher,
        enrichment: Option<EnrichmentClient>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            fetcher,
            enrichment,
            ledger: Ledger::new(),
            counters: Arc::new(CrawlCounters::new()),
            stats,
            listing_permits: init_semaphore(config.listing_concurrency.max(1)),
            detail_permits: init_semaphore(config.detail_concurrency.max(1)),
            queue_capacity: config.queue_capacity.max(1),
            save_pages: config.save_pages.clone(),
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned token, e.g. one tied to Ctrl-C.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn counters(&self) -> Arc<CrawlCounters> {
        Arc::clone(&self.counters)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Crawls every seed and returns the run report.
    ///
    /// Does not close the sink.
    pub async fn run(
        self: Arc<Self>,
        seeds: Vec<ListingQuery>,
        sink: Arc<dyn RecordSink>,
    ) -> CrawlReport {
        let start = Instant::now();
        let (link_tx, link_rx) = mpsc::channel::<DetailJob>(self.queue_capacity);
        let (record_tx, record_rx) = mpsc::channel::<CarRecord>(self.queue_capacity);

        tokio::join!(
            Arc::clone(&self).listing_stage(seeds, link_tx),
            Arc::clone(&self).detail_stage(link_rx, record_tx),
            self.sink_stage(record_rx, sink.as_ref()),
        );

        let counts = self.ledger.counts().await;
        for state in RequestState::iter() {
            if let Some(n) = counts.get(&state) {
                log::debug!("URLs {}: {}", state, n);
            }
        }

        self.counters.snapshot(
            self.stats.get_error_count(ErrorType::EnrichmentError),
            start.elapsed().as_secs_f64(),
        )
    }

    async fn listing_stage(self: Arc<Self>, seeds: Vec<ListingQuery>, links: mpsc::Sender<DetailJob>) {
        let mut tasks: FuturesUnordered<JoinHandle<Vec<ListingQuery>>> = FuturesUnordered::new();

        for seed in seeds {
            if self.cancel.is_cancelled() {
                log::info!("Crawl cancelled, not scheduling further seeds");
                break;
            }
            let url = seed.listing_url(&self.base_url);
            if !self.ledger.claim(&url).await {
                log::debug!("Duplicate seed {}", url);
                CrawlCounters::bump(&self.counters.duplicates_skipped);
                self.stats.increment_info(InfoType::DuplicateUrlSkipped);
                continue;
            }
            tasks.push(tokio::spawn(
                Arc::clone(&self).fetch_listing(seed, true, links.clone()),
            ));
        }

        while let Some(joined) = tasks.next().await {
            let follow_ups = match joined {
                Ok(follow_ups) => follow_ups,
                Err(join_error) => {
                    log::warn!("Listing task panicked: {:?}", join_error);
                    continue;
                }
            };
            for query in follow_ups {
                if self.cancel.is_cancelled() {
                    break;
                }
                let url = query.listing_url(&self.base_url);
                // The seed page itself is already harvested
                if !self.ledger.claim(&url).await {
                    continue;
                }
                tasks.push(tokio::spawn(
                    Arc::clone(&self).fetch_listing(query, false, links.clone()),
                ));
            }
        }
    }

    /// Fetches and harvests one listing page. Returns the follow-up pages to
    /// schedule (only for seed pages).
    async fn fetch_listing(
        self: Arc<Self>,
        query: ListingQuery,
        is_seed: bool,
        links: mpsc::Sender<DetailJob>,
    ) -> Vec<ListingQuery> {
        let url = query.listing_url(&self.base_url);
        let _permit = match Arc::clone(&self.listing_permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                log::warn!("Listing semaphore closed, skipping {}", url);
                return Vec::new();
            }
        };
        if self.cancel.is_cancelled() {
            return Vec::new();
        }

        self.ledger.advance(&url, RequestState::Fetching).await;
        let body = match self.fetcher.get(&url).await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Failed to fetch listing page {}: {:#}", url, e);
                self.ledger.advance(&url, RequestState::Failed).await;
                CrawlCounters::bump(&self.counters.listing_pages_failed);
                self.stats.increment_error(ErrorType::ListingFetchError);
                return Vec::new();
            }
        };

        if let Some(dir) = &self.save_pages {
            let path = dir.join(query.archive_file_name());
            if let Err(e) = tokio::fs::write(&path, body.as_bytes()).await {
                log::warn!("Failed to archive {} to {}: {}", url, path.display(), e);
                self.stats.increment_warning(WarningType::PageArchiveFailed);
            }
        }

        let page = parse_listing(&body, &url, query, is_seed);
        self.ledger.advance(&url, RequestState::Parsed).await;
        CrawlCounters::bump(&self.counters.listing_pages_fetched);
        log::debug!("{}: {} item links", url, page.item_links.len());

        if page.item_links.is_empty() {
            self.stats.increment_warning(WarningType::EmptyListingPage);
        }

        let context = ExtractContext::from(&page.query);
        for link in page.item_links {
            let job = DetailJob {
                url: link,
                context: context.clone(),
            };
            if links.send(job).await.is_err() {
                log::debug!("Detail stage stopped, dropping remaining links of {}", url);
                break;
            }
        }

        if !is_seed {
            return Vec::new();
        }
        if page.total_pages.is_none() {
            log::info!("No page count on {}, crawling the first page only", url);
            self.stats.increment_warning(WarningType::MissingTotalPages);
        }
        plan(&page.query, page.total_pages).collect()
    }

    async fn detail_stage(
        self: Arc<Self>,
        mut jobs: mpsc::Receiver<DetailJob>,
        records: mpsc::Sender<CarRecord>,
    ) {
        let mut tasks: FuturesUnordered<JoinHandle<()>> = FuturesUnordered::new();

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    log::info!("Crawl cancelled, no further detail pages will be dispatched");
                    break;
                }
                Some(joined) = tasks.next(), if !tasks.is_empty() => {
                    if let Err(join_error) = joined {
                        log::warn!("Detail task panicked: {:?}", join_error);
                    }
                }
                job = jobs.recv() => {
                    let Some(job) = job else { break };
                    if !self.ledger.claim(&job.url).await {
                        log::debug!("Skipping already seen {}", job.url);
                        CrawlCounters::bump(&self.counters.duplicates_skipped);
                        self.stats.increment_info(InfoType::DuplicateUrlSkipped);
                        continue;
                    }
                    let permit = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => {
                            self.ledger.advance(&job.url, RequestState::Failed).await;
                            log::info!("Crawl cancelled, no further detail pages will be dispatched");
                            break;
                        }
                        permit = Arc::clone(&self.detail_permits).acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => {
                                log::warn!("Detail semaphore closed, skipping {}", job.url);
                                continue;
                            }
                        },
                    };
                    tasks.push(tokio::spawn(
                        Arc::clone(&self).process_detail(job, permit, records.clone()),
                    ));
                }
            }
        }

        // Unblocks listing tasks waiting to send
        drop(jobs);
        drop(records);

        while let Some(joined) = tasks.next().await {
            if let Err(join_error) = joined {
                log::warn!("Detail task panicked: {:?}", join_error);
            }
        }
    }

    async fn process_detail(
        self: Arc<Self>,
        job: DetailJob,
        permit: OwnedSemaphorePermit,
        records: mpsc::Sender<CarRecord>,
    ) {
        self.ledger.advance(&job.url, RequestState::Fetching).await;
        let body = match self.fetcher.get(&job.url).await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Failed to fetch detail page {}: {:#}", job.url, e);
                self.ledger.advance(&job.url, RequestState::Failed).await;
                CrawlCounters::bump(&self.counters.detail_pages_failed);
                self.stats.increment_error(ErrorType::DetailFetchError);
                return;
            }
        };

        let mut record = {
            let document = Html::parse_document(&body);
            extract(&document, &job.url, &job.context)
        };
        drop(permit);
        self.ledger.advance(&job.url, RequestState::Extracted).await;
        CrawlCounters::bump(&self.counters.detail_pages_extracted);

        if record.price.is_none() {
            self.stats.increment_warning(WarningType::MissingPrice);
        }

        match &self.enrichment {
            Some(client) => {
                record.similar_cars = client.enrich(&job.url, &self.stats).await.items;
            }
            None => self.stats.increment_info(InfoType::EnrichmentSkipped),
        }

        if records.send(record).await.is_err() {
            log::warn!("Sink stage stopped, dropping record for {}", job.url);
            CrawlCounters::bump(&self.counters.records_dropped);
        }
    }

    async fn sink_stage(&self, mut records: mpsc::Receiver<CarRecord>, sink: &dyn RecordSink) {
        while let Some(record) = records.recv().await {
            let url = record.url.clone();
            match sink.accept(record).await {
                Ok(()) => CrawlCounters::bump(&self.counters.records_accepted),
                Err(e) => {
                    log::warn!("Dropping record for {}: {}", url, e);
                    CrawlCounters::bump(&self.counters.records_dropped);
                    self.stats.increment_error(ErrorType::SinkWriteError);
                }
            }
        }
    }
}

/// Parses a fetched listing page. The page count is only read from seeds.
fn parse_listing(body: &str, url: &str, query: ListingQuery, is_seed: bool) -> ListingPage {
    let document = Html::parse_document(body);
    let item_links = match url::Url::parse(url) {
        Ok(page_url) => harvest(&document, &page_url),
        Err(e) => {
            log::warn!("Cannot resolve links on {}: {}", url, e);
            Vec::new()
        }
    };
    let total_pages = if is_seed {
        parse_total_pages(&document)
    } else {
        None
    };
    ListingPage {
        query,
        total_pages,
        item_links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<html><body>
        <div class="ListItem_header__abc"><a href="/offers/a-1-2-3-4-5">A</a></div>
        <div class="ListItem_header__abc"><a href="/offers/b-1-2-3-4-6">B</a></div>
        <nav aria-label="Pagination"><ul><li>1</li><li>2</li><li>7</li></ul></nav>
    </body></html>"#;

    #[test]
    fn test_parse_listing_seed_reads_page_count() {
        let query = ListingQuery::new("audi", "a4", "", 1);
        let page = parse_listing(LISTING, "https://x.test/lst/audi/a4?page=1", query, true);
        assert_eq!(page.total_pages, Some(7));
        assert_eq!(
            page.item_links,
            vec![
                "https://x.test/offers/a-1-2-3-4-5",
                "https://x.test/offers/b-1-2-3-4-6"
            ]
        );
    }

    #[test]
    fn test_parse_listing_follow_up_ignores_page_count() {
        let query = ListingQuery::new("audi", "a4", "", 2);
        let page = parse_listing(LISTING, "https://x.test/lst/audi/a4?page=2", query, false);
        assert_eq!(page.total_pages, None);
        assert_eq!(page.item_links.len(), 2);
    }

    #[test]
    fn test_parse_listing_bad_url_yields_no_links() {
        let query = ListingQuery::new("audi", "a4", "", 1);
        let page = parse_listing(LISTING, "not a url", query, true);
        assert!(page.item_links.is_empty());
        assert_eq!(page.total_pages, Some(7));
    }
}
