//! Run counters and the final report.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// Outcome of one crawl.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlReport {
    pub listing_pages_fetched: usize,
    pub listing_pages_failed: usize,
    pub detail_pages_extracted: usize,
    pub detail_pages_failed: usize,
    pub duplicates_skipped: usize,
    pub records_accepted: usize,
    pub records_dropped: usize,
    pub enrichment_failures: usize,
    pub elapsed_seconds: f64,
}

impl std::fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} listing pages ({} failed), {} detail pages ({} failed), {} duplicates skipped, \
             {} records stored ({} dropped), {} enrichment failures in {:.1}s",
            self.listing_pages_fetched,
            self.listing_pages_failed,
            self.detail_pages_extracted,
            self.detail_pages_failed,
            self.duplicates_skipped,
            self.records_accepted,
            self.records_dropped,
            self.enrichment_failures,
            self.elapsed_seconds
        )
    }
}

/// Live counters updated by the pipeline stages.
#[derive(Debug, Default)]
pub struct CrawlCounters {
    pub listing_pages_fetched: AtomicUsize,
    pub listing_pages_failed: AtomicUsize,
    pub detail_pages_extracted: AtomicUsize,
    pub detail_pages_failed: AtomicUsize,
    pub duplicates_skipped: AtomicUsize,
    pub records_accepted: AtomicUsize,
    pub records_dropped: AtomicUsize,
}

impl CrawlCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self, enrichment_failures: usize, elapsed_seconds: f64) -> CrawlReport {
        CrawlReport {
            listing_pages_fetched: self.listing_pages_fetched.load(Ordering::SeqCst),
            listing_pages_failed: self.listing_pages_failed.load(Ordering::SeqCst),
            detail_pages_extracted: self.detail_pages_extracted.load(Ordering::SeqCst),
            detail_pages_failed: self.detail_pages_failed.load(Ordering::SeqCst),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::SeqCst),
            records_accepted: self.records_accepted.load(Ordering::SeqCst),
            records_dropped: self.records_dropped.load(Ordering::SeqCst),
            enrichment_failures,
            elapsed_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reads_counters() {
        let counters = CrawlCounters::new();
        CrawlCounters::bump(&counters.listing_pages_fetched);
        CrawlCounters::bump(&counters.records_accepted);
        CrawlCounters::bump(&counters.records_accepted);

        let report = counters.snapshot(1, 2.5);
        assert_eq!(report.listing_pages_fetched, 1);
        assert_eq!(report.records_accepted, 2);
        assert_eq!(report.enrichment_failures, 1);
        assert_eq!(report.detail_pages_failed, 0);
        assert!(report.to_string().contains("2 records stored"));
    }
}
