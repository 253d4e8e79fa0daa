//! Progress logging.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use log::info;
use tokio_util::sync::CancellationToken;

use crate::config::LOGGING_INTERVAL;
use crate::scheduler::CrawlCounters;

/// Logs how many pages and records have been processed so far.
pub fn log_progress(start_time: Instant, counters: &CrawlCounters) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let details = counters.detail_pages_extracted.load(Ordering::SeqCst);
    let rate = if elapsed_secs > 0.0 {
        details as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Progress: {} listing pages, {} detail pages ({} failed), {} records stored in {:.1}s (~{:.2} details/sec)",
        counters.listing_pages_fetched.load(Ordering::SeqCst),
        details,
        counters.detail_pages_failed.load(Ordering::SeqCst),
        counters.records_accepted.load(Ordering::SeqCst),
        elapsed_secs,
        rate
    );
}

/// Logs progress every [`LOGGING_INTERVAL`] until `cancel` fires.
pub fn spawn_progress_logger(
    start_time: Instant,
    counters: Arc<CrawlCounters>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LOGGING_INTERVAL);
        // First tick completes immediately
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => log_progress(start_time, &counters),
                _ = cancel.cancelled() => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_progress_logger_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let handle = spawn_progress_logger(
            Instant::now(),
            Arc::new(CrawlCounters::new()),
            cancel.clone(),
        );
        cancel.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("logger should stop")
            .expect("logger should not panic");
    }
}
