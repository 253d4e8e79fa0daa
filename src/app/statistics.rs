//! End-of-run statistics.

use std::fmt::Display;
use std::hash::Hash;

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{Counters, ProcessingStats};
use crate::scheduler::CrawlReport;

fn log_counters<K>(title: &str, counters: &Counters<K>)
where
    K: IntoEnumIterator + Copy + Eq + Hash + Display,
{
    let total = counters.total();
    if total == 0 {
        return;
    }
    info!("{} ({} total):", title, total);
    for (key, count) in counters.non_zero() {
        info!("   {}: {}", key, count);
    }
}

/// Logs every non-zero error, warning and info counter.
pub fn print_error_statistics(stats: &ProcessingStats) {
    log_counters("Error Counts", stats.errors());
    log_counters("Warning Counts", stats.warnings());
    log_counters("Info Counts", stats.info());
}

/// One-line summary of a finished crawl.
pub fn print_report(report: &CrawlReport) {
    info!("Crawl finished: {}", report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::{ErrorType, InfoType, WarningType};

    #[test]
    fn test_print_error_statistics_empty() {
        print_error_statistics(&ProcessingStats::new());
    }

    #[test]
    fn test_print_error_statistics_all_kinds() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::DetailFetchError);
        stats.increment_error(ErrorType::HttpRequestTimeoutError);
        stats.increment_warning(WarningType::MissingPrice);
        stats.increment_info(InfoType::CacheHit);
        print_error_statistics(&stats);
        assert_eq!(stats.errors().total(), 2);
    }

    #[test]
    fn test_print_report() {
        print_report(&CrawlReport::default());
    }
}
