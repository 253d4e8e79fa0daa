//! car_crawler library: paginated vehicle-listing crawler
//!
//! This library crawls the result pages of a vehicle marketplace, follows every
//! listing link, extracts one structured [`CarRecord`] per vehicle (optionally
//! enriched with similar listings from a GraphQL endpoint) and hands the
//! records to a [`RecordSink`] such as SQLite or CSV.
//!
//! # Example
//!
//! ```no_run
//! use car_crawler::{run_crawl, Config, ListingQuery, SeedSource};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     seed: Some(SeedSource::Single(ListingQuery::new("Alfa Romeo", "Giulia", "sort=standard", 1))),
//!     csv_output: Some(std::path::PathBuf::from("giulia.csv")),
//!     detail_concurrency: 4,
//!     ..Default::default()
//! };
//!
//! let report = car_crawler::run_crawl(config).await?;
//! println!("{} records from {} listing pages",
//!          report.records_accepted, report.listing_pages_fetched);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

mod app;
pub mod config;
pub mod enrichment;
mod error_handling;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod initialization;
pub mod models;
pub mod pagination;
pub mod scheduler;
pub mod seed;
pub mod sink;
pub mod storage;
pub mod taxonomy;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, SeedSource, WriteMode};
pub use error_handling::{
    ConfigError, Counters, DatabaseError, ErrorType, InfoType, InitializationError, ProcessingStats,
    WarningType,
};
pub use export::{export_db_to_csv, read_csv_records, CsvSink};
pub use models::{CarRecord, ListingQuery};
pub use run::{build_sink, run_crawl, run_crawl_with_sink};
pub use scheduler::{CrawlReport, Scheduler};
pub use sink::{FanoutSink, RecordSink, SinkError};
pub use storage::SqliteSink;

// Internal run module (wires the crawl pipeline together)
mod run {
    use std::sync::Arc;
    use std::time::Instant;

    use anyhow::{Context, Result};
    use log::{info, warn};
    use tokio_util::sync::CancellationToken;

    use crate::app::{
        log_progress, print_error_statistics, print_report, shutdown_gracefully,
        spawn_progress_logger,
    };
    use crate::config::Config;
    use crate::enrichment::EnrichmentClient;
    use crate::error_handling::{ConfigError, ProcessingStats};
    use crate::export::CsvSink;
    use crate::fetch::{Fetcher, ResponseCache};
    use crate::initialization::{init_client, init_rate_limiter};
    use crate::scheduler::{CrawlReport, Scheduler};
    use crate::seed::resolve_seeds;
    use crate::sink::{FanoutSink, RecordSink};
    use crate::storage::SqliteSink;

    /// Opens every sink named in `config`.
    ///
    /// One sink is returned as-is; two are wrapped in a [`FanoutSink`].
    ///
    /// # Errors
    ///
    /// Fails if no sink is configured or a sink can't be created.
    pub async fn build_sink(config: &Config) -> Result<Arc<dyn RecordSink>> {
        let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();

        if let Some(db_path) = &config.db_path {
            let sink = SqliteSink::open(db_path, config.write_mode)
                .await
                .with_context(|| format!("Failed to open database {}", db_path.display()))?;
            info!("Writing records to {} ({:?})", db_path.display(), config.write_mode);
            sinks.push(Box::new(sink));
        }
        if let Some(csv_path) = &config.csv_output {
            let sink = CsvSink::create(csv_path)
                .with_context(|| format!("Failed to create {}", csv_path.display()))?;
            info!("Writing records to {}", csv_path.display());
            sinks.push(Box::new(sink));
        }

        match sinks.len() {
            0 => Err(ConfigError::NoSinkConfigured.into()),
            1 => Ok(Arc::from(sinks.remove(0))),
            _ => Ok(Arc::new(FanoutSink::new(sinks))),
        }
    }

    /// Runs a crawl into the sinks configured in `config`.
    ///
    /// Ctrl-C stops scheduling new work; in-flight records are still written.
    /// The sinks are closed before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, seeds can't be loaded or
    /// a sink or the HTTP client can't be initialized. Individual page and
    /// record failures are counted in the report instead.
    pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
        config.validate()?;
        let sink = build_sink(&config).await?;

        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        let signal_task = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing in-flight work");
                interrupt.cancel();
            }
        });

        let result = run_crawl_with_sink(config, Arc::clone(&sink), cancel).await;
        signal_task.abort();

        if let Err(e) = sink.close().await {
            warn!("Failed to close record sink: {}", e);
        }
        result
    }

    /// Runs a crawl into a caller-supplied sink.
    ///
    /// The sink is not closed. Cancelling `cancel` stops the crawl early.
    pub async fn run_crawl_with_sink(
        config: Config,
        sink: Arc<dyn RecordSink>,
        cancel: CancellationToken,
    ) -> Result<CrawlReport> {
        config.validate_pipeline()?;
        let seed_source = config.seed.as_ref().ok_or(ConfigError::MissingSeed)?;
        let seeds = resolve_seeds(seed_source)?;
        info!("Crawling {} seed quer{}", seeds.len(), if seeds.len() == 1 { "y" } else { "ies" });

        if let Some(dir) = &config.save_pages {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create page archive {}", dir.display()))?;
        }

        let stats = Arc::new(ProcessingStats::new());
        let client = init_client(&config).context("Failed to initialize HTTP client")?;

        let cache = match &config.cache_dir {
            Some(dir) => ResponseCache::with_dir(dir)
                .await
                .with_context(|| format!("Failed to create cache directory {}", dir.display()))?,
            None => ResponseCache::new(),
        };

        let burst = if config.rate_limit_rps > 0 {
            config
                .detail_concurrency
                .min(config.rate_limit_rps as usize * 2)
        } else {
            config.detail_concurrency
        };
        let (rate_limiter, rate_limiter_shutdown) = match init_rate_limiter(config.rate_limit_rps, burst) {
            Some((limiter, shutdown)) => {
                info!("Rate limiting to {} requests/s (burst {})", config.rate_limit_rps, burst);
                (Some(limiter), Some(shutdown))
            }
            None => (None, None),
        };

        let fetcher = Fetcher::new(client, Arc::new(cache), Arc::clone(&stats))
            .with_rate_limiter(rate_limiter)
            .with_retry_delay(config.retry_initial_delay_ms);

        let enrichment = if config.enable_enrichment {
            if config.enrichment_auth.is_none() {
                info!("No enrichment credential set; requests are sent unauthenticated");
            }
            Some(EnrichmentClient::new(&config).context("Failed to initialize enrichment client")?)
        } else {
            info!("Enrichment disabled");
            None
        };

        let scheduler =
            Arc::new(Scheduler::new(&config, fetcher, enrichment, Arc::clone(&stats)).with_cancel_token(cancel));

        let start = Instant::now();
        let logging_cancel = CancellationToken::new();
        let logging_task = spawn_progress_logger(start, scheduler.counters(), logging_cancel.clone());

        let report = Arc::clone(&scheduler).run(seeds, sink).await;

        shutdown_gracefully(logging_cancel, Some(logging_task), rate_limiter_shutdown).await;
        log_progress(start, &scheduler.counters());
        print_error_statistics(&stats);
        print_report(&report);

        Ok(report)
    }
}
