//! Configuration types.
//!
//! This module defines the library-level `Config` struct (no CLI dependencies
//! beyond the `ValueEnum` derives) and its startup validation.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::*;
use crate::error_handling::ConfigError;
use crate::models::ListingQuery;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Where the crawl's seed queries come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// A single make/model/query/page tuple given at invocation.
    Single(ListingQuery),
    /// A CSV table with `make_name` and `model` columns; every row is crawled
    /// with `query` as its filter string, starting at page 1.
    File { path: PathBuf, query: String },
}

/// How the SQLite sink treats a record whose `url` is already stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum WriteMode {
    /// Insert every record, keeping earlier observations of the same listing.
    #[default]
    Append,
    /// Replace the stored row for the same `url`.
    Upsert,
}

/// Library configuration.
///
/// # Examples
///
/// ```no_run
/// use car_crawler::{Config, SeedSource, ListingQuery};
/// use std::path::PathBuf;
///
/// let config = Config {
///     seed: Some(SeedSource::Single(ListingQuery::new("Audi", "A4", "sort=standard", 1))),
///     csv_output: Some(PathBuf::from("cars.csv")),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Seed queries for this run
    pub seed: Option<SeedSource>,

    /// Catalog origin used to build listing URLs
    pub base_url: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// SQLite database path (SQLite sink disabled when `None`)
    pub db_path: Option<PathBuf>,

    /// Append or upsert into the SQLite sink
    pub write_mode: WriteMode,

    /// CSV output path (CSV sink disabled when `None`)
    pub csv_output: Option<PathBuf>,

    /// Maximum concurrent listing-page fetches
    pub listing_concurrency: usize,

    /// Maximum concurrent detail-page fetches
    pub detail_concurrency: usize,

    /// Maximum concurrent enrichment calls
    pub enrichment_concurrency: usize,

    /// Capacity of the channels between pipeline stages
    pub queue_capacity: usize,

    /// Per-request timeout in seconds for page fetches
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Requests per second across all page fetches (0 disables rate limiting)
    pub rate_limit_rps: u32,

    /// Directory for the persistent response cache (memory-only when `None`)
    pub cache_dir: Option<PathBuf>,

    /// Directory where raw listing pages are archived as `{make}-{model}-{page}.html`
    pub save_pages: Option<PathBuf>,

    /// Whether detail records are enriched with similar listings
    pub enable_enrichment: bool,

    /// Enrichment GraphQL endpoint
    pub enrichment_endpoint: String,

    /// Optional `Authorization` header value for the enrichment endpoint
    pub enrichment_auth: Option<String>,

    /// Locale sent with enrichment queries
    pub enrichment_locale: String,

    /// Enrichment request timeout in seconds
    pub enrichment_timeout_seconds: u64,

    /// First retry delay for page fetches in milliseconds
    pub retry_initial_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: None,
            write_mode: WriteMode::Append,
            csv_output: None,
            listing_concurrency: DEFAULT_LISTING_CONCURRENCY,
            detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
            enrichment_concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit_rps: 0,
            cache_dir: None,
            save_pages: None,
            enable_enrichment: true,
            enrichment_endpoint: DEFAULT_ENRICHMENT_ENDPOINT.to_string(),
            enrichment_auth: None,
            enrichment_locale: DEFAULT_ENRICHMENT_LOCALE.to_string(),
            enrichment_timeout_seconds: DEFAULT_ENRICHMENT_TIMEOUT_SECS,
            retry_initial_delay_ms: RETRY_INITIAL_DELAY_MS,
        }
    }
}

impl Config {
    /// Checks everything that can be checked before the first fetch.
    ///
    /// These are the only errors allowed to abort a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_pipeline()?;

        if self.db_path.is_none() && self.csv_output.is_none() {
            return Err(ConfigError::NoSinkConfigured);
        }

        Ok(())
    }

    /// Everything [`Config::validate`] checks except the sink outputs, for
    /// callers that bring their own sink.
    pub fn validate_pipeline(&self) -> Result<(), ConfigError> {
        match &self.seed {
            None => return Err(ConfigError::MissingSeed),
            Some(SeedSource::Single(query)) => {
                if query.make.is_empty() || query.model.is_empty() {
                    return Err(ConfigError::EmptyMakeOrModel);
                }
                if query.page == 0 {
                    return Err(ConfigError::InvalidPage);
                }
            }
            Some(SeedSource::File { path, .. }) => {
                if !path.exists() {
                    return Err(ConfigError::SeedFileNotFound(path.clone()));
                }
            }
        }

        if self.listing_concurrency == 0 || self.detail_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.enable_enrichment && self.enrichment_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }

        url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl(self.base_url.clone(), e))?;
        if self.enable_enrichment {
            url::Url::parse(&self.enrichment_endpoint)
                .map_err(|e| ConfigError::InvalidUrl(self.enrichment_endpoint.clone(), e))?;
        }

        Ok(())
    }
}
