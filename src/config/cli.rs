//! Command-line interface definitions.
//!
//! The binary parses these with clap and converts `CrawlArgs` into a library
//! `Config`; the library never reads the command line itself.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::*;
use crate::config::types::{Config, LogFormat, LogLevel, SeedSource, WriteMode};
use crate::error_handling::ConfigError;
use crate::models::ListingQuery;

/// Top-level command line.
#[derive(Debug, Parser)]
#[command(
    name = "car_crawler",
    version,
    about = "Crawls paginated vehicle listings into SQLite or CSV"
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Crawl listing pages and extract one record per vehicle
    Crawl(CrawlArgs),
    /// Build a make/model seed table from the site's taxonomy
    #[command(name = "discover-models")]
    DiscoverModels(DiscoverArgs),
    /// Dump records stored in SQLite to CSV
    Export(ExportArgs),
}

/// Options for `crawl`.
#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// Vehicle make, e.g. "Alfa Romeo"
    #[arg(long, requires = "model", conflicts_with = "seed_file")]
    pub make: Option<String>,

    /// Vehicle model, e.g. "Giulia"
    #[arg(long, requires = "make")]
    pub model: Option<String>,

    /// Filter query string appended to listing URLs
    #[arg(long, default_value = DEFAULT_SEED_QUERY)]
    pub query: String,

    /// First listing page to fetch
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// CSV table with `make_name` and `model` columns
    #[arg(long)]
    pub seed_file: Option<PathBuf>,

    /// SQLite database to store records in
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Replace stored rows with the same URL instead of appending
    #[arg(long)]
    pub upsert: bool,

    /// CSV file to write records to
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Catalog origin
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Maximum concurrent listing-page fetches
    #[arg(long, default_value_t = DEFAULT_LISTING_CONCURRENCY)]
    pub listing_concurrency: usize,

    /// Maximum concurrent detail-page fetches
    #[arg(long, default_value_t = DEFAULT_DETAIL_CONCURRENCY)]
    pub detail_concurrency: usize,

    /// Maximum concurrent enrichment calls
    #[arg(long, default_value_t = DEFAULT_ENRICHMENT_CONCURRENCY)]
    pub enrichment_concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Requests per second across all page fetches (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub rate_limit_rps: u32,

    /// HTTP User-Agent header
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Persist fetched pages in this directory and reuse them across runs
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Archive raw listing pages in this directory
    #[arg(long)]
    pub save_pages: Option<PathBuf>,

    /// Skip the similar-listings lookup
    #[arg(long)]
    pub no_enrichment: bool,

    /// GraphQL endpoint for the similar-listings lookup
    #[arg(long, default_value = DEFAULT_ENRICHMENT_ENDPOINT)]
    pub enrichment_endpoint: String,

    /// Authorization header value for the enrichment endpoint
    #[arg(long, env = ENRICHMENT_AUTH_ENV, hide_env_values = true)]
    pub enrichment_auth: Option<String>,
}

impl CrawlArgs {
    /// Builds the library configuration. Seed presence is checked later by
    /// `Config::validate`.
    pub fn into_config(
        self,
        log_level: LogLevel,
        log_format: LogFormat,
    ) -> Result<Config, ConfigError> {
        let seed = match (self.make, self.model, self.seed_file) {
            (Some(_), _, Some(_)) | (_, Some(_), Some(_)) => {
                return Err(ConfigError::ConflictingSeeds)
            }
            (Some(make), Some(model), None) => Some(SeedSource::Single(ListingQuery::new(
                &make,
                &model,
                &self.query,
                self.page,
            ))),
            (Some(_), None, None) | (None, Some(_), None) => {
                return Err(ConfigError::EmptyMakeOrModel)
            }
            (None, None, Some(path)) => Some(SeedSource::File {
                path,
                query: self.query,
            }),
            (None, None, None) => None,
        };

        Ok(Config {
            seed,
            base_url: self.base_url,
            log_level,
            log_format,
            db_path: self.db_path,
            write_mode: if self.upsert {
                WriteMode::Upsert
            } else {
                WriteMode::Append
            },
            csv_output: self.output,
            listing_concurrency: self.listing_concurrency,
            detail_concurrency: self.detail_concurrency,
            enrichment_concurrency: self.enrichment_concurrency,
            timeout_seconds: self.timeout_seconds,
            user_agent: self.user_agent,
            rate_limit_rps: self.rate_limit_rps,
            cache_dir: self.cache_dir,
            save_pages: self.save_pages,
            enable_enrichment: !self.no_enrichment,
            enrichment_endpoint: self.enrichment_endpoint,
            enrichment_auth: self.enrichment_auth,
            ..Default::default()
        })
    }
}

/// Options for `discover-models`.
#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Where to write the seed table
    #[arg(long, short = 'o', default_value = "makes_and_models.csv")]
    pub output: PathBuf,

    /// Catalog origin
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

/// Options for `export`.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// SQLite database written by `crawl --db-path`
    #[arg(long, default_value = "./car_crawler.db")]
    pub db_path: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}
