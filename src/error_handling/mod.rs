//! Error handling and processing statistics.
//!
//! This module provides:
//! - Typed error enums for startup boundaries (config, logger, database)
//! - Processing statistics tracking (errors, warnings, info metrics)
//! - Retry strategy configuration
//! - Error type extraction from error chains
//!
//! Error types are categorized into:
//! - **Errors**: a page, record or enrichment call was dropped
//! - **Warnings**: missing data that doesn't stop the crawl
//! - **Info**: informational metrics (cache hits, duplicates, retries)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{get_retry_strategy, update_error_stats};
pub use stats::{Counters, ProcessingStats};
pub use types::{ConfigError, DatabaseError, ErrorType, InfoType, InitializationError, WarningType};
