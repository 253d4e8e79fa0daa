//! Configuration constants.
//!
//! This module defines the operational parameters used throughout the crawler:
//! site endpoints, timeouts, concurrency ceilings and the retry policy.

use std::time::Duration;

// Site layout
/// Default catalog origin. Listing and taxonomy URLs are built relative to it.
pub const DEFAULT_BASE_URL: &str = "https://www.autoscout24.com";

/// Filter string used for every row of a seed table.
///
/// Price ceiling, new + used vehicles, standard sort order, power in kW.
pub const DEFAULT_SEED_QUERY: &str =
    "sort=standard&desc=0&cy=A&atype=C&ustate=N%2CU&powertype=kw&priceto=6000";

/// Default GraphQL endpoint for the recommendation lookup.
pub const DEFAULT_ENRICHMENT_ENDPOINT: &str = "https://listing-search.api.autoscout24.com/graphql";

/// Locale sent with every enrichment query.
pub const DEFAULT_ENRICHMENT_LOCALE: &str = "en_GB";

/// Environment variable holding the enrichment `Authorization` header value.
pub const ENRICHMENT_AUTH_ENV: &str = "CAR_CRAWLER_ENRICHMENT_AUTH";

/// Default User-Agent string for HTTP requests.
///
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Concurrency
/// Maximum concurrent listing-page fetches
pub const DEFAULT_LISTING_CONCURRENCY: usize = 4;
/// Maximum concurrent detail-page fetches
///
/// Detail pages outnumber listing pages roughly 20:1, so they get the larger budget.
pub const DEFAULT_DETAIL_CONCURRENCY: usize = 16;
/// Maximum concurrent enrichment calls (separate from page-fetch permits)
pub const DEFAULT_ENRICHMENT_CONCURRENCY: usize = 4;
/// Capacity of the bounded channels connecting pipeline stages
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

// Timeouts
/// Per-request timeout for page fetches
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Enrichment calls use their own, shorter budget
pub const DEFAULT_ENRICHMENT_TIMEOUT_SECS: u64 = 8;

// Response size limits
/// Maximum response body size in bytes (5MB)
pub const MAX_RESPONSE_BODY_SIZE: usize = 5 * 1024 * 1024;
/// Bytes of response bodies the cache keeps in memory; older entries are evicted
pub const CACHE_MEMORY_BUDGET_BYTES: usize = 32 * 1024 * 1024;

// Error message limits
/// Maximum error message length in characters when logging failures
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;

// Retry strategy
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 10;
/// Maximum number of attempts (including the initial attempt)
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// Progress logging
/// Interval between progress log lines
pub const LOGGING_INTERVAL: Duration = Duration::from_secs(5);

// HTTP status codes
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
