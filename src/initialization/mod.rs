//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - HTTP clients (page fetches and enrichment)
//! - The logger
//! - The request rate limiter
//! - Concurrency semaphores
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod rate_limiter;

use std::sync::Arc;

use tokio::sync::Semaphore;

// Re-export public API
pub use client::{init_client, init_enrichment_client};
pub use logger::init_logger_with;
pub use rate_limiter::{init_rate_limiter, RateLimiter};

/// Creates a shared semaphore with `count` permits.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count))
}
