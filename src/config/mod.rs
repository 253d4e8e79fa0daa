//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, endpoints)
//! - The library `Config` struct and its validation
//! - CLI argument types and their conversion into `Config`

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{Cli, Commands, CrawlArgs, DiscoverArgs, ExportArgs};
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, SeedSource, WriteMode};
