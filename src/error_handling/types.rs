//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout the application.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the logger with custom message (e.g., file creation).
    #[error("Logger initialization error: {0}")]
    LoggerSetupError(String),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Migration discovery or application error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A JSON text column could not be encoded or decoded.
    #[error("JSON column {column}: {source}")]
    JsonColumn {
        column: &'static str,
        source: serde_json::Error,
    },
}

/// Startup configuration problems. The only errors that abort a crawl.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no seed given: pass --make/--model or --seed-file")]
    MissingSeed,

    #[error("--make/--model and --seed-file are mutually exclusive")]
    ConflictingSeeds,

    #[error("make and model must both be non-empty")]
    EmptyMakeOrModel,

    #[error("page numbers start at 1")]
    InvalidPage,

    #[error("seed file not found: {}", .0.display())]
    SeedFileNotFound(PathBuf),

    #[error("concurrency limits must be at least 1")]
    ZeroConcurrency,

    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("invalid URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("no output configured: pass --db-path and/or --output")]
    NoSinkConfigured,
}

/// Types of errors that can occur while crawling.
///
/// This enum categorizes actual error conditions - failures that cause a page,
/// a record or an enrichment call to be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // HTTP/Network errors
    HttpRequestBuilderError,
    HttpRequestRedirectError,
    HttpRequestStatusError,
    HttpRequestTimeoutError,
    HttpRequestRequestError,
    HttpRequestConnectError,
    HttpRequestBodyError,
    HttpRequestDecodeError,
    HttpRequestOtherError,
    HttpRequestTooManyRequests,
    HttpRequestBotDetectionError, // 403 Forbidden - typically bot detection
    HttpRequestBadRequest,          // 400 Bad Request
    HttpRequestUnauthorized,        // 401 Unauthorized
    HttpRequestNotFound,            // 404 Not Found
    HttpRequestInternalServerError, // 500 Internal Server Error
    HttpRequestBadGateway,          // 502 Bad Gateway
    HttpRequestServiceUnavailable,  // 503 Service Unavailable
    HttpRequestGatewayTimeout,      // 504 Gateway Timeout
    // Pipeline errors
    ListingFetchError,
    DetailFetchError,
    EnrichmentError,
    SinkWriteError,
}

/// Types of warnings that can occur while crawling.
///
/// Warnings indicate missing data that doesn't stop the crawl but is worth tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    MissingTotalPages,  // First listing page had no usable pagination block
    EmptyListingPage,   // Listing page yielded no detail links
    MissingPrice,       // Detail page had no price span
    BadCorrelationKey,  // Detail URL does not end in a five-part id
    PageArchiveFailed,  // Could not write a listing page to --save-pages
}

/// Types of informational metrics that can occur while crawling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    CacheHit,            // Response served from the response cache
    DuplicateUrlSkipped, // URL already handled earlier in this run
    RetryAttempt,        // A transient failure was retried
    EnrichmentSkipped,   // Enrichment disabled or no correlation key
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::HttpRequestBuilderError => "HTTP request builder error",
            ErrorType::HttpRequestRedirectError => "HTTP request redirect error",
            ErrorType::HttpRequestStatusError => "HTTP request status error",
            ErrorType::HttpRequestTimeoutError => "HTTP request timeout error",
            ErrorType::HttpRequestRequestError => "HTTP request error",
            ErrorType::HttpRequestConnectError => "HTTP request connect error",
            ErrorType::HttpRequestBodyError => "HTTP request body error",
            ErrorType::HttpRequestDecodeError => "HTTP request decode error",
            ErrorType::HttpRequestOtherError => "HTTP request other error",
            ErrorType::HttpRequestTooManyRequests => "Too many requests",
            ErrorType::HttpRequestBotDetectionError => "Bot detection (403 Forbidden)",
            ErrorType::HttpRequestBadRequest => "Bad Request (400)",
            ErrorType::HttpRequestUnauthorized => "Unauthorized (401)",
            ErrorType::HttpRequestNotFound => "Not Found (404)",
            ErrorType::HttpRequestInternalServerError => "Internal Server Error (500)",
            ErrorType::HttpRequestBadGateway => "Bad Gateway (502)",
            ErrorType::HttpRequestServiceUnavailable => "Service Unavailable (503)",
            ErrorType::HttpRequestGatewayTimeout => "Gateway Timeout (504)",
            ErrorType::ListingFetchError => "Listing page dropped",
            ErrorType::DetailFetchError => "Detail page dropped",
            ErrorType::EnrichmentError => "Enrichment call failed",
            ErrorType::SinkWriteError => "Record rejected by sink",
        }
    }
}

impl std::fmt::Display for WarningType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WarningType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::MissingTotalPages => "Missing total page count",
            WarningType::EmptyListingPage => "Listing page without links",
            WarningType::MissingPrice => "Missing price",
            WarningType::BadCorrelationKey => "Underivable correlation key",
            WarningType::PageArchiveFailed => "Listing page not archived",
        }
    }
}

impl std::fmt::Display for InfoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::CacheHit => "Cache hit",
            InfoType::DuplicateUrlSkipped => "Duplicate URL skipped",
            InfoType::RetryAttempt => "Retry attempt",
            InfoType::EnrichmentSkipped => "Enrichment skipped",
        }
    }
}
