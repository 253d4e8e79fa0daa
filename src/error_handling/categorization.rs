//! Error categorization and retry strategy.
//!
//! This module provides functions to categorize errors and configure retry strategies.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::stats::ProcessingStats;
use super::types::ErrorType;

/// Creates an exponential backoff retry strategy.
///
/// The first delay is `initial_delay_ms`, each further delay is `RETRY_FACTOR`
/// times the previous one, capped at `RETRY_MAX_DELAY_SECS`. The iterator yields
/// `RETRY_MAX_ATTEMPTS - 1` delays, so a request is attempted at most
/// `RETRY_MAX_ATTEMPTS` times in total.
pub fn get_retry_strategy(initial_delay_ms: u64) -> impl Iterator<Item = Duration> {
    let factor = crate::config::RETRY_FACTOR.max(2);
    ExponentialBackoff::from_millis(factor)
        .factor((initial_delay_ms / factor).max(1))
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS.saturating_sub(1))
}

/// Categorizes a `reqwest::Error` into an `ErrorType`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if let Some(status) = error.status() {
        match status.as_u16() {
            400 => return ErrorType::HttpRequestBadRequest,
            401 => return ErrorType::HttpRequestUnauthorized,
            403 => return ErrorType::HttpRequestBotDetectionError,
            404 => return ErrorType::HttpRequestNotFound,
            429 => return ErrorType::HttpRequestTooManyRequests,
            500 => return ErrorType::HttpRequestInternalServerError,
            502 => return ErrorType::HttpRequestBadGateway,
            503 => return ErrorType::HttpRequestServiceUnavailable,
            504 => return ErrorType::HttpRequestGatewayTimeout,
            _ if status.is_client_error() || status.is_server_error() => {
                return ErrorType::HttpRequestOtherError;
            }
            _ => {
                // Non-standard status codes - fall through to check error type
            }
        }
    }

    if error.is_builder() {
        ErrorType::HttpRequestBuilderError
    } else if error.is_redirect() {
        ErrorType::HttpRequestRedirectError
    } else if error.is_status() {
        ErrorType::HttpRequestStatusError
    } else if error.is_timeout() {
        ErrorType::HttpRequestTimeoutError
    } else if error.is_request() {
        ErrorType::HttpRequestRequestError
    } else if error.is_connect() {
        ErrorType::HttpRequestConnectError
    } else if error.is_body() {
        ErrorType::HttpRequestBodyError
    } else if error.is_decode() {
        ErrorType::HttpRequestDecodeError
    } else {
        ErrorType::HttpRequestOtherError
    }
}

/// Records the HTTP-level category of a failed fetch, if the error chain holds
/// a `reqwest::Error`.
pub fn update_error_stats(stats: &ProcessingStats, error: &anyhow::Error) {
    if let Some(reqwest_err) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<reqwest::Error>())
    {
        stats.increment_error(categorize_reqwest_error(reqwest_err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_get_retry_strategy_initial_delay() {
        let first_delay = get_retry_strategy(crate::config::RETRY_INITIAL_DELAY_MS)
            .next()
            .expect("at least one retry");
        assert_eq!(
            first_delay.as_millis(),
            crate::config::RETRY_INITIAL_DELAY_MS as u128
        );
    }

    #[test]
    fn test_get_retry_strategy_exponential_backoff() {
        let delays: Vec<Duration> = get_retry_strategy(100).collect();
        for i in 1..delays.len() {
            let prev = delays[i - 1].as_millis();
            let curr = delays[i].as_millis();
            assert!(curr >= prev, "Delay should increase: {} >= {}", curr, prev);
        }
    }

    #[test]
    fn test_get_retry_strategy_max_delay() {
        let max_delay_ms = crate::config::RETRY_MAX_DELAY_SECS * 1000;
        for delay in get_retry_strategy(60_000) {
            assert!(
                delay.as_millis() <= max_delay_ms as u128,
                "Delay {}ms exceeds max {}ms",
                delay.as_millis(),
                max_delay_ms
            );
        }
    }

    #[test]
    fn test_get_retry_strategy_bounds_total_attempts() {
        // Delays sit between attempts, so there is one fewer than the attempt budget.
        assert_eq!(
            get_retry_strategy(1).count(),
            crate::config::RETRY_MAX_ATTEMPTS - 1
        );
    }

    #[test]
    fn test_update_error_stats_ignores_non_http_errors() {
        let stats = ProcessingStats::new();
        update_error_stats(&stats, &anyhow::anyhow!("not an http error"));
        assert_eq!(stats.errors().total(), 0);
    }
}
