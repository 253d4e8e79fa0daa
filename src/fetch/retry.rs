//! Error retriability.

use anyhow::Error;

use super::FetchError;

/// Determines if a failed fetch should be retried.
///
/// # Retriable
///
/// - Network timeouts, connection failures, request errors
/// - Server errors (5xx)
/// - Rate limiting (429)
///
/// # Not retriable
///
/// - Client errors (4xx except 429)
/// - Redirect and decode errors
/// - URL parsing errors
/// - Oversized bodies
///
/// The error chain is inspected by downcasting. Unknown errors are retried.
pub(crate) fn is_retriable_error(error: &Error) -> bool {
    for cause in error.chain() {
        if let Some(reqwest_err) = cause.downcast_ref::<reqwest::Error>() {
            if let Some(status) = reqwest_err.status() {
                let status_code = status.as_u16();

                if status_code == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS {
                    return true;
                }
                if (400..500).contains(&status_code) {
                    return false;
                }
                if (500..600).contains(&status_code) {
                    return true;
                }
            }

            if reqwest_err.is_timeout() || reqwest_err.is_connect() || reqwest_err.is_request() {
                return true;
            }
            if reqwest_err.is_redirect() || reqwest_err.is_decode() {
                return false;
            }
            // Display includes the URL, so skip the message fallback
            continue;
        }

        if cause.downcast_ref::<url::ParseError>().is_some() {
            return false;
        }

        if let Some(fetch_err) = cause.downcast_ref::<FetchError>() {
            return match fetch_err {
                FetchError::BodyTooLarge { .. } => false,
            };
        }

        // Fallback for errors that only carry a status in their message
        let msg = cause.to_string().to_lowercase();
        if msg.contains("404") || msg.contains("not found") {
            return false;
        }
        if msg.contains("403") || msg.contains("forbidden") {
            return false;
        }
        if msg.contains("401") || msg.contains("unauthorized") {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_error_is_retriable() {
        let err = anyhow::anyhow!("connection reset by peer");
        assert!(is_retriable_error(&err));
    }

    #[test]
    fn test_url_parse_error_not_retriable() {
        let err: anyhow::Error = url::ParseError::EmptyHost.into();
        assert!(!is_retriable_error(&err));
    }

    #[test]
    fn test_url_parse_error_with_context_not_retriable() {
        let err = anyhow::Error::from(url::ParseError::RelativeUrlWithoutBase)
            .context("Failed to build listing URL");
        assert!(!is_retriable_error(&err));
    }

    #[test]
    fn test_body_too_large_not_retriable() {
        let err: anyhow::Error = FetchError::BodyTooLarge {
            url: "https://x.test/lst".into(),
            size: 10,
        }
        .into();
        assert!(!is_retriable_error(&err));
    }

    #[test]
    fn test_status_messages_fallback() {
        assert!(!is_retriable_error(&anyhow::anyhow!("HTTP 404 Not Found")));
        assert!(!is_retriable_error(&anyhow::anyhow!("403 Forbidden")));
        assert!(!is_retriable_error(&anyhow::anyhow!("401 Unauthorized")));
    }
}
