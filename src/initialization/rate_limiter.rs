//! Rate limiter initialization.
//!
//! A token-bucket limiter shared by every page fetch.

use std::sync::Arc;
use tokio::sync::Semaphore as TokioSemaphore;
use tokio::time::{interval, Duration as TokioDuration};
use tokio_util::sync::CancellationToken;

/// Token-bucket rate limiter.
///
/// Tokens are replenished at `rps` per second by a background task; `burst`
/// tokens are available up front. Each fetch consumes one token.
pub struct RateLimiter {
    permits: Arc<TokioSemaphore>,
    rps: u32,
}

impl RateLimiter {
    /// Waits for a token and consumes it.
    pub async fn acquire(&self) {
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }

    pub fn rps(&self) -> u32 {
        self.rps
    }
}

/// Starts a token-bucket rate limiter.
///
/// Returns `None` when `rps` is 0 (no limit). The returned token stops the
/// replenishment task; cancel it at shutdown.
pub fn init_rate_limiter(rps: u32, burst: usize) -> Option<(Arc<RateLimiter>, CancellationToken)> {
    if rps == 0 {
        return None;
    }
    let capacity = burst.max(1);
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    let limiter = Arc::new(RateLimiter {
        permits: Arc::new(TokioSemaphore::new(capacity)),
        rps,
    });

    let permits = Arc::clone(&limiter.permits);
    let mut ticker = interval(TokioDuration::from_millis(100));
    tokio::spawn(async move {
        let mut last_time = tokio::time::Instant::now();
        // Carry fractional tokens between ticks so low rates still progress
        let mut fractional_permits = 0.0f64;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = tokio::time::Instant::now();
                    let elapsed = now.duration_since(last_time);
                    last_time = now;

                    let due = f64::from(rps) * elapsed.as_secs_f64() + fractional_permits;
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let whole = due as usize;
                    fractional_permits = due - whole as f64;

                    // Never refill beyond the burst size
                    let room = capacity.saturating_sub(permits.available_permits());
                    let add = whole.min(room);
                    if add > 0 {
                        permits.add_permits(add);
                    }
                }
                _ = shutdown_clone.cancelled() => {
                    log::debug!("Rate limiter background task shutting down");
                    break;
                }
            }
        }
    });

    Some((limiter, shutdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_init_rate_limiter_disabled() {
        assert!(init_rate_limiter(0, 10).is_none());
    }

    #[tokio::test]
    async fn test_init_rate_limiter_enabled() {
        let (limiter, shutdown) = init_rate_limiter(10, 20).expect("limiter");
        assert_eq!(limiter.rps(), 10);
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_rate_limiter_burst_capacity() {
        let (limiter, shutdown) = init_rate_limiter(1, 3).expect("limiter");
        for _ in 0..3 {
            let acquired = timeout(Duration::from_millis(20), limiter.acquire()).await;
            assert!(acquired.is_ok(), "burst tokens should be available immediately");
        }
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_rate_limiter_token_replenishment() {
        let (limiter, shutdown) = init_rate_limiter(10, 1).expect("limiter");
        limiter.acquire().await;

        // 10 rps refills one token within ~100ms
        tokio::time::sleep(Duration::from_millis(250)).await;

        let acquired = timeout(Duration::from_millis(100), limiter.acquire()).await;
        assert!(acquired.is_ok(), "token should have been replenished");
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_rate_limiter_blocks_when_empty() {
        let (limiter, shutdown) = init_rate_limiter(1, 1).expect("limiter");
        shutdown.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;

        limiter.acquire().await;
        let blocked = timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(blocked.is_err(), "no tokens left after replenishment stopped");
    }
}
