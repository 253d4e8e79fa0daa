//! Circuit breaker for record writes.
//!
//! After a run of consecutive failed writes the circuit opens and records are
//! dropped without touching the database until a cooldown expires. One write
//! is then let through; success closes the circuit, failure reopens it.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

pub struct WriteCircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    consecutive_failures: AtomicU32,
    open: AtomicBool,
    opened_at: RwLock<Option<Instant>>,
}

impl WriteCircuitBreaker {
    /// 5 consecutive failures, 30 second cooldown.
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_FAILURE_THRESHOLD, DEFAULT_COOLDOWN)
    }

    pub fn with_threshold(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            consecutive_failures: AtomicU32::new(0),
            open: AtomicBool::new(false),
            opened_at: RwLock::new(None),
        }
    }

    pub async fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
        if self.open.swap(false, Ordering::SeqCst) {
            *self.opened_at.write().await = None;
            log::info!("Record write circuit closed after a successful write");
        }
    }

    pub async fn record_failure(&self) {
        let count = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;

        if count >= self.failure_threshold && !self.open.swap(true, Ordering::SeqCst) {
            *self.opened_at.write().await = Some(Instant::now());
            log::error!(
                "Record write circuit opened after {} consecutive failures (cooldown: {}s)",
                count,
                self.cooldown.as_secs()
            );
        }
    }

    /// Whether writes should be skipped right now.
    ///
    /// Returns `false` once the cooldown has expired so the next write can
    /// probe the database.
    pub async fn is_circuit_open(&self) -> bool {
        if !self.open.load(Ordering::SeqCst) {
            return false;
        }

        if let Some(opened) = *self.opened_at.read().await {
            if opened.elapsed() >= self.cooldown {
                log::info!("Record write circuit cooldown expired, probing");
                self.open.store(false, Ordering::SeqCst);
                // Next failure reopens immediately
                self.consecutive_failures
                    .store(self.failure_threshold - 1, Ordering::SeqCst);
                return false;
            }
        }

        true
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }
}

impl Default for WriteCircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}
