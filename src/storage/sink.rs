//! SQLite record sink.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::circuit_breaker::WriteCircuitBreaker;
use super::insert::insert_record;
use super::migrations::run_migrations;
use super::pool::{init_db_pool_with_path, DbPool};
use crate::config::WriteMode;
use crate::error_handling::DatabaseError;
use crate::models::CarRecord;
use crate::sink::{RecordSink, SinkError};

/// Writes records to the `car_records` table.
pub struct SqliteSink {
    pool: DbPool,
    mode: WriteMode,
    breaker: WriteCircuitBreaker,
    written: AtomicUsize,
    closed: AtomicBool,
}

impl SqliteSink {
    /// Opens the database at `path` and applies migrations.
    pub async fn open(path: &Path, mode: WriteMode) -> Result<Self, DatabaseError> {
        let pool = init_db_pool_with_path(path).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool, mode))
    }

    /// Wraps an already migrated pool.
    pub fn new(pool: DbPool, mode: WriteMode) -> Self {
        Self {
            pool,
            mode,
            breaker: WriteCircuitBreaker::new(),
            written: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_circuit_breaker(mut self, breaker: WriteCircuitBreaker) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Records written so far.
    pub fn written(&self) -> usize {
        self.written.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSink for SqliteSink {
    async fn accept(&self, record: CarRecord) -> Result<(), SinkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SinkError::Closed);
        }
        if self.breaker.is_circuit_open().await {
            return Err(SinkError::CircuitOpen);
        }

        match insert_record(&self.pool, &record, self.mode).await {
            Ok(()) => {
                self.breaker.record_success().await;
                self.written.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Err(e) => {
                self.breaker.record_failure().await;
                Err(e.into())
            }
        }
    }

    async fn close(&self) -> Result<(), SinkError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            log::info!("SQLite sink closed after {} records", self.written());
            self.pool.close().await;
        }
        Ok(())
    }
}
