//! Record sinks.
//!
//! The scheduler hands every finished record to exactly one [`RecordSink`].
//! Several outputs are combined with [`FanoutSink`].

use async_trait::async_trait;
use thiserror::Error;

use crate::error_handling::DatabaseError;
use crate::models::CarRecord;

/// A failed write. The record is dropped and the crawl continues.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize field: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Write circuit open, record dropped")]
    CircuitOpen,

    #[error("Sink already closed")]
    Closed,

    #[error("{failed} of {total} sinks failed: {first}")]
    Fanout {
        failed: usize,
        total: usize,
        first: Box<SinkError>,
    },
}

/// Destination for extracted records.
///
/// `accept` is called once per record from a single consumer task. `close`
/// flushes buffered output and is called once after the last record.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn accept(&self, record: CarRecord) -> Result<(), SinkError>;

    async fn close(&self) -> Result<(), SinkError>;
}

/// Forwards each record to every inner sink.
///
/// All sinks see every record even when an earlier one fails; the call fails
/// if any of them did.
pub struct FanoutSink {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Box<dyn RecordSink>>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

fn combine(errors: Vec<SinkError>, total: usize) -> Result<(), SinkError> {
    let failed = errors.len();
    match errors.into_iter().next() {
        None => Ok(()),
        Some(first) if total == 1 => Err(first),
        Some(first) => Err(SinkError::Fanout {
            failed,
            total,
            first: Box::new(first),
        }),
    }
}

#[async_trait]
impl RecordSink for FanoutSink {
    async fn accept(&self, record: CarRecord) -> Result<(), SinkError> {
        let mut errors = Vec::new();
        for sink in &self.sinks {
            if let Err(e) = sink.accept(record.clone()).await {
                errors.push(e);
            }
        }
        combine(errors, self.sinks.len())
    }

    async fn close(&self) -> Result<(), SinkError> {
        let mut errors = Vec::new();
        for sink in &self.sinks {
            if let Err(e) = sink.close().await {
                errors.push(e);
            }
        }
        combine(errors, self.sinks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        accepted: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl RecordSink for Counting {
        async fn accept(&self, _record: CarRecord) -> Result<(), SinkError> {
            self.accepted.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SinkError::CircuitOpen)
            } else {
                Ok(())
            }
        }

        async fn close(&self) -> Result<(), SinkError> {
            Ok(())
        }
    }

    fn record() -> CarRecord {
        CarRecord::new("https://x.test/1", Some("audi".into()), Some("a4".into()))
    }

    fn counting(fail: bool) -> (Box<dyn RecordSink>, Arc<AtomicUsize>) {
        let accepted = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Counting {
                accepted: Arc::clone(&accepted),
                fail,
            }),
            accepted,
        )
    }

    #[tokio::test]
    async fn test_fanout_forwards_to_all() {
        let (a, a_count) = counting(false);
        let (b, b_count) = counting(false);
        let sink = FanoutSink::new(vec![a, b]);
        sink.accept(record())
            .await
            .expect("accept");
        assert_eq!(a_count.load(Ordering::SeqCst), 1);
        assert_eq!(b_count.load(Ordering::SeqCst), 1);
        sink.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_fanout_fails_if_any_fails_but_still_forwards() {
        let (a, _) = counting(true);
        let (b, b_count) = counting(false);
        let sink = FanoutSink::new(vec![a, b]);
        let err = sink
            .accept(record())
            .await
            .expect_err("one sink failed");
        assert!(matches!(err, SinkError::Fanout { failed: 1, total: 2, .. }));
        assert_eq!(b_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_sink_error_is_not_wrapped() {
        let (a, _) = counting(true);
        let sink = FanoutSink::new(vec![a]);
        let err = sink
            .accept(record())
            .await
            .expect_err("sink failed");
        assert!(matches!(err, SinkError::CircuitOpen));
    }
}
