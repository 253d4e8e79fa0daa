//! CSV output.
//!
//! [`CsvSink`] writes crawl results, [`export_db_to_csv`] streams the SQLite
//! table to the same layout, and [`read_csv_records`] parses either back.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use csv::Writer;
use futures::TryStreamExt;
use tokio::sync::Mutex;

use super::row::CsvRow;
use crate::models::{CarRecord, RECORD_FIELDS};
use crate::sink::{RecordSink, SinkError};
use crate::storage::{init_db_pool_with_path, run_migrations, stream_records};

/// Appends records to a CSV file with a header row.
///
/// Each record is flushed as it is written.
pub struct CsvSink {
    writer: Mutex<Option<Writer<File>>>,
    rows: AtomicUsize,
}

impl CsvSink {
    /// Creates (or truncates) `path` and writes the header.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(RECORD_FIELDS)?;
        writer.flush()?;
        Ok(Self {
            writer: Mutex::new(Some(writer)),
            rows: AtomicUsize::new(0),
        })
    }

    /// Data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSink for CsvSink {
    async fn accept(&self, record: CarRecord) -> Result<(), SinkError> {
        let row = CsvRow::from_record(&record)?;
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(SinkError::Closed)?;
        writer.write_record(row.cells())?;
        writer.flush()?;
        self.rows.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        if let Some(mut writer) = self.writer.lock().await.take() {
            writer.flush()?;
            log::info!("CSV sink closed after {} records", self.rows());
        }
        Ok(())
    }
}

/// Reads a file written by [`CsvSink`] or [`export_db_to_csv`].
pub fn read_csv_records(path: &Path) -> Result<Vec<CarRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    if headers.iter().ne(RECORD_FIELDS.iter().copied()) {
        bail!("Unexpected CSV header in {}", path.display());
    }

    reader
        .records()
        .enumerate()
        .map(|(i, row)| {
            let row = row?;
            CsvRow::parse(&row).with_context(|| format!("Invalid record on data row {}", i + 1))
        })
        .collect()
}

/// Streams every stored record to CSV.
///
/// Writes to `output`, or stdout when `None`. Returns the number of records
/// exported.
pub async fn export_db_to_csv(db_path: &Path, output: Option<&Path>) -> Result<usize> {
    if !db_path.exists() {
        bail!("Database not found: {}", db_path.display());
    }
    let pool = init_db_pool_with_path(db_path)
        .await
        .context("Failed to initialize database pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to apply migrations")?;

    let mut writer: Writer<Box<dyn Write>> = if let Some(output_path) = output {
        let file = File::create(output_path).with_context(|| {
            format!("Failed to create output file: {}", output_path.display())
        })?;
        Writer::from_writer(Box::new(file) as Box<dyn Write>)
    } else {
        Writer::from_writer(Box::new(io::stdout()) as Box<dyn Write>)
    };

    writer.write_record(RECORD_FIELDS)?;

    let mut records = stream_records(&pool);
    let mut record_count = 0;
    while let Some(record) = records.try_next().await? {
        writer.write_record(CsvRow::from_record(&record)?.cells())?;
        record_count += 1;
    }
    drop(records);

    writer.flush()?;
    pool.close().await;
    Ok(record_count)
}
