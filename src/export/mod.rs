//! CSV output and export.

mod csv;
mod row;

pub use self::csv::{export_db_to_csv, read_csv_records, CsvSink};
pub use row::CsvRow;
