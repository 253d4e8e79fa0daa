//! SQLite persistence for extracted records.

mod circuit_breaker;
mod insert;
mod migrations;
mod pool;
mod query;
mod sink;

pub use circuit_breaker::WriteCircuitBreaker;
pub use insert::insert_record;
pub use migrations::run_migrations;
pub use pool::{init_db_pool_with_path, DbPool};
pub use query::{count_records, record_from_row, stream_records};
pub use sink::SqliteSink;
