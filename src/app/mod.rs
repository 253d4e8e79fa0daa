//! Run-level helpers shared by the CLI and the library entry point.
//!
//! Progress logging, background task shutdown and end-of-run statistics.

pub mod logging;
pub mod shutdown;
pub mod statistics;

pub use logging::{log_progress, spawn_progress_logger};
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_error_statistics, print_report};
