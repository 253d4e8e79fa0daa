//! Data model shared by the crawl pipeline and the sinks.

mod query;
mod record;

pub use query::{normalize_make, normalize_model, ListingPage, ListingQuery};
pub use record::{CarRecord, EnrichmentResult, Equipment, RECORD_FIELDS};
