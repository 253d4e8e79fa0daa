//! Seed loading.
//!
//! A seed table is a CSV file with at least `make_name` and `model` columns, as
//! written by `discover-models`. Every row becomes a page-1 [`ListingQuery`]
//! with the same filter query.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::SeedSource;
use crate::models::ListingQuery;

const MAKE_COLUMN: &str = "make_name";
const MODEL_COLUMN: &str = "model";

/// Reads `(make_name, model)` rows from `path`.
///
/// Other columns are ignored. Rows with an empty make or model are skipped.
/// Duplicate rows (after normalization) are kept once.
///
/// # Errors
///
/// Fails if the file can't be read or lacks either column.
pub fn load_seed_file(path: &Path, query: &str) -> Result<Vec<ListingQuery>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open seed file {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("Seed file {} has no {} column", path.display(), name))
    };
    let make_idx = column(MAKE_COLUMN)?;
    let model_idx = column(MODEL_COLUMN)?;

    let mut seeds: Vec<ListingQuery> = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Malformed seed row {}", line + 1))?;
        let make = row.get(make_idx).unwrap_or_default().trim();
        let model = row.get(model_idx).unwrap_or_default().trim();
        if make.is_empty() || model.is_empty() {
            log::warn!("Skipping seed row {}: empty make or model", line + 1);
            continue;
        }

        let seed = ListingQuery::new(make, model, query, 1);
        if seeds.contains(&seed) {
            log::debug!("Duplicate seed {}/{}", seed.make, seed.model);
            continue;
        }
        seeds.push(seed);
    }

    log::info!("Loaded {} seeds from {}", seeds.len(), path.display());
    Ok(seeds)
}

/// Expands a seed source into the queries to crawl.
pub fn resolve_seeds(source: &SeedSource) -> Result<Vec<ListingQuery>> {
    match source {
        SeedSource::Single(query) => Ok(vec![query.clone()]),
        SeedSource::File { path, query } => load_seed_file(path, query),
    }
}
