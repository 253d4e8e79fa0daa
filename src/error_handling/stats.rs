//! Run counters keyed by the error, warning and info enums.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType, WarningType};

/// One atomic counter per variant of `K`, all present from construction.
pub struct Counters<K> {
    counts: HashMap<K, AtomicUsize>,
}

impl<K> Counters<K>
where
    K: IntoEnumIterator + Copy + Eq + Hash + Display,
{
    fn new() -> Self {
        Self {
            counts: K::iter().map(|key| (key, AtomicUsize::new(0))).collect(),
        }
    }

    pub fn bump(&self, key: K) {
        if let Some(counter) = self.counts.get(&key) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get(&self, key: K) -> usize {
        self.counts
            .get(&key)
            .map_or(0, |c| c.load(Ordering::SeqCst))
    }

    pub fn total(&self) -> usize {
        self.counts.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Non-zero counters in declaration order.
    pub fn non_zero(&self) -> Vec<(K, usize)> {
        K::iter()
            .map(|key| (key, self.get(key)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

/// Shared between the scheduler stages, the fetcher and the enrichment client.
pub struct ProcessingStats {
    errors: Counters<ErrorType>,
    warnings: Counters<WarningType>,
    info: Counters<InfoType>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self {
            errors: Counters::new(),
            warnings: Counters::new(),
            info: Counters::new(),
        }
    }

    pub fn errors(&self) -> &Counters<ErrorType> {
        &self.errors
    }

    pub fn warnings(&self) -> &Counters<WarningType> {
        &self.warnings
    }

    pub fn info(&self) -> &Counters<InfoType> {
        &self.info
    }

    pub fn increment_error(&self, error: ErrorType) {
        self.errors.bump(error);
    }

    pub fn increment_warning(&self, warning: WarningType) {
        self.warnings.bump(warning);
    }

    pub fn increment_info(&self, info_type: InfoType) {
        self.info.bump(info_type);
    }

    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors.get(error)
    }

    pub fn get_warning_count(&self, warning: WarningType) -> usize {
        self.warnings.get(warning)
    }

    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info.get(info_type)
    }
}
