//! Per-URL request states.
//!
//! The ledger is also the run-wide dedup set: a URL can be claimed once.

use std::collections::HashMap;

use strum_macros::EnumIter as EnumIterMacro;
use tokio::sync::Mutex;

/// Lifecycle of one listing or detail URL.
///
/// `Pending → Fetching → {Parsed | Extracted | Failed}`. Listing pages end in
/// `Parsed`, detail pages in `Extracted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum RequestState {
    Pending,
    Fetching,
    Parsed,
    Extracted,
    Failed,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Pending => "pending",
            RequestState::Fetching => "fetching",
            RequestState::Parsed => "parsed",
            RequestState::Extracted => "extracted",
            RequestState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Parsed | RequestState::Extracted | RequestState::Failed
        )
    }

    fn can_advance_to(self, next: RequestState) -> bool {
        matches!(
            (self, next),
            (RequestState::Pending, RequestState::Fetching)
                | (RequestState::Pending, RequestState::Failed)
                | (RequestState::Fetching, RequestState::Parsed)
                | (RequestState::Fetching, RequestState::Extracted)
                | (RequestState::Fetching, RequestState::Failed)
        )
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
pub struct Ledger {
    states: Mutex<HashMap<String, RequestState>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `url` as `Pending`. Returns `false` if it was seen before.
    pub async fn claim(&self, url: &str) -> bool {
        let mut states = self.states.lock().await;
        if states.contains_key(url) {
            return false;
        }
        states.insert(url.to_string(), RequestState::Pending);
        true
    }

    /// Moves `url` to `next`. Out-of-order transitions are ignored.
    pub async fn advance(&self, url: &str, next: RequestState) -> bool {
        let mut states = self.states.lock().await;
        match states.get_mut(url) {
            Some(state) if state.can_advance_to(next) => {
                *state = next;
                true
            }
            Some(state) => {
                log::debug!("Ignoring transition {} -> {} for {}", state, next, url);
                false
            }
            None => {
                log::debug!("Transition to {} for unclaimed {}", next, url);
                false
            }
        }
    }

    pub async fn state(&self, url: &str) -> Option<RequestState> {
        self.states.lock().await.get(url).copied()
    }

    /// Number of URLs in each state.
    pub async fn counts(&self) -> HashMap<RequestState, usize> {
        let states = self.states.lock().await;
        let mut counts = HashMap::new();
        for state in states.values() {
            *counts.entry(*state).or_insert(0) += 1;
        }
        counts
    }

    pub async fn len(&self) -> usize {
        self.states.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.lock().await.is_empty()
    }
}
