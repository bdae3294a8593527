//! Selection-frequency tracking for result ranking.
//!
//! Each time the user commits to a result (selects it without typing any
//! further refinement), its per-title counter goes up. The workflow uses
//! these counters to move frequently picked results to the top.

use std::collections::HashMap;

use crate::error::Result;
use crate::storage::SharedStorage;

/// Storage key holding the title -> count map.
const USAGE_KEY: &str = "usage";

/// Tracks how often each titled result has been selected.
#[derive(Debug, Clone)]
pub struct UsageTracker {
    storage: SharedStorage,
}

impl UsageTracker {
    /// Create a tracker over a shared store.
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// Record a menu-item selection.
    ///
    /// The counter for `title` is incremented only when the refinement query
    /// is empty: a non-empty refinement means the user is still drilling in,
    /// not yet committed to the item.
    pub fn record_selection(&self, refinement_query: &str, title: &str) -> Result<()> {
        if !refinement_query.trim().is_empty() {
            return Ok(());
        }

        let mut storage = self.storage.lock();
        let mut counts: HashMap<String, u64> = storage.get(USAGE_KEY).unwrap_or_default();
        let count = counts.entry(title.to_string()).or_insert(0);
        *count += 1;
        tracing::debug!(title, count = *count, "Recorded selection");
        storage.set(USAGE_KEY, &counts)
    }

    /// Get the selection count for a title, 0 if never selected.
    pub fn count(&self, title: &str) -> u64 {
        self.counts().get(title).copied().unwrap_or(0)
    }

    /// Get the full title -> count map.
    pub fn counts(&self) -> HashMap<String, u64> {
        self.storage.lock().get(USAGE_KEY).unwrap_or_default()
    }

    /// Reset all counters.
    pub fn clear(&self) -> Result<()> {
        self.storage.lock().remove(USAGE_KEY)
    }
}
