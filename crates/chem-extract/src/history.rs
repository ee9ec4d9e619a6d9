//! Per-session list of looked-up elements.

use crate::record::ElementRecord;
use serde::{Deserialize, Serialize};

/// Records found during a session, most recent first, one per symbol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHistory {
    entries: Vec<ElementRecord>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the front. Returns `false` and leaves the history
    /// unchanged if a record with the same symbol is already present.
    pub fn record(&mut self, record: &ElementRecord) -> bool {
        if self.contains(record.symbol_value()) {
            return false;
        }
        self.entries.insert(0, record.clone());
        true
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.iter().any(|e| e.symbol_value() == symbol)
    }

    pub fn entries(&self) -> &[ElementRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
