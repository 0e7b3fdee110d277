//! Per-controller memo of successful result sets.

use haulboard_core::SearchResult;
use std::collections::HashMap;

/// Successful results keyed by trimmed query. Failures are never stored.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<String, Vec<SearchResult>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query: &str) -> Option<&[SearchResult]> {
        self.entries.get(query).map(Vec::as_slice)
    }

    pub fn insert(&mut self, query: impl Into<String>, results: Vec<SearchResult>) {
        self.entries.insert(query.into(), results);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
