//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::models::{CitationRecord, TermSet};
use crate::sources::LiteratureSource;

/// A mock source that returns predefined records and remembers what it was asked.
#[derive(Debug, Default)]
pub struct MockSource {
    records: Mutex<Vec<CitationRecord>>,
    calls: Mutex<Vec<(TermSet, usize)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockSource {
    /// Create a mock source with no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source returning `records`.
    pub fn with_records(records: Vec<CitationRecord>) -> Self {
        let source = Self::new();
        source.set_records(records);
        source
    }

    /// Set the records to return.
    pub fn set_records(&self, records: Vec<CitationRecord>) {
        *lock(&self.records) = records;
    }

    /// Clear the configured records.
    pub fn clear_records(&self) {
        lock(&self.records).clear();
    }

    /// Every `(terms, limit)` pair this source was searched with, in call order.
    pub fn calls(&self) -> Vec<(TermSet, usize)> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl LiteratureSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, terms: &TermSet, limit: usize) -> Vec<CitationRecord> {
        lock(&self.calls).push((terms.clone(), limit));
        lock(&self.records).iter().take(limit).cloned().collect()
    }
}
