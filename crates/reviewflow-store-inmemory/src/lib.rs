//!
//! Reviewflow Store (in-memory) - a [`ReviewSink`] over a concurrent map
//!
//! Suitable for tests and local development. The conditional-write semantics
//! match a durable table's key-level atomicity: concurrent puts under the
//! same `(book_id, ref_id)` key admit exactly one writer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use reviewflow_core::{PortError, PutOutcome, ReviewRecord, ReviewSink};

/// In-memory review store keyed `(book_id, ref_id)`.
#[derive(Default)]
pub struct InMemoryReviewStore {
    records: DashMap<(String, String), ReviewRecord>,
}

impl InMemoryReviewStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record by key.
    pub fn get(&self, book_id: &str, ref_id: &str) -> Option<ReviewRecord> {
        self.records
            .get(&(book_id.to_string(), ref_id.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ReviewSink for InMemoryReviewStore {
    async fn put_if_absent(&self, record: &ReviewRecord) -> Result<PutOutcome, PortError> {
        let (book_id, ref_id) = record.key();

        // The entry holds the shard lock, making check-then-insert atomic
        // per key.
        match self.records.entry((book_id.to_string(), ref_id.to_string())) {
            Entry::Occupied(existing) => Ok(PutOutcome::Exists(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(PutOutcome::Written)
            }
        }
    }
}
