//! Identity-keyed, insertion-ordered record collection with a soft cap.

use harvest_core::{Record, RecordId};
use indexmap::IndexMap;

/// Deduplicated records in first-seen order.
///
/// A record whose id is already present is dropped; an entry is never
/// replaced. The cap is a stop signal, not a limit: a merge that crosses it
/// keeps the whole batch.
#[derive(Debug, Clone)]
pub struct Aggregator {
    records: IndexMap<RecordId, Record>,
    cap: usize,
    duplicates: usize,
}

impl Aggregator {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            records: IndexMap::new(),
            cap,
            duplicates: 0,
        }
    }

    /// Insert a batch, returning how many records were new.
    pub fn merge<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = Record>,
    {
        let mut inserted = 0;
        for record in batch {
            if self.records.contains_key(record.id()) {
                self.duplicates += 1;
                continue;
            }
            self.records.insert(record.id().clone(), record);
            inserted += 1;
        }
        inserted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Whether the collection has reached the cap.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.cap
    }

    /// Records dropped because their id was already present.
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records.into_values().collect()
    }
}
