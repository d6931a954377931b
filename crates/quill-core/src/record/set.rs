//! The immutable record set every reduction consumes.
//!
//! Relays return unordered, duplicate-laden, partially-overlapping slices of
//! history. [`RecordSet`] models "everything this client has seen so far" as
//! a map keyed by content address: deduplication is structural, iteration
//! order is deterministic, and growing the set never disturbs records
//! already present — the properties the monotonic-extension guarantee of the
//! history reducer rests on.
//!
//! Callers treat a set as immutable for the duration of a reduction; to
//! ingest late-arriving records, extend (or clone-and-extend) the set and
//! reduce again.

use std::collections::BTreeMap;

use tracing::debug;

use super::{RawRecord, RecordId};

/// A deduplicated set of raw records keyed by content address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: BTreeMap<RecordId, RawRecord>,
}

impl RecordSet {
    /// An empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Number of distinct records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record with this content address is present.
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.contains_key(id)
    }

    /// Look up a record by content address.
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&RawRecord> {
        self.records.get(id)
    }

    /// Insert a record. Returns `false` if a record with the same content
    /// address was already present (the duplicate is dropped — relays
    /// re-serving a record is the normal case, not an error).
    pub fn insert(&mut self, record: RawRecord) -> bool {
        match self.records.entry(record.id.clone()) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Insert every record from `incoming`, returning how many were new.
    ///
    /// This is the streaming-ingestion entry point: each relay reply is
    /// folded in as it arrives and reductions are simply re-run over the
    /// grown set.
    pub fn extend(&mut self, incoming: impl IntoIterator<Item = RawRecord>) -> usize {
        let before = self.records.len();
        for record in incoming {
            self.insert(record);
        }
        let added = self.records.len() - before;
        debug!(added, total = self.records.len(), "record set extended");
        added
    }

    /// Iterate records in content-address order (deterministic).
    pub fn iter(&self) -> impl Iterator<Item = &RawRecord> {
        self.records.values()
    }

    /// Consume the set into a vector in content-address order.
    #[must_use]
    pub fn into_vec(self) -> Vec<RawRecord> {
        self.records.into_values().collect()
    }
}

impl FromIterator<RawRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = RawRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a RawRecord;
    type IntoIter = std::collections::btree_map::Values<'a, RecordId, RawRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
