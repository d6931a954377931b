//! History reducer: collapse snapshot records into an ordered revision
//! history with a canonical head.
//!
//! Snapshots qualify only when their doc id matches the requested identity
//! AND their signer equals the identity's owner — a snapshot under the same
//! doc id from another key belongs to a distinct, unrelated identity (doc
//! ids are not globally unique).
//!
//! # Ordering
//!
//! Revisions sort strictly descending by `(created_at, record_id)`. The
//! record-id comparison is a fixed byte-order tie-break, so two snapshots
//! sharing a timestamp (clock granularity collisions are expected) still
//! have one deterministic order regardless of ingestion order. Growing the
//! record set never reorders previously-seen revisions relative to each
//! other; new entries land in their sorted position (monotonic extension).

use std::cmp::Reverse;

use tracing::debug;

use crate::identity::DocIdentity;
use crate::record::parse::{DocumentSnapshot, Parsed, classify_or_drop};
use crate::record::{RecordId, RecordKind, RecordSet};

/// Ordered revision history of one document identity.
///
/// Index 0 is the canonical head. An empty history means "no known state
/// for this identity" — a valid answer, not an error; the caller decides
/// whether that is "not found" or "not yet fetched".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionHistory {
    identity: DocIdentity,
    revisions: Vec<DocumentSnapshot>,
}

impl RevisionHistory {
    /// The identity this history was reduced for.
    #[must_use]
    pub const fn identity(&self) -> &DocIdentity {
        &self.identity
    }

    /// Canonical current snapshot, if any revision is known.
    #[must_use]
    pub fn head(&self) -> Option<&DocumentSnapshot> {
        self.revisions.first()
    }

    /// All revisions, newest first.
    #[must_use]
    pub fn revisions(&self) -> &[DocumentSnapshot] {
        &self.revisions
    }

    /// Number of known revisions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// Whether no revision is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// Find a revision by its record id.
    #[must_use]
    pub fn find(&self, record_id: &RecordId) -> Option<&DocumentSnapshot> {
        self.revisions.iter().find(|rev| rev.record_id == *record_id)
    }
}

/// Reduce a record set to the revision history of one identity.
///
/// Records of other kinds, snapshots of other identities, snapshots signed
/// by anyone but the owner, and malformed records are all excluded.
/// Deduplication is structural (the set is keyed by content address), so a
/// revision appears once no matter how many relays returned it.
#[must_use]
pub fn history(records: &RecordSet, identity: &DocIdentity) -> RevisionHistory {
    let mut revisions: Vec<DocumentSnapshot> = records
        .iter()
        .filter(|record| record.kind == RecordKind::Document)
        .filter(|record| record.author == identity.owner)
        .filter_map(classify_or_drop)
        .filter_map(|parsed| match parsed {
            Parsed::Snapshot(snap) if snap.identity == *identity => Some(snap),
            _ => None,
        })
        .collect();

    // Newest first; byte-order id tie-break keeps equal timestamps total.
    revisions.sort_by_key(|snap| Reverse((snap.created_at, snap.record_id.clone())));

    debug!(
        identity = %identity,
        revisions = revisions.len(),
        "reduced revision history"
    );

    RevisionHistory {
        identity: identity.clone(),
        revisions,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
