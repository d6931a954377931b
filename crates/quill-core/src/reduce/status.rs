//! Status reducer: derive the authoritative status of a proposal.
//!
//! The reduction is last-writer-wins with an authorization gate in front:
//! only signals issued by the owner of the proposal's target document enter
//! the competition at all. A more recent signal from a non-owner can neither
//! override an older owner signal nor flip a pending proposal — it is
//! excluded, not outvoted.
//!
//! Pending is the one implicit state: it is the absence of any trusted
//! signal, computed here as a sum-type value and never persisted. A relay
//! omitting some "pending marker" record is therefore indistinguishable from
//! the truth, because no such record exists.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::AuthorKey;
use crate::record::parse::{Decision, Parsed, StatusSignal, classify_or_drop};
use crate::record::{RecordId, RecordKind, RecordSet};

/// Derived status of a proposal. Computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivedStatus {
    /// No trusted signal seen yet.
    Pending,
    /// Latest trusted signal approves.
    Approved,
    /// Latest trusted signal rejects.
    Rejected,
}

impl DerivedStatus {
    /// Whether the status is terminal (a decision has been derived).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Status name as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Decision> for DerivedStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => Self::Approved,
            Decision::Rejected => Self::Rejected,
        }
    }
}

/// Derive the status of one proposal from the full record set.
///
/// `owner` is the owner key of the proposal's *target document* — the only
/// key whose signals are trusted. Among trusted signals referencing the
/// proposal, the one with the greatest `(created_at, record_id)` wins; the
/// byte-order id tie-break makes two opposite same-second decisions resolve
/// deterministically (reproducible, if not humanly "correct"). No surviving
/// signal means [`DerivedStatus::Pending`].
#[must_use]
pub fn derived_status(
    records: &RecordSet,
    proposal_id: &RecordId,
    owner: &AuthorKey,
) -> DerivedStatus {
    winning_signal(records, proposal_id, owner)
        .map_or(DerivedStatus::Pending, |signal| signal.decision.into())
}

/// The trusted signal that decides a proposal's status, if any.
#[must_use]
pub fn winning_signal(
    records: &RecordSet,
    proposal_id: &RecordId,
    owner: &AuthorKey,
) -> Option<StatusSignal> {
    records
        .iter()
        .filter(|record| {
            matches!(record.kind, RecordKind::AppData | RecordKind::Decision)
        })
        // Authorization gate: untrusted issuers never enter the reduction.
        .filter(|record| record.author == *owner)
        .filter_map(classify_or_drop)
        .filter_map(|parsed| match parsed {
            Parsed::Status(signal) if signal.target_proposal == *proposal_id => Some(signal),
            _ => None,
        })
        .max_by(|a, b| {
            (a.created_at, &a.record_id).cmp(&(b.created_at, &b.record_id))
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
