//! Proposal aggregator: join proposals with their derived status.
//!
//! Both entry points run over one shared batched reduction
//! ([`pending_by_identity`]): a single pass over the record set collects the
//! qualifying proposals and the (proposal, issuer) pairs holding a trusted
//! signal, then pending proposals are grouped per identity. Deriving
//! `suggestions_for` and `pending_counts` from the same pass keeps them
//! mutually consistent within one reconciliation — the count for an identity
//! always equals the length of its suggestion list — and avoids re-running
//! the authorization filter once per identity.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::identity::{AuthorKey, DocIdentity};
use crate::record::parse::{Parsed, Proposal, classify_or_drop};
use crate::record::{RecordId, RecordKind, RecordSet};

/// Pending, non-owner-authored proposals for each identity of interest,
/// newest first.
///
/// Proposals authored by an identity's own owner are never surfaced — an
/// owner edits directly rather than suggesting to themselves; such records
/// are a caller error at submission time and are excluded here regardless.
/// Every requested identity is present in the result, with an empty list
/// when nothing is pending.
#[must_use]
pub fn pending_by_identity(
    records: &RecordSet,
    identities: &[DocIdentity],
) -> BTreeMap<DocIdentity, Vec<Proposal>> {
    let mut pending: BTreeMap<DocIdentity, Vec<Proposal>> = identities
        .iter()
        .map(|identity| (identity.clone(), Vec::new()))
        .collect();
    let owners: Vec<&AuthorKey> = identities.iter().map(|identity| &identity.owner).collect();

    // One pass: qualifying proposals, and the set of (proposal, issuer)
    // pairs holding any trusted signal. Pending is the absence of a trusted
    // signal, so presence is all that matters — which way the latest signal
    // decides is the status reducer's concern, not the aggregator's.
    let mut proposals: Vec<Proposal> = Vec::new();
    let mut decided: BTreeSet<(RecordId, AuthorKey)> = BTreeSet::new();

    for record in records
        .iter()
        .filter(|r| matches!(r.kind, RecordKind::AppData | RecordKind::Decision))
    {
        match classify_or_drop(record) {
            Some(Parsed::Proposal(proposal)) => {
                if pending.contains_key(&proposal.target)
                    && proposal.proposer != proposal.target.owner
                {
                    proposals.push(proposal);
                }
            }
            Some(Parsed::Status(signal)) => {
                if owners.contains(&&signal.issuer) {
                    decided.insert((signal.target_proposal, signal.issuer));
                }
            }
            _ => {}
        }
    }

    let total = proposals.len();
    for proposal in proposals {
        let settled = decided.contains(&(
            proposal.record_id.clone(),
            proposal.target.owner.clone(),
        ));
        if settled {
            continue;
        }
        if let Some(list) = pending.get_mut(&proposal.target) {
            list.push(proposal);
        }
    }

    for list in pending.values_mut() {
        list.sort_by(|a, b| {
            (b.created_at, &b.record_id).cmp(&(a.created_at, &a.record_id))
        });
    }

    debug!(
        identities = identities.len(),
        proposals = total,
        "reduced pending proposals"
    );

    pending
}

/// Pending suggestions for one identity, newest first.
#[must_use]
pub fn suggestions_for(records: &RecordSet, identity: &DocIdentity) -> Vec<Proposal> {
    pending_by_identity(records, std::slice::from_ref(identity))
        .remove(identity)
        .unwrap_or_default()
}

/// Pending-proposal count per identity, computed in one batched reduction.
#[must_use]
pub fn pending_counts(
    records: &RecordSet,
    identities: &[DocIdentity],
) -> BTreeMap<DocIdentity, usize> {
    pending_by_identity(records, identities)
        .into_iter()
        .map(|(identity, proposals)| (identity, proposals.len()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
