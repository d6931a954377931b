//! Owner-gated operations: validate preconditions, construct the records a
//! state change implies, and sign them.
//!
//! The engine performs no network action. Each operation here returns the
//! signed record(s) for the caller to broadcast; state "changes" only when
//! those records are ingested back into a record set and the reductions are
//! re-run. All preconditions are checked against the record set passed in —
//! an explicit [`ActiveSession`] supplies the acting key, and an explicit
//! `now` timestamp keeps the functions pure.
//!
//! The proposal lifecycle is `pending → {approved, rejected}`, terminal on
//! both sides. An approval emits two records: a new snapshot whose content
//! is the proposal's proposed content with the head's tags carried over
//! unchanged (content swap, metadata preserved), and the owner's status
//! signal. A rejection emits only the signal.

use tracing::info;

use crate::error::EngineError;
use crate::identity::{DocId, DocIdentity};
use crate::record::parse::{
    Decision, DocumentSnapshot, PAYLOAD_EDIT_PROPOSAL, Parsed, Proposal, classify,
};
use crate::record::{RawRecord, RecordDraft, RecordId, RecordKind, RecordSet, Timestamp, tag};
use crate::reduce::{derived_status, history};
use crate::session::ActiveSession;

/// The two records an approval implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRecords {
    /// New head snapshot carrying the proposal's content.
    pub snapshot: RawRecord,
    /// Owner-issued approval signal.
    pub signal: RawRecord,
}

// ---------------------------------------------------------------------------
// Document lifecycle
// ---------------------------------------------------------------------------

/// Create a new document owned by the session key.
///
/// `doc_id` is the client-generated opaque token; the caller supplies the
/// entropy (the engine stays deterministic). New documents are flagged
/// collaborative — accepting proposals is the point of publishing here.
///
/// # Errors
///
/// Propagates signing failures.
pub fn create_document(
    session: &ActiveSession<'_>,
    doc_id: DocId,
    title: &str,
    content: &str,
    private: bool,
    now: Timestamp,
) -> Result<(DocIdentity, RawRecord), EngineError> {
    let identity = DocIdentity::new(session.key().clone(), doc_id);
    let mut tags = vec![
        tag("d", identity.doc_id.as_str()),
        tag("title", title),
        tag("t", "collaborative"),
    ];
    if private {
        tags.push(tag("visibility", "private"));
    }
    let record = session.sign(RecordDraft::new(
        RecordKind::Document,
        tags,
        content.to_owned(),
        now,
    ))?;
    info!(identity = %identity, record = %record.id, "created document");
    Ok((identity, record))
}

/// Publish a new revision of an owned document (direct save).
///
/// Tags are carried over from the current head; only the content changes.
///
/// # Errors
///
/// [`EngineError::Unauthorized`] when the session key is not the owner,
/// [`EngineError::NotFound`] when the identity has no known snapshot.
pub fn save_document(
    session: &ActiveSession<'_>,
    records: &RecordSet,
    identity: &DocIdentity,
    content: &str,
    now: Timestamp,
) -> Result<RawRecord, EngineError> {
    require_owner(session, identity)?;
    let head = current_head(records, identity)?;
    let record = session.sign(snapshot_draft(&head, content, now))?;
    info!(identity = %identity, record = %record.id, "saved revision");
    Ok(record)
}

/// Remove an owned document from listings.
///
/// # Errors
///
/// [`EngineError::Unauthorized`] when the session key is not the owner,
/// [`EngineError::NotFound`] when the identity has no known snapshot.
pub fn delete_document(
    session: &ActiveSession<'_>,
    records: &RecordSet,
    identity: &DocIdentity,
    reason: Option<&str>,
    now: Timestamp,
) -> Result<RawRecord, EngineError> {
    require_owner(session, identity)?;
    let head = current_head(records, identity)?;
    let record = session.sign(RecordDraft::new(
        RecordKind::Deletion,
        vec![
            tag("e", head.record_id.as_str()),
            tag("a", &identity.doc_ref()),
        ],
        reason.unwrap_or_default().to_owned(),
        now,
    ))?;
    info!(identity = %identity, record = %record.id, "requested deletion");
    Ok(record)
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

/// Propose replacement content for someone else's document.
///
/// The original content is captured from the current head so the owner can
/// see what the proposer was looking at.
///
/// # Errors
///
/// [`EngineError::OwnerProposal`] when the session key owns the target
/// (owners save directly), [`EngineError::NotFound`] when the identity has
/// no known snapshot.
pub fn propose_edit(
    session: &ActiveSession<'_>,
    records: &RecordSet,
    identity: &DocIdentity,
    proposed_content: &str,
    reason: Option<&str>,
    now: Timestamp,
) -> Result<RawRecord, EngineError> {
    if *session.key() == identity.owner {
        return Err(EngineError::OwnerProposal {
            identity: identity.clone(),
        });
    }
    let head = current_head(records, identity)?;
    let payload = serde_json::json!({
        "type": PAYLOAD_EDIT_PROPOSAL,
        "originalContent": head.content,
        "proposedContent": proposed_content,
        "reason": reason.unwrap_or("No reason provided"),
    });
    let record = session.sign(RecordDraft::new(
        RecordKind::AppData,
        vec![tag("a", &identity.doc_ref())],
        payload.to_string(),
        now,
    ))?;
    info!(identity = %identity, record = %record.id, "proposed edit");
    Ok(record)
}

/// Approve a pending proposal against a document the session owns.
///
/// Emits the new snapshot (content swap, head metadata preserved) and the
/// approval signal. The caller broadcasts both.
///
/// # Errors
///
/// [`EngineError::ProposalNotFound`] when the proposal record is absent,
/// [`EngineError::Unauthorized`] when the session key does not own the
/// target, [`EngineError::NotFound`] when the target has no known snapshot,
/// [`EngineError::StaleTransition`] when the proposal is already decided
/// (the earlier decision stands; re-deciding is a no-op).
pub fn approve(
    session: &ActiveSession<'_>,
    records: &RecordSet,
    proposal_id: &RecordId,
    now: Timestamp,
) -> Result<ApprovalRecords, EngineError> {
    let (proposal, head) = decidable_proposal(session, records, proposal_id)?;

    let snapshot = session.sign(snapshot_draft(&head, &proposal.proposed_content, now))?;
    let signal = session.sign(signal_draft(&proposal, Decision::Approved, now))?;
    info!(
        proposal = %proposal.record_id,
        snapshot = %snapshot.id,
        "approved proposal"
    );
    Ok(ApprovalRecords { snapshot, signal })
}

/// Reject a pending proposal against a document the session owns.
///
/// Emits only the rejection signal; the document content is untouched.
///
/// # Errors
///
/// Same preconditions as [`approve`].
pub fn reject(
    session: &ActiveSession<'_>,
    records: &RecordSet,
    proposal_id: &RecordId,
    now: Timestamp,
) -> Result<RawRecord, EngineError> {
    let (proposal, _head) = decidable_proposal(session, records, proposal_id)?;

    let signal = session.sign(signal_draft(&proposal, Decision::Rejected, now))?;
    info!(proposal = %proposal.record_id, "rejected proposal");
    Ok(signal)
}

// ---------------------------------------------------------------------------
// Shared preconditions and drafts
// ---------------------------------------------------------------------------

/// Locate a proposal and validate every approve/reject precondition.
fn decidable_proposal(
    session: &ActiveSession<'_>,
    records: &RecordSet,
    proposal_id: &RecordId,
) -> Result<(Proposal, DocumentSnapshot), EngineError> {
    let proposal = find_proposal(records, proposal_id)?;
    require_owner(session, &proposal.target)?;
    let head = current_head(records, &proposal.target)?;

    let status = derived_status(records, proposal_id, &proposal.target.owner);
    if status.is_terminal() {
        return Err(EngineError::StaleTransition {
            id: proposal_id.clone(),
            status,
        });
    }
    Ok((proposal, head))
}

fn find_proposal(records: &RecordSet, proposal_id: &RecordId) -> Result<Proposal, EngineError> {
    let not_found = || EngineError::ProposalNotFound {
        id: proposal_id.clone(),
    };
    let record = records.get(proposal_id).ok_or_else(not_found)?;
    match classify(record) {
        Ok(Parsed::Proposal(proposal)) => Ok(proposal),
        _ => Err(not_found()),
    }
}

fn require_owner(
    session: &ActiveSession<'_>,
    identity: &DocIdentity,
) -> Result<(), EngineError> {
    if *session.key() == identity.owner {
        Ok(())
    } else {
        Err(EngineError::Unauthorized {
            actor: session.key().clone(),
            identity: identity.clone(),
        })
    }
}

fn current_head(
    records: &RecordSet,
    identity: &DocIdentity,
) -> Result<DocumentSnapshot, EngineError> {
    history(records, identity)
        .head()
        .cloned()
        .ok_or_else(|| EngineError::NotFound {
            identity: identity.clone(),
        })
}

/// New-revision draft: the head's metadata tags rebuilt unchanged, content
/// swapped.
fn snapshot_draft(head: &DocumentSnapshot, content: &str, now: Timestamp) -> RecordDraft {
    let mut tags = vec![tag("d", head.identity.doc_id.as_str())];
    if let Some(title) = &head.title {
        tags.push(tag("title", title));
    }
    if head.collaborative {
        tags.push(tag("t", "collaborative"));
    }
    if head.private {
        tags.push(tag("visibility", "private"));
    }
    RecordDraft::new(RecordKind::Document, tags, content.to_owned(), now)
}

/// Decision-marker signal draft referencing the proposal and its proposer.
fn signal_draft(proposal: &Proposal, decision: Decision, now: Timestamp) -> RecordDraft {
    RecordDraft::new(
        RecordKind::Decision,
        vec![
            tag("e", proposal.record_id.as_str()),
            tag("p", proposal.proposer.as_str()),
            tag("a", &proposal.target.doc_ref()),
        ],
        decision.as_str().to_owned(),
        now,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::{DerivedStatus, suggestions_for};
    use crate::session::{LocalSigner, Signer};

    fn owner_signer() -> LocalSigner {
        LocalSigner::from_secret("owner")
    }

    fn visitor_signer() -> LocalSigner {
        LocalSigner::from_secret("visitor")
    }

    /// Owner publishes a document; returns (identity, record set).
    fn seeded_doc() -> (DocIdentity, RecordSet) {
        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let (identity, record) = create_document(
            &session,
            DocId::new_unchecked("draft-7"),
            "Notes",
            "original body",
            false,
            100,
        )
        .expect("create");
        let mut set = RecordSet::new();
        set.insert(record);
        (identity, set)
    }

    /// Visitor proposes replacement content; returns the proposal id.
    fn seeded_proposal(identity: &DocIdentity, set: &mut RecordSet) -> RecordId {
        let signer = visitor_signer();
        let session = ActiveSession::new(&signer);
        let record = propose_edit(&session, set, identity, "proposed body", Some("typo"), 200)
            .expect("propose");
        let id = record.id.clone();
        set.insert(record);
        id
    }

    // === create / save ===

    #[test]
    fn create_then_history_has_one_revision() {
        let (identity, set) = seeded_doc();
        let hist = history(&set, &identity);
        assert_eq!(hist.len(), 1);
        let head = hist.head().expect("head");
        assert_eq!(head.content, "original body");
        assert_eq!(head.title.as_deref(), Some("Notes"));
        assert!(head.collaborative);
    }

    #[test]
    fn save_carries_tags_and_becomes_head() {
        let (identity, mut set) = seeded_doc();
        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let record =
            save_document(&session, &set, &identity, "second body", 300).expect("save");
        set.insert(record);

        let hist = history(&set, &identity);
        assert_eq!(hist.len(), 2);
        let head = hist.head().expect("head");
        assert_eq!(head.content, "second body");
        assert_eq!(head.title.as_deref(), Some("Notes"));
        assert!(head.collaborative);
    }

    #[test]
    fn save_by_non_owner_is_unauthorized() {
        let (identity, set) = seeded_doc();
        let signer = visitor_signer();
        let session = ActiveSession::new(&signer);
        let err = save_document(&session, &set, &identity, "hijack", 300).unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized { .. }));
    }

    #[test]
    fn save_unknown_identity_is_not_found() {
        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let identity = DocIdentity::new(session.key().clone(), DocId::new_unchecked("ghost"));
        let err = save_document(&session, &RecordSet::new(), &identity, "x", 1).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    // === propose ===

    #[test]
    fn propose_captures_head_content() {
        let (identity, mut set) = seeded_doc();
        let id = seeded_proposal(&identity, &mut set);

        let suggestions = suggestions_for(&set, &identity);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].record_id, id);
        assert_eq!(suggestions[0].original_content, "original body");
        assert_eq!(suggestions[0].proposed_content, "proposed body");
    }

    #[test]
    fn owner_cannot_propose_to_themselves() {
        let (identity, set) = seeded_doc();
        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let err = propose_edit(&session, &set, &identity, "self", None, 200).unwrap_err();
        assert!(matches!(err, EngineError::OwnerProposal { .. }));
    }

    // === approve ===

    #[test]
    fn approve_emits_snapshot_and_signal() {
        let (identity, mut set) = seeded_doc();
        let proposal_id = seeded_proposal(&identity, &mut set);

        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let records = approve(&session, &set, &proposal_id, 300).expect("approve");

        // Snapshot: content swapped, metadata preserved.
        assert_eq!(records.snapshot.content, "proposed body");
        assert_eq!(records.snapshot.tag_value("title"), Some("Notes"));
        assert!(records.snapshot.has_tag("t", "collaborative"));
        assert_eq!(records.snapshot.author, *session.key());

        // Signal: owner-issued approval referencing proposal and proposer.
        assert_eq!(records.signal.content, "approved");
        assert_eq!(
            records.signal.tag_value("e"),
            Some(proposal_id.as_str())
        );
        let visitor = visitor_signer();
        assert_eq!(
            records.signal.tag_value("p"),
            Some(visitor.author_key().as_str())
        );

        // Ingest both and re-reduce: head advanced, proposal settled.
        set.extend(vec![records.snapshot, records.signal]);
        let head = history(&set, &identity).head().cloned().expect("head");
        assert_eq!(head.content, "proposed body");
        assert_eq!(
            derived_status(&set, &proposal_id, &identity.owner),
            DerivedStatus::Approved
        );
        assert!(suggestions_for(&set, &identity).is_empty());
    }

    #[test]
    fn approve_by_non_owner_is_unauthorized() {
        let (identity, mut set) = seeded_doc();
        let proposal_id = seeded_proposal(&identity, &mut set);

        let signer = visitor_signer();
        let session = ActiveSession::new(&signer);
        let err = approve(&session, &set, &proposal_id, 300).unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized { .. }));
    }

    #[test]
    fn approve_decided_proposal_is_stale() {
        let (identity, mut set) = seeded_doc();
        let proposal_id = seeded_proposal(&identity, &mut set);

        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let first = approve(&session, &set, &proposal_id, 300).expect("approve");
        set.extend(vec![first.snapshot, first.signal]);

        let err = approve(&session, &set, &proposal_id, 400).unwrap_err();
        assert!(matches!(
            err,
            EngineError::StaleTransition {
                status: DerivedStatus::Approved,
                ..
            }
        ));
    }

    #[test]
    fn approve_unknown_proposal_fails() {
        let (_identity, set) = seeded_doc();
        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let err = approve(&session, &set, &RecordId::new("blake3:ghost"), 300).unwrap_err();
        assert!(matches!(err, EngineError::ProposalNotFound { .. }));
    }

    // === reject ===

    #[test]
    fn reject_emits_signal_only_and_keeps_content() {
        let (identity, mut set) = seeded_doc();
        let proposal_id = seeded_proposal(&identity, &mut set);

        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let signal = reject(&session, &set, &proposal_id, 300).expect("reject");
        assert_eq!(signal.content, "rejected");
        set.insert(signal);

        let head = history(&set, &identity).head().cloned().expect("head");
        assert_eq!(head.content, "original body", "rejection leaves content");
        assert_eq!(
            derived_status(&set, &proposal_id, &identity.owner),
            DerivedStatus::Rejected
        );
        assert!(suggestions_for(&set, &identity).is_empty());
    }

    #[test]
    fn reject_after_reject_is_stale() {
        let (identity, mut set) = seeded_doc();
        let proposal_id = seeded_proposal(&identity, &mut set);

        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let signal = reject(&session, &set, &proposal_id, 300).expect("reject");
        set.insert(signal);

        let err = reject(&session, &set, &proposal_id, 400).unwrap_err();
        assert!(matches!(err, EngineError::StaleTransition { .. }));
    }

    // === delete ===

    #[test]
    fn delete_hides_from_catalog() {
        let (identity, mut set) = seeded_doc();
        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let record =
            delete_document(&session, &set, &identity, Some("obsolete"), 300).expect("delete");
        set.insert(record);

        assert!(crate::reduce::documents_by(&set, &identity.owner).is_empty());
    }

    #[test]
    fn delete_by_non_owner_is_unauthorized() {
        let (identity, set) = seeded_doc();
        let signer = visitor_signer();
        let session = ActiveSession::new(&signer);
        let err = delete_document(&session, &set, &identity, None, 300).unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized { .. }));
    }

    #[test]
    fn private_flag_is_preserved_across_approval() {
        let signer = owner_signer();
        let session = ActiveSession::new(&signer);
        let (identity, record) = create_document(
            &session,
            DocId::new_unchecked("secret-doc"),
            "Secret",
            "v1",
            true,
            100,
        )
        .expect("create");
        let mut set = RecordSet::new();
        set.insert(record);
        let proposal_id = seeded_proposal(&identity, &mut set);

        let records = approve(&session, &set, &proposal_id, 300).expect("approve");
        assert!(records.snapshot.has_tag("visibility", "private"));
    }
}
