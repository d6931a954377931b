//! Shared proptest strategies and record builders for the integration
//! suites. Included via `#[path]` from sibling test files.

use proptest::prelude::*;

use quill_core::identity::{AuthorKey, DocId, DocIdentity};
use quill_core::record::{RawRecord, RecordKind, RecordSet, compute_record_id, tag};

/// Fixed owner used by most scenarios.
pub fn owner() -> AuthorKey {
    AuthorKey::new_unchecked("f00d00d0")
}

/// Fixed non-owner.
pub fn visitor() -> AuthorKey {
    AuthorKey::new_unchecked("beefbeef")
}

/// Identity owned by [`owner`].
pub fn doc_identity() -> DocIdentity {
    DocIdentity::new(owner(), DocId::new_unchecked("draft-7"))
}

/// Build a content-addressed snapshot record.
pub fn snapshot_record(
    author: &AuthorKey,
    doc_id: &str,
    created_at: i64,
    content: &str,
) -> RawRecord {
    let tags = vec![tag("d", doc_id), tag("title", "Notes")];
    stamped(author, created_at, RecordKind::Document, tags, content)
}

/// Build a content-addressed proposal record.
pub fn proposal_record(
    author: &AuthorKey,
    target: &DocIdentity,
    created_at: i64,
    proposed: &str,
) -> RawRecord {
    let body = format!(
        r#"{{"type":"edit_proposal","originalContent":"orig","proposedContent":"{proposed}"}}"#
    );
    let tags = vec![tag("a", &target.doc_ref())];
    stamped(author, created_at, RecordKind::AppData, tags, &body)
}

/// Build a content-addressed decision-marker signal.
pub fn signal_record(
    author: &AuthorKey,
    proposal: &RawRecord,
    created_at: i64,
    decision: &str,
) -> RawRecord {
    let tags = vec![tag("e", proposal.id.as_str())];
    stamped(author, created_at, RecordKind::Decision, tags, decision)
}

fn stamped(
    author: &AuthorKey,
    created_at: i64,
    kind: RecordKind,
    tags: Vec<Vec<String>>,
    content: &str,
) -> RawRecord {
    let id = compute_record_id(author, created_at, &kind, &tags, content);
    RawRecord {
        id,
        author: author.clone(),
        created_at,
        kind,
        tags,
        content: content.to_owned(),
        sig: String::new(),
    }
}

/// Strategy: a batch of snapshot (timestamp, content) pairs for one
/// identity. Timestamps deliberately collide often to exercise the id
/// tie-break.
pub fn arb_snapshot_batch() -> impl Strategy<Value = Vec<(i64, String)>> {
    prop::collection::vec((0_i64..50, "[a-z]{0,12}"), 0..20)
}

/// Strategy: owner/non-owner signal descriptions (is_owner, timestamp,
/// approves).
pub fn arb_signal_batch() -> impl Strategy<Value = Vec<(bool, i64, bool)>> {
    prop::collection::vec((any::<bool>(), 0_i64..50, any::<bool>()), 0..12)
}

/// Materialize a snapshot batch into a record set for [`doc_identity`].
pub fn snapshot_set(batch: &[(i64, String)]) -> RecordSet {
    batch
        .iter()
        .map(|(ts, content)| snapshot_record(&owner(), "draft-7", *ts, content))
        .collect()
}
