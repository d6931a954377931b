//! Catalog reducer: document listings derived from a record set.
//!
//! A catalog entry is one document identity with its reconciled head. Two
//! listings exist: the documents authored by one key, and the public feed
//! (every identity whose head is not private). Both honor deletion requests:
//! an owner-issued `delete` record naming an identity's docref removes it
//! from listings. Deletion is a catalog-level filter only — records are
//! immutable and relays may keep serving the snapshots, so the identity's
//! history stays derivable.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::identity::{AuthorKey, DocIdentity};
use crate::record::parse::{DocumentSnapshot, Parsed, classify_or_drop};
use crate::record::{RecordKind, RecordSet};

/// One document identity with its reconciled head snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// The identity.
    pub identity: DocIdentity,
    /// Canonical current snapshot (greatest `(created_at, record_id)`).
    pub head: DocumentSnapshot,
    /// Number of distinct known revisions.
    pub revision_count: usize,
}

/// Documents authored by `author`, newest head first.
#[must_use]
pub fn documents_by(records: &RecordSet, author: &AuthorKey) -> Vec<CatalogEntry> {
    collect(records, |snapshot| snapshot.identity.owner == *author)
}

/// Every document whose head is not private, newest head first.
///
/// Privacy is a property of the head: an owner flips a document public or
/// private by publishing a new snapshot, and the latest write wins like any
/// other field.
#[must_use]
pub fn public_documents(records: &RecordSet) -> Vec<CatalogEntry> {
    let mut entries = collect(records, |_| true);
    entries.retain(|entry| !entry.head.private);
    entries
}

fn collect(
    records: &RecordSet,
    keep: impl Fn(&DocumentSnapshot) -> bool,
) -> Vec<CatalogEntry> {
    let deleted = deleted_identities(records);

    // Group qualifying snapshots per identity; the per-group maximum by
    // (created_at, record_id) is the head.
    let mut groups: BTreeMap<DocIdentity, Vec<DocumentSnapshot>> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| r.kind == RecordKind::Document)
    {
        let Some(Parsed::Snapshot(snapshot)) = classify_or_drop(record) else {
            continue;
        };
        if !keep(&snapshot) || deleted.contains(&snapshot.identity) {
            continue;
        }
        groups.entry(snapshot.identity.clone()).or_default().push(snapshot);
    }

    let mut entries: Vec<CatalogEntry> = groups
        .into_iter()
        .filter_map(|(identity, mut snapshots)| {
            snapshots.sort_by_key(|snap| Reverse((snap.created_at, snap.record_id.clone())));
            let revision_count = snapshots.len();
            let head = snapshots.into_iter().next()?;
            Some(CatalogEntry {
                identity,
                head,
                revision_count,
            })
        })
        .collect();

    entries.sort_by_key(|entry| {
        Reverse((entry.head.created_at, entry.head.record_id.clone()))
    });

    debug!(entries = entries.len(), "reduced document catalog");
    entries
}

/// Identities removed from listings by their own owner.
///
/// A deletion request from anyone else is ignored — the same authorization
/// rule that guards status signals.
fn deleted_identities(records: &RecordSet) -> BTreeSet<DocIdentity> {
    let mut deleted = BTreeSet::new();
    for record in records
        .iter()
        .filter(|r| r.kind == RecordKind::Deletion)
    {
        let Some(Parsed::Deletion(request)) = classify_or_drop(record) else {
            continue;
        };
        for target in request.targets {
            if target.owner == request.issuer {
                deleted.insert(target);
            }
        }
    }
    deleted
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DocId;
    use crate::record::{RawRecord, RecordId, tag};

    fn identity(owner: &str, doc: &str) -> DocIdentity {
        DocIdentity::new(AuthorKey::new_unchecked(owner), DocId::new_unchecked(doc))
    }

    fn snapshot(id: &str, owner: &str, doc: &str, created_at: i64, private: bool) -> RawRecord {
        let mut tags = vec![tag("d", doc), tag("title", "Notes")];
        if private {
            tags.push(tag("visibility", "private"));
        }
        RawRecord {
            id: RecordId::new(id),
            author: AuthorKey::new_unchecked(owner),
            created_at,
            kind: RecordKind::Document,
            tags,
            content: "body".into(),
            sig: String::new(),
        }
    }

    fn deletion(id: &str, issuer: &str, target: &DocIdentity, created_at: i64) -> RawRecord {
        RawRecord {
            id: RecordId::new(id),
            author: AuthorKey::new_unchecked(issuer),
            created_at,
            kind: RecordKind::Deletion,
            tags: vec![tag("a", &target.doc_ref())],
            content: String::new(),
            sig: String::new(),
        }
    }

    #[test]
    fn groups_revisions_into_one_entry() {
        let set: RecordSet = vec![
            snapshot("blake3:aa", "f00d", "draft-7", 100, false),
            snapshot("blake3:bb", "f00d", "draft-7", 300, false),
            snapshot("blake3:cc", "f00d", "draft-8", 200, false),
        ]
        .into_iter()
        .collect();

        let docs = documents_by(&set, &AuthorKey::new_unchecked("f00d"));
        assert_eq!(docs.len(), 2);
        // Newest head first: draft-7's head (300) before draft-8's (200).
        assert_eq!(docs[0].identity, identity("f00d", "draft-7"));
        assert_eq!(docs[0].revision_count, 2);
        assert_eq!(docs[0].head.record_id, RecordId::new("blake3:bb"));
        assert_eq!(docs[1].revision_count, 1);
    }

    #[test]
    fn other_authors_are_excluded() {
        let set: RecordSet = vec![
            snapshot("blake3:aa", "f00d", "draft-7", 100, false),
            snapshot("blake3:bb", "beef", "other", 200, false),
        ]
        .into_iter()
        .collect();

        let docs = documents_by(&set, &AuthorKey::new_unchecked("f00d"));
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].identity.owner.as_str(), "f00d");
    }

    #[test]
    fn public_feed_hides_private_heads() {
        let set: RecordSet = vec![
            snapshot("blake3:aa", "f00d", "open-doc", 100, false),
            snapshot("blake3:bb", "beef", "secret", 200, true),
        ]
        .into_iter()
        .collect();

        let docs = public_documents(&set);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].identity, identity("f00d", "open-doc"));
    }

    #[test]
    fn privacy_follows_the_head() {
        // Was private, latest snapshot made it public.
        let set: RecordSet = vec![
            snapshot("blake3:aa", "f00d", "draft-7", 100, true),
            snapshot("blake3:bb", "f00d", "draft-7", 200, false),
        ]
        .into_iter()
        .collect();

        assert_eq!(public_documents(&set).len(), 1);
    }

    #[test]
    fn owner_deletion_hides_document() {
        let target = identity("f00d", "draft-7");
        let set: RecordSet = vec![
            snapshot("blake3:aa", "f00d", "draft-7", 100, false),
            deletion("blake3:del", "f00d", &target, 200),
        ]
        .into_iter()
        .collect();

        assert!(documents_by(&set, &AuthorKey::new_unchecked("f00d")).is_empty());
        assert!(public_documents(&set).is_empty());
    }

    #[test]
    fn non_owner_deletion_is_ignored() {
        let target = identity("f00d", "draft-7");
        let set: RecordSet = vec![
            snapshot("blake3:aa", "f00d", "draft-7", 100, false),
            deletion("blake3:del", "beef", &target, 200),
        ]
        .into_iter()
        .collect();

        assert_eq!(documents_by(&set, &AuthorKey::new_unchecked("f00d")).len(), 1);
    }

    #[test]
    fn deletion_does_not_erase_history() {
        let target = identity("f00d", "draft-7");
        let set: RecordSet = vec![
            snapshot("blake3:aa", "f00d", "draft-7", 100, false),
            deletion("blake3:del", "f00d", &target, 200),
        ]
        .into_iter()
        .collect();

        let hist = crate::reduce::history(&set, &target);
        assert_eq!(hist.len(), 1, "snapshots stay derivable after deletion");
    }

    #[test]
    fn empty_set_yields_empty_catalog() {
        assert!(documents_by(&RecordSet::new(), &AuthorKey::new_unchecked("f00d")).is_empty());
        assert!(public_documents(&RecordSet::new()).is_empty());
    }
}
