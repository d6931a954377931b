//! Fetch collaborator interface.
//!
//! Acquiring records is the surrounding application's concern: fetches
//! against relays are concurrent, may complete in any order, and may return
//! overlapping or empty results. The engine only defines the seam — a
//! [`RecordSource`] yields raw records matching a [`RecordFilter`], and the
//! caller folds them into a [`RecordSet`](crate::record::RecordSet) before
//! reducing. Cancellation and timeouts live behind the trait; a stale fetch
//! completing late is harmless because reductions are pure and re-runnable.

use crate::identity::{AuthorKey, DocId, DocIdentity};
use crate::record::{RawRecord, RecordKind};

/// Errors from the transport collaborator, propagated unmodified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The source could not be reached or refused the query.
    #[error("transport failure: {0}")]
    Failure(String),

    /// The source is gone (connection closed, store missing).
    #[error("record source unavailable: {0}")]
    Unavailable(String),
}

/// Criteria a fetched record must satisfy. Empty lists constrain nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Restrict to these kinds.
    pub kinds: Vec<RecordKind>,
    /// Restrict to records signed by these keys.
    pub authors: Vec<AuthorKey>,
    /// Restrict to records whose `d` tag names one of these doc ids.
    pub doc_ids: Vec<DocId>,
    /// Restrict to records whose `a` tag references one of these identities.
    pub refs: Vec<DocIdentity>,
    /// Upper bound on returned records.
    pub limit: Option<usize>,
}

impl RecordFilter {
    /// Match-everything filter.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to kinds.
    #[must_use]
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = RecordKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Restrict to authors.
    #[must_use]
    pub fn authors(mut self, authors: impl IntoIterator<Item = AuthorKey>) -> Self {
        self.authors = authors.into_iter().collect();
        self
    }

    /// Restrict to doc ids (the `d` tag).
    #[must_use]
    pub fn doc_ids(mut self, doc_ids: impl IntoIterator<Item = DocId>) -> Self {
        self.doc_ids = doc_ids.into_iter().collect();
        self
    }

    /// Restrict to docref targets (the `a` tag).
    #[must_use]
    pub fn refs(mut self, refs: impl IntoIterator<Item = DocIdentity>) -> Self {
        self.refs = refs.into_iter().collect();
        self
    }

    /// Bound the number of returned records.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a record satisfies every populated criterion.
    ///
    /// The `limit` bound is the source's concern (it applies to the reply as
    /// a whole, not to one record).
    #[must_use]
    pub fn matches(&self, record: &RawRecord) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&record.kind) {
            return false;
        }
        if !self.authors.is_empty() && !self.authors.contains(&record.author) {
            return false;
        }
        if !self.doc_ids.is_empty()
            && !record
                .tag_values("d")
                .any(|d| self.doc_ids.iter().any(|want| want.as_str() == d))
        {
            return false;
        }
        if !self.refs.is_empty()
            && !record
                .tag_values("a")
                .any(|a| self.refs.iter().any(|want| want.doc_ref() == a))
        {
            return false;
        }
        true
    }
}

/// A store-and-forward collaborator serving raw records.
///
/// Implementations may be a one-shot bounded query or drain an open
/// subscription accumulated since the last call; the engine does not care —
/// it re-reduces over whatever the caller has collected.
pub trait RecordSource {
    /// Fetch records matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the source cannot answer. Partial or
    /// empty replies are not errors.
    fn fetch(&self, filter: &RecordFilter) -> Result<Vec<RawRecord>, TransportError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordId, tag};

    fn record(kind: RecordKind, author: &str, tags: Vec<Vec<String>>) -> RawRecord {
        RawRecord {
            id: RecordId::new("blake3:aa"),
            author: AuthorKey::new_unchecked(author),
            created_at: 1,
            kind,
            tags,
            content: String::new(),
            sig: String::new(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = RecordFilter::any();
        assert!(filter.matches(&record(RecordKind::Document, "f00d", vec![])));
        assert!(filter.matches(&record(RecordKind::Other("x".into()), "beef", vec![])));
    }

    #[test]
    fn kind_filter() {
        let filter = RecordFilter::any().kinds([RecordKind::Document]);
        assert!(filter.matches(&record(RecordKind::Document, "f00d", vec![])));
        assert!(!filter.matches(&record(RecordKind::Decision, "f00d", vec![])));
    }

    #[test]
    fn author_filter() {
        let filter = RecordFilter::any().authors([AuthorKey::new_unchecked("f00d")]);
        assert!(filter.matches(&record(RecordKind::Document, "f00d", vec![])));
        assert!(!filter.matches(&record(RecordKind::Document, "beef", vec![])));
    }

    #[test]
    fn doc_id_filter_reads_d_tags() {
        let filter = RecordFilter::any().doc_ids([DocId::new_unchecked("draft-7")]);
        assert!(filter.matches(&record(
            RecordKind::Document,
            "f00d",
            vec![tag("d", "draft-7")]
        )));
        assert!(!filter.matches(&record(
            RecordKind::Document,
            "f00d",
            vec![tag("d", "draft-8")]
        )));
        assert!(!filter.matches(&record(RecordKind::Document, "f00d", vec![])));
    }

    #[test]
    fn ref_filter_reads_a_tags() {
        let identity = DocIdentity::new(
            AuthorKey::new_unchecked("f00d"),
            DocId::new_unchecked("draft-7"),
        );
        let filter = RecordFilter::any().refs([identity.clone()]);
        assert!(filter.matches(&record(
            RecordKind::AppData,
            "beef",
            vec![tag("a", &identity.doc_ref())]
        )));
        assert!(!filter.matches(&record(
            RecordKind::AppData,
            "beef",
            vec![tag("a", "document:f00d:other")]
        )));
    }

    #[test]
    fn criteria_combine_conjunctively() {
        let filter = RecordFilter::any()
            .kinds([RecordKind::Document])
            .authors([AuthorKey::new_unchecked("f00d")]);
        assert!(filter.matches(&record(RecordKind::Document, "f00d", vec![])));
        assert!(!filter.matches(&record(RecordKind::Document, "beef", vec![])));
        assert!(!filter.matches(&record(RecordKind::Decision, "f00d", vec![])));
    }
}
