//! Raw record model for relay-replicated facts.
//!
//! A record is an immutable, signed, timestamped fact broadcast to relays.
//! This module defines the wire shape ([`RawRecord`]), the kind discriminant
//! ([`RecordKind`]), the content-addressed identifier ([`RecordId`]), and the
//! unsigned draft form ([`RecordDraft`]) that the signing capability turns
//! into a broadcastable record.
//!
//! # Wire shape
//!
//! ```json
//! {
//!   "id": "blake3:<hex>",
//!   "author": "<hex key>",
//!   "created_at": 1720000000,
//!   "kind": "document",
//!   "tags": [["d", "draft-7"], ["title", "Notes"]],
//!   "content": "...",
//!   "sig": "<hex>"
//! }
//! ```
//!
//! `id` is a deterministic function of the signed fields (see
//! [`hash::compute_record_id`]); two records with identical signed fields
//! collapse to one logical fact no matter how many relays returned a copy.

pub mod hash;
pub mod parse;
pub mod set;

pub use hash::{compute_record_id, verify_record_id};
pub use parse::{
    Decision, DeletionRequest, DocumentSnapshot, MalformedReason, MalformedRecord, Parsed,
    Proposal, StatusSignal, classify, malformed,
};
pub use set::RecordSet;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::identity::AuthorKey;

/// Unix timestamp in whole seconds.
///
/// Clock-granularity collisions between records are expected; every ordering
/// in the engine breaks ties with the byte order of [`RecordId`].
pub type Timestamp = i64;

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

/// Kind discriminant of a raw record.
///
/// Kinds the engine does not consume deserialize as [`RecordKind::Other`]
/// and are ignored by every reduction — a relay mixing unrelated traffic
/// into a reply must not poison the record set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Full-content document snapshot; signer is the owner.
    Document,
    /// Application data: an edit proposal or a JSON-encoded status update.
    AppData,
    /// Bare approve/reject marker for a proposal.
    Decision,
    /// Request to remove a document from listings.
    Deletion,
    /// Any kind the engine does not consume.
    Other(String),
}

impl RecordKind {
    /// Canonical string representation used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Document => "document",
            Self::AppData => "application-data",
            Self::Decision => "decision",
            Self::Deletion => "delete",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "document" => Self::Document,
            "application-data" => Self::AppData,
            "decision" => Self::Decision,
            "delete" => Self::Deletion,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl Serialize for RecordKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(Self::Other(s)))
    }
}

// ---------------------------------------------------------------------------
// RecordId
// ---------------------------------------------------------------------------

/// Content-addressed record identifier, `blake3:<lowercase hex>`.
///
/// `Ord` is the derived lexicographic byte comparison of the string form —
/// the fixed tie-break comparator used wherever two records share a
/// timestamp. It is total and ingestion-order independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an id string as received from the wire or a hash computation.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RawRecord
// ---------------------------------------------------------------------------

/// A signed record exactly as relays store and serve it.
///
/// The engine treats records as opaque until classification
/// ([`parse::classify`]) and never mutates one. Signature bytes are carried
/// verbatim for the out-of-scope verification capability; the engine itself
/// only relies on the content address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Content address of the signed fields.
    pub id: RecordId,
    /// Public key of the signer.
    pub author: AuthorKey,
    /// Unix-second creation time claimed by the signer.
    pub created_at: Timestamp,
    /// Kind discriminant.
    pub kind: RecordKind,
    /// Free-form tag list; each tag is a non-empty array of strings whose
    /// first element is the tag name.
    pub tags: Vec<Vec<String>>,
    /// Body text.
    pub content: String,
    /// Signature over the content address, hex-encoded.
    pub sig: String,
}

impl RawRecord {
    /// First value of the first tag named `name`, if any.
    #[must_use]
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.first().is_some_and(|n| n == name))
            .and_then(|tag| tag.get(1))
            .map(String::as_str)
    }

    /// All values of tags named `name`, in tag order.
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.tags
            .iter()
            .filter(move |tag| tag.first().is_some_and(|n| n == name))
            .filter_map(|tag| tag.get(1))
            .map(String::as_str)
    }

    /// Whether a tag named `name` carries exactly `value`.
    #[must_use]
    pub fn has_tag(&self, name: &str, value: &str) -> bool {
        self.tag_values(name).any(|v| v == value)
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.created_at, self.author, self.kind, self.id
        )
    }
}

// ---------------------------------------------------------------------------
// RecordDraft
// ---------------------------------------------------------------------------

/// An unsigned record: everything but the author, id, and signature.
///
/// Drafts are produced by the engine's record constructors ([`crate::ops`])
/// and handed to the signing capability ([`crate::session::Signer`]), which
/// stamps the author, computes the content address, and attaches the
/// signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    /// Unix-second creation time to claim.
    pub created_at: Timestamp,
    /// Kind discriminant.
    pub kind: RecordKind,
    /// Tag list.
    pub tags: Vec<Vec<String>>,
    /// Body text.
    pub content: String,
}

impl RecordDraft {
    /// Assemble a draft.
    #[must_use]
    pub const fn new(
        kind: RecordKind,
        tags: Vec<Vec<String>>,
        content: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            created_at,
            kind,
            tags,
            content,
        }
    }
}

/// Build a two-element tag.
#[must_use]
pub fn tag(name: &str, value: &str) -> Vec<String> {
    vec![name.to_owned(), value.to_owned()]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
