//! Classification of raw records into the typed variants the reducers
//! consume.
//!
//! [`classify`] inspects a record's kind discriminant and validates the
//! required tags and body fields. A record that fails validation yields a
//! [`MalformedRecord`] with a classified reason: reducers drop it silently
//! (it never reaches a reduction), while [`malformed`] makes the drops
//! countable for diagnostics. Classification is a pure parse with no side
//! effects.
//!
//! # Status-signal encodings
//!
//! Two encodings of the same fact circulate and both must be accepted:
//!
//! - an `application-data` record whose body is
//!   `{"type":"status_update","status":"approved"}` (older clients put the
//!   status in a `status` tag instead of the JSON field — the tag is the
//!   fallback), and
//! - a `decision` record whose body is the bare marker `approved` or
//!   `rejected`.
//!
//! Both normalize to the same [`StatusSignal`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::{RawRecord, RecordId, RecordKind, RecordSet, Timestamp};
use crate::identity::{AuthorKey, DocIdentity};

/// Body `type` discriminant of an edit proposal payload.
pub const PAYLOAD_EDIT_PROPOSAL: &str = "edit_proposal";

/// Body `type` discriminant of a JSON-encoded status update payload.
pub const PAYLOAD_STATUS_UPDATE: &str = "status_update";

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

/// One full-content revision of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSnapshot {
    /// Content address of the underlying record.
    pub record_id: RecordId,
    /// The identity this snapshot belongs to (signer is the owner).
    pub identity: DocIdentity,
    /// Title tag, if present and non-empty.
    pub title: Option<String>,
    /// Full document text.
    pub content: String,
    /// Whether the document is flagged as accepting proposals.
    pub collaborative: bool,
    /// Whether the document is excluded from public listings.
    pub private: bool,
    /// Claimed creation time.
    pub created_at: Timestamp,
}

/// A proposed replacement for a document's content, awaiting the owner's
/// decision. Immutable once created; its status is derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proposal {
    /// Content address of the underlying record.
    pub record_id: RecordId,
    /// The document the proposal targets.
    pub target: DocIdentity,
    /// Key that signed the proposal.
    pub proposer: AuthorKey,
    /// Content the proposer saw when writing the proposal.
    pub original_content: String,
    /// Content the proposer wants the document to become.
    pub proposed_content: String,
    /// Free-form rationale, if the proposer gave one.
    pub reason: Option<String>,
    /// Claimed creation time.
    pub created_at: Timestamp,
}

/// An owner decision about a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Marker string used in bodies and tags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = MalformedReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(MalformedReason::UnknownStatus(other.to_owned())),
        }
    }
}

/// A record asserting a decision about a specific proposal.
///
/// Whether the signal is *trusted* is not decided here: the status reducer
/// only admits signals whose issuer is the owner of the targeted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSignal {
    /// Content address of the underlying record.
    pub record_id: RecordId,
    /// Content address of the proposal being decided.
    pub target_proposal: RecordId,
    /// Key that signed the signal.
    pub issuer: AuthorKey,
    /// The asserted decision.
    pub decision: Decision,
    /// Claimed creation time.
    pub created_at: Timestamp,
}

/// A request to remove documents from listings.
///
/// Honored by catalog reductions only when the issuer owns the targeted
/// identity; history stays derivable because records are immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionRequest {
    /// Content address of the underlying record.
    pub record_id: RecordId,
    /// Key that signed the request.
    pub issuer: AuthorKey,
    /// Identities the request names.
    pub targets: Vec<DocIdentity>,
    /// Claimed creation time.
    pub created_at: Timestamp,
}

/// Outcome of classifying a raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Snapshot(DocumentSnapshot),
    Proposal(Proposal),
    Status(StatusSignal),
    Deletion(DeletionRequest),
    /// A kind the engine does not consume; ignored by every reduction.
    Foreign,
}

// ---------------------------------------------------------------------------
// Malformed records
// ---------------------------------------------------------------------------

/// Why a record failed required-field validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    /// `created_at` predates the epoch.
    #[error("negative created_at {0}")]
    NegativeTimestamp(i64),

    /// Document record without a `d` tag.
    #[error("document record is missing its d tag")]
    MissingDocId,

    /// Document record whose `d` tag fails id validation.
    #[error("document record carries an invalid doc id '{0}'")]
    BadDocId(String),

    /// Proposal or deletion without an `a` tag.
    #[error("record is missing its target document reference")]
    MissingTargetRef,

    /// `a` tag that is not a valid `document:<owner>:<docId>` reference.
    #[error("invalid target document reference '{0}'")]
    BadTargetRef(String),

    /// Body is not the JSON the kind requires.
    #[error("invalid payload JSON: {0}")]
    BadPayload(String),

    /// JSON body with a `type` the engine does not know.
    #[error("unknown payload type '{0}'")]
    UnknownPayloadType(String),

    /// Status record without an `e` tag naming the proposal.
    #[error("status record is missing its proposal reference")]
    MissingProposalRef,

    /// Status record with no status field, tag, or marker body.
    #[error("status record carries no status value")]
    MissingStatus,

    /// Status value that is neither `approved` nor `rejected`.
    #[error("unknown status value '{0}'")]
    UnknownStatus(String),
}

/// A record dropped by classification, with its content address for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed record {id}: {reason}")]
pub struct MalformedRecord {
    /// Content address of the dropped record.
    pub id: RecordId,
    /// Classified failure.
    pub reason: MalformedReason,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Payload probe: only the `type` discriminant, so the body can be
/// dispatched before full payload deserialization.
#[derive(Deserialize)]
struct PayloadProbe {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ProposalPayload {
    #[serde(rename = "originalContent", default)]
    original_content: String,
    #[serde(rename = "proposedContent")]
    proposed_content: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct StatusPayload {
    #[serde(default)]
    status: Option<String>,
}

/// Classify a raw record into a typed variant.
///
/// # Errors
///
/// Returns [`MalformedRecord`] when a consumed kind fails required-field
/// validation. Kinds the engine does not consume classify as
/// [`Parsed::Foreign`], never as malformed.
pub fn classify(record: &RawRecord) -> Result<Parsed, MalformedRecord> {
    match record.kind {
        RecordKind::Other(_) => return Ok(Parsed::Foreign),
        _ if record.created_at < 0 => {
            return Err(malformed_as(
                record,
                MalformedReason::NegativeTimestamp(record.created_at),
            ));
        }
        _ => {}
    }

    match record.kind {
        RecordKind::Document => classify_document(record),
        RecordKind::AppData => classify_app_data(record),
        RecordKind::Decision => classify_decision(record),
        RecordKind::Deletion => classify_deletion(record),
        RecordKind::Other(_) => Ok(Parsed::Foreign),
    }
}

fn classify_document(record: &RawRecord) -> Result<Parsed, MalformedRecord> {
    let Some(raw_id) = record.tag_value("d") else {
        return Err(malformed_as(record, MalformedReason::MissingDocId));
    };
    let doc_id = raw_id
        .parse()
        .map_err(|_| malformed_as(record, MalformedReason::BadDocId(raw_id.to_owned())))?;

    let title = record
        .tag_value("title")
        .filter(|t| !t.is_empty())
        .map(str::to_owned);

    Ok(Parsed::Snapshot(DocumentSnapshot {
        record_id: record.id.clone(),
        identity: DocIdentity::new(record.author.clone(), doc_id),
        title,
        content: record.content.clone(),
        collaborative: record.has_tag("t", "collaborative"),
        private: record.has_tag("visibility", "private"),
        created_at: record.created_at,
    }))
}

fn classify_app_data(record: &RawRecord) -> Result<Parsed, MalformedRecord> {
    let probe: PayloadProbe = serde_json::from_str(&record.content)
        .map_err(|e| malformed_as(record, MalformedReason::BadPayload(e.to_string())))?;

    match probe.kind.as_str() {
        PAYLOAD_EDIT_PROPOSAL => {
            let payload: ProposalPayload = serde_json::from_str(&record.content)
                .map_err(|e| malformed_as(record, MalformedReason::BadPayload(e.to_string())))?;
            let target = parse_target_ref(record)?;
            Ok(Parsed::Proposal(Proposal {
                record_id: record.id.clone(),
                target,
                proposer: record.author.clone(),
                original_content: payload.original_content,
                proposed_content: payload.proposed_content,
                reason: payload.reason.filter(|r| !r.is_empty()),
                created_at: record.created_at,
            }))
        }
        PAYLOAD_STATUS_UPDATE => {
            let payload: StatusPayload = serde_json::from_str(&record.content)
                .map_err(|e| malformed_as(record, MalformedReason::BadPayload(e.to_string())))?;
            let target_proposal = proposal_ref(record)?;
            // Older clients carried the status in a tag rather than the body.
            let raw_status = payload
                .status
                .or_else(|| record.tag_value("status").map(str::to_owned))
                .ok_or_else(|| malformed_as(record, MalformedReason::MissingStatus))?;
            let decision = raw_status
                .parse()
                .map_err(|reason| malformed_as(record, reason))?;
            Ok(Parsed::Status(StatusSignal {
                record_id: record.id.clone(),
                target_proposal,
                issuer: record.author.clone(),
                decision,
                created_at: record.created_at,
            }))
        }
        other => Err(malformed_as(
            record,
            MalformedReason::UnknownPayloadType(other.to_owned()),
        )),
    }
}

fn classify_decision(record: &RawRecord) -> Result<Parsed, MalformedRecord> {
    let target_proposal = proposal_ref(record)?;
    let decision = record
        .content
        .trim()
        .parse()
        .map_err(|reason| malformed_as(record, reason))?;
    Ok(Parsed::Status(StatusSignal {
        record_id: record.id.clone(),
        target_proposal,
        issuer: record.author.clone(),
        decision,
        created_at: record.created_at,
    }))
}

fn classify_deletion(record: &RawRecord) -> Result<Parsed, MalformedRecord> {
    let mut targets = Vec::new();
    for raw in record.tag_values("a") {
        let identity = raw
            .parse()
            .map_err(|_| malformed_as(record, MalformedReason::BadTargetRef(raw.to_owned())))?;
        targets.push(identity);
    }
    if targets.is_empty() {
        return Err(malformed_as(record, MalformedReason::MissingTargetRef));
    }
    Ok(Parsed::Deletion(DeletionRequest {
        record_id: record.id.clone(),
        issuer: record.author.clone(),
        targets,
        created_at: record.created_at,
    }))
}

fn parse_target_ref(record: &RawRecord) -> Result<DocIdentity, MalformedRecord> {
    let raw = record
        .tag_value("a")
        .ok_or_else(|| malformed_as(record, MalformedReason::MissingTargetRef))?;
    raw.parse()
        .map_err(|_| malformed_as(record, MalformedReason::BadTargetRef(raw.to_owned())))
}

fn proposal_ref(record: &RawRecord) -> Result<RecordId, MalformedRecord> {
    record
        .tag_value("e")
        .map(RecordId::new)
        .ok_or_else(|| malformed_as(record, MalformedReason::MissingProposalRef))
}

fn malformed_as(record: &RawRecord, reason: MalformedReason) -> MalformedRecord {
    MalformedRecord {
        id: record.id.clone(),
        reason,
    }
}

/// Classify for a reduction pass: malformed records are dropped with a debug
/// log and turned into `None`.
pub(crate) fn classify_or_drop(record: &RawRecord) -> Option<Parsed> {
    match classify(record) {
        Ok(parsed) => Some(parsed),
        Err(dropped) => {
            debug!(%dropped, "dropping malformed record from reduction");
            None
        }
    }
}

/// Collect every malformed record in a set, for diagnostics.
///
/// Reducers drop these silently; this pass makes the drops visible and
/// countable without changing any reduction result.
#[must_use]
pub fn malformed(records: &RecordSet) -> Vec<MalformedRecord> {
    records
        .iter()
        .filter_map(|record| classify(record).err())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
