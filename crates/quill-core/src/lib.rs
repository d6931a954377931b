//! quill-core: reconciliation engine for relay-replicated collaborative
//! documents.
//!
//! Canonical state lives nowhere: every change is a signed, immutable record
//! broadcast to independent, possibly-lagging, possibly-lying relays, and
//! any client holds a different partial view of history. This crate turns
//! whatever record set a client has collected into derived state —
//! deterministically, from scratch, on every call:
//!
//! - [`reduce::history`] — ordered revision history and canonical head per
//!   document identity.
//! - [`reduce::derived_status`] — authoritative proposal status
//!   (last-writer-wins behind an owner-only authorization gate).
//! - [`reduce::suggestions_for`] / [`reduce::pending_counts`] — actionable
//!   proposals per document, batched and mutually consistent.
//! - [`reduce::documents_by`] / [`reduce::public_documents`] — document
//!   catalogs honoring deletion requests.
//! - [`ops`] — the owner-gated approval state machine and record
//!   constructors; returns signed records for the caller to broadcast.
//! - [`diff`] — order-stable LCS edit scripts between revisions.
//!
//! Reductions are synchronous, pure, and reentrant: no I/O, no shared
//! mutable state, same records in → same state out. Ingest more records and
//! reduce again; already-settled facts never regress.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at the engine surface
//!   ([`EngineError`]); malformed records are classified drop outcomes, not
//!   errors.
//! - **Logging**: `tracing` macros (`debug!` for reduction sizes and drops,
//!   `info!` for constructed records).

pub mod diff;
pub mod error;
pub mod identity;
pub mod ops;
pub mod record;
pub mod reduce;
pub mod session;
pub mod source;

pub use diff::{Diff, DiffOp, DiffSpan, diff};
pub use error::EngineError;
pub use identity::{AuthorKey, DocId, DocIdentity, IdentityError};
pub use record::{
    Decision, DeletionRequest, DocumentSnapshot, MalformedReason, MalformedRecord, Parsed,
    Proposal, RawRecord, RecordDraft, RecordId, RecordKind, RecordSet, StatusSignal, Timestamp,
    classify, compute_record_id, malformed, verify_record_id,
};
pub use reduce::{
    CatalogEntry, DerivedStatus, RevisionHistory, derived_status, documents_by, history,
    pending_counts, public_documents, suggestions_for,
};
pub use session::{ActiveSession, LocalSigner, Signer, SignerError};
pub use source::{RecordFilter, RecordSource, TransportError};
