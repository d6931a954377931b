//! Engine error taxonomy.
//!
//! No variant is fatal to the engine: every reduction is retryable by
//! re-invoking it with more records. [`EngineError::NotFound`] and
//! [`EngineError::Unauthorized`] carry deliberately distinct messages — one
//! means "wait for more data", the other "you lack permission" — and any UI
//! built on the engine must keep them distinguishable.
//!
//! Malformed records are *not* errors: they are classified drop outcomes
//! ([`crate::record::MalformedRecord`]) counted for diagnostics, and
//! transport failures belong to the fetch collaborator
//! ([`crate::source::TransportError`]).

use crate::identity::{AuthorKey, DocIdentity};
use crate::record::RecordId;
use crate::reduce::DerivedStatus;
use crate::session::SignerError;

/// Errors surfaced by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// No snapshot for this identity is in the record set. Recoverable:
    /// more records may exist on relays not yet consulted.
    #[error("no known state for document {identity}")]
    NotFound {
        /// The identity with no known snapshots.
        identity: DocIdentity,
    },

    /// The referenced proposal record is not in the record set.
    #[error("proposal {id} not found in the record set")]
    ProposalNotFound {
        /// The missing proposal's content address.
        id: RecordId,
    },

    /// The acting key does not own the document the operation targets.
    /// Never retried by the engine.
    #[error("key {actor} is not the owner of {identity}")]
    Unauthorized {
        /// The key that attempted the transition.
        actor: AuthorKey,
        /// The document whose owner key was required.
        identity: DocIdentity,
    },

    /// Approve/reject attempted on an already-decided proposal. A no-op,
    /// not a failure demanding user action: the earlier decision stands.
    #[error("proposal {id} is already {status}; this decision is a no-op")]
    StaleTransition {
        /// The decided proposal.
        id: RecordId,
        /// Its derived terminal status.
        status: DerivedStatus,
    },

    /// An owner tried to propose an edit to their own document. Owners
    /// save directly; proposals are the non-owner path.
    #[error("owners of {identity} save changes directly instead of proposing")]
    OwnerProposal {
        /// The document targeted by the misdirected proposal.
        identity: DocIdentity,
    },

    /// The signing capability refused or failed; propagated unmodified.
    #[error(transparent)]
    Signer(#[from] SignerError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DocId;

    fn identity() -> DocIdentity {
        DocIdentity::new(
            AuthorKey::new_unchecked("f00d"),
            DocId::new_unchecked("draft-7"),
        )
    }

    #[test]
    fn not_found_and_unauthorized_are_distinguishable() {
        let not_found = EngineError::NotFound {
            identity: identity(),
        };
        let unauthorized = EngineError::Unauthorized {
            actor: AuthorKey::new_unchecked("beef"),
            identity: identity(),
        };
        assert_ne!(not_found.to_string(), unauthorized.to_string());
        assert!(not_found.to_string().contains("no known state"));
        assert!(unauthorized.to_string().contains("not the owner"));
    }

    #[test]
    fn stale_transition_names_the_standing_status() {
        let err = EngineError::StaleTransition {
            id: RecordId::new("blake3:prop"),
            status: DerivedStatus::Approved,
        };
        assert!(err.to_string().contains("approved"));
        assert!(err.to_string().contains("no-op"));
    }

    #[test]
    fn signer_error_passes_through() {
        let err: EngineError = SignerError::Unavailable.into();
        assert_eq!(err.to_string(), SignerError::Unavailable.to_string());
    }
}
