//! Signing sessions.
//!
//! The engine never holds an ambient "current signer": every operation that
//! signs or authorizes takes an explicit [`ActiveSession`], so concurrent
//! test scenarios can simulate multiple actors without process-wide state.
//!
//! Actual signature cryptography is a capability supplied from outside the
//! engine behind the [`Signer`] trait. [`LocalSigner`] is the development
//! implementation: key and signature are derived by hashing a secret, which
//! is enough to exercise every engine path deterministically. Production
//! deployments plug a real Schnorr signer behind the same trait.

use crate::identity::AuthorKey;
use crate::record::{RawRecord, RecordDraft, compute_record_id};

/// Errors from the signing capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// No signer is active for this session.
    #[error("signing unavailable: no active signer")]
    Unavailable,

    /// The signer failed to produce a signature.
    #[error("signing failed: {0}")]
    Failed(String),
}

/// A capability that can turn record drafts into signed records.
pub trait Signer {
    /// The public key this signer signs as.
    fn author_key(&self) -> &AuthorKey;

    /// Stamp the author, compute the content address, and attach a
    /// signature.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError`] when the underlying capability is missing or
    /// fails (e.g. a remote signer that went away).
    fn sign(&self, draft: RecordDraft) -> Result<RawRecord, SignerError>;
}

/// The acting identity for one engine call.
///
/// A thin wrapper so operation signatures say "who is acting" rather than
/// "here is a signer" — and so a session can later carry more than the
/// signer without touching every call site.
#[derive(Clone, Copy)]
pub struct ActiveSession<'a> {
    signer: &'a dyn Signer,
}

impl<'a> ActiveSession<'a> {
    /// Open a session over a signer.
    #[must_use]
    pub const fn new(signer: &'a dyn Signer) -> Self {
        Self { signer }
    }

    /// Key the session acts as.
    #[must_use]
    pub fn key(&self) -> &AuthorKey {
        self.signer.author_key()
    }

    /// Sign a draft as this session's key.
    ///
    /// # Errors
    ///
    /// Propagates [`SignerError`] from the capability unmodified.
    pub fn sign(&self, draft: RecordDraft) -> Result<RawRecord, SignerError> {
        self.signer.sign(draft)
    }
}

impl std::fmt::Debug for ActiveSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession")
            .field("key", self.signer.author_key())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// LocalSigner
// ---------------------------------------------------------------------------

/// Development signer deriving key and signature from a secret string.
///
/// Not cryptography: the "signature" is a keyed hash binding the secret to
/// the record's content address, sufficient for deterministic tests and
/// local tooling. Anything that must resist forgery needs a real signer.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    key: AuthorKey,
    secret: String,
}

impl LocalSigner {
    /// Derive a signer from a secret.
    #[must_use]
    pub fn from_secret(secret: &str) -> Self {
        let key_hash = blake3::hash(format!("quill-key:{secret}").as_bytes());
        Self {
            key: AuthorKey::new_unchecked(key_hash.to_string()),
            secret: secret.to_owned(),
        }
    }
}

impl Signer for LocalSigner {
    fn author_key(&self) -> &AuthorKey {
        &self.key
    }

    fn sign(&self, draft: RecordDraft) -> Result<RawRecord, SignerError> {
        let id = compute_record_id(
            &self.key,
            draft.created_at,
            &draft.kind,
            &draft.tags,
            &draft.content,
        );
        let sig = blake3::hash(format!("quill-sig:{}:{}", self.secret, id).as_bytes());
        Ok(RawRecord {
            id,
            author: self.key.clone(),
            created_at: draft.created_at,
            kind: draft.kind,
            tags: draft.tags,
            content: draft.content,
            sig: sig.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordKind, tag, verify_record_id};

    fn draft() -> RecordDraft {
        RecordDraft::new(
            RecordKind::Document,
            vec![tag("d", "draft-7")],
            "body".into(),
            1_720_000_000,
        )
    }

    #[test]
    fn same_secret_same_key() {
        let a = LocalSigner::from_secret("hunter2");
        let b = LocalSigner::from_secret("hunter2");
        assert_eq!(a.author_key(), b.author_key());
    }

    #[test]
    fn different_secret_different_key() {
        let a = LocalSigner::from_secret("hunter2");
        let b = LocalSigner::from_secret("hunter3");
        assert_ne!(a.author_key(), b.author_key());
    }

    #[test]
    fn signed_record_is_content_addressed() {
        let signer = LocalSigner::from_secret("hunter2");
        let record = signer.sign(draft()).expect("signs");
        assert!(verify_record_id(&record));
        assert_eq!(record.author, *signer.author_key());
        assert!(!record.sig.is_empty());
    }

    #[test]
    fn signing_is_deterministic() {
        let signer = LocalSigner::from_secret("hunter2");
        let a = signer.sign(draft()).expect("signs");
        let b = signer.sign(draft()).expect("signs");
        assert_eq!(a, b);
    }

    #[test]
    fn session_exposes_key_and_signs() {
        let signer = LocalSigner::from_secret("hunter2");
        let session = ActiveSession::new(&signer);
        assert_eq!(session.key(), signer.author_key());
        let record = session.sign(draft()).expect("signs");
        assert_eq!(record.author, *session.key());
    }
}
