//! Document identity: owning key plus client-generated document id.
//!
//! A document id alone is not globally unique. Ownership is established by
//! the signer of the first snapshot bearing that id, and the pair
//! `(owner, doc_id)` names one logical document. Snapshots carrying the same
//! doc id but a different signer belong to a distinct, unrelated identity.
//!
//! The pair round-trips through the reference string
//! `document:{owner}:{docId}` carried in record tags. Both components reject
//! `:` and whitespace at construction, so the encoding is injective — two
//! distinct identities can never render to the same reference string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leading segment of every document reference string.
pub const DOC_REF_PREFIX: &str = "document";

/// Error returned when an identity component or reference fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The component was empty.
    #[error("identity component is empty")]
    Empty,

    /// The component contained `:` or whitespace, which are reserved by the
    /// reference encoding.
    #[error("identity component '{0}' contains a reserved character")]
    ReservedCharacter(String),

    /// The reference string did not have the `document:<owner>:<docId>` shape.
    #[error("malformed document reference '{0}': expected document:<owner>:<docId>")]
    MalformedRef(String),
}

fn validate_component(raw: &str) -> Result<(), IdentityError> {
    if raw.is_empty() {
        return Err(IdentityError::Empty);
    }
    if raw.contains(':') || raw.chars().any(char::is_whitespace) {
        return Err(IdentityError::ReservedCharacter(raw.to_owned()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// AuthorKey
// ---------------------------------------------------------------------------

/// Public key of a record signer, as an opaque lowercase-hex token.
///
/// The engine never interprets key bytes; it only compares keys for equality
/// when enforcing ownership. Key derivation and verification live behind the
/// signing capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthorKey(String);

impl AuthorKey {
    /// Construct a validated key token.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the token is empty or contains `:` or
    /// whitespace (reserved by the docref encoding).
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = raw.into();
        validate_component(&raw)?;
        Ok(Self(raw))
    }

    /// Construct without validation. Intended for literals known to be valid.
    #[must_use]
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AuthorKey {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AuthorKey {
    type Error = IdentityError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<AuthorKey> for String {
    fn from(key: AuthorKey) -> Self {
        key.0
    }
}

// ---------------------------------------------------------------------------
// DocId
// ---------------------------------------------------------------------------

/// Client-generated opaque document token (the `d` tag value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocId(String);

impl DocId {
    /// Construct a validated document id.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the token is empty or contains `:` or
    /// whitespace (reserved by the docref encoding).
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = raw.into();
        validate_component(&raw)?;
        Ok(Self(raw))
    }

    /// Construct without validation. Intended for literals known to be valid.
    #[must_use]
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DocId {
    type Error = IdentityError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<DocId> for String {
    fn from(id: DocId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// DocIdentity
// ---------------------------------------------------------------------------

/// The `(owner, docId)` pair naming one logical document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocIdentity {
    /// Key that signed the document's snapshots.
    pub owner: AuthorKey,
    /// Client-generated document token.
    pub doc_id: DocId,
}

impl DocIdentity {
    /// Pair an owner key with a document id.
    #[must_use]
    pub const fn new(owner: AuthorKey, doc_id: DocId) -> Self {
        Self { owner, doc_id }
    }

    /// Render the `document:{owner}:{docId}` reference string used in tags.
    #[must_use]
    pub fn doc_ref(&self) -> String {
        format!("{DOC_REF_PREFIX}:{}:{}", self.owner, self.doc_id)
    }
}

impl fmt::Display for DocIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DOC_REF_PREFIX}:{}:{}", self.owner, self.doc_id)
    }
}

impl FromStr for DocIdentity {
    type Err = IdentityError;

    /// Parse a `document:<owner>:<docId>` reference defensively.
    ///
    /// Exactly three segments are required and both components re-validate,
    /// so a reference produced by concatenating hostile components cannot be
    /// conflated with another identity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let prefix = parts.next().unwrap_or_default();
        let owner = parts.next();
        let doc_id = parts.next();
        if prefix != DOC_REF_PREFIX {
            return Err(IdentityError::MalformedRef(s.to_owned()));
        }
        match (owner, doc_id) {
            (Some(owner), Some(doc_id)) => {
                let owner =
                    AuthorKey::new(owner).map_err(|_| IdentityError::MalformedRef(s.to_owned()))?;
                let doc_id =
                    DocId::new(doc_id).map_err(|_| IdentityError::MalformedRef(s.to_owned()))?;
                Ok(Self { owner, doc_id })
            }
            _ => Err(IdentityError::MalformedRef(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
