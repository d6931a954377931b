//! Command implementations and shared command context.

pub mod completions;
pub mod config;
pub mod create;
pub mod decide;
pub mod delete;
pub mod diff;
pub mod docs;
pub mod history;
pub mod ingest;
pub mod propose;
pub mod save;
pub mod show;
pub mod suggestions;

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, bail};

use quill_core::identity::DocIdentity;
use quill_core::record::{Parsed, RecordId, RecordKind, RecordSet, classify};
use quill_core::session::{ActiveSession, LocalSigner, SignerError};
use quill_core::Timestamp;

use crate::output::OutputMode;
use crate::store::FileStore;

/// Everything a command needs: the loaded record set, the store to write
/// back to, the output mode, the optional signer, and the wall clock.
pub struct CliContext {
    pub store: FileStore,
    pub records: RecordSet,
    pub output: OutputMode,
    pub signer: Option<LocalSigner>,
    pub now: Timestamp,
}

impl CliContext {
    /// Open a signing session.
    ///
    /// # Errors
    ///
    /// Fails with the signer taxonomy error (`signing unavailable`) when no
    /// secret is configured.
    pub fn session(&self) -> anyhow::Result<ActiveSession<'_>> {
        self.signer
            .as_ref()
            .map(|signer| ActiveSession::new(signer))
            .ok_or(SignerError::Unavailable)
            .context("set `secret` in config.toml or pass --key")
    }
}

/// Resolve a document argument: a full `document:<owner>:<docId>` reference,
/// an exact doc id, or a unique doc-id prefix over the local store.
///
/// # Errors
///
/// Fails when nothing in the store matches, or when the token is ambiguous
/// (the error lists the candidates).
pub fn resolve_identity(records: &RecordSet, raw: &str) -> anyhow::Result<DocIdentity> {
    if let Ok(identity) = raw.parse::<DocIdentity>() {
        return Ok(identity);
    }

    let mut exact: BTreeSet<DocIdentity> = BTreeSet::new();
    let mut prefixed: BTreeSet<DocIdentity> = BTreeSet::new();
    for record in records.iter().filter(|r| r.kind == RecordKind::Document) {
        let Ok(Parsed::Snapshot(snap)) = classify(record) else {
            continue;
        };
        if snap.identity.doc_id.as_str() == raw {
            exact.insert(snap.identity);
        } else if snap.identity.doc_id.as_str().starts_with(raw) {
            prefixed.insert(snap.identity);
        }
    }

    let candidates = if exact.is_empty() { prefixed } else { exact };
    if candidates.len() > 1 {
        let listing: Vec<String> = candidates.iter().map(DocIdentity::doc_ref).collect();
        bail!(
            "'{raw}' is ambiguous; use a full reference:\n  {}",
            listing.join("\n  ")
        );
    }
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no document matching '{raw}' in the local store"))
}

/// Resolve a proposal argument: a full record id or a unique prefix over the
/// proposals in the local store.
///
/// # Errors
///
/// Fails when nothing in the store matches, or when the prefix is ambiguous.
pub fn resolve_proposal(records: &RecordSet, raw: &str) -> anyhow::Result<RecordId> {
    let direct = RecordId::new(raw);
    if records.contains(&direct) {
        return Ok(direct);
    }

    let mut candidates: BTreeSet<RecordId> = BTreeSet::new();
    for record in records.iter().filter(|r| r.kind == RecordKind::AppData) {
        let Ok(Parsed::Proposal(proposal)) = classify(record) else {
            continue;
        };
        let id = proposal.record_id.as_str();
        // Accept a prefix of the full id or of its hex part.
        if id.starts_with(raw) || id.strip_prefix("blake3:").is_some_and(|hex| hex.starts_with(raw))
        {
            candidates.insert(proposal.record_id);
        }
    }

    if candidates.len() > 1 {
        let listing: Vec<String> = candidates.iter().map(|id| id.as_str().to_owned()).collect();
        bail!(
            "'{raw}' is ambiguous; candidates:\n  {}",
            listing.join("\n  ")
        );
    }
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no proposal matching '{raw}' in the local store"))
}

/// Read content from `--text` or `--file` (exactly one).
///
/// # Errors
///
/// Fails when neither or both sources are given, or the file is unreadable.
pub fn read_content(text: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    match (text, file) {
        (Some(text), None) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display())),
        (Some(_), Some(_)) => bail!("pass either --text or --file, not both"),
        (None, None) => bail!("content required: pass --text or --file"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
