//! `ql diff` — changes between a revision (or proposal) and the current
//! head.

use clap::Args;
use serde::Serialize;

use quill_core::record::{Parsed, RecordId, classify};
use quill_core::reduce::history;
use quill_core::{Diff, DiffOp, DiffSpan, EngineError, diff};

use crate::cmd::{CliContext, resolve_identity, resolve_proposal};
use crate::output::{OutputMode, render_json};

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Document: full reference, doc id, or unique prefix.
    pub doc: String,

    /// Compare this historical revision against the head ("changes vs
    /// latest"). Accepts a record-id prefix.
    #[arg(long, value_name = "RECORD")]
    pub revision: Option<String>,

    /// Compare a proposal's original content against its proposed content.
    #[arg(long, value_name = "PROPOSAL", conflicts_with = "revision")]
    pub proposal: Option<String>,
}

#[derive(Debug, Serialize)]
struct DiffOutput {
    old_label: String,
    new_label: String,
    spans: Vec<DiffSpan>,
    inserted_chars: usize,
    deleted_chars: usize,
}

/// Execute `ql diff <doc> [--revision R | --proposal P]`.
///
/// With no selector, diffs the previous revision against the head.
///
/// # Errors
///
/// `NotFound` when the document has no snapshots; resolution errors when
/// the revision/proposal selector matches nothing.
pub fn run_diff(args: &DiffArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let identity = resolve_identity(&ctx.records, &args.doc)?;

    let (old_label, old_text, new_label, new_text) = if let Some(raw) = &args.proposal {
        let proposal_id = resolve_proposal(&ctx.records, raw)?;
        let record = ctx
            .records
            .get(&proposal_id)
            .ok_or_else(|| EngineError::ProposalNotFound {
                id: proposal_id.clone(),
            })?;
        let Ok(Parsed::Proposal(proposal)) = classify(record) else {
            return Err(EngineError::ProposalNotFound { id: proposal_id }.into());
        };
        (
            "original".to_owned(),
            proposal.original_content,
            "proposed".to_owned(),
            proposal.proposed_content,
        )
    } else {
        let hist = history(&ctx.records, &identity);
        let Some(head) = hist.head() else {
            return Err(EngineError::NotFound { identity }.into());
        };
        let old = match &args.revision {
            Some(raw) => find_revision(&hist, raw)?,
            // Default: previous revision, or the head itself for a
            // single-revision document (an identity diff).
            None => hist.revisions().get(1).unwrap_or(head).clone(),
        };
        (
            old.record_id.as_str().to_owned(),
            old.content,
            head.record_id.as_str().to_owned(),
            head.content.clone(),
        )
    };

    let d = diff(&old_text, &new_text);
    let inserted: usize = span_chars(&d, DiffOp::Insert);
    let deleted: usize = span_chars(&d, DiffOp::Delete);

    match ctx.output {
        OutputMode::Json => render_json(&DiffOutput {
            old_label,
            new_label,
            spans: d.spans().to_vec(),
            inserted_chars: inserted,
            deleted_chars: deleted,
        }),
        OutputMode::Human => {
            println!("{old_label} → {new_label}  (+{inserted} / -{deleted} chars)");
            if d.is_identity() {
                println!("no changes");
            } else {
                println!("{d}");
            }
            Ok(())
        }
    }
}

fn span_chars(d: &Diff, op: DiffOp) -> usize {
    d.spans()
        .iter()
        .filter(|span| span.op == op)
        .map(|span| span.text.chars().count())
        .sum()
}

fn find_revision(
    hist: &quill_core::RevisionHistory,
    raw: &str,
) -> anyhow::Result<quill_core::DocumentSnapshot> {
    let direct = RecordId::new(raw);
    if let Some(rev) = hist.find(&direct) {
        return Ok(rev.clone());
    }
    let matches: Vec<_> = hist
        .revisions()
        .iter()
        .filter(|rev| {
            let id = rev.record_id.as_str();
            id.starts_with(raw)
                || id
                    .strip_prefix("blake3:")
                    .is_some_and(|hex| hex.starts_with(raw))
        })
        .collect();
    match matches.as_slice() {
        [] => anyhow::bail!("no revision matching '{raw}'"),
        [one] => Ok((*one).clone()),
        _ => anyhow::bail!("'{raw}' matches {} revisions; use more digits", matches.len()),
    }
}
