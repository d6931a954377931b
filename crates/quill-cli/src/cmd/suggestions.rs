//! `ql suggestions` — pending proposals against a document.

use clap::Args;
use serde::Serialize;

use quill_core::reduce::suggestions_for;

use crate::cmd::{CliContext, resolve_identity};
use crate::output::{OutputMode, format_ts, render_json, short};

#[derive(Args, Debug)]
pub struct SuggestionsArgs {
    /// Document: full reference, doc id, or unique prefix.
    pub doc: String,
}

#[derive(Debug, Serialize)]
struct SuggestionRow {
    proposal_id: String,
    proposer: String,
    reason: Option<String>,
    created_at: i64,
}

/// Execute `ql suggestions <doc>`.
///
/// # Errors
///
/// Fails only on resolution or output errors; an empty pending set is a
/// normal answer.
pub fn run_suggestions(args: &SuggestionsArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let identity = resolve_identity(&ctx.records, &args.doc)?;
    let pending = suggestions_for(&ctx.records, &identity);

    let rows: Vec<SuggestionRow> = pending
        .iter()
        .map(|proposal| SuggestionRow {
            proposal_id: proposal.record_id.as_str().to_owned(),
            proposer: proposal.proposer.as_str().to_owned(),
            reason: proposal.reason.clone(),
            created_at: proposal.created_at,
        })
        .collect();

    match ctx.output {
        OutputMode::Json => render_json(&rows),
        OutputMode::Human => {
            if rows.is_empty() {
                println!("no pending suggestions for {}", identity.doc_ref());
                return Ok(());
            }
            println!("{} pending for {}", rows.len(), identity.doc_ref());
            for row in &rows {
                println!(
                    "  {}  from {}  {}  {}",
                    short(&row.proposal_id, 16),
                    short(&row.proposer, 12),
                    format_ts(row.created_at),
                    row.reason.as_deref().unwrap_or("(no reason)"),
                );
            }
            println!("\ninspect one with: ql diff {} --proposal <id>", args.doc);
            Ok(())
        }
    }
}
