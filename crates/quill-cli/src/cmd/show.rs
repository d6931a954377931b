//! `ql show` — reconciled state of one document.

use clap::Args;
use serde::Serialize;

use quill_core::EngineError;
use quill_core::reduce::{history, suggestions_for};

use crate::cmd::{CliContext, resolve_identity};
use crate::output::{OutputMode, format_ts, render_json};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Document: full `document:<owner>:<docId>` reference, a doc id, or a
    /// unique doc-id prefix.
    pub doc: String,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    doc_ref: String,
    title: Option<String>,
    owner: String,
    collaborative: bool,
    private: bool,
    revisions: usize,
    pending_suggestions: usize,
    head_record: String,
    updated_at: i64,
    content: String,
}

/// Execute `ql show <doc>`.
///
/// # Errors
///
/// `NotFound` when the identity has no snapshot in the local store — fetch
/// more records and retry.
pub fn run_show(args: &ShowArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let identity = resolve_identity(&ctx.records, &args.doc)?;
    let hist = history(&ctx.records, &identity);
    let Some(head) = hist.head() else {
        return Err(EngineError::NotFound { identity }.into());
    };
    let pending = suggestions_for(&ctx.records, &identity).len();

    let out = ShowOutput {
        doc_ref: identity.doc_ref(),
        title: head.title.clone(),
        owner: identity.owner.as_str().to_owned(),
        collaborative: head.collaborative,
        private: head.private,
        revisions: hist.len(),
        pending_suggestions: pending,
        head_record: head.record_id.as_str().to_owned(),
        updated_at: head.created_at,
        content: head.content.clone(),
    };

    match ctx.output {
        OutputMode::Json => render_json(&out),
        OutputMode::Human => {
            println!("{}", out.title.as_deref().unwrap_or("Untitled"));
            println!("  ref:       {}", out.doc_ref);
            println!("  owner:     {}", out.owner);
            println!("  revisions: {}", out.revisions);
            println!("  updated:   {}", format_ts(out.updated_at));
            if out.private {
                println!("  private");
            }
            if out.pending_suggestions > 0 {
                println!("  pending suggestions: {}", out.pending_suggestions);
            }
            println!();
            println!("{}", out.content);
            Ok(())
        }
    }
}
