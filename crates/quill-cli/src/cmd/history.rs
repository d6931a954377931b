//! `ql history` — full ordered revision history of a document.

use clap::Args;
use serde::Serialize;

use quill_core::EngineError;
use quill_core::reduce::history;

use crate::cmd::{CliContext, resolve_identity};
use crate::output::{OutputMode, format_ts, preview, render_json, short};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Document: full reference, doc id, or unique prefix.
    pub doc: String,
}

#[derive(Debug, Serialize)]
struct RevisionRow {
    version: usize,
    record_id: String,
    created_at: i64,
    preview: String,
}

/// Execute `ql history <doc>`.
///
/// # Errors
///
/// `NotFound` when the identity has no snapshot in the local store.
pub fn run_history(args: &HistoryArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let identity = resolve_identity(&ctx.records, &args.doc)?;
    let hist = history(&ctx.records, &identity);
    if hist.is_empty() {
        return Err(EngineError::NotFound { identity }.into());
    }

    // Version numbers count up from the oldest revision, head highest.
    let total = hist.len();
    let rows: Vec<RevisionRow> = hist
        .revisions()
        .iter()
        .enumerate()
        .map(|(idx, rev)| RevisionRow {
            version: total - idx,
            record_id: rev.record_id.as_str().to_owned(),
            created_at: rev.created_at,
            preview: preview(&rev.content, 60),
        })
        .collect();

    match ctx.output {
        OutputMode::Json => render_json(&rows),
        OutputMode::Human => {
            println!("{} — {} revisions", identity.doc_ref(), total);
            for row in &rows {
                println!(
                    "  v{:<3} {}  {}  {}",
                    row.version,
                    short(&row.record_id, 16),
                    format_ts(row.created_at),
                    row.preview,
                );
            }
            Ok(())
        }
    }
}
