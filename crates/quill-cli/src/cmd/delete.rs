//! `ql delete` — remove an owned document from listings.

use clap::Args;
use serde::Serialize;

use quill_core::ops::delete_document;

use crate::cmd::{CliContext, resolve_identity};
use crate::output::{OutputMode, render_json};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Document: full reference, doc id, or unique prefix.
    pub doc: String,

    /// Why the document is being removed.
    #[arg(long)]
    pub reason: Option<String>,

    /// Confirm the deletion (required).
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct DeleteOutput {
    doc_ref: String,
    record_id: String,
}

/// Execute `ql delete`.
///
/// Relays may keep serving the document's snapshots; this publishes the
/// owner's removal request, which hides the document from catalogs.
///
/// # Errors
///
/// `Unauthorized` when the session key is not the owner; refuses to run
/// without `--yes`.
pub fn run_delete(args: &DeleteArgs, ctx: &CliContext) -> anyhow::Result<()> {
    if !args.yes {
        anyhow::bail!("deletion is broadcast to relays and cannot be recalled; pass --yes");
    }
    let session = ctx.session()?;
    let identity = resolve_identity(&ctx.records, &args.doc)?;

    let record = delete_document(
        &session,
        &ctx.records,
        &identity,
        args.reason.as_deref(),
        ctx.now,
    )?;
    let record_id = record.id.clone();
    ctx.store.append([record])?;

    match ctx.output {
        OutputMode::Json => render_json(&DeleteOutput {
            doc_ref: identity.doc_ref(),
            record_id: record_id.as_str().to_owned(),
        }),
        OutputMode::Human => {
            println!("requested deletion of {}", identity.doc_ref());
            Ok(())
        }
    }
}
