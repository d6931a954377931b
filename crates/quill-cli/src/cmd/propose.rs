//! `ql propose` — submit an edit proposal against someone else's document.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use quill_core::ops::propose_edit;

use crate::cmd::{CliContext, read_content, resolve_identity};
use crate::output::{OutputMode, render_json};

#[derive(Args, Debug)]
pub struct ProposeArgs {
    /// Document: full reference, doc id, or unique prefix.
    pub doc: String,

    /// Proposed replacement content.
    #[arg(long)]
    pub text: Option<String>,

    /// Read proposed content from a file.
    #[arg(long, value_name = "PATH", conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Why the owner should take this edit.
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProposeOutput {
    proposal_id: String,
    doc_ref: String,
}

/// Execute `ql propose`.
///
/// # Errors
///
/// `OwnerProposal` when the session key owns the target (owners save
/// directly), `NotFound` when the document has no local snapshot.
pub fn run_propose(args: ProposeArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let identity = resolve_identity(&ctx.records, &args.doc)?;
    let content = read_content(args.text, args.file)?;

    let record = propose_edit(
        &session,
        &ctx.records,
        &identity,
        &content,
        args.reason.as_deref(),
        ctx.now,
    )?;
    let proposal_id = record.id.clone();
    ctx.store.append([record])?;

    match ctx.output {
        OutputMode::Json => render_json(&ProposeOutput {
            proposal_id: proposal_id.as_str().to_owned(),
            doc_ref: identity.doc_ref(),
        }),
        OutputMode::Human => {
            println!("proposed {} against {}", proposal_id, identity.doc_ref());
            println!("the owner decides with: ql approve {proposal_id}");
            Ok(())
        }
    }
}
