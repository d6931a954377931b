//! `ql save` — publish a new revision of an owned document.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use quill_core::ops::save_document;

use crate::cmd::{CliContext, read_content, resolve_identity};
use crate::output::{OutputMode, render_json, short};

#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Document: full reference, doc id, or unique prefix.
    pub doc: String,

    /// New content.
    #[arg(long)]
    pub text: Option<String>,

    /// Read new content from a file.
    #[arg(long, value_name = "PATH", conflicts_with = "text")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SaveOutput {
    doc_ref: String,
    record_id: String,
}

/// Execute `ql save`.
///
/// # Errors
///
/// `Unauthorized` when the session key is not the owner, `NotFound` when
/// the document has no local snapshot.
pub fn run_save(args: SaveArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let identity = resolve_identity(&ctx.records, &args.doc)?;
    let content = read_content(args.text, args.file)?;

    let record = save_document(&session, &ctx.records, &identity, &content, ctx.now)?;
    let record_id = record.id.clone();
    ctx.store.append([record])?;

    match ctx.output {
        OutputMode::Json => render_json(&SaveOutput {
            doc_ref: identity.doc_ref(),
            record_id: record_id.as_str().to_owned(),
        }),
        OutputMode::Human => {
            println!(
                "saved {} as revision {}",
                identity.doc_ref(),
                short(record_id.as_str(), 16)
            );
            Ok(())
        }
    }
}
