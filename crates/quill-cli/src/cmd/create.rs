//! `ql create` — publish a new document owned by the session key.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use quill_core::identity::DocId;
use quill_core::ops::create_document;

use crate::cmd::CliContext;
use crate::output::{OutputMode, render_json};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Document title.
    #[arg(long)]
    pub title: String,

    /// Hide the document from the public feed.
    #[arg(long)]
    pub private: bool,

    /// Initial content. Defaults to a heading with the title.
    #[arg(long)]
    pub text: Option<String>,

    /// Read initial content from a file.
    #[arg(long, value_name = "PATH", conflicts_with = "text")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CreateOutput {
    doc_ref: String,
    record_id: String,
}

/// Execute `ql create`.
///
/// # Errors
///
/// Fails when no signer is configured or the store cannot be written.
pub fn run_create(args: CreateArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let content = match (args.text, args.file) {
        (None, None) => format!("# {}\n\nStart writing here...", args.title),
        (text, file) => super::read_content(text, file)?,
    };

    let (identity, record) = create_document(
        &session,
        generate_doc_id(),
        &args.title,
        &content,
        args.private,
        ctx.now,
    )?;
    let record_id = record.id.clone();
    ctx.store.append([record])?;

    match ctx.output {
        OutputMode::Json => render_json(&CreateOutput {
            doc_ref: identity.doc_ref(),
            record_id: record_id.as_str().to_owned(),
        }),
        OutputMode::Human => {
            println!("created {}", identity.doc_ref());
            Ok(())
        }
    }
}

/// Client-generated opaque token: 16 random bytes, hex.
fn generate_doc_id() -> DocId {
    let bytes: [u8; 16] = rand::random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    DocId::new_unchecked(hex)
}
