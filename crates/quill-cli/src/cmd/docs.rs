//! `ql docs` — list documents with pending-suggestion badges.

use clap::Args;
use serde::Serialize;

use quill_core::identity::{AuthorKey, DocIdentity};
use quill_core::reduce::{CatalogEntry, documents_by, pending_counts, public_documents};

use crate::cmd::CliContext;
use crate::output::{OutputMode, format_ts, render_json, short};

#[derive(Args, Debug)]
pub struct DocsArgs {
    /// List the public feed instead of your own documents.
    #[arg(long)]
    pub public: bool,

    /// List documents owned by this key instead of the session key.
    #[arg(long, value_name = "KEY", conflicts_with = "public")]
    pub author: Option<String>,
}

#[derive(Debug, Serialize)]
struct DocRow {
    doc_ref: String,
    title: Option<String>,
    collaborative: bool,
    private: bool,
    revisions: usize,
    pending: usize,
    updated_at: i64,
}

/// Execute `ql docs`.
///
/// # Errors
///
/// Fails when neither `--public`, `--author`, nor a configured signer gives
/// an owner to list for.
pub fn run_docs(args: &DocsArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let entries = if args.public {
        public_documents(&ctx.records)
    } else {
        let owner = match &args.author {
            Some(raw) => raw.parse::<AuthorKey>().map_err(anyhow::Error::from)?,
            None => ctx.session()?.key().clone(),
        };
        documents_by(&ctx.records, &owner)
    };

    let identities: Vec<DocIdentity> = entries.iter().map(|e| e.identity.clone()).collect();
    let counts = pending_counts(&ctx.records, &identities);

    let rows: Vec<DocRow> = entries
        .iter()
        .map(|entry| DocRow {
            doc_ref: entry.identity.doc_ref(),
            title: entry.head.title.clone(),
            collaborative: entry.head.collaborative,
            private: entry.head.private,
            revisions: entry.revision_count,
            pending: counts.get(&entry.identity).copied().unwrap_or(0),
            updated_at: entry.head.created_at,
        })
        .collect();

    match ctx.output {
        OutputMode::Json => render_json(&rows),
        OutputMode::Human => {
            if rows.is_empty() {
                println!("no documents");
                return Ok(());
            }
            for (entry, row) in entries.iter().zip(&rows) {
                println!("{}", render_row(entry, row));
            }
            Ok(())
        }
    }
}

fn render_row(entry: &CatalogEntry, row: &DocRow) -> String {
    let title = row.title.as_deref().unwrap_or("Untitled");
    let mut line = format!(
        "{title}  doc/{}  rev {}  {}",
        short(entry.identity.doc_id.as_str(), 12),
        row.revisions,
        format_ts(row.updated_at),
    );
    if row.private {
        line.push_str("  [private]");
    }
    if row.pending > 0 {
        line.push_str(&format!("  [{} pending]", row.pending));
    }
    line
}
