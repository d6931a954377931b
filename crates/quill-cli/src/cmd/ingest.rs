//! `ql ingest` — fold a relay export into the local store.
//!
//! Accepts either a store-format file (`{"version":1,"records":[...]}`) or a
//! bare JSON array of records. Entries that fail to deserialize are skipped
//! and counted; ingestion is the streaming path, so a partially-garbled
//! export still contributes every readable record.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use quill_core::record::{RawRecord, malformed};

use crate::cmd::CliContext;
use crate::output::{OutputMode, render_json};

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// JSON file of records fetched from relays.
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct IngestOutput {
    read: usize,
    added: usize,
    duplicates: usize,
    undecodable: usize,
    /// Records in the store that fail classification (diagnostic count).
    malformed_total: usize,
}

/// Execute `ql ingest <file>`.
///
/// # Errors
///
/// Fails when the file is unreadable or not JSON at all; individual bad
/// entries are skipped, not fatal.
pub fn run_ingest(args: &IngestArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.file.display()))?;

    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        serde_json::Value::Object(mut object) => match object.remove("records") {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => anyhow::bail!("expected a JSON array or an object with a 'records' array"),
        },
        _ => anyhow::bail!("expected a JSON array or an object with a 'records' array"),
    };

    let read = entries.len();
    let mut undecodable = 0_usize;
    let records: Vec<RawRecord> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(_) => {
                undecodable += 1;
                None
            }
        })
        .collect();

    let decoded = records.len();
    let added = ctx.store.append(records)?;
    let merged = ctx.store.load()?.records;
    let malformed_total = malformed(&merged).len();

    let out = IngestOutput {
        read,
        added,
        duplicates: decoded - added,
        undecodable,
        malformed_total,
    };

    match ctx.output {
        OutputMode::Json => render_json(&out),
        OutputMode::Human => {
            println!(
                "ingested {}: {} new, {} duplicate, {} undecodable",
                args.file.display(),
                out.added,
                out.duplicates,
                out.undecodable
            );
            if out.malformed_total > 0 {
                println!(
                    "note: {} stored records fail classification and are ignored by reductions",
                    out.malformed_total
                );
            }
            Ok(())
        }
    }
}
