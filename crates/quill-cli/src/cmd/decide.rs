//! `ql approve` / `ql reject` — owner decisions on pending proposals.

use clap::Args;
use serde::Serialize;

use quill_core::EngineError;
use quill_core::ops::{approve, reject};

use crate::cmd::{CliContext, resolve_proposal};
use crate::output::{OutputMode, render_json, short};

#[derive(Args, Debug)]
pub struct ApproveArgs {
    /// Proposal record id (or unique prefix).
    pub proposal: String,
}

#[derive(Args, Debug)]
pub struct RejectArgs {
    /// Proposal record id (or unique prefix).
    pub proposal: String,
}

#[derive(Debug, Serialize)]
struct DecisionOutput {
    proposal_id: String,
    decision: &'static str,
    /// New head snapshot id; only present for approvals.
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot_id: Option<String>,
    /// True when the proposal was already decided and nothing was emitted.
    stale: bool,
}

/// Execute `ql approve <proposal>`.
///
/// # Errors
///
/// `Unauthorized` when the session does not own the target document;
/// `ProposalNotFound`/`NotFound` when records are missing. A proposal that
/// is already decided is reported as a no-op, not a failure.
pub fn run_approve(args: &ApproveArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let proposal_id = resolve_proposal(&ctx.records, &args.proposal)?;

    match approve(&session, &ctx.records, &proposal_id, ctx.now) {
        Ok(emitted) => {
            let snapshot_id = emitted.snapshot.id.clone();
            ctx.store.append([emitted.snapshot, emitted.signal])?;
            render_decision(
                ctx,
                &DecisionOutput {
                    proposal_id: proposal_id.as_str().to_owned(),
                    decision: "approved",
                    snapshot_id: Some(snapshot_id.as_str().to_owned()),
                    stale: false,
                },
            )
        }
        Err(EngineError::StaleTransition { id, status }) => render_decision(
            ctx,
            &DecisionOutput {
                proposal_id: id.as_str().to_owned(),
                decision: status.as_str(),
                snapshot_id: None,
                stale: true,
            },
        ),
        Err(err) => Err(err.into()),
    }
}

/// Execute `ql reject <proposal>`.
///
/// # Errors
///
/// Same preconditions as [`run_approve`].
pub fn run_reject(args: &RejectArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let proposal_id = resolve_proposal(&ctx.records, &args.proposal)?;

    match reject(&session, &ctx.records, &proposal_id, ctx.now) {
        Ok(signal) => {
            ctx.store.append([signal])?;
            render_decision(
                ctx,
                &DecisionOutput {
                    proposal_id: proposal_id.as_str().to_owned(),
                    decision: "rejected",
                    snapshot_id: None,
                    stale: false,
                },
            )
        }
        Err(EngineError::StaleTransition { id, status }) => render_decision(
            ctx,
            &DecisionOutput {
                proposal_id: id.as_str().to_owned(),
                decision: status.as_str(),
                snapshot_id: None,
                stale: true,
            },
        ),
        Err(err) => Err(err.into()),
    }
}

fn render_decision(ctx: &CliContext, out: &DecisionOutput) -> anyhow::Result<()> {
    match ctx.output {
        OutputMode::Json => render_json(out),
        OutputMode::Human => {
            if out.stale {
                println!(
                    "proposal {} is already {}; nothing to do",
                    short(&out.proposal_id, 16),
                    out.decision
                );
            } else {
                println!("{} {}", out.decision, short(&out.proposal_id, 16));
                if let Some(snapshot) = &out.snapshot_id {
                    println!("new head {}", short(snapshot, 16));
                }
            }
            Ok(())
        }
    }
}
