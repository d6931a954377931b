//! `ql config` — show the effective configuration.

use clap::Args;
use serde::Serialize;

use quill_core::session::Signer;

use crate::cmd::CliContext;
use crate::config::Config;
use crate::output::{OutputMode, render_json};

#[derive(Args, Debug)]
pub struct ConfigArgs {}

#[derive(Debug, Serialize)]
struct ConfigOutput {
    config_path: Option<String>,
    store_path: String,
    /// Public key derived from the configured secret, if any. The secret
    /// itself is never printed.
    author_key: Option<String>,
    relays: Vec<String>,
}

/// Execute `ql config`.
///
/// # Errors
///
/// Fails only on output errors.
pub fn run_config(_args: &ConfigArgs, ctx: &CliContext, relays: &[String]) -> anyhow::Result<()> {
    let out = ConfigOutput {
        config_path: Config::default_path().map(|p| p.display().to_string()),
        store_path: ctx.store.path().display().to_string(),
        author_key: ctx
            .signer
            .as_ref()
            .map(|signer| signer.author_key().as_str().to_owned()),
        relays: relays.to_vec(),
    };

    match ctx.output {
        OutputMode::Json => render_json(&out),
        OutputMode::Human => {
            if let Some(path) = &out.config_path {
                println!("config:  {path}");
            }
            println!("store:   {}", out.store_path);
            match &out.author_key {
                Some(key) => println!("key:     {key}"),
                None => println!("key:     (none — signing commands unavailable)"),
            }
            if out.relays.is_empty() {
                println!("relays:  (none configured)");
            } else {
                for relay in &out.relays {
                    println!("relay:   {relay}");
                }
            }
            Ok(())
        }
    }
}
