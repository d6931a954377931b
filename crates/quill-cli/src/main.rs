#![forbid(unsafe_code)]

mod cmd;
mod config;
mod output;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use quill_core::session::LocalSigner;

use cmd::CliContext;
use config::Config;
use output::OutputMode;
use store::FileStore;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "quill: relay-reconciled collaborative documents",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Record store file (overrides config).
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Signing secret for the development signer (overrides config).
    #[arg(long, global = true, value_name = "SECRET")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Documents",
        about = "Create a new document",
        after_help = "EXAMPLES:\n    # Create a public collaborative document\n    ql create --title \"Field notes\"\n\n    # Keep it out of the public feed\n    ql create --title \"Drafts\" --private"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Documents",
        about = "List documents",
        after_help = "EXAMPLES:\n    # Your documents, with pending-suggestion badges\n    ql docs\n\n    # The public feed\n    ql docs --public"
    )]
    Docs(cmd::docs::DocsArgs),

    #[command(
        next_help_heading = "Documents",
        about = "Show a document's reconciled state",
        after_help = "EXAMPLES:\n    # By unique doc-id prefix\n    ql show 4f1a\n\n    # By full reference\n    ql show document:<owner>:<docId>"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Documents",
        about = "Show a document's revision history"
    )]
    History(cmd::history::HistoryArgs),

    #[command(
        next_help_heading = "Documents",
        about = "Save a new revision (owner only)",
        after_help = "EXAMPLES:\n    ql save 4f1a --file notes.md"
    )]
    Save(cmd::save::SaveArgs),

    #[command(
        next_help_heading = "Documents",
        about = "Remove a document from listings (owner only)"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Collaboration",
        about = "List pending suggestions for a document"
    )]
    Suggestions(cmd::suggestions::SuggestionsArgs),

    #[command(
        next_help_heading = "Collaboration",
        about = "Propose an edit to someone else's document",
        after_help = "EXAMPLES:\n    ql propose 4f1a --file improved.md --reason \"fix typos\""
    )]
    Propose(cmd::propose::ProposeArgs),

    #[command(
        next_help_heading = "Collaboration",
        about = "Approve a pending proposal (owner only)"
    )]
    Approve(cmd::decide::ApproveArgs),

    #[command(
        next_help_heading = "Collaboration",
        about = "Reject a pending proposal (owner only)"
    )]
    Reject(cmd::decide::RejectArgs),

    #[command(
        next_help_heading = "Collaboration",
        about = "Show changes between revisions or for a proposal",
        after_help = "EXAMPLES:\n    # Changes vs latest for a historical revision\n    ql diff 4f1a --revision ab12\n\n    # What a proposal would change\n    ql diff 4f1a --proposal cd34"
    )]
    Diff(cmd::diff::DiffArgs),

    #[command(
        next_help_heading = "Store",
        about = "Fold a relay export into the local store",
        after_help = "EXAMPLES:\n    ql ingest relay-dump.json"
    )]
    Ingest(cmd::ingest::IngestArgs),

    #[command(next_help_heading = "Store", about = "Show the effective configuration")]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Store",
        about = "Generate shell completion scripts"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    // Completions need no store, config, or signer.
    if let Commands::Completions(args) = &cli.command {
        cmd::completions::run_completions::<Cli>(args);
        return Ok(());
    }

    let config = Config::load()?;
    let store_path = cli.store.unwrap_or_else(|| config.store_path());
    let store = FileStore::new(store_path);
    let report = store.load()?;
    if report.skipped > 0 {
        debug!(skipped = report.skipped, "store entries skipped at load");
    }

    let secret = cli.key.or_else(|| config.secret.clone());
    let ctx = CliContext {
        store,
        records: report.records,
        output: if cli.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        },
        signer: secret.as_deref().map(LocalSigner::from_secret),
        now: chrono::Utc::now().timestamp(),
    };

    match cli.command {
        Commands::Create(args) => cmd::create::run_create(args, &ctx),
        Commands::Docs(args) => cmd::docs::run_docs(&args, &ctx),
        Commands::Show(args) => cmd::show::run_show(&args, &ctx),
        Commands::History(args) => cmd::history::run_history(&args, &ctx),
        Commands::Save(args) => cmd::save::run_save(args, &ctx),
        Commands::Delete(args) => cmd::delete::run_delete(&args, &ctx),
        Commands::Suggestions(args) => cmd::suggestions::run_suggestions(&args, &ctx),
        Commands::Propose(args) => cmd::propose::run_propose(args, &ctx),
        Commands::Approve(args) => cmd::decide::run_approve(&args, &ctx),
        Commands::Reject(args) => cmd::decide::run_reject(&args, &ctx),
        Commands::Diff(args) => cmd::diff::run_diff(&args, &ctx),
        Commands::Ingest(args) => cmd::ingest::run_ingest(&args, &ctx),
        Commands::Config(args) => cmd::config::run_config(&args, &ctx, &config.relays),
        Commands::Completions(_) => unreachable!("handled before context setup"),
    }
}
