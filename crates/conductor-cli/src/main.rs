mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{context::ContextSubcommand, task::TaskSubcommand, track::TrackSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "conductor",
    about = "Track-based development workflow: tracks, task plans and project context in markdown",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from conductor/ or .git/)
    #[arg(long, global = true, env = "CONDUCTOR_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the conductor/ directory structure
    Init,

    /// Classify the project as Greenfield or Brownfield
    Detect,

    /// Show progress across all tracks
    Status,

    /// Show the last completed setup step
    State,

    /// Manage tracks
    Track {
        #[command(subcommand)]
        subcommand: TrackSubcommand,
    },

    /// Work with a track's task plan
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Write and read project context documents
    Context {
        #[command(subcommand)]
        subcommand: ContextSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Detect => cmd::detect::run(&root, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::State => cmd::state::run(&root, cli.json),
        Commands::Track { subcommand } => cmd::track::run(&root, subcommand, cli.json),
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Context { subcommand } => cmd::context::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
