//! Ghostline CLI - Record and replay ghost runs
//!
//! # Commands
//!
//! - `ghostline record` - Drive a lap around the built-in circuit and keep the best run
//! - `ghostline inspect` - Show duration and sample counts of a run
//! - `ghostline eval` - Evaluate a run at a point in time
//! - `ghostline play` - Replay a run headless and trace the ghost
//! - `ghostline list` - List stored runs
//!
//! # Usage
//!
//! ```bash
//! # Three laps, the fastest is stored as "circuit"
//! ghostline record --lap-time 12 --lap-time 11.5 --lap-time 12.4 --name circuit
//!
//! # Runs are addressed by store name or by file path
//! ghostline inspect circuit --json
//! ghostline eval ./runs/circuit.ghost --at 3.5
//! ghostline play circuit --every 30
//! ```
//!
//! Settings come from `config.toml` in the platform config directory unless
//! `--config` points elsewhere.

mod eval;
mod inspect;
mod list;
mod play;
mod record;
mod track;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ghostline_core::{GhostConfig, Recording, RecordingStore, config};

/// Ghostline CLI - Record and replay ghost runs
#[derive(Parser)]
#[command(name = "ghostline")]
#[command(about = "Record, inspect and replay ghost runs")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record laps around the built-in circuit
    Record(record::RecordArgs),

    /// Show duration and sample counts of a run
    Inspect(inspect::InspectArgs),

    /// Evaluate a run at a point in time
    Eval(eval::EvalArgs),

    /// Replay a run headless and trace the ghost
    Play(play::PlayArgs),

    /// List stored runs
    List,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Record(args) => record::execute(args, &config),
        Commands::Inspect(args) => inspect::execute(args, &config),
        Commands::Eval(args) => eval::execute(args, &config),
        Commands::Play(args) => play::execute(args, &config),
        Commands::List => list::execute(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<GhostConfig> {
    match path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(config::load()),
    }
}

/// Open the run store named by the config
pub(crate) fn open_store(config: &GhostConfig) -> Result<RecordingStore> {
    let dir = config
        .storage_dir()
        .context("No storage directory configured and no home directory found")?;
    RecordingStore::open(&dir)
        .with_context(|| format!("Failed to open run store: {}", dir.display()))
}

/// Resolve `run` as a file path first, then as a stored run name
pub(crate) fn load_run(run: &str, config: &GhostConfig) -> Result<Recording> {
    let path = Path::new(run);
    if path.is_file() {
        tracing::debug!(path = %path.display(), "loading run file");
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read run: {}", path.display()))?;
        return Recording::deserialize(&data)
            .with_context(|| format!("Failed to parse run: {}", path.display()));
    }

    let store = open_store(config)?;
    tracing::debug!(run, dir = %store.dir().display(), "loading stored run");
    store
        .load(run)
        .with_context(|| format!("Failed to load stored run '{run}'"))?
        .with_context(|| format!("No run file or stored run named '{run}'"))
}
