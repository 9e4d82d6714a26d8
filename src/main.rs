//! # doc-quarry CLI (`dq`)
//!
//! The `dq` binary is the interface to the docstring harvester. It
//! provides commands for database initialization, harvesting configured
//! repositories, and inspecting what has been stored.
//!
//! ## Usage
//!
//! ```bash
//! dq --config ./config/dq.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dq init` | Create the SQLite database and the `docstrings` table |
//! | `dq repos` | List configured repositories and checkout status |
//! | `dq harvest [REPO]` | Clone/pull, extract docstrings, store records |
//! | `dq stats` | Record counts and per-project breakdown |
//! | `dq sample` | Print the first stored records |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! dq init --config ./config/dq.toml
//!
//! # Harvest every configured repository
//! dq harvest --config ./config/dq.toml
//!
//! # Harvest one repository, keeping its working copy on disk
//! dq harvest requests --keep-clones
//!
//! # See what landed
//! dq stats
//! dq sample --limit 10
//! ```

mod config;
mod db;
mod extractor;
mod harvest;
mod migrate;
mod models;
mod progress;
mod provisioner;
mod repos;
mod sample;
mod stats;
mod store;

use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::harvest::HarvestOptions;
use crate::progress::ProgressMode;

/// doc-quarry CLI — a batch harvester that collects Python docstrings
/// from public repositories into SQLite.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/dq.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "dq",
    about = "doc-quarry — harvest Python docstrings from public repositories into SQLite",
    version,
    long_about = "doc-quarry runs a sequential ETL pipeline per configured repository: \
    provision a working copy (clone or pull), walk the source tree for Python files, \
    extract module/class/function docstrings with tree-sitter, and append them to a \
    single-file SQLite database."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/dq.toml`. The database path, harvest
    /// settings, and repository list are read from this file.
    #[arg(long, global = true, default_value = "./config/dq.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `docstrings` table.
    /// This command is idempotent — running it multiple times is safe
    /// and never drops existing data.
    Init,

    /// List configured repositories and their checkout status.
    ///
    /// Also reports whether a git client is available. Useful for
    /// verifying configuration before running a harvest.
    Repos,

    /// Harvest docstrings from configured repositories.
    ///
    /// Clones (or pulls) each repository, extracts module, class, and
    /// function docstrings from its Python files, stores them, and tears
    /// the working copy down. A repository that cannot be provisioned is
    /// skipped; a file that cannot be parsed costs one extraction error.
    Harvest {
        /// Restrict the run to one configured repository by name.
        repo: Option<String>,

        /// Keep working copies on disk after harvesting.
        #[arg(long)]
        keep_clones: bool,

        /// Provision and count files without parsing or writing.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of files to process per repository.
        #[arg(long)]
        limit: Option<usize>,

        /// Progress output on stderr: `auto`, `off`, `human`, or `json`.
        #[arg(long, default_value = "auto")]
        progress: String,
    },

    /// Show record counts and a per-project breakdown.
    Stats,

    /// Print the first stored records in id order.
    Sample {
        /// Maximum number of records to print.
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

fn parse_progress_mode(value: &str) -> anyhow::Result<ProgressMode> {
    match value {
        "auto" => Ok(ProgressMode::default_for_tty()),
        "off" => Ok(ProgressMode::Off),
        "human" => Ok(ProgressMode::Human),
        "json" => Ok(ProgressMode::Json),
        other => bail!(
            "Unknown progress mode: '{}'. Must be auto, off, human, or json.",
            other
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Repos => {
            repos::list_repos(&cfg)?;
        }
        Commands::Harvest {
            repo,
            keep_clones,
            dry_run,
            limit,
            progress,
        } => {
            let mode = parse_progress_mode(&progress)?;
            let reporter = mode.reporter();
            let opts = HarvestOptions {
                repo,
                keep_clones,
                dry_run,
                limit,
            };
            harvest::run_harvest(&cfg, &opts, reporter.as_ref()).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Sample { limit } => {
            sample::run_sample(&cfg, limit).await?;
        }
    }

    Ok(())
}
