//! ContextForge CLI - the main entry point.
//!
//! Commands:
//! - `assemble` - Build the prompt messages for a block snapshot
//! - `stats`    - Zone statistics and budget usage
//! - `inspect`  - Parse and resolve a skill package directory
//! - `import`   - Import a package into a fresh in-memory session
//! - `export`   - Write a block snapshot out as a package
//! - `config`   - Configuration management

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "contextforge",
    about = "ContextForge - zoned context assembly and skill packages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble prompt messages from a JSON block snapshot
    Assemble {
        /// JSON file holding an array of blocks
        #[arg(short, long)]
        blocks: PathBuf,

        /// The new user message
        #[arg(short, long)]
        prompt: String,

        /// JSON file holding prior conversation turns
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Show per-zone statistics and budget usage
    Stats {
        /// JSON file holding an array of blocks
        #[arg(short, long)]
        blocks: PathBuf,
    },

    /// Parse a package directory and show how it resolves
    Inspect {
        /// Package directory
        dir: PathBuf,
    },

    /// Import a package directory into an in-memory session
    Import {
        /// Package directory
        dir: PathBuf,

        /// Name for the receiving session
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Export a JSON block snapshot as a package directory
    Export {
        /// JSON file holding an array of blocks
        #[arg(short, long)]
        blocks: PathBuf,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Skill name used when no skill block is present
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Assemble {
            blocks,
            prompt,
            history,
        } => commands::assemble::run(&blocks, &prompt, history.as_deref()).await?,
        Commands::Stats { blocks } => commands::stats::run(&blocks).await?,
        Commands::Inspect { dir } => commands::inspect::run(&dir).await?,
        Commands::Import { dir, session } => commands::import::run(&dir, session).await?,
        Commands::Export { blocks, out, name } => {
            commands::export::run(&blocks, &out, name.as_deref()).await?
        }
        Commands::Config { action } => match action {
            ConfigAction::Init => commands::config_cmd::init().await?,
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
