//! Anamnesis CLI entry point
//!
//! Subcommands: interactive chat, retrieval evaluation, and store
//! diagnostics. Only total resource-acquisition failure (store or LLM
//! client unavailable) aborts a session; it is printed as a plain
//! diagnostic, never a panic.

use anamnesis_core::{cli, config::AnamnesisConfig, error::Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anamnesis", version, about = "Semantic diary analysis assistant")]
struct Args {
    /// Path to a TOML config file (default: anamnesis.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask questions about the diary interactively
    Chat,

    /// Score retriever variants over an evaluation query set
    Evaluate {
        /// JSON query file (bare array or {"queries": [...]})
        #[arg(long)]
        queries: Option<PathBuf>,

        /// Directory for per-retriever result files
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Documents retrieved per query
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Inspect query rewriting, result distribution, and connection health
    Diagnose {
        /// Probe with one query instead of the built-in set
        #[arg(long)]
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ANAMNESIS_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = AnamnesisConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Chat => cli::chat::handle(config).await,
        Command::Evaluate {
            queries,
            output_dir,
            top_k,
        } => cli::evaluate::handle(config, queries, output_dir, top_k).await,
        Command::Diagnose { query } => cli::diagnose::handle(config, query).await,
    }
}
