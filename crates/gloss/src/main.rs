/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! gloss CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "gloss")]
#[command(version)]
#[command(about = "Sort and group glossary entries", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply field assignments, sort and group entries, and print the result as JSON
    Sort {
        /// Entries file (JSON)
        entries: PathBuf,

        /// Resource configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Write output to FILE (use '--output -' for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that a resource configuration parses
    Check {
        /// Resource configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(format!("gloss={}", level))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "gloss=info".into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Sort {
            entries,
            config,
            output,
        } => commands::sort::execute(commands::sort::SortArgs {
            entries,
            config,
            output,
        }),
        Commands::Check { config } => commands::check::execute(config),
    }
}
