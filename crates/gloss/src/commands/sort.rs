/*
 * sort.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `gloss sort`: sort an entries file with a resource configuration.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use gloss::EntriesFile;
use gloss::config::load_resource;

#[derive(Debug)]
pub struct SortArgs {
    pub entries: PathBuf,
    pub config: PathBuf,
    /// Output file; stdout when absent or `-`.
    pub output: Option<PathBuf>,
}

pub fn execute(args: SortArgs) -> Result<()> {
    let resource = load_resource(&args.config)?;
    debug!(method = %resource.settings.method, "Loaded resource configuration");
    let entries = EntriesFile::load(&args.entries)?;
    let report = gloss::run(resource, entries)?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize result")?;

    match args.output.filter(|path| path.as_os_str() != "-") {
        Some(path) => std::fs::write(&path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json).context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
