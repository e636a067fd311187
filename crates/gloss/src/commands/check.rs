/*
 * check.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `gloss check`: validate a resource configuration without sorting.

use std::path::PathBuf;

use anyhow::Result;

use gloss::config::load_resource;
use gloss_sort::Sorter;

pub fn execute(config: PathBuf) -> Result<()> {
    let resource = load_resource(&config)?;
    let assignments = resource.assignments.assignments().len();
    let method = resource.settings.method.to_string();
    // Building the sorter catches settings that only fail in combination.
    Sorter::new(resource.settings, resource.record_tracking)?;
    println!(
        "{}: sort method '{}', {} field assignment(s)",
        config.display(),
        method,
        assignments
    );
    Ok(())
}
