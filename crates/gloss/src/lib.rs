/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The `gloss` pipeline: load entries and a resource configuration, apply
//! field assignments, sort, group, and report the result.

pub mod config;
pub mod output;

use anyhow::{Context, Result};
use config::Resource;
use gloss_entry::{EntryArena, EntryRecord, Record};
use gloss_fields::FieldEnv;
use gloss_sort::Sorter;
use output::SortReport;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// An entries file: either a list of entries, or an object with entries
/// and the location records collected for them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EntriesFile {
    List(Vec<EntryRecord>),
    Document {
        entries: Vec<EntryRecord>,
        #[serde(default)]
        records: Vec<Record>,
    },
}

impl EntriesFile {
    pub fn parse(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("Entries must be a list or an object with 'entries'")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read entries {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("Invalid entries file {}", path.display()))
    }

    /// Split into entries and records.
    pub fn into_parts(self) -> (Vec<EntryRecord>, Vec<Record>) {
        match self {
            EntriesFile::List(entries) => (entries, Vec::new()),
            EntriesFile::Document { entries, records } => (entries, records),
        }
    }
}

/// Run assignments, sorting and grouping over `entries`.
///
/// Records from the entries file are appended to those listed in the
/// configuration.
pub fn run(mut resource: Resource, entries: EntriesFile) -> Result<SortReport> {
    let (entries, records) = entries.into_parts();
    for record in records {
        resource.records.push(record);
    }
    let mut arena = EntryArena::from_records(entries).context("Failed to build entry collection")?;

    let env = FieldEnv::default().with_labelify(resource.labelify);
    if !resource.assignments.is_empty() {
        let report = resource.assignments.run(&mut arena, &env);
        info!(
            written = report.written,
            kept = report.kept,
            skipped = report.skipped,
            null = report.null,
            "Applied field assignments"
        );
    }

    let sorter = Sorter::new(resource.settings, resource.record_tracking)?;
    let outcome = sorter.sort(&mut arena, &env, &resource.records);
    info!(
        entries = outcome.order.len(),
        groups = outcome.groups.len(),
        "Sorted glossary"
    );
    Ok(SortReport::new(&arena, &outcome))
}
