/*
 * records.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Location records: where (and how) each entry was referenced.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Record formats that mark a reference without producing a location.
pub const IGNORED_FORMATS: &[&str] = &["glsignore", "glstriggerrecordformat"];

fn default_counter() -> String {
    "page".to_string()
}

/// A single location record for an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Label of the referenced entry.
    pub label: String,
    /// Location encapsulating format (e.g. `glsnumberformat`, `glsignore`).
    #[serde(default)]
    pub format: String,
    /// Counter the location belongs to.
    #[serde(default = "default_counter")]
    pub counter: String,
    /// The location value.
    #[serde(default)]
    pub location: String,
}

impl Record {
    pub fn new(label: impl Into<String>, format: impl Into<String>, counter: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            format: format.into(),
            counter: counter.into(),
            location: String::new(),
        }
    }

    pub fn is_ignored(&self) -> bool {
        IGNORED_FORMATS.contains(&self.format.as_str())
    }
}

/// All records of a resource, in the order they were made.
#[derive(Debug, Clone, Default)]
pub struct RecordLog {
    records: Vec<Record>,
    first_use: HashMap<String, usize>,
}

impl RecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        let index = self.records.len();
        self.first_use.entry(record.label.clone()).or_insert(index);
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records attributed to `label`.
    pub fn for_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| r.label == label)
    }

    /// Index of the first record of `label`, i.e. its order of use.
    pub fn first_use(&self, label: &str) -> Option<usize> {
        self.first_use.get(label).copied()
    }
}

impl FromIterator<Record> for RecordLog {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut log = RecordLog::new();
        for record in iter {
            log.push(record);
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_use_and_filter() {
        let log: RecordLog = [
            Record::new("b", "glsnumberformat", "page"),
            Record::new("a", "glsignore", "page"),
            Record::new("b", "textbf", "section"),
        ]
        .into_iter()
        .collect();
        assert_eq!(log.first_use("b"), Some(0));
        assert_eq!(log.first_use("a"), Some(1));
        assert_eq!(log.first_use("c"), None);
        assert_eq!(log.for_label("b").count(), 2);
        assert!(log.for_label("a").all(Record::is_ignored));
    }

    #[test]
    fn test_record_defaults() {
        let record: Record = serde_json::from_str(r#"{"label": "x"}"#).unwrap();
        assert_eq!(record.counter, "page");
        assert_eq!(record.format, "");
        assert!(!record.is_ignored());
    }
}
