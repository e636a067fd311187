/*
 * output.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! JSON output of a sort run.

use gloss_entry::{EntryArena, Markup, NumericValue};
use gloss_sort::{GroupTitle, SortOutcome};
use hashlink::LinkedHashMap;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SortReport {
    pub entries: Vec<SortedEntry>,
    pub groups: Vec<GroupInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SortedEntry {
    pub label: String,
    pub entry_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub sort_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_sort: Option<NumericValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub fields: LinkedHashMap<String, Markup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupInfo {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub title: String,
    pub kind: &'static str,
    pub members: usize,
    /// The group-display payload.
    pub format: String,
}

impl From<&GroupTitle> for GroupInfo {
    fn from(group: &GroupTitle) -> Self {
        Self {
            entry_type: group.key.entry_type.clone(),
            id: group.key.id,
            parent: group.key.parent.clone(),
            title: group.title.clone(),
            kind: group.kind.name(),
            members: group.members,
            format: group.format(""),
        }
    }
}

impl SortReport {
    pub fn new(arena: &EntryArena, outcome: &SortOutcome) -> Self {
        let entries = outcome
            .order
            .iter()
            .map(|id| {
                let entry = arena.get(*id);
                SortedEntry {
                    label: entry.label().to_string(),
                    entry_type: entry.entry_type().to_string(),
                    parent: arena
                        .parent_of(*id)
                        .map(|parent| arena.get(parent).label().to_string()),
                    sort_key: entry.sort_key.clone(),
                    numeric_sort: entry.numeric_sort,
                    group: entry.field("group").map(Markup::to_plain),
                    fields: entry
                        .fields()
                        .map(|(name, value)| (name.to_string(), value.clone()))
                        .collect(),
                }
            })
            .collect();
        let groups = outcome.groups.iter().map(GroupInfo::from).collect();
        Self { entries, groups }
    }
}
