/*
 * entry.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Glossary entries and the arena that owns them.
//!
//! Entries are stored in insertion (definition) order and addressed by
//! [`EntryId`]. Parent labels are resolved to ids when entries are
//! inserted, so hierarchy walks during sorting never go through a
//! string lookup.

use crate::error::{Error, Result};
use crate::markup::Markup;
use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Stable index of an entry inside an [`EntryArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(usize);

impl EntryId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A numeric sort value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Integer(i64),
    Decimal(f64),
}

impl NumericValue {
    pub fn as_f64(self) -> f64 {
        match self {
            NumericValue::Integer(n) => n as f64,
            NumericValue::Decimal(d) => d,
        }
    }

    /// Total order over numeric values.
    ///
    /// Two integers compare exactly; any comparison involving a decimal
    /// uses `f64::total_cmp`.
    pub fn total_cmp(&self, other: &NumericValue) -> Ordering {
        match (self, other) {
            (NumericValue::Integer(a), NumericValue::Integer(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            NumericValue::Integer(n) => n == 0,
            NumericValue::Decimal(d) => d == 0.0,
        }
    }
}

impl Default for NumericValue {
    fn default() -> Self {
        NumericValue::Integer(0)
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Integer(n) => write!(f, "{}", n),
            NumericValue::Decimal(d) => write!(f, "{}", d),
        }
    }
}

/// A single glossary entry.
#[derive(Debug, Clone)]
pub struct Entry {
    label: String,
    original_label: String,
    entry_type: String,
    original_entry_type: String,
    parent: Option<String>,
    fields: LinkedHashMap<String, Markup>,
    definition_index: usize,

    /// Normalized sort string written by the sort key computation.
    pub sort_key: Option<String>,
    /// Numeric sort value for numeric, date and record-count sorts.
    pub numeric_sort: Option<NumericValue>,
}

impl Entry {
    pub fn new(label: impl Into<String>, entry_type: impl Into<String>) -> Self {
        let label = label.into();
        let entry_type = entry_type.into();
        Self {
            original_label: label.clone(),
            label,
            original_entry_type: entry_type.clone(),
            entry_type,
            parent: None,
            fields: LinkedHashMap::new(),
            definition_index: 0,
            sort_key: None,
            numeric_sort: None,
        }
    }

    /// Builder-style field setter, parsing `value` as markup.
    pub fn with_field(mut self, name: impl Into<String>, value: &str) -> Self {
        self.set_field(name, Markup::parse(value));
        self
    }

    /// Builder-style parent setter.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The label the entry had when it was loaded.
    pub fn original_label(&self) -> &str {
        &self.original_label
    }

    /// Change the label (e.g. after a label prefix was applied).
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    pub fn original_entry_type(&self) -> &str {
        &self.original_entry_type
    }

    pub fn set_entry_type(&mut self, entry_type: impl Into<String>) {
        self.entry_type = entry_type.into();
    }

    /// Parent label, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Position of this entry in definition order.
    pub fn definition_index(&self) -> usize {
        self.definition_index
    }

    pub fn field(&self, name: &str) -> Option<&Markup> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Set a field value.
    ///
    /// Setting the `parent` field also changes the parent label; use
    /// [`EntryArena::set_field`] so the arena can relink the hierarchy.
    pub fn set_field(&mut self, name: impl Into<String>, value: Markup) {
        let name = name.into();
        if name == "parent" {
            let label = value.to_plain();
            self.parent = if label.is_empty() { None } else { Some(label) };
            return;
        }
        self.fields.replace(name, value);
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Markup> {
        self.fields.remove(name)
    }

    /// Iterate over fields in definition order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Markup)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn default_entry_type() -> String {
    "entry".to_string()
}

/// Serialized form of an entry, as produced by the bibliography loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRecord {
    pub label: String,
    #[serde(rename = "entry-type", alias = "entry_type", default = "default_entry_type")]
    pub entry_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub fields: LinkedHashMap<String, Markup>,
}

impl From<EntryRecord> for Entry {
    fn from(record: EntryRecord) -> Self {
        let mut entry = Entry::new(record.label, record.entry_type);
        entry.parent = record.parent.filter(|p| !p.is_empty());
        for (name, value) in record.fields {
            entry.set_field(name, value);
        }
        entry
    }
}

/// Owner of the working entry collection.
#[derive(Debug, Clone, Default)]
pub struct EntryArena {
    entries: Vec<Entry>,
    parent_ids: Vec<Option<EntryId>>,
    by_label: HashMap<String, EntryId>,
    /// Children whose parent label has not been inserted yet.
    pending: HashMap<String, Vec<EntryId>>,
}

impl EntryArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an arena from loader records, in order.
    pub fn from_records(records: impl IntoIterator<Item = EntryRecord>) -> Result<Self> {
        let mut arena = Self::new();
        for record in records {
            arena.insert(record.into())?;
        }
        arena.warn_unresolved_parents();
        Ok(arena)
    }

    /// Insert an entry and link it into the hierarchy.
    pub fn insert(&mut self, mut entry: Entry) -> Result<EntryId> {
        if entry.label.is_empty() {
            return Err(Error::EmptyLabel {
                entry_type: entry.entry_type.clone(),
            });
        }
        if self.by_label.contains_key(&entry.label) {
            return Err(Error::DuplicateLabel {
                label: entry.label.clone(),
            });
        }

        let id = EntryId(self.entries.len());
        entry.definition_index = id.0;
        self.by_label.insert(entry.label.clone(), id);

        let parent_id = self.resolve_parent_label(id, entry.parent.as_deref());
        self.entries.push(entry);
        self.parent_ids.push(parent_id);

        let label = self.entries[id.0].label.clone();
        if let Some(children) = self.pending.remove(&label) {
            for child in children {
                if self.ancestors(id).any(|a| a == child) {
                    self.warn_cycle(child);
                } else {
                    self.parent_ids[child.0] = Some(id);
                }
            }
        }
        Ok(id)
    }

    fn resolve_parent_label(&mut self, id: EntryId, parent: Option<&str>) -> Option<EntryId> {
        let parent = parent?;
        match self.by_label.get(parent) {
            Some(&parent_id) if parent_id != id => Some(parent_id),
            Some(_) => None,
            None => {
                self.pending.entry(parent.to_string()).or_default().push(id);
                None
            }
        }
    }

    fn warn_unresolved_parents(&self) {
        for (label, children) in &self.pending {
            for child in children {
                tracing::warn!(
                    entry = %self.entries[child.0].label,
                    parent = %label,
                    "Parent entry not found; treating entry as top-level"
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntryId> + use<> {
        (0..self.entries.len()).map(EntryId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.entries.iter().enumerate().map(|(i, e)| (EntryId(i), e))
    }

    pub fn get(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    pub fn get_mut(&mut self, id: EntryId) -> &mut Entry {
        &mut self.entries[id.0]
    }

    pub fn lookup(&self, label: &str) -> Option<EntryId> {
        self.by_label.get(label).copied()
    }

    /// Set a field, relinking the hierarchy when the `parent` field changes.
    pub fn set_field(&mut self, id: EntryId, name: &str, value: Markup) {
        self.entries[id.0].set_field(name, value);
        if name == "parent" {
            self.relink(id);
        }
    }

    fn relink(&mut self, id: EntryId) {
        for children in self.pending.values_mut() {
            children.retain(|c| *c != id);
        }
        let parent = self.entries[id.0].parent.clone();
        let parent_id = self.resolve_parent_label(id, parent.as_deref());
        self.parent_ids[id.0] = parent_id;
        if self.ancestors(id).any(|a| a == id) {
            self.warn_cycle(id);
            self.parent_ids[id.0] = None;
        }
    }

    fn warn_cycle(&self, id: EntryId) {
        tracing::warn!(
            entry = %self.entries[id.0].label,
            "Parent chain forms a cycle; treating entry as top-level"
        );
    }

    pub fn parent_of(&self, id: EntryId) -> Option<EntryId> {
        self.parent_ids[id.0]
    }

    /// Iterate over the ancestors of `id`, nearest first.
    ///
    /// The walk stops if the parent chain loops back on itself.
    pub fn ancestors(&self, id: EntryId) -> impl Iterator<Item = EntryId> + '_ {
        let mut seen = HashSet::new();
        let mut current = self.parent_ids[id.0];
        std::iter::from_fn(move || {
            let next = current?;
            if !seen.insert(next) {
                return None;
            }
            current = self.parent_ids[next.0];
            Some(next)
        })
    }

    /// The top-most ancestor of `id`, or `None` if `id` has no parent.
    pub fn root_of(&self, id: EntryId) -> Option<EntryId> {
        self.ancestors(id).last()
    }

    /// Number of ancestors.
    pub fn depth(&self, id: EntryId) -> usize {
        self.ancestors(id).count()
    }

    pub fn is_ancestor(&self, ancestor: EntryId, id: EntryId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Root-to-leaf hierarchy path ending with `id`.
    pub fn path(&self, id: EntryId) -> Vec<EntryId> {
        let mut path: Vec<EntryId> = self.ancestors(id).collect();
        path.reverse();
        path.push(id);
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn arena() -> EntryArena {
        let mut arena = EntryArena::new();
        arena.insert(Entry::new("b.sub", "entry").with_parent("b")).unwrap();
        arena.insert(Entry::new("b", "entry")).unwrap();
        arena.insert(Entry::new("b.sub.sub", "entry").with_parent("b.sub")).unwrap();
        arena.insert(Entry::new("orphan", "entry").with_parent("missing")).unwrap();
        arena
    }

    #[test]
    fn test_child_before_parent_is_linked() {
        let arena = arena();
        let child = arena.lookup("b.sub").unwrap();
        let parent = arena.lookup("b").unwrap();
        assert_eq!(arena.parent_of(child), Some(parent));
    }

    #[test]
    fn test_root_and_path() {
        let arena = arena();
        let leaf = arena.lookup("b.sub.sub").unwrap();
        let root = arena.lookup("b").unwrap();
        assert_eq!(arena.root_of(leaf), Some(root));
        assert_eq!(arena.root_of(root), None);
        let labels: Vec<&str> = arena
            .path(leaf)
            .into_iter()
            .map(|id| arena.get(id).label())
            .collect();
        assert_eq!(labels, vec!["b", "b.sub", "b.sub.sub"]);
        assert_eq!(arena.depth(leaf), 2);
    }

    #[test]
    fn test_missing_parent_is_absent() {
        let arena = arena();
        let orphan = arena.lookup("orphan").unwrap();
        assert_eq!(arena.parent_of(orphan), None);
        assert_eq!(arena.get(orphan).parent(), Some("missing"));
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let mut arena = arena();
        let err = arena.insert(Entry::new("b", "index")).unwrap_err();
        assert_eq!(err, Error::DuplicateLabel { label: "b".into() });
    }

    #[test]
    fn test_cycle_is_broken() {
        let mut arena = EntryArena::new();
        let a = arena.insert(Entry::new("a", "entry")).unwrap();
        let b = arena.insert(Entry::new("b", "entry").with_parent("a")).unwrap();
        arena.set_field(a, "parent", Markup::text("b"));
        assert_eq!(arena.parent_of(a), None);
        assert_eq!(arena.parent_of(b), Some(a));
    }

    #[test]
    fn test_mutual_parents_on_insert() {
        let mut arena = EntryArena::new();
        let a = arena.insert(Entry::new("a", "entry").with_parent("b")).unwrap();
        let b = arena.insert(Entry::new("b", "entry").with_parent("a")).unwrap();
        assert_eq!(arena.parent_of(b), Some(a));
        assert_eq!(arena.parent_of(a), None);
        assert_eq!(arena.root_of(b), Some(a));
        assert_eq!(arena.path(a), vec![a]);
        assert_eq!(arena.path(b), vec![a, b]);
    }

    #[test]
    fn test_longer_cycle_on_insert() {
        let mut arena = EntryArena::new();
        let a = arena.insert(Entry::new("a", "entry").with_parent("c")).unwrap();
        let b = arena.insert(Entry::new("b", "entry").with_parent("a")).unwrap();
        let c = arena.insert(Entry::new("c", "entry").with_parent("b")).unwrap();
        assert_eq!(arena.parent_of(a), None);
        assert_eq!(arena.path(c), vec![a, b, c]);
    }

    #[test]
    fn test_record_deserialization() {
        let json = r#"[
            {"label": "duck", "fields": {"name": "duck", "description": "a bird"}},
            {"label": "mallard", "entry-type": "index", "parent": "duck"}
        ]"#;
        let records: Vec<EntryRecord> = serde_json::from_str(json).unwrap();
        let arena = EntryArena::from_records(records).unwrap();
        let mallard = arena.lookup("mallard").unwrap();
        assert_eq!(arena.get(mallard).entry_type(), "index");
        assert_eq!(arena.parent_of(mallard), arena.lookup("duck"));
        let duck = arena.get(arena.lookup("duck").unwrap());
        let names: Vec<&str> = duck.fields().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["name", "description"]);
    }

    #[test]
    fn test_numeric_total_cmp() {
        assert_eq!(
            NumericValue::Integer(2).total_cmp(&NumericValue::Decimal(10.5)),
            Ordering::Less
        );
        assert_eq!(
            NumericValue::Integer(-3).total_cmp(&NumericValue::Integer(-7)),
            Ordering::Greater
        );
    }
}
