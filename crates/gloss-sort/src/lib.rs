/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Ordering and grouping of glossary entries.
//!
//! A [`Sorter`] is built from [`SortSettings`] and run over an
//! [`EntryArena`]. One run:
//!
//! 1. computes a [`SortKey`] per entry with the configured strategy and
//!    writes the sort string and numeric value back onto the entry,
//! 2. appends the non-unique occurrence counter when enabled,
//! 3. orders the entries with the hierarchical comparator, so that every
//!    parent precedes its children,
//! 4. registers group titles in sorted order and records each entry's
//!    group in its `group` field.
//!
//! # Example
//!
//! ```
//! use gloss_entry::{Entry, EntryArena, RecordLog};
//! use gloss_fields::FieldEnv;
//! use gloss_sort::{SortSettings, Sorter};
//!
//! let mut arena = EntryArena::new();
//! arena.insert(Entry::new("b", "entry").with_field("name", "Banana")).unwrap();
//! arena.insert(Entry::new("a", "entry").with_field("name", "Apple")).unwrap();
//!
//! let sorter = Sorter::new(SortSettings::default(), false).unwrap();
//! let outcome = sorter.sort(&mut arena, &FieldEnv::default(), &RecordLog::new());
//! let labels: Vec<_> = outcome.order.iter().map(|id| arena.get(*id).label()).collect();
//! assert_eq!(labels, ["a", "b"]);
//! ```

pub mod collation;
pub mod compare;
pub mod date;
pub mod error;
pub mod group;
pub mod keys;
pub mod locale;
pub mod numeric;
pub mod segment;
pub mod settings;
pub mod strategy;
pub mod unicode;

pub use collation::{Collator, CollationKey, Decomposition, RuleCollator, Strength};
pub use compare::HierarchicalComparator;
pub use error::{Error, Result};
pub use group::{GroupKey, GroupKind, GroupRegistry, GroupSeed, GroupTitle};
pub use locale::{DateStyle, Locale};
pub use segment::{Boundary, Segmenter, SimpleSegmenter};
pub use settings::{
    BreakPoint, CaseStyle, DateKind, GroupFormation, IdenticalSortAction, NumericKind, Padding,
    RecordCountRule, SortMethod, SortSettings, SortSuffix,
};
pub use strategy::{CollatedStrategy, KeyContext, SortKey, SortStrategy, build_strategy};

use gloss_entry::{Entry, EntryArena, EntryId, Markup, RecordLog};
use gloss_fields::FieldEnv;
use std::collections::HashMap;

/// The result of one sort run.
#[derive(Debug, Clone)]
pub struct SortOutcome {
    pub order: Vec<EntryId>,
    pub groups: GroupRegistry,
}

pub struct Sorter {
    settings: SortSettings,
    strategy: Box<dyn SortStrategy>,
    segmenter: Box<dyn Segmenter>,
}

impl Sorter {
    /// Build a sorter, failing on settings that cannot work, such as a
    /// record-count sort without `record_tracking`.
    pub fn new(settings: SortSettings, record_tracking: bool) -> Result<Self> {
        let strategy = build_strategy(&settings, record_tracking)?;
        Ok(Self {
            settings,
            strategy,
            segmenter: Box::new(SimpleSegmenter),
        })
    }

    pub fn with_segmenter(mut self, segmenter: Box<dyn Segmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Use `collator` instead of the built-in one. Only locale sorts
    /// collate; for other methods this is a no-op.
    pub fn with_collator(mut self, collator: Box<dyn Collator>) -> Self {
        if matches!(self.settings.method, SortMethod::Locale(_)) {
            self.strategy = Box::new(CollatedStrategy::new(collator));
        }
        self
    }

    pub fn settings(&self) -> &SortSettings {
        &self.settings
    }

    pub fn sort(&self, arena: &mut EntryArena, env: &FieldEnv, records: &RecordLog) -> SortOutcome {
        let keys = self.compute_keys(arena, env, records);

        for (id, key) in arena.ids().zip(&keys) {
            let entry = arena.get_mut(id);
            entry.sort_key = Some(key.text());
            entry.numeric_sort = key.numeric();
        }

        let mut order: Vec<EntryId> = arena.ids().collect();
        {
            let comparator = HierarchicalComparator::new(
                arena,
                env,
                records,
                &self.settings,
                self.strategy.as_ref(),
                &keys,
            );
            order.sort_by(|a, b| comparator.compare(*a, *b));
        }
        tracing::debug!(
            method = %self.settings.method,
            entries = order.len(),
            "Sorted entries"
        );

        let groups = self.assign_groups(arena, env, &order, &keys);
        SortOutcome { order, groups }
    }

    fn compute_keys(
        &self,
        arena: &EntryArena,
        env: &FieldEnv,
        records: &RecordLog,
    ) -> Vec<SortKey> {
        let ctx = KeyContext {
            arena,
            env,
            records,
            settings: &self.settings,
            segmenter: self.segmenter.as_ref(),
        };
        let keys: Vec<SortKey> = arena
            .ids()
            .map(|id| self.strategy.compute_sort_key(&ctx, id))
            .collect();
        if self.settings.suffix == SortSuffix::NonUnique {
            self.suffix_repeated_keys(arena, env, keys)
        } else {
            keys
        }
    }

    /// Append an occurrence counter to the second and later occurrences of
    /// each (type, parent, key) triple, in input order.
    fn suffix_repeated_keys(
        &self,
        arena: &EntryArena,
        env: &FieldEnv,
        keys: Vec<SortKey>,
    ) -> Vec<SortKey> {
        let width = arena.len().to_string().len();
        let mut seen: HashMap<(String, Option<String>, String), usize> = HashMap::new();
        arena
            .ids()
            .zip(keys)
            .map(|(id, key)| {
                if !key.is_textual() {
                    return key;
                }
                let entry = arena.get(id);
                let text = key.text();
                let occurrence = seen
                    .entry((
                        self.group_type(entry, env),
                        parent_label(arena, id),
                        text.clone(),
                    ))
                    .or_insert(0);
                *occurrence += 1;
                if *occurrence == 1 {
                    return key;
                }
                let suffixed = format!(
                    "{}{}{:0width$}",
                    text,
                    self.settings.suffix_marker,
                    *occurrence - 1,
                    width = width
                );
                self.strategy.rekey(key, suffixed)
            })
            .collect()
    }

    fn assign_groups(
        &self,
        arena: &mut EntryArena,
        env: &FieldEnv,
        order: &[EntryId],
        keys: &[SortKey],
    ) -> GroupRegistry {
        let mut registry = GroupRegistry::new(self.settings.group_formation);
        let mut members: Vec<(EntryId, GroupKey)> = Vec::new();
        for &id in order {
            let level = arena.depth(id);
            let entry = arena.get(id);
            if level > self.settings.group_level || entry.has_field("group") {
                continue;
            }
            let parent = parent_label(arena, id);
            let entry_type = self.group_type(entry, env);
            let seed = self.strategy.group_seed(&keys[id.index()]);
            if let Some(key) = registry.register(&entry_type, parent.as_deref(), level, &seed) {
                members.push((id, key));
            }
        }

        if let Some(threshold) = self.settings.merge_small_groups {
            let remap = registry.merge_small_groups(threshold);
            for (_, key) in members.iter_mut() {
                if let Some(merged) = remap.get(key) {
                    *key = merged.clone();
                }
            }
        }

        for (id, key) in members {
            arena.set_field(id, "group", Markup::text(key.to_string()));
        }
        registry
    }

    /// The glossary type an entry is listed under.
    fn group_type(&self, entry: &Entry, env: &FieldEnv) -> String {
        env.access
            .get_field(entry, "type")
            .map(|value| env.text.expand_and_flatten(&value))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.settings.default_type.clone())
    }
}

fn parent_label(arena: &EntryArena, id: EntryId) -> Option<String> {
    arena
        .parent_of(id)
        .map(|parent| arena.get(parent).label().to_string())
}
