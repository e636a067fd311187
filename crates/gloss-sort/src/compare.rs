/*
 * compare.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Hierarchical comparison of entries.
//!
//! Two entries are compared along their root-to-leaf paths. Shared
//! ancestors are skipped; the first pair of differing path elements is
//! compared by the strategy, and if their keys tie, by the identical-key
//! policy and finally by arena index. When one path is a prefix of the
//! other, the ancestor sorts first whatever the reverse flag says.

use crate::settings::{IdenticalSortAction, SortSettings};
use crate::strategy::{SortKey, SortStrategy};
use gloss_entry::{EntryArena, EntryId, RecordLog};
use gloss_fields::FieldEnv;
use std::cmp::Ordering;

pub struct HierarchicalComparator<'a> {
    pub arena: &'a EntryArena,
    pub env: &'a FieldEnv,
    pub records: &'a RecordLog,
    pub settings: &'a SortSettings,
    pub strategy: &'a dyn SortStrategy,
    /// Keys indexed by arena index.
    pub keys: &'a [SortKey],
    paths: Vec<Vec<EntryId>>,
}

impl<'a> HierarchicalComparator<'a> {
    pub fn new(
        arena: &'a EntryArena,
        env: &'a FieldEnv,
        records: &'a RecordLog,
        settings: &'a SortSettings,
        strategy: &'a dyn SortStrategy,
        keys: &'a [SortKey],
    ) -> Self {
        let paths = arena.ids().map(|id| arena.path(id)).collect();
        Self {
            arena,
            env,
            records,
            settings,
            strategy,
            keys,
            paths,
        }
    }

    pub fn compare(&self, a: EntryId, b: EntryId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        if self.settings.flatten {
            return self.compare_entries(a, b);
        }
        let (path_a, path_b) = (&self.paths[a.index()], &self.paths[b.index()]);
        for (x, y) in path_a.iter().zip(path_b) {
            if x != y {
                return self.compare_entries(*x, *y);
            }
        }
        path_a.len().cmp(&path_b.len())
    }

    /// Compare two entries on their own keys.
    fn compare_entries(&self, a: EntryId, b: EntryId) -> Ordering {
        let order = self
            .strategy
            .compare_keys(&self.keys[a.index()], &self.keys[b.index()]);
        let order = if self.settings.reverse {
            order.reverse()
        } else {
            order
        };
        tracing::trace!(
            a = %self.arena.get(a).label(),
            b = %self.arena.get(b).label(),
            ?order,
            "Compared sort keys"
        );
        if order != Ordering::Equal {
            return order;
        }
        self.identical(a, b)
            .then_with(|| a.index().cmp(&b.index()))
    }

    fn identical(&self, a: EntryId, b: EntryId) -> Ordering {
        let (entry_a, entry_b) = (self.arena.get(a), self.arena.get(b));
        tracing::debug!(
            a = %entry_a.label(),
            b = %entry_b.label(),
            policy = ?self.settings.identical,
            "Identical sort keys"
        );
        match &self.settings.identical {
            IdenticalSortAction::None => Ordering::Equal,
            IdenticalSortAction::Id => entry_a.label().cmp(entry_b.label()),
            IdenticalSortAction::OriginalId => {
                entry_a.original_label().cmp(entry_b.original_label())
            }
            IdenticalSortAction::Def => entry_a
                .definition_index()
                .cmp(&entry_b.definition_index()),
            IdenticalSortAction::Use => {
                let first_use = |label: &str| self.records.first_use(label).unwrap_or(usize::MAX);
                first_use(entry_a.label()).cmp(&first_use(entry_b.label()))
            }
            IdenticalSortAction::Field(field) => {
                let value = |id: EntryId| {
                    self.env
                        .access
                        .get_field_or_fallback(self.arena.get(id), field)
                        .map(|v| self.env.text.expand_and_flatten(&v))
                        .unwrap_or_default()
                };
                value(a).cmp(&value(b))
            }
        }
    }
}
