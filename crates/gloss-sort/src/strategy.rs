/*
 * strategy.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Sort strategies.
//!
//! A [`SortStrategy`] computes one [`SortKey`] per entry and compares two
//! keys. It knows nothing about the hierarchy: the driver in
//! [`crate::compare`] calls it only for the entries it needs to compare.

use crate::collation::{Collator, RuleCollator};
use crate::date::{DateValue, date_sort_value};
use crate::error::{Error, Result};
use crate::group::GroupSeed;
use crate::keys::{prepare_text, raw_sort_value};
use crate::numeric::numeric_sort_value;
use crate::segment::Segmenter;
use crate::settings::{CaseStyle, DateKind, NumericKind, SortMethod, SortSettings};
use gloss_entry::{EntryArena, EntryId, NumericValue, RecordLog};
use gloss_fields::FieldEnv;
use std::cmp::Ordering;

/// Everything a strategy may read while computing keys.
pub struct KeyContext<'a> {
    pub arena: &'a EntryArena,
    pub env: &'a FieldEnv,
    pub records: &'a RecordLog,
    pub settings: &'a SortSettings,
    pub segmenter: &'a dyn Segmenter,
}

/// A computed per-entry sort key.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Collated {
        text: String,
        key: crate::collation::CollationKey,
    },
    Number {
        text: String,
        value: NumericValue,
    },
    Date {
        text: String,
        value: DateValue,
    },
    /// Position in definition or use order.
    Position(usize),
}

impl SortKey {
    /// The storable sort string.
    pub fn text(&self) -> String {
        match self {
            SortKey::Text(text)
            | SortKey::Collated { text, .. }
            | SortKey::Number { text, .. }
            | SortKey::Date { text, .. } => text.clone(),
            SortKey::Position(position) => position.to_string(),
        }
    }

    /// Whether the key is a string that the non-unique suffix applies to.
    pub fn is_textual(&self) -> bool {
        matches!(self, SortKey::Text(_) | SortKey::Collated { .. })
    }

    /// The value stored as the entry's numeric sort.
    pub fn numeric(&self) -> Option<NumericValue> {
        match self {
            SortKey::Number { value, .. } => Some(*value),
            SortKey::Date { value, .. } => Some(NumericValue::Integer(value.key())),
            SortKey::Position(position) => i64::try_from(*position).ok().map(NumericValue::Integer),
            SortKey::Text(_) | SortKey::Collated { .. } => None,
        }
    }
}

pub trait SortStrategy {
    fn compute_sort_key(&self, ctx: &KeyContext<'_>, id: EntryId) -> SortKey;

    fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering;

    /// Replace the text of a textual key, recomputing whatever depends on it.
    fn rekey(&self, key: SortKey, _text: String) -> SortKey {
        key
    }

    fn group_seed(&self, key: &SortKey) -> GroupSeed;
}

/// Build the strategy for `settings`.
///
/// `record_tracking` says whether location records were collected; the
/// record-count method cannot work without them.
pub fn build_strategy(
    settings: &SortSettings,
    record_tracking: bool,
) -> Result<Box<dyn SortStrategy>> {
    let strategy: Box<dyn SortStrategy> = match &settings.method {
        SortMethod::None => Box::new(OrderStrategy { by_use: false }),
        SortMethod::Use => Box::new(OrderStrategy { by_use: true }),
        SortMethod::Letter(style) => Box::new(LetterStrategy { style: *style }),
        SortMethod::Locale(_) => {
            let collator = RuleCollator::new(settings.effective_locale())
                .with_strength(settings.strength)
                .with_decomposition(settings.decomposition);
            Box::new(CollatedStrategy::new(Box::new(collator)))
        }
        SortMethod::Numeric(kind) => Box::new(NumericStrategy { kind: *kind }),
        SortMethod::Date(kind, _) => Box::new(DateStrategy {
            kind: *kind,
            group_pattern: settings.date_group_pattern.clone(),
        }),
        SortMethod::RecordCount => {
            if !record_tracking {
                return Err(Error::RecordCountDisabled);
            }
            Box::new(RecordCountStrategy)
        }
    };
    Ok(strategy)
}

/// Code-point order with a case style.
#[derive(Debug, Clone, Copy)]
pub struct LetterStrategy {
    pub style: CaseStyle,
}

impl LetterStrategy {
    fn char_key(&self, c: char) -> (char, u8) {
        let lower = c.to_lowercase().next().unwrap_or(c);
        let rank = match (self.style, c.is_uppercase()) {
            (CaseStyle::UpperLower, true) | (CaseStyle::LowerUpper, false) => 0,
            _ => 1,
        };
        (lower, rank)
    }
}

impl SortStrategy for LetterStrategy {
    fn compute_sort_key(&self, ctx: &KeyContext<'_>, id: EntryId) -> SortKey {
        SortKey::Text(prepare_text(ctx, id, Some(self.style)))
    }

    fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        let (a, b) = (a.text(), b.text());
        match self.style {
            CaseStyle::Case | CaseStyle::NoCase => a.cmp(&b),
            CaseStyle::UpperLower | CaseStyle::LowerUpper => a
                .chars()
                .map(|c| self.char_key(c))
                .cmp(b.chars().map(|c| self.char_key(c))),
        }
    }

    fn rekey(&self, _key: SortKey, text: String) -> SortKey {
        SortKey::Text(text)
    }

    fn group_seed(&self, key: &SortKey) -> GroupSeed {
        match key.text().chars().find(|c| !c.is_whitespace()) {
            Some(c) if c.is_alphabetic() => GroupSeed::Letter(c.to_string()),
            Some(c) => GroupSeed::Other(c),
            None => GroupSeed::Empty,
        }
    }
}

/// Locale-aware collation.
pub struct CollatedStrategy {
    collator: Box<dyn Collator>,
}

impl CollatedStrategy {
    pub fn new(collator: Box<dyn Collator>) -> Self {
        Self { collator }
    }
}

impl SortStrategy for CollatedStrategy {
    fn compute_sort_key(&self, ctx: &KeyContext<'_>, id: EntryId) -> SortKey {
        let text = prepare_text(ctx, id, None);
        let key = self.collator.collation_key(&text);
        SortKey::Collated { text, key }
    }

    fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a, b) {
            (SortKey::Collated { key: a, .. }, SortKey::Collated { key: b, .. }) => a.cmp(b),
            _ => self.collator.compare(&a.text(), &b.text()),
        }
    }

    fn rekey(&self, _key: SortKey, text: String) -> SortKey {
        let key = self.collator.collation_key(&text);
        SortKey::Collated { text, key }
    }

    fn group_seed(&self, key: &SortKey) -> GroupSeed {
        match self.collator.leading_element(&key.text()) {
            Some(element) if element.is_letter() => GroupSeed::Letter(element.text),
            Some(element) => element
                .text
                .chars()
                .next()
                .map_or(GroupSeed::Empty, GroupSeed::Other),
            None => GroupSeed::Empty,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NumericStrategy {
    pub kind: NumericKind,
}

impl SortStrategy for NumericStrategy {
    fn compute_sort_key(&self, ctx: &KeyContext<'_>, id: EntryId) -> SortKey {
        let text = raw_sort_value(ctx, id);
        let value = numeric_sort_value(
            &text,
            self.kind,
            &ctx.settings.locale,
            ctx.settings.numeric_pattern.as_deref(),
            ctx.arena.get(id).label(),
        );
        SortKey::Number {
            text: value.to_string(),
            value,
        }
    }

    fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a, b) {
            (SortKey::Number { value: a, .. }, SortKey::Number { value: b, .. }) => a.total_cmp(b),
            _ => a.text().cmp(&b.text()),
        }
    }

    fn group_seed(&self, key: &SortKey) -> GroupSeed {
        match key {
            SortKey::Number { value, .. } => GroupSeed::Number(*value),
            _ => GroupSeed::Empty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DateStrategy {
    pub kind: DateKind,
    /// `chrono` pattern for group titles.
    pub group_pattern: Option<String>,
}

impl SortStrategy for DateStrategy {
    fn compute_sort_key(&self, ctx: &KeyContext<'_>, id: EntryId) -> SortKey {
        let text = raw_sort_value(ctx, id);
        let value = date_sort_value(
            &text,
            self.kind,
            ctx.settings.effective_locale(),
            ctx.settings.date_pattern.as_deref(),
            ctx.arena.get(id).label(),
        );
        SortKey::Date {
            text: value.canonical(),
            value,
        }
    }

    fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a, b) {
            (SortKey::Date { value: a, .. }, SortKey::Date { value: b, .. }) => {
                a.key().cmp(&b.key())
            }
            _ => a.text().cmp(&b.text()),
        }
    }

    fn group_seed(&self, key: &SortKey) -> GroupSeed {
        match key {
            SortKey::Date { value, .. } => GroupSeed::Date {
                value: value.key(),
                title: value.group_title(self.group_pattern.as_deref()),
            },
            _ => GroupSeed::Empty,
        }
    }
}

/// Number of location records per entry.
#[derive(Debug, Clone, Copy)]
pub struct RecordCountStrategy;

impl SortStrategy for RecordCountStrategy {
    fn compute_sort_key(&self, ctx: &KeyContext<'_>, id: EntryId) -> SortKey {
        let label = ctx.arena.get(id).label();
        let count = ctx
            .records
            .for_label(label)
            .filter(|record| ctx.settings.record_count_rule.includes(record))
            .count();
        let value = NumericValue::Integer(i64::try_from(count).unwrap_or(i64::MAX));
        SortKey::Number {
            text: count.to_string(),
            value,
        }
    }

    fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a.numeric(), b.numeric()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => Ordering::Equal,
        }
    }

    fn group_seed(&self, key: &SortKey) -> GroupSeed {
        key.numeric().map_or(GroupSeed::Empty, GroupSeed::Number)
    }
}

/// Definition order, or order of first use.
#[derive(Debug, Clone, Copy)]
pub struct OrderStrategy {
    pub by_use: bool,
}

impl SortStrategy for OrderStrategy {
    fn compute_sort_key(&self, ctx: &KeyContext<'_>, id: EntryId) -> SortKey {
        let entry = ctx.arena.get(id);
        let definition = entry.definition_index();
        if !self.by_use {
            return SortKey::Position(definition);
        }
        // Unused entries follow the used ones, in definition order.
        let position = ctx
            .records
            .first_use(entry.label())
            .unwrap_or(ctx.records.len() + definition);
        SortKey::Position(position)
    }

    fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a, b) {
            (SortKey::Position(a), SortKey::Position(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    fn group_seed(&self, _key: &SortKey) -> GroupSeed {
        GroupSeed::None
    }
}
