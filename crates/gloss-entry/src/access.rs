/*
 * access.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Field access with fallback values.
//!
//! Some glossary fields have a computed default when they are absent
//! (for example `sort` falls back to `name`). [`FieldAccess`] is the seam
//! through which expressions and sort strategies read entry fields, so the
//! fallback rules can be swapped by the caller.

use crate::entry::Entry;
use crate::markup::{Markup, Token};
use std::collections::HashMap;

/// Read access to entry fields.
pub trait FieldAccess {
    /// The explicitly set value of a field.
    fn get_field(&self, entry: &Entry, name: &str) -> Option<Markup>;

    /// The computed default of a field that is absent.
    fn get_fallback(&self, entry: &Entry, name: &str) -> Option<Markup>;

    /// The field value, or its fallback if the field is absent.
    fn get_field_or_fallback(&self, entry: &Entry, name: &str) -> Option<Markup> {
        self.get_field(entry, name)
            .or_else(|| self.get_fallback(entry, name))
    }
}

/// Standard glossary fallback rules.
///
/// | field | fallback |
/// |-------|----------|
/// | `sort` | `name` |
/// | `text` | `name` |
/// | `first` | `text` |
/// | `plural` | `text` + `s` |
/// | `firstplural` | `first` + `s` if `first` is set, else `plural` |
///
/// Additional field-to-field mappings can be registered with
/// [`FallbackRules::with_mapping`]; they take precedence over the
/// built-in rules.
#[derive(Debug, Clone, Default)]
pub struct FallbackRules {
    mappings: HashMap<String, String>,
    plural_suffix: Option<String>,
}

impl FallbackRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `field` fall back to the value of `fallback`.
    pub fn with_mapping(mut self, field: impl Into<String>, fallback: impl Into<String>) -> Self {
        self.mappings.insert(field.into(), fallback.into());
        self
    }

    /// Change the suffix used to form plurals (default `s`).
    pub fn with_plural_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.plural_suffix = Some(suffix.into());
        self
    }

    fn pluralize(&self, mut value: Markup) -> Markup {
        let suffix = self.plural_suffix.as_deref().unwrap_or("s");
        value.push(Token::Text(suffix.to_string()));
        value
    }

    fn fallback_depth(&self, entry: &Entry, name: &str, depth: usize) -> Option<Markup> {
        // Guards against user mappings that refer to each other.
        if depth > 8 {
            return None;
        }
        let lookup = |field: &str| {
            self.get_field(entry, field)
                .or_else(|| self.fallback_depth(entry, field, depth + 1))
        };

        if let Some(mapped) = self.mappings.get(name) {
            return lookup(mapped);
        }

        match name {
            "sort" | "text" => lookup("name"),
            "first" => lookup("text"),
            "plural" => lookup("text").map(|v| self.pluralize(v)),
            "firstplural" => match self.get_field(entry, "first") {
                Some(first) => Some(self.pluralize(first)),
                None => lookup("plural"),
            },
            _ => None,
        }
    }
}

impl FieldAccess for FallbackRules {
    fn get_field(&self, entry: &Entry, name: &str) -> Option<Markup> {
        if name == "parent" {
            return entry.parent().map(Markup::text);
        }
        entry.field(name).cloned()
    }

    fn get_fallback(&self, entry: &Entry, name: &str) -> Option<Markup> {
        self.fallback_depth(entry, name, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_falls_back_to_name() {
        let entry = Entry::new("x", "entry").with_field("name", "Apple");
        let rules = FallbackRules::new();
        assert_eq!(rules.get_field(&entry, "sort"), None);
        assert_eq!(
            rules.get_field_or_fallback(&entry, "sort").unwrap().to_plain(),
            "Apple"
        );
    }

    #[test]
    fn test_plural_chain() {
        let entry = Entry::new("x", "entry").with_field("name", "duck");
        let rules = FallbackRules::new();
        assert_eq!(
            rules.get_fallback(&entry, "firstplural").unwrap().to_plain(),
            "ducks"
        );
        let entry = entry.with_field("first", "mallard");
        assert_eq!(
            rules.get_fallback(&entry, "firstplural").unwrap().to_plain(),
            "mallards"
        );
    }

    #[test]
    fn test_custom_mapping_and_cycle_guard() {
        let entry = Entry::new("x", "entry").with_field("symbol", "\\alpha");
        let rules = FallbackRules::new()
            .with_mapping("sort", "symbol")
            .with_mapping("a", "b")
            .with_mapping("b", "a");
        assert_eq!(
            rules.get_fallback(&entry, "sort").unwrap().to_plain(),
            "\\alpha"
        );
        assert_eq!(rules.get_fallback(&entry, "a"), None);
    }

    #[test]
    fn test_parent_is_readable_as_field() {
        let entry = Entry::new("x", "entry").with_parent("y");
        let rules = FallbackRules::new();
        assert_eq!(rules.get_field(&entry, "parent").unwrap().to_plain(), "y");
    }
}
