/*
 * reference.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Symbolic entry references (`self`, `parent`, `root`, ...).

use gloss_entry::{EntryArena, EntryId};
use std::fmt;

/// Which entry a field reference reads from, relative to a base entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldReference {
    /// The base entry itself.
    SelfRef,
    /// The base entry's parent.
    Parent,
    /// The top-most ancestor of the base entry's parent chain.
    Root,
    /// The base entry's type tag (`original` or `actual`).
    EntryType,
    /// The base entry's label (`original` or `actual`).
    EntryLabel,
}

impl FieldReference {
    /// Look up a reference by its keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "self" => FieldReference::SelfRef,
            "parent" => FieldReference::Parent,
            "root" => FieldReference::Root,
            "entrytype" => FieldReference::EntryType,
            "entrylabel" => FieldReference::EntryLabel,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            FieldReference::SelfRef => "self",
            FieldReference::Parent => "parent",
            FieldReference::Root => "root",
            FieldReference::EntryType => "entrytype",
            FieldReference::EntryLabel => "entrylabel",
        }
    }

    /// Whether this reference must end a reference chain.
    pub fn is_terminal(self) -> bool {
        matches!(self, FieldReference::EntryType | FieldReference::EntryLabel)
    }

    /// Resolve the reference against `base`.
    ///
    /// A missing parent is not an error: `Parent` and `Root` simply yield
    /// `None`, which callers propagate as "no value".
    pub fn resolve(self, arena: &EntryArena, base: EntryId) -> Option<EntryId> {
        match self {
            FieldReference::SelfRef | FieldReference::EntryType | FieldReference::EntryLabel => {
                Some(base)
            }
            FieldReference::Parent => arena.parent_of(base),
            FieldReference::Root => arena.root_of(base),
        }
    }
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloss_entry::Entry;

    #[test]
    fn test_resolve() {
        let mut arena = EntryArena::new();
        let top = arena.insert(Entry::new("top", "entry")).unwrap();
        let mid = arena.insert(Entry::new("mid", "entry").with_parent("top")).unwrap();
        let leaf = arena.insert(Entry::new("leaf", "entry").with_parent("mid")).unwrap();

        assert_eq!(FieldReference::SelfRef.resolve(&arena, leaf), Some(leaf));
        assert_eq!(FieldReference::EntryType.resolve(&arena, leaf), Some(leaf));
        assert_eq!(FieldReference::Parent.resolve(&arena, leaf), Some(mid));
        assert_eq!(FieldReference::Root.resolve(&arena, leaf), Some(top));
        assert_eq!(FieldReference::Root.resolve(&arena, mid), Some(top));
        assert_eq!(FieldReference::Parent.resolve(&arena, top), None);
        assert_eq!(FieldReference::Root.resolve(&arena, top), None);
    }

    #[test]
    fn test_keywords() {
        for reference in [
            FieldReference::SelfRef,
            FieldReference::Parent,
            FieldReference::Root,
            FieldReference::EntryType,
            FieldReference::EntryLabel,
        ] {
            assert_eq!(FieldReference::from_keyword(reference.keyword()), Some(reference));
        }
        assert_eq!(FieldReference::from_keyword("grandparent"), None);
    }
}
