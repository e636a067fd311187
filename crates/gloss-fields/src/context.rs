/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Evaluation context for field expressions and conditionals.
//!
//! [`EvalContext`] is threaded through every evaluation call. Besides
//! access to the entry collection and the external services, it owns the
//! scratch slot holding the capture groups of the most recent successful
//! regular expression match, which the `\MGP` quark reads.

use crate::labelify::LabelifyRules;
use gloss_entry::{EntryArena, FallbackRules, FieldAccess, PlainTextService, TextService};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt;

/// Services shared by all evaluations of one resource.
pub struct FieldEnv {
    pub access: Box<dyn FieldAccess>,
    pub text: Box<dyn TextService>,
    pub labelify: LabelifyRules,
}

impl FieldEnv {
    pub fn new(access: Box<dyn FieldAccess>, text: Box<dyn TextService>) -> Self {
        Self {
            access,
            text,
            labelify: LabelifyRules::default(),
        }
    }

    pub fn with_labelify(mut self, labelify: LabelifyRules) -> Self {
        self.labelify = labelify;
        self
    }
}

impl Default for FieldEnv {
    fn default() -> Self {
        Self::new(
            Box::new(FallbackRules::new()),
            Box::new(PlainTextService::new()),
        )
    }
}

impl fmt::Debug for FieldEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEnv")
            .field("labelify", &self.labelify)
            .finish_non_exhaustive()
    }
}

/// Reference to a capture group, by 1-based index or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Index(usize),
    Name(String),
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRef::Index(n) => write!(f, "{}", n),
            GroupRef::Name(name) => f.write_str(name),
        }
    }
}

/// Capture groups of a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchGroups {
    groups: Vec<Option<String>>,
    names: HashMap<String, usize>,
}

impl MatchGroups {
    pub fn from_captures(regex: &Regex, captures: &Captures<'_>) -> Self {
        let groups = captures
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        let names = regex
            .capture_names()
            .enumerate()
            .filter_map(|(i, name)| name.map(|n| (n.to_string(), i)))
            .collect();
        Self { groups, names }
    }

    /// Group `0` is the whole match.
    pub fn get(&self, group: &GroupRef) -> Option<&str> {
        let index = match group {
            GroupRef::Index(i) => *i,
            GroupRef::Name(name) => *self.names.get(name)?,
        };
        self.groups.get(index)?.as_deref()
    }
}

/// Per-evaluation state.
pub struct EvalContext<'a> {
    arena: &'a EntryArena,
    env: &'a FieldEnv,
    match_groups: Option<MatchGroups>,
}

impl<'a> EvalContext<'a> {
    pub fn new(arena: &'a EntryArena, env: &'a FieldEnv) -> Self {
        Self {
            arena,
            env,
            match_groups: None,
        }
    }

    pub fn arena(&self) -> &'a EntryArena {
        self.arena
    }

    pub fn env(&self) -> &'a FieldEnv {
        self.env
    }

    /// Forget the groups of any previous match.
    pub fn reset_match_groups(&mut self) {
        self.match_groups = None;
    }

    pub fn record_match(&mut self, regex: &Regex, captures: &Captures<'_>) {
        self.match_groups = Some(MatchGroups::from_captures(regex, captures));
    }

    /// Read a group of the last successful match.
    ///
    /// Returns `None` before any match has occurred, or if the group did not
    /// participate in the match.
    pub fn match_group(&self, group: &GroupRef) -> Option<&str> {
        self.match_groups.as_ref()?.get(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_groups_by_index_and_name() {
        let regex = Regex::new(r"^(?<word>[a-z]+)-(\d+)$").unwrap();
        let captures = regex.captures("item-42").unwrap();
        let groups = MatchGroups::from_captures(&regex, &captures);
        assert_eq!(groups.get(&GroupRef::Index(0)), Some("item-42"));
        assert_eq!(groups.get(&GroupRef::Index(1)), Some("item"));
        assert_eq!(groups.get(&GroupRef::Index(2)), Some("42"));
        assert_eq!(groups.get(&GroupRef::Name("word".into())), Some("item"));
        assert_eq!(groups.get(&GroupRef::Index(3)), None);
        assert_eq!(groups.get(&GroupRef::Name("nope".into())), None);
    }

    #[test]
    fn test_context_starts_without_match() {
        let arena = EntryArena::new();
        let env = FieldEnv::default();
        let mut ctx = EvalContext::new(&arena, &env);
        assert_eq!(ctx.match_group(&GroupRef::Index(1)), None);

        let regex = Regex::new("(a)").unwrap();
        let captures = regex.captures("a").unwrap();
        ctx.record_match(&regex, &captures);
        assert_eq!(ctx.match_group(&GroupRef::Index(1)), Some("a"));
        ctx.reset_match_groups();
        assert_eq!(ctx.match_group(&GroupRef::Index(1)), None);
    }
}
