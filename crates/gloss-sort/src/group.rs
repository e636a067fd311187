/*
 * group.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Group titles ("letter groups") and the registry that collects them.
//!
//! A group is identified by a [`GroupKey`]: the glossary type, an integer
//! id and the parent label for hierarchical groups. Ids are only unique per
//! (type, parent) pair. Letter and other-character groups use the code
//! point of their title as id; number, date and Unicode groups get
//! sequential ids in registration order; merged groups get negative ids.

use crate::settings::GroupFormation;
use crate::unicode::{general_category, script};
use gloss_entry::NumericValue;
use hashlink::LinkedHashMap;
use std::collections::HashMap;
use std::fmt;

/// What a sort strategy contributes to group formation for one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupSeed {
    /// The strategy does not form groups.
    None,
    /// The sort value was empty.
    Empty,
    /// A leading letter (or letter contraction such as `ch`).
    Letter(String),
    /// A leading non-letter character.
    Other(char),
    Number(NumericValue),
    Date { value: i64, title: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub entry_type: String,
    pub id: i64,
    pub parent: Option<String>,
}

impl GroupKey {
    pub fn new(entry_type: impl Into<String>, id: i64, parent: Option<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            id,
            parent,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{}.{}.{}", self.entry_type, parent, self.id),
            None => write!(f, "{}.{}", self.entry_type, self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupKind {
    Letter { letter: String },
    /// A non-letter character, escaped for the typesetting engine.
    Other { character: String },
    Empty,
    Number { value: NumericValue },
    /// A date group; `value` is the key of the first member.
    Date { value: i64 },
    Unicode {
        category: Option<String>,
        script: Option<String>,
    },
    /// Adjacent small groups shown in one slot.
    Merged(Vec<GroupTitle>),
}

impl GroupKind {
    pub fn name(&self) -> &'static str {
        match self {
            GroupKind::Letter { .. } => "letter",
            GroupKind::Other { .. } => "other",
            GroupKind::Empty => "empty",
            GroupKind::Number { .. } => "number",
            GroupKind::Date { .. } => "date",
            GroupKind::Unicode { .. } => "unicode",
            GroupKind::Merged(_) => "merged",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTitle {
    pub key: GroupKey,
    pub title: String,
    /// Hierarchy level of the members (0 for top-level entries).
    pub level: usize,
    pub kind: GroupKind,
    pub members: usize,
}

impl GroupTitle {
    /// The group-display payload: `{title}{second}{id}{type}`, followed by
    /// `{parent}{level}` for hierarchical groups.
    ///
    /// `second` is `extra` when it is non-empty, else the group's own
    /// letter, character or value.
    pub fn format(&self, extra: &str) -> String {
        let second = if extra.is_empty() {
            self.payload()
        } else {
            extra.to_string()
        };
        let mut out = format!(
            "{{{}}}{{{}}}{{{}}}{{{}}}",
            self.title, second, self.key.id, self.key.entry_type
        );
        if let Some(parent) = &self.key.parent {
            out.push_str(&format!("{{{}}}{{{}}}", parent, self.level));
        }
        out
    }

    fn payload(&self) -> String {
        match &self.kind {
            GroupKind::Letter { letter } => letter.clone(),
            GroupKind::Other { character } => character.clone(),
            GroupKind::Empty => String::new(),
            GroupKind::Number { value } => value.to_string(),
            GroupKind::Date { value } => value.to_string(),
            GroupKind::Unicode { .. } => self.title.clone(),
            GroupKind::Merged(parts) => parts.iter().map(|part| part.format("")).collect(),
        }
    }
}

type Scope = (String, Option<String>);

/// Groups in registration order.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    formation: GroupFormation,
    groups: LinkedHashMap<GroupKey, GroupTitle>,
    interned: HashMap<(Scope, String), i64>,
    next_id: HashMap<Scope, i64>,
}

impl GroupRegistry {
    pub fn new(formation: GroupFormation) -> Self {
        Self {
            formation,
            groups: LinkedHashMap::new(),
            interned: HashMap::new(),
            next_id: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&GroupTitle> {
        self.groups.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupTitle> {
        self.groups.values()
    }

    /// Add one member to the group `seed` belongs to, creating the group if
    /// needed. Returns `None` when the seed forms no group.
    pub fn register(
        &mut self,
        entry_type: &str,
        parent: Option<&str>,
        level: usize,
        seed: &GroupSeed,
    ) -> Option<GroupKey> {
        let scope: Scope = (entry_type.to_string(), parent.map(str::to_string));
        let (id, title, kind) = match seed {
            GroupSeed::None => return None,
            GroupSeed::Empty => (0, String::new(), GroupKind::Empty),
            GroupSeed::Letter(text) => self.letter_group(&scope, text),
            GroupSeed::Other(c) => match self.formation {
                GroupFormation::Default | GroupFormation::Codepoint => {
                    let escaped = escape_character(*c);
                    (
                        i64::from(u32::from(*c)),
                        escaped.clone(),
                        GroupKind::Other { character: escaped },
                    )
                }
                _ => self.unicode_group(&scope, *c),
            },
            GroupSeed::Number(value) => {
                let title = value.to_string();
                let id = self.intern(&scope, &title);
                (id, title, GroupKind::Number { value: *value })
            }
            GroupSeed::Date { value, title } => {
                let id = self.intern(&scope, title);
                (id, title.clone(), GroupKind::Date { value: *value })
            }
        };

        let key = GroupKey::new(entry_type, id, scope.1);
        match self.groups.get_mut(&key) {
            Some(group) => group.members += 1,
            None => {
                tracing::debug!(group = %key, title = %title, "Registered group");
                self.groups.insert(
                    key.clone(),
                    GroupTitle {
                        key: key.clone(),
                        title,
                        level,
                        kind,
                        members: 1,
                    },
                );
            }
        }
        Some(key)
    }

    fn letter_group(&mut self, scope: &Scope, text: &str) -> (i64, String, GroupKind) {
        let Some(first) = text.chars().next() else {
            return (0, String::new(), GroupKind::Empty);
        };
        match self.formation {
            GroupFormation::Default => {
                let title = title_case(text);
                (
                    packed_id(&title),
                    title,
                    GroupKind::Letter {
                        letter: text.to_string(),
                    },
                )
            }
            GroupFormation::Codepoint => (
                i64::from(u32::from(first)),
                first.to_string(),
                GroupKind::Letter {
                    letter: first.to_string(),
                },
            ),
            _ => self.unicode_group(scope, first),
        }
    }

    fn unicode_group(&mut self, scope: &Scope, c: char) -> (i64, String, GroupKind) {
        let category = general_category(c);
        let script = script(c);
        let (title, kind) = match self.formation {
            GroupFormation::UnicodeScript => (
                script.to_string(),
                GroupKind::Unicode {
                    category: None,
                    script: Some(script.to_string()),
                },
            ),
            GroupFormation::UnicodeCategoryAndScript => (
                format!("{} {}", category, script),
                GroupKind::Unicode {
                    category: Some(category.to_string()),
                    script: Some(script.to_string()),
                },
            ),
            _ => (
                category.to_string(),
                GroupKind::Unicode {
                    category: Some(category.to_string()),
                    script: None,
                },
            ),
        };
        (self.intern(scope, &title), title, kind)
    }

    fn intern(&mut self, scope: &Scope, token: &str) -> i64 {
        if let Some(id) = self.interned.get(&(scope.clone(), token.to_string())) {
            return *id;
        }
        let next = self.next_id.entry(scope.clone()).or_insert(1);
        let id = *next;
        *next += 1;
        self.interned.insert((scope.clone(), token.to_string()), id);
        id
    }

    /// Merge runs of two or more adjacent groups (per type and parent) that
    /// each have fewer than `threshold` members.
    ///
    /// Returns the mapping from every merged group's key to the key of the
    /// group that replaced it.
    pub fn merge_small_groups(&mut self, threshold: usize) -> HashMap<GroupKey, GroupKey> {
        let mut scopes: LinkedHashMap<Scope, Vec<GroupKey>> = LinkedHashMap::new();
        for key in self.groups.keys() {
            let scope = (key.entry_type.clone(), key.parent.clone());
            match scopes.get_mut(&scope) {
                Some(keys) => keys.push(key.clone()),
                None => {
                    scopes.insert(scope, vec![key.clone()]);
                }
            }
        }

        let mut remap = HashMap::new();
        let mut merged: HashMap<GroupKey, GroupTitle> = HashMap::new();
        for ((entry_type, parent), keys) in scopes {
            let mut next_id = -1;
            let mut run: Vec<GroupKey> = Vec::new();
            // A sentinel flushes the final run.
            for key in keys.into_iter().map(Some).chain([None]) {
                let small = key
                    .as_ref()
                    .and_then(|k| self.groups.get(k))
                    .is_some_and(|group| group.members < threshold);
                if small {
                    if let Some(key) = key {
                        run.push(key);
                    }
                    continue;
                }
                if run.len() >= 2 {
                    let target = GroupKey::new(entry_type.clone(), next_id, parent.clone());
                    next_id -= 1;
                    let parts: Vec<GroupTitle> = run
                        .iter()
                        .filter_map(|k| self.groups.get(k).cloned())
                        .collect();
                    let title = match (parts.first(), parts.last()) {
                        (Some(first), Some(last)) => format!("{}-{}", first.title, last.title),
                        _ => String::new(),
                    };
                    tracing::debug!(group = %target, title = %title, "Merged small groups");
                    for k in &run {
                        remap.insert(k.clone(), target.clone());
                    }
                    merged.insert(
                        target.clone(),
                        GroupTitle {
                            key: target,
                            title,
                            level: parts.first().map_or(0, |p| p.level),
                            members: parts.iter().map(|p| p.members).sum(),
                            kind: GroupKind::Merged(parts),
                        },
                    );
                }
                run.clear();
            }
        }

        if remap.is_empty() {
            return remap;
        }
        let old = std::mem::take(&mut self.groups);
        for (key, group) in old {
            match remap.get(&key) {
                Some(target) => {
                    if let Some(title) = merged.remove(target) {
                        self.groups.insert(target.clone(), title);
                    }
                }
                None => {
                    self.groups.insert(key, group);
                }
            }
        }
        remap
    }
}

/// Title-case a group letter, keeping digraphs that are cased together.
pub fn title_case(text: &str) -> String {
    let digraph = match text {
        "ij" | "Ij" | "IJ" | "ĳ" | "Ĳ" => Some("IJ"),
        "ǆ" | "ǅ" | "Ǆ" => Some("ǅ"),
        "ǉ" | "ǈ" | "Ǉ" => Some("ǈ"),
        "ǌ" | "ǋ" | "Ǌ" => Some("ǋ"),
        _ => None,
    };
    if let Some(digraph) = digraph {
        return digraph.to_string();
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Escape a character that is unsafe in typesetting-engine output.
pub fn escape_character(c: char) -> String {
    match c {
        '#' | '$' | '%' | '&' | '_' | '{' | '}' => format!("\\{}", c),
        '\\' | '^' | '~' => format!("\\char{}", u32::from(c)),
        c if c.is_control() => format!("\\char{}", u32::from(c)),
        c => c.to_string(),
    }
}

/// Code point of a one-character title; longer titles pack up to three
/// code points into 21-bit fields.
fn packed_id(title: &str) -> i64 {
    title
        .chars()
        .take(3)
        .fold(0i64, |id, c| (id << 21) | i64::from(u32::from(c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_title_case_digraphs() {
        assert_eq!(title_case("a"), "A");
        assert_eq!(title_case("ch"), "Ch");
        assert_eq!(title_case("ij"), "IJ");
        assert_eq!(title_case("ǆ"), "ǅ");
        assert_eq!(title_case("dž"), "Dž");
    }

    #[test]
    fn test_escape_character() {
        assert_eq!(escape_character('#'), "\\#");
        assert_eq!(escape_character('\\'), "\\char92");
        assert_eq!(escape_character('~'), "\\char126");
        assert_eq!(escape_character('@'), "@");
    }

    #[test]
    fn test_letter_groups_share_case() {
        let mut registry = GroupRegistry::new(GroupFormation::Default);
        let a = registry.register("main", None, 0, &GroupSeed::Letter("a".into()));
        let b = registry.register("main", None, 0, &GroupSeed::Letter("A".into()));
        assert_eq!(a, b);
        let key = a.unwrap();
        assert_eq!(key.id, 65);
        assert_eq!(registry.get(&key).unwrap().members, 2);
        assert_eq!(registry.get(&key).unwrap().format(""), "{A}{a}{65}{main}");
    }

    #[test]
    fn test_ids_are_per_scope() {
        let mut registry = GroupRegistry::new(GroupFormation::UnicodeScript);
        let latin = registry.register("main", None, 0, &GroupSeed::Letter("a".into()));
        let greek = registry.register("main", None, 0, &GroupSeed::Letter("λ".into()));
        let other = registry.register("other", None, 0, &GroupSeed::Letter("λ".into()));
        assert_eq!(latin.unwrap().id, 1);
        assert_eq!(greek.unwrap().id, 2);
        assert_eq!(other.unwrap().id, 1);
    }

    #[test]
    fn test_hierarchical_format() {
        let mut registry = GroupRegistry::new(GroupFormation::Default);
        let key = registry
            .register("main", Some("fruit"), 1, &GroupSeed::Other('#'))
            .unwrap();
        assert_eq!(
            registry.get(&key).unwrap().format("x"),
            "{\\#}{x}{35}{main}{fruit}{1}"
        );
    }

    #[test]
    fn test_merge_small_groups() {
        let mut registry = GroupRegistry::new(GroupFormation::Default);
        for letter in ["a", "b", "c", "c", "c", "d"] {
            registry.register("main", None, 0, &GroupSeed::Letter(letter.into()));
        }
        let remap = registry.merge_small_groups(2);
        let titles: Vec<_> = registry.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["A-B", "C", "D"]);
        assert_eq!(remap.len(), 2);
        let merged = registry.iter().next().unwrap();
        assert_eq!(merged.key.id, -1);
        assert_eq!(merged.members, 2);
        assert_eq!(merged.kind.name(), "merged");
    }
}
