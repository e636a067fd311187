/*
 * conditional.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Boolean predicates guarding field assignments.
//!
//! Null handling differs per predicate family:
//! - string comparisons treat null as the empty string
//! - numeric and length comparisons treat null as 0
//! - [`Conditional::Null`] is the only predicate that tells null and empty apart
//! - containment, prefix and suffix tests are false when the left-hand side
//!   is null or empty, even if the right-hand side is empty too

use crate::context::EvalContext;
use crate::value::FieldValueElement;
use gloss_entry::EntryId;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

/// Comparison relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Relation {
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Relation::Eq => ordering == Ordering::Equal,
            Relation::Ne => ordering != Ordering::Equal,
            Relation::Lt => ordering == Ordering::Less,
            Relation::Le => ordering != Ordering::Greater,
            Relation::Gt => ordering == Ordering::Greater,
            Relation::Ge => ordering != Ordering::Less,
        }
    }

    /// Apply an equality-style relation to a boolean test result.
    fn holds_bool(self, result: bool) -> bool {
        match self {
            Relation::Ne => !result,
            _ => result,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Ne => "<>",
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Right-hand side of a length comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthOperand {
    Number(usize),
    Length(FieldValueElement),
}

/// A compiled `/regex/` operand. Matches must cover the whole value.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    anchored: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            anchored,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.anchored
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

/// A predicate over one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditional {
    /// Compare plain string values.
    StringCompare {
        lhs: FieldValueElement,
        relation: Relation,
        rhs: FieldValueElement,
    },
    /// Compare the left-hand value, parsed as a number, with a constant.
    NumericCompare {
        lhs: FieldValueElement,
        relation: Relation,
        rhs: f64,
    },
    /// Compare the interpreted length of a value.
    LengthCompare {
        lhs: FieldValueElement,
        relation: Relation,
        rhs: LengthOperand,
    },
    /// `value = \NULL` (`is_null`) or `value <> \NULL`.
    Null {
        value: FieldValueElement,
        is_null: bool,
    },
    /// `lhs \IN rhs`: the left-hand value occurs in the right-hand value.
    Contains {
        lhs: FieldValueElement,
        relation: Relation,
        rhs: FieldValueElement,
    },
    /// `lhs \PREFIXOF rhs`
    PrefixOf {
        lhs: FieldValueElement,
        relation: Relation,
        rhs: FieldValueElement,
    },
    /// `lhs \SUFFIXOF rhs`
    SuffixOf {
        lhs: FieldValueElement,
        relation: Relation,
        rhs: FieldValueElement,
    },
    /// `value = /regex/`
    Regex {
        value: FieldValueElement,
        relation: Relation,
        pattern: Pattern,
    },
    And(Vec<Conditional>),
    Or(Vec<Conditional>),
    Not(Box<Conditional>),
}

impl Conditional {
    /// Evaluate the predicate for `entry`.
    ///
    /// A successful regular expression match records its capture groups in
    /// the context for later `\MGP` quarks.
    pub fn evaluate(&self, ctx: &mut EvalContext<'_>, entry: EntryId) -> bool {
        let result = match self {
            Conditional::StringCompare { lhs, relation, rhs } => {
                let a = lhs.plain(ctx, entry).unwrap_or_default();
                let b = rhs.plain(ctx, entry).unwrap_or_default();
                relation.holds(a.cmp(&b))
            }
            Conditional::NumericCompare { lhs, relation, rhs } => {
                let a = numeric_value(lhs.plain(ctx, entry));
                relation.holds(a.total_cmp(rhs))
            }
            Conditional::LengthCompare { lhs, relation, rhs } => {
                let a = lhs.length(ctx, entry).unwrap_or(0);
                let b = match rhs {
                    LengthOperand::Number(n) => *n,
                    LengthOperand::Length(element) => element.length(ctx, entry).unwrap_or(0),
                };
                relation.holds(a.cmp(&b))
            }
            Conditional::Null { value, is_null } => value.value(ctx, entry).is_none() == *is_null,
            Conditional::Contains { lhs, relation, rhs } => {
                relation.holds_bool(string_test(ctx, entry, lhs, rhs, |a, b| b.contains(a)))
            }
            Conditional::PrefixOf { lhs, relation, rhs } => {
                relation.holds_bool(string_test(ctx, entry, lhs, rhs, |a, b| b.starts_with(a)))
            }
            Conditional::SuffixOf { lhs, relation, rhs } => {
                relation.holds_bool(string_test(ctx, entry, lhs, rhs, |a, b| b.ends_with(a)))
            }
            Conditional::Regex {
                value,
                relation,
                pattern,
            } => {
                let text = value.plain(ctx, entry).unwrap_or_default();
                let matched = match pattern.regex().captures(&text) {
                    Some(captures) => {
                        ctx.record_match(pattern.regex(), &captures);
                        true
                    }
                    None => false,
                };
                relation.holds_bool(matched)
            }
            Conditional::And(conditions) => conditions.iter().all(|c| c.evaluate(ctx, entry)),
            Conditional::Or(conditions) => conditions.iter().any(|c| c.evaluate(ctx, entry)),
            Conditional::Not(condition) => !condition.evaluate(ctx, entry),
        };
        tracing::trace!(
            entry = %ctx.arena().get(entry).label(),
            condition = %self,
            result,
            "Evaluated condition"
        );
        result
    }
}

/// Left-hand null or empty never matches.
fn string_test(
    ctx: &EvalContext<'_>,
    entry: EntryId,
    lhs: &FieldValueElement,
    rhs: &FieldValueElement,
    test: impl Fn(&str, &str) -> bool,
) -> bool {
    let a = match lhs.plain(ctx, entry) {
        Some(a) if !a.is_empty() => a,
        _ => return false,
    };
    let b = rhs.plain(ctx, entry).unwrap_or_default();
    test(&a, &b)
}

fn numeric_value(value: Option<String>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or_else(|_| {
        tracing::debug!(value = %trimmed, "Non-numeric value compared as 0");
        0.0
    })
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conditional::StringCompare { lhs, relation, rhs } => {
                write!(f, "{} {} {}", lhs, relation, rhs)
            }
            Conditional::NumericCompare { lhs, relation, rhs } => {
                write!(f, "{} {} {}", lhs, relation, rhs)
            }
            Conditional::LengthCompare { lhs, relation, rhs } => {
                write!(f, "\\LEN{{{}}} {} ", lhs, relation)?;
                match rhs {
                    LengthOperand::Number(n) => write!(f, "{}", n),
                    LengthOperand::Length(element) => write!(f, "\\LEN{{{}}}", element),
                }
            }
            Conditional::Null { value, is_null } => {
                write!(f, "{} {} \\NULL", value, if *is_null { "=" } else { "<>" })
            }
            Conditional::Contains { lhs, relation, rhs } => {
                let op = if *relation == Relation::Ne { "\\NIN" } else { "\\IN" };
                write!(f, "{} {} {}", lhs, op, rhs)
            }
            Conditional::PrefixOf { lhs, relation, rhs } => {
                let op = if *relation == Relation::Ne {
                    "\\NOTPREFIXOF"
                } else {
                    "\\PREFIXOF"
                };
                write!(f, "{} {} {}", lhs, op, rhs)
            }
            Conditional::SuffixOf { lhs, relation, rhs } => {
                let op = if *relation == Relation::Ne {
                    "\\NOTSUFFIXOF"
                } else {
                    "\\SUFFIXOF"
                };
                write!(f, "{} {} {}", lhs, op, rhs)
            }
            Conditional::Regex {
                value,
                relation,
                pattern,
            } => write!(f, "{} {} /{}/", value, relation, pattern.as_str()),
            Conditional::And(conditions) => write_joined(f, conditions, " & "),
            Conditional::Or(conditions) => write_joined(f, conditions, " | "),
            Conditional::Not(condition) => write!(f, "!({})", condition),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, conditions: &[Conditional], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", condition)?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FieldEnv, GroupRef};
    use gloss_entry::{Entry, EntryArena};

    fn setup() -> (EntryArena, EntryId, EntryId) {
        let mut arena = EntryArena::new();
        let full = arena
            .insert(
                Entry::new("full", "entry")
                    .with_field("name", "apple")
                    .with_field("description", "short")
                    .with_field("empty", "")
                    .with_field("count", "12"),
            )
            .unwrap();
        let bare = arena.insert(Entry::new("bare", "entry")).unwrap();
        (arena, full, bare)
    }

    fn eval(condition: &Conditional, arena: &EntryArena, entry: EntryId) -> bool {
        let env = FieldEnv::default();
        let mut ctx = EvalContext::new(arena, &env);
        condition.evaluate(&mut ctx, entry)
    }

    fn field(name: &str) -> FieldValueElement {
        FieldValueElement::field(name)
    }

    #[test]
    fn test_empty_equals_empty_but_does_not_contain_it() {
        let (arena, full, _) = setup();
        let equals = Conditional::StringCompare {
            lhs: FieldValueElement::literal(""),
            relation: Relation::Eq,
            rhs: field("empty"),
        };
        let contains = Conditional::Contains {
            lhs: FieldValueElement::literal(""),
            relation: Relation::Eq,
            rhs: field("empty"),
        };
        assert!(eval(&equals, &arena, full));
        assert!(!eval(&contains, &arena, full));
    }

    #[test]
    fn test_null_vs_empty() {
        let (arena, full, bare) = setup();
        let is_null = Conditional::Null {
            value: field("empty"),
            is_null: true,
        };
        assert!(!eval(&is_null, &arena, full));
        let missing_is_null = Conditional::Null {
            value: field("description"),
            is_null: true,
        };
        assert!(eval(&missing_is_null, &arena, bare));
        // String comparison treats null as empty.
        let null_equals_empty = Conditional::StringCompare {
            lhs: field("description"),
            relation: Relation::Eq,
            rhs: FieldValueElement::literal(""),
        };
        assert!(eval(&null_equals_empty, &arena, bare));
    }

    #[test]
    fn test_length_compare() {
        let (arena, full, bare) = setup();
        let longer_than_ten = Conditional::LengthCompare {
            lhs: field("description"),
            relation: Relation::Gt,
            rhs: LengthOperand::Number(10),
        };
        assert!(!eval(&longer_than_ten, &arena, full));
        assert!(!eval(&longer_than_ten, &arena, bare));
        let at_most_five = Conditional::LengthCompare {
            lhs: field("description"),
            relation: Relation::Le,
            rhs: LengthOperand::Length(field("name")),
        };
        assert!(eval(&at_most_five, &arena, full));
    }

    #[test]
    fn test_numeric_compare_treats_null_as_zero() {
        let (arena, full, bare) = setup();
        let over_ten = Conditional::NumericCompare {
            lhs: field("count"),
            relation: Relation::Gt,
            rhs: 10.0,
        };
        assert!(eval(&over_ten, &arena, full));
        let is_zero = Conditional::NumericCompare {
            lhs: field("count"),
            relation: Relation::Eq,
            rhs: 0.0,
        };
        assert!(eval(&is_zero, &arena, bare));
    }

    #[test]
    fn test_prefix_suffix() {
        let (arena, full, _) = setup();
        let prefix = Conditional::PrefixOf {
            lhs: FieldValueElement::literal("app"),
            relation: Relation::Eq,
            rhs: field("name"),
        };
        let not_suffix = Conditional::SuffixOf {
            lhs: FieldValueElement::literal("app"),
            relation: Relation::Ne,
            rhs: field("name"),
        };
        assert!(eval(&prefix, &arena, full));
        assert!(eval(&not_suffix, &arena, full));
    }

    #[test]
    fn test_regex_requires_full_match_and_records_groups() {
        let (arena, full, _) = setup();
        let env = FieldEnv::default();
        let mut ctx = EvalContext::new(&arena, &env);
        let partial = Conditional::Regex {
            value: field("name"),
            relation: Relation::Eq,
            pattern: Pattern::new("pp").unwrap(),
        };
        assert!(!partial.evaluate(&mut ctx, full));
        assert_eq!(ctx.match_group(&GroupRef::Index(0)), None);

        let whole = Conditional::Regex {
            value: field("name"),
            relation: Relation::Eq,
            pattern: Pattern::new("(a)(p+)le").unwrap(),
        };
        assert!(whole.evaluate(&mut ctx, full));
        assert_eq!(ctx.match_group(&GroupRef::Index(2)), Some("pp"));
    }

    #[test]
    fn test_composition() {
        let (arena, full, _) = setup();
        let yes = Conditional::Null {
            value: field("name"),
            is_null: false,
        };
        let no = Conditional::Not(Box::new(yes.clone()));
        assert!(eval(&Conditional::Or(vec![no.clone(), yes.clone()]), &arena, full));
        assert!(!eval(&Conditional::And(vec![no, yes]), &arena, full));
    }
}
