/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Field value expressions.
//!
//! A [`FieldValueElement`] computes a value for a base entry: a literal, the
//! value of a (possibly chained) field reference, a quark applied to another
//! element, or a concatenation. Every element can produce a structured
//! ([`Markup`]) value or a plain string; `None` means "no value" and
//! propagates through quarks and concatenations.

use crate::case::CaseChange;
use crate::context::{EvalContext, GroupRef};
use crate::error::{Error, Result};
use crate::reference::FieldReference;
use gloss_entry::{EntryId, Markup, Token};
use std::fmt;

/// What a field reference reads once its chain has been followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    /// A named field (or `original`/`actual` for type and label references).
    Name(String),
    /// A further reference, resolved relative to this one's target.
    Next(Box<Field>),
}

/// A field reference such as `name`, `parent -> name` or
/// `parent -> root -> text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    reference: FieldReference,
    target: FieldTarget,
}

impl Field {
    /// A field of the base entry.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            reference: FieldReference::SelfRef,
            target: FieldTarget::Name(name.into()),
        }
    }

    /// A field of the entry selected by `reference`.
    pub fn new(reference: FieldReference, name: impl Into<String>) -> Self {
        Self {
            reference,
            target: FieldTarget::Name(name.into()),
        }
    }

    /// Follow `reference`, then evaluate `next` relative to its target.
    pub fn chained(reference: FieldReference, next: Field) -> Result<Self> {
        if reference.is_terminal() {
            return Err(Error::TerminalReference {
                reference: reference.keyword().to_string(),
            });
        }
        Ok(Self {
            reference,
            target: FieldTarget::Next(Box::new(next)),
        })
    }

    pub fn reference(&self) -> FieldReference {
        self.reference
    }

    pub fn target(&self) -> &FieldTarget {
        &self.target
    }

    /// The terminal field name at the end of the chain.
    pub fn terminal_name(&self) -> &str {
        match &self.target {
            FieldTarget::Name(name) => name,
            FieldTarget::Next(next) => next.terminal_name(),
        }
    }

    /// Resolve the chain to the entry whose field is read.
    pub fn resolve_entry(&self, ctx: &EvalContext<'_>, base: EntryId) -> Option<EntryId> {
        let target = self.reference.resolve(ctx.arena(), base)?;
        match &self.target {
            FieldTarget::Name(_) => Some(target),
            FieldTarget::Next(next) => next.resolve_entry(ctx, target),
        }
    }

    pub fn value(&self, ctx: &EvalContext<'_>, base: EntryId) -> Option<Markup> {
        let target = self.reference.resolve(ctx.arena(), base)?;
        let name = match &self.target {
            FieldTarget::Next(next) => return next.value(ctx, target),
            FieldTarget::Name(name) => name,
        };
        let entry = ctx.arena().get(target);
        match self.reference {
            FieldReference::EntryType => match name.as_str() {
                "original" => Some(Markup::text(entry.original_entry_type())),
                _ => Some(Markup::text(entry.entry_type())),
            },
            FieldReference::EntryLabel => match name.as_str() {
                "original" => Some(Markup::text(entry.original_label())),
                _ => Some(Markup::text(entry.label())),
            },
            _ => ctx.env().access.get_field_or_fallback(entry, name),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reference, &self.target) {
            (FieldReference::SelfRef, FieldTarget::Name(name)) => f.write_str(name),
            (reference, FieldTarget::Name(name)) => write!(f, "{} -> {}", reference, name),
            (reference, FieldTarget::Next(next)) => write!(f, "{} -> {}", reference, next),
        }
    }
}

/// A value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValueElement {
    /// Literal markup (`"..."` or `{...}`).
    Literal(Markup),
    /// A field reference.
    Field(Field),
    /// `\UC`, `\LC`, `\FIRSTUC`, `\FIRSTLC`, `\TITLE`, `\NOCHANGE`
    Case(CaseChange, Box<FieldValueElement>),
    /// `\INTERPRET`: expand the value into plain text.
    Interpret(Box<FieldValueElement>),
    /// `\LABELIFY`: interpret and convert into a label.
    Labelify(Box<FieldValueElement>),
    /// `\LABELIFYLIST`: labelify each comma-separated element.
    LabelifyList(Box<FieldValueElement>),
    /// `\TRIM`: strip leading and trailing whitespace.
    Trim(Box<FieldValueElement>),
    /// `\CS`: a control sequence named by the value.
    ControlSequence(Box<FieldValueElement>),
    /// `\LEN`: the number of characters of the interpreted value.
    Length(Box<FieldValueElement>),
    /// `\MGP`: a group of the last successful pattern match.
    MatchGroup(GroupRef),
    /// `a + b + ...`
    Concat(Vec<FieldValueElement>),
}

impl FieldValueElement {
    pub fn literal(text: &str) -> Self {
        FieldValueElement::Literal(Markup::parse(text))
    }

    pub fn field(name: impl Into<String>) -> Self {
        FieldValueElement::Field(Field::named(name))
    }

    /// Evaluate to a structured value.
    pub fn value(&self, ctx: &EvalContext<'_>, entry: EntryId) -> Option<Markup> {
        match self {
            FieldValueElement::Literal(markup) => Some(markup.clone()),
            FieldValueElement::Field(field) => field.value(ctx, entry),
            FieldValueElement::Case(change, inner) => {
                inner.value(ctx, entry).map(|v| change.apply(&v))
            }
            FieldValueElement::Interpret(inner) => {
                let value = inner.value(ctx, entry)?;
                Some(Markup::text(ctx.env().text.expand_and_flatten(&value)))
            }
            FieldValueElement::Labelify(inner) => {
                let value = inner.value(ctx, entry)?;
                let text = ctx.env().text.expand_and_flatten(&value);
                Some(Markup::text(ctx.env().labelify.labelify(&text)))
            }
            FieldValueElement::LabelifyList(inner) => {
                let value = inner.value(ctx, entry)?;
                let text = ctx.env().text.expand_and_flatten(&value);
                Some(Markup::text(ctx.env().labelify.labelify_list(&text)))
            }
            FieldValueElement::Trim(inner) => inner.value(ctx, entry).map(|v| trim(&v)),
            FieldValueElement::ControlSequence(inner) => {
                let name = inner.plain(ctx, entry)?;
                let name = name.trim();
                if name.is_empty() {
                    tracing::warn!(
                        entry = %ctx.arena().get(entry).label(),
                        "\\CS applied to an empty value"
                    );
                    return None;
                }
                Some(Markup::control_sequence(name))
            }
            FieldValueElement::Length(inner) => {
                let length = inner.length(ctx, entry)?;
                Some(Markup::text(length.to_string()))
            }
            FieldValueElement::MatchGroup(group) => ctx.match_group(group).map(Markup::text),
            FieldValueElement::Concat(elements) => {
                let mut result = Markup::default();
                for element in elements {
                    result.append(element.value(ctx, entry)?);
                }
                Some(result)
            }
        }
    }

    /// Evaluate to a plain string.
    pub fn plain(&self, ctx: &EvalContext<'_>, entry: EntryId) -> Option<String> {
        match self {
            FieldValueElement::Length(inner) => inner.length(ctx, entry).map(|n| n.to_string()),
            FieldValueElement::MatchGroup(group) => ctx.match_group(group).map(str::to_string),
            FieldValueElement::Concat(elements) => {
                let mut result = String::new();
                for element in elements {
                    result.push_str(&element.plain(ctx, entry)?);
                }
                Some(result)
            }
            _ => self.value(ctx, entry).map(|v| v.to_plain()),
        }
    }

    /// Character count of the interpreted value.
    pub fn length(&self, ctx: &EvalContext<'_>, entry: EntryId) -> Option<usize> {
        let value = self.value(ctx, entry)?;
        Some(ctx.env().text.expand_and_flatten(&value).chars().count())
    }
}

impl fmt::Display for FieldValueElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValueElement::Literal(markup) => write!(f, "{{{}}}", markup),
            FieldValueElement::Field(field) => write!(f, "{}", field),
            FieldValueElement::Case(change, inner) => {
                write!(f, "\\{}{{{}}}", change.quark_name(), inner)
            }
            FieldValueElement::Interpret(inner) => write!(f, "\\INTERPRET{{{}}}", inner),
            FieldValueElement::Labelify(inner) => write!(f, "\\LABELIFY{{{}}}", inner),
            FieldValueElement::LabelifyList(inner) => write!(f, "\\LABELIFYLIST{{{}}}", inner),
            FieldValueElement::Trim(inner) => write!(f, "\\TRIM{{{}}}", inner),
            FieldValueElement::ControlSequence(inner) => write!(f, "\\CS{{{}}}", inner),
            FieldValueElement::Length(inner) => write!(f, "\\LEN{{{}}}", inner),
            FieldValueElement::MatchGroup(group) => write!(f, "\\MGP{{{}}}", group),
            FieldValueElement::Concat(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{}", element)?;
                }
                Ok(())
            }
        }
    }
}

/// Strip leading and trailing whitespace tokens.
fn trim(value: &Markup) -> Markup {
    let mut tokens = value.tokens().to_vec();
    while tokens.first().is_some_and(Token::is_space) {
        tokens.remove(0);
    }
    while tokens.last().is_some_and(Token::is_space) {
        tokens.pop();
    }
    if let Some(Token::Text(text)) = tokens.first_mut() {
        *text = text.trim_start().to_string();
    }
    if let Some(Token::Text(text)) = tokens.last_mut() {
        *text = text.trim_end().to_string();
    }
    tokens.retain(|t| !matches!(t, Token::Text(text) if text.is_empty()));
    Markup::new(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FieldEnv;
    use gloss_entry::{Entry, EntryArena};

    fn arena() -> (EntryArena, EntryId, EntryId) {
        let mut arena = EntryArena::new();
        let parent = arena
            .insert(Entry::new("fruit", "index").with_field("name", "fruit"))
            .unwrap();
        let child = arena
            .insert(
                Entry::new("apple", "entry")
                    .with_parent("fruit")
                    .with_field("name", "apple")
                    .with_field("description", "  a \\emph{red} fruit  "),
            )
            .unwrap();
        (arena, parent, child)
    }

    #[test]
    fn test_field_chain() {
        let (arena, _, child) = arena();
        let env = FieldEnv::default();
        let ctx = EvalContext::new(&arena, &env);
        let field = Field::new(FieldReference::Parent, "name");
        assert_eq!(field.value(&ctx, child).unwrap().to_plain(), "fruit");
        let label = Field::chained(
            FieldReference::Parent,
            Field::new(FieldReference::EntryLabel, "actual"),
        )
        .unwrap();
        assert_eq!(label.value(&ctx, child).unwrap().to_plain(), "fruit");
        assert_eq!(label.to_string(), "parent -> entrylabel -> actual");
    }

    #[test]
    fn test_terminal_reference_cannot_chain() {
        let err = Field::chained(FieldReference::EntryType, Field::named("name")).unwrap_err();
        assert_eq!(
            err,
            Error::TerminalReference {
                reference: "entrytype".into()
            }
        );
    }

    #[test]
    fn test_missing_parent_is_null() {
        let (arena, parent, _) = arena();
        let env = FieldEnv::default();
        let ctx = EvalContext::new(&arena, &env);
        let field = FieldValueElement::Field(Field::new(FieldReference::Parent, "name"));
        assert_eq!(field.value(&ctx, parent), None);
    }

    #[test]
    fn test_concat_propagates_null() {
        let (arena, _, child) = arena();
        let env = FieldEnv::default();
        let ctx = EvalContext::new(&arena, &env);
        let present = FieldValueElement::Concat(vec![
            FieldValueElement::field("name"),
            FieldValueElement::literal(" pie"),
        ]);
        assert_eq!(present.plain(&ctx, child).unwrap(), "apple pie");
        let missing = FieldValueElement::Concat(vec![
            FieldValueElement::field("name"),
            FieldValueElement::field("symbol"),
        ]);
        assert_eq!(missing.value(&ctx, child), None);
        assert_eq!(missing.plain(&ctx, child), None);
    }

    #[test]
    fn test_trim_and_length() {
        let (arena, _, child) = arena();
        let env = FieldEnv::default();
        let ctx = EvalContext::new(&arena, &env);
        let trimmed = FieldValueElement::Trim(Box::new(FieldValueElement::field("description")));
        assert_eq!(trimmed.value(&ctx, child).unwrap().to_source(), r"a \emph{red} fruit");
        let length = FieldValueElement::Length(Box::new(trimmed));
        // "a red fruit"
        assert_eq!(length.plain(&ctx, child).unwrap(), "11");
    }

    #[test]
    fn test_control_sequence_quark() {
        let (arena, _, child) = arena();
        let env = FieldEnv::default();
        let ctx = EvalContext::new(&arena, &env);
        let cs = FieldValueElement::ControlSequence(Box::new(FieldValueElement::field("name")));
        assert_eq!(cs.value(&ctx, child).unwrap().to_source(), r"\apple");
        let empty = FieldValueElement::ControlSequence(Box::new(FieldValueElement::literal("")));
        assert_eq!(empty.value(&ctx, child), None);
    }

    #[test]
    fn test_match_group_before_match_is_null() {
        let (arena, _, child) = arena();
        let env = FieldEnv::default();
        let ctx = EvalContext::new(&arena, &env);
        let mgp = FieldValueElement::MatchGroup(GroupRef::Index(1));
        assert_eq!(mgp.value(&ctx, child), None);
    }

    #[test]
    fn test_entry_type_reference() {
        let (mut arena, _, child) = arena();
        arena.get_mut(child).set_entry_type("abbreviation");
        let env = FieldEnv::default();
        let ctx = EvalContext::new(&arena, &env);
        let actual = Field::new(FieldReference::EntryType, "actual");
        let original = Field::new(FieldReference::EntryType, "original");
        assert_eq!(actual.value(&ctx, child).unwrap().to_plain(), "abbreviation");
        assert_eq!(original.value(&ctx, child).unwrap().to_plain(), "entry");
    }
}
