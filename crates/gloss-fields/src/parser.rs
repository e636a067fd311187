/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parser for field expressions, conditionals and assignments.
//!
//! The input is a tokenized markup stream ([`Markup`]): quarks such as
//! `\UC{name}` arrive as a control sequence followed by a group, quoted
//! literals as text tokens containing `"`. Parsing builds the expression
//! trees directly.
//!
//! ```text
//! assignments := assignment ("," assignment)*
//! assignment  := ident ("=" | "=+" | "=-") expression ["[" condition "]"]
//! expression  := term ("+" term)*
//! term        := field | quark "{" expression "}" | "\MGP{" n|name "}"
//!              | '"' text '"' | "{" text "}"
//! field       := (ref "->")* ident
//! condition   := and ("|" and)*
//! and         := unary ("&" unary)*
//! unary       := "!" unary | "(" condition ")" | comparison
//! comparison  := expression (relation | containment) operand
//! operand     := "\NULL" | number | "/" regex "/" | expression
//! ```

use crate::assign::{FieldAssignment, FieldEvaluation};
use crate::case::CaseChange;
use crate::conditional::{Conditional, LengthOperand, Pattern, Relation};
use crate::context::GroupRef;
use crate::error::{Error, Result, SyntaxError};
use crate::reference::FieldReference;
use crate::value::{Field, FieldTarget, FieldValueElement};
use gloss_entry::{Markup, Token};
use std::ops::Range;

/// Parse a value expression such as `\FIRSTUC{name} + " " + parent -> name`.
pub fn parse_expression(text: &str) -> Result<FieldValueElement> {
    parse_expression_markup(&Markup::parse(text))
}

/// Parse a value expression from pre-tokenized markup.
pub fn parse_expression_markup(markup: &Markup) -> Result<FieldValueElement> {
    let stream = TokenStream::new(markup);
    let mut parser = Parser::new(&stream);
    let expression = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(expression)
}

/// Parse a conditional such as `\LEN{description} > 10 & name <> \NULL`.
pub fn parse_condition(text: &str) -> Result<Conditional> {
    parse_condition_markup(&Markup::parse(text))
}

/// Parse a conditional from pre-tokenized markup.
pub fn parse_condition_markup(markup: &Markup) -> Result<Conditional> {
    let stream = TokenStream::new(markup);
    let mut parser = Parser::new(&stream);
    let condition = parser.parse_condition()?;
    parser.expect_end()?;
    Ok(condition)
}

/// Parse a single assignment such as `display =+ \FIRSTUC{name} [name <> \NULL]`.
pub fn parse_assignment(text: &str) -> Result<FieldAssignment> {
    let stream = TokenStream::new(&Markup::parse(text));
    let mut parser = Parser::new(&stream);
    let assignment = parser.parse_assignment()?;
    parser.expect_end()?;
    Ok(assignment)
}

/// Parse a comma-separated list of assignments.
pub fn parse_assignments(text: &str) -> Result<Vec<FieldAssignment>> {
    let stream = TokenStream::new(&Markup::parse(text));
    let mut parser = Parser::new(&stream);
    let mut assignments = Vec::new();
    loop {
        if parser.at_end() {
            break;
        }
        assignments.push(parser.parse_assignment()?);
        if parser.eat_char(',') {
            continue;
        }
        parser.expect_end()?;
        break;
    }
    Ok(assignments)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AtomKind {
    Char(char),
    Space,
    Cs(String),
    Open,
    Close,
}

#[derive(Debug, Clone)]
struct Atom {
    kind: AtomKind,
    span: Range<usize>,
}

/// Markup flattened into atoms with byte spans in a re-rendered source.
struct TokenStream {
    atoms: Vec<Atom>,
    matching: Vec<Option<usize>>,
    source: String,
}

impl TokenStream {
    fn new(markup: &Markup) -> Self {
        let mut stream = Self {
            atoms: Vec::new(),
            matching: Vec::new(),
            source: String::new(),
        };
        stream.push_tokens(markup.tokens());
        stream
    }

    fn push_atom(&mut self, kind: AtomKind, text: &str) {
        let start = self.source.len();
        self.source.push_str(text);
        self.atoms.push(Atom {
            kind,
            span: start..self.source.len(),
        });
        self.matching.push(None);
    }

    fn push_tokens(&mut self, tokens: &[Token]) {
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Text(text) => {
                    for c in text.chars() {
                        let mut buf = [0u8; 4];
                        self.push_atom(AtomKind::Char(c), c.encode_utf8(&mut buf));
                    }
                }
                Token::Space(space) => self.push_atom(AtomKind::Space, space),
                Token::ControlSequence(name) => {
                    self.push_atom(AtomKind::Cs(name.clone()), &format!("\\{}", name));
                    let is_word = name.chars().all(|c| c.is_ascii_alphabetic());
                    if is_word {
                        if let Some(Token::Text(next)) = tokens.get(i + 1) {
                            if next.starts_with(|c: char| c.is_ascii_alphabetic()) {
                                self.source.push(' ');
                            }
                        }
                    }
                }
                Token::Group(inner) => {
                    let open = self.atoms.len();
                    self.push_atom(AtomKind::Open, "{");
                    self.push_tokens(inner);
                    let close = self.atoms.len();
                    self.push_atom(AtomKind::Close, "}");
                    self.matching[open] = Some(close);
                }
            }
        }
    }

    /// Rebuild markup tokens from the atoms in `range`.
    fn to_markup(&self, range: Range<usize>) -> Markup {
        let mut markup = Markup::default();
        let mut i = range.start;
        while i < range.end {
            match &self.atoms[i].kind {
                AtomKind::Char(c) => markup.push(Token::Text(c.to_string())),
                AtomKind::Space => markup.push(Token::Space(" ".to_string())),
                AtomKind::Cs(name) => markup.push(Token::ControlSequence(name.clone())),
                AtomKind::Open => {
                    let close = self.matching[i].unwrap_or(range.end);
                    let inner = self.to_markup(i + 1..close);
                    markup.push(Token::Group(inner.into_tokens()));
                    i = close;
                }
                AtomKind::Close => {}
            }
            i += 1;
        }
        markup
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '@'
}

struct Parser<'s> {
    stream: &'s TokenStream,
    pos: usize,
    end: usize,
}

impl<'s> Parser<'s> {
    fn new(stream: &'s TokenStream) -> Self {
        Self {
            stream,
            pos: 0,
            end: stream.atoms.len(),
        }
    }

    fn sub(&self, range: Range<usize>) -> Parser<'s> {
        Parser {
            stream: self.stream,
            pos: range.start,
            end: range.end,
        }
    }

    // ---------------------------------------------------------------------
    // Cursor helpers
    // ---------------------------------------------------------------------

    fn peek(&self) -> Option<&'s AtomKind> {
        if self.pos < self.end {
            Some(&self.stream.atoms[self.pos].kind)
        } else {
            None
        }
    }

    fn peek_at(&self, offset: usize) -> Option<&'s AtomKind> {
        let index = self.pos + offset;
        if index < self.end {
            Some(&self.stream.atoms[index].kind)
        } else {
            None
        }
    }

    fn peek_char(&self) -> Option<char> {
        match self.peek() {
            Some(AtomKind::Char(c)) => Some(*c),
            _ => None,
        }
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        match self.peek_at(offset) {
            Some(AtomKind::Char(c)) => Some(*c),
            _ => None,
        }
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(AtomKind::Space)) {
            self.pos += 1;
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_spaces();
        self.pos >= self.end
    }

    fn eat_char(&mut self, c: char) -> bool {
        self.skip_spaces();
        if self.peek_char() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, c: char, what: &str) -> Result<()> {
        if self.eat_char(c) {
            Ok(())
        } else {
            Err(self.error(format!("Expected {}", what)))
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("Unexpected trailing content"))
        }
    }

    fn span_here(&self) -> Range<usize> {
        if self.pos < self.end {
            self.stream.atoms[self.pos].span.clone()
        } else {
            let offset = self
                .stream
                .atoms
                .get(self.end)
                .map_or(self.stream.source.len(), |a| a.span.start);
            offset..offset
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        self.error_at(message, self.span_here())
    }

    fn error_at(&self, message: impl Into<String>, span: Range<usize>) -> Error {
        Error::Syntax(SyntaxError::new(message, span, &self.stream.source))
    }

    fn span_between(&self, start: usize, end: usize) -> Range<usize> {
        let atoms = &self.stream.atoms;
        let from = atoms.get(start).map_or(self.stream.source.len(), |a| a.span.start);
        let to = if end > start {
            atoms[end - 1].span.end
        } else {
            from
        };
        from..to
    }

    /// Parse the content of the group starting at the cursor with `f`.
    fn parse_group<T>(
        &mut self,
        owner: &str,
        f: impl FnOnce(&mut Parser<'s>) -> Result<T>,
    ) -> Result<T> {
        self.skip_spaces();
        if self.peek() != Some(&AtomKind::Open) {
            return Err(self.error(format!("Expected '{{' after {}", owner)));
        }
        let open = self.pos;
        let close = self.stream.matching[open]
            .ok_or_else(|| self.error(format!("Unclosed group after {}", owner)))?;
        let mut inner = self.sub(open + 1..close);
        let result = f(&mut inner)?;
        inner.expect_end()?;
        self.pos = close + 1;
        Ok(result)
    }

    fn read_ident(&mut self) -> Option<(String, Range<usize>)> {
        self.skip_spaces();
        let start = self.pos;
        let mut ident = String::new();
        while let Some(c) = self.peek_char() {
            if !is_ident_char(c) {
                break;
            }
            ident.push(c);
            self.pos += 1;
        }
        if ident.is_empty() {
            None
        } else {
            Some((ident, self.span_between(start, self.pos)))
        }
    }

    fn eat_arrow(&mut self) -> bool {
        let saved = self.pos;
        self.skip_spaces();
        if self.peek_char() == Some('-') && self.peek_char_at(1) == Some('>') {
            self.pos += 2;
            true
        } else {
            self.pos = saved;
            false
        }
    }

    // ---------------------------------------------------------------------
    // Value expressions
    // ---------------------------------------------------------------------

    fn parse_expression(&mut self) -> Result<FieldValueElement> {
        let mut elements = vec![self.parse_term()?];
        while self.eat_char('+') {
            elements.push(self.parse_term()?);
        }
        if elements.len() == 1 {
            Ok(elements.remove(0))
        } else {
            Ok(FieldValueElement::Concat(elements))
        }
    }

    fn parse_term(&mut self) -> Result<FieldValueElement> {
        self.skip_spaces();
        match self.peek() {
            Some(AtomKind::Cs(name)) => self.parse_quark(name),
            Some(AtomKind::Char('"')) => self.parse_quoted(),
            Some(AtomKind::Open) => {
                let open = self.pos;
                let close = self.stream.matching[open]
                    .ok_or_else(|| self.error("Unclosed literal group"))?;
                self.pos = close + 1;
                Ok(FieldValueElement::Literal(
                    self.stream.to_markup(open + 1..close),
                ))
            }
            Some(AtomKind::Char(c)) if is_ident_char(*c) => {
                Ok(FieldValueElement::Field(self.parse_field()?))
            }
            Some(_) => Err(self.error("Expected a field, quark or literal")),
            None => Err(self.error("Expected a value")),
        }
    }

    fn parse_quark(&mut self, name: &str) -> Result<FieldValueElement> {
        let span = self.span_here();
        if name == "MGP" {
            self.pos += 1;
            return self.parse_group("\\MGP", |p| p.parse_group_ref());
        }
        let wrap: fn(Box<FieldValueElement>) -> FieldValueElement = match name {
            "UC" => |e| FieldValueElement::Case(CaseChange::Upper, e),
            "LC" => |e| FieldValueElement::Case(CaseChange::Lower, e),
            "FIRSTUC" => |e| FieldValueElement::Case(CaseChange::Sentence, e),
            "FIRSTLC" => |e| FieldValueElement::Case(CaseChange::NonSentence, e),
            "TITLE" => |e| FieldValueElement::Case(CaseChange::Title, e),
            "NOCHANGE" => |e| FieldValueElement::Case(CaseChange::None, e),
            "INTERPRET" => FieldValueElement::Interpret,
            "LABELIFY" => FieldValueElement::Labelify,
            "LABELIFYLIST" => FieldValueElement::LabelifyList,
            "TRIM" => FieldValueElement::Trim,
            "CS" => FieldValueElement::ControlSequence,
            "LEN" => FieldValueElement::Length,
            _ => return Err(self.error_at(format!("Unknown quark '\\{}'", name), span)),
        };
        self.pos += 1;
        let owner = format!("\\{}", name);
        let inner = self.parse_group(&owner, |p| p.parse_expression())?;
        Ok(wrap(Box::new(inner)))
    }

    fn parse_group_ref(&mut self) -> Result<FieldValueElement> {
        let span = self.span_here();
        let Some((ident, _)) = self.read_ident() else {
            return Err(self.error_at("Expected a group number or name", span));
        };
        let group = match ident.parse::<usize>() {
            Ok(index) => GroupRef::Index(index),
            Err(_) => GroupRef::Name(ident),
        };
        Ok(FieldValueElement::MatchGroup(group))
    }

    /// A double-quoted literal. Groups are kept whole, so a `"` inside
    /// braces does not end the literal; `\"` is an escaped quote.
    fn parse_quoted(&mut self) -> Result<FieldValueElement> {
        let open_span = self.span_here();
        self.pos += 1;
        let mut markup = Markup::default();
        loop {
            let Some(kind) = self.peek() else {
                return Err(self.error_at("Unterminated string literal", open_span));
            };
            match kind {
                AtomKind::Char('"') => {
                    self.pos += 1;
                    break;
                }
                AtomKind::Char(c) => markup.push(Token::Text(c.to_string())),
                AtomKind::Space => markup.push(Token::Space(" ".to_string())),
                AtomKind::Cs(name) if name == "\"" => markup.push(Token::Text("\"".to_string())),
                AtomKind::Cs(name) => markup.push(Token::ControlSequence(name.clone())),
                AtomKind::Open => {
                    let open = self.pos;
                    let close = self.stream.matching[open].unwrap_or(self.end);
                    let inner = self.stream.to_markup(open + 1..close);
                    markup.push(Token::Group(inner.into_tokens()));
                    self.pos = close;
                }
                AtomKind::Close => {
                    return Err(self.error("Unexpected '}' in string literal"));
                }
            }
            self.pos += 1;
        }
        Ok(FieldValueElement::Literal(markup))
    }

    /// `(ref ->)* name`. An identifier without a following `->` is always a
    /// field name, so a trailing `parent` reads the field called `parent`
    /// rather than following another parent link.
    fn parse_field(&mut self) -> Result<Field> {
        let Some((ident, span)) = self.read_ident() else {
            return Err(self.error("Expected a field name"));
        };
        if !self.eat_arrow() {
            return Ok(Field::named(ident));
        }
        let Some(reference) = FieldReference::from_keyword(&ident) else {
            return Err(self.error_at(format!("Unknown reference '{}'", ident), span));
        };

        if reference.is_terminal() {
            let here = self.span_here();
            let Some((which, which_span)) = self.read_ident() else {
                return Err(self.error_at("Expected 'original' or 'actual'", here));
            };
            if which != "original" && which != "actual" {
                return Err(self.error_at(
                    format!("Expected 'original' or 'actual' after '{}'", reference),
                    which_span,
                ));
            }
            if self.eat_arrow() {
                return Err(self.error_at(
                    format!("'{}' cannot be followed by another reference", reference),
                    which_span,
                ));
            }
            return Ok(Field::new(reference, which));
        }

        let next = self.parse_field()?;
        match (next.reference(), next.target()) {
            (FieldReference::SelfRef, FieldTarget::Name(name)) => {
                Ok(Field::new(reference, name.clone()))
            }
            _ => Field::chained(reference, next),
        }
    }

    // ---------------------------------------------------------------------
    // Conditionals
    // ---------------------------------------------------------------------

    fn parse_condition(&mut self) -> Result<Conditional> {
        let mut terms = vec![self.parse_and()?];
        while self.eat_char('|') {
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Conditional::Or(terms)
        })
    }

    fn parse_and(&mut self) -> Result<Conditional> {
        let mut terms = vec![self.parse_unary()?];
        while self.eat_char('&') {
            terms.push(self.parse_unary()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Conditional::And(terms)
        })
    }

    fn parse_unary(&mut self) -> Result<Conditional> {
        self.skip_spaces();
        match self.peek_char() {
            Some('!') => {
                self.pos += 1;
                Ok(Conditional::Not(Box::new(self.parse_unary()?)))
            }
            Some('(') => {
                self.pos += 1;
                let condition = self.parse_condition()?;
                self.expect_char(')', "')'")?;
                Ok(condition)
            }
            _ => self.parse_comparison(),
        }
    }

    fn parse_relation(&mut self) -> Option<Relation> {
        self.skip_spaces();
        let (relation, width) = match (self.peek_char()?, self.peek_char_at(1)) {
            ('<', Some('>')) => (Relation::Ne, 2),
            ('<', Some('=')) => (Relation::Le, 2),
            ('>', Some('=')) => (Relation::Ge, 2),
            ('!', Some('=')) => (Relation::Ne, 2),
            ('<', _) => (Relation::Lt, 1),
            ('>', _) => (Relation::Gt, 1),
            ('=', _) => (Relation::Eq, 1),
            _ => return None,
        };
        self.pos += width;
        Some(relation)
    }

    fn parse_comparison(&mut self) -> Result<Conditional> {
        let lhs = self.parse_expression()?;
        self.skip_spaces();

        if let Some(AtomKind::Cs(name)) = self.peek() {
            let containment = match name.as_str() {
                "IN" => Some((Relation::Eq, 0)),
                "NIN" => Some((Relation::Ne, 0)),
                "PREFIXOF" => Some((Relation::Eq, 1)),
                "NOTPREFIXOF" => Some((Relation::Ne, 1)),
                "SUFFIXOF" => Some((Relation::Eq, 2)),
                "NOTSUFFIXOF" => Some((Relation::Ne, 2)),
                _ => None,
            };
            if let Some((relation, kind)) = containment {
                self.pos += 1;
                let rhs = self.parse_expression()?;
                return Ok(match kind {
                    0 => Conditional::Contains { lhs, relation, rhs },
                    1 => Conditional::PrefixOf { lhs, relation, rhs },
                    _ => Conditional::SuffixOf { lhs, relation, rhs },
                });
            }
        }

        let op_span = self.span_here();
        let Some(relation) = self.parse_relation() else {
            return Err(self.error("Expected a comparison operator"));
        };
        let equality_only = |parser: &Self, what: &str| -> Result<()> {
            if matches!(relation, Relation::Eq | Relation::Ne) {
                Ok(())
            } else {
                Err(parser.error_at(
                    format!("Only '=' and '<>' can be used with {}", what),
                    op_span.clone(),
                ))
            }
        };

        self.skip_spaces();
        match self.peek() {
            Some(AtomKind::Cs(name)) if name == "NULL" => {
                equality_only(self, "\\NULL")?;
                self.pos += 1;
                return Ok(Conditional::Null {
                    value: lhs,
                    is_null: relation == Relation::Eq,
                });
            }
            Some(AtomKind::Char('/')) => {
                equality_only(self, "a regular expression")?;
                let pattern = self.parse_regex()?;
                return Ok(Conditional::Regex {
                    value: lhs,
                    relation,
                    pattern,
                });
            }
            _ => {}
        }

        if let Some((number, span)) = self.try_number() {
            return match lhs {
                FieldValueElement::Length(inner) => {
                    if number < 0.0 || number.fract() != 0.0 {
                        return Err(self.error_at("Length must be a non-negative integer", span));
                    }
                    Ok(Conditional::LengthCompare {
                        lhs: *inner,
                        relation,
                        rhs: LengthOperand::Number(number as usize),
                    })
                }
                lhs => Ok(Conditional::NumericCompare {
                    lhs,
                    relation,
                    rhs: number,
                }),
            };
        }

        let rhs = self.parse_expression()?;
        Ok(match (lhs, rhs) {
            (FieldValueElement::Length(a), FieldValueElement::Length(b)) => {
                Conditional::LengthCompare {
                    lhs: *a,
                    relation,
                    rhs: LengthOperand::Length(*b),
                }
            }
            (lhs, rhs) => Conditional::StringCompare { lhs, relation, rhs },
        })
    }

    /// A numeric literal not followed by identifier characters.
    fn try_number(&mut self) -> Option<(f64, Range<usize>)> {
        self.skip_spaces();
        let start = self.pos;
        let mut text = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek_char() {
            text.push(sign);
            self.pos += 1;
        }
        let mut digits = 0;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                digits += 1;
            } else if c != '.' {
                break;
            }
            text.push(c);
            self.pos += 1;
        }
        let followed_by_ident = self.peek_char().is_some_and(is_ident_char);
        match text.parse::<f64>() {
            Ok(number) if digits > 0 && !followed_by_ident => {
                Some((number, self.span_between(start, self.pos)))
            }
            _ => {
                self.pos = start;
                None
            }
        }
    }

    fn parse_regex(&mut self) -> Result<Pattern> {
        let open_span = self.span_here();
        self.pos += 1;
        let mut source = String::new();
        loop {
            let Some(kind) = self.peek() else {
                return Err(self.error_at("Unterminated regular expression", open_span));
            };
            match kind {
                AtomKind::Char('/') => {
                    self.pos += 1;
                    break;
                }
                AtomKind::Char(c) => source.push(*c),
                AtomKind::Space => source.push(' '),
                AtomKind::Cs(name) if name == "/" => source.push('/'),
                AtomKind::Cs(name) => {
                    source.push('\\');
                    source.push_str(name);
                }
                AtomKind::Open => source.push('{'),
                AtomKind::Close => source.push('}'),
            }
            self.pos += 1;
        }
        Pattern::new(&source).map_err(|e| Error::InvalidRegex {
            pattern: source.clone(),
            message: e.to_string(),
        })
    }

    // ---------------------------------------------------------------------
    // Assignments
    // ---------------------------------------------------------------------

    fn parse_assignment(&mut self) -> Result<FieldAssignment> {
        let Some((destination, _)) = self.read_ident() else {
            return Err(self.error("Expected a destination field name"));
        };
        self.expect_char('=', "'=' after destination field")?;
        let override_policy = match self.peek_char() {
            Some('+') => {
                self.pos += 1;
                Some(true)
            }
            Some('-') => {
                self.pos += 1;
                Some(false)
            }
            _ => None,
        };
        let value = self.parse_expression()?;
        let condition = if self.eat_char('[') {
            let condition = self.parse_condition()?;
            self.expect_char(']', "']' to close the condition")?;
            Some(condition)
        } else {
            None
        };
        Ok(FieldAssignment {
            destination,
            evaluation: FieldEvaluation { value, condition },
            override_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(name: &str) -> FieldValueElement {
        FieldValueElement::field(name)
    }

    #[test]
    fn test_bare_field() {
        assert_eq!(parse_expression("name").unwrap(), field("name"));
    }

    #[test]
    fn test_reference_chain() {
        let expr = parse_expression("parent -> root -> description").unwrap();
        let expected = Field::chained(
            FieldReference::Parent,
            Field::new(FieldReference::Root, "description"),
        )
        .unwrap();
        assert_eq!(expr, FieldValueElement::Field(expected));
    }

    #[test]
    fn test_trailing_parent_is_a_field_name() {
        assert_eq!(parse_expression("parent").unwrap(), field("parent"));
        assert_eq!(
            parse_expression("self -> parent").unwrap(),
            field("parent")
        );
        assert_eq!(
            parse_expression("parent -> parent").unwrap(),
            FieldValueElement::Field(Field::new(FieldReference::Parent, "parent"))
        );
    }

    #[test]
    fn test_entry_type_must_be_terminal() {
        let err = parse_expression("entrytype -> original -> name").unwrap_err();
        let Error::Syntax(err) = err else {
            panic!("expected syntax error, got {:?}", err);
        };
        assert!(err.message.contains("cannot be followed"), "{}", err.message);
        assert_eq!(err.fragment, "original");
    }

    #[test]
    fn test_quarks_and_concat() {
        let expr = parse_expression(r#"\FIRSTUC{name} + " (" + \LC{parent -> name} + ")""#).unwrap();
        let FieldValueElement::Concat(parts) = &expr else {
            panic!("expected concat, got {:?}", expr);
        };
        assert_eq!(parts.len(), 4);
        assert_eq!(
            parts[0],
            FieldValueElement::Case(CaseChange::Sentence, Box::new(field("name")))
        );
        assert_eq!(parts[1], FieldValueElement::literal(" ("));
    }

    #[test]
    fn test_quoted_literal_splices_groups_and_escapes() {
        let expr = parse_expression(r#""say {"hi"} \" now""#).unwrap();
        let FieldValueElement::Literal(markup) = expr else {
            panic!("expected literal");
        };
        assert_eq!(markup.to_source(), r#"say {"hi"} " now"#);
    }

    #[test]
    fn test_braced_literal() {
        let expr = parse_expression(r"{\emph{x} y}").unwrap();
        assert_eq!(expr, FieldValueElement::literal(r"\emph{x} y"));
    }

    #[test]
    fn test_match_group_quark() {
        assert_eq!(
            parse_expression(r"\MGP{2}").unwrap(),
            FieldValueElement::MatchGroup(GroupRef::Index(2))
        );
        assert_eq!(
            parse_expression(r"\MGP{word}").unwrap(),
            FieldValueElement::MatchGroup(GroupRef::Name("word".into()))
        );
    }

    #[test]
    fn test_unknown_quark_reports_position() {
        let err = parse_expression(r#"name + \SHOUT{name}"#).unwrap_err();
        let Error::Syntax(err) = err else {
            panic!("expected syntax error");
        };
        assert_eq!(err.fragment, r"\SHOUT");
        assert_eq!(err.preceding, "name +");
    }

    #[test]
    fn test_unterminated_literal() {
        let err = parse_expression(r#""abc"#).unwrap_err();
        assert!(err.to_string().contains("Unterminated string literal"));
    }

    #[test]
    fn test_length_condition() {
        let condition = parse_condition(r"\LEN{description} > 10").unwrap();
        assert_eq!(
            condition,
            Conditional::LengthCompare {
                lhs: field("description"),
                relation: Relation::Gt,
                rhs: LengthOperand::Number(10),
            }
        );
    }

    #[test]
    fn test_condition_precedence() {
        let condition =
            parse_condition(r#"name = "a" | !(name <> \NULL) & count >= 2"#).unwrap();
        let Conditional::Or(terms) = condition else {
            panic!("expected or");
        };
        assert!(matches!(terms[0], Conditional::StringCompare { .. }));
        let Conditional::And(inner) = &terms[1] else {
            panic!("expected and");
        };
        assert!(matches!(inner[0], Conditional::Not(_)));
        assert!(matches!(
            inner[1],
            Conditional::NumericCompare {
                relation: Relation::Ge,
                ..
            }
        ));
    }

    #[test]
    fn test_regex_condition() {
        let condition = parse_condition(r"name = /(\w+)-\d{2}/").unwrap();
        let Conditional::Regex { pattern, .. } = condition else {
            panic!("expected regex");
        };
        assert_eq!(pattern.as_str(), r"(\w+)-\d{2}");
    }

    #[test]
    fn test_regex_requires_equality() {
        let err = parse_condition("name < /a/").unwrap_err();
        assert!(err.to_string().contains("Only '=' and '<>'"));
    }

    #[test]
    fn test_containment_operators() {
        let condition = parse_condition(r#""app" \PREFIXOF name"#).unwrap();
        assert!(matches!(
            condition,
            Conditional::PrefixOf {
                relation: Relation::Eq,
                ..
            }
        ));
        let condition = parse_condition(r#"name \NIN description"#).unwrap();
        assert!(matches!(
            condition,
            Conditional::Contains {
                relation: Relation::Ne,
                ..
            }
        ));
    }

    #[test]
    fn test_assignment_list() {
        let assignments = parse_assignments(
            r#"display = \FIRSTUC{name}, short =+ \UC{name} [\LEN{name} < 4], note =- "x""#,
        )
        .unwrap();
        assert_eq!(assignments.len(), 3);
        assert_eq!(assignments[0].destination, "display");
        assert_eq!(assignments[0].override_policy, None);
        assert_eq!(assignments[1].override_policy, Some(true));
        assert!(assignments[1].evaluation.condition.is_some());
        assert_eq!(assignments[2].override_policy, Some(false));
    }

    #[test]
    fn test_assignment_missing_bracket() {
        let err = parse_assignment(r"a = name [name = \NULL").unwrap_err();
        assert!(err.to_string().contains("']' to close the condition"));
    }
}
