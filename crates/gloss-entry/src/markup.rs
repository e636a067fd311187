/*
 * markup.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Field values as small TeX-like markup fragments.
//!
//! Field values are opaque to the sorting core except for two views:
//! the token structure (used by quarks that need to preserve control
//! sequences, such as case changes and trimming) and the literal string
//! extraction returned by [`Markup::to_plain`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single markup token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of ordinary characters.
    Text(String),
    /// A run of whitespace.
    Space(String),
    /// A control sequence, stored without the leading backslash.
    ///
    /// Control words (`\foo`) have alphabetic names; control symbols
    /// (`\&`, `\"`) have a single non-letter name.
    ControlSequence(String),
    /// A braced group `{...}`.
    Group(Vec<Token>),
}

impl Token {
    pub fn is_space(&self) -> bool {
        matches!(self, Token::Space(_))
    }

    fn is_control_word(&self) -> bool {
        match self {
            Token::ControlSequence(name) => name.chars().all(|c| c.is_ascii_alphabetic()),
            _ => false,
        }
    }
}

/// A parsed field value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Markup {
    tokens: Vec<Token>,
}

impl Markup {
    /// Create markup from already tokenized content.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Create markup consisting of a single text token.
    ///
    /// Unlike [`Markup::parse`], special characters are not interpreted.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self {
            tokens: vec![Token::Text(text)],
        }
    }

    /// Create markup for a control sequence reference `\name`.
    pub fn control_sequence(name: impl Into<String>) -> Self {
        Self {
            tokens: vec![Token::ControlSequence(name.into())],
        }
    }

    /// Tokenize a markup source string.
    ///
    /// Unbalanced braces are tolerated: an unclosed group is closed at the
    /// end of input and a stray `}` is kept as text.
    pub fn parse(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut pos = 0;
        let tokens = parse_tokens(&chars, &mut pos, false);
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Append the tokens of another fragment.
    pub fn append(&mut self, other: Markup) {
        for token in other.tokens {
            self.push(token);
        }
    }

    /// Push a token, merging adjacent text runs.
    pub fn push(&mut self, token: Token) {
        if let Token::Text(next) = &token {
            if let Some(Token::Text(last)) = self.tokens.last_mut() {
                last.push_str(next);
                return;
            }
        }
        self.tokens.push(token);
    }

    /// Literal string extraction.
    ///
    /// Group braces are dropped, whitespace runs collapse to a single space
    /// and control sequences are kept in their source form.
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        write_plain(&self.tokens, &mut out);
        out
    }

    /// Reconstruct the markup source.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        write_source(&self.tokens, &mut out);
        out
    }
}

impl From<String> for Markup {
    fn from(source: String) -> Self {
        Markup::parse(&source)
    }
}

impl From<&str> for Markup {
    fn from(source: &str) -> Self {
        Markup::parse(source)
    }
}

impl From<Markup> for String {
    fn from(markup: Markup) -> Self {
        markup.to_source()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

fn parse_tokens(chars: &[char], pos: &mut usize, in_group: bool) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut space = String::new();

    macro_rules! flush {
        () => {
            if !text.is_empty() {
                tokens.push(Token::Text(std::mem::take(&mut text)));
            }
            if !space.is_empty() {
                tokens.push(Token::Space(std::mem::take(&mut space)));
            }
        };
    }

    while *pos < chars.len() {
        let c = chars[*pos];
        match c {
            '\\' => {
                flush!();
                *pos += 1;
                if *pos >= chars.len() {
                    tokens.push(Token::Text("\\".to_string()));
                    break;
                }
                let first = chars[*pos];
                if first.is_ascii_alphabetic() {
                    let start = *pos;
                    while *pos < chars.len() && chars[*pos].is_ascii_alphabetic() {
                        *pos += 1;
                    }
                    tokens.push(Token::ControlSequence(chars[start..*pos].iter().collect()));
                    // Spaces after a control word are not significant.
                    while *pos < chars.len() && chars[*pos].is_whitespace() {
                        *pos += 1;
                    }
                } else {
                    tokens.push(Token::ControlSequence(first.to_string()));
                    *pos += 1;
                }
            }
            '{' => {
                flush!();
                *pos += 1;
                let inner = parse_tokens(chars, pos, true);
                tokens.push(Token::Group(inner));
            }
            '}' if in_group => {
                flush!();
                *pos += 1;
                return tokens;
            }
            c if c.is_whitespace() => {
                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                space.push(c);
                *pos += 1;
            }
            c => {
                if !space.is_empty() {
                    tokens.push(Token::Space(std::mem::take(&mut space)));
                }
                text.push(c);
                *pos += 1;
            }
        }
    }
    flush!();
    tokens
}

fn write_plain(tokens: &[Token], out: &mut String) {
    for token in tokens {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Space(_) => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            Token::ControlSequence(name) => {
                out.push('\\');
                out.push_str(name);
            }
            Token::Group(inner) => write_plain(inner, out),
        }
    }
}

fn write_source(tokens: &[Token], out: &mut String) {
    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Space(space) => out.push_str(space),
            Token::ControlSequence(name) => {
                out.push('\\');
                out.push_str(name);
                if token.is_control_word() {
                    if let Some(Token::Text(next)) = iter.peek() {
                        if next.starts_with(|c: char| c.is_ascii_alphabetic()) {
                            out.push(' ');
                        }
                    }
                }
            }
            Token::Group(inner) => {
                out.push('{');
                write_source(inner, out);
                out.push('}');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_text_and_spaces() {
        let markup = Markup::parse("hello  world");
        assert_eq!(
            markup.tokens(),
            &[
                Token::Text("hello".into()),
                Token::Space("  ".into()),
                Token::Text("world".into()),
            ]
        );
        assert_eq!(markup.to_plain(), "hello world");
    }

    #[test]
    fn test_parse_control_word_skips_trailing_space() {
        let markup = Markup::parse(r"\ae rial");
        assert_eq!(
            markup.tokens(),
            &[
                Token::ControlSequence("ae".into()),
                Token::Text("rial".into()),
            ]
        );
        assert_eq!(markup.to_source(), r"\ae rial");
    }

    #[test]
    fn test_parse_groups() {
        let markup = Markup::parse(r"\emph{big} {cat}");
        assert_eq!(markup.to_plain(), r"\emphbig cat");
        assert_eq!(markup.to_source(), r"\emph{big} {cat}");
    }

    #[test]
    fn test_unbalanced_braces_are_tolerated() {
        assert_eq!(Markup::parse("{abc").to_source(), "{abc}");
        assert_eq!(Markup::parse("abc}").to_plain(), "abc}");
    }

    #[test]
    fn test_control_symbol() {
        let markup = Markup::parse(r"A\&B");
        assert_eq!(markup.tokens()[1], Token::ControlSequence("&".into()));
    }

    #[test]
    fn test_push_merges_text() {
        let mut markup = Markup::text("ab");
        markup.push(Token::Text("cd".into()));
        assert_eq!(markup.tokens().len(), 1);
        assert_eq!(markup.to_plain(), "abcd");
    }

    #[test]
    fn test_serde_uses_source_form() {
        let markup: Markup = serde_json::from_str(r#""\\textbf{x} y""#).unwrap();
        assert_eq!(markup.to_plain(), r"\textbfx y");
        assert_eq!(serde_json::to_string(&markup).unwrap(), r#""\\textbf{x} y""#);
    }
}
