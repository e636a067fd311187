/*
 * text.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Interpretation of markup into plain text.
//!
//! Full macro expansion is the job of an external interpreter. The
//! [`TextService`] trait is the seam the sorting core calls through;
//! [`PlainTextService`] handles the common escapes, accents and ligature
//! commands found in glossary fields and drops everything else.

use crate::markup::{Markup, Token};
use std::collections::HashMap;

/// Expand a markup value into a flat string.
pub trait TextService {
    fn expand_and_flatten(&self, value: &Markup) -> String;
}

/// Default interpreter for common text-mode commands.
#[derive(Debug, Clone)]
pub struct PlainTextService {
    symbols: HashMap<String, String>,
}

impl Default for PlainTextService {
    fn default() -> Self {
        let mut symbols = HashMap::new();
        for (name, text) in [
            ("&", "&"),
            ("%", "%"),
            ("$", "$"),
            ("#", "#"),
            ("_", "_"),
            ("{", "{"),
            ("}", "}"),
            (" ", " "),
            ("ae", "æ"),
            ("AE", "Æ"),
            ("oe", "œ"),
            ("OE", "Œ"),
            ("o", "ø"),
            ("O", "Ø"),
            ("aa", "å"),
            ("AA", "Å"),
            ("ss", "ß"),
            ("l", "ł"),
            ("L", "Ł"),
            ("i", "ı"),
            ("j", "ȷ"),
            ("dh", "ð"),
            ("DH", "Ð"),
            ("th", "þ"),
            ("TH", "Þ"),
            ("textbackslash", "\\"),
            ("textasciitilde", "~"),
            ("textasciicircum", "^"),
            ("ldots", "…"),
            ("dots", "…"),
            ("textendash", "–"),
            ("textemdash", "—"),
            ("S", "§"),
            ("P", "¶"),
            ("TeX", "TeX"),
            ("LaTeX", "LaTeX"),
        ] {
            symbols.insert(name.to_string(), text.to_string());
        }
        Self { symbols }
    }
}

impl PlainTextService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the expansion of a parameterless command.
    pub fn with_symbol(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.symbols.insert(name.into(), text.into());
        self
    }

    fn flatten(&self, tokens: &[Token], out: &mut String) {
        let mut i = 0;
        while i < tokens.len() {
            match &tokens[i] {
                Token::Text(text) => out.push_str(&text.replace('~', " ")),
                Token::Space(_) => {
                    if !out.ends_with(' ') {
                        out.push(' ');
                    }
                }
                Token::Group(inner) => self.flatten(inner, out),
                Token::ControlSequence(name) => {
                    if let Some(accent) = accent_mark(name) {
                        // The accent applies to the next token's first character.
                        if let Some(next) = tokens.get(i + 1) {
                            let mut arg = String::new();
                            self.flatten(std::slice::from_ref(next), &mut arg);
                            let mut chars = arg.chars();
                            if let Some(base) = chars.next() {
                                out.push(compose(base, accent));
                                out.extend(chars);
                            }
                            i += 2;
                            continue;
                        }
                    } else if let Some(text) = self.symbols.get(name) {
                        out.push_str(text);
                    }
                }
            }
            i += 1;
        }
    }
}

impl TextService for PlainTextService {
    fn expand_and_flatten(&self, value: &Markup) -> String {
        let mut out = String::new();
        self.flatten(value.tokens(), &mut out);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accent {
    Acute,
    Grave,
    Circumflex,
    Diaeresis,
    Tilde,
    Macron,
    Cedilla,
    Caron,
    Ring,
}

fn accent_mark(name: &str) -> Option<Accent> {
    Some(match name {
        "'" => Accent::Acute,
        "`" => Accent::Grave,
        "^" => Accent::Circumflex,
        "\"" => Accent::Diaeresis,
        "~" => Accent::Tilde,
        "=" => Accent::Macron,
        "c" => Accent::Cedilla,
        "v" => Accent::Caron,
        "r" => Accent::Ring,
        _ => return None,
    })
}

/// Precompose a Latin letter with an accent; unknown pairs keep the base.
fn compose(base: char, accent: Accent) -> char {
    const TABLE: &[(Accent, &str, &str)] = &[
        (Accent::Acute, "aeiouyAEIOUYcnszCNSZ", "áéíóúýÁÉÍÓÚÝćńśźĆŃŚŹ"),
        (Accent::Grave, "aeiouAEIOU", "àèìòùÀÈÌÒÙ"),
        (Accent::Circumflex, "aeiouAEIOU", "âêîôûÂÊÎÔÛ"),
        (Accent::Diaeresis, "aeiouyAEIOUY", "äëïöüÿÄËÏÖÜŸ"),
        (Accent::Tilde, "anoANO", "ãñõÃÑÕ"),
        (Accent::Macron, "aeiouAEIOU", "āēīōūĀĒĪŌŪ"),
        (Accent::Cedilla, "csCS", "çşÇŞ"),
        (Accent::Caron, "cszrnCSZRN", "čšžřňČŠŽŘŇ"),
        (Accent::Ring, "auAU", "åůÅŮ"),
    ];
    TABLE
        .iter()
        .filter(|(a, _, _)| *a == accent)
        .find_map(|(_, from, to)| {
            from.chars()
                .position(|c| c == base)
                .and_then(|idx| to.chars().nth(idx))
        })
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(src: &str) -> String {
        PlainTextService::new().expand_and_flatten(&Markup::parse(src))
    }

    #[test]
    fn test_groups_and_unknown_commands_are_dropped() {
        assert_eq!(flatten(r"\emph{big} cat"), "big cat");
    }

    #[test]
    fn test_accents() {
        assert_eq!(flatten(r"caf\'e"), "café");
        assert_eq!(flatten(r#"\"{o}ber"#), "öber");
        assert_eq!(flatten(r"\c{c}a"), "ça");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(flatten(r"\ae ther \& co"), "æther & co");
        assert_eq!(flatten("a~b"), "a b");
    }

    #[test]
    fn test_custom_symbol() {
        let service = PlainTextService::new().with_symbol("alpha", "α");
        assert_eq!(service.expand_and_flatten(&Markup::parse(r"\alpha")), "α");
    }
}
