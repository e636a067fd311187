/*
 * case.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Case changes applied to markup values.
//!
//! Case is changed in text tokens only; control sequence names are left
//! alone, except for the ligature and special-letter commands that have an
//! upper/lower case counterpart (`\ae`/`\AE`, `\o`/`\O`, ...).

use gloss_entry::{Markup, Token};

/// The case change performed by a case quark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseChange {
    /// `\UC`
    Upper,
    /// `\LC`
    Lower,
    /// `\FIRSTUC`: upper-case the first letter.
    Sentence,
    /// `\FIRSTLC`: lower-case the first letter.
    NonSentence,
    /// `\TITLE`: upper-case the first letter of each word.
    Title,
    /// `\NOCHANGE`
    None,
}

impl CaseChange {
    pub fn quark_name(self) -> &'static str {
        match self {
            CaseChange::Upper => "UC",
            CaseChange::Lower => "LC",
            CaseChange::Sentence => "FIRSTUC",
            CaseChange::NonSentence => "FIRSTLC",
            CaseChange::Title => "TITLE",
            CaseChange::None => "NOCHANGE",
        }
    }

    pub fn apply(self, value: &Markup) -> Markup {
        let mut tokens = value.tokens().to_vec();
        match self {
            CaseChange::Upper => map_text(&mut tokens, &|s| s.to_uppercase(), true),
            CaseChange::Lower => map_text(&mut tokens, &|s| s.to_lowercase(), false),
            CaseChange::Sentence => {
                change_first_letter(&mut tokens, true);
            }
            CaseChange::NonSentence => {
                change_first_letter(&mut tokens, false);
            }
            CaseChange::Title => title_case(&mut tokens),
            CaseChange::None => {}
        }
        Markup::new(tokens)
    }
}

/// Letter commands with a case counterpart, as (lower, upper).
const LETTER_COMMANDS: &[(&str, &str)] = &[
    ("ae", "AE"),
    ("oe", "OE"),
    ("o", "O"),
    ("aa", "AA"),
    ("l", "L"),
    ("dh", "DH"),
    ("th", "TH"),
];

fn letter_command_case(name: &str, upper: bool) -> Option<&'static str> {
    LETTER_COMMANDS.iter().find_map(|(lower_name, upper_name)| {
        if name == *lower_name || name == *upper_name {
            Some(if upper { *upper_name } else { *lower_name })
        } else {
            None
        }
    })
}

fn map_text(tokens: &mut [Token], f: &dyn Fn(&str) -> String, upper: bool) {
    for token in tokens.iter_mut() {
        match token {
            Token::Text(text) => *text = f(text),
            Token::Group(inner) => map_text(inner, f, upper),
            Token::ControlSequence(name) => {
                if let Some(changed) = letter_command_case(name, upper) {
                    *name = changed.to_string();
                }
            }
            Token::Space(_) => {}
        }
    }
}

fn change_char_case(c: char, upper: bool) -> String {
    if upper {
        c.to_uppercase().collect()
    } else {
        c.to_lowercase().collect()
    }
}

/// Change the case of the first letter. Returns true once a letter (or
/// letter command) was found, so callers stop descending.
fn change_first_letter(tokens: &mut [Token], upper: bool) -> bool {
    for token in tokens.iter_mut() {
        match token {
            Token::Space(_) => continue,
            Token::Text(text) => {
                let mut chars = text.chars();
                if let Some(first) = chars.next() {
                    let rest: String = chars.collect();
                    *text = change_char_case(first, upper) + &rest;
                    return true;
                }
            }
            Token::Group(inner) => {
                if change_first_letter(inner, upper) {
                    return true;
                }
            }
            Token::ControlSequence(name) => {
                if let Some(changed) = letter_command_case(name, upper) {
                    *name = changed.to_string();
                    return true;
                }
            }
        }
    }
    false
}

fn title_case(tokens: &mut [Token]) {
    let mut at_word_start = true;
    title_case_inner(tokens, &mut at_word_start);
}

fn title_case_inner(tokens: &mut [Token], at_word_start: &mut bool) {
    for token in tokens.iter_mut() {
        match token {
            Token::Space(_) => *at_word_start = true,
            Token::Text(text) => {
                let mut out = String::with_capacity(text.len());
                for c in text.chars() {
                    if *at_word_start && c.is_alphabetic() {
                        out.push_str(&change_char_case(c, true));
                        *at_word_start = false;
                    } else {
                        if c == '-' {
                            *at_word_start = true;
                        } else if c.is_alphanumeric() {
                            *at_word_start = false;
                        }
                        out.push(c);
                    }
                }
                *text = out;
            }
            Token::Group(inner) => title_case_inner(inner, at_word_start),
            Token::ControlSequence(name) => {
                if *at_word_start {
                    if let Some(changed) = letter_command_case(name, true) {
                        *name = changed.to_string();
                        *at_word_start = false;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(change: CaseChange, src: &str) -> String {
        change.apply(&Markup::parse(src)).to_source()
    }

    #[test]
    fn test_upper_and_lower() {
        assert_eq!(apply(CaseChange::Upper, r"\emph{straße} \ae"), r"\emph{STRASSE} \AE");
        assert_eq!(apply(CaseChange::Lower, "Big CAT"), "big cat");
    }

    #[test]
    fn test_sentence_case_descends_into_groups() {
        assert_eq!(apply(CaseChange::Sentence, "apple"), "Apple");
        assert_eq!(apply(CaseChange::Sentence, r"\emph{apple} pie"), r"\emph{Apple} pie");
        assert_eq!(apply(CaseChange::Sentence, r"\ae ther"), r"\AE ther");
        assert_eq!(apply(CaseChange::NonSentence, "Apple Pie"), "apple Pie");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(apply(CaseChange::Title, "the big-eared cat"), "The Big-Eared Cat");
        assert_eq!(apply(CaseChange::None, "the cat"), "the cat");
    }
}
