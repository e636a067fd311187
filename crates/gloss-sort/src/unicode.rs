/*
 * unicode.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Coarse Unicode general categories and scripts for group formation.

use crate::collation::{is_combining_mark, is_punctuation, is_symbol};

/// Two-letter general category of `c`.
///
/// Letters, numbers, separators and controls are classified exactly as far
/// as the standard library allows; punctuation and symbols collapse to
/// `Po` and `So`.
pub fn general_category(c: char) -> &'static str {
    if c.is_control() {
        "Cc"
    } else if is_combining_mark(c) {
        "Mn"
    } else if matches!(c, 'ǅ' | 'ǈ' | 'ǋ' | 'ǲ') {
        "Lt"
    } else if c.is_uppercase() {
        "Lu"
    } else if c.is_lowercase() {
        "Ll"
    } else if c.is_alphabetic() {
        "Lo"
    } else if c.is_ascii_digit() || c.to_digit(10).is_some() {
        "Nd"
    } else if c.is_numeric() {
        "No"
    } else if c == '\u{2028}' {
        "Zl"
    } else if c == '\u{2029}' {
        "Zp"
    } else if c.is_whitespace() {
        "Zs"
    } else if is_punctuation(c) {
        "Po"
    } else if is_symbol(c) {
        "So"
    } else {
        "Cn"
    }
}

const SCRIPTS: &[(u32, u32, &str)] = &[
    (0x0041, 0x005A, "Latin"),
    (0x0061, 0x007A, "Latin"),
    (0x00AA, 0x00AA, "Latin"),
    (0x00BA, 0x00BA, "Latin"),
    (0x00C0, 0x024F, "Latin"),
    (0x0250, 0x02AF, "Latin"),
    (0x1E00, 0x1EFF, "Latin"),
    (0xFB00, 0xFB06, "Latin"),
    (0x0370, 0x03FF, "Greek"),
    (0x1F00, 0x1FFF, "Greek"),
    (0x0400, 0x052F, "Cyrillic"),
    (0x0530, 0x058F, "Armenian"),
    (0x0590, 0x05FF, "Hebrew"),
    (0x0600, 0x06FF, "Arabic"),
    (0x0900, 0x097F, "Devanagari"),
    (0x0E00, 0x0E7F, "Thai"),
    (0x10A0, 0x10FF, "Georgian"),
    (0x1100, 0x11FF, "Hangul"),
    (0xAC00, 0xD7AF, "Hangul"),
    (0x3040, 0x309F, "Hiragana"),
    (0x30A0, 0x30FF, "Katakana"),
    (0x3400, 0x4DBF, "Han"),
    (0x4E00, 0x9FFF, "Han"),
];

/// Script of `c`; characters shared between scripts are `Common`.
pub fn script(c: char) -> &'static str {
    if is_combining_mark(c) {
        return "Inherited";
    }
    let cp = c as u32;
    SCRIPTS
        .iter()
        .find(|(start, end, _)| (*start..=*end).contains(&cp))
        .map(|(_, _, name)| *name)
        .unwrap_or(if c.is_alphabetic() { "Unknown" } else { "Common" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(general_category('A'), "Lu");
        assert_eq!(general_category('é'), "Ll");
        assert_eq!(general_category('ǅ'), "Lt");
        assert_eq!(general_category('中'), "Lo");
        assert_eq!(general_category('7'), "Nd");
        assert_eq!(general_category('½'), "No");
        assert_eq!(general_category(' '), "Zs");
        assert_eq!(general_category(','), "Po");
        assert_eq!(general_category('+'), "So");
        assert_eq!(general_category('\u{7}'), "Cc");
    }

    #[test]
    fn test_scripts() {
        assert_eq!(script('z'), "Latin");
        assert_eq!(script('λ'), "Greek");
        assert_eq!(script('Ж'), "Cyrillic");
        assert_eq!(script('中'), "Han");
        assert_eq!(script('1'), "Common");
    }
}
