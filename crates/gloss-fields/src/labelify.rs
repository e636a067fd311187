/*
 * labelify.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Conversion of interpreted text into label-safe strings.

use regex::Regex;

/// Characters kept by [`LabelifyRules::labelify`] besides ASCII alphanumerics.
const LABEL_PUNCTUATION: &[char] = &['-', '_', '.', ':', '/', '+', '@', '*', '!'];

/// Substitutions applied before a string is stripped down to a label.
#[derive(Debug, Clone, Default)]
pub struct LabelifyRules {
    replacements: Vec<(Regex, String)>,
}

impl LabelifyRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regex substitution, applied in insertion order.
    pub fn with_replacement(mut self, pattern: Regex, replacement: impl Into<String>) -> Self {
        self.replacements.push((pattern, replacement.into()));
        self
    }

    /// Convert an already interpreted string into a label.
    pub fn labelify(&self, text: &str) -> String {
        let mut text = text.to_string();
        for (pattern, replacement) in &self.replacements {
            text = pattern.replace_all(&text, replacement.as_str()).into_owned();
        }

        let mut label = String::with_capacity(text.len());
        for c in text.chars() {
            if c.is_ascii_alphanumeric() || LABEL_PUNCTUATION.contains(&c) {
                label.push(c);
            } else if let Some(ascii) = transliterate(c) {
                label.push_str(ascii);
            }
        }
        label
    }

    /// Labelify each element of a comma-separated list.
    pub fn labelify_list(&self, text: &str) -> String {
        text.split(',')
            .map(|item| self.labelify(item.trim()))
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// ASCII replacement for common non-ASCII Latin letters.
fn transliterate(c: char) -> Option<&'static str> {
    const GROUPS: &[(&str, &str)] = &[
        ("àáâãäåāą", "a"),
        ("ÀÁÂÃÄÅĀĄ", "A"),
        ("çćč", "c"),
        ("ÇĆČ", "C"),
        ("ďđð", "d"),
        ("ĎĐÐ", "D"),
        ("èéêëēęě", "e"),
        ("ÈÉÊËĒĘĚ", "E"),
        ("ìíîïīı", "i"),
        ("ÌÍÎÏĪİ", "I"),
        ("łľ", "l"),
        ("ŁĽ", "L"),
        ("ñńň", "n"),
        ("ÑŃŇ", "N"),
        ("òóôõöøō", "o"),
        ("ÒÓÔÕÖØŌ", "O"),
        ("ř", "r"),
        ("Ř", "R"),
        ("śšş", "s"),
        ("ŚŠŞ", "S"),
        ("ť", "t"),
        ("Ť", "T"),
        ("ùúûüůū", "u"),
        ("ÙÚÛÜŮŪ", "U"),
        ("ýÿ", "y"),
        ("ÝŸ", "Y"),
        ("źżž", "z"),
        ("ŹŻŽ", "Z"),
    ];
    match c {
        'æ' => return Some("ae"),
        'Æ' => return Some("AE"),
        'œ' => return Some("oe"),
        'Œ' => return Some("OE"),
        'ß' => return Some("ss"),
        'þ' => return Some("th"),
        'Þ' => return Some("TH"),
        _ => {}
    }
    GROUPS
        .iter()
        .find(|(from, _)| from.contains(c))
        .map(|(_, to)| *to)
}
