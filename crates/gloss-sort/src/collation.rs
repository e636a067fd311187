/*
 * collation.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Locale-aware collation keys.
//!
//! [`Collator`] is the seam for a collation provider. [`RuleCollator`] is
//! the built-in implementation: a three-level (base letter, accent, case)
//! ordering over Latin script, with per-locale contractions such as the
//! Welsh `ch` or the Czech `ch` that sort as single letters.
//!
//! Primary weights are ordered by class: whitespace, punctuation, symbols,
//! digits, letters, then everything else. Control characters are ignorable.

use crate::error::{Error, Result};
use crate::locale::Locale;
use std::cmp::Ordering;
use std::str::FromStr;

/// The comparison level of a collator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Strength {
    /// Base letters only.
    Primary,
    /// Base letters and accents.
    Secondary,
    /// Base letters, accents and case.
    #[default]
    Tertiary,
    /// All of the above, then code points.
    Identical,
}

impl FromStr for Strength {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "primary" => Ok(Strength::Primary),
            "secondary" => Ok(Strength::Secondary),
            "tertiary" => Ok(Strength::Tertiary),
            "identical" => Ok(Strength::Identical),
            _ => Err(Error::invalid_setting("collation-strength", s)),
        }
    }
}

/// How precomposed and compatibility characters are decomposed before
/// weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decomposition {
    /// Combining marks are weighted as separate, primary-ignorable elements.
    None,
    /// Combining marks are folded into the accent weight of the preceding
    /// letter.
    #[default]
    Canonical,
    /// As `Canonical`, and compatibility ligatures (`ﬁ`, `ĳ`, `ǆ`, ...)
    /// are expanded to their letters.
    Full,
}

impl FromStr for Decomposition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" | "no" => Ok(Decomposition::None),
            "canonical" => Ok(Decomposition::Canonical),
            "full" => Ok(Decomposition::Full),
            _ => Err(Error::invalid_setting("collation-decomposition", s)),
        }
    }
}

/// A comparable key produced by a [`Collator`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CollationKey(Vec<u32>);

impl CollationKey {
    pub fn weights(&self) -> &[u32] {
        &self.0
    }
}

/// One collation element and the text it was produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollationElement {
    /// Zero for ignorable elements.
    pub primary: u32,
    pub secondary: u16,
    pub tertiary: u8,
    pub text: String,
}

impl CollationElement {
    pub fn is_ignorable(&self) -> bool {
        self.primary == 0
    }

    pub fn is_letter(&self) -> bool {
        self.primary >> 24 == CLASS_LETTER
    }
}

/// A collation-key provider.
pub trait Collator {
    /// Split `text` into collation elements.
    fn elements(&self, text: &str) -> Vec<CollationElement>;

    fn collation_key(&self, text: &str) -> CollationKey;

    fn compare(&self, a: &str, b: &str) -> Ordering {
        self.collation_key(a).cmp(&self.collation_key(b))
    }

    /// The first element that is not ignorable and not whitespace.
    fn leading_element(&self, text: &str) -> Option<CollationElement> {
        self.elements(text)
            .into_iter()
            .find(|e| !e.is_ignorable() && e.primary >> 24 != CLASS_SPACE)
    }
}

const CLASS_SPACE: u32 = 1;
const CLASS_PUNCTUATION: u32 = 2;
const CLASS_SYMBOL: u32 = 3;
const CLASS_DIGIT: u32 = 4;
const CLASS_LETTER: u32 = 5;
const CLASS_OTHER: u32 = 6;

/// A letter sequence collated as one letter, sorting right after `after`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contraction {
    pub text: &'static str,
    pub after: char,
}

const fn contraction(text: &'static str, after: char) -> Contraction {
    Contraction { text, after }
}

/// Contractions for the locales that need them.
pub fn locale_contractions(locale: &Locale) -> Vec<Contraction> {
    match locale.language() {
        "cy" => vec![
            contraction("ch", 'c'),
            contraction("dd", 'd'),
            contraction("ff", 'f'),
            contraction("ng", 'g'),
            contraction("ll", 'l'),
            contraction("ph", 'p'),
            contraction("rh", 'r'),
            contraction("th", 't'),
        ],
        "nl" => vec![contraction("ij", 'i')],
        "cs" | "sk" => vec![contraction("ch", 'h')],
        "es" if locale.has_variant("traditional") || locale.has_variant("trad") => {
            vec![contraction("ch", 'c'), contraction("ll", 'l')]
        }
        _ => Vec::new(),
    }
}

/// The built-in rule-based collator.
#[derive(Debug, Clone)]
pub struct RuleCollator {
    strength: Strength,
    decomposition: Decomposition,
    contractions: Vec<Contraction>,
}

impl RuleCollator {
    pub fn new(locale: &Locale) -> Self {
        Self {
            strength: Strength::default(),
            decomposition: Decomposition::default(),
            contractions: locale_contractions(locale),
        }
    }

    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_decomposition(mut self, decomposition: Decomposition) -> Self {
        self.decomposition = decomposition;
        self
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    fn match_contraction(&self, chars: &[char]) -> Option<&Contraction> {
        self.contractions.iter().find(|c| {
            let len = c.text.chars().count();
            chars.len() >= len
                && c
                    .text
                    .chars()
                    .zip(chars)
                    .all(|(expected, actual)| lower(*actual) == expected)
        })
    }

    fn push_char(&self, c: char, out: &mut Vec<CollationElement>) {
        if is_combining_mark(c) {
            let accent = 100 + (c as u32 - 0x300) as u16;
            match (self.decomposition, out.last_mut()) {
                (Decomposition::None, _) | (_, None) => out.push(CollationElement {
                    primary: 0,
                    secondary: accent,
                    tertiary: 0,
                    text: c.to_string(),
                }),
                (_, Some(previous)) => {
                    previous.secondary = previous.secondary.max(accent);
                    previous.text.push(c);
                }
            }
            return;
        }

        if let Some(expansion) = self.expansion(c) {
            let upper = c.is_uppercase();
            for letter in expansion.chars() {
                let (base, accent) = decompose(letter).unwrap_or((letter, 0));
                out.push(CollationElement {
                    primary: primary_weight(base),
                    secondary: accent,
                    tertiary: u8::from(upper),
                    text: letter.to_string(),
                });
            }
            return;
        }

        let (base, accent) = decompose(c).unwrap_or((c, 0));
        out.push(CollationElement {
            primary: primary_weight(base),
            secondary: accent,
            tertiary: u8::from(c.is_uppercase()),
            text: c.to_string(),
        });
    }

    fn expansion(&self, c: char) -> Option<&'static str> {
        let always = match c {
            'æ' => Some("ae"),
            'Æ' => Some("AE"),
            'œ' => Some("oe"),
            'Œ' => Some("OE"),
            'ß' => Some("ss"),
            _ => None,
        };
        if always.is_some() || self.decomposition != Decomposition::Full {
            return always;
        }
        match c {
            'ﬀ' => Some("ff"),
            'ﬁ' => Some("fi"),
            'ﬂ' => Some("fl"),
            'ﬃ' => Some("ffi"),
            'ﬄ' => Some("ffl"),
            'ﬅ' | 'ﬆ' => Some("st"),
            'ĳ' => Some("ij"),
            'Ĳ' => Some("IJ"),
            'ǆ' => Some("dž"),
            'ǅ' => Some("Dž"),
            'Ǆ' => Some("DŽ"),
            'ǉ' => Some("lj"),
            'ǈ' => Some("Lj"),
            'Ǉ' => Some("LJ"),
            'ǌ' => Some("nj"),
            'ǋ' => Some("Nj"),
            'Ǌ' => Some("NJ"),
            _ => None,
        }
    }
}

impl Default for RuleCollator {
    fn default() -> Self {
        Self::new(&Locale::root())
    }
}

impl Collator for RuleCollator {
    fn elements(&self, text: &str) -> Vec<CollationElement> {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::with_capacity(chars.len());
        let mut i = 0;
        while i < chars.len() {
            if let Some(contraction) = self.match_contraction(&chars[i..]) {
                let len = contraction.text.chars().count();
                out.push(CollationElement {
                    primary: letter_weight(contraction.after, 2),
                    secondary: 0,
                    tertiary: u8::from(chars[i].is_uppercase()),
                    text: chars[i..i + len].iter().collect(),
                });
                i += len;
                continue;
            }
            self.push_char(chars[i], &mut out);
            i += 1;
        }
        out
    }

    fn collation_key(&self, text: &str) -> CollationKey {
        let elements = self.elements(text);
        let mut weights: Vec<u32> = elements
            .iter()
            .filter(|e| !e.is_ignorable())
            .map(|e| e.primary)
            .collect();
        if self.strength >= Strength::Secondary {
            weights.push(0);
            weights.extend(elements.iter().map(|e| u32::from(e.secondary) + 1));
        }
        if self.strength >= Strength::Tertiary {
            weights.push(0);
            weights.extend(elements.iter().map(|e| u32::from(e.tertiary) + 1));
        }
        if self.strength == Strength::Identical {
            weights.push(0);
            weights.extend(text.chars().map(|c| c as u32 + 1));
        }
        CollationKey(weights)
    }
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn letter_weight(base: char, offset: u32) -> u32 {
    (CLASS_LETTER << 24) | ((base as u32) * 4 + offset)
}

fn primary_weight(c: char) -> u32 {
    if c.is_control() {
        0
    } else if c.is_whitespace() {
        CLASS_SPACE << 24
    } else if c.is_alphabetic() {
        letter_weight(lower(c), 0)
    } else if let Some(digit) = c.to_digit(10) {
        (CLASS_DIGIT << 24) | digit
    } else if c.is_numeric() {
        (CLASS_DIGIT << 24) | (c as u32 + 16)
    } else if is_punctuation(c) {
        (CLASS_PUNCTUATION << 24) | c as u32
    } else if is_symbol(c) {
        (CLASS_SYMBOL << 24) | c as u32
    } else {
        (CLASS_OTHER << 24) | c as u32
    }
}

pub(crate) fn is_combining_mark(c: char) -> bool {
    ('\u{300}'..='\u{36f}').contains(&c)
}

pub(crate) fn is_punctuation(c: char) -> bool {
    matches!(
        c,
        '!' | '"'
            | '#'
            | '%'
            | '&'
            | '\''
            | '('
            | ')'
            | '*'
            | ','
            | '-'
            | '.'
            | '/'
            | ':'
            | ';'
            | '?'
            | '@'
            | '['
            | '\\'
            | ']'
            | '_'
            | '{'
            | '}'
            | '¡'
            | '§'
            | '«'
            | '¶'
            | '·'
            | '»'
            | '¿'
    ) || ('\u{2010}'..='\u{2027}').contains(&c)
        || ('\u{2030}'..='\u{205e}').contains(&c)
        || ('\u{3001}'..='\u{3003}').contains(&c)
}

pub(crate) fn is_symbol(c: char) -> bool {
    matches!(
        c,
        '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~' | '¢' | '£' | '¤' | '¥' | '©' | '®'
            | '°' | '±' | '×' | '÷' | '€'
    ) || ('\u{2100}'..='\u{2bff}').contains(&c)
}

/// Accent weights and the precomposed letters carrying them, paired with
/// their base letters.
const ACCENTS: &[(u16, &str, &str)] = &[
    (1, "áéíóúýćńśźĺŕ", "aeiouycnszlr"),
    (1, "ÁÉÍÓÚÝĆŃŚŹĹŔ", "AEIOUYCNSZLR"),
    (2, "àèìòù", "aeiou"),
    (2, "ÀÈÌÒÙ", "AEIOU"),
    (3, "âêîôûĉĝĥĵŝŵŷ", "aeioucghjswy"),
    (3, "ÂÊÎÔÛĈĜĤĴŜŴŶ", "AEIOUCGHJSWY"),
    (4, "äëïöüÿ", "aeiouy"),
    (4, "ÄËÏÖÜŸ", "AEIOUY"),
    (5, "ãñõ", "ano"),
    (5, "ÃÑÕ", "ANO"),
    (6, "åů", "au"),
    (6, "ÅŮ", "AU"),
    (7, "çşţ", "cst"),
    (7, "ÇŞŢ", "CST"),
    (8, "čďěňřšťžǎǐǒǔ", "cdenrstzaiou"),
    (8, "ČĎĚŇŘŠŤŽǍǏǑǓ", "CDENRSTZAIOU"),
    (9, "āēīōū", "aeiou"),
    (9, "ĀĒĪŌŪ", "AEIOU"),
    (10, "ăğŭ", "agu"),
    (10, "ĂĞŬ", "AGU"),
    (11, "ąęįų", "aeiu"),
    (11, "ĄĘĮŲ", "AEIU"),
    (12, "żėġ", "zeg"),
    (12, "ŻĖĠİ", "ZEGI"),
    (13, "øłđħ", "oldh"),
    (13, "ØŁĐĦ", "OLDH"),
    (14, "őű", "ou"),
    (14, "ŐŰ", "OU"),
    (15, "ð", "d"),
    (15, "Ð", "D"),
];

/// Split a precomposed letter into its base letter and accent weight.
pub(crate) fn decompose(c: char) -> Option<(char, u16)> {
    if c.is_ascii() {
        return None;
    }
    ACCENTS.iter().find_map(|(accent, letters, bases)| {
        letters
            .chars()
            .zip(bases.chars())
            .find(|(letter, _)| *letter == c)
            .map(|(_, base)| (base, *accent))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(collator: &RuleCollator, words: &[&str]) -> Vec<String> {
        let mut words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        words.sort_by(|a, b| collator.compare(a, b));
        words
    }

    #[test]
    fn test_accents_sort_with_base_letter() {
        let collator = RuleCollator::default();
        assert_eq!(
            sorted(&collator, &["zebra", "éclair", "eagle", "Eel"]),
            vec!["eagle", "éclair", "Eel", "zebra"]
        );
    }

    #[test]
    fn test_strength_levels() {
        let primary = RuleCollator::default().with_strength(Strength::Primary);
        assert_eq!(primary.compare("resume", "Résumé"), Ordering::Equal);

        let secondary = RuleCollator::default().with_strength(Strength::Secondary);
        assert_eq!(secondary.compare("resume", "Resume"), Ordering::Equal);
        assert_eq!(secondary.compare("resume", "résumé"), Ordering::Less);

        let tertiary = RuleCollator::default();
        assert_eq!(tertiary.compare("resume", "Resume"), Ordering::Less);
    }

    #[test]
    fn test_prefix_and_word_marker_order() {
        let collator = RuleCollator::default();
        assert_eq!(collator.compare("sea|lion|", "seal|"), Ordering::Less);
        assert_eq!(collator.compare("a", "ab"), Ordering::Less);
        assert_eq!(collator.compare("9 lives", "apple"), Ordering::Less);
    }

    #[test]
    fn test_welsh_contractions() {
        let collator = RuleCollator::new(&Locale::parse("cy").unwrap());
        assert_eq!(
            sorted(&collator, &["ddraig", "dyn", "cwm", "chwarae", "llyn", "lori"]),
            vec!["cwm", "chwarae", "dyn", "ddraig", "lori", "llyn"]
        );
        let lead = collator.leading_element("Llandudno").unwrap();
        assert_eq!(lead.text, "Ll");
    }

    #[test]
    fn test_czech_ch_after_h() {
        let collator = RuleCollator::new(&Locale::parse("cs").unwrap());
        assert_eq!(
            sorted(&collator, &["chata", "hrad", "ivan"]),
            vec!["hrad", "chata", "ivan"]
        );
    }

    #[test]
    fn test_decomposition() {
        let canonical = RuleCollator::default().with_strength(Strength::Primary);
        assert_eq!(canonical.compare("e\u{301}te", "ete"), Ordering::Equal);

        let full = RuleCollator::default()
            .with_strength(Strength::Primary)
            .with_decomposition(Decomposition::Full);
        assert_eq!(full.compare("\u{fb01}sh", "fish"), Ordering::Equal);
        assert_ne!(canonical.compare("\u{fb01}sh", "fish"), Ordering::Equal);
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!("primary".parse::<Strength>().unwrap(), Strength::Primary);
        assert_eq!(
            "full".parse::<Decomposition>().unwrap(),
            Decomposition::Full
        );
        assert!("loud".parse::<Strength>().is_err());
    }
}
