/*
 * locale.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Locale tags and the built-in locale data used by numeric and date sorts.

use crate::error::{Error, Result};
use std::fmt;

/// A parsed language tag such as `en-GB` or `es-ES-traditional`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    tag: String,
    language: String,
    region: Option<String>,
    variants: Vec<String>,
}

impl Locale {
    /// The locale-neutral root locale.
    pub fn root() -> Self {
        Self {
            tag: "und".to_string(),
            language: "und".to_string(),
            region: None,
            variants: Vec::new(),
        }
    }

    /// Parse a language tag. Both `-` and `_` are accepted as separators.
    pub fn parse(tag: &str) -> Result<Self> {
        let invalid = || Error::InvalidLocale {
            tag: tag.to_string(),
        };
        let mut parts = tag.split(['-', '_']);
        let language = parts.next().unwrap_or_default();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(invalid());
        }

        let mut region = None;
        let mut variants = Vec::new();
        for (i, part) in parts.enumerate() {
            // Variants such as `traditional` may be longer than eight characters.
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid());
            }
            let is_region = i == 0
                && ((part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
                    || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit())));
            if is_region {
                region = Some(part.to_ascii_uppercase());
            } else {
                variants.push(part.to_ascii_lowercase());
            }
        }

        let language = language.to_ascii_lowercase();
        let mut normalized = language.clone();
        if let Some(region) = &region {
            normalized.push('-');
            normalized.push_str(region);
        }
        for variant in &variants {
            normalized.push('-');
            normalized.push_str(variant);
        }
        Ok(Self {
            tag: normalized,
            language,
            region,
            variants,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }

    pub fn data(&self) -> &'static LocaleData {
        match (self.language.as_str(), self.region.as_deref()) {
            ("en", Some("GB" | "IE" | "AU" | "NZ")) => &EN_GB,
            ("de", _) => &DE,
            ("fr", _) => &FR,
            _ => &EN,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Named date and time styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    Short,
    Medium,
    Long,
    Full,
}

impl DateStyle {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "short" => Some(DateStyle::Short),
            "medium" | "default" => Some(DateStyle::Medium),
            "long" => Some(DateStyle::Long),
            "full" => Some(DateStyle::Full),
            _ => None,
        }
    }
}

/// Number and date conventions of one locale.
///
/// Date and time patterns use `chrono` format syntax. Month and weekday
/// names are listed so that localized input can be mapped onto the English
/// names `chrono` parses.
#[derive(Debug)]
pub struct LocaleData {
    pub decimal_separator: char,
    pub grouping_separators: &'static [char],
    pub currency_symbols: &'static [&'static str],
    pub date_patterns: [&'static str; 4],
    pub time_patterns: [&'static str; 4],
    pub month_names: [&'static str; 12],
    pub weekday_names: [&'static str; 7],
}

impl LocaleData {
    pub fn date_pattern(&self, style: DateStyle) -> &'static str {
        self.date_patterns[style as usize]
    }

    pub fn time_pattern(&self, style: DateStyle) -> &'static str {
        self.time_patterns[style as usize]
    }
}

pub const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const ENGLISH_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

static EN: LocaleData = LocaleData {
    decimal_separator: '.',
    grouping_separators: &[','],
    currency_symbols: &["US$", "$", "USD"],
    date_patterns: ["%m/%d/%y", "%b %d, %Y", "%B %d, %Y", "%A, %B %d, %Y"],
    time_patterns: ["%I:%M %p", "%I:%M:%S %p", "%I:%M:%S %p", "%I:%M:%S %p"],
    month_names: ENGLISH_MONTHS,
    weekday_names: ENGLISH_WEEKDAYS,
};

static EN_GB: LocaleData = LocaleData {
    decimal_separator: '.',
    grouping_separators: &[','],
    currency_symbols: &["£", "GBP"],
    date_patterns: ["%d/%m/%Y", "%d %b %Y", "%d %B %Y", "%A, %d %B %Y"],
    time_patterns: ["%H:%M", "%H:%M:%S", "%H:%M:%S", "%H:%M:%S"],
    month_names: ENGLISH_MONTHS,
    weekday_names: ENGLISH_WEEKDAYS,
};

static DE: LocaleData = LocaleData {
    decimal_separator: ',',
    grouping_separators: &['.', '\u{a0}'],
    currency_symbols: &["€", "EUR"],
    date_patterns: ["%d.%m.%y", "%d.%m.%Y", "%d. %B %Y", "%A, %d. %B %Y"],
    time_patterns: ["%H:%M", "%H:%M:%S", "%H:%M:%S", "%H:%M:%S"],
    month_names: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
    weekday_names: [
        "Montag",
        "Dienstag",
        "Mittwoch",
        "Donnerstag",
        "Freitag",
        "Samstag",
        "Sonntag",
    ],
};

static FR: LocaleData = LocaleData {
    decimal_separator: ',',
    grouping_separators: &[' ', '\u{a0}', '\u{202f}'],
    currency_symbols: &["€", "EUR"],
    date_patterns: ["%d/%m/%Y", "%d %b %Y", "%d %B %Y", "%A %d %B %Y"],
    time_patterns: ["%H:%M", "%H:%M:%S", "%H:%M:%S", "%H:%M:%S"],
    month_names: [
        "janvier",
        "février",
        "mars",
        "avril",
        "mai",
        "juin",
        "juillet",
        "août",
        "septembre",
        "octobre",
        "novembre",
        "décembre",
    ],
    weekday_names: [
        "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_tag() {
        let locale = Locale::parse("en_gb").unwrap();
        assert_eq!(locale.tag(), "en-GB");
        assert_eq!(locale.region(), Some("GB"));
        assert_eq!(locale.data().decimal_separator, '.');

        let locale = Locale::parse("es-ES-traditional").unwrap();
        assert_eq!(locale.language(), "es");
        assert!(locale.has_variant("traditional"));
        assert_eq!(locale.tag(), "es-ES-traditional");
    }

    #[test]
    fn test_long_variant_without_region() {
        let locale = Locale::parse("es_Traditional").unwrap();
        assert_eq!(locale.region(), None);
        assert!(locale.has_variant("traditional"));
        assert!(Locale::parse("es-ES-trad!tional").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Locale::parse("english").is_err());
        assert!(Locale::parse("en--GB").is_err());
        assert!(Locale::parse("").is_err());
    }

    #[test]
    fn test_locale_data_lookup() {
        assert_eq!(Locale::parse("de-AT").unwrap().data().decimal_separator, ',');
        assert_eq!(
            Locale::parse("en-GB").unwrap().data().date_pattern(DateStyle::Short),
            "%d/%m/%Y"
        );
        assert_eq!(Locale::root().data().currency_symbols[0], "US$");
    }
}
