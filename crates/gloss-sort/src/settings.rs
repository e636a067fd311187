/*
 * settings.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Sort settings and their textual forms.

use crate::collation::{Decomposition, Strength};
use crate::error::{Error, Result};
use crate::locale::Locale;
use gloss_entry::Record;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// How letter sorts treat case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    /// Code point order, case as-is.
    Case,
    /// Fold to lower case.
    NoCase,
    /// Same letter: upper case first.
    UpperLower,
    /// Same letter: lower case first.
    LowerUpper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
    Double,
    Hex,
    Octal,
    Binary,
    /// Locale number format.
    Numeric,
    Currency,
    Percent,
    /// Explicit pattern from `numeric-sort-pattern`.
    NumberFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    Date,
    DateTime,
    Time,
}

impl DateKind {
    pub fn has_date(self) -> bool {
        matches!(self, DateKind::Date | DateKind::DateTime)
    }

    pub fn has_time(self) -> bool {
        matches!(self, DateKind::Time | DateKind::DateTime)
    }
}

/// The sort method named by the `sort` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortMethod {
    /// Definition order.
    None,
    /// Order of first use.
    Use,
    Letter(CaseStyle),
    /// Collated sort; `None` uses the resource locale.
    Locale(Option<Locale>),
    Numeric(NumericKind),
    /// Date or time sort, with an optional locale prefix (`de-date`).
    Date(DateKind, Option<Locale>),
    RecordCount,
}

impl FromStr for SortMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let method = match s {
            "none" | "unsrt" => SortMethod::None,
            "use" => SortMethod::Use,
            "letter-case" => SortMethod::Letter(CaseStyle::Case),
            "letter-nocase" => SortMethod::Letter(CaseStyle::NoCase),
            "letter-upperlower" => SortMethod::Letter(CaseStyle::UpperLower),
            "letter-lowerupper" => SortMethod::Letter(CaseStyle::LowerUpper),
            "locale" | "resource" => SortMethod::Locale(None),
            "integer" => SortMethod::Numeric(NumericKind::Integer),
            "float" => SortMethod::Numeric(NumericKind::Float),
            "double" => SortMethod::Numeric(NumericKind::Double),
            "hex" => SortMethod::Numeric(NumericKind::Hex),
            "octal" => SortMethod::Numeric(NumericKind::Octal),
            "binary" => SortMethod::Numeric(NumericKind::Binary),
            "numeric" => SortMethod::Numeric(NumericKind::Numeric),
            "currency" => SortMethod::Numeric(NumericKind::Currency),
            "percent" => SortMethod::Numeric(NumericKind::Percent),
            "numberformat" => SortMethod::Numeric(NumericKind::NumberFormat),
            "date" => SortMethod::Date(DateKind::Date, None),
            "datetime" => SortMethod::Date(DateKind::DateTime, None),
            "time" => SortMethod::Date(DateKind::Time, None),
            "recordcount" => SortMethod::RecordCount,
            _ => return parse_localized(s),
        };
        Ok(method)
    }
}

fn parse_localized(s: &str) -> Result<SortMethod> {
    let unknown = || Error::UnknownMethod {
        method: s.to_string(),
    };
    for (suffix, kind) in [
        ("-datetime", DateKind::DateTime),
        ("-date", DateKind::Date),
        ("-time", DateKind::Time),
    ] {
        if let Some(tag) = s.strip_suffix(suffix) {
            let locale = Locale::parse(tag).map_err(|_| unknown())?;
            return Ok(SortMethod::Date(kind, Some(locale)));
        }
    }
    Locale::parse(s)
        .map(|locale| SortMethod::Locale(Some(locale)))
        .map_err(|_| unknown())
}

impl SortMethod {
    /// Whether the method orders by a string key derived from the sort field.
    pub fn is_textual(&self) -> bool {
        matches!(self, SortMethod::Letter(_) | SortMethod::Locale(_))
    }
}

/// Where break markers are inserted into letter and locale sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakPoint {
    None,
    Word,
    Character,
    Sentence,
    /// After an upper-case letter that is not followed by a lower-case one.
    UpperNotLower,
    /// After an upper-case letter followed by another upper-case letter.
    UpperUpper,
    UpperNotLowerWord,
    UpperUpperWord,
}

impl FromStr for BreakPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(BreakPoint::None),
            "word" => Ok(BreakPoint::Word),
            "character" => Ok(BreakPoint::Character),
            "sentence" => Ok(BreakPoint::Sentence),
            "upper-notlower" => Ok(BreakPoint::UpperNotLower),
            "upper-upper" => Ok(BreakPoint::UpperUpper),
            "upper-notlower-word" => Ok(BreakPoint::UpperNotLowerWord),
            "upper-upper-word" => Ok(BreakPoint::UpperUpperWord),
            _ => Err(Error::invalid_setting("break-at", s)),
        }
    }
}

/// Zero-padding of digit runs in sort keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Padding {
    pub width: usize,
    /// Replaces the sign of positive numbers when set.
    pub plus: Option<String>,
    /// Replaces the sign of negative numbers when set.
    pub minus: Option<String>,
}

impl Padding {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            plus: None,
            minus: None,
        }
    }
}

/// What is appended to a sort key to separate otherwise equal keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortSuffix {
    None,
    /// An occurrence counter, added to repeated keys only.
    NonUnique,
    /// The value of another field, appended to every key.
    Field(String),
}

impl SortSuffix {
    pub fn parse(s: &str) -> Self {
        match s {
            "none" | "" => SortSuffix::None,
            "non-unique" => SortSuffix::NonUnique,
            field => SortSuffix::Field(field.to_string()),
        }
    }
}

/// Tie-break for entries whose keys compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdenticalSortAction {
    /// Keep input order.
    None,
    Id,
    OriginalId,
    /// Definition index.
    Def,
    /// First record index.
    Use,
    Field(String),
}

impl IdenticalSortAction {
    pub fn parse(s: &str) -> Self {
        match s {
            "none" => IdenticalSortAction::None,
            "id" => IdenticalSortAction::Id,
            "original id" | "original-id" => IdenticalSortAction::OriginalId,
            "def" => IdenticalSortAction::Def,
            "use" => IdenticalSortAction::Use,
            field => IdenticalSortAction::Field(field.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFormation {
    Default,
    Codepoint,
    UnicodeCategory,
    UnicodeScript,
    UnicodeCategoryAndScript,
}

impl FromStr for GroupFormation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(GroupFormation::Default),
            "codepoint" => Ok(GroupFormation::Codepoint),
            "unicode category" => Ok(GroupFormation::UnicodeCategory),
            "unicode script" => Ok(GroupFormation::UnicodeScript),
            "unicode category and script" => Ok(GroupFormation::UnicodeCategoryAndScript),
            _ => Err(Error::invalid_setting("group-formation", s)),
        }
    }
}

/// Which location records count towards `recordcount`.
#[derive(Debug, Clone, Default)]
pub enum RecordCountRule {
    #[default]
    All,
    NonIgnored,
    Format(Regex),
    Counter(Regex),
    /// Both the format and the counter must match.
    FormatAndCounter(Regex, Regex),
    /// Either the format or the counter must match.
    FormatOrCounter(Regex, Regex),
}

impl RecordCountRule {
    /// Parse `all`, `non-ignored`, `f/<re>`, `c/<re>`, `fc/<re>/<re>` or
    /// `f|c/<re>/<re>`. Patterns must match the whole value.
    pub fn parse(s: &str) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
        };
        fn split_pair<'r>(rest: &'r str, s: &str) -> Result<(&'r str, &'r str)> {
            rest.split_once('/')
                .ok_or_else(|| Error::invalid_setting("record-count-rule", s))
        }
        match s {
            "all" | "a" => return Ok(RecordCountRule::All),
            "non-ignored" | "n" => return Ok(RecordCountRule::NonIgnored),
            _ => {}
        }
        if let Some(rest) = s.strip_prefix("fc/") {
            let (format, counter) = split_pair(rest, s)?;
            return Ok(RecordCountRule::FormatAndCounter(
                compile(format)?,
                compile(counter)?,
            ));
        }
        if let Some(rest) = s.strip_prefix("f|c/") {
            let (format, counter) = split_pair(rest, s)?;
            return Ok(RecordCountRule::FormatOrCounter(
                compile(format)?,
                compile(counter)?,
            ));
        }
        if let Some(rest) = s.strip_prefix("f/") {
            return Ok(RecordCountRule::Format(compile(rest)?));
        }
        if let Some(rest) = s.strip_prefix("c/") {
            return Ok(RecordCountRule::Counter(compile(rest)?));
        }
        Err(Error::invalid_setting("record-count-rule", s))
    }

    pub fn includes(&self, record: &Record) -> bool {
        match self {
            RecordCountRule::All => true,
            RecordCountRule::NonIgnored => !record.is_ignored(),
            RecordCountRule::Format(format) => format.is_match(&record.format),
            RecordCountRule::Counter(counter) => counter.is_match(&record.counter),
            RecordCountRule::FormatAndCounter(format, counter) => {
                format.is_match(&record.format) && counter.is_match(&record.counter)
            }
            RecordCountRule::FormatOrCounter(format, counter) => {
                format.is_match(&record.format) || counter.is_match(&record.counter)
            }
        }
    }
}

impl fmt::Display for SortMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMethod::None => f.write_str("none"),
            SortMethod::Use => f.write_str("use"),
            SortMethod::Letter(style) => f.write_str(match style {
                CaseStyle::Case => "letter-case",
                CaseStyle::NoCase => "letter-nocase",
                CaseStyle::UpperLower => "letter-upperlower",
                CaseStyle::LowerUpper => "letter-lowerupper",
            }),
            SortMethod::Locale(None) => f.write_str("locale"),
            SortMethod::Locale(Some(locale)) => write!(f, "{}", locale),
            SortMethod::Numeric(kind) => f.write_str(&format!("{:?}", kind).to_lowercase()),
            SortMethod::Date(kind, locale) => {
                if let Some(locale) = locale {
                    write!(f, "{}-", locale)?;
                }
                f.write_str(match kind {
                    DateKind::Date => "date",
                    DateKind::DateTime => "datetime",
                    DateKind::Time => "time",
                })
            }
            SortMethod::RecordCount => f.write_str("recordcount"),
        }
    }
}

/// All settings of one sort.
#[derive(Debug, Clone)]
pub struct SortSettings {
    pub method: SortMethod,
    /// Field holding the sort value. Falls back through the field access
    /// rules when absent.
    pub sort_field: String,
    /// Resource locale for locale, numeric and date sorts.
    pub locale: Locale,
    pub reverse: bool,
    pub break_at: BreakPoint,
    pub break_marker: String,
    pub padding: Option<Padding>,
    pub suffix: SortSuffix,
    /// Separator between a sort value and its suffix. Defaults to `|`.
    pub suffix_marker: String,
    pub identical: IdenticalSortAction,
    pub strength: Strength,
    pub decomposition: Decomposition,
    /// Ignore the hierarchy and compare entries' own keys.
    pub flatten: bool,
    /// Glossary type for entries without a `type` field.
    pub default_type: String,
    pub group_formation: GroupFormation,
    /// Deepest hierarchy level that gets groups.
    pub group_level: usize,
    pub merge_small_groups: Option<usize>,
    /// `chrono` pattern or style name for parsing date sort values.
    pub date_pattern: Option<String>,
    /// `chrono` pattern for date group titles.
    pub date_group_pattern: Option<String>,
    pub numeric_pattern: Option<String>,
    pub record_count_rule: RecordCountRule,
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            method: SortMethod::Locale(None),
            sort_field: "sort".to_string(),
            locale: Locale::root(),
            reverse: false,
            break_at: BreakPoint::Word,
            break_marker: "|".to_string(),
            padding: None,
            suffix: SortSuffix::None,
            suffix_marker: "|".to_string(),
            identical: IdenticalSortAction::Id,
            strength: Strength::default(),
            decomposition: Decomposition::default(),
            flatten: false,
            default_type: "main".to_string(),
            group_formation: GroupFormation::Default,
            group_level: 0,
            merge_small_groups: None,
            date_pattern: None,
            date_group_pattern: None,
            numeric_pattern: None,
            record_count_rule: RecordCountRule::All,
        }
    }
}

impl SortSettings {
    pub fn new(method: SortMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// The locale a collated or date sort runs in.
    pub fn effective_locale(&self) -> &Locale {
        match &self.method {
            SortMethod::Locale(Some(locale)) | SortMethod::Date(_, Some(locale)) => locale,
            _ => &self.locale,
        }
    }
}
