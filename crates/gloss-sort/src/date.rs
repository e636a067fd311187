/*
 * date.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Date and time sort values.
//!
//! Values are parsed with `chrono`, either with an explicit pattern, a named
//! locale style (`short`, `medium`, `long`, `full`) or, by default, ISO 8601
//! followed by every style of the locale. Localized month and weekday names
//! are mapped to English before parsing.

use crate::locale::{DateStyle, ENGLISH_MONTHS, ENGLISH_WEEKDAYS, Locale, LocaleData};
use crate::settings::DateKind;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt::Write;

const ISO_DATES: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const ISO_DATETIMES: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const ISO_TIMES: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];
const STYLES: [DateStyle; 4] = [
    DateStyle::Medium,
    DateStyle::Short,
    DateStyle::Long,
    DateStyle::Full,
];

/// A parsed date sort value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValue {
    pub kind: DateKind,
    pub datetime: NaiveDateTime,
}

impl DateValue {
    pub fn new(kind: DateKind, datetime: NaiveDateTime) -> Self {
        Self { kind, datetime }
    }

    /// The numeric sort key.
    ///
    /// Dates map to `sign(era) * (year * 10000 + month * 100 + day)` with
    /// the year of the era; date-times to epoch milliseconds; times to
    /// milliseconds since midnight.
    pub fn key(&self) -> i64 {
        match self.kind {
            DateKind::Date => {
                let date = self.datetime.date();
                let (common_era, year) = date.year_ce();
                let value =
                    i64::from(year) * 10000 + i64::from(date.month()) * 100 + i64::from(date.day());
                if common_era { value } else { -value }
            }
            DateKind::DateTime => self.datetime.and_utc().timestamp_millis(),
            DateKind::Time => {
                let time = self.datetime.time();
                i64::from(time.num_seconds_from_midnight()) * 1000
                    + i64::from(time.nanosecond() / 1_000_000)
            }
        }
    }

    /// Canonical text stored as the entry's sort string.
    pub fn canonical(&self) -> String {
        let pattern = match self.kind {
            DateKind::Date => "%Y-%m-%d",
            DateKind::DateTime => "%Y-%m-%dT%H:%M:%S",
            DateKind::Time => "%H:%M:%S",
        };
        self.datetime.format(pattern).to_string()
    }

    /// Group title, using `pattern` or the year (hour for times).
    pub fn group_title(&self, pattern: Option<&str>) -> String {
        let default = match self.kind {
            DateKind::Date | DateKind::DateTime => "%Y",
            DateKind::Time => "%H",
        };
        let pattern = pattern.unwrap_or(default);
        let mut title = String::new();
        if write!(title, "{}", self.datetime.format(pattern)).is_err() {
            tracing::warn!(pattern = %pattern, "Invalid date group pattern; using default");
            title = self.datetime.format(default).to_string();
        }
        title
    }
}

/// Parse a date/time value, or `None` if no pattern matches.
pub fn parse_date(
    text: &str,
    kind: DateKind,
    locale: &Locale,
    pattern: Option<&str>,
) -> Option<DateValue> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let data = locale.data();
    let normalized = englishify(text, data);

    let patterns: Vec<String> = match pattern {
        Some(name) => match DateStyle::from_name(name) {
            Some(style) => vec![style_pattern(kind, data, style)],
            None => vec![name.to_string()],
        },
        None => {
            let iso = match kind {
                DateKind::Date => ISO_DATES,
                DateKind::DateTime => ISO_DATETIMES,
                DateKind::Time => ISO_TIMES,
            };
            iso.iter()
                .map(|p| p.to_string())
                .chain(STYLES.iter().map(|style| style_pattern(kind, data, *style)))
                .collect()
        }
    };

    if kind == DateKind::DateTime && pattern.is_none() {
        if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(&normalized) {
            return Some(DateValue::new(kind, parsed.naive_utc()));
        }
    }

    patterns
        .iter()
        .find_map(|p| parse_with(&normalized, kind, p))
        .map(|datetime| DateValue::new(kind, datetime))
}

/// Parse a date sort value, substituting the current time with a warning
/// when it cannot be parsed.
pub fn date_sort_value(
    text: &str,
    kind: DateKind,
    locale: &Locale,
    pattern: Option<&str>,
    label: &str,
) -> DateValue {
    parse_date(text, kind, locale, pattern).unwrap_or_else(|| {
        tracing::warn!(
            entry = %label,
            value = %text,
            kind = ?kind,
            "Sort value is not a valid date; using the current time"
        );
        DateValue::new(kind, Local::now().naive_local())
    })
}

fn style_pattern(kind: DateKind, data: &LocaleData, style: DateStyle) -> String {
    match kind {
        DateKind::Date => data.date_pattern(style).to_string(),
        DateKind::Time => data.time_pattern(style).to_string(),
        DateKind::DateTime => format!("{} {}", data.date_pattern(style), data.time_pattern(style)),
    }
}

fn parse_with(text: &str, kind: DateKind, pattern: &str) -> Option<NaiveDateTime> {
    match kind {
        DateKind::Date => NaiveDate::parse_from_str(text, pattern)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
        DateKind::DateTime => NaiveDateTime::parse_from_str(text, pattern).ok(),
        DateKind::Time => {
            let time = NaiveTime::parse_from_str(text, pattern).ok()?;
            NaiveDate::from_ymd_opt(1970, 1, 1).map(|d| d.and_time(time))
        }
    }
}

/// Replace localized month and weekday names with the English ones.
fn englishify(text: &str, data: &LocaleData) -> String {
    if data.month_names == ENGLISH_MONTHS {
        return text.to_string();
    }
    let mut out = text.to_string();
    let pairs = data
        .month_names
        .iter()
        .zip(ENGLISH_MONTHS)
        .chain(data.weekday_names.iter().zip(ENGLISH_WEEKDAYS));
    for (local, english) in pairs {
        if let Some(start) = out.to_lowercase().find(&local.to_lowercase()) {
            if out.is_char_boundary(start) && out.is_char_boundary(start + local.len()) {
                out.replace_range(start..start + local.len(), english);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str, kind: DateKind, tag: &str, pattern: Option<&str>) -> Option<i64> {
        parse_date(text, kind, &Locale::parse(tag).unwrap(), pattern).map(|d| d.key())
    }

    #[test]
    fn test_date_key_uses_era() {
        assert_eq!(key("2024-03-05", DateKind::Date, "en", None), Some(20240305));
        // 44 BC is proleptic year -43.
        assert_eq!(key("-0043-03-15", DateKind::Date, "en", None), Some(-440315));
    }

    #[test]
    fn test_locale_styles() {
        assert_eq!(key("05/03/2024", DateKind::Date, "en-GB", None), Some(20240305));
        assert_eq!(key("03/05/24", DateKind::Date, "en", Some("short")), Some(20240305));
        assert_eq!(key("5. März 2024", DateKind::Date, "de", None), Some(20240305));
        assert_eq!(key("5 mars 2024", DateKind::Date, "fr", Some("long")), Some(20240305));
    }

    #[test]
    fn test_datetime_and_time() {
        assert_eq!(
            key("1970-01-01T00:00:01", DateKind::DateTime, "en", None),
            Some(1000)
        );
        assert_eq!(
            key("1970-01-01T01:00:00+01:00", DateKind::DateTime, "en", None),
            Some(0)
        );
        assert_eq!(key("01:02:03", DateKind::Time, "en", None), Some(3_723_000));
    }

    #[test]
    fn test_explicit_pattern_and_titles() {
        let value = parse_date("2024|07|01", DateKind::Date, &Locale::root(), Some("%Y|%m|%d"))
            .unwrap();
        assert_eq!(value.canonical(), "2024-07-01");
        assert_eq!(value.group_title(None), "2024");
        assert_eq!(value.group_title(Some("%B %Y")), "July 2024");
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(key("someday", DateKind::Date, "en", None), None);
    }
}
