/*
 * numeric.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parsing of numeric sort values.

use crate::locale::{Locale, LocaleData};
use crate::settings::NumericKind;
use gloss_entry::NumericValue;

/// Parse `text` as a number of the given kind, or `None` if it is not one.
pub fn parse_number(
    text: &str,
    kind: NumericKind,
    locale: &Locale,
    pattern: Option<&str>,
) -> Option<NumericValue> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let data = locale.data();
    match kind {
        NumericKind::Integer => parse_integer(text, 10, &[]),
        NumericKind::Float => text
            .parse::<f32>()
            .ok()
            .map(|v| NumericValue::Decimal(f64::from(v))),
        NumericKind::Double => text.parse::<f64>().ok().map(NumericValue::Decimal),
        NumericKind::Hex => parse_integer(text, 16, &["0x", "0X", "#"]),
        NumericKind::Octal => parse_integer(text, 8, &["0o", "0O"]),
        NumericKind::Binary => parse_integer(text, 2, &["0b", "0B"]),
        NumericKind::Numeric => parse_localized(text, data),
        NumericKind::Currency => parse_currency(text, data),
        NumericKind::Percent => {
            let stripped = text.trim_end_matches(['%', '\u{a0}', ' ']);
            if stripped.len() == text.len() {
                return None;
            }
            parse_localized(stripped.trim(), data)
                .map(|v| NumericValue::Decimal(v.as_f64() / 100.0))
        }
        NumericKind::NumberFormat => match pattern {
            Some(pattern) => parse_with_pattern(text, pattern, data),
            None => parse_localized(text, data),
        },
    }
}

/// Parse a sort value, substituting zero with a warning when it is not a
/// number of the expected kind.
pub fn numeric_sort_value(
    text: &str,
    kind: NumericKind,
    locale: &Locale,
    pattern: Option<&str>,
    label: &str,
) -> NumericValue {
    parse_number(text, kind, locale, pattern).unwrap_or_else(|| {
        tracing::warn!(
            entry = %label,
            value = %text,
            kind = ?kind,
            "Sort value is not a number; using 0"
        );
        NumericValue::Integer(0)
    })
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix(['-', '\u{2212}']) {
        (true, rest.trim_start())
    } else {
        (false, text.strip_prefix('+').unwrap_or(text).trim_start())
    }
}

fn parse_integer(text: &str, radix: u32, prefixes: &[&str]) -> Option<NumericValue> {
    let (negative, digits) = split_sign(text);
    let digits = prefixes
        .iter()
        .find_map(|p| digits.strip_prefix(p))
        .unwrap_or(digits);
    let value = i64::from_str_radix(digits, radix).ok()?;
    Some(NumericValue::Integer(if negative { -value } else { value }))
}

fn parse_localized(text: &str, data: &LocaleData) -> Option<NumericValue> {
    let (negative, digits) = split_sign(text);
    let mut normalized = String::with_capacity(digits.len());
    let mut seen_decimal = false;
    for c in digits.chars() {
        if c == data.decimal_separator && !seen_decimal {
            normalized.push('.');
            seen_decimal = true;
        } else if data.grouping_separators.contains(&c) && !seen_decimal {
            continue;
        } else if c.is_ascii_digit() {
            normalized.push(c);
        } else {
            return None;
        }
    }
    if normalized.is_empty() || normalized == "." {
        return None;
    }
    let value = if seen_decimal {
        NumericValue::Decimal(normalized.parse::<f64>().ok()?)
    } else {
        NumericValue::Integer(normalized.parse::<i64>().ok()?)
    };
    Some(if negative { negate(value) } else { value })
}

fn parse_currency(text: &str, data: &LocaleData) -> Option<NumericValue> {
    let (negative, inner) = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, text),
    };
    let symbol = data
        .currency_symbols
        .iter()
        .find(|symbol| inner.contains(*symbol))?;
    let amount = inner.replacen(*symbol, "", 1);
    let value = parse_localized(amount.trim(), data)?;
    Some(if negative { negate(value) } else { value })
}

/// Strip the literal prefix and suffix of a decimal-format pattern such as
/// `"€#,##0.00"`, then parse the rest with the locale's separators.
fn parse_with_pattern(text: &str, pattern: &str, data: &LocaleData) -> Option<NumericValue> {
    let is_placeholder = |c: char| matches!(c, '#' | '0');
    let start = pattern.find(is_placeholder).unwrap_or(pattern.len());
    let end = pattern.rfind(is_placeholder).map_or(start, |i| i + 1);
    let prefix = pattern[..start].trim();
    let suffix = pattern[end..].trim();
    let (negative, body) = split_sign(text);
    let body = body.strip_prefix(prefix)?.trim();
    let body = body.strip_suffix(suffix)?.trim();
    let value = parse_localized(body, data)?;
    Some(if negative { negate(value) } else { value })
}

fn negate(value: NumericValue) -> NumericValue {
    match value {
        NumericValue::Integer(i) => NumericValue::Integer(-i),
        NumericValue::Decimal(d) => NumericValue::Decimal(-d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, kind: NumericKind, tag: &str) -> Option<NumericValue> {
        parse_number(text, kind, &Locale::parse(tag).unwrap(), None)
    }

    #[test]
    fn test_radix_kinds() {
        assert_eq!(parse("0x1F", NumericKind::Hex, "en"), Some(NumericValue::Integer(31)));
        assert_eq!(parse("-17", NumericKind::Octal, "en"), Some(NumericValue::Integer(-15)));
        assert_eq!(parse("0b101", NumericKind::Binary, "en"), Some(NumericValue::Integer(5)));
        assert_eq!(parse("12", NumericKind::Integer, "en"), Some(NumericValue::Integer(12)));
        assert_eq!(parse("1.5", NumericKind::Integer, "en"), None);
    }

    #[test]
    fn test_locale_separators() {
        assert_eq!(
            parse("1,234.5", NumericKind::Numeric, "en"),
            Some(NumericValue::Decimal(1234.5))
        );
        assert_eq!(
            parse("1.234,5", NumericKind::Numeric, "de"),
            Some(NumericValue::Decimal(1234.5))
        );
        assert_eq!(
            parse("1 234", NumericKind::Numeric, "fr"),
            Some(NumericValue::Integer(1234))
        );
    }

    #[test]
    fn test_currency_and_percent() {
        assert_eq!(
            parse("£3.50", NumericKind::Currency, "en-GB"),
            Some(NumericValue::Decimal(3.5))
        );
        assert_eq!(
            parse("(12,00 €)", NumericKind::Currency, "fr"),
            Some(NumericValue::Decimal(-12.0))
        );
        assert_eq!(
            parse("50%", NumericKind::Percent, "en"),
            Some(NumericValue::Decimal(0.5))
        );
        assert_eq!(parse("50", NumericKind::Percent, "en"), None);
    }

    #[test]
    fn test_pattern() {
        let value = parse_number(
            "No. 1,200 units",
            NumericKind::NumberFormat,
            &Locale::root(),
            Some("No. #,##0 units"),
        );
        assert_eq!(value, Some(NumericValue::Integer(1200)));
    }

    #[test]
    fn test_unparseable_degrades_to_zero() {
        let value = numeric_sort_value("ten", NumericKind::Integer, &Locale::root(), None, "x");
        assert_eq!(value, NumericValue::Integer(0));
    }
}
