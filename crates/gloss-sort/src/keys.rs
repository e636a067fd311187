/*
 * keys.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Text processing shared by the textual sort strategies.
//!
//! A textual sort string is built in a fixed order: the raw sort value
//! (sort field or its fallback, interpreted), then the `sort-suffix` field
//! value, then digit padding, then case adjustment and break markers. The
//! non-unique occurrence counter is appended later, once every entry has
//! its adjusted string (see [`crate::Sorter`]).

use crate::segment::{Boundary, Segmenter, is_word_like};
use crate::settings::{BreakPoint, CaseStyle, Padding, SortSettings, SortSuffix};
use crate::strategy::KeyContext;
use gloss_entry::EntryId;

/// The interpreted value of the sort field, or of its fallback.
///
/// Entries with neither get an empty string.
pub fn raw_sort_value(ctx: &KeyContext<'_>, id: EntryId) -> String {
    let entry = ctx.arena.get(id);
    match ctx
        .env
        .access
        .get_field_or_fallback(entry, &ctx.settings.sort_field)
    {
        Some(value) => ctx.env.text.expand_and_flatten(&value),
        None => {
            tracing::debug!(
                entry = %entry.label(),
                field = %ctx.settings.sort_field,
                "No sort value; using the empty string"
            );
            String::new()
        }
    }
}

/// Raw value plus the field suffix and padding, before case and breaks.
pub fn suffixed_value(ctx: &KeyContext<'_>, id: EntryId) -> String {
    let mut value = raw_sort_value(ctx, id);
    if let SortSuffix::Field(field) = &ctx.settings.suffix {
        let entry = ctx.arena.get(id);
        if let Some(suffix) = ctx.env.access.get_field_or_fallback(entry, field) {
            value.push_str(&ctx.settings.suffix_marker);
            value.push_str(&ctx.env.text.expand_and_flatten(&suffix));
        }
    }
    match &ctx.settings.padding {
        Some(padding) => pad_numbers(&value, padding),
        None => value,
    }
}

/// The full storable sort string for a textual strategy.
pub fn prepare_text(ctx: &KeyContext<'_>, id: EntryId, style: Option<CaseStyle>) -> String {
    let value = suffixed_value(ctx, id);
    adjust_sort(&value, style, ctx.settings, ctx.segmenter)
}

/// Apply case folding and break markers.
pub fn adjust_sort(
    text: &str,
    style: Option<CaseStyle>,
    settings: &SortSettings,
    segmenter: &dyn Segmenter,
) -> String {
    let text = match style {
        Some(CaseStyle::NoCase) => text.to_lowercase(),
        _ => text.to_string(),
    };
    apply_breaks(&text, settings.break_at, &settings.break_marker, segmenter)
}

/// Zero-pad every run of ASCII digits to `padding.width`.
///
/// A `+` or `-` directly before a run, at the start of the text or after a
/// non-alphanumeric character, is a sign. It is replaced by the plus or
/// minus marker when one is configured.
pub fn pad_numbers(text: &str, padding: &Padding) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + padding.width);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let signed = matches!(c, '+' | '-')
            && chars.get(i + 1).is_some_and(char::is_ascii_digit)
            && (i == 0 || !chars[i - 1].is_alphanumeric());
        let start = if signed { i + 1 } else { i };
        if !chars[start].is_ascii_digit() {
            out.push(c);
            i += 1;
            continue;
        }
        let end = chars[start..]
            .iter()
            .position(|d| !d.is_ascii_digit())
            .map_or(chars.len(), |n| start + n);
        if signed {
            let marker = if c == '+' {
                &padding.plus
            } else {
                &padding.minus
            };
            match marker {
                Some(marker) => out.push_str(marker),
                None => out.push(c),
            }
        }
        let digits = end - start;
        for _ in digits..padding.width {
            out.push('0');
        }
        out.extend(&chars[start..end]);
        i = end;
    }
    out
}

/// Insert `marker` at the configured break points.
pub fn apply_breaks(
    text: &str,
    break_at: BreakPoint,
    marker: &str,
    segmenter: &dyn Segmenter,
) -> String {
    match break_at {
        BreakPoint::None => text.to_string(),
        BreakPoint::Word => segmenter
            .segments(text, Boundary::Word)
            .into_iter()
            .filter(|s| is_word_like(s))
            .map(|word| format!("{}{}", word, marker))
            .collect(),
        BreakPoint::Character => segmenter
            .segments(text, Boundary::Character)
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(|c| format!("{}{}", c, marker))
            .collect(),
        BreakPoint::Sentence => segmenter
            .segments(text, Boundary::Sentence)
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("{}{}", s, marker))
            .collect(),
        BreakPoint::UpperNotLower => upper_breaks(text, marker, false),
        BreakPoint::UpperUpper => upper_breaks(text, marker, true),
        BreakPoint::UpperNotLowerWord | BreakPoint::UpperUpperWord => {
            let upper_upper = break_at == BreakPoint::UpperUpperWord;
            segmenter
                .segments(text, Boundary::Word)
                .into_iter()
                .filter(|s| is_word_like(s))
                .map(|word| format!("{}{}", upper_breaks(word, marker, upper_upper), marker))
                .collect()
        }
    }
}

/// Insert `marker` after upper-case letters.
///
/// With `upper_upper` the marker goes after an upper-case letter followed by
/// another upper-case letter; otherwise after one not followed by a
/// lower-case letter, including at the end of the text.
fn upper_breaks(text: &str, marker: &str, upper_upper: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if !c.is_uppercase() {
            continue;
        }
        let next = chars.peek();
        let brk = if upper_upper {
            next.is_some_and(|n| n.is_uppercase())
        } else {
            !next.is_some_and(|n| n.is_lowercase())
        };
        if brk {
            out.push_str(marker);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SimpleSegmenter;
    use pretty_assertions::assert_eq;

    fn breaks(text: &str, at: BreakPoint) -> String {
        apply_breaks(text, at, "|", &SimpleSegmenter)
    }

    #[test]
    fn test_pad_numbers() {
        let padding = Padding::new(4);
        assert_eq!(pad_numbers("item2", &padding), "item0002");
        assert_eq!(pad_numbers("v10.3", &padding), "v0010.0003");
        assert_eq!(pad_numbers("12345", &padding), "12345");
        assert_eq!(pad_numbers("a-1", &padding), "a-0001");
    }

    #[test]
    fn test_pad_sign_markers() {
        let padding = Padding {
            width: 3,
            plus: Some(">".to_string()),
            minus: Some("<".to_string()),
        };
        assert_eq!(pad_numbers("-5 and +7", &padding), "<005 and >007");
        // Not a sign: follows a letter.
        assert_eq!(pad_numbers("x-5", &padding), "x-005");
    }

    #[test]
    fn test_word_breaks_drop_punctuation() {
        assert_eq!(breaks("sea lion, big", BreakPoint::Word), "sea|lion|big|");
        assert_eq!(breaks("sea lion", BreakPoint::None), "sea lion");
    }

    #[test]
    fn test_character_and_sentence_breaks() {
        assert_eq!(breaks("a b", BreakPoint::Character), "a|b|");
        assert_eq!(breaks("One. Two", BreakPoint::Sentence), "One.|Two|");
    }

    #[test]
    fn test_upper_breaks() {
        assert_eq!(breaks("ABCdef", BreakPoint::UpperNotLower), "A|B|Cdef");
        assert_eq!(breaks("xY", BreakPoint::UpperNotLower), "xY|");
        assert_eq!(breaks("ABCdef", BreakPoint::UpperUpper), "A|B|Cdef");
        assert_eq!(breaks("AbC", BreakPoint::UpperUpper), "AbC");
        assert_eq!(
            breaks("HTMLpage XMLdoc", BreakPoint::UpperUpperWord),
            "H|T|M|Lpage|X|M|Ldoc|"
        );
    }
}
