/*
 * segment.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Text segmentation for break-point processing.

use crate::collation::is_combining_mark;

/// The kind of boundary to segment at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Character,
    Word,
    Sentence,
}

/// A text-segmentation provider.
///
/// Segments returned for one call concatenate back to the input.
pub trait Segmenter {
    fn segments<'t>(&self, text: &'t str, boundary: Boundary) -> Vec<&'t str>;
}

/// Whether a word segment holds a word (rather than spaces or punctuation).
pub fn is_word_like(segment: &str) -> bool {
    segment.chars().any(char::is_alphanumeric)
}

/// A simple rule-based segmenter.
///
/// Characters keep their trailing combining marks. Words are maximal runs
/// of alphanumerics, where an apostrophe or hyphen between two
/// alphanumerics stays inside the word; every other character is its own
/// segment. Sentences end after `.`, `!` or `?` plus any trailing
/// whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSegmenter;

impl Segmenter for SimpleSegmenter {
    fn segments<'t>(&self, text: &'t str, boundary: Boundary) -> Vec<&'t str> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut cuts = vec![0];
        for i in 1..chars.len() {
            let (offset, c) = chars[i];
            let previous = chars[i - 1].1;
            let cut = match boundary {
                Boundary::Character => !is_combining_mark(c),
                Boundary::Word => word_cut(&chars, i, previous, c),
                Boundary::Sentence => {
                    let after_terminator = chars[..i]
                        .iter()
                        .rev()
                        .find(|(_, p)| !p.is_whitespace())
                        .is_some_and(|(_, p)| matches!(p, '.' | '!' | '?'));
                    previous.is_whitespace() && !c.is_whitespace() && after_terminator
                }
            };
            if cut {
                cuts.push(offset);
            }
        }
        cuts.push(text.len());
        cuts.dedup();
        cuts.windows(2)
            .map(|w| &text[w[0]..w[1]])
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn word_cut(chars: &[(usize, char)], i: usize, previous: char, c: char) -> bool {
    let in_word = |ch: char| ch.is_alphanumeric() || is_combining_mark(ch);
    if in_word(previous) && in_word(c) {
        return false;
    }
    let joiner = |ch: char| matches!(ch, '\'' | '\u{2019}' | '-');
    if joiner(c) && in_word(previous) {
        if let Some((_, next)) = chars.get(i + 1) {
            return !in_word(*next);
        }
    }
    if in_word(c) && joiner(previous) && i >= 2 && in_word(chars[i - 2].1) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_word_segments() {
        let segments = SimpleSegmenter.segments("sea lion, don't stop-gap", Boundary::Word);
        assert_eq!(
            segments,
            vec!["sea", " ", "lion", ",", " ", "don't", " ", "stop-gap"]
        );
        let words: Vec<_> = segments.into_iter().filter(|s| is_word_like(s)).collect();
        assert_eq!(words, vec!["sea", "lion", "don't", "stop-gap"]);
    }

    #[test]
    fn test_character_segments_keep_marks() {
        assert_eq!(
            SimpleSegmenter.segments("e\u{301}a", Boundary::Character),
            vec!["e\u{301}", "a"]
        );
    }

    #[test]
    fn test_sentence_segments() {
        assert_eq!(
            SimpleSegmenter.segments("One. Two! Three", Boundary::Sentence),
            vec!["One. ", "Two! ", "Three"]
        );
    }
}
