/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for field expressions, conditionals and assignments.

use std::ops::Range;
use thiserror::Error;

/// A malformed expression, conditional or assignment.
///
/// Carries the offending fragment, its byte range in the (tokenized and
/// re-rendered) source text, and the text that preceded it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at '{fragment}' (after '{preceding}')")]
pub struct SyntaxError {
    pub message: String,
    pub fragment: String,
    pub preceding: String,
    pub span: Range<usize>,
    pub source_text: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Range<usize>, source_text: &str) -> Self {
        let start = span.start.min(source_text.len());
        let end = span.end.clamp(start, source_text.len());
        let fragment = if start == end {
            "<end of input>".to_string()
        } else {
            source_text[start..end].to_string()
        };
        Self {
            message: message.into(),
            fragment,
            preceding: source_text[..start].trim_end().to_string(),
            span: start..end,
            source_text: source_text.to_string(),
        }
    }

    /// The span in characters rather than bytes, as ariadne counts them.
    pub fn char_span(&self) -> Range<usize> {
        let to_chars = |byte: usize| self.source_text[..byte].chars().count();
        to_chars(self.span.start)..to_chars(self.span.end)
    }

    /// Render the error with a source snippet.
    pub fn render(&self, source_name: &str) -> String {
        use ariadne::{Color, Config, Label, Report, ReportKind, Source};

        // A trailing space gives end-of-input errors something to point at.
        let source = format!("{} ", self.source_text);
        let span = self.char_span();
        let span = if span.is_empty() {
            span.start..span.start + 1
        } else {
            span
        };
        let report = Report::build(ReportKind::Error, source_name, span.start)
            .with_config(Config::default().with_color(false))
            .with_message(&self.message)
            .with_label(
                Label::new((source_name, span))
                    .with_message(format!("unexpected '{}'", self.fragment))
                    .with_color(Color::Red),
            )
            .finish();

        let mut output = Vec::new();
        if report
            .write((source_name, Source::from(source.as_str())), &mut output)
            .is_err()
        {
            return self.to_string();
        }
        String::from_utf8(output).unwrap_or_else(|_| self.to_string())
    }
}

/// Errors produced while loading field expressions and assignments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// A `/regex/` operand that does not compile.
    #[error("Invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// `entrytype` and `entrylabel` must be the last link of a reference chain.
    #[error("Reference '{reference}' cannot be followed by another reference")]
    TerminalReference { reference: String },
}

/// Result type alias for gloss-fields operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_char_span_after_non_ascii() {
        let source = r"ééééé + \SHOUT{name}";
        let start = source.find('\\').unwrap();
        let err = SyntaxError::new("Unknown quark", start..start + 6, source);
        assert_eq!(err.span, 13..19);
        assert_eq!(err.fragment, r"\SHOUT");
        assert_eq!(err.char_span(), 8..14);
    }

    #[test]
    fn test_render_points_at_fragment_after_non_ascii() {
        let source = r"ééééé + \SHOUT{name}";
        let start = source.find('\\').unwrap();
        let err = SyntaxError::new("Unknown quark", start..start + 6, source);
        let rendered = err.render("expr");
        assert!(rendered.contains("expr:1:9"), "Got: {}", rendered);
        assert!(rendered.contains(r"unexpected '\SHOUT'"), "Got: {}", rendered);
    }
}
