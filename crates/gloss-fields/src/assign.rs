/*
 * assign.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Field assignments: `dest = expr [condition]`, applied to every entry.

use crate::conditional::Conditional;
use crate::context::{EvalContext, FieldEnv};
use crate::error::Result;
use crate::parser;
use crate::value::FieldValueElement;
use gloss_entry::{EntryArena, EntryId, Markup};
use std::fmt;

/// A value expression guarded by an optional condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEvaluation {
    pub value: FieldValueElement,
    pub condition: Option<Conditional>,
}

/// Result of evaluating a [`FieldEvaluation`] for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluated {
    /// The condition did not hold.
    Skipped,
    /// The expression evaluated to null.
    Null,
    Value(Markup),
}

impl FieldEvaluation {
    pub fn evaluate(&self, ctx: &mut EvalContext<'_>, entry: EntryId) -> Evaluated {
        if let Some(condition) = &self.condition {
            if !condition.evaluate(ctx, entry) {
                return Evaluated::Skipped;
            }
        }
        match self.value.value(ctx, entry) {
            Some(value) => Evaluated::Value(value),
            None => Evaluated::Null,
        }
    }
}

impl fmt::Display for FieldEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(condition) = &self.condition {
            write!(f, " [{}]", condition)?;
        }
        Ok(())
    }
}

/// `destination = value [condition]`.
///
/// `override_policy` is `Some(true)` for `=+`, `Some(false)` for `=-` and
/// `None` for a plain `=`, which defers to the pipeline default.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssignment {
    pub destination: String,
    pub evaluation: FieldEvaluation,
    pub override_policy: Option<bool>,
}

impl FieldAssignment {
    pub fn overrides(&self, default: bool) -> bool {
        self.override_policy.unwrap_or(default)
    }
}

impl fmt::Display for FieldAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.override_policy {
            Some(true) => "=+",
            Some(false) => "=-",
            None => "=",
        };
        write!(f, "{} {} {}", self.destination, op, self.evaluation)
    }
}

/// Counts of what a pipeline run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentReport {
    pub written: usize,
    /// Destination already set and override not allowed.
    pub kept: usize,
    /// Condition false.
    pub skipped: usize,
    /// Expression evaluated to null; nothing is written.
    pub null: usize,
}

/// An ordered list of assignments applied to every entry of a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentPipeline {
    assignments: Vec<FieldAssignment>,
    override_default: bool,
}

impl AssignmentPipeline {
    pub fn new(assignments: Vec<FieldAssignment>) -> Self {
        Self {
            assignments,
            override_default: false,
        }
    }

    /// Parse a comma-separated assignment list.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::new(parser::parse_assignments(text)?))
    }

    /// Whether a plain `=` replaces an existing value.
    pub fn with_override(mut self, override_default: bool) -> Self {
        self.override_default = override_default;
        self
    }

    pub fn assignments(&self) -> &[FieldAssignment] {
        &self.assignments
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Apply every assignment to every entry, in definition order.
    ///
    /// Later assignments observe the values written by earlier ones. Match
    /// groups are reset before each assignment.
    pub fn run(&self, arena: &mut EntryArena, env: &FieldEnv) -> AssignmentReport {
        let mut report = AssignmentReport::default();
        for id in arena.ids() {
            for assignment in &self.assignments {
                let outcome = {
                    let entry = arena.get(id);
                    if !assignment.overrides(self.override_default)
                        && env.access.get_field(entry, &assignment.destination).is_some()
                    {
                        report.kept += 1;
                        continue;
                    }
                    let mut ctx = EvalContext::new(arena, env);
                    assignment.evaluation.evaluate(&mut ctx, id)
                };
                match outcome {
                    Evaluated::Skipped => report.skipped += 1,
                    Evaluated::Null => {
                        tracing::debug!(
                            entry = %arena.get(id).label(),
                            assignment = %assignment,
                            "Assignment evaluated to null"
                        );
                        report.null += 1;
                    }
                    Evaluated::Value(value) => {
                        tracing::trace!(
                            entry = %arena.get(id).label(),
                            field = %assignment.destination,
                            value = %value,
                            "Assigned field"
                        );
                        arena.set_field(id, &assignment.destination, value);
                        report.written += 1;
                    }
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloss_entry::Entry;
    use pretty_assertions::assert_eq;

    fn arena() -> EntryArena {
        let mut arena = EntryArena::new();
        arena
            .insert(Entry::new("apple", "entry").with_field("name", "apple"))
            .unwrap();
        arena
            .insert(
                Entry::new("pear", "entry")
                    .with_field("name", "pear")
                    .with_field("display", "kept"),
            )
            .unwrap();
        arena
    }

    fn field(arena: &EntryArena, label: &str, name: &str) -> Option<String> {
        let id = arena.lookup(label)?;
        arena.get(id).field(name).map(|m| m.to_source())
    }

    #[test]
    fn test_existing_values_are_kept_without_override() {
        let mut arena = arena();
        let pipeline = AssignmentPipeline::parse(r"display = \FIRSTUC{name}").unwrap();
        let report = pipeline.run(&mut arena, &FieldEnv::default());
        assert_eq!(field(&arena, "apple", "display").as_deref(), Some("Apple"));
        assert_eq!(field(&arena, "pear", "display").as_deref(), Some("kept"));
        assert_eq!(report.written, 1);
        assert_eq!(report.kept, 1);
    }

    #[test]
    fn test_override_marker_replaces() {
        let mut arena = arena();
        let pipeline = AssignmentPipeline::parse(r"display =+ \UC{name}").unwrap();
        pipeline.run(&mut arena, &FieldEnv::default());
        assert_eq!(field(&arena, "pear", "display").as_deref(), Some("PEAR"));
    }

    #[test]
    fn test_pipeline_default_and_no_override_marker() {
        let mut arena = arena();
        let pipeline = AssignmentPipeline::parse(r"display =- \UC{name}, name = {x}")
            .unwrap()
            .with_override(true);
        pipeline.run(&mut arena, &FieldEnv::default());
        assert_eq!(field(&arena, "pear", "display").as_deref(), Some("kept"));
        assert_eq!(field(&arena, "pear", "name").as_deref(), Some("x"));
    }

    #[test]
    fn test_later_assignments_see_earlier_writes() {
        let mut arena = arena();
        let pipeline =
            AssignmentPipeline::parse(r#"short = \UC{name}, long = short + "!" [short = "APPLE"]"#)
                .unwrap();
        let report = pipeline.run(&mut arena, &FieldEnv::default());
        assert_eq!(field(&arena, "apple", "long").as_deref(), Some("APPLE!"));
        assert_eq!(field(&arena, "pear", "long"), None);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_null_is_never_written() {
        let mut arena = arena();
        let pipeline = AssignmentPipeline::parse("copy = missing").unwrap();
        let report = pipeline.run(&mut arena, &FieldEnv::default());
        assert_eq!(report.null, 2);
        assert_eq!(field(&arena, "apple", "copy"), None);
    }
}
