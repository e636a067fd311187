/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Field expressions for glossary entries.
//!
//! A small language evaluated against an [`EntryArena`](gloss_entry::EntryArena):
//!
//! - value expressions ([`FieldValueElement`]): field references that can
//!   walk to the parent or root entry, literals, case changes and other
//!   quarks, concatenation
//! - conditionals ([`Conditional`]) over those values
//! - assignments ([`FieldAssignment`]) that write computed values back into
//!   entries, run as an [`AssignmentPipeline`]
//!
//! # Example
//!
//! ```
//! use gloss_entry::{Entry, EntryArena};
//! use gloss_fields::{AssignmentPipeline, FieldEnv};
//!
//! let mut arena = EntryArena::new();
//! let id = arena.insert(Entry::new("duck", "entry").with_field("name", "duck")).unwrap();
//!
//! let pipeline = AssignmentPipeline::parse(r"display = \FIRSTUC{name}").unwrap();
//! pipeline.run(&mut arena, &FieldEnv::default());
//!
//! assert_eq!(arena.get(id).field("display").unwrap().to_source(), "Duck");
//! ```

pub mod assign;
pub mod case;
pub mod conditional;
pub mod context;
pub mod error;
pub mod labelify;
pub mod parser;
pub mod reference;
pub mod value;

pub use assign::{AssignmentPipeline, AssignmentReport, Evaluated, FieldAssignment, FieldEvaluation};
pub use case::CaseChange;
pub use conditional::{Conditional, LengthOperand, Pattern, Relation};
pub use context::{EvalContext, FieldEnv, GroupRef, MatchGroups};
pub use error::{Error, Result, SyntaxError};
pub use labelify::LabelifyRules;
pub use parser::{
    parse_assignment, parse_assignments, parse_condition, parse_condition_markup, parse_expression,
    parse_expression_markup,
};
pub use reference::FieldReference;
pub use value::{Field, FieldTarget, FieldValueElement};
