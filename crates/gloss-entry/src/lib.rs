/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Entry collections for glossary sorting.
//!
//! This crate owns the data the sorting core operates on:
//!
//! - [`EntryArena`]: the working collection, with parent links resolved to
//!   stable [`EntryId`]s
//! - [`Markup`]: field values as small TeX-like fragments
//! - [`FieldAccess`]: field reads with computed fallbacks
//! - [`TextService`]: interpretation of markup into plain text
//! - [`RecordLog`]: location records used by record-count and use ordering

pub mod access;
pub mod entry;
pub mod error;
pub mod markup;
pub mod records;
pub mod text;

pub use access::{FallbackRules, FieldAccess};
pub use entry::{Entry, EntryArena, EntryId, EntryRecord, NumericValue};
pub use error::{Error, Result};
pub use markup::{Markup, Token};
pub use records::{Record, RecordLog};
pub use text::{PlainTextService, TextService};
