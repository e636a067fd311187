/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for building entry collections.

use thiserror::Error;

/// Errors that can occur while building an entry collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two entries share the same label.
    #[error("Duplicate entry label '{label}'")]
    DuplicateLabel { label: String },

    /// An entry was given an empty label.
    #[error("Entry of type '{entry_type}' has an empty label")]
    EmptyLabel { entry_type: String },
}

/// Result type alias for gloss-entry operations.
pub type Result<T> = std::result::Result<T, Error>;
