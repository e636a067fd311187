/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for sort configuration.
//!
//! Only configuration problems are errors. Values that cannot be parsed at
//! sort time (numbers, dates) degrade to a default with a warning.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Unknown sort method '{method}'")]
    UnknownMethod { method: String },

    #[error("Invalid value '{value}' for setting '{setting}'")]
    InvalidSetting { setting: String, value: String },

    #[error("Invalid locale tag '{tag}'")]
    InvalidLocale { tag: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Sort method 'recordcount' requires record tracking to be enabled")]
    RecordCountDisabled,
}

impl Error {
    pub(crate) fn invalid_setting(setting: &str, value: &str) -> Self {
        Error::InvalidSetting {
            setting: setting.to_string(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
