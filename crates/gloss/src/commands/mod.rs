/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Command implementations for the gloss CLI.

pub mod check;
pub mod sort;
