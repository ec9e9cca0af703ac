// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced to callers.
//!
//! Per-frame conditions (provider failures, rejected grabs, disposed targets)
//! are recovered inside the engine and only logged; they never appear here.

use std::io;

/// Failure to read, parse, or validate an [`InteractionConfig`](crate::InteractionConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    /// The TOML was malformed or had the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The config could not be written back out.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A colour was not of the form `#RRGGBB`.
    #[error("invalid colour {0:?}, expected #RRGGBB")]
    InvalidColor(String),
    /// A numeric field is outside its allowed range.
    #[error("{field} = {value} is out of range")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
}
