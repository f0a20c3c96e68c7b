//! Base error type.
//!
//! Component crates define their own error enums (`GridError`,
//! `SearchError`, …) and wrap `NavError` where configuration or file
//! loading can fail underneath them.

use thiserror::Error;

/// Configuration, parsing, and I/O failures shared by all `nav-*` crates.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `nav-core`.
pub type NavResult<T> = Result<T, NavError>;
