//! CLI support for trigger-expr
//!
//! Provides programmatic access to the `trigex` commands for embedding in
//! other tools.

mod check;
mod convert;

pub use check::{execute_check, CheckOptions, CheckResult};
pub use convert::{execute_convert, ConvertOptions};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),
    #[error("Conversion error: {0}")]
    Convert(#[from] crate::ConvertError),
    #[error(transparent)]
    Config(#[from] crate::ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// No expression on the command line or stdin
    #[error("No input provided. Pass an expression or pipe one to stdin.")]
    NoInput,
}
