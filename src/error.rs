//! Error types shared by the parsers, the converter and the configuration loader.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A parse failure at a character offset of the source.
///
/// Carried by [`ParseOutcome::SuccessContinuable`](crate::ParseOutcome) and
/// [`ParseOutcome::Fail`](crate::ParseOutcome) as well as by the standalone
/// item key, period and parameter list parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }

    /// `incorrect expression starting from "<remainder>"`
    pub(crate) fn incorrect_expression(input: &[char], position: usize) -> Self {
        let remainder: String = input[position.min(input.len())..].iter().collect();
        ParseError::new(
            format!("incorrect expression starting from \"{}\"", remainder),
            position,
        )
    }

    /// Error for the standalone sub-parsers: `incorrect syntax near "<remainder>"`,
    /// or `unexpected end of input` when nothing is left.
    pub(crate) fn incorrect_syntax(input: &[char], position: usize) -> Self {
        if position >= input.len() {
            return ParseError::new("unexpected end of input", position);
        }
        let remainder: String = input[position..].iter().collect();
        ParseError::new(format!("incorrect syntax near \"{}\"", remainder), position)
    }

    pub(crate) fn too_deep(max_depth: usize, position: usize) -> Self {
        ParseError::new(
            format!("maximum nesting depth of {} exceeded", max_depth),
            position,
        )
    }
}

/// Which of the paired trigger fields an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Expression,
    RecoveryExpression,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Expression => write!(f, "expression"),
            Field::RecoveryExpression => write!(f, "recovery expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("cannot parse {field}: {source}")]
    Parse { field: Field, source: ParseError },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}
