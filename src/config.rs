//! Parser and converter options, loadable from a TOML file.
//!
//! ```toml
//! [parser]
//! usermacros = true
//! lldmacros = true
//! max_depth = 32
//!
//! [converter]
//! preserve_references = true
//! key_mode = "simple_checks"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default limit for nested braces, function calls and key arrays.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How item keys are tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    /// `key[param,...]`
    #[default]
    Standard,
    /// Legacy simple checks such as `ssh,21`: the comma belongs to the key and
    /// bracket parameters are not recognised.
    SimpleChecks,
}

/// Grammar switches for [`ExpressionParser`](crate::ExpressionParser).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParserOptions {
    /// `{$MACRO}` and `{$MACRO:context}`
    #[serde(default)]
    pub usermacros: bool,
    /// `{#MACRO}` and `{{#MACRO}.func(...)}`
    #[serde(default)]
    pub lldmacros: bool,
    /// `{123}` function-id macros; history functions are rejected.
    #[serde(default)]
    pub collapsed_expression: bool,
    /// `*` as query host or item key.
    #[serde(default)]
    pub calculated: bool,
    /// `{HOST.HOST}` as query host.
    #[serde(default)]
    pub host_macro: bool,
    /// `//key` queries without a host.
    #[serde(default)]
    pub empty_host: bool,
    /// `{host:key.func(params)}` anchors.
    #[serde(default)]
    pub legacy_functions: bool,
    /// `{func(params)}` anchors bound to a host and item supplied by the caller.
    #[serde(default)]
    pub legacy_short_form: bool,
    #[serde(default)]
    pub key_mode: KeyMode,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            usermacros: false,
            lldmacros: false,
            collapsed_expression: false,
            calculated: false,
            host_macro: false,
            empty_host: false,
            legacy_functions: false,
            legacy_short_form: false,
            key_mode: KeyMode::Standard,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserOptions {
    /// Options accepting everything a pre-conversion trigger may contain.
    pub fn legacy() -> Self {
        ParserOptions {
            usermacros: true,
            lldmacros: true,
            legacy_functions: true,
            ..ParserOptions::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConverterOptions {
    /// Append `(last(q)<>last(q))` disjuncts for references a rewrite drops.
    #[serde(default = "default_preserve_references")]
    pub preserve_references: bool,
    /// Key mode used when reading legacy anchors.
    #[serde(default)]
    pub key_mode: KeyMode,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_preserve_references() -> bool {
    true
}

impl Default for ConverterOptions {
    fn default() -> Self {
        ConverterOptions {
            preserve_references: true,
            key_mode: KeyMode::Standard,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserOptions,
    #[serde(default)]
    pub converter: ConverterOptions,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_toml_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
