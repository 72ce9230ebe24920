//! Converts expressions written with legacy `{host:key.func(...)}` anchors to
//! the `func(/host/key, ...)` syntax.
//!
//! Each anchor is rewritten in place; the surrounding text is copied as is.
//! Some rewrites drop the reference to their item (`{h:k.date()}` becomes
//! `date()`). When an `(host, item)` pair would vanish from both fields, a
//! disjunct that keeps it referenced without changing the result is appended:
//!
//! ```
//! use trigger_expr::{ConverterOptions, LegacyConverter};
//!
//! let converter = LegacyConverter::new(ConverterOptions::default());
//! let converted = converter
//!     .convert_expression("{Trapper:trap[1].dayofweek()} > 0")
//!     .unwrap();
//! assert_eq!(
//!     converted,
//!     "(dayofweek() > 0) or (last(/Trapper/trap[1])<>last(/Trapper/trap[1]))"
//! );
//! ```

pub mod legacy;
pub(crate) mod references;
pub(crate) mod rewrite;

use serde::Serialize;
use tracing::debug;

use crate::ast::{FunctionKind, Query};
use crate::config::{ConverterOptions, ParserOptions};
use crate::error::{ConvertError, Field};
use crate::parser::period::PeriodParser;
use crate::parser::ExpressionParser;
use rewrite::{Rewritten, Rewriter};

pub use legacy::{LegacyFunction, Shape, Strategy, Structure};

/// The paired trigger fields to convert, with the item short-form calls
/// (`{last()}`) refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertRequest {
    pub expression: String,
    pub recovery_expression: Option<String>,
    pub host: Option<String>,
    pub item: Option<String>,
}

impl ConvertRequest {
    pub fn new(expression: impl Into<String>) -> Self {
        ConvertRequest {
            expression: expression.into(),
            ..ConvertRequest::default()
        }
    }

    pub fn with_recovery(mut self, recovery_expression: impl Into<String>) -> Self {
        self.recovery_expression = Some(recovery_expression.into());
        self
    }

    pub fn with_context(mut self, host: impl Into<String>, item: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self.item = Some(item.into());
        self
    }

    fn context(&self) -> Option<Query> {
        match (&self.host, &self.item) {
            (Some(host), Some(item)) => Some(Query::new(host.as_str(), item.as_str())),
            _ => None,
        }
    }
}

/// A non-fatal problem met while converting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertWarning {
    pub field: Field,
    pub function: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Converted {
    pub expression: String,
    pub recovery_expression: Option<String>,
    pub warnings: Vec<ConvertWarning>,
}

/// Per-field state between rewriting and reference restoration.
struct FieldConversion {
    /// Pairs the input referenced.
    before: Vec<(String, String)>,
    rewritten: Rewritten,
}

#[derive(Debug, Clone, Default)]
pub struct LegacyConverter {
    options: ConverterOptions,
}

impl LegacyConverter {
    pub fn new(options: ConverterOptions) -> Self {
        LegacyConverter { options }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Convert a single expression.
    pub fn convert_expression(&self, expression: &str) -> Result<String, ConvertError> {
        self.convert(&ConvertRequest::new(expression))
            .map(|converted| converted.expression)
    }

    /// Convert both fields; pairs are checked across the two jointly.
    pub fn convert(&self, request: &ConvertRequest) -> Result<Converted, ConvertError> {
        let context = request.context();
        let options = self.legacy_options(context.is_some());

        let expression =
            self.convert_field(Field::Expression, &request.expression, context.as_ref(), &options)?;
        let recovery = request
            .recovery_expression
            .as_deref()
            .map(|text| {
                self.convert_field(Field::RecoveryExpression, text, context.as_ref(), &options)
            })
            .transpose()?;

        let mut before: Vec<(String, String)> = Vec::new();
        let mut after: Vec<(String, String)> = Vec::new();
        for field in std::iter::once(&expression).chain(recovery.as_ref()) {
            extend_distinct(&mut before, &field.before);
            extend_distinct(&mut after, &field.rewritten.pairs);
        }

        let mut warnings = expression.rewritten.warnings.clone();
        let mut expression_text = expression.rewritten.text;
        let mut recovery_text = recovery.map(|field| {
            warnings.extend(field.rewritten.warnings);
            field.rewritten.text
        });

        let missing = references::missing_pairs(&before, &after);
        if self.options.preserve_references && !missing.is_empty() {
            let parser = ExpressionParser::new(self.modern_options());
            if !expression_text.trim().is_empty() {
                expression_text = references::append_references(&expression_text, &missing, &parser);
            } else if let Some(text) = recovery_text.as_mut().filter(|text| !text.trim().is_empty()) {
                *text = references::append_references(text, &missing, &parser);
            }
        }

        Ok(Converted {
            expression: expression_text,
            recovery_expression: recovery_text,
            warnings,
        })
    }

    fn convert_field(
        &self,
        field: Field,
        text: &str,
        context: Option<&Query>,
        options: &ParserOptions,
    ) -> Result<FieldConversion, ConvertError> {
        if text.trim().is_empty() {
            return Ok(FieldConversion {
                before: Vec::new(),
                rewritten: Rewritten {
                    text: text.to_string(),
                    ..Rewritten::default()
                },
            });
        }

        let result = ExpressionParser::new(options.clone())
            .parse(text)
            .into_result()
            .map_err(|source| ConvertError::Parse { field, source })?;

        let mut before = result.pairs().to_vec();
        let short_form = result
            .functions()
            .iter()
            .any(|call| call.kind == FunctionKind::Legacy && call.query().is_none());
        if let Some(context) = context.filter(|_| short_form) {
            extend_distinct(&mut before, &[context.pair()]);
        }

        let rewritten = Rewriter::new(field, context, PeriodParser::new(options.clone())).rewrite(
            result.source(),
            result.tokens(),
            result.pos(),
            result.pos() + result.length(),
        );
        debug!(%field, before = before.len(), after = rewritten.pairs.len(), "converted field");
        Ok(FieldConversion { before, rewritten })
    }

    fn legacy_options(&self, short_form: bool) -> ParserOptions {
        ParserOptions {
            legacy_short_form: short_form,
            key_mode: self.options.key_mode,
            max_depth: self.options.max_depth,
            ..ParserOptions::legacy()
        }
    }

    fn modern_options(&self) -> ParserOptions {
        ParserOptions {
            usermacros: true,
            lldmacros: true,
            max_depth: self.options.max_depth,
            ..ParserOptions::default()
        }
    }
}

fn extend_distinct(pairs: &mut Vec<(String, String)>, more: &[(String, String)]) {
    for pair in more {
        if !pairs.contains(pair) {
            pairs.push(pair.clone());
        }
    }
}
