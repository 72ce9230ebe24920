//! Convert legacy expressions

use super::CliError;
use crate::{ConvertRequest, Converted, ConverterOptions, LegacyConverter};

/// Options for the convert command
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub expression: String,
    pub recovery_expression: Option<String>,
    /// Host bound to `{func()}` short-form calls
    pub host: Option<String>,
    /// Item key bound to `{func()}` short-form calls
    pub item: Option<String>,
    pub converter: ConverterOptions,
}

/// Execute a convert operation, returning the converted fields as JSON
pub fn execute_convert(options: &ConvertOptions) -> Result<serde_json::Value, CliError> {
    if options.expression.is_empty() && options.recovery_expression.is_none() {
        return Err(CliError::NoInput);
    }

    let request = ConvertRequest {
        expression: options.expression.clone(),
        recovery_expression: options.recovery_expression.clone(),
        host: options.host.clone(),
        item: options.item.clone(),
    };
    let converted: Converted = LegacyConverter::new(options.converter.clone()).convert(&request)?;
    Ok(serde_json::to_value(converted)?)
}
