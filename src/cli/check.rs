//! Parse an expression and report the outcome as JSON

use super::CliError;
use crate::output;
use crate::{ExpressionParser, ParseStatus, ParserOptions};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The expression to parse
    pub expression: String,
    pub parser: ParserOptions,
    /// Include the AND/OR tree
    pub tree: bool,
    /// Include hosts, items and functions
    pub views: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub struct CheckResult {
    pub status: ParseStatus,
    pub output: serde_json::Value,
}

impl CheckResult {
    pub fn is_success(&self) -> bool {
        self.status == ParseStatus::Success
    }
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    if options.expression.is_empty() {
        return Err(CliError::NoInput);
    }

    let parser = ExpressionParser::new(options.parser.clone());
    let outcome = parser.parse(&options.expression);
    let mut json = output::outcome_to_json(&outcome, options.tree);

    if options.views {
        if let (Some(result), serde_json::Value::Object(object)) = (outcome.result(), &mut json) {
            if let serde_json::Value::Object(views) = output::views_to_json(result) {
                object.extend(views);
            }
        }
    }

    Ok(CheckResult {
        status: outcome.status(),
        output: json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_reports_views() {
        let options = CheckOptions {
            expression: "last(/host/key) > 0".to_string(),
            views: true,
            ..CheckOptions::default()
        };
        let result = execute_check(&options).unwrap();
        assert!(result.is_success());
        assert_eq!(result.output["hosts"][0], "host");
        assert_eq!(result.output["functions"][0]["name"], "last");
    }

    #[test]
    fn test_check_without_expression() {
        assert!(matches!(
            execute_check(&CheckOptions::default()),
            Err(CliError::NoInput)
        ));
    }
}
