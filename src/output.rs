//! JSON rendering of parse outcomes, tokens and expression trees.
//!
//! The layout mirrors the data model: every token carries its `type`, `pos`,
//! `length` and `match`, and function tokens add their name, kind and
//! parameters.
//!
//! # Examples
//!
//! ```
//! use trigger_expr::{ExpressionParser, ParserOptions};
//! use trigger_expr::output::{outcome_to_json, to_json};
//!
//! let outcome = ExpressionParser::new(ParserOptions::default()).parse("1 + 2");
//! let json = outcome_to_json(&outcome, false);
//! assert_eq!(json["status"], "success");
//! assert_eq!(json["tokens"][1]["match"], "+");
//! assert!(to_json(&json, false).unwrap().starts_with('{'));
//! ```

use serde_json::{json, Map, Value};

use crate::ast::{
    ExpressionNode, ExpressionResult, FunctionCall, FunctionKind, GroupOperator, Parameter,
    ParameterKind, ParseOutcome, Token, TokenKind,
};

pub fn to_json(value: &Value, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// `{status, match, length, error, tokens}`, plus `tree` when asked for.
pub fn outcome_to_json(outcome: &ParseOutcome, with_tree: bool) -> Value {
    let mut object = Map::new();
    object.insert("status".into(), json!(outcome.status().as_str()));
    object.insert(
        "error".into(),
        outcome
            .error()
            .map_or(Value::Null, |e| json!({ "message": e.message, "position": e.position })),
    );

    match outcome.result() {
        Some(result) => {
            object.insert("match".into(), json!(result.match_text()));
            object.insert("length".into(), json!(result.length()));
            object.insert("tokens".into(), tokens_to_json(result.tokens()));
            if with_tree {
                let tree = result.tree().map_or(Value::Null, |node| tree_to_json(&node));
                object.insert("tree".into(), tree);
            }
        }
        None => {
            object.insert("match".into(), Value::Null);
            object.insert("length".into(), json!(0));
            object.insert("tokens".into(), json!([]));
        }
    }
    Value::Object(object)
}

/// Hosts, items grouped by host, and every function call of a result.
pub fn views_to_json(result: &ExpressionResult) -> Value {
    json!({
        "hosts": result.hosts(),
        "items": result.items_by_host(),
        "functions": result.functions().iter().map(function_to_json).collect::<Vec<_>>(),
        "user_macros": result.user_macros(),
        "function_ids": result.function_ids(),
    })
}

pub fn tokens_to_json(tokens: &[Token]) -> Value {
    Value::Array(tokens.iter().map(token_to_json).collect())
}

pub fn token_to_json(token: &Token) -> Value {
    let mut object = Map::new();
    object.insert("type".into(), json!(token.token_type().as_str()));
    object.insert("pos".into(), json!(token.span.pos));
    object.insert("length".into(), json!(token.span.length));
    object.insert("match".into(), json!(token.text));

    match &token.kind {
        TokenKind::Operator(operator) => {
            object.insert("operator".into(), json!(operator.as_str()));
        }
        TokenKind::Number { suffix } => {
            object.insert("suffix".into(), json!(suffix.map(String::from)));
            if let Some(value) = token.number_value() {
                object.insert("value".into(), json!(value.to_string()));
            }
        }
        TokenKind::String => {
            object.insert("value".into(), json!(token.string_value()));
        }
        TokenKind::FunctionIdMacro { index } => {
            object.insert("index".into(), json!(index));
        }
        TokenKind::Function(call) => {
            object.insert("function".into(), function_to_json(call));
        }
        TokenKind::Expression(children) => {
            object.insert("tokens".into(), tokens_to_json(children));
        }
        _ => {}
    }
    Value::Object(object)
}

pub fn function_to_json(call: &FunctionCall) -> Value {
    let kind = match call.kind {
        FunctionKind::History => "history",
        FunctionKind::Math => "math",
        FunctionKind::Legacy => "legacy",
    };
    json!({
        "name": call.name,
        "kind": kind,
        "parameters": call.parameters.iter().map(parameter_to_json).collect::<Vec<_>>(),
    })
}

fn parameter_to_json(parameter: &Parameter) -> Value {
    let mut object = Map::new();
    object.insert("type".into(), json!(parameter.token_type().as_str()));
    object.insert("pos".into(), json!(parameter.span.pos));
    object.insert("length".into(), json!(parameter.span.length));
    object.insert("match".into(), json!(parameter.text));

    match &parameter.kind {
        ParameterKind::Quoted => {
            object.insert("value".into(), json!(parameter.value()));
        }
        ParameterKind::Unquoted => {}
        ParameterKind::Query(query) => {
            object.insert("host".into(), json!(query.host));
            object.insert("item".into(), json!(query.item_key));
            if let Some(filter) = &query.filter {
                object.insert("filter".into(), json!(filter));
            }
        }
        ParameterKind::Period(period) => {
            object.insert("sec_num".into(), json!(period.sec_or_count));
            object.insert("time_shift".into(), json!(period.time_shift));
            object.insert("sec_num_contains_macros".into(), json!(period.sec_or_count_has_macro));
            object.insert("time_shift_contains_macros".into(), json!(period.time_shift_has_macro));
        }
        ParameterKind::Expression(tokens) => {
            object.insert("tokens".into(), tokens_to_json(tokens));
        }
    }
    Value::Object(object)
}

pub fn tree_to_json(node: &ExpressionNode) -> Value {
    match node {
        ExpressionNode::Group(group) => {
            let operator = match group.operator {
                GroupOperator::And => "and",
                GroupOperator::Or => "or",
            };
            json!({
                "operator": operator,
                "elements": group.elements.iter().map(tree_to_json).collect::<Vec<_>>(),
            })
        }
        ExpressionNode::Leaf(leaf) => json!({
            "pos": leaf.span.pos,
            "length": leaf.span.length,
            "tokens": [leaf.tokens.start, leaf.tokens.end],
            "nested": leaf.nested.as_deref().map(tree_to_json),
        }),
    }
}
