// tests/cli_tests.rs

use serde_json::json;
use trigger_expr::cli::{execute_check, execute_convert, CheckOptions, CliError, ConvertOptions};
use trigger_expr::output::{to_json, tree_to_json};
use trigger_expr::{
    Config, ConverterOptions, ExpressionParser, KeyMode, ParseStatus, ParserOptions,
};

fn check(expression: &str, parser: ParserOptions) -> serde_json::Value {
    let options = CheckOptions {
        expression: expression.to_string(),
        parser,
        tree: true,
        views: true,
    };
    execute_check(&options).unwrap().output
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_check_success_output() {
    let output = check("last(/h/k) > 5", ParserOptions::default());
    assert_eq!(output["status"], "success");
    assert_eq!(output["error"], serde_json::Value::Null);
    assert_eq!(output["match"], "last(/h/k) > 5");
    assert_eq!(output["length"], 14);

    let function = &output["tokens"][0];
    assert_eq!(function["type"], "function");
    assert_eq!(function["function"]["kind"], "history");
    assert_eq!(function["function"]["name"], "last");
    assert_eq!(function["function"]["parameters"][0]["host"], "h");
    assert_eq!(function["function"]["parameters"][0]["item"], "k");

    assert_eq!(output["tokens"][1]["operator"], ">");
    assert_eq!(output["tokens"][2]["value"], "5");
    assert_eq!(output["tree"]["pos"], 0);
    assert_eq!(output["tree"]["length"], 14);
}

#[test]
fn test_check_views() {
    let output = check(
        "avg(/h1/k1,5m) > {$MAX} or last(/h2/k2) = 0",
        ParserOptions {
            usermacros: true,
            ..ParserOptions::default()
        },
    );
    assert_eq!(output["hosts"], json!(["h1", "h2"]));
    assert_eq!(output["items"], json!({ "h1": ["k1"], "h2": ["k2"] }));
    assert_eq!(output["user_macros"], json!(["{$MAX}"]));
    assert_eq!(output["functions"][0]["parameters"][1]["sec_num"], "5m");
    assert_eq!(output["tree"]["operator"], "or");
}

#[test]
fn test_check_query_filter() {
    let output = check(
        "sum(/*/net.if.in?[group = \"Routers\"],5m) > 0",
        ParserOptions {
            calculated: true,
            ..ParserOptions::default()
        },
    );
    assert_eq!(output["status"], "success");
    let query = &output["tokens"][0]["function"]["parameters"][0];
    assert_eq!(query["host"], "*");
    assert_eq!(query["item"], "net.if.in");
    assert_eq!(query["filter"], "group = \"Routers\"");

    let output = check("last(/h/k) > 5", ParserOptions::default());
    assert!(output["tokens"][0]["function"]["parameters"][0].get("filter").is_none());
}

#[test]
fn test_check_continuable() {
    let options = CheckOptions {
        expression: "1 + 2 )".to_string(),
        ..CheckOptions::default()
    };
    let result = execute_check(&options).unwrap();
    assert!(!result.is_success());
    assert_eq!(result.status, ParseStatus::SuccessContinuable);
    assert_eq!(result.output["match"], "1 + 2");
    assert_eq!(result.output["error"]["position"], 6);
    assert_eq!(
        result.output["error"]["message"],
        "incorrect expression starting from \")\""
    );
}

#[test]
fn test_check_fail() {
    let options = CheckOptions {
        expression: "and 1".to_string(),
        views: true,
        ..CheckOptions::default()
    };
    let result = execute_check(&options).unwrap();
    assert_eq!(result.status, ParseStatus::Fail);
    assert_eq!(result.output["match"], serde_json::Value::Null);
    assert_eq!(result.output["tokens"], json!([]));
    assert!(result.output.get("hosts").is_none());
}

#[test]
fn test_check_collapsed_function_ids() {
    let output = check(
        "{12} > 0 and {7} = 1",
        ParserOptions {
            collapsed_expression: true,
            ..ParserOptions::default()
        },
    );
    assert_eq!(output["tokens"][0]["type"], "function_id_macro");
    assert_eq!(output["tokens"][0]["index"], 12);
    assert_eq!(output["function_ids"], json!([12, 7]));
}

// ============================================================================
// Convert
// ============================================================================

#[test]
fn test_convert_paired_fields() {
    let options = ConvertOptions {
        expression: "{h:k.now()}>0".to_string(),
        recovery_expression: Some("{h:k.last()}=0".to_string()),
        ..ConvertOptions::default()
    };
    let output = execute_convert(&options).unwrap();
    assert_eq!(output["expression"], "now()>0");
    assert_eq!(output["recovery_expression"], "last(/h/k)=0");
}

#[test]
fn test_convert_short_form() {
    let options = ConvertOptions {
        expression: "{avg(300)}>1".to_string(),
        host: Some("srv".to_string()),
        item: Some("cpu.load".to_string()),
        ..ConvertOptions::default()
    };
    let output = execute_convert(&options).unwrap();
    assert_eq!(output["expression"], "avg(/srv/cpu.load,300s)>1");
}

#[test]
fn test_convert_warning_output() {
    let options = ConvertOptions {
        expression: "{h:k.mystery()}=0".to_string(),
        ..ConvertOptions::default()
    };
    let output = execute_convert(&options).unwrap();
    assert_eq!(output["warnings"][0]["field"], "expression");
    assert_eq!(output["warnings"][0]["function"], "mystery");
}

#[test]
fn test_convert_without_input() {
    assert!(matches!(
        execute_convert(&ConvertOptions::default()),
        Err(CliError::NoInput)
    ));
}

#[test]
fn test_convert_error_message() {
    let options = ConvertOptions {
        expression: "{h:k.last()}=0".to_string(),
        recovery_expression: Some("{h:k.last(}".to_string()),
        converter: ConverterOptions::default(),
        ..ConvertOptions::default()
    };
    let error = execute_convert(&options).unwrap_err();
    assert!(error.to_string().starts_with("Conversion error: cannot parse recovery expression"));
}

// ============================================================================
// Config and output
// ============================================================================

#[test]
fn test_config_drives_both_commands() {
    let config = Config::from_toml_str(
        "[parser]\ncollapsed_expression = true\nmax_depth = 8\n\n[converter]\nkey_mode = \"simple_checks\"\n",
    )
    .unwrap();
    assert!(config.parser.collapsed_expression);
    assert_eq!(config.parser.max_depth, 8);
    assert_eq!(config.converter.key_mode, KeyMode::SimpleChecks);
    assert!(config.converter.preserve_references);

    let options = ConvertOptions {
        expression: "{h:tcp,80.last()}=0".to_string(),
        converter: config.converter,
        ..ConvertOptions::default()
    };
    assert_eq!(execute_convert(&options).unwrap()["expression"], "last(/h/tcp,80)=0");
}

#[test]
fn test_missing_config_file() {
    let error = Config::load("/nonexistent/trigex.toml").unwrap_err();
    assert!(error.to_string().contains("/nonexistent/trigex.toml"));
}

#[test]
fn test_pretty_json() {
    let result = ExpressionParser::default()
        .parse("1 or 2")
        .into_result()
        .unwrap();
    let tree = tree_to_json(&result.tree().unwrap());

    let compact = to_json(&tree, false).unwrap();
    let pretty = to_json(&tree, true).unwrap();
    assert!(!compact.contains('\n'));
    assert!(pretty.contains("\n  \"operator\": \"or\""));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&pretty).unwrap(),
        tree
    );
}
