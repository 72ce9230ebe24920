// tests/property_tests.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trigger_expr::lexer::quote_string;
use trigger_expr::{
    ConvertRequest, ConverterOptions, ExpressionParser, LegacyConverter, ParameterKind,
    ParserOptions, Span, Token, TokenKind,
};

const HOSTS: [&str; 4] = ["h1", "web 02", "db.example.com", "Zabbix_server"];
const KEYS: [&str; 4] = ["agent.ping", "net.if.in[eth0]", "vfs.fs.size[/,pfree]", "log[\"a,b\"]"];

const FUNCTIONS: [(&str, &str); 25] = [
    ("last", ""),
    ("last", "#2"),
    ("last", "60,86400"),
    ("avg", "5m"),
    ("min", "300,3600"),
    ("diff", ""),
    ("prev", ""),
    ("abschange", ""),
    ("change", ""),
    ("count", "600,err,eq"),
    ("str", "error"),
    ("regexp", "\"^a\",#2"),
    ("nodata", "5m"),
    ("date", ""),
    ("now", ""),
    ("dayofweek", ""),
    ("time", ""),
    ("band", "#1,12"),
    ("strlen", ""),
    ("delta", "1h"),
    ("trendavg", "1M,now/M"),
    ("logeventid", ""),
    ("fuzzytime", "60"),
    ("percentile", "1h,,95"),
    ("timeleft", "1h,,100"),
];

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

fn legacy_term(rng: &mut StdRng, pairs: usize) -> String {
    let host = HOSTS[rng.gen_range(0..pairs.min(HOSTS.len()))];
    let key = pick(rng, &KEYS);
    let (name, args) = FUNCTIONS[rng.gen_range(0..FUNCTIONS.len())];
    let comparison = pick(rng, &[">", "<", "=", "<>", ">="]);
    let value = rng.gen_range(0..100);
    format!("{{{host}:{key}.{name}({args})}}{comparison}{value}")
}

fn legacy_expression(rng: &mut StdRng, pairs: usize) -> String {
    let terms = rng.gen_range(1..5);
    let mut out = String::new();
    for index in 0..terms {
        if index > 0 {
            out.push_str(pick(rng, &[" and ", " or ", "\nor\n"]));
        }
        let term = legacy_term(rng, pairs);
        if rng.gen_bool(0.25) {
            out.push_str(&format!("({term})"));
        } else {
            out.push_str(&term);
        }
    }
    out
}

fn pairs_of(source: &str, options: ParserOptions) -> Vec<(String, String)> {
    ExpressionParser::new(options)
        .parse(source)
        .into_result()
        .unwrap_or_else(|e| panic!("{source:?} did not parse: {e}"))
        .pairs()
        .to_vec()
}

fn modern_options() -> ParserOptions {
    ParserOptions {
        usermacros: true,
        lldmacros: true,
        ..ParserOptions::default()
    }
}

// ============================================================================
// Reference superset
// ============================================================================

#[test]
fn test_conversion_keeps_every_reference() {
    let mut rng = StdRng::seed_from_u64(0x7219);
    let converter = LegacyConverter::new(ConverterOptions::default());

    for _ in 0..300 {
        let pairs = rng.gen_range(1..=HOSTS.len());
        let source = legacy_expression(&mut rng, pairs);
        let before = pairs_of(&source, ParserOptions::legacy());

        let converted = converter.convert_expression(&source).unwrap();
        let after = pairs_of(&converted, modern_options());
        for pair in &before {
            assert!(after.contains(pair), "{pair:?} lost converting {source:?} to {converted:?}");
        }
    }
}

#[test]
fn test_paired_conversion_keeps_every_reference() {
    let mut rng = StdRng::seed_from_u64(42);
    let converter = LegacyConverter::new(ConverterOptions::default());

    for _ in 0..200 {
        let pairs = rng.gen_range(1..=HOSTS.len());
        let expression = legacy_expression(&mut rng, pairs);
        let recovery = legacy_expression(&mut rng, pairs);

        let mut before = pairs_of(&expression, ParserOptions::legacy());
        before.extend(pairs_of(&recovery, ParserOptions::legacy()));

        let request = ConvertRequest::new(expression.as_str()).with_recovery(recovery.as_str());
        let converted = converter.convert(&request).unwrap();
        let recovery_text = converted.recovery_expression.unwrap_or_default();
        let mut after = pairs_of(&converted.expression, modern_options());
        after.extend(pairs_of(&recovery_text, modern_options()));

        for pair in &before {
            assert!(
                after.contains(pair),
                "{pair:?} lost converting {expression:?} / {recovery:?}"
            );
        }
    }
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_converted_output_converts_to_itself() {
    let mut rng = StdRng::seed_from_u64(7);
    let converter = LegacyConverter::new(ConverterOptions::default());

    for _ in 0..200 {
        let source = legacy_expression(&mut rng, 3);
        let once = converter.convert_expression(&source).unwrap();
        let twice = converter.convert_expression(&once).unwrap();
        assert_eq!(once, twice, "converting {source:?}");
    }
}

// ============================================================================
// Spans
// ============================================================================

fn check_tokens(chars: &[char], tokens: &[Token], parent: Span) {
    for token in tokens {
        let text: String = chars[token.span.pos..token.span.end()].iter().collect();
        assert_eq!(text, token.text);
        assert!(parent.contains(&token.span), "{token:?} outside {parent:?}");

        if let TokenKind::Function(call) = &token.kind {
            for parameter in &call.parameters {
                let text: String = chars[parameter.span.pos..parameter.span.end()]
                    .iter()
                    .collect();
                assert_eq!(text, parameter.text);
                assert!(token.span.contains(&parameter.span));
                if let ParameterKind::Expression(children) = &parameter.kind {
                    check_tokens(chars, children, parameter.span);
                }
            }
        }
    }
}

#[test]
fn test_spans_match_source() {
    let mut rng = StdRng::seed_from_u64(1234);
    let converter = LegacyConverter::new(ConverterOptions::default());
    let legacy = ExpressionParser::new(ParserOptions::legacy());
    let modern = ExpressionParser::new(modern_options());

    for _ in 0..200 {
        let source = legacy_expression(&mut rng, 4);
        let converted = converter.convert_expression(&source).unwrap();

        for (parser, text) in [(&legacy, &source), (&modern, &converted)] {
            let result = parser.parse(text).into_result().unwrap();
            let chars: Vec<char> = text.chars().collect();
            check_tokens(&chars, result.tokens(), Span::new(0, chars.len()));
        }
    }
}

// ============================================================================
// Quoted parameters
// ============================================================================

#[test]
fn test_quoted_parameters_round_trip() {
    let mut rng = StdRng::seed_from_u64(99);
    let alphabet = ['a', 'Z', '"', ',', ')', ' ', '(', ']', '#', 'é'];
    let parser = ExpressionParser::default();

    for _ in 0..300 {
        let length = rng.gen_range(0..12);
        let value: String = (0..length)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect();
        let source = format!("count(/h/k,5m,{})>0", quote_string(&value));

        let result = parser.parse(&source).into_result().unwrap();
        let call = result.functions()[0].clone();
        assert!(call.parameters[2].is_quoted());
        assert_eq!(call.parameters[2].value(), value, "{source}");
    }
}
