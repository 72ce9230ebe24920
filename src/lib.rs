//! Parser for trigger and calculated item expressions, with a converter from
//! the legacy `{host:key.func(params)}` syntax.
//!
//! ```
//! use trigger_expr::{ExpressionParser, ParseStatus, ParserOptions};
//!
//! let source = "avg(/web01/net.if.in[eth0],5m) > {$LIMIT}";
//!
//! let outcome = ExpressionParser::new(ParserOptions::default()).parse(source);
//! assert_eq!(outcome.status(), ParseStatus::SuccessContinuable);
//! assert_eq!(outcome.result().unwrap().match_text(), "avg(/web01/net.if.in[eth0],5m)");
//!
//! let parser = ExpressionParser::new(ParserOptions {
//!     usermacros: true,
//!     ..ParserOptions::default()
//! });
//! let result = parser.parse(source).into_result().unwrap();
//! assert_eq!(result.hosts(), ["web01"]);
//! assert_eq!(result.user_macros(), ["{$LIMIT}"]);
//! ```

pub mod ast;
pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod tree;

pub use ast::{
    ExpressionGroup, ExpressionNode, ExpressionResult, FunctionCall, FunctionKind, GroupOperator,
    ItemsByHost, LeafExpression, Operator, Parameter, ParameterKind, ParseOutcome, ParseStatus,
    Period, Query, Span, Token, TokenKind, TokenType,
};
pub use config::{Config, ConverterOptions, KeyMode, ParserOptions, DEFAULT_MAX_DEPTH};
pub use converter::{ConvertRequest, ConvertWarning, Converted, LegacyConverter, LegacyFunction};
pub use error::{ConfigError, ConvertError, Field, ParseError};
pub use parser::item_key::{ItemKey, ItemKeyParser};
pub use parser::params::{Delimiters, KeyParamType, KeyParameter, ParamListParser, ParameterList};
pub use parser::period::PeriodParser;
pub use parser::ExpressionParser;
