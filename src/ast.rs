//! # Expression data model
//!
//! A parsed expression is an ordered list of [`Token`]s. Operands that have
//! inner structure (function calls and their parameters) own their children
//! by value, so the whole result is a tree without back-references.
//!
//! - **[tokens]** - tokens, spans and operators
//! - **[function]** - function calls and their parameters
//! - **[query]** - `/host/key` references
//! - **[period]** - `<sec|#count>[:<time_shift>]` windows
//! - **[result]** - parse outcomes and the [`ExpressionResult`] root
//! - **[group]** - the AND/OR grouping built by [`crate::tree`]
//!
//! ```text
//! last(/host/key,#5:now-1h) > 0 and {$LIMIT} <> 1
//! ```
//!
//! parses to a `Function`, an `Operator`, a `Number`, an `Operator`, a
//! `UserMacro`, an `Operator` and a `Number` token.

pub mod function;
pub mod group;
pub mod period;
pub mod query;
pub mod result;
pub mod tokens;

pub use function::{FunctionCall, FunctionKind, Parameter, ParameterKind};
pub use group::{ExpressionGroup, ExpressionNode, GroupOperator, LeafExpression};
pub use period::Period;
pub use query::Query;
pub use result::{ExpressionResult, ItemsByHost, ParseOutcome, ParseStatus};
pub use tokens::{Operator, Span, Token, TokenKind, TokenType};
