use std::fmt;

use crate::ast::period::Period;
use crate::ast::query::Query;
use crate::ast::result::{for_each_function, ItemsByHost};
use crate::ast::tokens::{Span, Token, TokenType};
use crate::lexer;

/// How a call was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// `name(/host/key, ...)`
    History,
    /// `name(expression, ...)`
    Math,
    /// `{host:key.name(...)}`, or `{name(...)}` when bound to a caller-supplied item
    Legacy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub kind: FunctionKind,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub span: Span,
    pub text: String,
    pub kind: ParameterKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    Quoted,
    /// Raw text up to the next delimiter; may be empty.
    Unquoted,
    Query(Query),
    Period(Period),
    /// Math function argument. Nested calls arrive as `Function` tokens inside.
    Expression(Vec<Token>),
}

impl Parameter {
    pub fn new(kind: ParameterKind, span: Span, text: impl Into<String>) -> Self {
        Parameter {
            span,
            text: text.into(),
            kind,
        }
    }

    /// The parameter with quotes stripped and `\"` un-escaped.
    pub fn value(&self) -> String {
        match self.kind {
            ParameterKind::Quoted => lexer::unquote_param(&self.text),
            _ => self.text.clone(),
        }
    }

    pub fn is_quoted(&self) -> bool {
        matches!(self.kind, ParameterKind::Quoted)
    }

    pub fn token_type(&self) -> TokenType {
        match self.kind {
            ParameterKind::Quoted | ParameterKind::Unquoted => TokenType::String,
            ParameterKind::Query(_) => TokenType::Query,
            ParameterKind::Period(_) => TokenType::Period,
            ParameterKind::Expression(_) => TokenType::Expression,
        }
    }
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, kind: FunctionKind, parameters: Vec<Parameter>) -> Self {
        FunctionCall {
            name: name.into(),
            kind,
            parameters,
        }
    }

    /// The query of a history or legacy call.
    pub fn query(&self) -> Option<&Query> {
        match self.parameters.first().map(|p| &p.kind) {
            Some(ParameterKind::Query(query)) => Some(query),
            _ => None,
        }
    }

    /// Parameters after the query, if the call has one.
    pub fn arguments(&self) -> &[Parameter] {
        match self.query() {
            Some(_) => &self.parameters[1..],
            None => &self.parameters,
        }
    }

    /// This call followed by every call nested in its parameters.
    pub fn calls(&self) -> Vec<&FunctionCall> {
        let mut calls = vec![self];
        for parameter in &self.parameters {
            if let ParameterKind::Expression(tokens) = &parameter.kind {
                for_each_function(tokens, &mut |call| calls.push(call));
            }
        }
        calls
    }

    /// Distinct hosts referenced by this call and its nested calls.
    pub fn hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = Vec::new();
        for query in self.calls().into_iter().filter_map(FunctionCall::query) {
            if !hosts.contains(&query.host) {
                hosts.push(query.host.clone());
            }
        }
        hosts
    }

    pub fn items_by_host(&self) -> ItemsByHost {
        let mut items = ItemsByHost::new();
        for query in self.calls().into_iter().filter_map(FunctionCall::query) {
            items
                .entry(query.host.clone())
                .or_default()
                .insert(query.item_key.clone());
        }
        items
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arguments: Vec<&str> = self.arguments().iter().map(|p| p.text.as_str()).collect();
        match (self.kind, self.query()) {
            (FunctionKind::Legacy, Some(query)) => write!(
                f,
                "{{{}:{}.{}({})}}",
                query.host,
                query.item_key,
                self.name,
                arguments.join(",")
            ),
            (FunctionKind::Legacy, None) => {
                write!(f, "{{{}({})}}", self.name, arguments.join(","))
            }
            (_, Some(query)) if arguments.is_empty() => write!(f, "{}({})", self.name, query),
            (_, Some(query)) => write!(f, "{}({},{})", self.name, query, arguments.join(",")),
            (_, None) => write!(f, "{}({})", self.name, arguments.join(",")),
        }
    }
}
