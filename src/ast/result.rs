use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use crate::ast::function::{FunctionCall, FunctionKind, ParameterKind};
use crate::ast::group::ExpressionNode;
use crate::ast::tokens::{Token, TokenKind};
use crate::error::ParseError;
use crate::lexer::slice;
use crate::tree;

/// Item keys grouped by host name.
pub type ItemsByHost = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    Success,
    SuccessContinuable,
    Fail,
}

impl ParseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStatus::Success => "success",
            ParseStatus::SuccessContinuable => "success_continuable",
            ParseStatus::Fail => "fail",
        }
    }
}

/// Three-valued result of parsing an expression.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    /// Everything from the start offset was consumed.
    Success(ExpressionResult),
    /// A prefix parsed; `error` points at the first unconsumable character.
    SuccessContinuable {
        result: ExpressionResult,
        error: ParseError,
    },
    Fail(ParseError),
}

impl ParseOutcome {
    pub fn status(&self) -> ParseStatus {
        match self {
            ParseOutcome::Success(_) => ParseStatus::Success,
            ParseOutcome::SuccessContinuable { .. } => ParseStatus::SuccessContinuable,
            ParseOutcome::Fail(_) => ParseStatus::Fail,
        }
    }

    /// The parsed prefix, for both success variants.
    pub fn result(&self) -> Option<&ExpressionResult> {
        match self {
            ParseOutcome::Success(result) | ParseOutcome::SuccessContinuable { result, .. } => {
                Some(result)
            }
            ParseOutcome::Fail(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ParseError> {
        match self {
            ParseOutcome::Success(_) => None,
            ParseOutcome::SuccessContinuable { error, .. } | ParseOutcome::Fail(error) => {
                Some(error)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Success(_))
    }

    /// Strict view: only a full match is `Ok`.
    pub fn into_result(self) -> Result<ExpressionResult, ParseError> {
        match self {
            ParseOutcome::Success(result) => Ok(result),
            ParseOutcome::SuccessContinuable { error, .. } | ParseOutcome::Fail(error) => Err(error),
        }
    }
}

/// Root of a parsed expression: the token tree plus lazily built views.
#[derive(Debug, Clone)]
pub struct ExpressionResult {
    source: String,
    pos: usize,
    match_text: String,
    tokens: Vec<Token>,
    hosts: OnceLock<Vec<String>>,
    pairs: OnceLock<Vec<(String, String)>>,
    items_by_host: OnceLock<ItemsByHost>,
    functions: OnceLock<Vec<FunctionCall>>,
    function_ids: OnceLock<Vec<usize>>,
    user_macros: OnceLock<Vec<String>>,
}

impl ExpressionResult {
    pub(crate) fn new(source: String, pos: usize, match_text: String, tokens: Vec<Token>) -> Self {
        ExpressionResult {
            source,
            pos,
            match_text,
            tokens,
            hosts: OnceLock::new(),
            pairs: OnceLock::new(),
            items_by_host: OnceLock::new(),
            functions: OnceLock::new(),
            function_ids: OnceLock::new(),
            user_macros: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Offset the match starts at.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn match_text(&self) -> &str {
        &self.match_text
    }

    /// Length of the match in characters.
    pub fn length(&self) -> usize {
        self.match_text.chars().count()
    }

    /// Distinct hosts in order of first appearance.
    pub fn hosts(&self) -> &[String] {
        self.hosts.get_or_init(|| {
            let mut hosts: Vec<String> = Vec::new();
            for (host, _) in self.pairs() {
                if !hosts.contains(host) {
                    hosts.push(host.clone());
                }
            }
            hosts
        })
    }

    /// Distinct `(host, item key)` pairs in order of first appearance.
    pub fn pairs(&self) -> &[(String, String)] {
        self.pairs.get_or_init(|| {
            let mut pairs: Vec<(String, String)> = Vec::new();
            for query in self.functions().iter().filter_map(FunctionCall::query) {
                let pair = query.pair();
                if !pairs.contains(&pair) {
                    pairs.push(pair);
                }
            }
            pairs
        })
    }

    pub fn items_by_host(&self) -> &ItemsByHost {
        self.items_by_host.get_or_init(|| {
            let mut items = ItemsByHost::new();
            for (host, key) in self.pairs() {
                items.entry(host.clone()).or_default().insert(key.clone());
            }
            items
        })
    }

    /// Every function call, nested ones included, in source order.
    pub fn functions(&self) -> &[FunctionCall] {
        self.functions.get_or_init(|| {
            let mut functions = Vec::new();
            for_each_function(&self.tokens, &mut |call| functions.push(call.clone()));
            functions
        })
    }

    /// Indices referenced by `{N}` function-id macros.
    pub fn function_ids(&self) -> &[usize] {
        self.function_ids.get_or_init(|| {
            let mut ids = Vec::new();
            for_each_token(&self.tokens, &mut |token| {
                if let TokenKind::FunctionIdMacro { index } = token.kind {
                    ids.push(index);
                }
            });
            ids
        })
    }

    /// Distinct user macros in order of first appearance.
    pub fn user_macros(&self) -> &[String] {
        self.user_macros.get_or_init(|| {
            let mut macros: Vec<String> = Vec::new();
            for_each_token(&self.tokens, &mut |token| {
                if token.kind == TokenKind::UserMacro && !macros.contains(&token.text) {
                    macros.push(token.text.clone());
                }
            });
            macros
        })
    }

    /// AND/OR grouping of the top-level tokens. Rebuilt on every call.
    pub fn tree(&self) -> Option<ExpressionNode> {
        tree::build(&self.tokens)
    }

    /// Replace every history function with `{N}`, N indexing the returned list.
    pub fn collapse(&self) -> (String, Vec<FunctionCall>) {
        let chars: Vec<char> = self.source.chars().collect();
        let end = self.pos + self.length();
        let mut functions = Vec::new();
        let text = collapse_tokens(&chars, &self.tokens, self.pos, end, &mut functions);
        (text, functions)
    }
}

fn collapse_tokens(
    chars: &[char],
    tokens: &[Token],
    start: usize,
    end: usize,
    functions: &mut Vec<FunctionCall>,
) -> String {
    let mut out = String::new();
    let mut at = start;
    for token in tokens {
        out.push_str(&slice(chars, at, token.span.pos));
        match &token.kind {
            TokenKind::Function(call) if call.kind == FunctionKind::History => {
                out.push_str(&format!("{{{}}}", functions.len()));
                functions.push(call.clone());
            }
            TokenKind::Function(call) => {
                let mut inner = token.span.pos;
                for parameter in &call.parameters {
                    out.push_str(&slice(chars, inner, parameter.span.pos));
                    match &parameter.kind {
                        ParameterKind::Expression(children) => out.push_str(&collapse_tokens(
                            chars,
                            children,
                            parameter.span.pos,
                            parameter.span.end(),
                            functions,
                        )),
                        _ => out.push_str(&parameter.text),
                    }
                    inner = parameter.span.end();
                }
                out.push_str(&slice(chars, inner, token.span.end()));
            }
            _ => out.push_str(&token.text),
        }
        at = token.span.end();
    }
    out.push_str(&slice(chars, at, end));
    out
}

/// Visit every token, descending into function parameters and expressions.
pub(crate) fn for_each_token<'t>(tokens: &'t [Token], visit: &mut dyn FnMut(&'t Token)) {
    for token in tokens {
        visit(token);
        match &token.kind {
            TokenKind::Function(call) => {
                for parameter in &call.parameters {
                    if let ParameterKind::Expression(children) = &parameter.kind {
                        for_each_token(children, visit);
                    }
                }
            }
            TokenKind::Expression(children) => for_each_token(children, visit),
            _ => {}
        }
    }
}

pub(crate) fn for_each_function<'t>(
    tokens: &'t [Token],
    visit: &mut dyn FnMut(&'t FunctionCall),
) {
    for_each_token(tokens, &mut |token| {
        if let TokenKind::Function(call) = &token.kind {
            visit(call);
        }
    });
}
