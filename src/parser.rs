//! Expression parser.
//!
//! Scans operands and operators alternately from a [`Cursor`], remembering the
//! last point where the expression was complete. Everything after that point
//! is reported as the unparsed remainder rather than discarded.

pub mod filter;
pub mod function;
pub mod item_key;
pub mod params;
pub mod period;
pub mod query;

use tracing::debug;

use crate::ast::{
    ExpressionResult, FunctionCall, Operator, ParameterKind, ParseOutcome, Span, Token, TokenKind,
};
use crate::config::ParserOptions;
use crate::error::ParseError;
use crate::lexer::{self, Cursor};
use crate::parser::function::Scanned;

/// Nesting went past [`ParserOptions::max_depth`] at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DepthExceeded {
    pub position: usize,
}

/// Result of scanning one expression.
pub(crate) struct Scan<'a> {
    /// End and tokens of the longest prefix that is a complete expression.
    pub complete: Option<(Cursor<'a>, Vec<Token>)>,
    /// Where scanning stopped, past any whitespace.
    pub stop: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectOperand,
    ExpectOperator,
}

/// Parser for trigger and calculated item expressions.
///
/// ```
/// use trigger_expr::{ExpressionParser, ParserOptions, ParseStatus};
///
/// let parser = ExpressionParser::new(ParserOptions::default());
/// let outcome = parser.parse("last(/host/key) > 0 and nodata(/host/key,5m) = 1");
/// assert_eq!(outcome.status(), ParseStatus::Success);
///
/// let outcome = parser.parse("last(/host/key) > 0 )");
/// assert_eq!(outcome.status(), ParseStatus::SuccessContinuable);
/// assert_eq!(outcome.result().unwrap().match_text(), "last(/host/key) > 0");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExpressionParser {
    options: ParserOptions,
}

impl ExpressionParser {
    pub fn new(options: ParserOptions) -> Self {
        ExpressionParser { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse(&self, source: &str) -> ParseOutcome {
        self.parse_at(source, 0)
    }

    /// Parse starting at character `offset`; spans stay relative to the whole
    /// source.
    pub fn parse_at(&self, source: &str, offset: usize) -> ParseOutcome {
        let chars: Vec<char> = source.chars().collect();
        let start = Cursor::new(&chars, offset);
        let mut first = start;
        first.skip_whitespace();
        if first.is_at_end() {
            debug!(offset, "expression is empty");
            return ParseOutcome::Fail(ParseError::new("expression is empty", first.position()));
        }

        let outcome = match self.scan_expression(start, 0) {
            Err(DepthExceeded { position }) => {
                ParseOutcome::Fail(ParseError::too_deep(self.options.max_depth, position))
            }
            Ok(Scan {
                complete: None,
                stop,
            }) => ParseOutcome::Fail(ParseError::incorrect_expression(&chars, stop)),
            Ok(Scan {
                complete: Some((end, tokens)),
                stop,
            }) => {
                let mut rest = end;
                rest.skip_whitespace();
                if rest.is_at_end() {
                    let match_text = lexer::slice(&chars, offset, chars.len());
                    ParseOutcome::Success(ExpressionResult::new(
                        source.to_string(),
                        offset,
                        match_text,
                        tokens,
                    ))
                } else {
                    let match_text = lexer::slice(&chars, offset, end.position());
                    ParseOutcome::SuccessContinuable {
                        result: ExpressionResult::new(source.to_string(), offset, match_text, tokens),
                        error: ParseError::incorrect_expression(&chars, stop),
                    }
                }
            }
        };

        debug!(
            status = outcome.status().as_str(),
            matched = outcome.result().map_or(0, ExpressionResult::length),
            "parsed expression"
        );
        outcome
    }

    /// Substitute every `{N}` in `collapsed` with `functions[N]`.
    ///
    /// The inverse of [`ExpressionResult::collapse`].
    pub fn expand(&self, collapsed: &str, functions: &[FunctionCall]) -> Result<String, ParseError> {
        let parser = ExpressionParser::new(ParserOptions {
            collapsed_expression: true,
            ..self.options.clone()
        });
        let result = parser.parse(collapsed).into_result()?;
        let chars: Vec<char> = collapsed.chars().collect();
        substitute(&chars, result.tokens(), 0, chars.len(), functions)
    }

    /// Increase the nesting depth, failing past the configured limit.
    pub(crate) fn enter(&self, depth: usize, position: usize) -> Result<usize, DepthExceeded> {
        if depth >= self.options.max_depth {
            return Err(DepthExceeded { position });
        }
        Ok(depth + 1)
    }

    /// Longest complete expression at `start`, and where scanning stopped.
    pub(crate) fn scan_expression<'a>(
        &self,
        start: Cursor<'a>,
        depth: usize,
    ) -> Result<Scan<'a>, DepthExceeded> {
        let mut c = start;
        let mut tokens: Vec<Token> = Vec::new();
        let mut complete: Option<(Cursor<'a>, usize)> = None;
        let mut open_braces = 0usize;
        let mut negated = false;
        let mut after_not = false;
        let mut failed_at = None;
        let mut state = State::ExpectOperand;

        loop {
            let before = c.position();
            c.skip_whitespace();
            let spaced = c.position() > before;
            let at = c.position();

            match state {
                State::ExpectOperand => {
                    if c.current_char() == Some('(') {
                        self.enter(depth + open_braces, at)?;
                        open_braces += 1;
                        negated = false;
                        after_not = false;
                        c.advance();
                        tokens.push(Token::new(TokenKind::OpenBrace, Span::new(at, 1), "("));
                        continue;
                    }
                    if c.current_char() == Some('-') {
                        c.advance();
                        negated = true;
                        after_not = false;
                        tokens.push(operator_token(Operator::Subtract, at));
                        continue;
                    }
                    // `not` opens the scan or a brace, or follows whitespace.
                    let leading = matches!(
                        tokens.last().map(|token| &token.kind),
                        None | Some(TokenKind::OpenBrace)
                    );
                    if !negated
                        && !after_not
                        && (spaced || leading)
                        && c.starts_with("not")
                        && c.peek_char(3).is_some_and(is_whitespace)
                    {
                        c.advance_by(3);
                        after_not = true;
                        tokens.push(operator_token(Operator::Not, at));
                        continue;
                    }

                    let (end, token) = match self.scan_operand(c, depth + open_braces)? {
                        Ok(scanned) => scanned,
                        Err(stop) => {
                            failed_at = Some(stop);
                            break;
                        }
                    };
                    tokens.push(token);
                    c = end;
                    negated = false;
                    after_not = false;
                    state = State::ExpectOperator;
                    if open_braces == 0 {
                        complete = Some((c, tokens.len()));
                    }
                }
                State::ExpectOperator => {
                    if open_braces > 0 && c.eat(')') {
                        open_braces -= 1;
                        tokens.push(Token::new(TokenKind::CloseBrace, Span::new(at, 1), ")"));
                        if open_braces == 0 {
                            complete = Some((c, tokens.len()));
                        }
                        continue;
                    }
                    let Some(operator) = binary_operator(c, spaced) else {
                        break;
                    };
                    c.advance_by(operator.as_str().len());
                    tokens.push(operator_token(operator, at));
                    state = State::ExpectOperand;
                    if operator.is_keyword()
                        && !c.current_char().is_some_and(|ch| is_whitespace(ch) || ch == '(')
                    {
                        break;
                    }
                }
            }
        }

        Ok(Scan {
            complete: complete.map(|(end, count)| {
                tokens.truncate(count);
                (end, tokens)
            }),
            stop: failed_at.unwrap_or(c.position()),
        })
    }

    fn scan_operand<'a>(&self, start: Cursor<'a>, depth: usize) -> Scanned<'a, Token> {
        let at = start.position();
        let literal = |end: Cursor<'a>, kind: TokenKind| {
            let text = end.text_from(at);
            Some((end, Token::new(kind, Span::between(at, end.position()), text)))
        };

        let Some(ch) = start.current_char() else {
            return Ok(Err(at));
        };
        let scanned = match ch {
            '0'..='9' | '.' => lexer::scan_number(start)
                .and_then(|(end, suffix)| literal(end, TokenKind::Number { suffix })),
            '"' => lexer::scan_string(start).and_then(|end| literal(end, TokenKind::String)),
            '{' => self.scan_brace_operand(start),
            'a'..='z' => return self.scan_function(start, depth),
            _ => None,
        };
        Ok(scanned.ok_or(at))
    }

    /// Macros, function-id references and legacy anchors, all opening with `{`.
    fn scan_brace_operand<'a>(&self, start: Cursor<'a>) -> Option<(Cursor<'a>, Token)> {
        let at = start.position();
        let token = |end: Cursor<'a>, kind: TokenKind| {
            let text = end.text_from(at);
            (end, Token::new(kind, Span::between(at, end.position()), text))
        };

        if !self.options.calculated {
            if let Some(end) = lexer::scan_builtin_macro(start) {
                return Some(token(end, TokenKind::Macro));
            }
        }
        if self.options.usermacros {
            if let Some(end) = lexer::scan_user_macro(start) {
                return Some(token(end, TokenKind::UserMacro));
            }
        }
        if self.options.lldmacros {
            if let Some(end) = lexer::scan_lld_macro(start) {
                return Some(token(end, TokenKind::LldMacro));
            }
        }
        if self.options.collapsed_expression {
            if let Some((end, index)) = lexer::scan_function_id(start) {
                return Some(token(end, TokenKind::FunctionIdMacro { index }));
            }
        }
        if self.options.legacy_functions {
            if let Some((end, call)) = query::scan_legacy_function(start, &self.options) {
                return Some(token(end, TokenKind::Function(call)));
            }
        }
        None
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

fn operator_token(operator: Operator, at: usize) -> Token {
    let text = operator.as_str();
    Token::new(
        TokenKind::Operator(operator),
        Span::new(at, text.len()),
        text,
    )
}

/// Binary operator at the cursor. `and` and `or` need whitespace before them
/// and must not run into a following word.
fn binary_operator(c: Cursor, spaced: bool) -> Option<Operator> {
    for keyword in [Operator::And, Operator::Or] {
        let word = keyword.as_str();
        if c.starts_with(word) {
            let next = c.peek_char(word.len());
            let bounded = !next.is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_');
            return (spaced && bounded).then_some(keyword);
        }
    }
    Operator::SYMBOLS
        .into_iter()
        .find(|operator| c.starts_with(operator.as_str()))
}

/// Rebuild `chars[start..end]` with each function-id macro replaced by the
/// function it references.
fn substitute(
    chars: &[char],
    tokens: &[Token],
    start: usize,
    end: usize,
    functions: &[FunctionCall],
) -> Result<String, ParseError> {
    let mut out = String::new();
    let mut at = start;
    for token in tokens {
        out.push_str(&lexer::slice(chars, at, token.span.pos));
        match &token.kind {
            TokenKind::FunctionIdMacro { index } => {
                let function = functions.get(*index).ok_or_else(|| {
                    ParseError::new(
                        format!("function {{{}}} does not exist", index),
                        token.span.pos,
                    )
                })?;
                out.push_str(&function.to_string());
            }
            TokenKind::Function(call) => {
                let mut inner = token.span.pos;
                for parameter in &call.parameters {
                    out.push_str(&lexer::slice(chars, inner, parameter.span.pos));
                    match &parameter.kind {
                        ParameterKind::Expression(children) => out.push_str(&substitute(
                            chars,
                            children,
                            parameter.span.pos,
                            parameter.span.end(),
                            functions,
                        )?),
                        _ => out.push_str(&parameter.text),
                    }
                    inner = parameter.span.end();
                }
                out.push_str(&lexer::slice(chars, inner, token.span.end()));
            }
            _ => out.push_str(&token.text),
        }
        at = token.span.end();
    }
    out.push_str(&lexer::slice(chars, at, end));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_needs_whitespace() {
        let parser = ExpressionParser::default();
        assert!(parser.parse("1 and 2").is_success());
        assert!(parser.parse("1 and(2)").is_success());
        assert!(!parser.parse("1and 2").is_success());
        assert!(!parser.parse("1 andy").is_success());
    }

    #[test]
    fn test_depth_limit() {
        let parser = ExpressionParser::new(ParserOptions {
            max_depth: 3,
            ..ParserOptions::default()
        });
        assert!(parser.parse("(((1)))").is_success());
        let outcome = parser.parse("((((1))))");
        assert_eq!(
            outcome.error().map(|e| e.message.as_str()),
            Some("maximum nesting depth of 3 exceeded")
        );
    }
}
