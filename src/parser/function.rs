//! Function calls inside an expression.
//!
//! A call whose first argument starts with `/` is a history function and
//! takes a query followed by plain parameters; any other call is a math
//! function whose arguments are nested expressions.

use crate::ast::{FunctionCall, FunctionKind, Parameter, ParameterKind, Span, Token, TokenKind};
use crate::lexer::{self, Cursor};
use crate::parser::period::PeriodParser;
use crate::parser::query::scan_query;
use crate::parser::{DepthExceeded, ExpressionParser};

/// Where a construct ends, or the position scanning could not get past.
pub(crate) type Scanned<'a, T> = Result<Result<(Cursor<'a>, T), usize>, DepthExceeded>;

impl ExpressionParser {
    /// `name(...)` at `start`, as a `Function` token.
    ///
    /// A math call fails where its arguments stop; anything else fails at
    /// the call itself.
    pub(crate) fn scan_function<'a>(&self, start: Cursor<'a>, depth: usize) -> Scanned<'a, Token> {
        let at = start.position();
        let Some(mut c) = lexer::scan_function_name(start) else {
            return Ok(Err(at));
        };
        let name = c.text_from(at);
        if !c.eat('(') {
            return Ok(Err(at));
        }
        let depth = self.enter(depth, at)?;

        let mut ahead = c;
        ahead.skip_spaces();
        let scanned = if ahead.current_char() == Some('/') {
            if self.options.collapsed_expression {
                return Ok(Err(at));
            }
            self.scan_history_params(c)
                .map(|(end, params)| (end, FunctionCall::new(name, FunctionKind::History, params)))
                .ok_or(at)
        } else {
            self.scan_math_params(c, depth)?
                .map(|(end, params)| (end, FunctionCall::new(name, FunctionKind::Math, params)))
        };

        Ok(scanned.map(|(end, call)| {
            let span = Span::between(at, end.position());
            let text = end.text_from(at);
            (end, Token::new(TokenKind::Function(call), span, text))
        }))
    }

    /// Parameters after `(`: a query, a period, then numbers or macros.
    /// Only spaces may surround them.
    fn scan_history_params<'a>(&self, start: Cursor<'a>) -> Option<(Cursor<'a>, Vec<Parameter>)> {
        let mut c = start;
        c.skip_spaces();
        let query_start = c.position();
        let (end, query) = scan_query(c, &self.options)?;
        c = end;
        let mut parameters = vec![Parameter::new(
            ParameterKind::Query(query),
            Span::between(query_start, c.position()),
            c.text_from(query_start),
        )];

        loop {
            c.skip_spaces();
            match c.current_char()? {
                ')' => {
                    c.advance();
                    return Some((c, parameters));
                }
                ',' => c.advance(),
                _ => return None,
            }
            c.skip_spaces();

            let param_start = c.position();
            let quoted = c.current_char() == Some('"');
            c = if quoted {
                lexer::scan_quoted(c)?
            } else {
                scan_plain_param(c)
            };
            let text = c.text_from(param_start);
            let span = Span::between(param_start, c.position());

            let kind = if quoted {
                ParameterKind::Quoted
            } else if text.is_empty() {
                ParameterKind::Unquoted
            } else if parameters.len() == 1 {
                let period = PeriodParser::new(self.options.clone()).parse(&text).ok()?;
                ParameterKind::Period(period)
            } else if is_number(&text) || lexer::is_macro(&text, &self.options) {
                ParameterKind::Unquoted
            } else {
                return None;
            };
            parameters.push(Parameter::new(kind, span, text));
        }
    }

    /// Comma-separated nested expressions up to the closing `)`.
    fn scan_math_params<'a>(&self, start: Cursor<'a>, depth: usize) -> Scanned<'a, Vec<Parameter>> {
        let mut c = start;
        let mut ahead = c;
        ahead.skip_whitespace();
        if ahead.eat(')') {
            return Ok(Ok((ahead, Vec::new())));
        }

        let mut parameters = Vec::new();
        loop {
            let scan = self.scan_expression(c, depth)?;
            let Some((end, tokens)) = scan.complete else {
                return Ok(Err(scan.stop));
            };
            let span = match (tokens.first(), tokens.last()) {
                (Some(first), Some(last)) => Span::between(first.span.pos, last.span.end()),
                _ => return Ok(Err(scan.stop)),
            };
            let text = lexer::slice(c.input(), span.pos, span.end());
            parameters.push(Parameter::new(ParameterKind::Expression(tokens), span, text));

            c = end;
            c.skip_whitespace();
            match c.current_char() {
                Some(',') => c.advance(),
                Some(')') => {
                    c.advance();
                    return Ok(Ok((c, parameters)));
                }
                _ => return Ok(Err(scan.stop)),
            }
        }
    }
}

/// Unquoted history parameter: up to `,`, `)` or a space, with macros taken
/// whole.
fn scan_plain_param(start: Cursor) -> Cursor {
    let mut c = start;
    while let Some(ch) = c.current_char() {
        match ch {
            ',' | ')' | ' ' => break,
            '{' => match lexer::scan_user_macro(c).or_else(|| lexer::scan_lld_macro(c)) {
                Some(end) => c = end,
                None => c.advance(),
            },
            _ => c.advance(),
        }
    }
    c
}

fn is_number(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    let mut start = Cursor::new(&chars, 0);
    start.eat('-');
    lexer::scan_number(start).is_some_and(|(end, _)| end.is_at_end())
}
