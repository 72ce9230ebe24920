//! Rewrites legacy calls in a parsed expression, copying everything else
//! through unchanged.

use tracing::{debug, warn};

use crate::ast::period::canonical_seconds;
use crate::ast::{FunctionCall, FunctionKind, Parameter, ParameterKind, Period, Query, Token, TokenKind};
use crate::converter::legacy::{LegacyFunction, Shape, Strategy, Structure};
use crate::converter::ConvertWarning;
use crate::error::Field;
use crate::lexer::{self, slice};
use crate::parser::period::PeriodParser;

/// Output of rewriting one field.
#[derive(Debug, Clone, Default)]
pub(crate) struct Rewritten {
    pub text: String,
    /// Pairs referenced by the output, in order of first appearance.
    pub pairs: Vec<(String, String)>,
    pub warnings: Vec<ConvertWarning>,
}

pub(crate) struct Rewriter<'c> {
    field: Field,
    /// Item bound to `{func()}` short-form calls.
    context: Option<&'c Query>,
    periods: PeriodParser,
    output: Rewritten,
}

impl<'c> Rewriter<'c> {
    pub fn new(field: Field, context: Option<&'c Query>, periods: PeriodParser) -> Self {
        Rewriter {
            field,
            context,
            periods,
            output: Rewritten::default(),
        }
    }

    pub fn rewrite(mut self, source: &str, tokens: &[Token], start: usize, end: usize) -> Rewritten {
        let chars: Vec<char> = source.chars().collect();
        self.output.text = self.splice(&chars, tokens, start, end);
        self.output
    }

    fn splice(&mut self, chars: &[char], tokens: &[Token], start: usize, end: usize) -> String {
        let mut out = String::new();
        let mut at = start;
        for token in tokens {
            out.push_str(&slice(chars, at, token.span.pos));
            match &token.kind {
                TokenKind::Function(call) if call.kind == FunctionKind::Legacy => {
                    out.push_str(&self.rewrite_call(call));
                }
                TokenKind::Function(call) => {
                    if let Some(query) = call.query() {
                        self.reference(query);
                    }
                    let mut inner = token.span.pos;
                    for parameter in &call.parameters {
                        out.push_str(&slice(chars, inner, parameter.span.pos));
                        match &parameter.kind {
                            ParameterKind::Expression(children) => out.push_str(&self.splice(
                                chars,
                                children,
                                parameter.span.pos,
                                parameter.span.end(),
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

    fn reference(&mut self, query: &Query) {
        let pair = query.pair();
        if !self.output.pairs.contains(&pair) {
            self.output.pairs.push(pair);
        }
    }

    fn rewrite_call(&mut self, call: &FunctionCall) -> String {
        let Some(query) = call.query().or(self.context).cloned() else {
            return call.to_string();
        };
        let function = LegacyFunction::from_name(&call.name);
        let args = Arguments {
            parameters: call.arguments(),
            periods: &self.periods,
        };
        let q = query.to_string();

        let rewritten = match function.strategy() {
            Strategy::Stateless => format!("{}()", call.name),
            Strategy::Rename { name, shape } => render(name, reshape(shape, &q, &args)),
            Strategy::Structural(structure) => restructure(structure, &q, &args),
            Strategy::Unknown => {
                warn!(field = %self.field, function = %call.name, "unknown legacy function");
                self.output.warnings.push(ConvertWarning {
                    field: self.field,
                    function: call.name.clone(),
                    message: format!("unknown function \"{}\" copied without conversion", call.name),
                });
                let mut raw = vec![q.clone()];
                raw.extend(args.parameters.iter().map(|p| p.text.clone()));
                render(&call.name, raw)
            }
        };
        if function.strategy() != Strategy::Stateless {
            self.reference(&query);
        }

        debug!(from = %call, to = %rewritten, "rewrote legacy function");
        rewritten
    }
}

/// Legacy parameters after the query.
struct Arguments<'p> {
    parameters: &'p [Parameter],
    periods: &'p PeriodParser,
}

impl Arguments<'_> {
    fn value(&self, index: usize) -> String {
        self.parameters
            .get(index)
            .map(Parameter::value)
            .unwrap_or_default()
    }

    /// Quoted value, or an empty slot when the value is empty.
    fn quoted(&self, index: usize) -> String {
        quote_non_empty(&self.value(index))
    }

    fn period(&self, sec: usize, shift: usize) -> Period {
        self.periods
            .from_parts(&self.value(sec), &self.value(shift))
    }
}

fn reshape(shape: Shape, q: &str, args: &Arguments) -> Vec<String> {
    let q = q.to_string();
    match shape {
        Shape::Aggregate => vec![q, render_period(&args.period(0, 1))],
        Shape::LastLike => vec![q, render_last_period(&args.period(0, 1))],
        Shape::Count => {
            let operator = match args.value(2).as_str() {
                "band" => "bitand".to_string(),
                other => other.to_string(),
            };
            vec![
                q,
                render_period(&args.period(0, 3)),
                quote_non_empty(&operator),
                args.quoted(1),
            ]
        }
        Shape::Find { mode } => vec![
            q,
            render_sec(&args.value(1)),
            lexer::quote_string(mode),
            lexer::quote_string(&args.value(0)),
        ],
        Shape::Forecast => vec![
            q,
            render_period(&args.period(0, 1)),
            render_sec(&args.value(2)),
            args.quoted(3),
            args.quoted(4),
        ],
        Shape::Timeleft => vec![
            q,
            render_period(&args.period(0, 1)),
            args.value(2),
            args.quoted(3),
        ],
        Shape::Percentile => vec![q, render_period(&args.period(0, 1)), args.value(2)],
        Shape::Fuzzytime => vec![q, render_sec(&args.value(0))],
        Shape::Nodata => vec![q, render_sec(&args.value(0)), args.quoted(1)],
        Shape::LogPattern => match args.parameters.first() {
            Some(pattern) if pattern.is_quoted() || !pattern.text.is_empty() => {
                vec![q, String::new(), lexer::quote_string(&pattern.value())]
            }
            _ => vec![q],
        },
        Shape::QueryOnly => vec![q],
        Shape::Trend => vec![q, args.period(0, 1).to_string()],
    }
}

fn restructure(structure: Structure, q: &str, args: &Arguments) -> String {
    match structure {
        Structure::Abschange => format!("abs(last({q},1)-last({q},2))"),
        Structure::Diff => format!("(last({q},1)<>last({q},2))"),
        Structure::Prev => format!("last({q},2)"),
        Structure::Delta => {
            let period = render_period(&args.period(0, 1));
            format!(
                "({}-{})",
                render("max", vec![q.to_string(), period.clone()]),
                render("min", vec![q.to_string(), period])
            )
        }
        Structure::Trenddelta => {
            let period = args.period(0, 1).to_string();
            format!("(trendmax({q},{period})-trendmin({q},{period}))")
        }
        Structure::Band => {
            let last = render("last", vec![q.to_string(), render_last_period(&args.period(0, 2))]);
            render("bitand", vec![last, args.value(1)])
        }
        Structure::Strlen => {
            let last = render("last", vec![q.to_string(), render_last_period(&args.period(0, 1))]);
            format!("length({last})")
        }
    }
}

/// `name(args)` with trailing empty arguments dropped.
fn render(name: &str, mut args: Vec<String>) -> String {
    while args.last().is_some_and(String::is_empty) {
        args.pop();
    }
    format!("{}({})", name, args.join(","))
}

fn quote_non_empty(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        lexer::quote_string(value)
    }
}

fn is_integer(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_ascii_digit())
}

pub(crate) fn render_sec(sec: &str) -> String {
    canonical_seconds(sec)
}

pub(crate) fn render_shift(shift: &str) -> String {
    if shift.is_empty() {
        String::new()
    } else if is_integer(shift) {
        format!("now-{shift}s")
    } else {
        format!("now-{shift}")
    }
}

/// `60`, `3600` → `60s:now-3600s`
pub(crate) fn render_period(period: &Period) -> String {
    join_period(period.canonical_sec_or_count(), render_shift(&period.time_shift))
}

/// Windows of `last`-like functions only select a value by position: a time
/// window is dropped, or becomes `#1` when shifted.
fn render_last_period(period: &Period) -> String {
    if period.is_count() || period.sec_or_count_has_macro {
        return render_period(period);
    }
    let shift = render_shift(&period.time_shift);
    if shift.is_empty() {
        String::new()
    } else {
        join_period("#1".to_string(), shift)
    }
}

fn join_period(sec: String, shift: String) -> String {
    if shift.is_empty() {
        sec
    } else {
        format!("{sec}:{shift}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserOptions;

    fn period(sec: &str, shift: &str) -> Period {
        PeriodParser::new(ParserOptions::legacy()).from_parts(sec, shift)
    }

    #[test]
    fn test_period_rendering() {
        assert_eq!(render_period(&period("60", "3600")), "60s:now-3600s");
        assert_eq!(render_period(&period("#3", "1d")), "#3:now-1d");
        assert_eq!(render_period(&period("{$P}", "")), "{$P}");
        assert_eq!(render_period(&period("", "")), "");
    }

    #[test]
    fn test_last_like_period() {
        assert_eq!(render_last_period(&period("0", "")), "");
        assert_eq!(render_last_period(&period("60", "86400")), "#1:now-86400s");
        assert_eq!(render_last_period(&period("#2", "")), "#2");
        assert_eq!(render_last_period(&period("{$P}", "")), "{$P}");
    }

    #[test]
    fn test_render_trims_trailing_slots() {
        let args = vec!["/h/k".to_string(), String::new(), "\"x\"".to_string(), String::new()];
        assert_eq!(render("count", args), "count(/h/k,,\"x\")");
    }
}
