//! Item references: `/host/key` queries and the legacy `{host:key.func(...)}`
//! anchor.

use crate::ast::{FunctionCall, FunctionKind, Parameter, ParameterKind, Query, Span};
use crate::config::{KeyMode, ParserOptions};
use crate::lexer::{self, Cursor};
use crate::parser::filter::scan_filter;
use crate::parser::item_key::ItemKeyParser;
use crate::parser::params::{KeyParamType, ParamListParser};

fn is_host_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | ' ' | '-')
}

/// Host part shared by both query forms; `None` when nothing acceptable is
/// found. An empty host is only returned when `allow_empty` is set.
fn scan_host<'a>(
    start: Cursor<'a>,
    options: &ParserOptions,
    allow_empty: bool,
) -> Option<(Cursor<'a>, String)> {
    if options.host_macro {
        if let Some(end) = lexer::scan_host_macro(start) {
            return Some((end, end.text_from(start.position())));
        }
    }
    let mut c = start;
    if options.calculated && c.eat('*') {
        return Some((c, "*".to_string()));
    }
    if c.eat_while(is_host_char) == 0 && !allow_empty {
        return None;
    }
    Some((c, c.text_from(start.position())))
}

/// `/host/key`, with an optional `?[filter]` on calculated item queries.
pub(crate) fn scan_query<'a>(
    start: Cursor<'a>,
    options: &ParserOptions,
) -> Option<(Cursor<'a>, Query)> {
    let mut c = start;
    if !c.eat('/') {
        return None;
    }
    let (end, host) = scan_host(c, options, options.empty_host)?;
    c = end;
    if !c.eat('/') {
        return None;
    }

    let query = if options.calculated && c.eat('*') {
        Query::new(host, "*")
    } else {
        let (end, key) = ItemKeyParser::new(KeyMode::Standard).scan(c)?;
        c = end;
        Query::new(host, key.text)
    };
    if !(options.calculated && c.starts_with("?[")) {
        return Some((c, query));
    }
    let end = scan_filter(c, options)?;
    let filter = lexer::slice(c.input(), c.position() + 2, end.position() - 1);
    Some((end, query.with_filter(filter)))
}

/// `{host:key.func(params)}`, or `{func(params)}` when the short form is
/// enabled. Yields a [`FunctionKind::Legacy`] call whose first parameter is
/// the query, if one was written.
pub(crate) fn scan_legacy_function<'a>(
    start: Cursor<'a>,
    options: &ParserOptions,
) -> Option<(Cursor<'a>, FunctionCall)> {
    scan_anchor(start, options).or_else(|| {
        options
            .legacy_short_form
            .then(|| scan_short_form(start))
            .flatten()
    })
}

fn scan_anchor<'a>(
    start: Cursor<'a>,
    options: &ParserOptions,
) -> Option<(Cursor<'a>, FunctionCall)> {
    let mut c = start;
    if !c.eat('{') {
        return None;
    }
    let query_start = c.position();
    let (end, host) = scan_host(c, options, false)?;
    c = end;
    if !c.eat(':') {
        return None;
    }

    let key_start = c.position();
    let (end, key) = ItemKeyParser::new(options.key_mode).scan(c)?;
    c = end;
    let (item_key, name) = if key.parameters.is_empty() && c.current_char() == Some('(') {
        let (item_key, name) = key.key_id.rsplit_once('.')?;
        (item_key.to_string(), name.to_string())
    } else {
        if !c.eat('.') {
            return None;
        }
        let name_start = c.position();
        c = lexer::scan_function_name(c)?;
        (key.text, c.text_from(name_start))
    };
    if item_key.is_empty() || !is_legacy_name(&name) {
        return None;
    }

    let query_end = key_start + item_key.chars().count();
    let query_text = lexer::slice(c.input(), query_start, query_end);
    let query = Parameter::new(
        ParameterKind::Query(Query::new(host, item_key)),
        Span::between(query_start, query_end),
        query_text,
    );

    let (end, mut parameters) = scan_legacy_params(c)?;
    parameters.insert(0, query);
    Some((end, FunctionCall::new(name, FunctionKind::Legacy, parameters)))
}

fn scan_short_form(start: Cursor) -> Option<(Cursor, FunctionCall)> {
    let mut c = start;
    if !c.eat('{') {
        return None;
    }
    let name_start = c.position();
    c = lexer::scan_function_name(c)?;
    let name = c.text_from(name_start);
    if !is_legacy_name(&name) {
        return None;
    }
    let (end, parameters) = scan_legacy_params(c)?;
    Some((end, FunctionCall::new(name, FunctionKind::Legacy, parameters)))
}

fn is_legacy_name(name: &str) -> bool {
    name.starts_with(|ch: char| ch.is_ascii_lowercase())
        && name.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
}

/// `(params)}`
fn scan_legacy_params(start: Cursor) -> Option<(Cursor, Vec<Parameter>)> {
    let origin = start.position();
    let (mut c, list) = ParamListParser::function().scan(start)?;
    if !c.eat('}') {
        return None;
    }
    let parameters = list
        .into_iter()
        .map(|param| {
            let kind = match param.param_type {
                KeyParamType::Quoted => ParameterKind::Quoted,
                KeyParamType::Unquoted | KeyParamType::Array => ParameterKind::Unquoted,
            };
            let span = Span::new(origin + param.pos, param.raw.chars().count());
            Parameter::new(kind, span, param.raw)
        })
        .collect();
    Some((c, parameters))
}
