//! Character cursor and the literal scanners shared by every parser.
//!
//! Scanners take a [`Cursor`] by value and hand back the cursor positioned
//! after the match, so a failed attempt never needs to be undone.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::config::ParserOptions;

/// Suffixes accepted after a number literal.
pub const NUMBER_SUFFIXES: &[char] = &['s', 'm', 'h', 'd', 'w', 'K', 'M', 'G', 'T'];

/// Read position over a source string held as characters.
///
/// Offsets are character offsets, and every [`Span`](crate::Span) uses the
/// same unit.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a [char],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [char], position: usize) -> Self {
        Cursor { input, position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn input(&self) -> &'a [char] {
        self.input
    }

    pub fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    pub fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    pub fn advance(&mut self) {
        self.position += 1;
    }

    pub fn advance_by(&mut self, count: usize) {
        self.position += count;
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consume `expected` if it is the current character.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.current_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn starts_with(&self, literal: &str) -> bool {
        let mut offset = 0;
        for ch in literal.chars() {
            if self.peek_char(offset) != Some(ch) {
                return false;
            }
            offset += 1;
        }
        true
    }

    pub fn eat_str(&mut self, literal: &str) -> bool {
        if self.starts_with(literal) {
            self.advance_by(literal.chars().count());
            true
        } else {
            false
        }
    }

    /// Consume characters while `predicate` holds; returns how many were taken.
    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) -> usize {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if predicate(ch) {
                self.advance();
            } else {
                break;
            }
        }
        self.position - start
    }

    /// Skip spaces, tabs and line breaks.
    pub fn skip_whitespace(&mut self) {
        self.eat_while(|ch| matches!(ch, ' ' | '\t' | '\r' | '\n'));
    }

    /// Skip plain spaces only, as parameter lists allow nothing else.
    pub fn skip_spaces(&mut self) {
        self.eat_while(|ch| ch == ' ');
    }

    /// Source text from `start` up to the cursor.
    pub fn text_from(&self, start: usize) -> String {
        slice(self.input, start, self.position)
    }
}

pub(crate) fn slice(input: &[char], from: usize, to: usize) -> String {
    let to = to.min(input.len());
    let from = from.min(to);
    input[from..to].iter().collect()
}

/// `123`, `1.5`, `.5`, `5.`, `1e3`, `0x1F`, each optionally followed by one of
/// [`NUMBER_SUFFIXES`].
pub(crate) fn scan_number(start: Cursor) -> Option<(Cursor, Option<char>)> {
    let mut c = start;

    if c.current_char() == Some('0')
        && matches!(c.peek_char(1), Some('x' | 'X'))
        && c.peek_char(2).is_some_and(|ch| ch.is_ascii_hexdigit())
    {
        c.advance_by(2);
        c.eat_while(|ch| ch.is_ascii_hexdigit());
        return Some((c, None));
    }

    let int_digits = c.eat_while(|ch| ch.is_ascii_digit());
    let mut frac_digits = 0;
    if c.current_char() == Some('.') {
        let mut ahead = c;
        ahead.advance();
        let digits = ahead.eat_while(|ch| ch.is_ascii_digit());
        if int_digits > 0 || digits > 0 {
            c = ahead;
            frac_digits = digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(c.current_char(), Some('e' | 'E')) {
        let mut ahead = c;
        ahead.advance();
        if matches!(ahead.current_char(), Some('+' | '-')) {
            ahead.advance();
        }
        if ahead.eat_while(|ch| ch.is_ascii_digit()) > 0 {
            c = ahead;
        }
    }

    let suffix = match c.current_char() {
        Some(ch) if NUMBER_SUFFIXES.contains(&ch) => {
            c.advance();
            Some(ch)
        }
        _ => None,
    };
    Some((c, suffix))
}

/// Numeric value of a number literal with its suffix multiplier applied.
///
/// Time suffixes convert to seconds; `K`, `M`, `G` and `T` are powers of 1024.
pub fn number_value(text: &str) -> Option<Decimal> {
    let (body, multiplier) = match text.chars().last() {
        Some(ch) if NUMBER_SUFFIXES.contains(&ch) && !is_hex(text) => {
            (&text[..text.len() - ch.len_utf8()], suffix_multiplier(ch))
        }
        _ => (text, 1),
    };

    let value = if is_hex(body) {
        let digits = &body[2..];
        Decimal::try_from_i128_with_scale(i128::from_str_radix(digits, 16).ok()?, 0).ok()?
    } else {
        let mut normalized = String::with_capacity(body.len() + 2);
        if body.starts_with('.') {
            normalized.push('0');
        }
        normalized.push_str(body);
        if let Some(stripped) = normalized.strip_suffix('.') {
            normalized = stripped.to_string();
        }
        let normalized = normalized.replace(".e", "e").replace(".E", "E");
        if normalized.contains(['e', 'E']) {
            Decimal::from_scientific(&normalized).ok()?
        } else {
            Decimal::from_str(&normalized).ok()?
        }
    };

    value.checked_mul(Decimal::from(multiplier))
}

fn is_hex(text: &str) -> bool {
    text.len() > 2 && (text.starts_with("0x") || text.starts_with("0X"))
}

fn suffix_multiplier(suffix: char) -> i64 {
    match suffix {
        's' => 1,
        'm' => 60,
        'h' => 3_600,
        'd' => 86_400,
        'w' => 604_800,
        'K' => 1 << 10,
        'M' => 1 << 20,
        'G' => 1 << 30,
        'T' => 1 << 40,
        _ => 1,
    }
}

/// Double-quoted expression string. Only `\"` and `\\` are valid escapes.
pub(crate) fn scan_string(start: Cursor) -> Option<Cursor> {
    let mut c = start;
    if !c.eat('"') {
        return None;
    }
    loop {
        match c.current_char()? {
            '"' => {
                c.advance();
                return Some(c);
            }
            '\\' => match c.peek_char(1)? {
                '"' | '\\' => c.advance_by(2),
                _ => return None,
            },
            _ => c.advance(),
        }
    }
}

/// Double-quoted parameter. `\"` and `\\` are consumed as pairs; any other
/// backslash is literal.
pub(crate) fn scan_quoted(start: Cursor) -> Option<Cursor> {
    let mut c = start;
    if !c.eat('"') {
        return None;
    }
    loop {
        match c.current_char()? {
            '"' => {
                c.advance();
                return Some(c);
            }
            '\\' if matches!(c.peek_char(1), Some('"' | '\\')) => c.advance_by(2),
            _ => c.advance(),
        }
    }
}

fn is_macro_char(ch: char) -> bool {
    ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_' || ch == '.'
}

/// `{$NAME}`, `{$NAME:context}` or `{$NAME:"quoted context"}`.
pub(crate) fn scan_user_macro(start: Cursor) -> Option<Cursor> {
    let mut c = start;
    if !c.eat_str("{$") || c.eat_while(is_macro_char) == 0 {
        return None;
    }
    if c.eat('}') {
        return Some(c);
    }
    if !c.eat(':') {
        return None;
    }

    let mut ahead = c;
    ahead.skip_spaces();
    if ahead.current_char() == Some('"') {
        let mut end = scan_quoted(ahead)?;
        end.skip_spaces();
        return end.eat('}').then_some(end);
    }

    while let Some(ch) = c.current_char() {
        c.advance();
        if ch == '}' {
            return Some(c);
        }
    }
    None
}

fn scan_simple_lld_macro(start: Cursor) -> Option<Cursor> {
    let mut c = start;
    if !c.eat_str("{#") || c.eat_while(is_macro_char) == 0 {
        return None;
    }
    c.eat('}').then_some(c)
}

/// `{#NAME}` or `{{#NAME}.func(params)}`.
pub(crate) fn scan_lld_macro(start: Cursor) -> Option<Cursor> {
    if let Some(end) = scan_simple_lld_macro(start) {
        return Some(end);
    }

    let mut c = start;
    if !c.eat('{') {
        return None;
    }
    c = scan_simple_lld_macro(c)?;
    if !c.eat('.') || c.eat_while(|ch| ch.is_ascii_lowercase()) == 0 || !c.eat('(') {
        return None;
    }
    loop {
        c.skip_spaces();
        if c.current_char() == Some('"') {
            c = scan_quoted(c)?;
            c.skip_spaces();
        } else {
            c.eat_while(|ch| ch != ',' && ch != ')');
        }
        match c.current_char()? {
            ')' => {
                c.advance();
                break;
            }
            ',' => c.advance(),
            _ => return None,
        }
    }
    c.eat('}').then_some(c)
}

/// The only built-in macro an expression may reference.
pub(crate) fn scan_builtin_macro(start: Cursor) -> Option<Cursor> {
    let mut c = start;
    c.eat_str("{TRIGGER.VALUE}").then_some(c)
}

pub(crate) fn scan_host_macro(start: Cursor) -> Option<Cursor> {
    let mut c = start;
    c.eat_str("{HOST.HOST}").then_some(c)
}

/// `{<digits>}`, yielding the referenced index.
pub(crate) fn scan_function_id(start: Cursor) -> Option<(Cursor, usize)> {
    let mut c = start;
    if !c.eat('{') {
        return None;
    }
    let digits_start = c.position();
    if c.eat_while(|ch| ch.is_ascii_digit()) == 0 {
        return None;
    }
    let index = c.text_from(digits_start).parse::<usize>().ok()?;
    c.eat('}').then_some((c, index))
}

/// Lowercase function identifier.
pub(crate) fn scan_function_name(start: Cursor) -> Option<Cursor> {
    let mut c = start;
    if !c.current_char().is_some_and(|ch| ch.is_ascii_lowercase()) {
        return None;
    }
    c.eat_while(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_');
    Some(c)
}

/// Whether all of `text` is one user or LLD macro allowed by `options`.
pub fn is_macro(text: &str, options: &ParserOptions) -> bool {
    let chars: Vec<char> = text.chars().collect();
    let start = Cursor::new(&chars, 0);
    let user = options
        .usermacros
        .then(|| scan_user_macro(start))
        .flatten();
    let lld = options.lldmacros.then(|| scan_lld_macro(start)).flatten();
    [user, lld].into_iter().flatten().any(|end| end.is_at_end())
}

/// Strip the quotes of a quoted parameter and un-escape `\"`.
///
/// Unquoted input is returned unchanged.
pub fn unquote_param(raw: &str) -> String {
    match strip_quotes(raw) {
        Some(inner) => inner.replace("\\\"", "\""),
        None => raw.to_string(),
    }
}

/// Strip the quotes of an expression string and un-escape `\"` and `\\`.
pub fn unquote_string(raw: &str) -> String {
    let Some(inner) = strip_quotes(raw) else {
        return raw.to_string();
    };
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => value.push(next),
                None => value.push(ch),
            }
        } else {
            value.push(ch);
        }
    }
    value
}

/// Quote `value` as an expression string.
pub fn quote_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn strip_quotes(raw: &str) -> Option<&str> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end_of(scanner: fn(Cursor) -> Option<Cursor>, text: &str) -> Option<usize> {
        let chars: Vec<char> = text.chars().collect();
        scanner(Cursor::new(&chars, 0)).map(|c| c.position())
    }

    #[test]
    fn test_user_macro_contexts() {
        assert_eq!(end_of(scan_user_macro, "{$M}"), Some(4));
        assert_eq!(end_of(scan_user_macro, "{$M: ctx} rest"), Some(9));
        assert_eq!(end_of(scan_user_macro, "{$M:\"a}b\"}"), Some(10));
        assert_eq!(end_of(scan_user_macro, "{$m}"), None);
        assert_eq!(end_of(scan_user_macro, "{$M"), None);
    }

    #[test]
    fn test_lld_function_macro() {
        let text = "{{#M}.regsub(\"^([0-9]+)\", \\1)}";
        assert_eq!(end_of(scan_lld_macro, text), Some(text.chars().count()));
        assert_eq!(end_of(scan_lld_macro, "{#IF}"), Some(5));
        assert_eq!(end_of(scan_lld_macro, "{{#IF}.regsub(1}"), None);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(end_of(scan_string, "\"\\\"str\\\"\""), Some(9));
        assert_eq!(end_of(scan_string, "\"a\\bc\""), None);
        assert_eq!(end_of(scan_quoted, "\"a\\bc\""), Some(6));
    }

    #[test]
    fn test_number_values() {
        assert_eq!(number_value("1K"), Some(Decimal::from(1024)));
        assert_eq!(number_value("2m"), Some(Decimal::from(120)));
        assert_eq!(number_value(".5"), Decimal::from_str("0.5").ok());
        assert_eq!(number_value("5."), Some(Decimal::from(5)));
        assert_eq!(number_value("0x1F"), Some(Decimal::from(31)));
        assert_eq!(number_value("1e3"), Some(Decimal::from(1000)));
    }

    #[test]
    fn test_quoting() {
        assert_eq!(unquote_param("\"a\\\"b\""), "a\"b");
        assert_eq!(unquote_param("plain"), "plain");
        assert_eq!(unquote_string("\"a\\\\b\""), "a\\b");
        assert_eq!(quote_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }
}
