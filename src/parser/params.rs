//! Comma-separated parameter lists, as used by item keys (`[...]`) and legacy
//! function calls (`(...)`).

use crate::error::ParseError;
use crate::lexer::{self, Cursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiters {
    /// `[a,b]`, item key parameters
    Brackets,
    /// `(a,b)`, legacy function parameters
    Parentheses,
}

impl Delimiters {
    fn open(&self) -> char {
        match self {
            Delimiters::Brackets => '[',
            Delimiters::Parentheses => '(',
        }
    }

    fn close(&self) -> char {
        match self {
            Delimiters::Brackets => ']',
            Delimiters::Parentheses => ')',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyParamType {
    Quoted,
    Unquoted,
    Array,
}

/// One entry of a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParameter {
    pub param_type: KeyParamType,
    /// Source text, quotes and array brackets included.
    pub raw: String,
    /// Offset from the opening delimiter of the outermost list.
    pub pos: usize,
    /// Entries of an array parameter.
    pub items: Vec<KeyParameter>,
}

impl KeyParameter {
    /// Quotes stripped and `\"` un-escaped; unquoted and array parameters are
    /// returned raw.
    pub fn value(&self) -> String {
        match self.param_type {
            KeyParamType::Quoted => lexer::unquote_param(&self.raw),
            KeyParamType::Unquoted | KeyParamType::Array => self.raw.clone(),
        }
    }

    pub fn is_quoted(&self) -> bool {
        self.param_type == KeyParamType::Quoted
    }
}

/// A recognised list and the number of characters it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterList {
    pub parameters: Vec<KeyParameter>,
    pub length: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ParamListParser {
    delimiters: Delimiters,
    allow_arrays: bool,
}

impl ParamListParser {
    pub fn new(delimiters: Delimiters, allow_arrays: bool) -> Self {
        ParamListParser {
            delimiters,
            allow_arrays,
        }
    }

    /// Item key parameters: brackets, one level of arrays.
    pub fn key() -> Self {
        ParamListParser::new(Delimiters::Brackets, true)
    }

    /// Legacy function parameters: parentheses, no arrays.
    pub fn function() -> Self {
        ParamListParser::new(Delimiters::Parentheses, false)
    }

    /// Recognise the list opening at `offset`. Text after the closing
    /// delimiter is left alone.
    pub fn parse(&self, source: &str, offset: usize) -> Result<ParameterList, ParseError> {
        let chars: Vec<char> = source.chars().collect();
        let start = Cursor::new(&chars, offset);
        match self.scan(start) {
            Some((end, parameters)) => Ok(ParameterList {
                parameters,
                length: end.position() - offset,
            }),
            None => Err(ParseError::incorrect_syntax(&chars, offset)),
        }
    }

    pub(crate) fn scan<'a>(&self, start: Cursor<'a>) -> Option<(Cursor<'a>, Vec<KeyParameter>)> {
        self.scan_list(start, start.position(), false)
    }

    fn scan_list<'a>(
        &self,
        start: Cursor<'a>,
        origin: usize,
        nested: bool,
    ) -> Option<(Cursor<'a>, Vec<KeyParameter>)> {
        let close = self.delimiters.close();
        let mut c = start;
        if !c.eat(self.delimiters.open()) {
            return None;
        }

        let mut parameters = Vec::new();
        loop {
            c.skip_spaces();
            let param_start = c.position();
            let (param_type, items) = match c.current_char()? {
                '"' => {
                    c = lexer::scan_quoted(c)?;
                    (KeyParamType::Quoted, Vec::new())
                }
                '[' if self.allow_arrays && nested => return None,
                '[' if self.allow_arrays => {
                    let (end, items) = self.scan_list(c, origin, true)?;
                    c = end;
                    (KeyParamType::Array, items)
                }
                _ => {
                    c = self.scan_unquoted(c)?;
                    (KeyParamType::Unquoted, Vec::new())
                }
            };

            let mut raw = c.text_from(param_start);
            match param_type {
                KeyParamType::Unquoted if self.delimiters == Delimiters::Parentheses => {
                    raw.truncate(raw.trim_end_matches(' ').len());
                }
                KeyParamType::Unquoted => {}
                KeyParamType::Quoted | KeyParamType::Array => c.skip_spaces(),
            }
            parameters.push(KeyParameter {
                param_type,
                raw,
                pos: param_start - origin,
                items,
            });

            match c.current_char()? {
                ',' => c.advance(),
                ch if ch == close => {
                    c.advance();
                    return Some((c, parameters));
                }
                _ => return None,
            }
        }
    }

    /// Raw text up to the next `,` or closing delimiter. Inside parentheses a
    /// macro is skipped whole so its own punctuation does not end the value.
    fn scan_unquoted<'a>(&self, start: Cursor<'a>) -> Option<Cursor<'a>> {
        let close = self.delimiters.close();
        let mut c = start;
        loop {
            match c.current_char()? {
                ch if ch == ',' || ch == close => return Some(c),
                '{' if self.delimiters == Delimiters::Parentheses => {
                    match lexer::scan_user_macro(c).or_else(|| lexer::scan_lld_macro(c)) {
                        Some(end) => c = end,
                        None => c.advance(),
                    }
                }
                _ => c.advance(),
            }
        }
    }
}
