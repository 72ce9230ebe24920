//! Item keys: `key_id[param,...]`.

use crate::config::KeyMode;
use crate::error::ParseError;
use crate::lexer::Cursor;
use crate::parser::params::{KeyParameter, ParamListParser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKey {
    pub key_id: String,
    pub parameters: Vec<KeyParameter>,
    /// The whole key as written.
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ItemKeyParser {
    mode: KeyMode,
}

impl ItemKeyParser {
    pub fn new(mode: KeyMode) -> Self {
        ItemKeyParser { mode }
    }

    /// Parse `source` as exactly one item key.
    ///
    /// ```
    /// use trigger_expr::{ItemKeyParser, KeyMode};
    ///
    /// let key = ItemKeyParser::new(KeyMode::SimpleChecks).parse("ssh,21").unwrap();
    /// assert_eq!(key.key_id, "ssh,21");
    /// assert!(key.parameters.is_empty());
    /// ```
    pub fn parse(&self, source: &str) -> Result<ItemKey, ParseError> {
        let chars: Vec<char> = source.chars().collect();
        if chars.is_empty() {
            return Err(ParseError::new("key is empty", 0));
        }
        let start = Cursor::new(&chars, 0);
        let Some((end, key)) = self.scan(start) else {
            return Err(ParseError::incorrect_syntax(&chars, 0));
        };
        if !end.is_at_end() {
            return Err(ParseError::incorrect_syntax(&chars, end.position()));
        }
        Ok(key)
    }

    pub(crate) fn scan<'a>(&self, start: Cursor<'a>) -> Option<(Cursor<'a>, ItemKey)> {
        let mode = self.mode;
        let mut c = start;
        if c.eat_while(|ch| is_key_char(ch, mode)) == 0 {
            return None;
        }
        let key_id = c.text_from(start.position());

        let mut parameters = Vec::new();
        if mode == KeyMode::Standard && c.current_char() == Some('[') {
            let (end, list) = ParamListParser::key().scan(c)?;
            c = end;
            parameters = list;
        }

        let text = c.text_from(start.position());
        Some((
            c,
            ItemKey {
                key_id,
                parameters,
                text,
            },
        ))
    }
}

fn is_key_char(ch: char, mode: KeyMode) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(ch, '_' | '.' | '-')
        || (mode == KeyMode::SimpleChecks && ch == ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key() {
        let err = ItemKeyParser::new(KeyMode::Standard).parse("").unwrap_err();
        assert_eq!(err.message, "key is empty");
    }

    #[test]
    fn test_trailing_garbage() {
        let err = ItemKeyParser::new(KeyMode::Standard)
            .parse("key[a] x")
            .unwrap_err();
        assert_eq!(err.position, 6);
    }
}
