//! Host group and tag filters of calculated item queries.
//!
//! ```text
//! ?[group = "Servers" and (tag = "web" or not tag <> {$TAG})]
//! ```
//!
//! Conditions compare `group` or `tag` with `=` or `<>` against a quoted
//! string, or against a macro when the parser accepts that macro kind. They
//! combine with `and`, `or`, `not` and parentheses.

use crate::config::ParserOptions;
use crate::lexer::{self, Cursor};

/// Filter at `start`, from `?[` through the closing `]`.
pub(crate) fn scan_filter<'a>(start: Cursor<'a>, options: &ParserOptions) -> Option<Cursor<'a>> {
    let mut c = start;
    if !c.eat_str("?[") {
        return None;
    }
    let mut end = FilterScanner { options }.expression(c, 0)?;
    end.skip_whitespace();
    end.eat(']').then_some(end)
}

struct FilterScanner<'o> {
    options: &'o ParserOptions,
}

impl FilterScanner<'_> {
    /// Conditions joined by `and` or `or`.
    fn expression<'a>(&self, start: Cursor<'a>, depth: usize) -> Option<Cursor<'a>> {
        let mut c = self.condition(start, depth)?;
        loop {
            let mut next = c;
            if next.eat_while(is_whitespace) == 0 {
                return Some(c);
            }
            let Some(after) = keyword(next, "and").or_else(|| keyword(next, "or")) else {
                return Some(c);
            };
            c = self.condition(after, depth)?;
        }
    }

    fn condition<'a>(&self, start: Cursor<'a>, depth: usize) -> Option<Cursor<'a>> {
        if depth >= self.options.max_depth {
            return None;
        }
        let mut c = start;
        c.skip_whitespace();
        if let Some(after) = keyword(c, "not") {
            return self.condition(after, depth + 1);
        }
        if c.eat('(') {
            let mut end = self.expression(c, depth + 1)?;
            end.skip_whitespace();
            return end.eat(')').then_some(end);
        }

        let attribute = ["group", "tag"].into_iter().find(|word| c.starts_with(word))?;
        c.advance_by(attribute.len());
        c.skip_whitespace();
        if !(c.eat_str("<>") || c.eat('=')) {
            return None;
        }
        c.skip_whitespace();
        self.value(c)
    }

    fn value<'a>(&self, start: Cursor<'a>) -> Option<Cursor<'a>> {
        match start.current_char()? {
            '"' => lexer::scan_string(start),
            '{' => {
                let user = self.options.usermacros.then(|| lexer::scan_user_macro(start));
                let lld = || self.options.lldmacros.then(|| lexer::scan_lld_macro(start));
                user.flatten().or_else(|| lld().flatten())
            }
            _ => None,
        }
    }
}

/// `word` followed by whitespace or `(`.
fn keyword<'a>(start: Cursor<'a>, word: &str) -> Option<Cursor<'a>> {
    let mut c = start;
    if !c.eat_str(word) {
        return None;
    }
    c.current_char()
        .is_some_and(|ch| is_whitespace(ch) || ch == '(')
        .then_some(c)
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(text: &str, options: &ParserOptions) -> Option<String> {
        let chars: Vec<char> = text.chars().collect();
        scan_filter(Cursor::new(&chars, 0), options).map(|end| end.text_from(0))
    }

    #[test]
    fn test_conditions() {
        let options = ParserOptions::default();
        let text = "?[group = \"A\" and (tag = \"b\" or not tag <> \"c\")]";
        assert_eq!(filter(&format!("{text}) = 1"), &options).as_deref(), Some(text));
        assert!(filter("?[tag=\"x\"]", &options).is_some());
        assert!(filter("?[ group = \"A\" ]", &options).is_some());
    }

    #[test]
    fn test_rejected_filters() {
        let options = ParserOptions::default();
        assert!(filter("?[]", &options).is_none());
        assert!(filter("?[host = \"A\"]", &options).is_none());
        assert!(filter("?[group = A]", &options).is_none());
        assert!(filter("?[group = \"A\"", &options).is_none());
        assert!(filter("?[group = \"A\"and tag = \"b\"]", &options).is_none());
        assert!(filter("?[group = \"A\" andtag = \"b\"]", &options).is_none());
    }

    #[test]
    fn test_macro_values_follow_options() {
        let text = "?[tag = {$T} or tag = {#T} or tag = {{#T}.regsub(\"x\", \\1)}]";
        assert!(filter(text, &ParserOptions::default()).is_none());
        let options = ParserOptions {
            usermacros: true,
            lldmacros: true,
            ..ParserOptions::default()
        };
        assert_eq!(filter(text, &options).as_deref(), Some(text));
    }

    #[test]
    fn test_nesting_respects_depth_limit() {
        let options = ParserOptions {
            max_depth: 2,
            ..ParserOptions::default()
        };
        assert!(filter("?[(tag = \"a\")]", &options).is_some());
        assert!(filter("?[((tag = \"a\"))]", &options).is_none());
    }
}
