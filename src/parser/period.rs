//! History function periods: `sec|#count[:time_shift]`.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::Period;
use crate::config::ParserOptions;
use crate::error::ParseError;
use crate::lexer::{self, Cursor};

static SEC_OR_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#[0-9]+|[0-9]+[smhdwMy]?)$").unwrap_or_else(|_| unreachable!("period regex is valid"))
});

static TIME_SHIFT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^now(?:/[smhdwMy]|[+-][0-9]+[smhdwMy]?)*$")
        .unwrap_or_else(|_| unreachable!("time shift regex is valid"))
});

/// Validates periods. A half that is a macro allowed by the options is kept
/// verbatim and flagged.
#[derive(Debug, Clone)]
pub struct PeriodParser {
    options: ParserOptions,
}

impl PeriodParser {
    pub fn new(options: ParserOptions) -> Self {
        PeriodParser { options }
    }

    /// Parse a modern period such as `5m`, `#3` or `1h:now-1d`.
    ///
    /// Both halves keep their written text; a bare integer stays `60` here
    /// and reads `60s` through [`Period::canonical_sec_or_count`].
    pub fn parse(&self, source: &str) -> Result<Period, ParseError> {
        let chars: Vec<char> = source.chars().collect();
        let split = self.sec_end(&chars);
        let sec = lexer::slice(&chars, 0, split);
        let shift = (split < chars.len()).then(|| lexer::slice(&chars, split + 1, chars.len()));

        if sec.is_empty() {
            return Err(ParseError::incorrect_syntax(&chars, 0));
        }
        let sec_or_count_has_macro = self.is_macro(&sec);
        if !sec_or_count_has_macro && !SEC_OR_COUNT.is_match(&sec) {
            return Err(ParseError::incorrect_syntax(&chars, 0));
        }

        let mut time_shift_has_macro = false;
        if let Some(shift) = &shift {
            time_shift_has_macro = self.is_macro(shift);
            if !time_shift_has_macro && !TIME_SHIFT.is_match(shift) {
                return Err(ParseError::incorrect_syntax(&chars, split + 1));
            }
        }

        Ok(Period {
            sec_or_count: sec,
            time_shift: shift.unwrap_or_default(),
            sec_or_count_has_macro,
            time_shift_has_macro,
        })
    }

    /// Offset of the `:` separating the halves, or the input length. A
    /// leading macro is skipped whole since its context may hold a colon.
    fn sec_end(&self, chars: &[char]) -> usize {
        let start = Cursor::new(chars, 0);
        let user = self.options.usermacros.then(|| lexer::scan_user_macro(start));
        let lld = self.options.lldmacros.then(|| lexer::scan_lld_macro(start));
        let from = user
            .flatten()
            .or(lld.flatten())
            .map_or(0, |end| end.position());
        chars[from..]
            .iter()
            .position(|&ch| ch == ':')
            .map_or(chars.len(), |offset| from + offset)
    }

    /// Split a legacy `sec,shift` pair. Nothing is validated beyond the
    /// split; the halves are rendered by the converter.
    ///
    /// ```
    /// use trigger_expr::{ParserOptions, PeriodParser};
    ///
    /// let period = PeriodParser::new(ParserOptions::legacy()).parse_legacy("60,3600");
    /// assert_eq!(period.sec_or_count, "60");
    /// assert_eq!(period.time_shift, "3600");
    /// ```
    pub fn parse_legacy(&self, source: &str) -> Period {
        let (sec, shift) = source.split_once(',').unwrap_or((source, ""));
        self.from_parts(sec.trim(), shift.trim())
    }

    /// Build a period from already separated halves.
    pub fn from_parts(&self, sec_or_count: &str, time_shift: &str) -> Period {
        Period {
            sec_or_count: sec_or_count.to_string(),
            time_shift: time_shift.to_string(),
            sec_or_count_has_macro: self.is_macro(sec_or_count),
            time_shift_has_macro: self.is_macro(time_shift),
        }
    }

    fn is_macro(&self, text: &str) -> bool {
        !text.is_empty() && lexer::is_macro(text, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> PeriodParser {
        PeriodParser::new(ParserOptions::legacy())
    }

    #[test]
    fn test_modern_periods() {
        assert_eq!(parser().parse("#3").unwrap().sec_or_count, "#3");
        let period = parser().parse("1h:now-1d/d").unwrap();
        assert_eq!(period.time_shift, "now-1d/d");
        assert!(parser().parse("1h:yesterday").is_err());
        assert!(parser().parse("1x").is_err());
    }

    #[test]
    fn test_macro_halves_skip_validation() {
        let period = parser().parse("{$P}:{$S}").unwrap();
        assert!(period.sec_or_count_has_macro);
        assert!(period.time_shift_has_macro);

        let period = parser().parse("{$P:\"a:b\"}").unwrap();
        assert_eq!(period.sec_or_count, "{$P:\"a:b\"}");
        assert!(period.time_shift.is_empty());
    }
}
