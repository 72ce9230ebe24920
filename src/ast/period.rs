use std::fmt;

/// Evaluation window of a history function.
///
/// A half that is a macro is flagged and kept verbatim; no literal validation
/// is applied to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Period {
    pub sec_or_count: String,
    pub time_shift: String,
    pub sec_or_count_has_macro: bool,
    pub time_shift_has_macro: bool,
}

impl Period {
    pub fn is_count(&self) -> bool {
        self.sec_or_count.starts_with('#')
    }

    pub fn is_empty(&self) -> bool {
        self.sec_or_count.is_empty() && self.time_shift.is_empty()
    }

    /// `sec_or_count` in seconds when written as a bare integer, so `60`
    /// reads `60s`. Counts, suffixed values and macros are returned as is.
    pub fn canonical_sec_or_count(&self) -> String {
        canonical_seconds(&self.sec_or_count)
    }
}

/// A bare integer gains `s`; anything else is kept.
pub(crate) fn canonical_seconds(sec: &str) -> String {
    if !sec.is_empty() && sec.chars().all(|ch| ch.is_ascii_digit()) {
        format!("{sec}s")
    } else {
        sec.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.time_shift.is_empty() {
            write!(f, "{}", self.sec_or_count)
        } else {
            write!(f, "{}:{}", self.sec_or_count, self.time_shift)
        }
    }
}
