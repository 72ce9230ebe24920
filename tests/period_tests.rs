// tests/period_tests.rs

use rstest::rstest;
use trigger_expr::{ParserOptions, PeriodParser};

fn modern() -> PeriodParser {
    PeriodParser::new(ParserOptions {
        usermacros: true,
        lldmacros: true,
        ..ParserOptions::default()
    })
}

// ============================================================================
// Modern periods
// ============================================================================

#[rstest]
#[case("5m", "5m", "")]
#[case("300", "300", "")]
#[case("#10", "#10", "")]
#[case("1h:now-1h", "1h", "now-1h")]
#[case("1d:now/d", "1d", "now/d")]
#[case("1M:now/M-1y", "1M", "now/M-1y")]
#[case("#3:now+30m", "#3", "now+30m")]
fn test_valid_periods(#[case] source: &str, #[case] sec: &str, #[case] shift: &str) {
    let period = modern().parse(source).unwrap();
    assert_eq!(period.sec_or_count, sec);
    assert_eq!(period.time_shift, shift);
    assert!(!period.sec_or_count_has_macro);
    assert!(!period.time_shift_has_macro);
    assert_eq!(period.to_string(), source);
}

#[rstest]
#[case("")]
#[case("1.5")]
#[case("5x")]
#[case("#")]
#[case(":now-1h")]
#[case("1h:")]
#[case("1h:now-")]
#[case("1h:yesterday")]
fn test_invalid_periods(#[case] source: &str) {
    assert!(modern().parse(source).is_err(), "{source}");
}

#[test]
fn test_period_macros() {
    let period = modern().parse("{$WINDOW}:{#SHIFT}").unwrap();
    assert!(period.sec_or_count_has_macro);
    assert!(period.time_shift_has_macro);

    let period = modern().parse("{$W:\"ctx:1\"}:now-1d").unwrap();
    assert_eq!(period.sec_or_count, "{$W:\"ctx:1\"}");
    assert_eq!(period.time_shift, "now-1d");
    assert!(period.sec_or_count_has_macro);
    assert!(!period.time_shift_has_macro);

    let plain = PeriodParser::new(ParserOptions::default());
    assert!(plain.parse("{$WINDOW}").is_err());
}

#[rstest]
#[case("60", "60s")]
#[case("60:now-1h", "60s")]
#[case("5m", "5m")]
#[case("#3", "#3")]
#[case("{$WINDOW}", "{$WINDOW}")]
fn test_canonical_seconds(#[case] source: &str, #[case] canonical: &str) {
    let period = modern().parse(source).unwrap();
    assert_eq!(period.canonical_sec_or_count(), canonical);
    assert_eq!(period.sec_or_count, source.split(':').next().unwrap());
}

#[test]
fn test_count_period() {
    assert!(modern().parse("#5").unwrap().is_count());
    assert!(!modern().parse("5m").unwrap().is_count());
}

// ============================================================================
// Legacy periods
// ============================================================================

#[test]
fn test_legacy_split() {
    let period = modern().parse_legacy("60,3600");
    assert_eq!(period.sec_or_count, "60");
    assert_eq!(period.time_shift, "3600");

    let period = modern().parse_legacy("#1");
    assert_eq!(period.sec_or_count, "#1");
    assert!(period.time_shift.is_empty());

    let period = modern().parse_legacy("");
    assert!(period.is_empty());
}

#[test]
fn test_legacy_halves_flag_macros() {
    let period = modern().from_parts("{$P}", "1d");
    assert!(period.sec_or_count_has_macro);
    assert!(!period.time_shift_has_macro);
    assert_eq!(period.to_string(), "{$P}:1d");
}
