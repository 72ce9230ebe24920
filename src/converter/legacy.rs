//! Legacy function names and how each one is rewritten.

/// A function that may appear in a legacy `{host:key.func(...)}` anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyFunction {
    Abschange,
    Avg,
    Band,
    Change,
    Count,
    Date,
    Dayofmonth,
    Dayofweek,
    Delta,
    Diff,
    Forecast,
    Fuzzytime,
    Iregexp,
    Last,
    Logeventid,
    Logseverity,
    Logsource,
    Max,
    Min,
    Nodata,
    Now,
    Percentile,
    Prev,
    Regexp,
    Str,
    Strlen,
    Sum,
    Time,
    Timeleft,
    Trendavg,
    Trendcount,
    Trenddelta,
    Trendmax,
    Trendmin,
    Trendsum,
    /// Kept with its parameters copied raw, and reported as a warning.
    Unknown(String),
}

static NAMES: [(&str, LegacyFunction); 35] = [
    ("abschange", LegacyFunction::Abschange),
    ("avg", LegacyFunction::Avg),
    ("band", LegacyFunction::Band),
    ("change", LegacyFunction::Change),
    ("count", LegacyFunction::Count),
    ("date", LegacyFunction::Date),
    ("dayofmonth", LegacyFunction::Dayofmonth),
    ("dayofweek", LegacyFunction::Dayofweek),
    ("delta", LegacyFunction::Delta),
    ("diff", LegacyFunction::Diff),
    ("forecast", LegacyFunction::Forecast),
    ("fuzzytime", LegacyFunction::Fuzzytime),
    ("iregexp", LegacyFunction::Iregexp),
    ("last", LegacyFunction::Last),
    ("logeventid", LegacyFunction::Logeventid),
    ("logseverity", LegacyFunction::Logseverity),
    ("logsource", LegacyFunction::Logsource),
    ("max", LegacyFunction::Max),
    ("min", LegacyFunction::Min),
    ("nodata", LegacyFunction::Nodata),
    ("now", LegacyFunction::Now),
    ("percentile", LegacyFunction::Percentile),
    ("prev", LegacyFunction::Prev),
    ("regexp", LegacyFunction::Regexp),
    ("str", LegacyFunction::Str),
    ("strlen", LegacyFunction::Strlen),
    ("sum", LegacyFunction::Sum),
    ("time", LegacyFunction::Time),
    ("timeleft", LegacyFunction::Timeleft),
    ("trendavg", LegacyFunction::Trendavg),
    ("trendcount", LegacyFunction::Trendcount),
    ("trenddelta", LegacyFunction::Trenddelta),
    ("trendmax", LegacyFunction::Trendmax),
    ("trendmin", LegacyFunction::Trendmin),
    ("trendsum", LegacyFunction::Trendsum),
];

/// Argument layout of a renamed, query-bound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `(sec, shift)` → `q[,period]`
    Aggregate,
    /// `(sec, shift)` → `q[,period]` with the window reduced to a count
    LastLike,
    /// `(sec, pattern, operator, shift)` → `q,period[,"op"[,"pattern"]]`
    Count,
    /// `(pattern, sec)` → `q,[sec],"mode","pattern"`
    Find { mode: &'static str },
    /// `(sec, shift, time, fit, mode)`
    Forecast,
    /// `(sec, shift, threshold, fit)`
    Timeleft,
    /// `(sec, shift, percentage)`
    Percentile,
    /// `(sec)`
    Fuzzytime,
    /// `(sec, mode)`
    Nodata,
    /// `(pattern)` → `q` or `q,,"pattern"`
    LogPattern,
    /// parameters are dropped
    QueryOnly,
    /// `(period, shift)` → `q,period:shift`, both kept raw
    Trend,
}

/// Replacement by a derived expression over one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    Abschange,
    Band,
    Delta,
    Diff,
    Prev,
    Strlen,
    Trenddelta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Rename { name: &'static str, shape: Shape },
    Structural(Structure),
    /// No query in the new form.
    Stateless,
    Unknown,
}

impl LegacyFunction {
    pub fn from_name(name: &str) -> Self {
        NAMES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, function)| function.clone())
            .unwrap_or_else(|| LegacyFunction::Unknown(name.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            LegacyFunction::Unknown(name) => name,
            known => NAMES
                .iter()
                .find(|(_, function)| function == known)
                .map_or("", |(name, _)| *name),
        }
    }

    pub fn strategy(&self) -> Strategy {
        use LegacyFunction::*;

        let rename = |name, shape| Strategy::Rename { name, shape };
        match self {
            Avg => rename("avg", Shape::Aggregate),
            Max => rename("max", Shape::Aggregate),
            Min => rename("min", Shape::Aggregate),
            Sum => rename("sum", Shape::Aggregate),
            Last => rename("last", Shape::LastLike),
            Change => rename("change", Shape::QueryOnly),
            Logseverity => rename("logseverity", Shape::QueryOnly),
            Count => rename("count", Shape::Count),
            Iregexp => rename("find", Shape::Find { mode: "iregexp" }),
            Regexp => rename("find", Shape::Find { mode: "regexp" }),
            Str => rename("find", Shape::Find { mode: "like" }),
            Forecast => rename("forecast", Shape::Forecast),
            Timeleft => rename("timeleft", Shape::Timeleft),
            Percentile => rename("percentile", Shape::Percentile),
            Fuzzytime => rename("fuzzytime", Shape::Fuzzytime),
            Nodata => rename("nodata", Shape::Nodata),
            Logeventid => rename("logeventid", Shape::LogPattern),
            Logsource => rename("logsource", Shape::LogPattern),
            Trendavg => rename("trendavg", Shape::Trend),
            Trendcount => rename("trendcount", Shape::Trend),
            Trendmax => rename("trendmax", Shape::Trend),
            Trendmin => rename("trendmin", Shape::Trend),
            Trendsum => rename("trendsum", Shape::Trend),
            Abschange => Strategy::Structural(Structure::Abschange),
            Band => Strategy::Structural(Structure::Band),
            Delta => Strategy::Structural(Structure::Delta),
            Diff => Strategy::Structural(Structure::Diff),
            Prev => Strategy::Structural(Structure::Prev),
            Strlen => Strategy::Structural(Structure::Strlen),
            Trenddelta => Strategy::Structural(Structure::Trenddelta),
            Date | Dayofmonth | Dayofweek | Now | Time => Strategy::Stateless,
            Unknown(_) => Strategy::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_round_trips() {
        for (name, function) in NAMES.iter() {
            assert_eq!(&LegacyFunction::from_name(name), function);
            assert_eq!(function.name(), *name);
            assert_ne!(function.strategy(), Strategy::Unknown);
        }
    }

    #[test]
    fn test_unknown_name() {
        let function = LegacyFunction::from_name("somefunc");
        assert_eq!(function, LegacyFunction::Unknown("somefunc".to_string()));
        assert_eq!(function.name(), "somefunc");
        assert_eq!(function.strategy(), Strategy::Unknown);
    }
}
