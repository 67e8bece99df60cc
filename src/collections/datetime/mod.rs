mod tstz_span;
pub use tstz_span::TsTzSpan;

mod tstz_span_set;
pub use tstz_span_set::TsTzSpanSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::errors::{Error, Result};
use crate::utils::{from_micros, to_micros};

/// Render an internal microsecond timestamp in the canonical notation,
/// `2000-01-01 08:00:00+00`.
pub(crate) fn fmt_micros(micros: i64) -> String {
    let dt = from_micros(micros);
    if dt.timestamp_subsec_micros() == 0 {
        format!("{}+00", dt.format("%Y-%m-%d %H:%M:%S"))
    } else {
        format!("{}+00", dt.format("%Y-%m-%d %H:%M:%S%.6f"))
    }
}

/// Parse a timestamp in the canonical notation, tolerating a missing time
/// part, fractional seconds, and the `+00` / `+00:00` / `Z` offset forms.
pub(crate) fn parse_micros(s: &str) -> Result<i64> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(to_micros(&dt));
        }
    }
    let naive = s.trim_end_matches('Z').trim_end();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Ok(to_micros(&dt.and_utc()));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(naive, "%Y-%m-%d") {
        let dt = d
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::parse(format!("bad timestamp: {s}")))?;
        return Ok(to_micros(&dt.and_utc()));
    }
    Err(Error::parse(format!("bad timestamp: {s}")))
}

/// Convenience used across the tests of the temporal modules.
#[cfg(test)]
pub(crate) fn ts(s: &str) -> DateTime<chrono::Utc> {
    from_micros(parse_micros(s).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_round_trip() {
        let micros = parse_micros("2018-01-01 08:00:00+00").unwrap();
        assert_eq!(fmt_micros(micros), "2018-01-01 08:00:00+00");
    }

    #[test]
    fn tolerant_parsing() {
        let a = parse_micros("2018-01-01").unwrap();
        let b = parse_micros("2018-01-01 00:00:00").unwrap();
        let c = parse_micros("2018-01-01T00:00:00Z").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn fractional_seconds_survive() {
        let micros = parse_micros("2018-01-01 00:00:00.25+00").unwrap();
        assert_eq!(micros % 1_000_000, 250_000);
        assert_eq!(fmt_micros(micros), "2018-01-01 00:00:00.250000+00");
    }
}
