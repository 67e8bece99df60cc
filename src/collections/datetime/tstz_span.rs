use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use super::{fmt_micros, parse_micros};
use crate::collections::base::{impl_collection_delegate, Span};
use crate::errors::{Error, Result};
use crate::utils::{from_micros, interval_to_units, to_micros};

/// A span over timestamps with time zone.
///
/// ## Example
/// ```
/// # use teos::collections::datetime::TsTzSpan;
/// # use chrono::naive::NaiveDate;
/// let from_ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d)
///     .unwrap().and_hms_opt(0, 0, 0)
///     .unwrap().and_utc();
///
/// let span: TsTzSpan = (from_ymd(2023, 1, 1)..from_ymd(2023, 1, 15)).into();
/// assert_eq!(span.lower(), from_ymd(2023, 1, 1));
/// assert!(span.lower_inc());
/// assert!(!span.upper_inc());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TsTzSpan {
    pub(crate) inner: Span<i64>,
}

impl TsTzSpan {
    /// Build a time span from datetimes, validating the bounds.
    pub fn new<Tz: TimeZone>(
        lower: DateTime<Tz>,
        upper: DateTime<Tz>,
        lower_inc: bool,
        upper_inc: bool,
    ) -> Result<Self> {
        Ok(TsTzSpan {
            inner: Span::new(to_micros(&lower), to_micros(&upper), lower_inc, upper_inc)?,
        })
    }

    /// A span holding exactly one instant.
    pub fn singleton<Tz: TimeZone>(t: DateTime<Tz>) -> Self {
        TsTzSpan {
            inner: Span::singleton(to_micros(&t)),
        }
    }

    pub fn lower(&self) -> DateTime<Utc> {
        from_micros(self.inner.lower())
    }

    pub fn upper(&self) -> DateTime<Utc> {
        from_micros(self.inner.upper())
    }

    pub fn lower_inc(&self) -> bool {
        self.inner.lower_inc()
    }

    pub fn upper_inc(&self) -> bool {
        self.inner.upper_inc()
    }

    /// Width of the span as a duration.
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::microseconds(self.inner.upper() - self.inner.lower())
    }

    pub fn contains_timestamp<Tz: TimeZone>(&self, t: DateTime<Tz>) -> bool {
        self.inner.contains_value(to_micros(&t))
    }

    pub fn intersection(&self, other: &TsTzSpan) -> Option<TsTzSpan> {
        self.inner
            .intersection(&other.inner)
            .map(|inner| TsTzSpan { inner })
    }

    pub fn hull(&self, other: &TsTzSpan) -> TsTzSpan {
        TsTzSpan {
            inner: self.inner.hull(&other.inner),
        }
    }

    /// Distance to another span as a duration, zero when they overlap.
    pub fn distance_to_span(&self, other: &TsTzSpan) -> TimeDelta {
        TimeDelta::microseconds(self.inner.distance_to_span(&other.inner) as i64)
    }

    /// Return a new span with both bounds shifted by `delta`.
    pub fn shift(&self, delta: TimeDelta) -> Result<TsTzSpan> {
        let micros = delta
            .num_microseconds()
            .ok_or_else(|| Error::RangeOverflow("shift out of range".into()))?;
        Ok(TsTzSpan {
            inner: self.inner.shift_by(micros as f64),
        })
    }

    /// Return a new span scaled so its duration is `width`.
    pub fn scale(&self, width: TimeDelta) -> Result<TsTzSpan> {
        Ok(TsTzSpan {
            inner: self.inner.scale_to(interval_to_units(&width)? as f64)?,
        })
    }

    /// Return a new span shifted by `delta` and scaled to `width`.
    pub fn shift_scale(&self, delta: Option<TimeDelta>, width: Option<TimeDelta>) -> Result<TsTzSpan> {
        let mut result = *self;
        if let Some(delta) = delta {
            result = result.shift(delta)?;
        }
        if let Some(width) = width {
            result = result.scale(width)?;
        }
        Ok(result)
    }

    pub(crate) fn from_inner(inner: Span<i64>) -> TsTzSpan {
        TsTzSpan { inner }
    }

    pub(crate) fn from_micros_bounds(
        lower: i64,
        upper: i64,
        lower_inc: bool,
        upper_inc: bool,
    ) -> TsTzSpan {
        TsTzSpan {
            inner: Span::from_raw(lower, upper, lower_inc, upper_inc),
        }
    }
}

impl_collection_delegate!(TsTzSpan, inner, DateTime<Utc>, |t: &DateTime<Utc>| {
    crate::utils::to_micros(t)
});

impl<Tz: TimeZone> From<Range<DateTime<Tz>>> for TsTzSpan {
    fn from(range: Range<DateTime<Tz>>) -> Self {
        TsTzSpan::new(range.start, range.end, true, false).expect("non-empty range")
    }
}

impl fmt::Display for TsTzSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower_inc() { '[' } else { '(' },
            fmt_micros(self.inner.lower()),
            fmt_micros(self.inner.upper()),
            if self.upper_inc() { ']' } else { ')' },
        )
    }
}

impl FromStr for TsTzSpan {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        let lower_inc = match chars.next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(Error::parse(format!("time span must start with [ or (: {s}"))),
        };
        let upper_inc = match chars.next_back() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(Error::parse(format!("time span must end with ] or ): {s}"))),
        };
        let body = &s[1..s.len() - 1];
        let (lo, hi) = body
            .split_once(',')
            .ok_or_else(|| Error::parse(format!("time span needs two bounds: {s}")))?;
        Ok(TsTzSpan {
            inner: Span::new(parse_micros(lo)?, parse_micros(hi)?, lower_inc, upper_inc)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::base::Collection;
    use crate::collections::datetime::ts;

    #[test]
    fn parse_display_round_trip() {
        let span: TsTzSpan = "[2023-01-01, 2023-01-15)".parse().unwrap();
        assert_eq!(
            format!("{span}"),
            "[2023-01-01 00:00:00+00, 2023-01-15 00:00:00+00)"
        );
    }

    #[test]
    fn shift_moves_both_bounds() {
        let span: TsTzSpan = (ts("2023-01-01")..ts("2023-01-15")).into();
        let shifted = span.shift(TimeDelta::weeks(8)).unwrap();
        let expected: TsTzSpan = (ts("2023-02-26")..ts("2023-03-12")).into();
        assert_eq!(shifted, expected);
    }

    #[test]
    fn scale_fixes_duration() {
        let span: TsTzSpan = (ts("2023-01-01")..ts("2023-01-15")).into();
        let scaled = span.scale(TimeDelta::weeks(4)).unwrap();
        assert_eq!(scaled.duration(), TimeDelta::weeks(4));
        assert_eq!(scaled.lower(), ts("2023-01-01"));
    }

    #[test]
    fn collection_predicates() {
        let a: TsTzSpan = (ts("2023-01-01")..ts("2023-01-10")).into();
        let b: TsTzSpan = (ts("2023-01-03")..ts("2023-01-05")).into();
        assert!(b.is_contained_in(&a));
        assert!(a.contains(&ts("2023-01-03")));
        assert!(a.overlaps(&b));
        assert!(!a.is_left(&b));
    }
}
