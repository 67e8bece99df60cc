use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

use super::temporal::BaseValue;
use crate::collections::datetime::{fmt_micros, parse_micros, TsTzSpan};
use crate::errors::{Error, Result};
use crate::utils::{from_micros, to_micros};

/// A base value attached to a single timestamp.
///
/// ## Example
/// ```
/// # use teos::temporal::TInstant;
/// # use chrono::{TimeZone, Utc};
/// let inst = TInstant::new(1.5f64, Utc.with_ymd_and_hms(2018, 1, 1, 8, 0, 0).unwrap());
/// assert_eq!(inst.value(), &1.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TInstant<V: BaseValue> {
    value: V,
    t: i64,
}

impl<V: BaseValue> TInstant<V> {
    /// Creates a temporal instant from a value and a timestamp.
    pub fn new<Tz: TimeZone>(value: V, timestamp: DateTime<Tz>) -> Self {
        TInstant {
            value,
            t: to_micros(&timestamp),
        }
    }

    pub(crate) fn from_micros(value: V, t: i64) -> Self {
        TInstant { value, t }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        from_micros(self.t)
    }

    pub(crate) fn t_micros(&self) -> i64 {
        self.t
    }

    /// The bounding box of the instant, degenerate in both dimensions.
    pub fn bounding_box(&self) -> V::BBox {
        self.value.instant_bbox(self.t)
    }

    /// The time span covered by the instant.
    pub fn timespan(&self) -> TsTzSpan {
        TsTzSpan::from_micros_bounds(self.t, self.t, true, true)
    }

    pub(crate) fn with_value(&self, value: V) -> TInstant<V> {
        TInstant {
            value,
            t: self.t,
        }
    }
}

impl<V: BaseValue> fmt::Display for TInstant<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.write_text(f)?;
        write!(f, "@{}", fmt_micros(self.t))
    }
}

impl<V: BaseValue> std::str::FromStr for TInstant<V> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let at = s
            .rfind('@')
            .ok_or_else(|| Error::parse(format!("instant needs a value@timestamp form: {s}")))?;
        let value = V::parse_text(s[..at].trim())?;
        let t = parse_micros(&s[at + 1..])?;
        Ok(TInstant { value, t })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::datetime::ts;

    #[test]
    fn display_and_parse() {
        let inst = TInstant::new(1.5f64, ts("2018-01-01 08:00:00"));
        let text = format!("{inst}");
        assert_eq!(text, "1.5@2018-01-01 08:00:00+00");
        let parsed: TInstant<f64> = text.parse().unwrap();
        assert_eq!(parsed, inst);
    }

    #[test]
    fn timespan_is_degenerate() {
        let inst = TInstant::new(true, ts("2018-01-01"));
        let span = inst.timespan();
        assert_eq!(span.lower(), span.upper());
        assert!(span.lower_inc() && span.upper_inc());
    }
}
