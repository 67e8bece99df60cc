use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

use super::tstz_span::TsTzSpan;
use crate::collections::base::{impl_collection_delegate, SpanSet};
use crate::errors::{Error, Result};

/// An ordered set of disjoint time spans.
///
/// ## Example
/// ```
/// # use teos::collections::datetime::TsTzSpanSet;
/// # use std::str::FromStr;
/// let set = TsTzSpanSet::from_str("{[2023-01-01, 2023-01-02), [2023-01-05, 2023-01-06)}").unwrap();
/// assert_eq!(set.num_spans(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TsTzSpanSet {
    pub(crate) inner: SpanSet<i64>,
}

impl TsTzSpanSet {
    pub fn new(spans: impl IntoIterator<Item = TsTzSpan>) -> Self {
        TsTzSpanSet {
            inner: SpanSet::new(spans.into_iter().map(|s| s.inner)),
        }
    }

    pub fn empty() -> Self {
        TsTzSpanSet {
            inner: SpanSet::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn num_spans(&self) -> usize {
        self.inner.num_spans()
    }

    pub fn span_n(&self, n: usize) -> Option<TsTzSpan> {
        self.inner.span_n(n).map(|s| TsTzSpan::from_inner(*s))
    }

    pub fn spans(&self) -> Vec<TsTzSpan> {
        self.inner
            .spans()
            .iter()
            .map(|s| TsTzSpan::from_inner(*s))
            .collect()
    }

    /// The bounding span of the whole set.
    pub fn span(&self) -> Option<TsTzSpan> {
        self.inner.span().map(TsTzSpan::from_inner)
    }

    /// Total covered duration, ignoring the gaps.
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::microseconds(self.inner.width() as i64)
    }

    pub fn contains_timestamp(&self, t: DateTime<Utc>) -> bool {
        self.inner.contains_value(crate::utils::to_micros(&t))
    }

    pub fn union(&self, other: &TsTzSpanSet) -> TsTzSpanSet {
        TsTzSpanSet {
            inner: self.inner.union(&other.inner),
        }
    }

    pub fn intersection(&self, other: &TsTzSpanSet) -> TsTzSpanSet {
        TsTzSpanSet {
            inner: self.inner.intersection(&other.inner),
        }
    }

    pub fn difference(&self, other: &TsTzSpanSet) -> TsTzSpanSet {
        TsTzSpanSet {
            inner: self.inner.difference(&other.inner),
        }
    }

    pub(crate) fn from_inner(inner: SpanSet<i64>) -> TsTzSpanSet {
        TsTzSpanSet { inner }
    }
}

impl_collection_delegate!(TsTzSpanSet, inner, DateTime<Utc>, |t: &DateTime<Utc>| {
    crate::utils::to_micros(t)
});

impl From<TsTzSpan> for TsTzSpanSet {
    fn from(span: TsTzSpan) -> Self {
        TsTzSpanSet {
            inner: span.inner.into(),
        }
    }
}

impl fmt::Display for TsTzSpanSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, span) in self.inner.spans().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", TsTzSpan::from_inner(*span))?;
        }
        f.write_str("}")
    }
}

impl FromStr for TsTzSpanSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let body = s
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| Error::parse(format!("time span set must be braced: {s}")))?;
        let mut spans = Vec::new();
        let mut rest = body.trim();
        while !rest.is_empty() {
            let end = rest
                .find([']', ')'])
                .ok_or_else(|| Error::parse(format!("unterminated span in: {s}")))?;
            spans.push(rest[..=end].parse::<TsTzSpan>()?);
            rest = rest[end + 1..].trim_start_matches([',', ' ']);
        }
        Ok(TsTzSpanSet::new(spans))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::base::Collection;
    use crate::collections::datetime::ts;

    #[test]
    fn union_and_difference_are_dual() {
        let a: TsTzSpanSet = "{[2023-01-01, 2023-01-10)}".parse().unwrap();
        let b: TsTzSpanSet = "{[2023-01-03, 2023-01-04)}".parse().unwrap();
        let inter = a.intersection(&b);
        let diff = a.difference(&b);
        assert!(!inter.overlaps(&diff));
        assert_eq!(inter.union(&diff), a);
    }

    #[test]
    fn duration_ignores_gaps() {
        let set: TsTzSpanSet =
            "{[2023-01-01, 2023-01-02), [2023-01-05, 2023-01-06)}".parse().unwrap();
        assert_eq!(set.duration(), TimeDelta::days(2));
        assert!(set.contains_timestamp(ts("2023-01-05 12:00:00")));
        assert!(!set.contains_timestamp(ts("2023-01-03")));
    }
}
