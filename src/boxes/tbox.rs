use std::fmt;

use chrono::{DateTime, TimeZone};

use crate::collections::base::Span;
use crate::collections::datetime::TsTzSpan;
use crate::collections::number::{FloatSpan, IntSpan};
use crate::errors::{Error, Result};
use crate::utils::to_micros;
use crate::BoundingBox;

/// A bounding box in value × time space. Either dimension may be absent.
///
/// The value dimension is carried over doubles, which is lossless for the
/// 32-bit integer spans it may come from.
///
/// ## Example
/// ```
/// # use teos::boxes::TBox;
/// # use std::str::FromStr;
/// let tbox = TBox::from_str("TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])").unwrap();
/// assert_eq!(tbox.xmin(), Some(3.0));
/// assert_eq!(tbox.xmax(), Some(5.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TBox {
    span: Option<Span<f64>>,
    period: Option<Span<i64>>,
}

impl TBox {
    pub fn new(span: Option<FloatSpan>, period: Option<TsTzSpan>) -> Result<Self> {
        if span.is_none() && period.is_none() {
            return Err(Error::bounds("a temporal box needs at least one dimension"));
        }
        Ok(TBox {
            span,
            period: period.map(|p| p.inner),
        })
    }

    pub fn from_value(value: f64) -> Self {
        TBox {
            span: Some(Span::singleton(value)),
            period: None,
        }
    }

    pub fn from_int(value: i32) -> Self {
        Self::from_int_span(IntSpan::singleton(value))
    }

    pub fn from_span(span: FloatSpan) -> Self {
        TBox {
            span: Some(span),
            period: None,
        }
    }

    /// Value dimension from an integer span in canonical `[L, U+1)` form.
    pub fn from_int_span(span: IntSpan) -> Self {
        // the canonical exclusive upper U+1 encloses the same integers as
        // the inclusive float bound U
        let upper = if span.upper_inc() {
            span.upper() as f64
        } else {
            (span.upper() - 1) as f64
        };
        TBox {
            span: Some(Span::from_raw(span.lower() as f64, upper, true, true)),
            period: None,
        }
    }

    pub fn from_time<Tz: TimeZone>(t: DateTime<Tz>) -> Self {
        TBox {
            span: None,
            period: Some(Span::singleton(to_micros(&t))),
        }
    }

    pub fn from_tstz_span(period: TsTzSpan) -> Self {
        TBox {
            span: None,
            period: Some(period.inner),
        }
    }

    pub(crate) fn from_raw(span: Option<Span<f64>>, period: Option<Span<i64>>) -> Self {
        TBox { span, period }
    }

    pub(crate) fn from_value_time(value: f64, t: i64) -> Self {
        TBox {
            span: Some(Span::singleton(value)),
            period: Some(Span::singleton(t)),
        }
    }

    pub fn has_x(&self) -> bool {
        self.span.is_some()
    }

    pub fn has_t(&self) -> bool {
        self.period.is_some()
    }

    pub fn value_span(&self) -> Option<FloatSpan> {
        self.span
    }

    pub fn tstz_span(&self) -> Option<TsTzSpan> {
        self.period.map(TsTzSpan::from_inner)
    }

    pub fn xmin(&self) -> Option<f64> {
        self.span.map(|s| s.lower())
    }

    pub fn xmax(&self) -> Option<f64> {
        self.span.map(|s| s.upper())
    }

    pub(crate) fn tmin_micros(&self) -> Option<i64> {
        self.period.map(|p| p.lower())
    }

    pub(crate) fn tmax_micros(&self) -> Option<i64> {
        self.period.map(|p| p.upper())
    }

    pub fn tmin(&self) -> Option<DateTime<chrono::Utc>> {
        self.tmin_micros().map(crate::utils::from_micros)
    }

    pub fn tmax(&self) -> Option<DateTime<chrono::Utc>> {
        self.tmax_micros().map(crate::utils::from_micros)
    }

    /// Expand this box in place so it also encloses `other`.
    pub fn adjust(&mut self, other: &TBox) {
        self.span = match (self.span, other.span) {
            (Some(a), Some(b)) => Some(a.hull(&b)),
            (a, b) => a.or(b),
        };
        self.period = match (self.period, other.period) {
            (Some(a), Some(b)) => Some(a.hull(&b)),
            (a, b) => a.or(b),
        };
    }

    /// Union of the two boxes.
    pub fn union(&self, other: &TBox) -> TBox {
        let mut result = *self;
        result.adjust(other);
        result
    }

    pub fn intersection(&self, other: &TBox) -> Option<TBox> {
        let span = match (self.span, other.span) {
            (Some(a), Some(b)) => Some(a.intersection(&b)?),
            (a, b) => a.or(b),
        };
        let period = match (self.period, other.period) {
            (Some(a), Some(b)) => Some(a.intersection(&b)?),
            (a, b) => a.or(b),
        };
        Some(TBox { span, period })
    }

    /// Overlap test on the dimensions both boxes carry.
    pub fn overlaps(&self, other: &TBox) -> bool {
        let x_ok = match (self.span, other.span) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => true,
        };
        let t_ok = match (self.period, other.period) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => true,
        };
        x_ok && t_ok
    }

    pub fn contains(&self, other: &TBox) -> bool {
        let x_ok = match (self.span, other.span) {
            (Some(a), Some(b)) => a.contains_span(&b),
            (None, Some(_)) => false,
            _ => true,
        };
        let t_ok = match (self.period, other.period) {
            (Some(a), Some(b)) => a.contains_span(&b),
            (None, Some(_)) => false,
            _ => true,
        };
        x_ok && t_ok
    }

    pub fn is_contained_in(&self, other: &TBox) -> bool {
        other.contains(self)
    }

    /// Exact equality on the carried bounds.
    pub fn same(&self, other: &TBox) -> bool {
        self == other
    }

    pub fn is_adjacent(&self, other: &TBox) -> bool {
        let x_adj = match (self.span, other.span) {
            (Some(a), Some(b)) => a.is_adjacent(&b),
            _ => false,
        };
        let t_adj = match (self.period, other.period) {
            (Some(a), Some(b)) => a.is_adjacent(&b),
            _ => false,
        };
        x_adj || t_adj
    }

    // Directional predicates on the value dimension.

    pub fn is_left(&self, other: &TBox) -> bool {
        matches!((self.span, other.span), (Some(a), Some(b)) if a.is_left(&b))
    }

    pub fn is_over_or_left(&self, other: &TBox) -> bool {
        matches!((self.span, other.span), (Some(a), Some(b)) if a.is_over_or_left(&b))
    }

    pub fn is_right(&self, other: &TBox) -> bool {
        matches!((self.span, other.span), (Some(a), Some(b)) if a.is_right(&b))
    }

    pub fn is_over_or_right(&self, other: &TBox) -> bool {
        matches!((self.span, other.span), (Some(a), Some(b)) if a.is_over_or_right(&b))
    }

    // Directional predicates on the time dimension.

    pub fn is_before(&self, other: &TBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_left(&b))
    }

    pub fn is_over_or_before(&self, other: &TBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_over_or_left(&b))
    }

    pub fn is_after(&self, other: &TBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_right(&b))
    }

    pub fn is_over_or_after(&self, other: &TBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_over_or_right(&b))
    }

    /// Measure used by the insertion heuristic: value width × duration,
    /// falling back to the single carried dimension.
    fn size(&self) -> f64 {
        match (self.span, self.period) {
            (Some(s), Some(p)) => s.width() * p.width(),
            (Some(s), None) => s.width(),
            (None, Some(p)) => p.width(),
            (None, None) => 0.0,
        }
    }

    /// Non-negative increase of the enclosing size when `new` is added.
    pub fn penalty(&self, new: &TBox) -> f64 {
        let union = self.union(new);
        let delta = union.size() - self.size();
        if delta.is_nan() {
            0.0
        } else {
            delta.max(0.0)
        }
    }

    /// Lower bound on the distance between values enclosed by the two
    /// boxes. Infinite when the time projections are disjoint.
    pub fn nearest_approach_distance(&self, other: &TBox) -> f64 {
        if let (Some(a), Some(b)) = (self.period, other.period) {
            if !a.overlaps(&b) {
                return f64::INFINITY;
            }
        }
        match (self.span, other.span) {
            (Some(a), Some(b)) => a.distance_to_span(&b),
            _ => 0.0,
        }
    }
}

impl BoundingBox for TBox {
    fn adjust(&mut self, other: &Self) {
        TBox::adjust(self, other)
    }

    fn overlaps(&self, other: &Self) -> bool {
        TBox::overlaps(self, other)
    }

    fn contains(&self, other: &Self) -> bool {
        TBox::contains(self, other)
    }
}

impl From<FloatSpan> for TBox {
    fn from(span: FloatSpan) -> Self {
        TBox::from_span(span)
    }
}

impl From<IntSpan> for TBox {
    fn from(span: IntSpan) -> Self {
        TBox::from_int_span(span)
    }
}

impl From<TsTzSpan> for TBox {
    fn from(period: TsTzSpan) -> Self {
        TBox::from_tstz_span(period)
    }
}

impl fmt::Display for TBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.span, self.period) {
            (Some(s), Some(p)) => {
                write!(f, "TBOXFLOAT XT({s},{})", TsTzSpan::from_inner(p))
            }
            (Some(s), None) => write!(f, "TBOXFLOAT X({s})"),
            (None, Some(p)) => write!(f, "TBOX T({})", TsTzSpan::from_inner(p)),
            (None, None) => write!(f, "TBOX()"),
        }
    }
}

impl std::str::FromStr for TBox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let rest = s
            .strip_prefix("TBOXINT")
            .or_else(|| s.strip_prefix("TBOXFLOAT"))
            .or_else(|| s.strip_prefix("TBOX"))
            .ok_or_else(|| Error::parse(format!("not a temporal box: {s}")))?
            .trim_start();
        let (dims, body) = rest
            .split_once('(')
            .ok_or_else(|| Error::parse(format!("malformed temporal box: {s}")))?;
        let body = body
            .strip_suffix(')')
            .ok_or_else(|| Error::parse(format!("malformed temporal box: {s}")))?;
        let dims = dims.trim().to_ascii_uppercase();
        let (has_x, has_t) = match dims.as_str() {
            "XT" | "" => (true, true),
            "X" => (true, false),
            "T" => (false, true),
            _ => return Err(Error::parse(format!("bad box dimensions {dims}: {s}"))),
        };
        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (i, c) in body.char_indices() {
            match c {
                '[' | '(' => depth += 1,
                ']' | ')' => depth -= 1,
                ',' if depth == 0 => {
                    parts.push(body[start..i].trim());
                    start = i + 1;
                }
                _ => {}
            }
        }
        parts.push(body[start..].trim());
        let mut iter = parts.into_iter();
        let span = if has_x {
            Some(
                iter.next()
                    .ok_or_else(|| Error::parse(format!("missing value span: {s}")))?
                    .parse::<FloatSpan>()?,
            )
        } else {
            None
        };
        let period = if has_t {
            Some(
                iter.next()
                    .ok_or_else(|| Error::parse(format!("missing time span: {s}")))?
                    .parse::<TsTzSpan>()?,
            )
        } else {
            None
        };
        TBox::new(span, period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn tbox(s: &str) -> TBox {
        TBox::from_str(s).unwrap()
    }

    #[test]
    fn parse_dimension_variants() {
        assert!(tbox("TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])").has_x());
        assert!(!tbox("TBOX T([2001-01-03, 2001-01-05])").has_x());
        assert!(!tbox("TBOXFLOAT X([3, 5])").has_t());
    }

    #[test]
    fn adjust_takes_elementwise_union() {
        let mut a = tbox("TBOXFLOAT XT([1, 2],[2001-01-01, 2001-01-02])");
        let b = tbox("TBOXFLOAT XT([4, 9],[2001-01-03, 2001-01-04])");
        a.adjust(&b);
        assert_eq!(a.xmin(), Some(1.0));
        assert_eq!(a.xmax(), Some(9.0));
        assert_eq!(a.tmax(), b.tmax());
    }

    #[test]
    fn penalty_is_volume_increase() {
        let a = tbox("TBOXFLOAT XT([0, 2],[2001-01-01, 2001-01-02])");
        let inside = tbox("TBOXFLOAT XT([1, 2],[2001-01-01, 2001-01-02])");
        let outside = tbox("TBOXFLOAT XT([0, 4],[2001-01-01, 2001-01-02])");
        assert_eq!(a.penalty(&inside), 0.0);
        assert!(a.penalty(&outside) > 0.0);
    }

    #[test]
    fn nad_is_infinite_when_time_disjoint() {
        let a = tbox("TBOXFLOAT XT([0, 2],[2001-01-01, 2001-01-02])");
        let b = tbox("TBOXFLOAT XT([5, 6],[2001-01-05, 2001-01-06])");
        assert_eq!(a.nearest_approach_distance(&b), f64::INFINITY);
        let c = tbox("TBOXFLOAT XT([5, 6],[2001-01-01, 2001-01-06])");
        assert_eq!(a.nearest_approach_distance(&c), 3.0);
    }

    #[test]
    fn int_span_conversion_is_lossless() {
        let b = TBox::from_int_span(IntSpan::new(1, 3, true, true).unwrap());
        assert_eq!(b.xmin(), Some(1.0));
        assert_eq!(b.xmax(), Some(3.0));
    }
}
