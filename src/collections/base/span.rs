use std::cmp::Ordering;
use std::fmt;

use crate::base::BaseType;
use crate::errors::{Error, Result};

/// Base types usable as span bounds.
///
/// Discrete types canonicalize their bounds so the upper one is exclusive,
/// `[L, U] -> [L, U+1)`; continuous types keep bounds as given.
pub trait SpanValue: Copy + PartialOrd + PartialEq + fmt::Debug {
    const BASE_TYPE: BaseType;

    /// Rewrite bounds into the canonical form for this type.
    fn canonicalize(
        lower: Self,
        upper: Self,
        lower_inc: bool,
        upper_inc: bool,
    ) -> (Self, Self, bool, bool) {
        (lower, upper, lower_inc, upper_inc)
    }

    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

impl SpanValue for i32 {
    const BASE_TYPE: BaseType = BaseType::Int4;

    fn canonicalize(
        mut lower: Self,
        mut upper: Self,
        mut lower_inc: bool,
        mut upper_inc: bool,
    ) -> (Self, Self, bool, bool) {
        if !lower_inc && lower < i32::MAX {
            lower += 1;
            lower_inc = true;
        }
        if upper_inc && upper < i32::MAX {
            upper += 1;
            upper_inc = false;
        }
        (lower, upper, lower_inc, upper_inc)
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round() as i32
    }
}

/// Microsecond timestamps. Treated as continuous: bounds keep their
/// inclusivity instead of shifting by one microsecond.
impl SpanValue for i64 {
    const BASE_TYPE: BaseType = BaseType::TimestampTz;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round() as i64
    }
}

impl SpanValue for f64 {
    const BASE_TYPE: BaseType = BaseType::Float8;

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

/// A set of contiguous values between two bounds, each of which may or may
/// not belong to the span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span<T: SpanValue> {
    lower: T,
    upper: T,
    lower_inc: bool,
    upper_inc: bool,
}

/// Compare two lower bounds. At equal values an inclusive bound starts first.
pub(crate) fn cmp_lower_lower<T: SpanValue>(a: (T, bool), b: (T, bool)) -> Ordering {
    match a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal) {
        Ordering::Equal => match (a.1, b.1) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => Ordering::Equal,
        },
        ord => ord,
    }
}

/// Compare two upper bounds. At equal values an exclusive bound ends first.
pub(crate) fn cmp_upper_upper<T: SpanValue>(a: (T, bool), b: (T, bool)) -> Ordering {
    match a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal) {
        Ordering::Equal => match (a.1, b.1) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            _ => Ordering::Equal,
        },
        ord => ord,
    }
}

/// Compare a lower bound against an upper bound. `Equal` means the two
/// bounds share exactly one point (both inclusive at the same value).
pub(crate) fn cmp_lower_upper<T: SpanValue>(lower: (T, bool), upper: (T, bool)) -> Ordering {
    match lower.0.partial_cmp(&upper.0).unwrap_or(Ordering::Equal) {
        Ordering::Equal => {
            if lower.1 && upper.1 {
                Ordering::Equal
            } else {
                Ordering::Greater
            }
        }
        ord => ord,
    }
}

impl<T: SpanValue> Span<T> {
    /// Build a span, canonicalizing the bounds and validating them.
    ///
    /// Fails when the lower bound is above the upper one, or when the two
    /// are equal but at least one is exclusive (empty interior).
    pub fn new(lower: T, upper: T, lower_inc: bool, upper_inc: bool) -> Result<Self> {
        let (lower, upper, lower_inc, upper_inc) =
            T::canonicalize(lower, upper, lower_inc, upper_inc);
        if lower > upper {
            return Err(Error::bounds(format!(
                "lower bound {lower:?} above upper bound {upper:?}"
            )));
        }
        if lower == upper && !(lower_inc && upper_inc) {
            return Err(Error::bounds(format!(
                "span [{lower:?}, {upper:?}] with an exclusive bound is empty"
            )));
        }
        Ok(Span {
            lower,
            upper,
            lower_inc,
            upper_inc,
        })
    }

    /// A span holding exactly one value.
    pub fn singleton(value: T) -> Self {
        Span::new(value, value, true, true).expect("singleton span")
    }

    pub fn lower(&self) -> T {
        self.lower
    }

    pub fn upper(&self) -> T {
        self.upper
    }

    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    pub(crate) fn lower_bound(&self) -> (T, bool) {
        (self.lower, self.lower_inc)
    }

    pub(crate) fn upper_bound(&self) -> (T, bool) {
        (self.upper, self.upper_inc)
    }

    pub fn width(&self) -> f64 {
        self.upper.to_f64() - self.lower.to_f64()
    }

    pub fn contains_value(&self, value: T) -> bool {
        let above_lower = value > self.lower || (value == self.lower && self.lower_inc);
        let below_upper = value < self.upper || (value == self.upper && self.upper_inc);
        above_lower && below_upper
    }

    pub fn contains_span(&self, other: &Span<T>) -> bool {
        cmp_lower_lower(self.lower_bound(), other.lower_bound()) != Ordering::Greater
            && cmp_upper_upper(self.upper_bound(), other.upper_bound()) != Ordering::Less
    }

    pub fn is_contained_in(&self, other: &Span<T>) -> bool {
        other.contains_span(self)
    }

    pub fn overlaps(&self, other: &Span<T>) -> bool {
        cmp_lower_upper(self.lower_bound(), other.upper_bound()) != Ordering::Greater
            && cmp_lower_upper(other.lower_bound(), self.upper_bound()) != Ordering::Greater
    }

    /// Whether the two spans touch without sharing a point and without a gap.
    pub fn is_adjacent(&self, other: &Span<T>) -> bool {
        (self.upper == other.lower && self.upper_inc != other.lower_inc)
            || (other.upper == self.lower && other.upper_inc != self.lower_inc)
    }

    /// Strictly before: `self` ends before `other` starts.
    pub fn is_left(&self, other: &Span<T>) -> bool {
        cmp_lower_upper(other.lower_bound(), self.upper_bound()) == Ordering::Greater
    }

    /// Does not extend past the right of `other`.
    pub fn is_over_or_left(&self, other: &Span<T>) -> bool {
        cmp_upper_upper(self.upper_bound(), other.upper_bound()) != Ordering::Greater
    }

    /// Strictly after: `self` starts after `other` ends.
    pub fn is_right(&self, other: &Span<T>) -> bool {
        other.is_left(self)
    }

    /// Does not extend past the left of `other`.
    pub fn is_over_or_right(&self, other: &Span<T>) -> bool {
        cmp_lower_lower(self.lower_bound(), other.lower_bound()) != Ordering::Less
    }

    pub fn intersection(&self, other: &Span<T>) -> Option<Span<T>> {
        if !self.overlaps(other) {
            return None;
        }
        let (lower, lower_inc) =
            if cmp_lower_lower(self.lower_bound(), other.lower_bound()) == Ordering::Less {
                other.lower_bound()
            } else {
                self.lower_bound()
            };
        let (upper, upper_inc) =
            if cmp_upper_upper(self.upper_bound(), other.upper_bound()) == Ordering::Greater {
                other.upper_bound()
            } else {
                self.upper_bound()
            };
        Some(Span {
            lower,
            upper,
            lower_inc,
            upper_inc,
        })
    }

    /// The smallest span covering both inputs, bridging any gap.
    pub fn hull(&self, other: &Span<T>) -> Span<T> {
        let (lower, lower_inc) =
            if cmp_lower_lower(self.lower_bound(), other.lower_bound()) == Ordering::Greater {
                other.lower_bound()
            } else {
                self.lower_bound()
            };
        let (upper, upper_inc) =
            if cmp_upper_upper(self.upper_bound(), other.upper_bound()) == Ordering::Less {
                other.upper_bound()
            } else {
                self.upper_bound()
            };
        Span {
            lower,
            upper,
            lower_inc,
            upper_inc,
        }
    }

    /// Whether the two spans can merge into a single span.
    pub(crate) fn mergeable(&self, other: &Span<T>) -> bool {
        self.overlaps(other) || self.is_adjacent(other)
    }

    /// Distance between the span and a value, zero when contained.
    pub fn distance_to_value(&self, value: T) -> f64 {
        if self.contains_value(value) {
            0.0
        } else if value < self.lower {
            self.lower.to_f64() - value.to_f64()
        } else {
            value.to_f64() - self.upper.to_f64()
        }
    }

    /// Distance between two spans, zero when they overlap or touch.
    pub fn distance_to_span(&self, other: &Span<T>) -> f64 {
        if self.overlaps(other) || self.is_adjacent(other) {
            0.0
        } else if self.is_left(other) {
            other.lower.to_f64() - self.upper.to_f64()
        } else {
            self.lower.to_f64() - other.upper.to_f64()
        }
    }

    /// Shift both bounds by `delta` units.
    pub fn shift_by(&self, delta: f64) -> Span<T> {
        Span {
            lower: T::from_f64(self.lower.to_f64() + delta),
            upper: T::from_f64(self.upper.to_f64() + delta),
            lower_inc: self.lower_inc,
            upper_inc: self.upper_inc,
        }
    }

    /// Rescale so the width becomes `width`, keeping the lower bound.
    pub fn scale_to(&self, width: f64) -> Result<Span<T>> {
        if width <= 0.0 {
            return Err(Error::bounds("span width must be strictly positive"));
        }
        Ok(Span {
            lower: self.lower,
            upper: T::from_f64(self.lower.to_f64() + width),
            lower_inc: self.lower_inc,
            upper_inc: self.upper_inc,
        })
    }

    pub(crate) fn from_raw(lower: T, upper: T, lower_inc: bool, upper_inc: bool) -> Span<T> {
        Span {
            lower,
            upper,
            lower_inc,
            upper_inc,
        }
    }
}

impl<T: SpanValue + fmt::Display> fmt::Display for Span<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower_inc { '[' } else { '(' },
            self.lower,
            self.upper,
            if self.upper_inc { ']' } else { ')' },
        )
    }
}

impl<T: SpanValue + std::str::FromStr> std::str::FromStr for Span<T> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        let lower_inc = match chars.next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(Error::parse(format!("span must start with [ or (: {s}"))),
        };
        let upper_inc = match chars.next_back() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(Error::parse(format!("span must end with ] or ): {s}"))),
        };
        let body = &s[1..s.len() - 1];
        let (lo, hi) = body
            .split_once(',')
            .ok_or_else(|| Error::parse(format!("span needs two bounds: {s}")))?;
        let lower = lo
            .trim()
            .parse::<T>()
            .map_err(|_| Error::parse(format!("bad span lower bound: {lo}")))?;
        let upper = hi
            .trim()
            .parse::<T>()
            .map_err(|_| Error::parse(format!("bad span upper bound: {hi}")))?;
        Span::new(lower, upper, lower_inc, upper_inc)
    }
}

impl<T: SpanValue> From<std::ops::Range<T>> for Span<T> {
    fn from(range: std::ops::Range<T>) -> Self {
        Span::new(range.start, range.end, true, false).expect("non-empty range")
    }
}

impl<T: SpanValue> From<std::ops::RangeInclusive<T>> for Span<T> {
    fn from(range: std::ops::RangeInclusive<T>) -> Self {
        Span::new(*range.start(), *range.end(), true, true).expect("non-empty range")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_bounds() {
        assert!(Span::new(3.0, 2.0, true, true).is_err());
        assert!(Span::new(2.0, 2.0, true, false).is_err());
        assert!(Span::new(2.0, 2.0, true, true).is_ok());
    }

    #[test]
    fn int_spans_canonicalize_to_exclusive_upper() {
        let s = Span::new(1, 3, true, true).unwrap();
        assert_eq!(s.upper(), 4);
        assert!(!s.upper_inc());
        assert!(s.contains_value(3));
        assert!(!s.contains_value(4));
    }

    #[test]
    fn overlap_respects_inclusivity() {
        let a: Span<f64> = Span::new(1.0, 2.0, true, true).unwrap();
        let b: Span<f64> = Span::new(2.0, 3.0, true, true).unwrap();
        let c: Span<f64> = Span::new(2.0, 3.0, false, true).unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.is_adjacent(&c));
        assert!(!a.is_adjacent(&b));
    }

    #[test]
    fn intersection_and_hull() {
        let a: Span<f64> = (1.0..4.0).into();
        let b: Span<f64> = (2.0..6.0).into();
        let i = a.intersection(&b).unwrap();
        assert_eq!((i.lower(), i.upper()), (2.0, 4.0));
        let h = a.hull(&b);
        assert_eq!((h.lower(), h.upper()), (1.0, 6.0));
    }

    #[test]
    fn positional_predicates() {
        let a: Span<f64> = (1.0..2.0).into();
        let b: Span<f64> = (2.0..3.0).into();
        assert!(a.is_left(&b));
        assert!(b.is_right(&a));
        assert!(a.is_over_or_left(&b));
        assert!(b.is_over_or_right(&a));
    }

    #[test]
    fn distances() {
        let a: Span<f64> = (1.0..2.0).into();
        let b: Span<f64> = (5.0..6.0).into();
        assert_eq!(a.distance_to_span(&b), 3.0);
        assert_eq!(a.distance_to_value(0.5), 0.5);
        assert_eq!(a.distance_to_value(1.5), 0.0);
    }

    #[test]
    fn parse_round_trip() {
        let s: Span<f64> = "[23.9, 78.8)".parse().unwrap();
        assert!(s.lower_inc() && !s.upper_inc());
        assert_eq!(format!("{s}"), "[23.9, 78.8)");
    }
}
