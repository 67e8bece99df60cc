use std::fmt;

use itertools::Itertools;

use super::span::{cmp_lower_lower, Span, SpanValue};
use crate::errors::{Error, Result};

/// An ordered set of disjoint, non-adjacent spans over one base type.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanSet<T: SpanValue> {
    spans: Vec<Span<T>>,
}

impl<T: SpanValue> SpanSet<T> {
    /// Build a span set, sorting the input and coalescing any overlapping
    /// or adjacent spans.
    pub fn new(spans: impl IntoIterator<Item = Span<T>>) -> Self {
        let mut sorted: Vec<Span<T>> = spans.into_iter().collect();
        sorted.sort_by(|a, b| cmp_lower_lower(a.lower_bound(), b.lower_bound()));
        let spans = sorted
            .into_iter()
            .coalesce(|a, b| if a.mergeable(&b) { Ok(a.hull(&b)) } else { Err((a, b)) })
            .collect();
        SpanSet { spans }
    }

    pub fn empty() -> Self {
        SpanSet { spans: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn num_spans(&self) -> usize {
        self.spans.len()
    }

    pub fn spans(&self) -> &[Span<T>] {
        &self.spans
    }

    pub fn span_n(&self, n: usize) -> Option<&Span<T>> {
        self.spans.get(n)
    }

    pub fn start_span(&self) -> Option<&Span<T>> {
        self.spans.first()
    }

    pub fn end_span(&self) -> Option<&Span<T>> {
        self.spans.last()
    }

    /// The bounding span of the whole set.
    pub fn span(&self) -> Option<Span<T>> {
        match (self.spans.first(), self.spans.last()) {
            (Some(first), Some(last)) => Some(first.hull(last)),
            _ => None,
        }
    }

    /// Sum of the widths of the member spans.
    pub fn width(&self) -> f64 {
        self.spans.iter().map(Span::width).sum()
    }

    pub fn contains_value(&self, value: T) -> bool {
        // binary search on the ordered spans
        let mut lo = 0usize;
        let mut hi = self.spans.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            let s = &self.spans[mid];
            if s.contains_value(value) {
                return true;
            }
            if value < s.lower() {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        false
    }

    pub fn contains_span(&self, other: &Span<T>) -> bool {
        self.spans.iter().any(|s| s.contains_span(other))
    }

    pub fn contains_span_set(&self, other: &SpanSet<T>) -> bool {
        other.spans.iter().all(|s| self.contains_span(s))
    }

    pub fn is_contained_in(&self, other: &SpanSet<T>) -> bool {
        other.contains_span_set(self)
    }

    pub fn overlaps_span(&self, other: &Span<T>) -> bool {
        if !self.fast_overlap_possible(other) {
            return false;
        }
        self.spans.iter().any(|s| s.overlaps(other))
    }

    pub fn overlaps(&self, other: &SpanSet<T>) -> bool {
        match (self.span(), other.span()) {
            (Some(a), Some(b)) if a.overlaps(&b) => {}
            _ => return false,
        }
        // merge join over the ordered spans
        let (mut i, mut j) = (0, 0);
        while i < self.spans.len() && j < other.spans.len() {
            let a = &self.spans[i];
            let b = &other.spans[j];
            if a.overlaps(b) {
                return true;
            }
            if a.is_left(b) {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }

    fn fast_overlap_possible(&self, other: &Span<T>) -> bool {
        self.span().is_some_and(|s| s.overlaps(other))
    }

    pub fn is_adjacent(&self, other: &SpanSet<T>) -> bool {
        match (self.span(), other.span()) {
            (Some(a), Some(b)) => a.is_adjacent(&b),
            _ => false,
        }
    }

    pub fn is_left(&self, other: &SpanSet<T>) -> bool {
        match (self.span(), other.span()) {
            (Some(a), Some(b)) => a.is_left(&b),
            _ => false,
        }
    }

    pub fn is_over_or_left(&self, other: &SpanSet<T>) -> bool {
        match (self.span(), other.span()) {
            (Some(a), Some(b)) => a.is_over_or_left(&b),
            _ => false,
        }
    }

    pub fn is_right(&self, other: &SpanSet<T>) -> bool {
        match (self.span(), other.span()) {
            (Some(a), Some(b)) => a.is_right(&b),
            _ => false,
        }
    }

    pub fn is_over_or_right(&self, other: &SpanSet<T>) -> bool {
        match (self.span(), other.span()) {
            (Some(a), Some(b)) => a.is_over_or_right(&b),
            _ => false,
        }
    }

    pub fn union(&self, other: &SpanSet<T>) -> SpanSet<T> {
        SpanSet::new(self.spans.iter().chain(other.spans.iter()).copied())
    }

    pub fn intersection(&self, other: &SpanSet<T>) -> SpanSet<T> {
        match (self.span(), other.span()) {
            (Some(a), Some(b)) if a.overlaps(&b) => {}
            _ => return SpanSet::empty(),
        }
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.spans.len() && j < other.spans.len() {
            let a = &self.spans[i];
            let b = &other.spans[j];
            if let Some(inter) = a.intersection(b) {
                result.push(inter);
            }
            // advance the side that ends first
            if b.is_over_or_left(a) {
                j += 1;
            } else {
                i += 1;
            }
        }
        SpanSet { spans: result }
    }

    pub fn intersection_span(&self, other: &Span<T>) -> SpanSet<T> {
        let spans = self
            .spans
            .iter()
            .filter_map(|s| s.intersection(other))
            .collect();
        SpanSet { spans }
    }

    pub fn difference(&self, other: &SpanSet<T>) -> SpanSet<T> {
        let mut result = Vec::new();
        let mut j = 0usize;
        for a in &self.spans {
            let mut cur = *a;
            loop {
                while j < other.spans.len() && other.spans[j].is_left(&cur) {
                    j += 1;
                }
                let Some(b) = other.spans.get(j) else {
                    result.push(cur);
                    break;
                };
                let Some(inter) = cur.intersection(b) else {
                    result.push(cur);
                    break;
                };
                // left remainder of cur before the intersection
                if cmp_lower_lower(cur.lower_bound(), inter.lower_bound())
                    == std::cmp::Ordering::Less
                {
                    result.push(Span::from_raw(
                        cur.lower(),
                        inter.lower(),
                        cur.lower_inc(),
                        !inter.lower_inc(),
                    ));
                }
                // continue with the remainder after the intersection
                let rest_lower = inter.upper();
                let rest_inc = !inter.upper_inc();
                let empty_rest = rest_lower > cur.upper()
                    || (rest_lower == cur.upper() && !(rest_inc && cur.upper_inc()));
                if empty_rest {
                    break;
                }
                cur = Span::from_raw(rest_lower, cur.upper(), rest_inc, cur.upper_inc());
            }
        }
        SpanSet { spans: result }
    }

    pub fn distance_to_value(&self, value: T) -> f64 {
        self.spans
            .iter()
            .map(|s| s.distance_to_value(value))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn distance_to_span_set(&self, other: &SpanSet<T>) -> f64 {
        let mut best = f64::INFINITY;
        for a in &self.spans {
            for b in &other.spans {
                best = best.min(a.distance_to_span(b));
                if best == 0.0 {
                    return 0.0;
                }
            }
        }
        best
    }

    pub fn shift_by(&self, delta: f64) -> SpanSet<T> {
        SpanSet {
            spans: self.spans.iter().map(|s| s.shift_by(delta)).collect(),
        }
    }

    pub(crate) fn from_normalized(spans: Vec<Span<T>>) -> SpanSet<T> {
        SpanSet { spans }
    }
}

impl<T: SpanValue> From<Span<T>> for SpanSet<T> {
    fn from(span: Span<T>) -> Self {
        SpanSet { spans: vec![span] }
    }
}

impl<T: SpanValue + fmt::Display> fmt::Display for SpanSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{span}")?;
        }
        f.write_str("}")
    }
}

impl<T: SpanValue + std::str::FromStr> std::str::FromStr for SpanSet<T> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let body = s
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| Error::parse(format!("span set must be braced: {s}")))?;
        let mut spans = Vec::new();
        let mut rest = body.trim();
        while !rest.is_empty() {
            let end = rest
                .find([']', ')'])
                .ok_or_else(|| Error::parse(format!("unterminated span in: {s}")))?;
            spans.push(rest[..=end].parse::<Span<T>>()?);
            rest = rest[end + 1..].trim_start_matches([',', ' ']);
        }
        Ok(SpanSet::new(spans))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs(lo: f64, hi: f64) -> Span<f64> {
        (lo..hi).into()
    }

    #[test]
    fn construction_merges_overlap_and_adjacency() {
        let ss = SpanSet::new([fs(1.0, 3.0), fs(2.0, 4.0), fs(4.0, 5.0)]);
        assert_eq!(ss.num_spans(), 1);
        assert_eq!(ss.span().unwrap(), fs(1.0, 5.0));
    }

    #[test]
    fn construction_keeps_gaps() {
        let ss = SpanSet::new([fs(5.0, 6.0), fs(1.0, 2.0)]);
        assert_eq!(ss.num_spans(), 2);
        assert_eq!(*ss.start_span().unwrap(), fs(1.0, 2.0));
    }

    #[test]
    fn membership_binary_search() {
        let ss = SpanSet::new([fs(1.0, 2.0), fs(5.0, 6.0), fs(9.0, 10.0)]);
        assert!(ss.contains_value(5.5));
        assert!(!ss.contains_value(4.0));
    }

    #[test]
    fn intersection_merge_join() {
        let a = SpanSet::new([fs(1.0, 4.0), fs(6.0, 9.0)]);
        let b = SpanSet::new([fs(3.0, 7.0)]);
        let i = a.intersection(&b);
        assert_eq!(i.spans(), &[fs(3.0, 4.0), fs(6.0, 7.0)]);
    }

    #[test]
    fn difference_splits_spans() {
        let a = SpanSet::new([fs(1.0, 10.0)]);
        let b = SpanSet::new([fs(3.0, 4.0), fs(6.0, 7.0)]);
        let d = a.difference(&b);
        assert_eq!(d.num_spans(), 3);
        assert_eq!(d.spans()[0], fs(1.0, 3.0));
        assert!(d.spans()[1].lower_inc());
        assert_eq!((d.spans()[1].lower(), d.spans()[1].upper()), (4.0, 6.0));
        assert_eq!((d.spans()[2].lower(), d.spans()[2].upper()), (7.0, 10.0));
    }

    #[test]
    fn difference_duality() {
        let a = SpanSet::new([fs(1.0, 10.0)]);
        let b = SpanSet::new([fs(3.0, 4.0)]);
        let inter = a.intersection(&b);
        let diff = a.difference(&b);
        assert!(!inter.overlaps(&diff));
        assert_eq!(inter.union(&diff), a);
    }

    #[test]
    fn parse_and_display() {
        let ss: SpanSet<f64> = "{[1, 2), [5, 6)}".parse().unwrap();
        assert_eq!(ss.num_spans(), 2);
        assert_eq!(format!("{ss}"), "{[1, 2), [5, 6)}");
    }
}
