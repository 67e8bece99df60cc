use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

use super::interpolation::TInterpolation;
use super::temporal::BaseValue;
use super::tinstant::TInstant;
use super::tsequence::{merge_touching, TSequence};
use crate::collections::base::{Span, SpanSet};
use crate::collections::datetime::{TsTzSpan, TsTzSpanSet};
use crate::errors::{Error, Result};
use crate::utils::to_micros;
use crate::BoundingBox;

/// An ordered set of sequences that do not touch in time, sharing one base
/// type and one interpolation.
///
/// ## Example
/// ```
/// # use teos::temporal::TSequenceSet;
/// # use std::str::FromStr;
/// let ss: TSequenceSet<f64> =
///     "{[1@2020-01-01, 2@2020-01-02), [5@2020-01-05, 6@2020-01-06)}".parse().unwrap();
/// assert_eq!(ss.num_sequences(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TSequenceSet<V: BaseValue> {
    sequences: Vec<TSequence<V>>,
    bbox: V::BBox,
}

impl<V: BaseValue> TSequenceSet<V> {
    /// Build a sequence set, validating interpolation homogeneity and time
    /// ordering, and merging sequences that touch with compatible bounds.
    pub fn new(sequences: Vec<TSequence<V>>) -> Result<Self> {
        if sequences.is_empty() {
            return Err(Error::bounds("a sequence set needs at least one sequence"));
        }
        let interp = sequences[0].interpolation();
        if interp == TInterpolation::Discrete {
            return Err(Error::BadInterp {
                interp: interp.to_string(),
                base: V::BASE_TYPE,
            });
        }
        for seq in &sequences[1..] {
            if seq.interpolation() != interp {
                return Err(Error::TypeMismatch(
                    "sequences of a set share one interpolation".into(),
                ));
            }
        }
        let mut sorted = sequences;
        sorted.sort_by_key(|s| (s.period_micros().lower(), !s.lower_inc()));
        for pair in sorted.windows(2) {
            let a = pair[0].period_micros();
            let b = pair[1].period_micros();
            if a.overlaps(&b) {
                return Err(Error::NonMonotonicTime(
                    "sequences of a set overlap in time".into(),
                ));
            }
        }
        let merged = merge_touching(sorted);
        Ok(Self::from_normalized(merged))
    }

    pub(crate) fn from_normalized(sequences: Vec<TSequence<V>>) -> Self {
        let mut bbox = sequences[0].bounding_box().clone();
        for seq in &sequences[1..] {
            bbox.adjust(seq.bounding_box());
        }
        TSequenceSet { sequences, bbox }
    }

    /// Wrap restriction fragments, or nothing when there are none.
    pub(crate) fn from_fragments(fragments: Vec<TSequence<V>>) -> Option<Self> {
        if fragments.is_empty() {
            None
        } else {
            Some(Self::from_normalized(merge_touching(fragments)))
        }
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    pub fn sequences(&self) -> &[TSequence<V>] {
        &self.sequences
    }

    pub fn sequence_n(&self, n: usize) -> Option<&TSequence<V>> {
        self.sequences.get(n)
    }

    pub fn start_sequence(&self) -> &TSequence<V> {
        &self.sequences[0]
    }

    pub fn end_sequence(&self) -> &TSequence<V> {
        self.sequences.last().expect("set is non-empty")
    }

    pub fn interpolation(&self) -> TInterpolation {
        self.sequences[0].interpolation()
    }

    pub fn bounding_box(&self) -> &V::BBox {
        &self.bbox
    }

    pub fn num_instants(&self) -> usize {
        self.sequences.iter().map(TSequence::num_instants).sum()
    }

    pub fn instants(&self) -> impl Iterator<Item = &TInstant<V>> {
        self.sequences.iter().flat_map(|s| s.instants().iter())
    }

    pub fn values(&self) -> Vec<V> {
        self.instants().map(|i| i.value().clone()).collect()
    }

    pub fn start_value(&self) -> &V {
        self.start_sequence().start_value()
    }

    pub fn end_value(&self) -> &V {
        self.end_sequence().end_value()
    }

    pub fn min_value(&self) -> Option<&V> {
        self.sequences
            .iter()
            .filter_map(TSequence::min_value)
            .min_by(|a, b| a.cmp_value(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn max_value(&self) -> Option<&V> {
        self.sequences
            .iter()
            .filter_map(TSequence::max_value)
            .max_by(|a, b| a.cmp_value(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.start_sequence().start_timestamp()
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        self.end_sequence().end_timestamp()
    }

    /// The bounding period, gaps included.
    pub fn timespan(&self) -> TsTzSpan {
        let first = self.start_sequence().timespan();
        let last = self.end_sequence().timespan();
        first.hull(&last)
    }

    /// The set of periods on which the value is defined.
    pub fn time(&self) -> TsTzSpanSet {
        TsTzSpanSet::from_inner(SpanSet::new(
            self.sequences.iter().map(|s| s.period_micros()),
        ))
    }

    pub(crate) fn time_micros(&self) -> SpanSet<i64> {
        SpanSet::new(self.sequences.iter().map(|s| s.period_micros()))
    }

    /// Locate the sequence whose period could contain `t`.
    pub(crate) fn find_sequence(&self, t: i64) -> Option<&TSequence<V>> {
        let idx = self
            .sequences
            .partition_point(|s| s.period_micros().upper() < t);
        for seq in self.sequences.iter().skip(idx).take(2) {
            if seq.period_micros().contains_value(t) {
                return Some(seq);
            }
        }
        None
    }

    pub(crate) fn value_at_micros(&self, t: i64) -> Option<V> {
        self.find_sequence(t)?.value_at_micros(t)
    }

    pub fn value_at_timestamp<Tz: TimeZone>(&self, t: DateTime<Tz>) -> Option<V> {
        self.value_at_micros(to_micros(&t))
    }

    // ------------------------- Restriction -------------------------------

    pub(crate) fn at_period_micros(&self, period: &Span<i64>) -> Vec<TSequence<V>> {
        self.sequences
            .iter()
            .filter_map(|s| s.at_period_micros(period))
            .collect()
    }

    pub(crate) fn at_period_set_micros(&self, periods: &SpanSet<i64>) -> Vec<TSequence<V>> {
        self.sequences
            .iter()
            .flat_map(|s| s.at_period_set_micros(periods))
            .collect()
    }

    pub(crate) fn minus_period_micros(&self, period: &Span<i64>) -> Vec<TSequence<V>> {
        let complement = self.time_micros().difference(&SpanSet::from(*period));
        self.at_period_set_micros(&complement)
    }

    pub(crate) fn minus_period_set_micros(&self, periods: &SpanSet<i64>) -> Vec<TSequence<V>> {
        let complement = self.time_micros().difference(periods);
        self.at_period_set_micros(&complement)
    }

    pub(crate) fn at_value(&self, value: &V) -> Vec<TSequence<V>> {
        self.sequences
            .iter()
            .flat_map(|s| s.at_value(value))
            .collect()
    }

    pub(crate) fn at_values(&self, values: &[V]) -> Vec<TSequence<V>> {
        self.sequences
            .iter()
            .flat_map(|s| s.at_values(values))
            .collect()
    }

    pub(crate) fn minus_value(&self, value: &V) -> Vec<TSequence<V>> {
        self.sequences
            .iter()
            .flat_map(|s| s.minus_value(value))
            .collect()
    }

    pub(crate) fn minus_values(&self, values: &[V]) -> Vec<TSequence<V>> {
        self.sequences
            .iter()
            .flat_map(|s| s.minus_values(values))
            .collect()
    }

    pub(crate) fn ever_eq(&self, value: &V) -> bool {
        self.sequences.iter().any(|s| s.ever_eq(value))
    }

    pub(crate) fn always_eq(&self, value: &V) -> bool {
        self.sequences.iter().all(|s| s.always_eq(value))
    }

    pub(crate) fn shift_scale_micros(&self, delta: i64, width: Option<i64>) -> Result<Self> {
        let start = self.start_sequence().period_micros().lower();
        let end = self.end_sequence().period_micros().upper();
        let old_width = end - start;
        let scale = match width {
            Some(w) if old_width > 0 => {
                if w <= 0 {
                    return Err(Error::bounds("duration must be strictly positive"));
                }
                Some(w as f64 / old_width as f64)
            }
            _ => None,
        };
        let mut sequences = Vec::with_capacity(self.sequences.len());
        for seq in &self.sequences {
            let seq_start = seq.period_micros().lower();
            let offset = seq_start - start;
            let (offset, w) = match scale {
                Some(f) => {
                    let scaled_offset = (offset as f64 * f).round() as i64;
                    let scaled_width =
                        (seq.period_micros().width() * f).round() as i64;
                    (scaled_offset, Some(scaled_width.max(0)))
                }
                None => (offset, None),
            };
            let target = start + delta + offset;
            sequences.push(seq.shift_scale_micros(target - seq_start, w)?);
        }
        Ok(Self::from_normalized(sequences))
    }
}

impl<V: BaseValue> fmt::Display for TSequenceSet<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interpolation() == TInterpolation::Stepwise && V::BASE_TYPE.is_continuous() {
            f.write_str("Interp=Step;")?;
        }
        f.write_str("{")?;
        for (i, seq) in self.sequences.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let (open, close) = (
                if seq.lower_inc() { '[' } else { '(' },
                if seq.upper_inc() { ']' } else { ')' },
            );
            write!(f, "{open}")?;
            for (j, inst) in seq.instants().iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{inst}")?;
            }
            write!(f, "{close}")?;
        }
        f.write_str("}")
    }
}


/// Index of the bracket closing the sequence literal `rest` starts with,
/// skipping brackets nested inside value literals.
fn matching_close(rest: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quoted = false;
    for (i, c) in rest.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '(' | '[' if !quoted => depth += 1,
            ')' | ']' if !quoted => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

impl<V: BaseValue> std::str::FromStr for TSequenceSet<V> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut s = s.trim();
        let mut interp = None;
        if let Some(rest) = s.strip_prefix("Interp=Step;") {
            interp = Some(TInterpolation::Stepwise);
            s = rest.trim_start();
        }
        let body = s
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| Error::parse(format!("sequence set must be braced: {s}")))?;
        let mut sequences = Vec::new();
        let mut rest = body.trim();
        while !rest.is_empty() {
            let end = matching_close(rest)
                .ok_or_else(|| Error::parse(format!("unterminated sequence in: {s}")))?;
            let mut part = rest[..=end].to_string();
            if let Some(i) = interp {
                if i == TInterpolation::Stepwise {
                    part = format!("Interp=Step;{part}");
                }
            }
            sequences.push(part.parse::<TSequence<V>>()?);
            rest = rest[end + 1..].trim_start_matches([',', ' ']);
        }
        TSequenceSet::new(sequences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::base::Collection;
    use crate::collections::datetime::ts;
    use pretty_assertions::assert_eq;

    fn sset(s: &str) -> TSequenceSet<f64> {
        s.parse().unwrap()
    }

    #[test]
    fn touching_sequences_merge() {
        let a: TSequence<f64> = "[1@2020-01-01, 2@2020-01-02)".parse().unwrap();
        let b: TSequence<f64> = "[2@2020-01-02, 3@2020-01-03]".parse().unwrap();
        let ss = TSequenceSet::new(vec![a, b]).unwrap();
        assert_eq!(ss.num_sequences(), 1);
    }

    #[test]
    fn overlapping_sequences_are_rejected() {
        let a: TSequence<f64> = "[1@2020-01-01, 2@2020-01-03]".parse().unwrap();
        let b: TSequence<f64> = "[5@2020-01-02, 6@2020-01-04]".parse().unwrap();
        assert!(TSequenceSet::new(vec![a, b]).is_err());
    }

    #[test]
    fn value_lookup_spans_sequences() {
        let ss = sset("{[1@2020-01-01, 2@2020-01-02), [5@2020-01-05, 7@2020-01-07)}");
        assert_eq!(ss.value_at_timestamp(ts("2020-01-06")), Some(6.0));
        assert_eq!(ss.value_at_timestamp(ts("2020-01-03")), None);
    }

    #[test]
    fn time_reports_gaps() {
        let ss = sset("{[1@2020-01-01, 2@2020-01-02), [5@2020-01-05, 7@2020-01-07)}");
        assert_eq!(ss.time().num_spans(), 2);
        assert_eq!(
            ss.timespan(),
            (ts("2020-01-01")..ts("2020-01-07")).into()
        );
    }

    #[test]
    fn restriction_duality() {
        let ss = sset("{[1@2020-01-01, 4@2020-01-04), [5@2020-01-05, 7@2020-01-07)}");
        let p: TsTzSpan = (ts("2020-01-02")..ts("2020-01-06")).into();
        let at = TSequenceSet::from_fragments(ss.at_period_micros(&p.inner)).unwrap();
        let minus = TSequenceSet::from_fragments(ss.minus_period_micros(&p.inner)).unwrap();
        assert_eq!(at.time().union(&minus.time()), ss.time());
        assert!(!at.time().overlaps(&minus.time()));
    }

    #[test]
    fn display_round_trip() {
        let text = "{[1@2020-01-01 00:00:00+00, 2@2020-01-02 00:00:00+00), [5@2020-01-05 00:00:00+00, 7@2020-01-07 00:00:00+00)}";
        assert_eq!(format!("{}", sset(text)), text);
    }
}
