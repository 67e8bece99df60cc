use crate::boxes::TBox;
use crate::collections::base::{Span, SpanSet, SpanValue};
use crate::collections::number::FloatSpan;
use crate::errors::{Error, Result};
use crate::temporal::lifting::{lift_binary, lift_with_value, LiftSpec};
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;
use crate::temporal::{BaseValue, TInterpolation, Temporal, EPSILON};

/// Numeric base types: the ones temporal arithmetic is defined over.
pub trait NumberBase: BaseValue<BBox = TBox> + SpanValue {
    fn as_f64_value(&self) -> f64;
    fn from_f64_value(value: f64) -> Self;

    fn add_values(&self, other: &Self) -> Result<Self>;
    fn sub_values(&self, other: &Self) -> Result<Self>;
    fn mul_values(&self, other: &Self) -> Result<Self>;
    fn div_values(&self, other: &Self) -> Result<Self>;
    fn neg_value(&self) -> Self;
}

impl NumberBase for i32 {
    fn as_f64_value(&self) -> f64 {
        *self as f64
    }

    fn from_f64_value(value: f64) -> Self {
        value.round() as i32
    }

    fn add_values(&self, other: &Self) -> Result<Self> {
        self.checked_add(*other)
            .ok_or_else(|| Error::RangeOverflow("int4 addition".into()))
    }

    fn sub_values(&self, other: &Self) -> Result<Self> {
        self.checked_sub(*other)
            .ok_or_else(|| Error::RangeOverflow("int4 subtraction".into()))
    }

    fn mul_values(&self, other: &Self) -> Result<Self> {
        self.checked_mul(*other)
            .ok_or_else(|| Error::RangeOverflow("int4 multiplication".into()))
    }

    fn div_values(&self, other: &Self) -> Result<Self> {
        if *other == 0 {
            return Err(Error::DivZero(0));
        }
        Ok(self / other)
    }

    fn neg_value(&self) -> Self {
        -self
    }
}

impl NumberBase for f64 {
    fn as_f64_value(&self) -> f64 {
        *self
    }

    fn from_f64_value(value: f64) -> Self {
        value
    }

    fn add_values(&self, other: &Self) -> Result<Self> {
        Ok(self + other)
    }

    fn sub_values(&self, other: &Self) -> Result<Self> {
        Ok(self - other)
    }

    fn mul_values(&self, other: &Self) -> Result<Self> {
        Ok(self * other)
    }

    fn div_values(&self, other: &Self) -> Result<Self> {
        if *other == 0.0 {
            return Err(Error::DivZero(0));
        }
        Ok(self / other)
    }

    fn neg_value(&self) -> Self {
        -self
    }
}

/// Turning point of the product of two linear segments, where the result
/// stops being linear.
fn mult_turning_point<V: NumberBase>(a0: &V, a1: &V, b0: &V, b1: &V) -> Vec<f64> {
    let (a0, a1, b0, b1) = (
        a0.as_f64_value(),
        a1.as_f64_value(),
        b0.as_f64_value(),
        b1.as_f64_value(),
    );
    let (da, db) = (a1 - a0, b1 - b0);
    if (da * db).abs() <= EPSILON {
        return Vec::new();
    }
    let frac = -(a0 * db + b0 * da) / (2.0 * da * db);
    if frac > 0.0 && frac < 1.0 {
        vec![frac]
    } else {
        Vec::new()
    }
}

/// Fraction at which a linear divisor segment reaches zero.
fn divisor_zero<V: NumberBase>(_a0: &V, _a1: &V, b0: &V, b1: &V) -> Vec<f64> {
    let (b0, b1) = (b0.as_f64_value(), b1.as_f64_value());
    if (b1 - b0).abs() <= EPSILON {
        return Vec::new();
    }
    let frac = -b0 / (b1 - b0);
    if frac > 0.0 && frac < 1.0 {
        vec![frac]
    } else {
        Vec::new()
    }
}

/// Operations over temporal numbers.
pub trait TNumber: Sized {
    type Base: NumberBase;

    /// The bounding box in value and time.
    fn bounding_tbox(&self) -> TBox;

    /// The span of values taken, from the bounding box.
    fn value_span(&self) -> Option<FloatSpan>;

    fn add(&self, other: &Self) -> Result<Option<Self>>;
    fn sub(&self, other: &Self) -> Result<Option<Self>>;
    fn mul(&self, other: &Self) -> Result<Option<Self>>;
    fn div(&self, other: &Self) -> Result<Option<Self>>;

    fn add_value(&self, value: Self::Base) -> Result<Option<Self>>;
    fn sub_value(&self, value: Self::Base) -> Result<Option<Self>>;
    fn mul_value(&self, value: Self::Base) -> Result<Option<Self>>;
    fn div_value(&self, value: Self::Base) -> Result<Option<Self>>;

    fn negate(&self) -> Self;

    /// Temporal distance to another temporal number.
    fn tdistance(&self, other: &Self) -> Result<Option<Temporal<f64>>>;

    /// Smallest distance ever between the two temporal numbers.
    fn nearest_approach_distance(&self, other: &Self) -> Result<Option<f64>>;

    /// Restrict to the times the value falls inside the span.
    fn at_span(&self, span: &Span<Self::Base>) -> Option<Self>;

    /// Restrict to the times the value falls outside the span.
    fn minus_span(&self, span: &Span<Self::Base>) -> Option<Self>;

    fn at_span_set(&self, spans: &SpanSet<Self::Base>) -> Option<Self>;

    fn minus_span_set(&self, spans: &SpanSet<Self::Base>) -> Option<Self>;

    /// Restrict to a value-and-time box.
    fn at_tbox(&self, tbox: &TBox) -> Option<Self>;
}

impl<V: NumberBase> TNumber for Temporal<V> {
    type Base = V;

    fn bounding_tbox(&self) -> TBox {
        self.bounding_box()
    }

    fn value_span(&self) -> Option<FloatSpan> {
        self.bounding_tbox().value_span()
    }

    fn add(&self, other: &Self) -> Result<Option<Self>> {
        lift_binary(self, other, &LiftSpec::no_cross(true), &|a: &V, b: &V| {
            a.add_values(b)
        })
    }

    fn sub(&self, other: &Self) -> Result<Option<Self>> {
        lift_binary(self, other, &LiftSpec::no_cross(true), &|a: &V, b: &V| {
            a.sub_values(b)
        })
    }

    fn mul(&self, other: &Self) -> Result<Option<Self>> {
        let spec = LiftSpec::with_crossings(true, mult_turning_point::<V>);
        lift_binary(self, other, &spec, &|a: &V, b: &V| a.mul_values(b))
    }

    fn div(&self, other: &Self) -> Result<Option<Self>> {
        let spec = LiftSpec::with_crossings(true, divisor_zero::<V>);
        lift_binary(self, other, &spec, &|a: &V, b: &V| a.div_values(b))
    }

    fn add_value(&self, value: V) -> Result<Option<Self>> {
        lift_with_value(self, &value, &LiftSpec::no_cross(true), &|a: &V, b: &V| {
            a.add_values(b)
        })
    }

    fn sub_value(&self, value: V) -> Result<Option<Self>> {
        lift_with_value(self, &value, &LiftSpec::no_cross(true), &|a: &V, b: &V| {
            a.sub_values(b)
        })
    }

    fn mul_value(&self, value: V) -> Result<Option<Self>> {
        lift_with_value(self, &value, &LiftSpec::no_cross(true), &|a: &V, b: &V| {
            a.mul_values(b)
        })
    }

    fn div_value(&self, value: V) -> Result<Option<Self>> {
        if value.as_f64_value() == 0.0 {
            return Err(Error::DivZero(0));
        }
        lift_with_value(self, &value, &LiftSpec::no_cross(true), &|a: &V, b: &V| {
            a.div_values(b)
        })
    }

    fn negate(&self) -> Self {
        self.map_values(&|v: &V| Ok(v.neg_value()))
            .expect("negation cannot fail")
    }

    fn tdistance(&self, other: &Self) -> Result<Option<Temporal<f64>>> {
        let spec = LiftSpec::with_crossings(true, |a0: &V, a1: &V, b0: &V, b1: &V| {
            V::eq_crossing(a0, a1, b0, b1).map_or_else(Vec::new, |f| vec![f])
        });
        lift_binary(self, other, &spec, &|a: &V, b: &V| {
            Ok((a.as_f64_value() - b.as_f64_value()).abs())
        })
    }

    fn nearest_approach_distance(&self, other: &Self) -> Result<Option<f64>> {
        Ok(self
            .tdistance(other)?
            .and_then(|d| d.min_value().copied()))
    }

    fn at_span(&self, span: &Span<V>) -> Option<Self> {
        // fast rejection on the cached box
        if let Some(vs) = self.value_span() {
            let query = Span::from_raw(
                span.lower().to_f64(),
                span.upper().to_f64(),
                span.lower_inc(),
                span.upper_inc(),
            );
            if !vs.overlaps(&query) {
                return None;
            }
        }
        match self {
            Temporal::Instant(inst) => span
                .contains_value(*inst.value())
                .then(|| self.clone()),
            Temporal::Sequence(seq) if seq.is_discrete() => {
                let kept: Vec<_> = seq
                    .instants()
                    .iter()
                    .filter(|i| span.contains_value(*i.value()))
                    .cloned()
                    .collect();
                TSequence::discrete(kept).ok().map(Temporal::Sequence)
            }
            Temporal::Sequence(seq) => {
                TSequenceSet::from_fragments(sequence_at_span(seq, span))
                    .map(Temporal::SequenceSet)
            }
            Temporal::SequenceSet(ss) => TSequenceSet::from_fragments(
                ss.sequences()
                    .iter()
                    .flat_map(|s| sequence_at_span(s, span))
                    .collect(),
            )
            .map(Temporal::SequenceSet),
        }
    }

    fn minus_span(&self, span: &Span<V>) -> Option<Self> {
        match self {
            Temporal::Instant(inst) => {
                (!span.contains_value(*inst.value())).then(|| self.clone())
            }
            Temporal::Sequence(seq) if seq.is_discrete() => {
                let kept: Vec<_> = seq
                    .instants()
                    .iter()
                    .filter(|i| !span.contains_value(*i.value()))
                    .cloned()
                    .collect();
                TSequence::discrete(kept).ok().map(Temporal::Sequence)
            }
            Temporal::Sequence(seq) => {
                let fragments = seq.minus_fragments(&sequence_at_span(seq, span));
                TSequenceSet::from_fragments(fragments).map(Temporal::SequenceSet)
            }
            Temporal::SequenceSet(ss) => TSequenceSet::from_fragments(
                ss.sequences()
                    .iter()
                    .flat_map(|s| s.minus_fragments(&sequence_at_span(s, span)))
                    .collect(),
            )
            .map(Temporal::SequenceSet),
        }
    }

    fn at_span_set(&self, spans: &SpanSet<V>) -> Option<Self> {
        let mut parts: Vec<Self> = spans
            .spans()
            .iter()
            .filter_map(|s| self.at_span(s))
            .collect();
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => {
                let first = parts.remove(0);
                first.merge(&parts).ok()
            }
        }
    }

    fn minus_span_set(&self, spans: &SpanSet<V>) -> Option<Self> {
        let mut result = self.clone();
        for span in spans.spans() {
            result = result.minus_span(span)?;
        }
        Some(result)
    }

    fn at_tbox(&self, tbox: &TBox) -> Option<Self> {
        let mut result = self.clone();
        if let Some(period) = tbox.tstz_span() {
            result = result.at_period(&period)?;
        }
        if let Some(span) = tbox.value_span() {
            let span = Span::new(
                V::from_f64(span.lower()),
                V::from_f64(span.upper()),
                span.lower_inc(),
                span.upper_inc(),
            )
            .ok()?;
            result = result.at_span(&span)?;
        }
        Some(result)
    }
}

/// Restrict one continuous sequence to a value span.
fn sequence_at_span<V: NumberBase>(seq: &TSequence<V>, span: &Span<V>) -> Vec<TSequence<V>> {
    if seq.num_instants() == 1 {
        return if span.contains_value(*seq.start_value()) {
            vec![seq.clone()]
        } else {
            Vec::new()
        };
    }
    let mut fragments = Vec::new();
    for (start, end, lower_inc, upper_inc) in seq.segments() {
        match seq.interpolation() {
            TInterpolation::Linear => segment_at_span_linear(
                start, end, lower_inc, upper_inc, span, &mut fragments,
            ),
            _ => {
                if span.contains_value(*start.value()) {
                    fragments.push(TSequence::from_parts(
                        vec![
                            start.clone(),
                            TInstant::from_micros(start.value().clone(), end.t_micros()),
                        ],
                        lower_inc,
                        false,
                        seq.interpolation(),
                    ));
                }
                if upper_inc && span.contains_value(*end.value()) {
                    fragments.push(TSequence::from_parts(
                        vec![end.clone()],
                        true,
                        true,
                        seq.interpolation(),
                    ));
                }
            }
        }
    }
    crate::temporal::tsequence::merge_touching(fragments)
}

/// Clip one linear segment against a value span, keeping the exact span
/// bounds as the values of the synthesized boundary instants.
fn segment_at_span_linear<V: NumberBase>(
    start: &TInstant<V>,
    end: &TInstant<V>,
    lower_inc: bool,
    upper_inc: bool,
    span: &Span<V>,
    fragments: &mut Vec<TSequence<V>>,
) {
    let v0 = start.value().as_f64_value();
    let v1 = end.value().as_f64_value();
    if v0 == v1 {
        if span.contains_value(*start.value()) {
            fragments.push(TSequence::from_parts(
                vec![start.clone(), end.clone()],
                lower_inc,
                upper_inc,
                TInterpolation::Linear,
            ));
        }
        return;
    }
    let rising = v1 > v0;
    let (seg_min, seg_max) = if rising { (v0, v1) } else { (v1, v0) };
    let span_lo = span.lower().to_f64();
    let span_hi = span.upper().to_f64();
    // value interval attained inside the span
    let clip_lo = span_lo.max(seg_min);
    let clip_hi = span_hi.min(seg_max);
    if clip_lo > clip_hi {
        return;
    }
    let theta = |v: f64| (v - v0) / (v1 - v0);
    // entering and leaving values in segment direction
    let (enter_v, exit_v) = if rising {
        (clip_lo, clip_hi)
    } else {
        (clip_hi, clip_lo)
    };
    let (theta_enter, theta_exit) = (theta(enter_v), theta(exit_v));
    let duration = (end.t_micros() - start.t_micros()) as f64;
    let t_enter = start.t_micros() + (duration * theta_enter).round() as i64;
    let t_exit = start.t_micros() + (duration * theta_exit).round() as i64;
    // a fragment bound is included iff the instant belongs to the segment's
    // time domain and its value belongs to the span
    let enter_at_start = t_enter == start.t_micros();
    let exit_at_end = t_exit == end.t_micros();
    let enter_value = if enter_at_start {
        start.value().clone()
    } else {
        V::from_f64_value(enter_v)
    };
    let exit_value = if exit_at_end {
        end.value().clone()
    } else {
        V::from_f64_value(exit_v)
    };
    let frag_lower_inc =
        (!enter_at_start || lower_inc) && span.contains_value(enter_value.clone());
    let frag_upper_inc = (!exit_at_end || upper_inc) && span.contains_value(exit_value.clone());
    if t_enter == t_exit {
        if frag_lower_inc && frag_upper_inc {
            fragments.push(TSequence::from_parts(
                vec![TInstant::from_micros(enter_value, t_enter)],
                true,
                true,
                TInterpolation::Linear,
            ));
        }
        return;
    }
    fragments.push(TSequence::from_parts(
        vec![
            TInstant::from_micros(enter_value, t_enter),
            TInstant::from_micros(exit_value, t_exit),
        ],
        frag_lower_inc,
        frag_upper_inc,
        TInterpolation::Linear,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::base::Collection;
    use crate::collections::datetime::ts;
    use pretty_assertions::assert_eq;

    fn tf(s: &str) -> Temporal<f64> {
        s.parse().unwrap()
    }

    #[test]
    fn arithmetic_is_synchronized() {
        let a = tf("[0@2020-01-01, 10@2020-01-03]");
        let b = tf("[1@2020-01-01, 1@2020-01-03]");
        let sum = a.add(&b).unwrap().unwrap();
        assert_eq!(sum.value_at_timestamp(ts("2020-01-02")), Some(6.0));
        let diff = a.sub(&b).unwrap().unwrap();
        assert_eq!(diff.value_at_timestamp(ts("2020-01-01")), Some(-1.0));
    }

    #[test]
    fn product_adds_turning_point() {
        // a(t) rises 0..10, b(t) falls 10..0: the product peaks halfway
        let a = tf("[0@2020-01-01, 10@2020-01-03]");
        let b = tf("[10@2020-01-01, 0@2020-01-03]");
        let product = a.mul(&b).unwrap().unwrap();
        assert_eq!(product.value_at_timestamp(ts("2020-01-02")), Some(25.0));
        assert_eq!(product.max_value(), Some(&25.0));
    }

    #[test]
    fn division_by_temporal_zero_fails() {
        let a = tf("[1@2020-01-01, 1@2020-01-03]");
        let b = tf("[0@2020-01-01, 0@2020-01-03]");
        assert!(matches!(a.div(&b), Err(Error::DivZero(_))));
    }

    #[test]
    fn distance_and_nearest_approach() {
        let a = tf("[0@2020-01-01, 10@2020-01-03]");
        let b = tf("[10@2020-01-01, 0@2020-01-03]");
        let d = a.tdistance(&b).unwrap().unwrap();
        assert_eq!(d.value_at_timestamp(ts("2020-01-02")), Some(0.0));
        assert_eq!(a.nearest_approach_distance(&b).unwrap(), Some(0.0));
        let c = tf("[20@2020-01-01, 20@2020-01-03]");
        assert_eq!(a.nearest_approach_distance(&c).unwrap(), Some(10.0));
    }

    #[test]
    fn at_span_clips_with_exact_bounds() {
        let a = tf("[0@2020-01-01, 10@2020-01-11]");
        let span: Span<f64> = (2.0..=4.0).into();
        let clipped = a.at_span(&span).unwrap();
        assert_eq!(clipped.start_value(), &2.0);
        assert_eq!(clipped.end_value(), &4.0);
        assert_eq!(clipped.start_timestamp(), ts("2020-01-03"));
        assert_eq!(clipped.end_timestamp(), ts("2020-01-05"));
    }

    #[test]
    fn at_minus_span_duality() {
        let a = tf("[0@2020-01-01, 10@2020-01-11]");
        let span: Span<f64> = (2.0..4.0).into();
        let at = a.at_span(&span).unwrap();
        let minus = a.minus_span(&span).unwrap();
        assert!(!at.time().overlaps(&minus.time()));
        assert_eq!(at.time().union(&minus.time()), a.time());
    }

    #[test]
    fn at_tbox_combines_dimensions() {
        let a = tf("[0@2020-01-01, 10@2020-01-11]");
        let tbox: TBox = "TBOXFLOAT XT([2, 4],[2020-01-01, 2020-01-04])"
            .parse()
            .unwrap();
        let result = a.at_tbox(&tbox).unwrap();
        assert_eq!(result.start_value(), &2.0);
        assert_eq!(result.end_timestamp(), ts("2020-01-04"));
    }

    #[test]
    fn integer_step_at_span() {
        let a: Temporal<i32> = "[1@2020-01-01, 5@2020-01-02, 2@2020-01-03]".parse().unwrap();
        let span = Span::new(1, 2, true, true).unwrap();
        let at = a.at_span(&span).unwrap();
        assert_eq!(at.value_at_timestamp(ts("2020-01-01 12:00:00")), Some(1));
        assert_eq!(at.value_at_timestamp(ts("2020-01-02 12:00:00")), None);
        assert_eq!(at.value_at_timestamp(ts("2020-01-03")), Some(2));
    }
}
