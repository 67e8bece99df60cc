use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use super::interpolation::TInterpolation;
use super::tinstant::TInstant;
use super::tsequence::TSequence;
use super::tsequence_set::TSequenceSet;
use crate::base::{BaseType, Datum, Geog, Geom, NPoint, Point};
use crate::boxes::{STBox, TBox};
use crate::collections::base::SpanSet;
use crate::collections::datetime::{TsTzSpan, TsTzSpanSet};
use crate::errors::{Error, Result, WrongSubtype};
use crate::utils::to_micros;
use crate::BoundingBox;

pub(crate) const EPSILON: f64 = 1e-12;

/// Behaviour a base type must provide to live inside a temporal value.
///
/// The continuous types override the interpolation hooks; the ordered ones
/// override the comparison hook.
pub trait BaseValue: Clone + PartialEq + fmt::Debug + 'static {
    const BASE_TYPE: BaseType;

    /// The bounding-box type caching this base type's extent over time.
    type BBox: BoundingBox;

    /// Degenerate box for one value at one timestamp.
    fn instant_bbox(&self, t: i64) -> Self::BBox;

    /// Interpolation used when none is requested explicitly.
    fn default_interp() -> TInterpolation {
        if Self::BASE_TYPE.is_continuous() {
            TInterpolation::Linear
        } else {
            TInterpolation::Stepwise
        }
    }

    /// Pairwise compatibility inside one temporal value (reference system,
    /// dimensionality).
    fn ensure_compatible(&self, _other: &Self) -> Result<()> {
        Ok(())
    }

    /// Linear interpolation at the given fraction of a segment.
    fn lerp(&self, _other: &Self, _frac: f64) -> Result<Self> {
        Err(Error::BadInterp {
            interp: TInterpolation::Linear.to_string(),
            base: Self::BASE_TYPE,
        })
    }

    /// Inverse of [`BaseValue::lerp`]: the fraction of the segment at which
    /// `target` is attained, when it is.
    fn locate(&self, _other: &Self, _target: &Self) -> Option<f64> {
        None
    }

    /// Tolerant equality for normalization of interpolated values.
    fn approx_eq(&self, other: &Self) -> bool {
        self == other
    }

    /// Total order for ordered base types.
    fn cmp_value(&self, _other: &Self) -> Option<Ordering> {
        None
    }

    /// Fraction in `(0, 1)` at which two linear segments take the same
    /// value, when they do.
    fn eq_crossing(_a0: &Self, _a1: &Self, _b0: &Self, _b1: &Self) -> Option<f64> {
        None
    }

    fn to_datum(&self) -> Datum;

    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn parse_text(s: &str) -> Result<Self>;
}

/// Crossing of two scalar linear segments, shared by the float and
/// network-point implementations.
pub(crate) fn scalar_eq_crossing(a0: f64, a1: f64, b0: f64, b1: f64) -> Option<f64> {
    let denom = (a1 - a0) - (b1 - b0);
    if denom.abs() <= EPSILON {
        return None;
    }
    let frac = (b0 - a0) / denom;
    (frac > 0.0 && frac < 1.0).then_some(frac)
}

impl BaseValue for bool {
    const BASE_TYPE: BaseType = BaseType::Bool;
    type BBox = TsTzSpan;

    fn instant_bbox(&self, t: i64) -> TsTzSpan {
        TsTzSpan::from_micros_bounds(t, t, true, true)
    }

    fn cmp_value(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    fn to_datum(&self) -> Datum {
        Datum::Bool(*self)
    }

    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if *self { "t" } else { "f" })
    }

    fn parse_text(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t" | "true" => Ok(true),
            "f" | "false" => Ok(false),
            other => Err(Error::parse(format!("bad boolean: {other}"))),
        }
    }
}

impl BaseValue for i32 {
    const BASE_TYPE: BaseType = BaseType::Int4;
    type BBox = TBox;

    fn instant_bbox(&self, t: i64) -> TBox {
        TBox::from_value_time(*self as f64, t)
    }

    fn cmp_value(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    fn to_datum(&self) -> Datum {
        Datum::Int4(*self)
    }

    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }

    fn parse_text(s: &str) -> Result<Self> {
        s.trim()
            .parse()
            .map_err(|_| Error::parse(format!("bad integer: {s}")))
    }
}

impl BaseValue for i64 {
    const BASE_TYPE: BaseType = BaseType::Int8;
    type BBox = TBox;

    fn instant_bbox(&self, t: i64) -> TBox {
        TBox::from_value_time(*self as f64, t)
    }

    fn cmp_value(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    fn to_datum(&self) -> Datum {
        Datum::Int8(*self)
    }

    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }

    fn parse_text(s: &str) -> Result<Self> {
        s.trim()
            .parse()
            .map_err(|_| Error::parse(format!("bad integer: {s}")))
    }
}

impl BaseValue for f64 {
    const BASE_TYPE: BaseType = BaseType::Float8;
    type BBox = TBox;

    fn instant_bbox(&self, t: i64) -> TBox {
        TBox::from_value_time(*self, t)
    }

    fn lerp(&self, other: &Self, frac: f64) -> Result<Self> {
        Ok(self + (other - self) * frac)
    }

    fn locate(&self, other: &Self, target: &Self) -> Option<f64> {
        if self == other {
            return None;
        }
        let frac = (target - self) / (other - self);
        (0.0..=1.0).contains(&frac).then_some(frac)
    }

    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() <= EPSILON
    }

    fn eq_crossing(a0: &Self, a1: &Self, b0: &Self, b1: &Self) -> Option<f64> {
        scalar_eq_crossing(*a0, *a1, *b0, *b1)
    }

    fn cmp_value(&self, other: &Self) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }

    fn to_datum(&self) -> Datum {
        Datum::Float8(*self)
    }

    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }

    fn parse_text(s: &str) -> Result<Self> {
        s.trim()
            .parse()
            .map_err(|_| Error::parse(format!("bad float: {s}")))
    }
}

impl BaseValue for String {
    const BASE_TYPE: BaseType = BaseType::Text;
    type BBox = TsTzSpan;

    fn instant_bbox(&self, t: i64) -> TsTzSpan {
        TsTzSpan::from_micros_bounds(t, t, true, true)
    }

    fn cmp_value(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    fn to_datum(&self) -> Datum {
        Datum::Text(self.clone())
    }

    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }

    fn parse_text(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(body) = s.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
            Ok(body.to_string())
        } else {
            Ok(s.to_string())
        }
    }
}

fn point_locate(a: &Point, b: &Point, target: &Point) -> Option<f64> {
    if a.srid != target.srid || a.has_z() != target.has_z() {
        return None;
    }
    let frac = if (b.x - a.x).abs() > EPSILON {
        (target.x - a.x) / (b.x - a.x)
    } else if (b.y - a.y).abs() > EPSILON {
        (target.y - a.y) / (b.y - a.y)
    } else if let (Some(az), Some(bz), Some(tz)) = (a.z, b.z, target.z) {
        if (bz - az).abs() > EPSILON {
            (tz - az) / (bz - az)
        } else {
            return (a == target).then_some(0.0);
        }
    } else {
        return (a == target).then_some(0.0);
    };
    if !(0.0..=1.0).contains(&frac) {
        return None;
    }
    let on_segment = a.lerp(b, frac).map_or(false, |p| {
        (p.x - target.x).abs() <= EPSILON
            && (p.y - target.y).abs() <= EPSILON
            && match (p.z, target.z) {
                (Some(pz), Some(tz)) => (pz - tz).abs() <= EPSILON,
                (None, None) => true,
                _ => false,
            }
    });
    on_segment.then_some(frac)
}

/// Crossing of two linear point segments: the fraction at which every
/// coordinate agrees.
fn point_eq_crossing(a0: &Point, a1: &Point, b0: &Point, b1: &Point) -> Option<f64> {
    let coords = |p: &Point| [p.x, p.y, p.z.unwrap_or(0.0)];
    let (c_a0, c_a1, c_b0, c_b1) = (coords(a0), coords(a1), coords(b0), coords(b1));
    let mut frac: Option<f64> = None;
    for i in 0..3 {
        match scalar_eq_crossing(c_a0[i], c_a1[i], c_b0[i], c_b1[i]) {
            Some(f) => match frac {
                Some(existing) if (existing - f).abs() > EPSILON => return None,
                _ => frac = Some(f),
            },
            None => {
                // this coordinate moves in parallel; it must agree all along
                if (c_a0[i] - c_b0[i]).abs() > EPSILON || (c_a1[i] - c_b1[i]).abs() > EPSILON {
                    return None;
                }
            }
        }
    }
    frac
}

fn point_approx_eq(a: &Point, b: &Point) -> bool {
    (a.x - b.x).abs() <= EPSILON
        && (a.y - b.y).abs() <= EPSILON
        && match (a.z, b.z) {
            (Some(az), Some(bz)) => (az - bz).abs() <= EPSILON,
            (None, None) => true,
            _ => false,
        }
}

impl BaseValue for Geom {
    const BASE_TYPE: BaseType = BaseType::Geom;
    type BBox = STBox;

    fn instant_bbox(&self, t: i64) -> STBox {
        STBox::from_point_time(&self.0, t, false)
    }

    fn ensure_compatible(&self, other: &Self) -> Result<()> {
        self.0.ensure_compatible(&other.0)
    }

    fn lerp(&self, other: &Self, frac: f64) -> Result<Self> {
        Ok(Geom(self.0.lerp(&other.0, frac)?))
    }

    fn locate(&self, other: &Self, target: &Self) -> Option<f64> {
        point_locate(&self.0, &other.0, &target.0)
    }

    fn approx_eq(&self, other: &Self) -> bool {
        point_approx_eq(&self.0, &other.0)
    }

    fn eq_crossing(a0: &Self, a1: &Self, b0: &Self, b1: &Self) -> Option<f64> {
        point_eq_crossing(&a0.0, &a1.0, &b0.0, &b1.0)
    }

    fn to_datum(&self) -> Datum {
        Datum::Geom(self.0)
    }

    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn parse_text(s: &str) -> Result<Self> {
        Point::parse_wkt(s).map(Geom)
    }
}

impl BaseValue for Geog {
    const BASE_TYPE: BaseType = BaseType::Geog;
    type BBox = STBox;

    fn instant_bbox(&self, t: i64) -> STBox {
        STBox::from_point_time(&self.0, t, true)
    }

    fn ensure_compatible(&self, other: &Self) -> Result<()> {
        self.0.ensure_compatible(&other.0)
    }

    fn lerp(&self, other: &Self, frac: f64) -> Result<Self> {
        Ok(Geog(self.0.lerp(&other.0, frac)?))
    }

    fn locate(&self, other: &Self, target: &Self) -> Option<f64> {
        point_locate(&self.0, &other.0, &target.0)
    }

    fn approx_eq(&self, other: &Self) -> bool {
        point_approx_eq(&self.0, &other.0)
    }

    fn eq_crossing(a0: &Self, a1: &Self, b0: &Self, b1: &Self) -> Option<f64> {
        point_eq_crossing(&a0.0, &a1.0, &b0.0, &b1.0)
    }

    fn to_datum(&self) -> Datum {
        Datum::Geog(self.0)
    }

    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn parse_text(s: &str) -> Result<Self> {
        Point::parse_wkt(s).map(Geog)
    }
}

impl BaseValue for NPoint {
    const BASE_TYPE: BaseType = BaseType::Npoint;
    type BBox = TBox;

    fn instant_bbox(&self, t: i64) -> TBox {
        TBox::from_value_time(self.position(), t)
    }

    fn ensure_compatible(&self, _other: &Self) -> Result<()> {
        // different routes may legally follow each other in a sequence;
        // the mismatch only matters when interpolating across a segment
        Ok(())
    }

    fn lerp(&self, other: &Self, frac: f64) -> Result<Self> {
        NPoint::lerp(self, other, frac)
    }

    fn locate(&self, other: &Self, target: &Self) -> Option<f64> {
        if self.route() != other.route() || self.route() != target.route() {
            return None;
        }
        if (other.position() - self.position()).abs() <= EPSILON {
            return None;
        }
        let frac =
            (target.position() - self.position()) / (other.position() - self.position());
        (0.0..=1.0).contains(&frac).then_some(frac)
    }

    fn approx_eq(&self, other: &Self) -> bool {
        self.route() == other.route()
            && (self.position() - other.position()).abs() <= EPSILON
    }

    fn eq_crossing(a0: &Self, a1: &Self, b0: &Self, b1: &Self) -> Option<f64> {
        if a0.route() != b0.route() || a0.route() != a1.route() || b0.route() != b1.route() {
            return None;
        }
        scalar_eq_crossing(a0.position(), a1.position(), b0.position(), b1.position())
    }

    fn to_datum(&self) -> Datum {
        Datum::Npoint(*self)
    }

    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn parse_text(s: &str) -> Result<Self> {
        let body = s
            .trim()
            .strip_prefix("NPoint(")
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| Error::parse(format!("bad network point: {s}")))?;
        let (rid, pos) = body
            .split_once(',')
            .ok_or_else(|| Error::parse(format!("bad network point: {s}")))?;
        NPoint::new(
            rid.trim()
                .parse()
                .map_err(|_| Error::parse(format!("bad route id: {rid}")))?,
            pos.trim()
                .parse()
                .map_err(|_| Error::parse(format!("bad position: {pos}")))?,
        )
    }
}

/// The subtype of a temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TSubtype {
    Instant,
    Sequence,
    SequenceSet,
}

/// A temporal value: a base value evolving over time.
///
/// The tagged union over the three structural representations; discrete
/// sequences are [`TSequence`] values with [`TInterpolation::Discrete`].
#[derive(Clone, PartialEq)]
pub enum Temporal<V: BaseValue> {
    Instant(TInstant<V>),
    Sequence(TSequence<V>),
    SequenceSet(TSequenceSet<V>),
}

impl<V: BaseValue> Temporal<V> {
    pub fn subtype(&self) -> TSubtype {
        match self {
            Temporal::Instant(_) => TSubtype::Instant,
            Temporal::Sequence(_) => TSubtype::Sequence,
            Temporal::SequenceSet(_) => TSubtype::SequenceSet,
        }
    }

    pub fn interpolation(&self) -> TInterpolation {
        match self {
            Temporal::Instant(_) => TInterpolation::None,
            Temporal::Sequence(seq) => seq.interpolation(),
            Temporal::SequenceSet(ss) => ss.interpolation(),
        }
    }

    /// The cached bounding box of the value.
    pub fn bounding_box(&self) -> V::BBox {
        match self {
            Temporal::Instant(inst) => inst.bounding_box(),
            Temporal::Sequence(seq) => seq.bounding_box().clone(),
            Temporal::SequenceSet(ss) => ss.bounding_box().clone(),
        }
    }

    pub fn num_instants(&self) -> usize {
        match self {
            Temporal::Instant(_) => 1,
            Temporal::Sequence(seq) => seq.num_instants(),
            Temporal::SequenceSet(ss) => ss.num_instants(),
        }
    }

    pub fn instants(&self) -> Vec<&TInstant<V>> {
        match self {
            Temporal::Instant(inst) => vec![inst],
            Temporal::Sequence(seq) => seq.instants().iter().collect(),
            Temporal::SequenceSet(ss) => ss.instants().collect(),
        }
    }

    pub fn instant_n(&self, n: usize) -> Option<&TInstant<V>> {
        self.instants().into_iter().nth(n)
    }

    pub fn start_instant(&self) -> &TInstant<V> {
        match self {
            Temporal::Instant(inst) => inst,
            Temporal::Sequence(seq) => seq.start_instant(),
            Temporal::SequenceSet(ss) => ss.start_sequence().start_instant(),
        }
    }

    pub fn end_instant(&self) -> &TInstant<V> {
        match self {
            Temporal::Instant(inst) => inst,
            Temporal::Sequence(seq) => seq.end_instant(),
            Temporal::SequenceSet(ss) => ss.end_sequence().end_instant(),
        }
    }

    /// The instant carrying the minimum value, for ordered base types.
    pub fn min_instant(&self) -> Option<&TInstant<V>> {
        if !V::BASE_TYPE.is_ordered() {
            return None;
        }
        self.instants()
            .into_iter()
            .min_by(|a, b| a.value().cmp_value(b.value()).unwrap_or(Ordering::Equal))
    }

    /// The instant carrying the maximum value, for ordered base types.
    pub fn max_instant(&self) -> Option<&TInstant<V>> {
        if !V::BASE_TYPE.is_ordered() {
            return None;
        }
        self.instants()
            .into_iter()
            .max_by(|a, b| a.value().cmp_value(b.value()).unwrap_or(Ordering::Equal))
    }

    pub fn values(&self) -> Vec<V> {
        match self {
            Temporal::Instant(inst) => vec![inst.value().clone()],
            Temporal::Sequence(seq) => seq.values(),
            Temporal::SequenceSet(ss) => ss.values(),
        }
    }

    pub fn start_value(&self) -> &V {
        self.start_instant().value()
    }

    pub fn end_value(&self) -> &V {
        self.end_instant().value()
    }

    pub fn min_value(&self) -> Option<&V> {
        self.min_instant().map(TInstant::value)
    }

    pub fn max_value(&self) -> Option<&V> {
        self.max_instant().map(TInstant::value)
    }

    pub fn num_timestamps(&self) -> usize {
        self.num_instants()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.instants().iter().map(|i| i.timestamp()).collect()
    }

    pub fn timestamp_n(&self, n: usize) -> Option<DateTime<Utc>> {
        self.instant_n(n).map(TInstant::timestamp)
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.start_instant().timestamp()
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        self.end_instant().timestamp()
    }

    /// Value taken at the timestamp, if the value is defined there.
    pub fn value_at_timestamp<Tz: TimeZone>(&self, t: DateTime<Tz>) -> Option<V> {
        self.value_at_micros(to_micros(&t))
    }

    pub(crate) fn value_at_micros(&self, t: i64) -> Option<V> {
        match self {
            Temporal::Instant(inst) => {
                (inst.t_micros() == t).then(|| inst.value().clone())
            }
            Temporal::Sequence(seq) => seq.value_at_micros(t),
            Temporal::SequenceSet(ss) => ss.value_at_micros(t),
        }
    }

    /// Value taken at the timestamp as a tagged datum.
    pub fn datum_at_timestamp<Tz: TimeZone>(&self, t: DateTime<Tz>) -> Option<Datum> {
        self.value_at_timestamp(t).map(|v| v.to_datum())
    }

    /// The bounding period of the value.
    pub fn timespan(&self) -> TsTzSpan {
        match self {
            Temporal::Instant(inst) => inst.timespan(),
            Temporal::Sequence(seq) => seq.timespan(),
            Temporal::SequenceSet(ss) => ss.timespan(),
        }
    }

    /// The set of periods on which the value is defined.
    pub fn time(&self) -> TsTzSpanSet {
        match self {
            Temporal::Instant(inst) => TsTzSpanSet::from(inst.timespan()),
            Temporal::Sequence(seq) => seq.time(),
            Temporal::SequenceSet(ss) => ss.time(),
        }
    }

    /// Total duration; with `ignore_gaps` the gaps of a sequence set count.
    pub fn duration(&self, ignore_gaps: bool) -> TimeDelta {
        if ignore_gaps {
            self.timespan().duration()
        } else {
            match self {
                Temporal::SequenceSet(ss) => ss.time().duration(),
                Temporal::Sequence(seq) if seq.is_discrete() => TimeDelta::zero(),
                _ => self.timespan().duration(),
            }
        }
    }

    // ------------------------- Restriction -------------------------------

    /// Restrict to the times at which the value equals `value`.
    pub fn at_value(&self, value: &V) -> Option<Temporal<V>> {
        match self {
            Temporal::Instant(inst) => {
                (inst.value() == value).then(|| self.clone())
            }
            Temporal::Sequence(seq) if seq.is_discrete() => seq
                .at_value(value)
                .into_iter()
                .next()
                .map(Temporal::Sequence),
            Temporal::Sequence(seq) => {
                TSequenceSet::from_fragments(seq.at_value(value)).map(Temporal::SequenceSet)
            }
            Temporal::SequenceSet(ss) => {
                TSequenceSet::from_fragments(ss.at_value(value)).map(Temporal::SequenceSet)
            }
        }
    }

    /// Restrict to the times at which the value differs from `value`.
    pub fn minus_value(&self, value: &V) -> Option<Temporal<V>> {
        match self {
            Temporal::Instant(inst) => {
                (inst.value() != value).then(|| self.clone())
            }
            Temporal::Sequence(seq) if seq.is_discrete() => seq
                .minus_value(value)
                .into_iter()
                .next()
                .map(Temporal::Sequence),
            Temporal::Sequence(seq) => {
                TSequenceSet::from_fragments(seq.minus_value(value)).map(Temporal::SequenceSet)
            }
            Temporal::SequenceSet(ss) => {
                TSequenceSet::from_fragments(ss.minus_value(value)).map(Temporal::SequenceSet)
            }
        }
    }

    pub fn at_values(&self, values: &[V]) -> Option<Temporal<V>> {
        match self {
            Temporal::Instant(inst) => values
                .contains(inst.value())
                .then(|| self.clone()),
            Temporal::Sequence(seq) if seq.is_discrete() => {
                let kept: Vec<_> = seq
                    .instants()
                    .iter()
                    .filter(|i| values.contains(i.value()))
                    .cloned()
                    .collect();
                TSequence::discrete(kept).ok().map(Temporal::Sequence)
            }
            Temporal::Sequence(seq) => {
                TSequenceSet::from_fragments(seq.at_values(values)).map(Temporal::SequenceSet)
            }
            Temporal::SequenceSet(ss) => {
                TSequenceSet::from_fragments(ss.at_values(values)).map(Temporal::SequenceSet)
            }
        }
    }

    pub fn minus_values(&self, values: &[V]) -> Option<Temporal<V>> {
        match self {
            Temporal::Instant(inst) => {
                (!values.contains(inst.value())).then(|| self.clone())
            }
            Temporal::Sequence(seq) if seq.is_discrete() => {
                let kept: Vec<_> = seq
                    .instants()
                    .iter()
                    .filter(|i| !values.contains(i.value()))
                    .cloned()
                    .collect();
                TSequence::discrete(kept).ok().map(Temporal::Sequence)
            }
            Temporal::Sequence(seq) => {
                TSequenceSet::from_fragments(seq.minus_values(values))
                    .map(Temporal::SequenceSet)
            }
            Temporal::SequenceSet(ss) => {
                TSequenceSet::from_fragments(ss.minus_values(values))
                    .map(Temporal::SequenceSet)
            }
        }
    }

    /// Restrict to the instant carrying the minimum value.
    pub fn at_min(&self) -> Option<Temporal<V>> {
        self.min_value().cloned().and_then(|v| self.at_value(&v))
    }

    pub fn at_max(&self) -> Option<Temporal<V>> {
        self.max_value().cloned().and_then(|v| self.at_value(&v))
    }

    pub fn at_timestamp<Tz: TimeZone>(&self, t: DateTime<Tz>) -> Option<TInstant<V>> {
        let micros = to_micros(&t);
        self.value_at_micros(micros)
            .map(|v| TInstant::from_micros(v, micros))
    }

    pub fn minus_timestamp<Tz: TimeZone>(&self, t: DateTime<Tz>) -> Option<Temporal<V>> {
        let micros = to_micros(&t);
        match self {
            Temporal::Instant(inst) => {
                (inst.t_micros() != micros).then(|| self.clone())
            }
            Temporal::Sequence(seq) if seq.is_discrete() => seq
                .minus_timestamp_micros(micros)
                .into_iter()
                .next()
                .map(Temporal::Sequence),
            Temporal::Sequence(seq) => {
                TSequenceSet::from_fragments(seq.minus_timestamp_micros(micros))
                    .map(Temporal::SequenceSet)
            }
            Temporal::SequenceSet(ss) => TSequenceSet::from_fragments(
                ss.minus_period_micros(&crate::collections::base::Span::singleton(micros)),
            )
            .map(Temporal::SequenceSet),
        }
    }

    /// Restrict to a set of timestamps, yielding a discrete sequence.
    pub fn at_timestamp_set<Tz: TimeZone>(&self, ts: &[DateTime<Tz>]) -> Option<Temporal<V>> {
        let mut instants: Vec<TInstant<V>> = ts
            .iter()
            .filter_map(|t| self.at_timestamp(t.clone()))
            .collect();
        instants.sort_by_key(TInstant::t_micros);
        instants.dedup_by_key(|i| i.t_micros());
        if instants.is_empty() {
            None
        } else if let Temporal::Instant(_) = self {
            Some(Temporal::Instant(instants.pop().expect("non-empty")))
        } else {
            TSequence::discrete(instants).ok().map(Temporal::Sequence)
        }
    }

    pub fn minus_timestamp_set<Tz: TimeZone>(&self, ts: &[DateTime<Tz>]) -> Option<Temporal<V>> {
        let mut result = self.clone();
        for t in ts {
            result = result.minus_timestamp(t.clone())?;
        }
        Some(result)
    }

    /// Restrict to a period.
    pub fn at_period(&self, period: &TsTzSpan) -> Option<Temporal<V>> {
        match self {
            Temporal::Instant(inst) => period
                .inner
                .contains_value(inst.t_micros())
                .then(|| self.clone()),
            Temporal::Sequence(seq) => {
                seq.at_period_micros(&period.inner).map(Temporal::Sequence)
            }
            Temporal::SequenceSet(ss) => {
                TSequenceSet::from_fragments(ss.at_period_micros(&period.inner))
                    .map(Temporal::SequenceSet)
            }
        }
    }

    pub fn minus_period(&self, period: &TsTzSpan) -> Option<Temporal<V>> {
        match self {
            Temporal::Instant(inst) => {
                (!period.inner.contains_value(inst.t_micros())).then(|| self.clone())
            }
            Temporal::Sequence(seq) if seq.is_discrete() => seq
                .minus_period_micros(&period.inner)
                .into_iter()
                .next()
                .map(Temporal::Sequence),
            Temporal::Sequence(seq) => {
                TSequenceSet::from_fragments(seq.minus_period_micros(&period.inner))
                    .map(Temporal::SequenceSet)
            }
            Temporal::SequenceSet(ss) => {
                TSequenceSet::from_fragments(ss.minus_period_micros(&period.inner))
                    .map(Temporal::SequenceSet)
            }
        }
    }

    pub fn at_period_set(&self, periods: &TsTzSpanSet) -> Option<Temporal<V>> {
        match self {
            Temporal::Instant(inst) => periods
                .inner
                .contains_value(inst.t_micros())
                .then(|| self.clone()),
            Temporal::Sequence(seq) if seq.is_discrete() => {
                let fragments = seq.at_period_set_micros(&periods.inner);
                let instants: Vec<_> = fragments
                    .into_iter()
                    .flat_map(|f| f.instants().to_vec())
                    .collect();
                TSequence::discrete(instants).ok().map(Temporal::Sequence)
            }
            Temporal::Sequence(seq) => {
                TSequenceSet::from_fragments(seq.at_period_set_micros(&periods.inner))
                    .map(Temporal::SequenceSet)
            }
            Temporal::SequenceSet(ss) => {
                TSequenceSet::from_fragments(ss.at_period_set_micros(&periods.inner))
                    .map(Temporal::SequenceSet)
            }
        }
    }

    pub fn minus_period_set(&self, periods: &TsTzSpanSet) -> Option<Temporal<V>> {
        match self {
            Temporal::Instant(inst) => {
                (!periods.inner.contains_value(inst.t_micros())).then(|| self.clone())
            }
            Temporal::Sequence(seq) if seq.is_discrete() => {
                let kept: Vec<_> = seq
                    .instants()
                    .iter()
                    .filter(|i| !periods.inner.contains_value(i.t_micros()))
                    .cloned()
                    .collect();
                TSequence::discrete(kept).ok().map(Temporal::Sequence)
            }
            Temporal::Sequence(seq) => {
                let complement =
                    SpanSet::from(seq.period_micros()).difference(&periods.inner);
                TSequenceSet::from_fragments(seq.at_period_set_micros(&complement))
                    .map(Temporal::SequenceSet)
            }
            Temporal::SequenceSet(ss) => {
                TSequenceSet::from_fragments(ss.minus_period_set_micros(&periods.inner))
                    .map(Temporal::SequenceSet)
            }
        }
    }

    // ------------------------- Ever / always -----------------------------

    /// Whether the value is ever equal to `value`.
    pub fn ever_eq(&self, value: &V) -> bool {
        match self {
            Temporal::Instant(inst) => inst.value() == value,
            Temporal::Sequence(seq) => seq.ever_eq(value),
            Temporal::SequenceSet(ss) => ss.ever_eq(value),
        }
    }

    /// Whether the value is always equal to `value`.
    pub fn always_eq(&self, value: &V) -> bool {
        match self {
            Temporal::Instant(inst) => inst.value() == value,
            Temporal::Sequence(seq) => seq.always_eq(value),
            Temporal::SequenceSet(ss) => ss.always_eq(value),
        }
    }

    pub fn ever_ne(&self, value: &V) -> bool {
        !self.always_eq(value)
    }

    pub fn always_ne(&self, value: &V) -> bool {
        !self.ever_eq(value)
    }

    pub fn ever_lt(&self, value: &V) -> bool {
        self.min_value()
            .and_then(|m| m.cmp_value(value))
            .is_some_and(|o| o == Ordering::Less)
    }

    pub fn ever_le(&self, value: &V) -> bool {
        self.min_value()
            .and_then(|m| m.cmp_value(value))
            .is_some_and(|o| o != Ordering::Greater)
    }

    pub fn always_lt(&self, value: &V) -> bool {
        self.max_value()
            .and_then(|m| m.cmp_value(value))
            .is_some_and(|o| o == Ordering::Less)
    }

    pub fn always_le(&self, value: &V) -> bool {
        self.max_value()
            .and_then(|m| m.cmp_value(value))
            .is_some_and(|o| o != Ordering::Greater)
    }

    pub fn ever_gt(&self, value: &V) -> bool {
        self.max_value()
            .and_then(|m| m.cmp_value(value))
            .is_some_and(|o| o == Ordering::Greater)
    }

    pub fn ever_ge(&self, value: &V) -> bool {
        self.max_value()
            .and_then(|m| m.cmp_value(value))
            .is_some_and(|o| o != Ordering::Less)
    }

    pub fn always_gt(&self, value: &V) -> bool {
        self.min_value()
            .and_then(|m| m.cmp_value(value))
            .is_some_and(|o| o == Ordering::Greater)
    }

    pub fn always_ge(&self, value: &V) -> bool {
        self.min_value()
            .and_then(|m| m.cmp_value(value))
            .is_some_and(|o| o != Ordering::Less)
    }

    // ------------------------- Transformations ---------------------------

    /// Collapse to an instant; fails unless the value holds one instant.
    pub fn to_instant(&self) -> Result<TInstant<V>> {
        let instants = self.instants();
        if instants.len() == 1 {
            Ok(instants[0].clone())
        } else {
            Err(Error::TypeMismatch(
                "temporal value spans more than one instant".into(),
            ))
        }
    }

    /// Rewrite as a single sequence with the given interpolation.
    pub fn to_sequence(&self, interp: TInterpolation) -> Result<TSequence<V>> {
        match self {
            Temporal::Instant(inst) => {
                if interp == TInterpolation::Discrete {
                    TSequence::discrete(vec![inst.clone()])
                } else {
                    TSequence::from_instant(inst.clone(), interp)
                }
            }
            Temporal::Sequence(seq) => seq.set_interpolation(interp),
            Temporal::SequenceSet(ss) => {
                if ss.num_sequences() == 1 {
                    ss.start_sequence().set_interpolation(interp)
                } else {
                    Err(Error::TypeMismatch(
                        "sequence set with gaps cannot become one sequence".into(),
                    ))
                }
            }
        }
    }

    /// Rewrite as a sequence set with the given interpolation.
    pub fn to_sequence_set(&self, interp: TInterpolation) -> Result<TSequenceSet<V>> {
        if interp == TInterpolation::Discrete {
            return Err(Error::BadInterp {
                interp: interp.to_string(),
                base: V::BASE_TYPE,
            });
        }
        match self {
            Temporal::Instant(inst) => {
                TSequenceSet::new(vec![TSequence::from_instant(inst.clone(), interp)?])
            }
            Temporal::Sequence(seq) if seq.is_discrete() => {
                let sequences = seq
                    .instants()
                    .iter()
                    .map(|i| TSequence::from_instant(i.clone(), interp))
                    .collect::<Result<Vec<_>>>()?;
                TSequenceSet::new(sequences)
            }
            Temporal::Sequence(seq) => {
                TSequenceSet::new(vec![seq.set_interpolation(interp)?])
            }
            Temporal::SequenceSet(ss) => {
                let sequences = ss
                    .sequences()
                    .iter()
                    .map(|s| s.set_interpolation(interp))
                    .collect::<Result<Vec<_>>>()?;
                TSequenceSet::new(sequences)
            }
        }
    }

    /// Change the interpolation, keeping the subtype.
    pub fn set_interpolation(&self, interp: TInterpolation) -> Result<Temporal<V>> {
        match self {
            Temporal::Instant(_) => Ok(self.clone()),
            Temporal::Sequence(seq) => seq.set_interpolation(interp).map(Temporal::Sequence),
            Temporal::SequenceSet(_) => {
                self.to_sequence_set(interp).map(Temporal::SequenceSet)
            }
        }
    }

    /// Shift the time dimension by `delta`.
    pub fn shift_time(&self, delta: TimeDelta) -> Result<Temporal<V>> {
        self.shift_scale_time(Some(delta), None)
    }

    /// Scale the time dimension so the total duration is `duration`.
    pub fn scale_time(&self, duration: TimeDelta) -> Result<Temporal<V>> {
        self.shift_scale_time(None, Some(duration))
    }

    pub fn shift_scale_time(
        &self,
        shift: Option<TimeDelta>,
        duration: Option<TimeDelta>,
    ) -> Result<Temporal<V>> {
        let delta = match shift {
            Some(d) => d
                .num_microseconds()
                .ok_or_else(|| Error::RangeOverflow("shift out of range".into()))?,
            None => 0,
        };
        let width = match duration {
            Some(d) => Some(crate::utils::interval_to_units(&d)?),
            None => None,
        };
        match self {
            Temporal::Instant(inst) => Ok(Temporal::Instant(TInstant::from_micros(
                inst.value().clone(),
                inst.t_micros() + delta,
            ))),
            Temporal::Sequence(seq) => seq
                .shift_scale_micros(delta, width)
                .map(Temporal::Sequence),
            Temporal::SequenceSet(ss) => ss
                .shift_scale_micros(delta, width)
                .map(Temporal::SequenceSet),
        }
    }

    /// Merge with other temporal values of the same base type.
    pub fn merge(&self, others: &[Temporal<V>]) -> Result<Temporal<V>> {
        let mut discrete_instants: Vec<TInstant<V>> = Vec::new();
        let mut sequences: Vec<TSequence<V>> = Vec::new();
        let mut continuous = false;
        let mut interp = TInterpolation::None;
        for value in std::iter::once(self).chain(others.iter()) {
            match value {
                Temporal::Instant(inst) => discrete_instants.push(inst.clone()),
                Temporal::Sequence(seq) if seq.is_discrete() => {
                    discrete_instants.extend(seq.instants().iter().cloned())
                }
                Temporal::Sequence(seq) => {
                    continuous = true;
                    interp = seq.interpolation();
                    sequences.push(seq.clone());
                }
                Temporal::SequenceSet(ss) => {
                    continuous = true;
                    interp = ss.interpolation();
                    sequences.extend(ss.sequences().iter().cloned());
                }
            }
        }
        if continuous {
            if !discrete_instants.is_empty() {
                return Err(Error::TypeMismatch(
                    "cannot merge discrete and continuous temporal values".into(),
                ));
            }
            let ss = TSequenceSet::new(sequences)?;
            return Ok(if ss.num_sequences() == 1 && interp != TInterpolation::Discrete {
                Temporal::Sequence(ss.start_sequence().clone())
            } else {
                Temporal::SequenceSet(ss)
            });
        }
        discrete_instants.sort_by_key(TInstant::t_micros);
        for pair in discrete_instants.windows(2) {
            if pair[0].t_micros() == pair[1].t_micros() && pair[0].value() != pair[1].value() {
                return Err(Error::NonMonotonicTime(format!(
                    "conflicting values at {}",
                    pair[0].timestamp()
                )));
            }
        }
        discrete_instants.dedup_by_key(|i| i.t_micros());
        if discrete_instants.len() == 1 {
            Ok(Temporal::Instant(discrete_instants.pop().expect("one")))
        } else {
            TSequence::discrete(discrete_instants).map(Temporal::Sequence)
        }
    }

    /// Apply a pointwise function to every value, keeping the structure.
    pub(crate) fn map_values<C: BaseValue>(
        &self,
        f: &dyn Fn(&V) -> Result<C>,
    ) -> Result<Temporal<C>> {
        let map_seq = |seq: &TSequence<V>| -> Result<TSequence<C>> {
            let instants = seq
                .instants()
                .iter()
                .map(|i| Ok(TInstant::from_micros(f(i.value())?, i.t_micros())))
                .collect::<Result<Vec<_>>>()?;
            let interp = if seq.interpolation() == TInterpolation::Linear
                && !C::BASE_TYPE.is_continuous()
            {
                TInterpolation::Stepwise
            } else {
                seq.interpolation()
            };
            Ok(TSequence::from_parts(
                instants,
                seq.lower_inc(),
                seq.upper_inc(),
                interp,
            ))
        };
        match self {
            Temporal::Instant(inst) => Ok(Temporal::Instant(TInstant::from_micros(
                f(inst.value())?,
                inst.t_micros(),
            ))),
            Temporal::Sequence(seq) => map_seq(seq).map(Temporal::Sequence),
            Temporal::SequenceSet(ss) => {
                let sequences = ss
                    .sequences()
                    .iter()
                    .map(map_seq)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Temporal::SequenceSet(TSequenceSet::from_normalized(
                    sequences,
                )))
            }
        }
    }

    // ------------------------- Lifted comparisons -------------------------

    fn eq_cross_spec() -> crate::temporal::lifting::LiftSpec<V, V> {
        use crate::temporal::lifting::LiftSpec;
        LiftSpec::with_crossings(false, |a0: &V, a1: &V, b0: &V, b1: &V| {
            V::eq_crossing(a0, a1, b0, b1).map_or_else(Vec::new, |f| vec![f])
        })
    }

    /// Temporal equality with another temporal value.
    pub fn temporal_eq(&self, other: &Temporal<V>) -> Result<Option<Temporal<bool>>> {
        crate::temporal::lifting::lift_binary(
            self,
            other,
            &Self::eq_cross_spec(),
            &|a, b| Ok(a == b),
        )
    }

    pub fn temporal_ne(&self, other: &Temporal<V>) -> Result<Option<Temporal<bool>>> {
        crate::temporal::lifting::lift_binary(
            self,
            other,
            &Self::eq_cross_spec(),
            &|a, b| Ok(a != b),
        )
    }

    /// Temporal equality with a constant.
    pub fn temporal_eq_value(&self, value: &V) -> Result<Option<Temporal<bool>>> {
        crate::temporal::lifting::lift_with_value(
            self,
            value,
            &Self::eq_cross_spec(),
            &|a, b| Ok(a == b),
        )
    }

    pub fn temporal_ne_value(&self, value: &V) -> Result<Option<Temporal<bool>>> {
        crate::temporal::lifting::lift_with_value(
            self,
            value,
            &Self::eq_cross_spec(),
            &|a, b| Ok(a != b),
        )
    }

    fn ordered_cmp(a: &V, b: &V) -> Result<Ordering> {
        a.cmp_value(b).ok_or_else(|| {
            Error::TypeMismatch(format!("{:?} values are unordered", V::BASE_TYPE))
        })
    }

    pub fn temporal_lt(&self, other: &Temporal<V>) -> Result<Option<Temporal<bool>>> {
        crate::temporal::lifting::lift_binary(
            self,
            other,
            &Self::eq_cross_spec(),
            &|a, b| Ok(Self::ordered_cmp(a, b)? == Ordering::Less),
        )
    }

    pub fn temporal_le(&self, other: &Temporal<V>) -> Result<Option<Temporal<bool>>> {
        crate::temporal::lifting::lift_binary(
            self,
            other,
            &Self::eq_cross_spec(),
            &|a, b| Ok(Self::ordered_cmp(a, b)? != Ordering::Greater),
        )
    }

    pub fn temporal_gt(&self, other: &Temporal<V>) -> Result<Option<Temporal<bool>>> {
        crate::temporal::lifting::lift_binary(
            self,
            other,
            &Self::eq_cross_spec(),
            &|a, b| Ok(Self::ordered_cmp(a, b)? == Ordering::Greater),
        )
    }

    pub fn temporal_ge(&self, other: &Temporal<V>) -> Result<Option<Temporal<bool>>> {
        crate::temporal::lifting::lift_binary(
            self,
            other,
            &Self::eq_cross_spec(),
            &|a, b| Ok(Self::ordered_cmp(a, b)? != Ordering::Less),
        )
    }

    pub fn temporal_lt_value(&self, value: &V) -> Result<Option<Temporal<bool>>> {
        crate::temporal::lifting::lift_with_value(
            self,
            value,
            &Self::eq_cross_spec(),
            &|a, b| Ok(Self::ordered_cmp(a, b)? == Ordering::Less),
        )
    }

    pub fn temporal_gt_value(&self, value: &V) -> Result<Option<Temporal<bool>>> {
        crate::temporal::lifting::lift_with_value(
            self,
            value,
            &Self::eq_cross_spec(),
            &|a, b| Ok(Self::ordered_cmp(a, b)? == Ordering::Greater),
        )
    }

    /// Append one instant, keeping the subtype.
    pub fn append_instant(&self, instant: TInstant<V>) -> Result<Temporal<V>> {
        match self {
            Temporal::Instant(_) => self.merge(&[Temporal::Instant(instant)]),
            Temporal::Sequence(seq) if seq.is_discrete() => {
                self.merge(&[Temporal::Instant(instant)])
            }
            Temporal::Sequence(seq) => {
                let tail = TSequence::from_instant(instant, seq.interpolation())?;
                seq.merge_with(&tail).map(Temporal::Sequence)
            }
            Temporal::SequenceSet(ss) => {
                let mut sequences = ss.sequences().to_vec();
                let last = sequences.pop().expect("set is non-empty");
                let appended = last.merge_with(&TSequence::from_instant(
                    instant,
                    last.interpolation(),
                )?)?;
                sequences.push(appended);
                TSequenceSet::new(sequences).map(Temporal::SequenceSet)
            }
        }
    }
}

impl<V: BaseValue> From<TInstant<V>> for Temporal<V> {
    fn from(value: TInstant<V>) -> Self {
        Temporal::Instant(value)
    }
}

impl<V: BaseValue> From<TSequence<V>> for Temporal<V> {
    fn from(value: TSequence<V>) -> Self {
        Temporal::Sequence(value)
    }
}

impl<V: BaseValue> From<TSequenceSet<V>> for Temporal<V> {
    fn from(value: TSequenceSet<V>) -> Self {
        Temporal::SequenceSet(value)
    }
}

// Rust cannot write one generic conversion per variant, so the three
// fallible extractions are generated.
macro_rules! impl_try_from_subtype {
    ($($variant:ident),+) => {
        $(paste::paste! {
            impl<V: BaseValue> TryFrom<Temporal<V>> for [<T $variant>]<V> {
                type Error = WrongSubtype;

                fn try_from(
                    value: Temporal<V>,
                ) -> std::result::Result<Self, WrongSubtype> {
                    match value {
                        Temporal::$variant(inner) => Ok(inner),
                        _ => Err(WrongSubtype),
                    }
                }
            }
        })+
    };
}

impl_try_from_subtype!(Instant, Sequence, SequenceSet);

impl<V: BaseValue> fmt::Display for Temporal<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temporal::Instant(inst) => write!(f, "{inst}"),
            Temporal::Sequence(seq) => write!(f, "{seq}"),
            Temporal::SequenceSet(ss) => write!(f, "{ss}"),
        }
    }
}

impl<V: BaseValue> fmt::Debug for Temporal<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temporal::Instant(inst) => write!(f, "Instant({inst})"),
            Temporal::Sequence(seq) => write!(f, "Sequence({seq})"),
            Temporal::SequenceSet(ss) => write!(f, "SequenceSet({ss})"),
        }
    }
}

impl<V: BaseValue> std::str::FromStr for Temporal<V> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("Interp=Step;")
            .unwrap_or(trimmed)
            .trim_start();
        match body.chars().next() {
            Some('{') => {
                // discrete sequence or sequence set: decided by the first
                // non-blank character inside the braces
                let inner = body[1..].trim_start();
                if inner.starts_with('[') || inner.starts_with('(') {
                    trimmed.parse::<TSequenceSet<V>>().map(Temporal::SequenceSet)
                } else {
                    trimmed.parse::<TSequence<V>>().map(Temporal::Sequence)
                }
            }
            Some('[') | Some('(') => trimmed.parse::<TSequence<V>>().map(Temporal::Sequence),
            Some(_) => trimmed.parse::<TInstant<V>>().map(Temporal::Instant),
            None => Err(Error::parse("empty temporal literal")),
        }
    }
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

    fn ti(s: &str) -> Temporal<i32> {
        s.parse().unwrap()
    }

    #[test]
    fn parse_dispatches_on_subtype() {
        assert_eq!(ti("1@2018-01-01 08:00:00+00").subtype(), TSubtype::Instant);
        assert_eq!(
            ti("[1@2018-01-01 08:00:00+00]").subtype(),
            TSubtype::Sequence
        );
        assert_eq!(
            ti("{[1@2018-01-01 08:00:00+00]}").subtype(),
            TSubtype::SequenceSet
        );
        assert_eq!(
            ti("{1@2018-01-01, 2@2018-01-02}").interpolation(),
            TInterpolation::Discrete
        );
    }

    #[test]
    fn debug_wraps_subtype_name() {
        let string = "1@2018-01-01 08:00:00+00";
        let result = ti(string);
        assert_eq!(format!("{result:?}"), format!("Instant({string})"));
    }

    #[test]
    fn min_max_values() {
        let t = tf("[3@2020-01-01, 9@2020-01-02, 1@2020-01-03]");
        assert_eq!(t.min_value(), Some(&1.0));
        assert_eq!(t.max_value(), Some(&9.0));
        assert_eq!(t.min_instant().unwrap().timestamp(), ts("2020-01-03"));
    }

    #[test]
    fn at_minus_value_duality() {
        let t = ti("[1@2000-01-01, 3@2000-01-02, 1@2000-01-03]");
        let at = t.at_value(&1).unwrap();
        let minus = t.minus_value(&1).unwrap();
        assert!(!at.time().overlaps(&minus.time()));
        assert_eq!(at.time().union(&minus.time()), t.time());
    }

    #[test]
    fn scenario_temporal_int_restriction() {
        let t = ti("[1@2000-01-01, 3@2000-01-02, 1@2000-01-03]");
        let at = t.at_value(&1).unwrap();
        assert_eq!(
            format!("{at}"),
            "{[1@2000-01-01 00:00:00+00, 1@2000-01-02 00:00:00+00), [1@2000-01-03 00:00:00+00]}"
        );
    }

    #[test]
    fn scenario_linear_crossing() {
        let t = tf("[0@2000-01-01, 10@2000-01-03]");
        let at = t.at_value(&5.0).unwrap();
        assert_eq!(at.num_instants(), 1);
        assert_eq!(at.start_timestamp(), ts("2000-01-02"));
    }

    #[test]
    fn ever_always() {
        let t = tf("[1@2020-01-01, 5@2020-01-05]");
        assert!(t.ever_eq(&3.0));
        assert!(!t.always_eq(&3.0));
        assert!(t.ever_lt(&2.0));
        assert!(t.always_ge(&1.0));
        assert!(!t.always_gt(&1.0));
    }

    #[test]
    fn merge_instants_into_discrete() {
        let a = ti("1@2020-01-01");
        let b = ti("2@2020-01-02");
        let merged = a.merge(&[b]).unwrap();
        assert_eq!(merged.interpolation(), TInterpolation::Discrete);
        assert_eq!(merged.num_instants(), 2);
    }

    #[test]
    fn merge_touching_sequences_into_sequence() {
        let a = tf("[1@2020-01-01, 2@2020-01-02)");
        let b = tf("[2@2020-01-02, 3@2020-01-03]");
        let merged = a.merge(&[b]).unwrap();
        assert_eq!(merged.subtype(), TSubtype::Sequence);
    }

    #[test]
    fn shift_time_moves_everything() {
        let t = tf("[1@2020-01-01, 2@2020-01-02]");
        let shifted = t.shift_time(TimeDelta::days(3)).unwrap();
        assert_eq!(shifted.start_timestamp(), ts("2020-01-04"));
        assert_eq!(shifted.end_timestamp(), ts("2020-01-05"));
    }

    #[test]
    fn at_period_preserves_subtype() {
        let t = tf("{[1@2020-01-01, 4@2020-01-04), [5@2020-01-05, 7@2020-01-07)}");
        let p: TsTzSpan = (ts("2020-01-02")..ts("2020-01-06")).into();
        let at = t.at_period(&p).unwrap();
        assert_eq!(at.subtype(), TSubtype::SequenceSet);
        assert_eq!(at.start_timestamp(), ts("2020-01-02"));
        assert_eq!(at.end_timestamp(), ts("2020-01-06"));
    }

    #[test]
    fn at_timestamp_set_builds_discrete() {
        let t = tf("[0@2020-01-01, 10@2020-01-03]");
        let picked = t
            .at_timestamp_set(&[ts("2020-01-01"), ts("2020-01-02")])
            .unwrap();
        assert_eq!(picked.interpolation(), TInterpolation::Discrete);
        assert_eq!(picked.values(), vec![0.0, 5.0]);
    }

    #[test]
    fn normalization_idempotence() {
        let t = tf("[0@2020-01-01, 5@2020-01-02, 10@2020-01-03, 10@2020-01-04]");
        let renorm: Temporal<f64> = format!("{t}").parse().unwrap();
        assert_eq!(renorm, t);
    }

    #[test]
    fn bbox_contains_every_instant_value() {
        let t = tf("[3@2020-01-01, 9@2020-01-02, 1@2020-01-03]");
        let bbox = t.bounding_box();
        for inst in t.instants() {
            assert!(bbox.contains(&inst.bounding_box()));
        }
    }
}
