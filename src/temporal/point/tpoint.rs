use crate::base::{Geog, Geom, Point};
use crate::boxes::STBox;
use crate::collections::base::{Span, SpanSet};
use crate::errors::{Error, Result};
use crate::spatial::{
    closest_approach_frac, distance_quadratic, geodetic_distance, planar_distance,
    segments_intersect2d,
};
#[cfg(feature = "geo")]
use crate::temporal::lifting::assemble_stepwise;
use crate::temporal::lifting::LiftSpec;
use crate::temporal::tbool::TBool;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;
use crate::temporal::{BaseValue, TInterpolation, Temporal};

/// Point base types: the ones moving points are built over.
pub trait PointBase: BaseValue<BBox = STBox> {
    const GEODETIC: bool;

    fn point(&self) -> &Point;
    fn from_point(point: Point) -> Self;

    /// Distance between two values: planar Euclidean or great-circle.
    fn distance(a: &Self, b: &Self) -> f64 {
        if Self::GEODETIC {
            geodetic_distance(a.point(), b.point())
        } else {
            planar_distance(a.point(), b.point())
        }
    }
}

impl PointBase for Geom {
    const GEODETIC: bool = false;

    fn point(&self) -> &Point {
        &self.0
    }

    fn from_point(point: Point) -> Self {
        Geom(point)
    }
}

impl PointBase for Geog {
    const GEODETIC: bool = true;

    fn point(&self) -> &Point {
        &self.0
    }

    fn from_point(point: Point) -> Self {
        Geog(point)
    }
}

/// Roots of the within-distance predicate over one synchronized segment
/// pair, as fractions of the segment.
///
/// Follows the quadratic `A·θ² + B·θ + C ≤ 0` with the Viète form for the
/// larger root, which is stable when `C` is small.
fn tdwithin_segment_fracs(
    p0: &Point,
    p1: &Point,
    q0: &Point,
    q1: &Point,
    dist: f64,
    hasz: bool,
) -> Option<(f64, f64)> {
    let (a, b, mut c) = distance_quadratic(p0, p1, q0, q1, hasz);
    c -= dist * dist;
    if a == 0.0 {
        // parallel co-movement: the predicate is constant on the segment
        return (c <= 0.0).then_some((0.0, 1.0));
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    if discriminant == 0.0 {
        let t = -b / (2.0 * a);
        return (0.0..=1.0).contains(&t).then_some((t, t));
    }
    let sqrt_d = discriminant.sqrt();
    let (t5, t6) = if b >= 0.0 {
        ((-b - sqrt_d) / (2.0 * a), (2.0 * c) / (-b - sqrt_d))
    } else {
        ((2.0 * c) / (-b + sqrt_d), (-b + sqrt_d) / (2.0 * a))
    };
    if t6 < 0.0 || t5 > 1.0 {
        return None;
    }
    Some((t5.max(0.0), t6.min(1.0)))
}

/// Operations over temporal points.
pub trait TPointTrait<V: PointBase>: Sized {
    /// The spatial reference identifier shared by every instant.
    fn srid(&self) -> i32;

    /// The cached spatiotemporal bounding box.
    fn bounding_stbox(&self) -> STBox;

    /// Length travelled along the trajectory. Zero for discrete and
    /// stepwise values, whose points jump instead of travelling.
    fn length(&self) -> f64;

    /// Speed along the trajectory as a stepwise temporal float, one value
    /// per segment.
    fn speed(&self) -> Result<Option<Temporal<f64>>>;

    /// Temporal distance to another temporal point.
    fn tdistance(&self, other: &Temporal<V>) -> Result<Option<Temporal<f64>>>;

    /// Smallest distance ever between the two temporal points.
    fn nearest_approach_distance(&self, other: &Temporal<V>) -> Result<Option<f64>>;

    /// Temporal `within distance` predicate against another moving point.
    fn tdwithin(&self, other: &Temporal<V>, dist: f64) -> Result<Option<TBool>>;

    /// Whether the two points ever come within the distance.
    fn ever_dwithin(&self, other: &Temporal<V>, dist: f64) -> Result<bool>;

    /// Whether the trajectory is free of self-intersections.
    fn is_simple(&self) -> bool;

    /// The minimal ordered partition into simple pieces.
    fn make_simple(&self) -> Vec<Temporal<V>>;

    /// Restrict to a spatiotemporal box.
    fn at_stbox(&self, stbox: &STBox) -> Result<Option<Temporal<V>>>;

    /// Restrict to the times spent inside the geometry.
    #[cfg(feature = "geo")]
    fn at_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<Temporal<V>>>;

    /// Restrict to the times spent outside the geometry.
    #[cfg(feature = "geo")]
    fn minus_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<Temporal<V>>>;

    /// Temporal intersects predicate against a static geometry.
    #[cfg(feature = "geo")]
    fn tintersects_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<TBool>>;

    /// Temporal disjoint predicate against a static geometry.
    #[cfg(feature = "geo")]
    fn tdisjoint_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<TBool>>;

    /// Temporal containment of the point in the geometry's interior.
    #[cfg(feature = "geo")]
    fn tcontains_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<TBool>>;

    /// Temporal touches predicate: the point sits on the boundary.
    #[cfg(feature = "geo")]
    fn ttouches_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<TBool>>;
}

impl<V: PointBase> TPointTrait<V> for Temporal<V> {
    fn srid(&self) -> i32 {
        self.start_value().point().srid
    }

    fn bounding_stbox(&self) -> STBox {
        self.bounding_box()
    }

    fn length(&self) -> f64 {
        let linear = |seq: &TSequence<V>| -> f64 {
            if seq.interpolation() != TInterpolation::Linear {
                return 0.0;
            }
            seq.instants()
                .windows(2)
                .map(|pair| V::distance(pair[0].value(), pair[1].value()))
                .sum()
        };
        match self {
            Temporal::Instant(_) => 0.0,
            Temporal::Sequence(seq) => linear(seq),
            Temporal::SequenceSet(ss) => ss.sequences().iter().map(linear).sum(),
        }
    }

    fn speed(&self) -> Result<Option<Temporal<f64>>> {
        let seq_speed = |seq: &TSequence<V>| -> Option<TSequence<f64>> {
            if seq.interpolation() != TInterpolation::Linear || seq.num_instants() < 2 {
                return None;
            }
            let mut instants = Vec::with_capacity(seq.num_instants());
            let insts = seq.instants();
            for pair in insts.windows(2) {
                let meters = V::distance(pair[0].value(), pair[1].value());
                let seconds =
                    (pair[1].t_micros() - pair[0].t_micros()) as f64 / 1_000_000.0;
                instants.push(TInstant::from_micros(meters / seconds, pair[0].t_micros()));
            }
            let last_t = insts.last().expect("sequence is non-empty").t_micros();
            let closing = *instants.last().expect("two instants minimum").value();
            instants.push(TInstant::from_micros(closing, last_t));
            Some(TSequence::from_parts(
                instants,
                seq.lower_inc(),
                seq.upper_inc(),
                TInterpolation::Stepwise,
            ))
        };
        match self {
            Temporal::Instant(_) => Ok(None),
            Temporal::Sequence(seq) => {
                Ok(seq_speed(seq).map(Temporal::Sequence))
            }
            Temporal::SequenceSet(ss) => Ok(TSequenceSet::from_fragments(
                ss.sequences().iter().filter_map(seq_speed).collect(),
            )
            .map(Temporal::SequenceSet)),
        }
    }

    fn tdistance(&self, other: &Temporal<V>) -> Result<Option<Temporal<f64>>> {
        self.start_value()
            .ensure_compatible(other.start_value())?;
        let hasz = self.start_value().point().has_z();
        let spec = LiftSpec::with_crossings(true, move |a0: &V, a1: &V, b0: &V, b1: &V| {
            closest_approach_frac(a0.point(), a1.point(), b0.point(), b1.point(), hasz)
                .map_or_else(Vec::new, |f| vec![f])
        });
        crate::temporal::lifting::lift_binary(self, other, &spec, &|a: &V, b: &V| {
            Ok(V::distance(a, b))
        })
    }

    fn nearest_approach_distance(&self, other: &Temporal<V>) -> Result<Option<f64>> {
        Ok(self
            .tdistance(other)?
            .and_then(|d| d.min_value().copied()))
    }

    fn tdwithin(&self, other: &Temporal<V>, dist: f64) -> Result<Option<TBool>> {
        self.start_value()
            .ensure_compatible(other.start_value())?;
        if dist < 0.0 {
            return Err(Error::bounds("distance must be non-negative"));
        }
        let hasz = self.start_value().point().has_z();
        let spec = LiftSpec::with_crossings(false, move |a0: &V, a1: &V, b0: &V, b1: &V| {
            match tdwithin_segment_fracs(
                a0.point(),
                a1.point(),
                b0.point(),
                b1.point(),
                dist,
                hasz,
            ) {
                Some((t1, t2)) => vec![t1, t2],
                None => Vec::new(),
            }
        });
        crate::temporal::lifting::lift_binary(self, other, &spec, &|a: &V, b: &V| {
            Ok(V::distance(a, b) <= dist)
        })
    }

    fn ever_dwithin(&self, other: &Temporal<V>, dist: f64) -> Result<bool> {
        Ok(self
            .tdwithin(other, dist)?
            .is_some_and(|t| t.ever_eq(&true)))
    }

    fn is_simple(&self) -> bool {
        let seq_simple = |seq: &TSequence<V>| {
            find_self_intersection(seq.instants()).is_none()
        };
        match self {
            Temporal::Instant(_) => true,
            Temporal::Sequence(seq) if seq.is_discrete() => true,
            Temporal::Sequence(seq) => seq_simple(seq),
            Temporal::SequenceSet(ss) => ss.sequences().iter().all(seq_simple),
        }
    }

    fn make_simple(&self) -> Vec<Temporal<V>> {
        match self {
            Temporal::Sequence(seq) if !seq.is_discrete() => split_simple(seq)
                .into_iter()
                .map(Temporal::Sequence)
                .collect(),
            Temporal::SequenceSet(ss) => ss
                .sequences()
                .iter()
                .flat_map(split_simple)
                .map(Temporal::Sequence)
                .collect(),
            _ => vec![self.clone()],
        }
    }

    fn at_stbox(&self, stbox: &STBox) -> Result<Option<Temporal<V>>> {
        if stbox.srid() != 0 && stbox.srid() != self.srid() {
            return Err(Error::SridMismatch {
                left: self.srid(),
                right: stbox.srid(),
            });
        }
        let mut result = self.clone();
        if let Some(period) = stbox.tstz_span() {
            let Some(trimmed) = result.at_period(&period) else {
                return Ok(None);
            };
            result = trimmed;
        }
        if !stbox.has_x() {
            return Ok(Some(result));
        }
        let inside = |p: &Point| -> bool {
            let x_ok = stbox.xmin().is_none_or(|lo| p.x >= lo)
                && stbox.xmax().is_none_or(|hi| p.x <= hi);
            let y_ok = stbox.ymin().is_none_or(|lo| p.y >= lo)
                && stbox.ymax().is_none_or(|hi| p.y <= hi);
            let z_ok = match (stbox.zmin(), stbox.zmax(), p.z) {
                (Some(lo), Some(hi), Some(z)) => z >= lo && z <= hi,
                (Some(_), Some(_), None) => false,
                _ => true,
            };
            x_ok && y_ok && z_ok
        };
        let cuts = move |p0: &Point, p1: &Point| -> Vec<f64> {
            let mut fracs = Vec::new();
            let mut cut_axis = |v0: f64, v1: f64, bound: Option<f64>| {
                if let Some(b) = bound {
                    if (v1 - v0).abs() > 0.0 {
                        let f = (b - v0) / (v1 - v0);
                        if f > 0.0 && f < 1.0 {
                            fracs.push(f);
                        }
                    }
                }
            };
            cut_axis(p0.x, p1.x, stbox.xmin());
            cut_axis(p0.x, p1.x, stbox.xmax());
            cut_axis(p0.y, p1.y, stbox.ymin());
            cut_axis(p0.y, p1.y, stbox.ymax());
            if let (Some(z0), Some(z1)) = (p0.z, p1.z) {
                cut_axis(z0, z1, stbox.zmin());
                cut_axis(z0, z1, stbox.zmax());
            }
            fracs
        };
        Ok(restrict_to_region(&result, &cuts, &inside))
    }

    #[cfg(feature = "geo")]
    fn at_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<Temporal<V>>> {
        use crate::spatial::backend::{self, SpatialRel};
        backend::ensure_not_empty(geometry)?;
        let cuts = |p0: &Point, p1: &Point| backend::segment_boundary_fracs(p0, p1, geometry);
        let inside =
            |p: &Point| backend::point_relates(p, geometry, SpatialRel::Intersects);
        Ok(restrict_to_region(self, &cuts, &inside))
    }

    #[cfg(feature = "geo")]
    fn minus_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<Temporal<V>>> {
        let support = match self.at_geometry(geometry)? {
            Some(at) => at.time(),
            None => return Ok(Some(self.clone())),
        };
        Ok(self.minus_period_set(&support))
    }

    #[cfg(feature = "geo")]
    fn tintersects_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<TBool>> {
        self.temporal_spatial_rel(geometry, crate::spatial::backend::SpatialRel::Intersects)
    }

    #[cfg(feature = "geo")]
    fn tdisjoint_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<TBool>> {
        Ok(self
            .tintersects_geometry(geometry)?
            .map(|t| crate::temporal::tbool::TBoolTrait::temporal_not(&t)))
    }

    #[cfg(feature = "geo")]
    fn tcontains_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<TBool>> {
        self.temporal_spatial_rel(geometry, crate::spatial::backend::SpatialRel::Contains)
    }

    #[cfg(feature = "geo")]
    fn ttouches_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Option<TBool>> {
        self.temporal_spatial_rel(geometry, crate::spatial::backend::SpatialRel::Touches)
    }
}

#[cfg(feature = "geo")]
trait TemporalSpatialRel<V: PointBase> {
    fn temporal_spatial_rel(
        &self,
        geometry: &geo::Geometry<f64>,
        rel: crate::spatial::backend::SpatialRel,
    ) -> Result<Option<TBool>>;
}

#[cfg(feature = "geo")]
impl<V: PointBase> TemporalSpatialRel<V> for Temporal<V> {
    fn temporal_spatial_rel(
        &self,
        geometry: &geo::Geometry<f64>,
        rel: crate::spatial::backend::SpatialRel,
    ) -> Result<Option<TBool>> {
        use crate::spatial::backend;
        backend::ensure_not_empty(geometry)?;
        match self {
            Temporal::Instant(inst) => {
                let value = backend::point_relates(inst.value().point(), geometry, rel);
                Ok(Some(Temporal::Instant(TInstant::from_micros(
                    value,
                    inst.t_micros(),
                ))))
            }
            Temporal::Sequence(seq) if seq.is_discrete() => {
                let instants = seq
                    .instants()
                    .iter()
                    .map(|i| {
                        TInstant::from_micros(
                            backend::point_relates(i.value().point(), geometry, rel),
                            i.t_micros(),
                        )
                    })
                    .collect();
                Ok(Some(Temporal::Sequence(TSequence::discrete(instants)?)))
            }
            Temporal::Sequence(seq) => Ok(crate::temporal::tsequence_set::TSequenceSet::
                from_fragments(sequence_spatial_rel(seq, geometry, rel)?)
            .map(Temporal::SequenceSet)),
            Temporal::SequenceSet(ss) => {
                let mut fragments = Vec::new();
                for seq in ss.sequences() {
                    fragments.extend(sequence_spatial_rel(seq, geometry, rel)?);
                }
                Ok(crate::temporal::tsequence_set::TSequenceSet::from_fragments(fragments)
                    .map(Temporal::SequenceSet))
            }
        }
    }
}

#[cfg(feature = "geo")]
fn sequence_spatial_rel<V: PointBase>(
    seq: &TSequence<V>,
    geometry: &geo::Geometry<f64>,
    rel: crate::spatial::backend::SpatialRel,
) -> Result<Vec<TSequence<bool>>> {
    use crate::spatial::backend;
    // simple pieces make the boundary-crossing structure unambiguous
    let mut fragments = Vec::new();
    for piece in split_simple(seq) {
        let times = region_cut_times(&piece, &|p0, p1| {
            backend::segment_boundary_fracs(p0, p1, geometry)
        });
        let period = piece.period_micros();
        let eval = |t: i64| -> Option<Result<bool>> {
            piece
                .eval_at(t)
                .map(|v| Ok(backend::point_relates(v.point(), geometry, rel)))
        };
        fragments.extend(assemble_stepwise(
            &times,
            period.lower_inc(),
            period.upper_inc(),
            &eval,
        )?);
    }
    Ok(fragments)
}

/// All segment times plus region cut times, ordered, for one sequence.
fn region_cut_times<V: PointBase>(
    seq: &TSequence<V>,
    cuts: &dyn Fn(&Point, &Point) -> Vec<f64>,
) -> Vec<i64> {
    let mut times: Vec<i64> = seq.instants().iter().map(TInstant::t_micros).collect();
    if seq.interpolation() == TInterpolation::Linear {
        for pair in seq.instants().windows(2) {
            let (t0, t1) = (pair[0].t_micros(), pair[1].t_micros());
            for frac in cuts(pair[0].value().point(), pair[1].value().point()) {
                let t = t0 + ((t1 - t0) as f64 * frac).round() as i64;
                if t > t0 && t < t1 {
                    times.push(t);
                }
            }
        }
    }
    times.sort_unstable();
    times.dedup();
    times
}

/// Restrict a temporal point to the region described by a segment cut
/// function and a point membership test.
fn restrict_to_region<V: PointBase>(
    value: &Temporal<V>,
    cuts: &dyn Fn(&Point, &Point) -> Vec<f64>,
    inside: &dyn Fn(&Point) -> bool,
) -> Option<Temporal<V>> {
    match value {
        Temporal::Instant(inst) => {
            inside(inst.value().point()).then(|| value.clone())
        }
        Temporal::Sequence(seq) if seq.is_discrete() => {
            let kept: Vec<_> = seq
                .instants()
                .iter()
                .filter(|i| inside(i.value().point()))
                .cloned()
                .collect();
            TSequence::discrete(kept).ok().map(Temporal::Sequence)
        }
        Temporal::Sequence(seq) => {
            let spans = region_spans(seq, cuts, inside);
            TSequenceSet::from_fragments(seq.at_period_set_micros(&spans))
                .map(Temporal::SequenceSet)
        }
        Temporal::SequenceSet(ss) => {
            let mut fragments = Vec::new();
            for seq in ss.sequences() {
                let spans = region_spans(seq, cuts, inside);
                fragments.extend(seq.at_period_set_micros(&spans));
            }
            TSequenceSet::from_fragments(fragments).map(Temporal::SequenceSet)
        }
    }
}

/// The time spans one sequence spends inside the region.
fn region_spans<V: PointBase>(
    seq: &TSequence<V>,
    cuts: &dyn Fn(&Point, &Point) -> Vec<f64>,
    inside: &dyn Fn(&Point) -> bool,
) -> SpanSet<i64> {
    let times = region_cut_times(seq, cuts);
    let inside_at = |t: i64| -> bool {
        seq.eval_at(t).as_ref().map(PointBase::point).is_some_and(inside)
    };
    let mid_inside: Vec<bool> = times
        .windows(2)
        .map(|w| inside_at(w[0] + (w[1] - w[0]) / 2))
        .collect();
    let mut spans: Vec<Span<i64>> = Vec::new();
    for (j, &inside_mid) in mid_inside.iter().enumerate() {
        if inside_mid {
            spans.push(Span::from_raw(
                times[j],
                times[j + 1],
                inside_at(times[j]),
                inside_at(times[j + 1]),
            ));
        }
    }
    // isolated touches survive as degenerate spans
    for (j, &t) in times.iter().enumerate() {
        let prev_in = j > 0 && mid_inside[j - 1];
        let next_in = j < mid_inside.len() && mid_inside[j];
        if !prev_in && !next_in && inside_at(t) {
            spans.push(Span::singleton(t));
        }
    }
    SpanSet::new(spans)
}

/// Index of the first segment whose xy projection meets an earlier part
/// of the trajectory, or `None` when the trajectory is simple.
fn find_self_intersection<V: PointBase>(instants: &[TInstant<V>]) -> Option<usize> {
    let p = |i: usize| instants[i].value().point();
    for i in 1..instants.len().saturating_sub(1) {
        // a reversal over the previous segment
        let prev = p(i - 1);
        let cur = p(i);
        let next = p(i + 1);
        let cross = (cur.x - prev.x) * (next.y - cur.y) - (cur.y - prev.y) * (next.x - cur.x);
        let dot = (cur.x - prev.x) * (next.x - cur.x) + (cur.y - prev.y) * (next.y - cur.y);
        if cross == 0.0 && dot < 0.0 {
            return Some(i);
        }
        for k in 0..i.saturating_sub(1) {
            if segments_intersect2d(p(k), p(k + 1), cur, next) {
                return Some(i);
            }
        }
    }
    None
}

/// Split a sequence into simple pieces at each earliest self-intersection.
/// Consecutive pieces share an exclusive-inclusive boundary.
fn split_simple<V: PointBase>(seq: &TSequence<V>) -> Vec<TSequence<V>> {
    if seq.is_discrete() || seq.num_instants() <= 2 {
        return vec![seq.clone()];
    }
    let mut pieces = Vec::new();
    let mut rest: Vec<TInstant<V>> = seq.instants().to_vec();
    let mut lower_inc = seq.lower_inc();
    while let Some(split) = find_self_intersection(&rest) {
        let head: Vec<TInstant<V>> = rest[..=split].to_vec();
        pieces.push(TSequence::from_parts(
            head,
            lower_inc,
            false,
            seq.interpolation(),
        ));
        rest.drain(..split);
        lower_inc = true;
    }
    pieces.push(TSequence::from_parts(
        rest,
        lower_inc,
        seq.upper_inc(),
        seq.interpolation(),
    ));
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::base::Collection;
    use crate::collections::datetime::ts;
    use crate::temporal::point::tgeompoint::TGeomPoint;
    use pretty_assertions::assert_eq;

    fn tp(s: &str) -> TGeomPoint {
        s.parse().unwrap()
    }

    #[test]
    fn length_and_speed() {
        let p = tp("[POINT(0 0)@2020-01-01, POINT(3 4)@2020-01-01 00:00:05]");
        assert_eq!(TPointTrait::length(&p), 5.0);
        let speed = p.speed().unwrap().unwrap();
        assert_eq!(speed.start_value(), &1.0);
    }

    #[test]
    fn scenario_dwithin_two_roots() {
        let p = tp("[POINT(1 1)@2000-01-01, POINT(5 5)@2000-01-05]");
        let q = tp("[POINT(1 3)@2000-01-01, POINT(5 3)@2000-01-05]");
        let result = p.tdwithin(&q, 1.0).unwrap().unwrap();
        assert_eq!(result.value_at_timestamp(ts("2000-01-01")), Some(false));
        assert_eq!(result.value_at_timestamp(ts("2000-01-02")), Some(true));
        assert_eq!(result.value_at_timestamp(ts("2000-01-03")), Some(true));
        assert_eq!(result.value_at_timestamp(ts("2000-01-04")), Some(true));
        assert_eq!(
            result.value_at_timestamp(ts("2000-01-04 12:00:00")),
            Some(false)
        );
        assert_eq!(result.value_at_timestamp(ts("2000-01-05")), Some(false));
    }

    #[test]
    fn dwithin_parallel_within() {
        let p = tp("[POINT(0 1)@2000-01-01, POINT(1 2)@2000-01-02]");
        let q = tp("[POINT(0 0)@2000-01-01, POINT(1 1)@2000-01-02]");
        let result = p.tdwithin(&q, 1.0).unwrap().unwrap();
        assert!(result.always_eq(&true));
    }

    #[test]
    fn dwithin_parallel_outside() {
        let p = tp("[POINT(0 2)@2000-01-01, POINT(1 3)@2000-01-02]");
        let q = tp("[POINT(0 0)@2000-01-01, POINT(1 1)@2000-01-02]");
        let result = p.tdwithin(&q, 1.0).unwrap().unwrap();
        assert!(result.always_eq(&false));
        assert!(!p.ever_dwithin(&q, 1.0).unwrap());
    }

    #[test]
    fn dwithin_tangent_instant() {
        let p = tp("[POINT(2 2)@2000-01-01, POINT(1 1)@2000-01-03]");
        let q = tp("[POINT(3 1)@2000-01-01, POINT(2 2)@2000-01-03]");
        let result = p.tdwithin(&q, 1.0).unwrap().unwrap();
        assert_eq!(result.value_at_timestamp(ts("2000-01-02")), Some(true));
        assert_eq!(result.value_at_timestamp(ts("2000-01-01")), Some(false));
        assert_eq!(result.value_at_timestamp(ts("2000-01-03")), Some(false));
    }

    #[test]
    fn simple_decomposition_splits_at_revisit() {
        // goes right, then reverses over itself
        let p = tp(
            "[POINT(0 0)@2020-01-01, POINT(2 0)@2020-01-02, POINT(1 0)@2020-01-03]",
        );
        assert!(!TPointTrait::is_simple(&p));
        let pieces = p.make_simple();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].end_timestamp(), ts("2020-01-02"));
        assert!(TPointTrait::is_simple(&pieces[0]));
        assert!(TPointTrait::is_simple(&pieces[1]));
    }

    #[test]
    fn nearest_approach() {
        let p = tp("[POINT(0 0)@2020-01-01, POINT(4 0)@2020-01-05]");
        let q = tp("[POINT(0 3)@2020-01-01, POINT(4 3)@2020-01-05]");
        assert_eq!(p.nearest_approach_distance(&q).unwrap(), Some(3.0));
    }

    #[test]
    fn at_stbox_clips_in_space() {
        let p = tp("[POINT(0 0)@2020-01-01, POINT(10 0)@2020-01-11]");
        let mut stbox = STBox::from_point(&Point::new(2.0, -1.0));
        stbox.adjust(&STBox::from_point(&Point::new(4.0, 1.0)));
        let clipped = p.at_stbox(&stbox).unwrap().unwrap();
        assert_eq!(clipped.start_timestamp(), ts("2020-01-03"));
        assert_eq!(clipped.end_timestamp(), ts("2020-01-05"));
    }

    #[cfg(feature = "geo")]
    #[test]
    fn at_geometry_square() {
        use geo::polygon;
        let p = tp("[POINT(0 0)@2020-01-01, POINT(10 10)@2020-01-11]");
        let square: geo::Geometry<f64> = polygon![
            (x: 2.0, y: 2.0),
            (x: 6.0, y: 2.0),
            (x: 6.0, y: 6.0),
            (x: 2.0, y: 6.0),
        ]
        .into();
        let inside = p.at_geometry(&square).unwrap().unwrap();
        assert_eq!(inside.start_timestamp(), ts("2020-01-03"));
        assert_eq!(inside.end_timestamp(), ts("2020-01-07"));
        let outside = p.minus_geometry(&square).unwrap().unwrap();
        assert!(!inside.time().overlaps(&outside.time()));
    }

    #[cfg(feature = "geo")]
    #[test]
    fn tintersects_square() {
        use geo::polygon;
        let p = tp("[POINT(0 0)@2020-01-01, POINT(10 10)@2020-01-11]");
        let square: geo::Geometry<f64> = polygon![
            (x: 2.0, y: 2.0),
            (x: 6.0, y: 2.0),
            (x: 6.0, y: 6.0),
            (x: 2.0, y: 6.0),
        ]
        .into();
        let rel = p.tintersects_geometry(&square).unwrap().unwrap();
        assert_eq!(rel.value_at_timestamp(ts("2020-01-02")), Some(false));
        assert_eq!(rel.value_at_timestamp(ts("2020-01-05")), Some(true));
        let disjoint = p.tdisjoint_geometry(&square).unwrap().unwrap();
        assert_eq!(disjoint.value_at_timestamp(ts("2020-01-05")), Some(false));
    }

    #[cfg(feature = "geo")]
    #[test]
    fn ttouches_boundary_crossing() {
        use geo::polygon;
        let p = tp("[POINT(0 0)@2020-01-01, POINT(4 0)@2020-01-05]");
        let square: geo::Geometry<f64> = polygon![
            (x: 2.0, y: -1.0),
            (x: 2.0, y: 1.0),
            (x: 3.0, y: 1.0),
            (x: 3.0, y: -1.0),
        ]
        .into();
        let touches = p.ttouches_geometry(&square).unwrap().unwrap();
        // crossing the vertical edges touches the boundary at two instants
        assert_eq!(touches.value_at_timestamp(ts("2020-01-03")), Some(true));
        assert_eq!(touches.value_at_timestamp(ts("2020-01-02")), Some(false));
        assert_eq!(
            touches.value_at_timestamp(ts("2020-01-03 12:00:00")),
            Some(false)
        );
    }
}
