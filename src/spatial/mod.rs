//! The geometry interface the temporal kernel consumes.
//!
//! Point arithmetic (distance, interpolation, segment analysis) is
//! self-contained; predicates against polygons and other complex
//! geometries delegate to the `geo` crate behind the `geo` feature.

use crate::base::Point;

/// Mean Earth radius in meters, for great-circle distances.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Planar Euclidean distance, using the z coordinate when both points
/// carry one.
pub fn planar_distance(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = match (a.z, b.z) {
        (Some(az), Some(bz)) => az - bz,
        _ => 0.0,
    };
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Great-circle distance in meters between two longitude/latitude points.
pub fn geodetic_distance(a: &Point, b: &Point) -> f64 {
    let (lon1, lat1) = (a.x.to_radians(), a.y.to_radians());
    let (lon2, lat2) = (b.x.to_radians(), b.y.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Coefficients of the squared-distance quadratic between two moving
/// points, `‖p(θ) − q(θ)‖² = A·θ² + B·θ + C` for `θ ∈ [0, 1]`.
pub(crate) fn distance_quadratic(
    p0: &Point,
    p1: &Point,
    q0: &Point,
    q1: &Point,
    hasz: bool,
) -> (f64, f64, f64) {
    let dims: &[fn(&Point) -> f64] = if hasz {
        &[|p| p.x, |p| p.y, |p| p.z.unwrap_or(0.0)]
    } else {
        &[|p| p.x, |p| p.y]
    };
    let (mut a, mut b, mut c) = (0.0, 0.0, 0.0);
    for dim in dims {
        let delta = (dim(p1) - dim(p0)) - (dim(q1) - dim(q0));
        let offset = dim(p0) - dim(q0);
        a += delta * delta;
        b += 2.0 * delta * offset;
        c += offset * offset;
    }
    (a, b, c)
}

/// The fraction at which two co-moving points come closest, when it lies
/// strictly inside the segment.
pub(crate) fn closest_approach_frac(
    p0: &Point,
    p1: &Point,
    q0: &Point,
    q1: &Point,
    hasz: bool,
) -> Option<f64> {
    let (a, b, _) = distance_quadratic(p0, p1, q0, q1, hasz);
    if a == 0.0 {
        return None;
    }
    let frac = -b / (2.0 * a);
    (frac > 0.0 && frac < 1.0).then_some(frac)
}

fn orient2d(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn on_segment2d(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0) && p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1)
}

/// Whether two planar segments share at least one point. The test is
/// performed on the xy projection, matching the simpleness test of
/// trajectories.
pub(crate) fn segments_intersect2d(p1: &Point, p2: &Point, q1: &Point, q2: &Point) -> bool {
    let (a, b) = ((p1.x, p1.y), (p2.x, p2.y));
    let (c, d) = ((q1.x, q1.y), (q2.x, q2.y));
    let d1 = orient2d(c, d, a);
    let d2 = orient2d(c, d, b);
    let d3 = orient2d(a, b, c);
    let d4 = orient2d(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment2d(c, d, a))
        || (d2 == 0.0 && on_segment2d(c, d, b))
        || (d3 == 0.0 && on_segment2d(a, b, c))
        || (d4 == 0.0 && on_segment2d(a, b, d))
}

#[cfg(feature = "geo")]
pub(crate) mod backend {
    //! Polygon predicates and boundary crossings via the `geo` crate.

    use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
    use geo::{Contains, Coord, Intersects, Line, LinesIter};

    use crate::base::Point;
    use crate::errors::{Error, Result};

    /// How a point relates to the query geometry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum SpatialRel {
        /// Shares at least one point with the geometry.
        Intersects,
        /// Lies in the interior of the geometry.
        Contains,
        /// Lies on the boundary of the geometry.
        Touches,
    }

    fn coord(p: &Point) -> Coord<f64> {
        Coord { x: p.x, y: p.y }
    }

    pub(crate) fn ensure_not_empty(geometry: &geo::Geometry<f64>) -> Result<()> {
        let empty = match geometry {
            geo::Geometry::MultiPoint(mp) => mp.0.is_empty(),
            geo::Geometry::MultiPolygon(mp) => mp.0.is_empty(),
            geo::Geometry::MultiLineString(ml) => ml.0.is_empty(),
            geo::Geometry::LineString(ls) => ls.0.is_empty(),
            geo::Geometry::GeometryCollection(gc) => gc.0.is_empty(),
            _ => false,
        };
        if empty {
            Err(Error::EmptyGeom)
        } else {
            Ok(())
        }
    }

    /// Evaluate the relation of one static point against the geometry.
    pub(crate) fn point_relates(
        p: &Point,
        geometry: &geo::Geometry<f64>,
        rel: SpatialRel,
    ) -> bool {
        let point = geo::Point::new(p.x, p.y);
        match rel {
            SpatialRel::Intersects => geometry.intersects(&point),
            SpatialRel::Contains => geometry.contains(&point),
            SpatialRel::Touches => {
                geometry.intersects(&point) && !geometry.contains(&point)
            }
        }
    }

    /// Fractions in `(0, 1)` at which the segment `p0 -> p1` crosses an
    /// edge of the geometry, the points at which its relation to the
    /// geometry can change.
    pub(crate) fn segment_boundary_fracs(
        p0: &Point,
        p1: &Point,
        geometry: &geo::Geometry<f64>,
    ) -> Vec<f64> {
        let segment = Line::new(coord(p0), coord(p1));
        let seg_dx = p1.x - p0.x;
        let seg_dy = p1.y - p0.y;
        let seg_len2 = seg_dx * seg_dx + seg_dy * seg_dy;
        if seg_len2 == 0.0 {
            return Vec::new();
        }
        let frac_of = |c: Coord<f64>| -> f64 {
            ((c.x - p0.x) * seg_dx + (c.y - p0.y) * seg_dy) / seg_len2
        };
        let mut fracs = Vec::new();
        let mut push = |f: f64| {
            if f > 0.0 && f < 1.0 {
                fracs.push(f);
            }
        };
        let lines: Vec<Line<f64>> = match geometry {
            geo::Geometry::Polygon(poly) => poly.lines_iter().collect(),
            geo::Geometry::MultiPolygon(mp) => mp.lines_iter().collect(),
            geo::Geometry::LineString(ls) => ls.lines_iter().collect(),
            geo::Geometry::MultiLineString(ml) => ml.lines_iter().collect(),
            geo::Geometry::Rect(r) => r.to_polygon().lines_iter().collect(),
            _ => Vec::new(),
        };
        for edge in lines {
            match line_intersection(segment, edge) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    push(frac_of(intersection));
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    push(frac_of(intersection.start));
                    push(frac_of(intersection.end));
                }
                None => {}
            }
        }
        fracs.sort_by(f64::total_cmp);
        fracs.dedup_by(|a, b| (*a - *b).abs() <= 1e-12);
        fracs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_distance_2d_and_3d() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(planar_distance(&a, &b), 5.0);
        let a3 = Point::new_3d(0.0, 0.0, 0.0);
        let b3 = Point::new_3d(2.0, 3.0, 6.0);
        assert_eq!(planar_distance(&a3, &b3), 7.0);
    }

    #[test]
    fn geodetic_distance_on_equator() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let d = geodetic_distance(&a, &b);
        // one degree of longitude at the equator is about 111 km
        assert!((d - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn quadratic_coefficients() {
        // p moves (0,0)->(4,4); q fixed at (2,0)
        let (a, b, c) = distance_quadratic(
            &Point::new(0.0, 0.0),
            &Point::new(4.0, 4.0),
            &Point::new(2.0, 0.0),
            &Point::new(2.0, 0.0),
            false,
        );
        assert_eq!(a, 32.0);
        assert_eq!(b, -16.0);
        assert_eq!(c, 4.0);
    }

    #[test]
    fn segment_intersection() {
        let p = |x, y| Point::new(x, y);
        assert!(segments_intersect2d(
            &p(0.0, 0.0),
            &p(2.0, 2.0),
            &p(0.0, 2.0),
            &p(2.0, 0.0)
        ));
        assert!(!segments_intersect2d(
            &p(0.0, 0.0),
            &p(1.0, 0.0),
            &p(0.0, 1.0),
            &p(1.0, 1.0)
        ));
        // touching endpoint counts as an intersection
        assert!(segments_intersect2d(
            &p(0.0, 0.0),
            &p(1.0, 1.0),
            &p(1.0, 1.0),
            &p(2.0, 0.0)
        ));
    }
}
