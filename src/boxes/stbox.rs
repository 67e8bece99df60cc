use std::fmt;

use chrono::{DateTime, TimeZone};

use crate::base::Point;
use crate::collections::base::Span;
use crate::collections::datetime::TsTzSpan;
use crate::errors::{Error, Result};
use crate::utils::to_micros;
use crate::BoundingBox;

/// A spatiotemporal bounding box: 2-D or 3-D space, optionally geodetic,
/// with an optional time dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct STBox {
    x: Option<Span<f64>>,
    y: Option<Span<f64>>,
    z: Option<Span<f64>>,
    srid: i32,
    geodetic: bool,
    period: Option<Span<i64>>,
}

impl STBox {
    pub fn from_point(point: &Point) -> Self {
        STBox {
            x: Some(Span::singleton(point.x)),
            y: Some(Span::singleton(point.y)),
            z: point.z.map(Span::singleton),
            srid: point.srid,
            geodetic: false,
            period: None,
        }
    }

    pub fn from_time<Tz: TimeZone>(t: DateTime<Tz>) -> Self {
        STBox {
            x: None,
            y: None,
            z: None,
            srid: 0,
            geodetic: false,
            period: Some(Span::singleton(to_micros(&t))),
        }
    }

    pub fn from_tstz_span(period: TsTzSpan) -> Self {
        STBox {
            x: None,
            y: None,
            z: None,
            srid: 0,
            geodetic: false,
            period: Some(period.inner),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_raw(
        x: Option<Span<f64>>,
        y: Option<Span<f64>>,
        z: Option<Span<f64>>,
        srid: i32,
        geodetic: bool,
        period: Option<Span<i64>>,
    ) -> Self {
        STBox {
            x,
            y,
            z,
            srid,
            geodetic,
            period,
        }
    }

    pub(crate) fn from_point_time(point: &Point, t: i64, geodetic: bool) -> Self {
        STBox {
            x: Some(Span::singleton(point.x)),
            y: Some(Span::singleton(point.y)),
            z: point.z.map(Span::singleton),
            srid: point.srid,
            geodetic,
            period: Some(Span::singleton(t)),
        }
    }

    pub fn has_x(&self) -> bool {
        self.x.is_some()
    }

    pub fn has_z(&self) -> bool {
        self.z.is_some()
    }

    pub fn has_t(&self) -> bool {
        self.period.is_some()
    }

    pub fn is_geodetic(&self) -> bool {
        self.geodetic
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    pub fn xmin(&self) -> Option<f64> {
        self.x.map(|s| s.lower())
    }

    pub fn xmax(&self) -> Option<f64> {
        self.x.map(|s| s.upper())
    }

    pub fn ymin(&self) -> Option<f64> {
        self.y.map(|s| s.lower())
    }

    pub fn ymax(&self) -> Option<f64> {
        self.y.map(|s| s.upper())
    }

    pub fn zmin(&self) -> Option<f64> {
        self.z.map(|s| s.lower())
    }

    pub fn zmax(&self) -> Option<f64> {
        self.z.map(|s| s.upper())
    }

    pub fn tstz_span(&self) -> Option<TsTzSpan> {
        self.period.map(TsTzSpan::from_inner)
    }

    /// Expand this box in place so it also encloses `other`.
    pub fn adjust(&mut self, other: &STBox) {
        fn merge(a: Option<Span<f64>>, b: Option<Span<f64>>) -> Option<Span<f64>> {
            match (a, b) {
                (Some(a), Some(b)) => Some(a.hull(&b)),
                (a, b) => a.or(b),
            }
        }
        self.x = merge(self.x, other.x);
        self.y = merge(self.y, other.y);
        self.z = merge(self.z, other.z);
        self.period = match (self.period, other.period) {
            (Some(a), Some(b)) => Some(a.hull(&b)),
            (a, b) => a.or(b),
        };
    }

    pub fn union(&self, other: &STBox) -> STBox {
        let mut result = *self;
        result.adjust(other);
        result
    }

    /// Validate the spatial compatibility of the two boxes.
    pub fn ensure_compatible(&self, other: &STBox) -> Result<()> {
        if self.srid != other.srid {
            return Err(Error::SridMismatch {
                left: self.srid,
                right: other.srid,
            });
        }
        if self.geodetic != other.geodetic {
            return Err(Error::TypeMismatch(
                "mixed planar and geodetic boxes".into(),
            ));
        }
        Ok(())
    }

    pub fn overlaps(&self, other: &STBox) -> bool {
        fn dim_overlaps(a: Option<Span<f64>>, b: Option<Span<f64>>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => a.overlaps(&b),
                _ => true,
            }
        }
        let t_ok = match (self.period, other.period) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => true,
        };
        dim_overlaps(self.x, other.x)
            && dim_overlaps(self.y, other.y)
            && dim_overlaps(self.z, other.z)
            && t_ok
    }

    pub fn contains(&self, other: &STBox) -> bool {
        fn dim_contains(a: Option<Span<f64>>, b: Option<Span<f64>>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => a.contains_span(&b),
                (None, Some(_)) => false,
                _ => true,
            }
        }
        let t_ok = match (self.period, other.period) {
            (Some(a), Some(b)) => a.contains_span(&b),
            (None, Some(_)) => false,
            _ => true,
        };
        dim_contains(self.x, other.x)
            && dim_contains(self.y, other.y)
            && dim_contains(self.z, other.z)
            && t_ok
    }

    pub fn is_contained_in(&self, other: &STBox) -> bool {
        other.contains(self)
    }

    pub fn is_adjacent(&self, other: &STBox) -> bool {
        let spatial = [
            (self.x, other.x),
            (self.y, other.y),
            (self.z, other.z),
        ]
        .into_iter()
        .any(|(a, b)| matches!((a, b), (Some(a), Some(b)) if a.is_adjacent(&b)));
        let temporal = matches!(
            (self.period, other.period),
            (Some(a), Some(b)) if a.is_adjacent(&b)
        );
        spatial || temporal
    }

    // Directional predicates on the spatial dimensions.

    pub fn is_left(&self, other: &STBox) -> bool {
        matches!((self.x, other.x), (Some(a), Some(b)) if a.is_left(&b))
    }

    pub fn is_over_or_left(&self, other: &STBox) -> bool {
        matches!((self.x, other.x), (Some(a), Some(b)) if a.is_over_or_left(&b))
    }

    pub fn is_right(&self, other: &STBox) -> bool {
        matches!((self.x, other.x), (Some(a), Some(b)) if a.is_right(&b))
    }

    pub fn is_over_or_right(&self, other: &STBox) -> bool {
        matches!((self.x, other.x), (Some(a), Some(b)) if a.is_over_or_right(&b))
    }

    pub fn is_below(&self, other: &STBox) -> bool {
        matches!((self.y, other.y), (Some(a), Some(b)) if a.is_left(&b))
    }

    pub fn is_over_or_below(&self, other: &STBox) -> bool {
        matches!((self.y, other.y), (Some(a), Some(b)) if a.is_over_or_left(&b))
    }

    pub fn is_above(&self, other: &STBox) -> bool {
        matches!((self.y, other.y), (Some(a), Some(b)) if a.is_right(&b))
    }

    pub fn is_over_or_above(&self, other: &STBox) -> bool {
        matches!((self.y, other.y), (Some(a), Some(b)) if a.is_over_or_right(&b))
    }

    pub fn is_front(&self, other: &STBox) -> bool {
        matches!((self.z, other.z), (Some(a), Some(b)) if a.is_left(&b))
    }

    pub fn is_over_or_front(&self, other: &STBox) -> bool {
        matches!((self.z, other.z), (Some(a), Some(b)) if a.is_over_or_left(&b))
    }

    pub fn is_back(&self, other: &STBox) -> bool {
        matches!((self.z, other.z), (Some(a), Some(b)) if a.is_right(&b))
    }

    pub fn is_over_or_back(&self, other: &STBox) -> bool {
        matches!((self.z, other.z), (Some(a), Some(b)) if a.is_over_or_right(&b))
    }

    // Directional predicates on the time dimension.

    pub fn is_before(&self, other: &STBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_left(&b))
    }

    pub fn is_over_or_before(&self, other: &STBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_over_or_left(&b))
    }

    pub fn is_after(&self, other: &STBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_right(&b))
    }

    pub fn is_over_or_after(&self, other: &STBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_over_or_right(&b))
    }

    fn size(&self) -> f64 {
        let mut size = 1.0;
        let mut any = false;
        for dim in [self.x, self.y, self.z] {
            if let Some(s) = dim {
                size *= s.width();
                any = true;
            }
        }
        if let Some(p) = self.period {
            size *= p.width();
            any = true;
        }
        if any {
            size
        } else {
            0.0
        }
    }

    /// Non-negative increase of the enclosing size when `new` is added.
    pub fn penalty(&self, new: &STBox) -> f64 {
        let union = self.union(new);
        let delta = union.size() - self.size();
        if delta.is_nan() {
            0.0
        } else {
            delta.max(0.0)
        }
    }

    /// Lower bound on the spatial distance between the two boxes.
    /// Infinite when the time projections are disjoint.
    pub fn nearest_approach_distance(&self, other: &STBox) -> f64 {
        if let (Some(a), Some(b)) = (self.period, other.period) {
            if !a.overlaps(&b) {
                return f64::INFINITY;
            }
        }
        let mut sum = 0.0;
        for (a, b) in [(self.x, other.x), (self.y, other.y), (self.z, other.z)] {
            if let (Some(a), Some(b)) = (a, b) {
                let d = a.distance_to_span(&b);
                sum += d * d;
            }
        }
        sum.sqrt()
    }
}

impl BoundingBox for STBox {
    fn adjust(&mut self, other: &Self) {
        STBox::adjust(self, other)
    }

    fn overlaps(&self, other: &Self) -> bool {
        STBox::overlaps(self, other)
    }

    fn contains(&self, other: &Self) -> bool {
        STBox::contains(self, other)
    }
}

impl fmt::Display for STBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.geodetic { "GEODSTBOX" } else { "STBOX" };
        if self.srid != 0 {
            write!(f, "SRID={};", self.srid)?;
        }
        match (self.x, self.y, self.period) {
            (Some(x), Some(y), Some(p)) => {
                if let Some(z) = self.z {
                    write!(
                        f,
                        "{tag} ZT((({},{},{}),({},{},{})),{})",
                        x.lower(),
                        y.lower(),
                        z.lower(),
                        x.upper(),
                        y.upper(),
                        z.upper(),
                        TsTzSpan::from_inner(p)
                    )
                } else {
                    write!(
                        f,
                        "{tag} XT((({},{}),({},{})),{})",
                        x.lower(),
                        y.lower(),
                        x.upper(),
                        y.upper(),
                        TsTzSpan::from_inner(p)
                    )
                }
            }
            (Some(x), Some(y), None) => {
                if let Some(z) = self.z {
                    write!(
                        f,
                        "{tag} Z((({},{},{}),({},{},{})))",
                        x.lower(),
                        y.lower(),
                        z.lower(),
                        x.upper(),
                        y.upper(),
                        z.upper()
                    )
                } else {
                    write!(
                        f,
                        "{tag} X((({},{}),({},{})))",
                        x.lower(),
                        y.lower(),
                        x.upper(),
                        y.upper()
                    )
                }
            }
            (None, None, Some(p)) => write!(f, "{tag} T({})", TsTzSpan::from_inner(p)),
            _ => write!(f, "{tag}()"),
        }
    }
}

impl std::str::FromStr for STBox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut s = s.trim();
        let mut srid = 0;
        if let Some(rest) = s.strip_prefix("SRID=") {
            let (num, tail) = rest
                .split_once(';')
                .ok_or_else(|| Error::parse(format!("bad SRID prefix: {s}")))?;
            srid = num
                .trim()
                .parse()
                .map_err(|_| Error::parse(format!("bad SRID: {num}")))?;
            s = tail.trim();
        }
        let (geodetic, rest) = if let Some(rest) = s.strip_prefix("GEODSTBOX") {
            (true, rest)
        } else if let Some(rest) = s.strip_prefix("STBOX") {
            (false, rest)
        } else {
            return Err(Error::parse(format!("not a spatiotemporal box: {s}")));
        };
        let rest = rest.trim_start();
        let (dims, body) = rest
            .split_once('(')
            .ok_or_else(|| Error::parse(format!("malformed spatiotemporal box: {s}")))?;
        let body = body
            .strip_suffix(')')
            .ok_or_else(|| Error::parse(format!("malformed spatiotemporal box: {s}")))?;
        let dims = dims.trim().to_ascii_uppercase();
        let (has_z, has_x, has_t) = match dims.as_str() {
            "XT" => (false, true, true),
            "ZT" => (true, true, true),
            "X" => (false, true, false),
            "Z" => (true, true, false),
            "T" => (false, false, true),
            _ => return Err(Error::parse(format!("bad box dimensions {dims}: {s}"))),
        };
        if !has_x {
            let period = body.trim().parse::<TsTzSpan>()?;
            let mut result = STBox::from_tstz_span(period);
            result.srid = srid;
            result.geodetic = geodetic;
            return Ok(result);
        }
        // (( corner ),( corner ))[, period]
        let corners_end = body
            .char_indices()
            .scan(0usize, |depth, (i, c)| {
                match c {
                    '(' => *depth += 1,
                    ')' => *depth -= 1,
                    _ => {}
                }
                Some((i, *depth))
            })
            .find(|(_, depth)| *depth == 0)
            .map(|(i, _)| i)
            .ok_or_else(|| Error::parse(format!("malformed corner list: {s}")))?;
        let corners = body[..=corners_end]
            .trim()
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| Error::parse(format!("malformed corner list: {s}")))?;
        let (low, high) = corners
            .split_once("),")
            .ok_or_else(|| Error::parse(format!("a box needs two corners: {s}")))?;
        let parse_corner = |c: &str| -> Result<Vec<f64>> {
            c.trim()
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split(',')
                .map(|v| {
                    v.trim()
                        .parse()
                        .map_err(|_| Error::parse(format!("bad coordinate: {v}")))
                })
                .collect()
        };
        let low = parse_corner(low)?;
        let high = parse_corner(high)?;
        let want = if has_z { 3 } else { 2 };
        if low.len() != want || high.len() != want {
            return Err(Error::parse(format!("wrong coordinate count: {s}")));
        }
        let period = if has_t {
            let rest = body[corners_end + 1..].trim_start_matches([',', ' ']);
            Some(rest.parse::<TsTzSpan>()?.inner)
        } else {
            None
        };
        Ok(STBox {
            x: Some(Span::new(low[0], high[0], true, true)?),
            y: Some(Span::new(low[1], high[1], true, true)?),
            z: if has_z {
                Some(Span::new(low[2], high[2], true, true)?)
            } else {
                None
            },
            srid,
            geodetic,
            period,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::datetime::ts;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn instant_box_is_degenerate() {
        let b = STBox::from_point_time(&pt(1.0, 2.0), 0, false);
        assert_eq!(b.xmin(), b.xmax());
        assert_eq!(b.ymin(), Some(2.0));
    }

    #[test]
    fn adjust_and_contains() {
        let mut a = STBox::from_point_time(&pt(0.0, 0.0), 0, false);
        let b = STBox::from_point_time(&pt(2.0, 2.0), 100, false);
        a.adjust(&b);
        assert!(a.contains(&STBox::from_point_time(&pt(1.0, 1.0), 50, false)));
        assert!(!a.contains(&STBox::from_point_time(&pt(3.0, 1.0), 50, false)));
    }

    #[test]
    fn nad_uses_euclidean_gap() {
        let mut a = STBox::from_point_time(&pt(0.0, 0.0), 0, false);
        a.adjust(&STBox::from_point_time(&pt(1.0, 1.0), 100, false));
        let mut b = STBox::from_point_time(&pt(4.0, 5.0), 0, false);
        b.adjust(&STBox::from_point_time(&pt(6.0, 6.0), 100, false));
        assert_eq!(a.nearest_approach_distance(&b), 5.0);
    }

    #[test]
    fn parse_display_round_trip() {
        let text = "SRID=4326;STBOX XT(((1,2),(3,4)),[2020-01-01 00:00:00+00, 2020-01-02 00:00:00+00])";
        let parsed: STBox = text.parse().unwrap();
        assert_eq!(parsed.srid(), 4326);
        assert_eq!(parsed.xmin(), Some(1.0));
        assert_eq!(parsed.ymax(), Some(4.0));
        assert_eq!(format!("{parsed}"), text);
        let t_only: STBox = "STBOX T([2020-01-01, 2020-01-02])".parse().unwrap();
        assert!(!t_only.has_x());
    }

    #[test]
    fn time_span_conversion() {
        let span: TsTzSpan = (ts("2020-01-01")..ts("2020-01-02")).into();
        let b = STBox::from_tstz_span(span);
        assert_eq!(b.tstz_span().unwrap(), span);
        assert!(!b.has_x());
    }
}
