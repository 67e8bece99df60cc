use std::fmt;

use crate::errors::{Error, Result};

/// A 2-D or 3-D point with a spatial reference identifier.
///
/// The same payload backs both planar and geodetic temporal points; the
/// geodetic interpretation lives in the wrapper type, not in the payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub srid: i32,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point {
            x,
            y,
            z: None,
            srid: 0,
        }
    }

    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Point {
            x,
            y,
            z: Some(z),
            srid: 0,
        }
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    pub fn has_z(&self) -> bool {
        self.z.is_some()
    }

    /// Verify that two points agree on SRID and dimensionality.
    pub(crate) fn ensure_compatible(&self, other: &Point) -> Result<()> {
        if self.srid != other.srid {
            return Err(Error::SridMismatch {
                left: self.srid,
                right: other.srid,
            });
        }
        if self.has_z() != other.has_z() {
            return Err(Error::DimMismatch(
                "mixed 2D and 3D points".into(),
            ));
        }
        Ok(())
    }

    /// Affine interpolation between two points at the given fraction.
    pub(crate) fn lerp(&self, other: &Point, frac: f64) -> Result<Point> {
        self.ensure_compatible(other)?;
        Ok(Point {
            x: self.x + (other.x - self.x) * frac,
            y: self.y + (other.y - self.y) * frac,
            z: match (self.z, other.z) {
                (Some(a), Some(b)) => Some(a + (b - a) * frac),
                _ => None,
            },
            srid: self.srid,
        })
    }

    /// Parse the `[SRID=n;]POINT[ Z ](x y [z])` notation.
    pub(crate) fn parse_wkt(s: &str) -> Result<Point> {
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
        let upper = s.to_ascii_uppercase();
        let rest = upper
            .strip_prefix("POINT")
            .ok_or_else(|| Error::parse(format!("not a point: {s}")))?
            .trim_start();
        let (has_z, rest) = match rest.strip_prefix('Z') {
            Some(r) => (true, r.trim_start()),
            None => (false, rest),
        };
        let body = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| Error::parse(format!("malformed point: {s}")))?;
        let coords: Vec<f64> = body
            .split_whitespace()
            .map(|c| {
                c.parse()
                    .map_err(|_| Error::parse(format!("bad coordinate: {c}")))
            })
            .collect::<Result<_>>()?;
        match (has_z, coords.as_slice()) {
            (false, [x, y]) => Ok(Point::new(*x, *y).with_srid(srid)),
            (true, [x, y, z]) | (false, [x, y, z]) => {
                Ok(Point::new_3d(*x, *y, *z).with_srid(srid))
            }
            _ => Err(Error::parse(format!("wrong coordinate count: {s}"))),
        }
    }

    pub(crate) fn fmt_wkt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(z) = self.z {
            write!(f, "POINT Z ({} {} {})", self.x, self.y, z)
        } else {
            write!(f, "POINT({} {})", self.x, self.y)
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.srid != 0 {
            write!(f, "SRID={};", self.srid)?;
        }
        self.fmt_wkt(f)
    }
}

macro_rules! point_wrapper {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name(pub Point);

        impl $name {
            pub fn new(x: f64, y: f64) -> Self {
                Self(Point::new(x, y))
            }

            pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
                Self(Point::new_3d(x, y, z))
            }

            pub fn with_srid(self, srid: i32) -> Self {
                Self(self.0.with_srid(srid))
            }

            pub fn point(&self) -> &Point {
                &self.0
            }
        }

        impl From<Point> for $name {
            fn from(p: Point) -> Self {
                Self(p)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

point_wrapper!(
    /// A planar point, interpreted in Cartesian coordinates.
    Geom
);
point_wrapper!(
    /// A geodetic point, interpreted as longitude/latitude on the sphere.
    Geog
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_is_affine_per_coordinate() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(4.0, 2.0);
        let m = a.lerp(&b, 0.25).unwrap();
        assert_eq!((m.x, m.y), (1.0, 0.5));
    }

    #[test]
    fn srid_disagreement_is_an_error() {
        let a = Point::new(0.0, 0.0).with_srid(4326);
        let b = Point::new(1.0, 1.0).with_srid(3857);
        assert!(matches!(
            a.lerp(&b, 0.5),
            Err(Error::SridMismatch { .. })
        ));
    }

    #[test]
    fn mixed_dimensions_are_an_error() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new_3d(1.0, 1.0, 1.0);
        assert!(matches!(a.lerp(&b, 0.5), Err(Error::DimMismatch(_))));
    }
}
