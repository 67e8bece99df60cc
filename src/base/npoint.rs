use std::fmt;

use crate::errors::{Error, Result};

/// A network point: a position along an identified route.
///
/// The position is a fraction in `[0, 1]` of the route length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NPoint {
    rid: i64,
    pos: f64,
}

impl NPoint {
    /// Build a network point, validating the position fraction.
    pub fn new(rid: i64, pos: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&pos) {
            return Err(Error::bounds(format!(
                "network position {pos} outside [0, 1]"
            )));
        }
        Ok(NPoint { rid, pos })
    }

    pub fn route(&self) -> i64 {
        self.rid
    }

    pub fn position(&self) -> f64 {
        self.pos
    }

    /// Interpolate along the route; both endpoints must share the route.
    pub(crate) fn lerp(&self, other: &NPoint, frac: f64) -> Result<NPoint> {
        if self.rid != other.rid {
            return Err(Error::SegMismatch {
                left: self.rid,
                right: other.rid,
            });
        }
        Ok(NPoint {
            rid: self.rid,
            pos: self.pos + (other.pos - self.pos) * frac,
        })
    }
}

impl fmt::Display for NPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NPoint({},{})", self.rid, self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_a_fraction() {
        assert!(NPoint::new(1, 0.5).is_ok());
        assert!(NPoint::new(1, 1.5).is_err());
    }

    #[test]
    fn interpolation_requires_same_route() {
        let a = NPoint::new(7, 0.0).unwrap();
        let b = NPoint::new(7, 1.0).unwrap();
        assert_eq!(a.lerp(&b, 0.25).unwrap().position(), 0.25);

        let c = NPoint::new(8, 0.5).unwrap();
        assert!(matches!(a.lerp(&c, 0.5), Err(Error::SegMismatch { .. })));
    }
}
