mod npoint;
mod point;

pub use npoint::NPoint;
pub use point::{Geog, Geom, Point};

use std::cmp::Ordering;

use crate::errors::{Error, Result};

/// Closed enumeration of the base types a temporal value can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Bool,
    Int4,
    Int8,
    Float8,
    Text,
    TimestampTz,
    Geom,
    Geog,
    Npoint,
}

impl BaseType {
    /// Width in bytes of the wire representation of a value of this type,
    /// or `None` for variable-length payloads.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            BaseType::Bool => Some(1),
            BaseType::Int4 => Some(4),
            BaseType::Int8 | BaseType::Float8 | BaseType::TimestampTz => Some(8),
            BaseType::Text | BaseType::Geom | BaseType::Geog => None,
            BaseType::Npoint => Some(16),
        }
    }

    /// Whether values of this type support a total order.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, BaseType::Geom | BaseType::Geog | BaseType::Npoint)
    }

    /// Whether linear interpolation between two samples is meaningful.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            BaseType::Float8 | BaseType::Geom | BaseType::Geog | BaseType::Npoint
        )
    }

    /// Whether this is a numeric type usable in value spans and boxes.
    pub fn is_number(&self) -> bool {
        matches!(self, BaseType::Int4 | BaseType::Int8 | BaseType::Float8)
    }
}

/// Uniform tagged value carrier.
///
/// Operators over datums dispatch on the base type the payload carries.
/// Geometric payloads own their blob; cloning a datum clones the blob.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Bool(bool),
    Int4(i32),
    Int8(i64),
    Float8(f64),
    Text(String),
    TimestampTz(i64),
    Geom(Point),
    Geog(Point),
    Npoint(NPoint),
}

impl Datum {
    pub fn base_type(&self) -> BaseType {
        match self {
            Datum::Bool(_) => BaseType::Bool,
            Datum::Int4(_) => BaseType::Int4,
            Datum::Int8(_) => BaseType::Int8,
            Datum::Float8(_) => BaseType::Float8,
            Datum::Text(_) => BaseType::Text,
            Datum::TimestampTz(_) => BaseType::TimestampTz,
            Datum::Geom(_) => BaseType::Geom,
            Datum::Geog(_) => BaseType::Geog,
            Datum::Npoint(_) => BaseType::Npoint,
        }
    }

    /// Total order over two datums of the same ordered base type.
    pub fn cmp(&self, other: &Datum) -> Result<Ordering> {
        match (self, other) {
            (Datum::Bool(a), Datum::Bool(b)) => Ok(a.cmp(b)),
            (Datum::Int4(a), Datum::Int4(b)) => Ok(a.cmp(b)),
            (Datum::Int8(a), Datum::Int8(b)) => Ok(a.cmp(b)),
            (Datum::Float8(a), Datum::Float8(b)) => Ok(a.total_cmp(b)),
            (Datum::Text(a), Datum::Text(b)) => Ok(a.cmp(b)),
            (Datum::TimestampTz(a), Datum::TimestampTz(b)) => Ok(a.cmp(b)),
            _ => Err(Error::BaseMismatch {
                left: self.base_type(),
                right: other.base_type(),
            }),
        }
    }

    /// Addition over ordered numeric datums, used by span arithmetic.
    pub fn add(&self, other: &Datum) -> Result<Datum> {
        match (self, other) {
            (Datum::Int4(a), Datum::Int4(b)) => a
                .checked_add(*b)
                .map(Datum::Int4)
                .ok_or_else(|| Error::RangeOverflow("int4 addition".into())),
            (Datum::Int8(a), Datum::Int8(b)) => a
                .checked_add(*b)
                .map(Datum::Int8)
                .ok_or_else(|| Error::RangeOverflow("int8 addition".into())),
            (Datum::Float8(a), Datum::Float8(b)) => Ok(Datum::Float8(a + b)),
            (Datum::TimestampTz(a), Datum::Int8(b)) => a
                .checked_add(*b)
                .map(Datum::TimestampTz)
                .ok_or_else(|| Error::RangeOverflow("timestamp shift".into())),
            _ => Err(Error::BaseMismatch {
                left: self.base_type(),
                right: other.base_type(),
            }),
        }
    }

    /// Promotion to double, defined for the numeric and time types.
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Datum::Int4(v) => Ok(*v as f64),
            Datum::Int8(v) => Ok(*v as f64),
            Datum::Float8(v) => Ok(*v),
            Datum::TimestampTz(v) => Ok(*v as f64),
            _ => Err(Error::TypeMismatch(format!(
                "{:?} does not promote to double",
                self.base_type()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datum_order_dispatches_on_base_type() {
        assert_eq!(
            Datum::Int4(1).cmp(&Datum::Int4(2)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Datum::Text("b".into()).cmp(&Datum::Text("a".into())).unwrap(),
            Ordering::Greater
        );
        assert!(Datum::Int4(1).cmp(&Datum::Float8(1.0)).is_err());
    }

    #[test]
    fn continuous_base_types() {
        assert!(BaseType::Float8.is_continuous());
        assert!(BaseType::Npoint.is_continuous());
        assert!(!BaseType::Int4.is_continuous());
        assert!(!BaseType::Text.is_continuous());
    }

    #[test]
    fn promotion() {
        assert_eq!(Datum::Int4(3).as_f64().unwrap(), 3.0);
        assert!(Datum::Bool(true).as_f64().is_err());
    }
}
