use thiserror::Error;

use crate::base::BaseType;

/// Error kinds surfaced by every fallible operation of the crate.
///
/// Fast-reject paths (disjoint bounding boxes, empty intersections) are not
/// errors; operations whose mathematical result is empty return `None` or an
/// empty collection instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Span bounds are invalid: lower above upper, or an empty interior.
    #[error("invalid span bounds: {0}")]
    BadBounds(String),

    /// The interpolation is incompatible with the base type.
    #[error("interpolation {interp} is invalid for base type {base:?}")]
    BadInterp { interp: String, base: BaseType },

    /// Instants are out of order, or duplicated with inconsistent values.
    #[error("timestamps must be strictly increasing: {0}")]
    NonMonotonicTime(String),

    /// Operator applied to incompatible temporal types.
    #[error("operand type mismatch: {0}")]
    TypeMismatch(String),

    /// Arguments have different base types.
    #[error("base type mismatch: {left:?} vs {right:?}")]
    BaseMismatch { left: BaseType, right: BaseType },

    /// Spatial arguments disagree on their reference system.
    #[error("SRID mismatch: {left} vs {right}")]
    SridMismatch { left: i32, right: i32 },

    /// Spatial arguments disagree on dimensionality.
    #[error("dimension mismatch: {0}")]
    DimMismatch(String),

    /// Network points on different route segments cannot be interpolated.
    #[error("network points are on different routes: {left} vs {right}")]
    SegMismatch { left: i64, right: i64 },

    /// Timestamp or numeric arithmetic would overflow.
    #[error("value out of range: {0}")]
    RangeOverflow(String),

    /// Division by zero in a lifted arithmetic operator.
    #[error("division by zero at timestamp {0}")]
    DivZero(i64),

    /// The WKB type code is unknown.
    #[error("unknown WKB type code: {0:#06x}")]
    BadWkbType(u16),

    /// The WKB flags byte is inconsistent with the declared type.
    #[error("invalid WKB flags: {0:#04x}")]
    BadWkbFlags(u8),

    /// A WKB read would run past the end of the buffer.
    #[error("WKB buffer overrun: need {needed} bytes at offset {offset}, have {available}")]
    BufOverrun {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A geometry argument is empty where a non-empty one is required.
    #[error("geometry argument is empty")]
    EmptyGeom,

    /// Textual input does not conform to the expected notation.
    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    pub(crate) fn bounds(msg: impl Into<String>) -> Self {
        Error::BadBounds(msg.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type kept for `TryFrom` conversions between a temporal value and a
/// specific subtype, where the only possible failure is a wrong subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrongSubtype;

impl std::fmt::Display for WrongSubtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("temporal value has a different subtype")
    }
}

impl std::error::Error for WrongSubtype {}
