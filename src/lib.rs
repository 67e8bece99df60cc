//! Temporal-value algebra: base values evolving over time.
//!
//! A temporal value binds a base type — boolean, integer, float, text,
//! point, network point — to the time dimension, as one of three
//! structural subtypes: a single time-stamped value ([`temporal::TInstant`]),
//! a sequence over a period ([`temporal::TSequence`], discrete, stepwise
//! or linear), or a set of sequences ([`temporal::TSequenceSet`]).
//!
//! Over this algebra the crate offers construction and normalization,
//! text and Well-Known-Binary (de)serialization, time and value
//! restriction, synchronized lifted operators, spatial relations for
//! moving points, tiling for analytics, and the consistency logic of
//! R-tree and quad/k-d-tree index access methods.
//!
//! ```
//! # use teos::temporal::TFloat;
//! let t: TFloat = "[0@2020-01-01, 10@2020-01-03]".parse().unwrap();
//! # use chrono::{TimeZone, Utc};
//! let noon = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
//! assert_eq!(t.value_at_timestamp(noon), Some(5.0));
//! ```

use bitmask_enum::bitmask;

pub mod base;
pub mod boxes;
pub mod collections;
pub mod errors;
pub mod index;
pub mod spatial;
pub mod temporal;
pub mod tile;
pub mod wkb;

mod utils;

use collections::datetime::TsTzSpan;

/// The output variant of the Well-Known-Binary codec.
///
/// `NDR` selects little-endian output, `XDR` big-endian; `Hex` marks the
/// hex-encoded surface of the same bytes.
#[bitmask(u8)]
pub enum WKBVariant {
    /// Little-endian encoding
    NDR = 1,
    /// Big-endian encoding
    XDR = 2,
    /// Hexadecimal text encoding
    Hex = 4,
}

/// Conservative axis-aligned enclosure of a value in value × time or
/// space × time, cached by every temporal value and used by the index
/// and every fast-reject path.
pub trait BoundingBox: Clone + PartialEq + std::fmt::Debug {
    /// Expand in place so `other` is also enclosed.
    fn adjust(&mut self, other: &Self);

    /// Whether the two boxes share at least one point.
    fn overlaps(&self, other: &Self) -> bool;

    /// Whether `other` lies entirely inside this box.
    fn contains(&self, other: &Self) -> bool;
}

impl BoundingBox for TsTzSpan {
    fn adjust(&mut self, other: &Self) {
        *self = self.hull(other);
    }

    fn overlaps(&self, other: &Self) -> bool {
        crate::collections::base::Collection::overlaps(self, other)
    }

    fn contains(&self, other: &Self) -> bool {
        crate::collections::base::Collection::is_contained_in(other, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wkb_variant_is_a_bitmask() {
        let v = WKBVariant::NDR | WKBVariant::Hex;
        assert!(v.contains(WKBVariant::NDR));
        assert!(v.contains(WKBVariant::Hex));
        assert!(!v.contains(WKBVariant::XDR));
    }
}
