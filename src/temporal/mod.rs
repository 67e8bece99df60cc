mod interpolation;
pub use interpolation::TInterpolation;

mod number;
pub use number::tfloat::*;
pub use number::tint::*;
pub use number::tnumber::{NumberBase, TNumber};

mod point;
pub use point::tgeogpoint::*;
pub use point::tgeompoint::*;
pub use point::tnpoint::*;
pub use point::tpoint::{PointBase, TPointTrait};

mod tbool;
pub use tbool::*;

pub(crate) mod lifting;

#[allow(clippy::module_inception)]
mod temporal;
pub(crate) use temporal::EPSILON;
pub use temporal::{BaseValue, TSubtype, Temporal};

mod tinstant;
pub use tinstant::TInstant;

mod tsequence;
pub use tsequence::TSequence;

mod tsequence_set;
pub use tsequence_set::TSequenceSet;

mod ttext;
pub use ttext::*;
