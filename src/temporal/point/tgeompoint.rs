use crate::base::Geom;
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;

/// A planar point moving over time.
///
/// ## Example
/// ```
/// # use teos::temporal::TGeomPoint;
/// let p: TGeomPoint = "[POINT(0 0)@2018-01-01 08:00:00+00]".parse().unwrap();
/// assert_eq!(p.num_instants(), 1);
/// ```
pub type TGeomPoint = Temporal<Geom>;
pub type TGeomPointInstant = TInstant<Geom>;
pub type TGeomPointSequence = TSequence<Geom>;
pub type TGeomPointSequenceSet = TSequenceSet<Geom>;
