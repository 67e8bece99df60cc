use crate::base::Geog;
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;

/// A geodetic point moving over time. Distances are great-circle meters.
///
/// ## Example
/// ```
/// # use teos::temporal::TGeogPoint;
/// let p: TGeogPoint = "[POINT(0 0)@2018-01-01 08:00:00+00]".parse().unwrap();
/// assert_eq!(p.num_instants(), 1);
/// ```
pub type TGeogPoint = Temporal<Geog>;
pub type TGeogPointInstant = TInstant<Geog>;
pub type TGeogPointSequence = TSequence<Geog>;
pub type TGeogPointSequenceSet = TSequenceSet<Geog>;
