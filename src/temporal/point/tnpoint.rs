use crate::base::NPoint;
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;

/// A network point moving over time: a position along identified routes.
///
/// Interpolation across a segment requires both endpoints to share the
/// route; a sequence may change routes at its instants.
///
/// ## Example
/// ```
/// # use teos::temporal::TNpoint;
/// let t: TNpoint = "[NPoint(1,0)@2020-01-01, NPoint(1,1)@2020-01-02]".parse().unwrap();
/// assert_eq!(t.num_instants(), 2);
/// ```
pub type TNpoint = Temporal<NPoint>;
pub type TNpointInstant = TInstant<NPoint>;
pub type TNpointSequence = TSequence<NPoint>;
pub type TNpointSequenceSet = TSequenceSet<NPoint>;

/// The set of route identifiers the temporal network point visits.
pub fn tnpoint_routes(value: &TNpoint) -> Vec<i64> {
    let mut routes: Vec<i64> = value
        .instants()
        .iter()
        .map(|i| i.value().route())
        .collect();
    routes.sort_unstable();
    routes.dedup();
    routes
}

/// The cumulative fraction travelled along the routes, per linear segment.
pub fn tnpoint_length(value: &TNpoint) -> f64 {
    value
        .instants()
        .windows(2)
        .map(|pair| {
            if pair[0].value().route() == pair[1].value().route() {
                (pair[1].value().position() - pair[0].value().position()).abs()
            } else {
                0.0
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::datetime::ts;

    #[test]
    fn routes_and_length() {
        let t: TNpoint =
            "[NPoint(1,0)@2020-01-01, NPoint(1,0.5)@2020-01-02]".parse().unwrap();
        assert_eq!(tnpoint_routes(&t), vec![1]);
        assert_eq!(tnpoint_length(&t), 0.5);
    }

    #[test]
    fn interpolation_within_one_route() {
        let t: TNpoint =
            "[NPoint(7,0)@2020-01-01, NPoint(7,1)@2020-01-03]".parse().unwrap();
        let v = t.value_at_timestamp(ts("2020-01-02")).unwrap();
        assert_eq!(v.route(), 7);
        assert_eq!(v.position(), 0.5);
    }
}
