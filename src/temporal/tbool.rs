use std::ops::{BitAnd, BitOr, Not};

use super::lifting::{lift_binary, lift_with_value, LiftSpec};
use super::temporal::Temporal;
use super::tinstant::TInstant;
use super::tsequence::TSequence;
use super::tsequence_set::TSequenceSet;
use crate::collections::datetime::TsTzSpanSet;
use crate::errors::Result;

/// A boolean evolving over time.
///
/// ## Example
/// ```
/// # use teos::temporal::TBool;
/// let b: TBool = "[t@2020-01-01, f@2020-01-02]".parse().unwrap();
/// assert!(b.ever_eq(&true));
/// ```
pub type TBool = Temporal<bool>;
pub type TBoolInstant = TInstant<bool>;
pub type TBoolSequence = TSequence<bool>;
pub type TBoolSequenceSet = TSequenceSet<bool>;

pub trait TBoolTrait {
    /// Temporal conjunction.
    fn temporal_and(&self, other: &TBool) -> Result<Option<TBool>>;

    /// Temporal disjunction.
    fn temporal_or(&self, other: &TBool) -> Result<Option<TBool>>;

    /// Temporal negation.
    fn temporal_not(&self) -> TBool;

    /// The periods during which the value is true.
    fn when_true(&self) -> Option<TsTzSpanSet>;
}

impl TBoolTrait for TBool {
    fn temporal_and(&self, other: &TBool) -> Result<Option<TBool>> {
        lift_binary(self, other, &LiftSpec::no_cross(false), &|a: &bool,
                                                              b: &bool| {
            Ok(*a && *b)
        })
    }

    fn temporal_or(&self, other: &TBool) -> Result<Option<TBool>> {
        lift_binary(self, other, &LiftSpec::no_cross(false), &|a: &bool,
                                                              b: &bool| {
            Ok(*a || *b)
        })
    }

    fn temporal_not(&self) -> TBool {
        self.map_values(&|v: &bool| Ok(!v))
            .expect("negation cannot fail")
    }

    fn when_true(&self) -> Option<TsTzSpanSet> {
        self.at_value(&true).map(|t| t.time())
    }
}

impl BitAnd for TBool {
    type Output = Option<TBool>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.temporal_and(&rhs).ok().flatten()
    }
}

impl BitAnd<bool> for TBool {
    type Output = Option<TBool>;

    fn bitand(self, rhs: bool) -> Self::Output {
        lift_with_value(&self, &rhs, &LiftSpec::no_cross(false), &|a: &bool,
                                                                  b: &bool| {
            Ok(*a && *b)
        })
        .ok()
        .flatten()
    }
}

impl BitOr for TBool {
    type Output = Option<TBool>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.temporal_or(&rhs).ok().flatten()
    }
}

impl BitOr<bool> for TBool {
    type Output = Option<TBool>;

    fn bitor(self, rhs: bool) -> Self::Output {
        lift_with_value(&self, &rhs, &LiftSpec::no_cross(false), &|a: &bool,
                                                                  b: &bool| {
            Ok(*a || *b)
        })
        .ok()
        .flatten()
    }
}

impl Not for TBool {
    type Output = TBool;

    fn not(self) -> TBool {
        self.temporal_not()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::datetime::ts;
    use pretty_assertions::assert_eq;

    fn tb(s: &str) -> TBool {
        s.parse().unwrap()
    }

    #[test]
    fn and_or_not() {
        let a = tb("[t@2020-01-01, t@2020-01-03]");
        let b = tb("[t@2020-01-01, f@2020-01-02, t@2020-01-03]");
        let both = a.clone().bitand(b.clone()).unwrap();
        assert_eq!(both.value_at_timestamp(ts("2020-01-01")), Some(true));
        assert_eq!(both.value_at_timestamp(ts("2020-01-02")), Some(false));
        let either = a.bitor(b).unwrap();
        assert_eq!(either.value_at_timestamp(ts("2020-01-02")), Some(true));
        let neither = tb("[f@2020-01-01, f@2020-01-02]").not();
        assert!(neither.always_eq(&true));
    }

    #[test]
    fn when_true_reports_periods() {
        let b = tb("[t@2020-01-01, f@2020-01-02, t@2020-01-03, t@2020-01-04]");
        let when = b.when_true().unwrap();
        assert_eq!(when.num_spans(), 2);
        assert!(when.contains_timestamp(ts("2020-01-03 12:00:00")));
        assert!(!when.contains_timestamp(ts("2020-01-02 12:00:00")));
    }
}
