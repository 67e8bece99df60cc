use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;

/// A 32-bit integer evolving over time. Always step-interpolated.
///
/// ## Example
/// ```
/// # use teos::temporal::TInt;
/// let t: TInt = "[1@2018-01-01 08:00:00+00, 2@2018-01-02 08:00:00+00]".parse().unwrap();
/// assert_eq!(t.num_instants(), 2);
/// ```
pub type TInt = Temporal<i32>;
pub type TIntInstant = TInstant<i32>;
pub type TIntSequence = TSequence<i32>;
pub type TIntSequenceSet = TSequenceSet<i32>;

/// Widen a temporal integer to a temporal float, keeping the step
/// interpolation.
pub fn tint_to_tfloat(value: &TInt) -> Temporal<f64> {
    value
        .map_values(&|v: &i32| Ok(*v as f64))
        .expect("int widening cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::TInterpolation;

    #[test]
    fn widening_keeps_step_interpolation() {
        let t: TInt = "[1@2020-01-01, 2@2020-01-02]".parse().unwrap();
        let f = tint_to_tfloat(&t);
        assert_eq!(f.interpolation(), TInterpolation::Stepwise);
        assert_eq!(f.values(), vec![1.0, 2.0]);
    }
}
