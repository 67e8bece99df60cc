use crate::errors::Result;
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;

/// A double-precision float evolving over time.
///
/// ## Example
/// ```
/// # use teos::temporal::{tfloat_shift_scale_value, TFloat};
/// let t: TFloat = "[0@2020-01-01, 10@2020-01-03]".parse().unwrap();
/// let shifted = tfloat_shift_scale_value(&t, Some(1.0), None).unwrap();
/// assert_eq!(shifted.values(), vec![1.0, 11.0]);
/// ```
pub type TFloat = Temporal<f64>;
pub type TFloatInstant = TInstant<f64>;
pub type TFloatSequence = TSequence<f64>;
pub type TFloatSequenceSet = TSequenceSet<f64>;

/// Shift the value dimension by `shift` and rescale its extent to `width`.
pub fn tfloat_shift_scale_value(
    value: &TFloat,
    shift: Option<f64>,
    width: Option<f64>,
) -> Result<TFloat> {
    let (min, max) = match (value.min_value(), value.max_value()) {
        (Some(min), Some(max)) => (*min, *max),
        _ => (0.0, 0.0),
    };
    let scale = match width {
        Some(w) if max > min => w / (max - min),
        _ => 1.0,
    };
    let delta = shift.unwrap_or_default();
    value.map_values(&|v: &f64| Ok(min + delta + (v - min) * scale))
}

/// Round every value to the given number of decimal digits.
pub fn tfloat_round(value: &TFloat, digits: u32) -> TFloat {
    let factor = 10f64.powi(digits as i32);
    value
        .map_values(&|v: &f64| Ok((v * factor).round() / factor))
        .expect("rounding cannot fail")
}

/// Degrees-to-radians conversion of every value.
pub fn tfloat_radians(value: &TFloat) -> TFloat {
    value
        .map_values(&|v: &f64| Ok(v.to_radians()))
        .expect("conversion cannot fail")
}

/// Radians-to-degrees conversion of every value.
pub fn tfloat_degrees(value: &TFloat) -> TFloat {
    value
        .map_values(&|v: &f64| Ok(v.to_degrees()))
        .expect("conversion cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_scale_value() {
        let t: TFloat = "[0@2020-01-01, 10@2020-01-03]".parse().unwrap();
        let scaled = tfloat_shift_scale_value(&t, None, Some(5.0)).unwrap();
        assert_eq!(scaled.min_value(), Some(&0.0));
        assert_eq!(scaled.max_value(), Some(&5.0));
        let shifted = tfloat_shift_scale_value(&t, Some(2.0), None).unwrap();
        assert_eq!(shifted.min_value(), Some(&2.0));
    }

    #[test]
    fn rounding() {
        let t: TFloat = "[1.234@2020-01-01, 5.678@2020-01-02]".parse().unwrap();
        let rounded = tfloat_round(&t, 1);
        assert_eq!(rounded.values(), vec![1.2, 5.7]);
    }
}
