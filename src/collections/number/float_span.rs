use crate::collections::base::Span;

/// A span over double-precision floats.
///
/// ## Example
/// ```
/// # use teos::collections::number::FloatSpan;
/// # use std::str::FromStr;
/// let span = FloatSpan::from_str("[23.9, 78.8]").unwrap();
/// assert!(span.lower_inc());
///
/// let span: FloatSpan = (23.9..78.8).into();
/// assert!(!span.upper_inc());
/// ```
pub type FloatSpan = Span<f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_span_keeps_bounds() {
        let span = FloatSpan::new(23.9, 78.8, false, true).unwrap();
        assert_eq!(span.lower(), 23.9);
        assert_eq!(span.upper(), 78.8);
        assert!(!span.lower_inc());
        assert!(span.upper_inc());
    }

    #[test]
    fn shift_and_scale() {
        let span: FloatSpan = (1.0..3.0).into();
        let shifted = span.shift_by(2.0);
        assert_eq!((shifted.lower(), shifted.upper()), (3.0, 5.0));
        let scaled = span.scale_to(4.0).unwrap();
        assert_eq!((scaled.lower(), scaled.upper()), (1.0, 5.0));
    }
}
