use crate::collections::base::Span;

/// A span over 32-bit integers, kept in the canonical form where the upper
/// bound is exclusive.
///
/// ## Example
/// ```
/// # use teos::collections::number::IntSpan;
/// let span = IntSpan::new(1, 3, true, true).unwrap();
/// assert_eq!(span.upper(), 4);
/// assert!(!span.upper_inc());
/// assert!(span.contains_value(3));
/// ```
pub type IntSpan = Span<i32>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form() {
        let a = IntSpan::new(1, 3, true, true).unwrap();
        let b = IntSpan::new(0, 4, false, false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn adjacency_through_canonicalization() {
        // [1, 2] and [3, 4] have no integer between them
        let a = IntSpan::new(1, 2, true, true).unwrap();
        let b = IntSpan::new(3, 4, true, true).unwrap();
        assert!(a.is_adjacent(&b));
        assert!(!a.overlaps(&b));
    }
}
