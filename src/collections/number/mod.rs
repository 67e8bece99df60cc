mod float_span;
pub use float_span::FloatSpan;

mod float_span_set;
pub use float_span_set::FloatSpanSet;

mod int_span;
pub use int_span::IntSpan;

mod int_span_set;
pub use int_span_set::IntSpanSet;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::base::Collection;

    #[test]
    fn collection_trait_over_number_spans() {
        let a: FloatSpan = (1.0..5.0).into();
        let b: FloatSpan = (2.0..3.0).into();
        assert!(b.is_contained_in(&a));
        assert!(a.contains(&2.5));
        assert!(!a.contains(&5.0));
    }

    #[test]
    fn collection_trait_over_number_span_sets() {
        let a = FloatSpanSet::new([(1.0..2.0).into(), (4.0..5.0).into()]);
        let b = FloatSpanSet::new([(1.5..1.7).into()]);
        assert!(b.is_contained_in(&a));
        assert!(a.overlaps(&b));
        assert!(b.is_over_or_left(&a));
    }
}
