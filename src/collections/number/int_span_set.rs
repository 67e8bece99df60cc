use crate::collections::base::SpanSet;

/// An ordered set of disjoint integer spans.
///
/// ## Example
/// ```
/// # use teos::collections::number::{IntSpan, IntSpanSet};
/// let set = IntSpanSet::new([
///     IntSpan::new(1, 2, true, true).unwrap(),
///     IntSpan::new(3, 4, true, true).unwrap(),
/// ]);
/// // adjacent integer spans coalesce
/// assert_eq!(set.num_spans(), 1);
/// ```
pub type IntSpanSet = SpanSet<i32>;
