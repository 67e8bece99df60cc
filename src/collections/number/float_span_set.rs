use crate::collections::base::SpanSet;

/// An ordered set of disjoint float spans.
///
/// ## Example
/// ```
/// # use teos::collections::number::FloatSpanSet;
/// # use std::str::FromStr;
/// let set = FloatSpanSet::from_str("{[1, 2), [5, 6)}").unwrap();
/// assert_eq!(set.num_spans(), 2);
/// assert_eq!(set.width(), 2.0);
/// ```
pub type FloatSpanSet = SpanSet<f64>;
