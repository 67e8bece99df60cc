mod collection;
pub(crate) use collection::impl_collection_delegate;
pub use collection::Collection;

mod span;
pub(crate) use span::{cmp_lower_lower, cmp_lower_upper, cmp_upper_upper};
pub use span::{Span, SpanValue};

mod span_set;
pub use span_set::SpanSet;
