use std::fmt::Debug;

use super::span::{Span, SpanValue};
use super::span_set::SpanSet;

/// Topological and positional operations shared by every collection type.
pub trait Collection: PartialEq + Debug + Clone {
    type Type: Clone;

    /// Returns whether `self` is contained in `container`.
    fn is_contained_in(&self, container: &Self) -> bool;

    /// Determines if the collection contains the specified item.
    fn contains(&self, content: &Self::Type) -> bool;

    /// Returns whether `self` overlaps `other`. That is, both share at
    /// least an element.
    fn overlaps(&self, other: &Self) -> bool;

    /// Returns whether `self` touches `other` without sharing an element.
    fn is_adjacent(&self, other: &Self) -> bool;

    /// Returns whether `self` is strictly before `other`. That is, `self`
    /// ends before `other` starts.
    fn is_left(&self, other: &Self) -> bool;

    /// Returns whether `self` is before `other` allowing overlap. That is,
    /// `self` ends before `other` ends (or at the same time).
    fn is_over_or_left(&self, other: &Self) -> bool;

    /// Returns whether `self` is after `other` allowing overlap. That is,
    /// `self` starts after `other` starts (or at the same time).
    fn is_over_or_right(&self, other: &Self) -> bool;

    /// Returns whether `self` is strictly after `other`. That is, `self`
    /// starts after `other` ends.
    fn is_right(&self, other: &Self) -> bool;
}

impl<T: SpanValue> Collection for Span<T> {
    type Type = T;

    fn is_contained_in(&self, container: &Self) -> bool {
        Span::is_contained_in(self, container)
    }

    fn contains(&self, content: &T) -> bool {
        self.contains_value(*content)
    }

    fn overlaps(&self, other: &Self) -> bool {
        Span::overlaps(self, other)
    }

    fn is_adjacent(&self, other: &Self) -> bool {
        Span::is_adjacent(self, other)
    }

    fn is_left(&self, other: &Self) -> bool {
        Span::is_left(self, other)
    }

    fn is_over_or_left(&self, other: &Self) -> bool {
        Span::is_over_or_left(self, other)
    }

    fn is_over_or_right(&self, other: &Self) -> bool {
        Span::is_over_or_right(self, other)
    }

    fn is_right(&self, other: &Self) -> bool {
        Span::is_right(self, other)
    }
}

impl<T: SpanValue> Collection for SpanSet<T> {
    type Type = T;

    fn is_contained_in(&self, container: &Self) -> bool {
        SpanSet::is_contained_in(self, container)
    }

    fn contains(&self, content: &T) -> bool {
        self.contains_value(*content)
    }

    fn overlaps(&self, other: &Self) -> bool {
        SpanSet::overlaps(self, other)
    }

    fn is_adjacent(&self, other: &Self) -> bool {
        SpanSet::is_adjacent(self, other)
    }

    fn is_left(&self, other: &Self) -> bool {
        SpanSet::is_left(self, other)
    }

    fn is_over_or_left(&self, other: &Self) -> bool {
        SpanSet::is_over_or_left(self, other)
    }

    fn is_over_or_right(&self, other: &Self) -> bool {
        SpanSet::is_over_or_right(self, other)
    }

    fn is_right(&self, other: &Self) -> bool {
        SpanSet::is_right(self, other)
    }
}

// Newtype wrappers (the datetime collections) cannot reuse the blanket
// impls above, so the delegation is generated instead.
//
// Parameters:
//  $type: the wrapping type
//  $field: the field holding the inner Span/SpanSet
//  $elem: the public element type
//  $to_inner: conversion from the public element to the inner one
macro_rules! impl_collection_delegate {
    ($type:ty, $field:ident, $elem:ty, $to_inner:expr) => {
        impl $crate::collections::base::Collection for $type {
            type Type = $elem;

            fn is_contained_in(&self, container: &Self) -> bool {
                self.$field.is_contained_in(&container.$field)
            }

            fn contains(&self, content: &$elem) -> bool {
                let to_inner = $to_inner;
                self.$field.contains_value(to_inner(content))
            }

            fn overlaps(&self, other: &Self) -> bool {
                self.$field.overlaps(&other.$field)
            }

            fn is_adjacent(&self, other: &Self) -> bool {
                self.$field.is_adjacent(&other.$field)
            }

            fn is_left(&self, other: &Self) -> bool {
                self.$field.is_left(&other.$field)
            }

            fn is_over_or_left(&self, other: &Self) -> bool {
                self.$field.is_over_or_left(&other.$field)
            }

            fn is_over_or_right(&self, other: &Self) -> bool {
                self.$field.is_over_or_right(&other.$field)
            }

            fn is_right(&self, other: &Self) -> bool {
                self.$field.is_right(&other.$field)
            }
        }
    };
}

pub(crate) use impl_collection_delegate;
