//! Quad-tree partitioning of temporal boxes in the 4-D space
//! `(xmin, xmax, tmin, tmax)`.

use super::strategy::Strategy;
use crate::boxes::TBox;
use crate::collections::base::Span;
use crate::utils::{NOBEGIN, NOEND};

/// The traversal value of a quad/k-d tree over temporal boxes: a pair of
/// boxes where `left` brackets the lower bounds of the subtree's boxes
/// and `right` brackets their upper bounds, in both dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TboxNode {
    pub(crate) left_xmin: f64,
    pub(crate) left_xmax: f64,
    pub(crate) right_xmin: f64,
    pub(crate) right_xmax: f64,
    pub(crate) left_tmin: i64,
    pub(crate) left_tmax: i64,
    pub(crate) right_tmin: i64,
    pub(crate) right_tmax: i64,
}

impl TboxNode {
    /// The initial traversal value: no restriction, the whole 4-D space.
    pub fn init() -> TboxNode {
        TboxNode {
            left_xmin: f64::NEG_INFINITY,
            left_xmax: f64::INFINITY,
            right_xmin: f64::NEG_INFINITY,
            right_xmax: f64::INFINITY,
            left_tmin: NOBEGIN,
            left_tmax: NOEND,
            right_tmin: NOBEGIN,
            right_tmax: NOEND,
        }
    }

    /// The pair as temporal boxes, for inspection.
    pub fn left(&self) -> TBox {
        TBox::from_raw(
            Some(Span::from_raw(self.left_xmin, self.left_xmax, true, true)),
            Some(Span::from_raw(self.left_tmin, self.left_tmax, true, true)),
        )
    }

    pub fn right(&self) -> TBox {
        TBox::from_raw(
            Some(Span::from_raw(self.right_xmin, self.right_xmax, true, true)),
            Some(Span::from_raw(self.right_tmin, self.right_tmax, true, true)),
        )
    }

    /// Whether a box could be stored below this traversal value.
    pub fn contains_box(&self, tbox: &TBox) -> bool {
        let x_ok = match (tbox.xmin(), tbox.xmax()) {
            (Some(xmin), Some(xmax)) => {
                xmin >= self.left_xmin
                    && xmin <= self.left_xmax
                    && xmax >= self.right_xmin
                    && xmax <= self.right_xmax
            }
            _ => true,
        };
        let t_ok = match (tbox.tmin_micros(), tbox.tmax_micros()) {
            (Some(tmin), Some(tmax)) => {
                tmin >= self.left_tmin
                    && tmin <= self.left_tmax
                    && tmax >= self.right_tmin
                    && tmax <= self.right_tmax
            }
            _ => true,
        };
        x_ok && t_ok
    }
}

/// The quadrant of a box relative to the centroid: four bits comparing,
/// in order, `xmin`, `xmax`, `tmin`, `tmax` of the box against the
/// centroid's.
pub fn quadrant_4d(centroid: &TBox, inbox: &TBox) -> u8 {
    let mut quadrant = 0u8;
    if inbox.xmin() > centroid.xmin() {
        quadrant |= 0x8;
    }
    if inbox.xmax() > centroid.xmax() {
        quadrant |= 0x4;
    }
    if inbox.tmin_micros() > centroid.tmin_micros() {
        quadrant |= 0x2;
    }
    if inbox.tmax_micros() > centroid.tmax_micros() {
        quadrant |= 0x1;
    }
    quadrant
}

/// The traversal value of the child in the given quadrant: each bit
/// replaces the matching lower or upper bound with the centroid's.
pub fn quadtree_next(nodebox: &TboxNode, centroid: &TBox, quadrant: u8) -> TboxNode {
    let mut next = *nodebox;
    let cx_min = centroid.xmin().expect("centroid has a value dimension");
    let cx_max = centroid.xmax().expect("centroid has a value dimension");
    let ct_min = centroid.tmin_micros().expect("centroid has a time dimension");
    let ct_max = centroid.tmax_micros().expect("centroid has a time dimension");
    if quadrant & 0x8 != 0 {
        next.left_xmin = cx_min;
    } else {
        next.left_xmax = cx_min;
    }
    if quadrant & 0x4 != 0 {
        next.right_xmin = cx_max;
    } else {
        next.right_xmax = cx_max;
    }
    if quadrant & 0x2 != 0 {
        next.left_tmin = ct_min;
    } else {
        next.left_tmax = ct_min;
    }
    if quadrant & 0x1 != 0 {
        next.right_tmin = ct_max;
    } else {
        next.right_tmax = ct_max;
    }
    next
}

/// Can any box below the traversal value overlap the query?
pub fn overlap_4d(nodebox: &TboxNode, query: &TBox) -> bool {
    let mut result = true;
    if let (Some(xmin), Some(xmax)) = (query.xmin(), query.xmax()) {
        result &= nodebox.left_xmin <= xmax && nodebox.right_xmax >= xmin;
    }
    if let (Some(tmin), Some(tmax)) = (query.tmin_micros(), query.tmax_micros()) {
        result &= nodebox.left_tmin <= tmax && nodebox.right_tmax >= tmin;
    }
    result
}

/// Can any box below the traversal value contain the query?
pub fn contain_4d(nodebox: &TboxNode, query: &TBox) -> bool {
    let mut result = true;
    if let (Some(xmin), Some(xmax)) = (query.xmin(), query.xmax()) {
        result &= nodebox.left_xmin <= xmin && nodebox.right_xmax >= xmax;
    }
    if let (Some(tmin), Some(tmax)) = (query.tmin_micros(), query.tmax_micros()) {
        result &= nodebox.left_tmin <= tmin && nodebox.right_tmax >= tmax;
    }
    result
}

/// Can any box below the traversal value be strictly left of the query?
pub fn left_4d(nodebox: &TboxNode, query: &TBox) -> bool {
    query.xmin().is_some_and(|xmin| nodebox.right_xmax < xmin)
}

/// Can any box below the traversal value avoid extending right of the query?
pub fn over_left_4d(nodebox: &TboxNode, query: &TBox) -> bool {
    query.xmax().is_some_and(|xmax| nodebox.right_xmax <= xmax)
}

/// Can any box below the traversal value be strictly right of the query?
pub fn right_4d(nodebox: &TboxNode, query: &TBox) -> bool {
    query.xmax().is_some_and(|xmax| nodebox.left_xmin > xmax)
}

/// Can any box below the traversal value avoid extending left of the query?
pub fn over_right_4d(nodebox: &TboxNode, query: &TBox) -> bool {
    query.xmin().is_some_and(|xmin| nodebox.left_xmin >= xmin)
}

/// Can any box below the traversal value be strictly before the query?
pub fn before_4d(nodebox: &TboxNode, query: &TBox) -> bool {
    query
        .tmin_micros()
        .is_some_and(|tmin| nodebox.right_tmax < tmin)
}

/// Can any box below the traversal value avoid ending after the query?
pub fn over_before_4d(nodebox: &TboxNode, query: &TBox) -> bool {
    query
        .tmax_micros()
        .is_some_and(|tmax| nodebox.right_tmax <= tmax)
}

/// Can any box below the traversal value be strictly after the query?
pub fn after_4d(nodebox: &TboxNode, query: &TBox) -> bool {
    query
        .tmax_micros()
        .is_some_and(|tmax| nodebox.left_tmin > tmax)
}

/// Can any box below the traversal value avoid starting before the query?
pub fn over_after_4d(nodebox: &TboxNode, query: &TBox) -> bool {
    query
        .tmin_micros()
        .is_some_and(|tmin| nodebox.left_tmin >= tmin)
}

/// Inner-node consistency for the space-partitioning trees.
pub fn inner_consistent_4d(nodebox: &TboxNode, query: &TBox, strategy: Strategy) -> bool {
    match strategy {
        Strategy::Overlaps | Strategy::ContainedBy | Strategy::Adjacent => {
            overlap_4d(nodebox, query)
        }
        Strategy::Contains | Strategy::Same => contain_4d(nodebox, query),
        Strategy::Left => left_4d(nodebox, query),
        Strategy::OverLeft => over_left_4d(nodebox, query),
        Strategy::Right => right_4d(nodebox, query),
        Strategy::OverRight => over_right_4d(nodebox, query),
        Strategy::Before => before_4d(nodebox, query),
        Strategy::OverBefore => over_before_4d(nodebox, query),
        Strategy::After => after_4d(nodebox, query),
        Strategy::OverAfter => over_after_4d(nodebox, query),
        // y and z strategies are undefined over value x time boxes
        _ => false,
    }
}

/// Lower bound on the value-dimension distance between the query and any
/// box below the traversal value; infinite when their time projections
/// cannot meet.
pub fn distance_tbox_nodebox(query: &TBox, nodebox: &TboxNode) -> f64 {
    if let (Some(tmin), Some(tmax)) = (query.tmin_micros(), query.tmax_micros()) {
        if tmin > nodebox.right_tmax || nodebox.left_tmin > tmax {
            return f64::INFINITY;
        }
    }
    match (query.xmin(), query.xmax()) {
        (Some(xmin), Some(xmax)) => {
            if xmax < nodebox.left_xmin {
                nodebox.left_xmin - xmax
            } else if xmin > nodebox.right_xmax {
                xmin - nodebox.right_xmax
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn tbox(s: &str) -> TBox {
        TBox::from_str(s).unwrap()
    }

    #[test]
    fn quadrant_example() {
        let centroid = tbox("TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])");
        let inbox = tbox("TBOXFLOAT XT([7, 9],[2001-01-07, 2001-01-09])");
        assert_eq!(quadrant_4d(&centroid, &inbox), 0b1111);
        let below = tbox("TBOXFLOAT XT([1, 2],[2001-01-01, 2001-01-02])");
        assert_eq!(quadrant_4d(&centroid, &below), 0b0000);
    }

    #[test]
    fn scenario_next_nodebox() {
        let centroid = tbox("TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])");
        let next = quadtree_next(&TboxNode::init(), &centroid, 0b1111);
        assert_eq!(next.left_xmin, 3.0);
        assert_eq!(next.left_xmax, f64::INFINITY);
        assert_eq!(next.right_xmin, 5.0);
        assert_eq!(next.right_xmax, f64::INFINITY);
        assert_eq!(
            next.left_tmin,
            centroid.tmin_micros().unwrap()
        );
        assert_eq!(
            next.right_tmin,
            centroid.tmax_micros().unwrap()
        );
    }

    #[test]
    fn quadrants_tile_the_parent() {
        let centroid = tbox("TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])");
        let parent = TboxNode::init();
        let samples = [
            tbox("TBOXFLOAT XT([1, 2],[2001-01-01, 2001-01-02])"),
            tbox("TBOXFLOAT XT([7, 9],[2001-01-07, 2001-01-09])"),
            tbox("TBOXFLOAT XT([1, 9],[2001-01-01, 2001-01-09])"),
            tbox("TBOXFLOAT XT([4, 4],[2001-01-04, 2001-01-04])"),
        ];
        for sample in &samples {
            let mut holders = 0;
            for quadrant in 0..16u8 {
                let next = quadtree_next(&parent, &centroid, quadrant);
                if next.contains_box(sample) {
                    holders += 1;
                }
            }
            // strictly off the centroid's bounds, the quadrant regions
            // partition the space
            assert_eq!(holders, 1, "sample must fall in exactly one quadrant");
            let chosen = quadtree_next(&parent, &centroid, quadrant_4d(&centroid, sample));
            assert!(chosen.contains_box(sample));
        }
        // a box sharing the centroid's bounds sits on region boundaries but
        // still lands in the region of its assigned quadrant
        let boundary = tbox("TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])");
        let chosen = quadtree_next(&parent, &centroid, quadrant_4d(&centroid, &boundary));
        assert!(chosen.contains_box(&boundary));
    }

    #[test]
    fn overlap_consistency_example() {
        let mut nodebox = TboxNode::init();
        nodebox.left_xmin = 3.0;
        nodebox.left_xmax = 7.0;
        nodebox.right_xmin = 5.0;
        nodebox.right_xmax = 9.0;
        let query = tbox("TBOXFLOAT X([2, 4])");
        assert!(overlap_4d(&nodebox, &query));
        let disjoint = tbox("TBOXFLOAT X([10, 12])");
        assert!(!overlap_4d(&nodebox, &disjoint));
        assert!(left_4d(&nodebox, &disjoint));
        assert!(over_left_4d(&nodebox, &disjoint));
    }

    #[test]
    fn distance_lower_bound() {
        let mut nodebox = TboxNode::init();
        nodebox.left_xmin = 3.0;
        nodebox.left_xmax = 7.0;
        nodebox.right_xmin = 5.0;
        nodebox.right_xmax = 9.0;
        nodebox.left_tmin = 0;
        nodebox.left_tmax = 0;
        nodebox.right_tmin = 10;
        nodebox.right_tmax = 10;
        let query = tbox("TBOXFLOAT X([10, 12])");
        assert_eq!(distance_tbox_nodebox(&query, &nodebox), 1.0);
        let overlapping = tbox("TBOXFLOAT X([4, 6])");
        assert_eq!(distance_tbox_nodebox(&overlapping, &nodebox), 0.0);
    }
}
