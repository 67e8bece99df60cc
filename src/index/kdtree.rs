//! K-d tree partitioning of temporal boxes: one of the four coordinates
//! `(xmin, xmax, tmin, tmax)` splits at each level.

use std::cmp::Ordering;

use super::quadtree::TboxNode;
use crate::boxes::TBox;

/// Compare the query against the centroid on the coordinate this tree
/// level splits on.
pub fn level_cmp(centroid: &TBox, query: &TBox, level: usize) -> Ordering {
    let cmp_f64 = |a: Option<f64>, b: Option<f64>| -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => Ordering::Equal,
        }
    };
    let cmp_i64 = |a: Option<i64>, b: Option<i64>| -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => Ordering::Equal,
        }
    };
    match level % 4 {
        0 => cmp_f64(query.xmin(), centroid.xmin()),
        1 => cmp_f64(query.xmax(), centroid.xmax()),
        2 => cmp_i64(query.tmin_micros(), centroid.tmin_micros()),
        _ => cmp_i64(query.tmax_micros(), centroid.tmax_micros()),
    }
}

/// The traversal value of one half: only the bound the level splits on
/// changes, the `node` flag choosing the low (0) or high (1) side.
pub fn kdtree_next(
    nodebox: &TboxNode,
    centroid: &TBox,
    node: u8,
    level: usize,
) -> TboxNode {
    let mut next = *nodebox;
    match level % 4 {
        0 => {
            let bound = centroid.xmin().expect("centroid has a value dimension");
            if node == 0 {
                next.left_xmax = bound;
            } else {
                next.left_xmin = bound;
            }
        }
        1 => {
            let bound = centroid.xmax().expect("centroid has a value dimension");
            if node == 0 {
                next.right_xmax = bound;
            } else {
                next.right_xmin = bound;
            }
        }
        2 => {
            let bound = centroid
                .tmin_micros()
                .expect("centroid has a time dimension");
            if node == 0 {
                next.left_tmax = bound;
            } else {
                next.left_tmin = bound;
            }
        }
        _ => {
            let bound = centroid
                .tmax_micros()
                .expect("centroid has a time dimension");
            if node == 0 {
                next.right_tmax = bound;
            } else {
                next.right_tmin = bound;
            }
        }
    }
    next
}

/// Which halves a query must descend into: straddling the splitting bound
/// descends both.
pub fn kdtree_choose(centroid: &TBox, query: &TBox, level: usize) -> (bool, bool) {
    match level_cmp(centroid, query, level) {
        Ordering::Less => (true, false),
        Ordering::Greater => (false, true),
        Ordering::Equal => (true, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::quadtree::inner_consistent_4d;
    use crate::index::Strategy;
    use std::str::FromStr;

    fn tbox(s: &str) -> TBox {
        TBox::from_str(s).unwrap()
    }

    #[test]
    fn level_dispatches_on_coordinate() {
        let centroid = tbox("TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])");
        let query = tbox("TBOXFLOAT XT([1, 9],[2001-01-03, 2001-01-09])");
        assert_eq!(level_cmp(&centroid, &query, 0), Ordering::Less);
        assert_eq!(level_cmp(&centroid, &query, 1), Ordering::Greater);
        assert_eq!(level_cmp(&centroid, &query, 2), Ordering::Equal);
        assert_eq!(level_cmp(&centroid, &query, 3), Ordering::Greater);
        // level wraps modulo four
        assert_eq!(level_cmp(&centroid, &query, 4), Ordering::Less);
    }

    #[test]
    fn next_touches_one_bound_per_level() {
        let centroid = tbox("TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])");
        let parent = TboxNode::init();
        let low = kdtree_next(&parent, &centroid, 0, 0);
        assert_eq!(low.left_xmax, 3.0);
        assert_eq!(low.left_xmin, f64::NEG_INFINITY);
        let high = kdtree_next(&parent, &centroid, 1, 0);
        assert_eq!(high.left_xmin, 3.0);
        let t_high = kdtree_next(&parent, &centroid, 1, 3);
        assert_eq!(t_high.right_tmin, centroid.tmax_micros().unwrap());
    }

    #[test]
    fn straddling_queries_descend_both_halves() {
        let centroid = tbox("TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])");
        let equal = tbox("TBOXFLOAT XT([3, 9],[2001-01-01, 2001-01-09])");
        assert_eq!(kdtree_choose(&centroid, &equal, 0), (true, true));
        let below = tbox("TBOXFLOAT XT([1, 2],[2001-01-01, 2001-01-02])");
        assert_eq!(kdtree_choose(&centroid, &below, 0), (true, false));
    }

    #[test]
    fn halves_stay_consistent_with_their_content() {
        let centroid = tbox("TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])");
        let parent = TboxNode::init();
        let low = kdtree_next(&parent, &centroid, 0, 0);
        let high = kdtree_next(&parent, &centroid, 1, 0);
        // a box with xmin below the split can only live in the low half
        let query = tbox("TBOXFLOAT XT([1, 2],[2001-01-01, 2001-01-09])");
        assert!(low.contains_box(&query));
        assert!(!high.contains_box(&query));
        assert!(inner_consistent_4d(&low, &query, Strategy::Overlaps));
    }
}
