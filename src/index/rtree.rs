//! R-tree style index support over temporal boxes: consistency
//! predicates, the union and penalty callbacks, and the double-sorting
//! node split.

use super::strategy::Strategy;
use crate::boxes::{STBox, TBox};

/// Consistency of a leaf entry against the query.
///
/// Boxes do not distinguish inclusive from exclusive bounds, so the
/// directional tests are generalized, e.g. `left` uses `xmax <= xmin`
/// instead of strict inequality.
pub fn leaf_consistent(key: &TBox, query: &TBox, strategy: Strategy) -> bool {
    match strategy {
        Strategy::Overlaps => key.overlaps(query),
        Strategy::Contains => key.contains(query),
        Strategy::ContainedBy => key.is_contained_in(query),
        Strategy::Same => key.same(query),
        Strategy::Adjacent => key.is_adjacent(query),
        Strategy::Left => key.is_left(query),
        Strategy::OverLeft => key.is_over_or_left(query),
        Strategy::Right => key.is_right(query),
        Strategy::OverRight => key.is_over_or_right(query),
        Strategy::Before => key.is_before(query),
        Strategy::OverBefore => key.is_over_or_before(query),
        Strategy::After => key.is_after(query),
        Strategy::OverAfter => key.is_over_or_after(query),
        // y and z strategies are undefined over value x time boxes
        _ => false,
    }
}

/// Consistency of an inner node against the query: whether any entry
/// below the key could satisfy the strategy.
pub fn inner_consistent(key: &TBox, query: &TBox, strategy: Strategy) -> bool {
    match strategy {
        Strategy::Overlaps | Strategy::ContainedBy => key.overlaps(query),
        Strategy::Contains | Strategy::Same => key.contains(query),
        Strategy::Adjacent => key.is_adjacent(query) || key.overlaps(query),
        Strategy::Left => !key.is_over_or_right(query),
        Strategy::OverLeft => !key.is_right(query),
        Strategy::Right => !key.is_over_or_left(query),
        Strategy::OverRight => !key.is_left(query),
        Strategy::Before => !key.is_over_or_after(query),
        Strategy::OverBefore => !key.is_after(query),
        Strategy::After => !key.is_over_or_before(query),
        Strategy::OverAfter => !key.is_before(query),
        // y and z strategies are undefined over value x time boxes
        _ => false,
    }
}

/// Consistency of a leaf entry against a spatiotemporal query.
pub fn stbox_leaf_consistent(key: &STBox, query: &STBox, strategy: Strategy) -> bool {
    match strategy {
        Strategy::Overlaps => key.overlaps(query),
        Strategy::Contains => key.contains(query),
        Strategy::ContainedBy => key.is_contained_in(query),
        Strategy::Same => key == query,
        Strategy::Adjacent => key.is_adjacent(query),
        Strategy::Left => key.is_left(query),
        Strategy::OverLeft => key.is_over_or_left(query),
        Strategy::Right => key.is_right(query),
        Strategy::OverRight => key.is_over_or_right(query),
        Strategy::Below => key.is_below(query),
        Strategy::OverBelow => key.is_over_or_below(query),
        Strategy::Above => key.is_above(query),
        Strategy::OverAbove => key.is_over_or_above(query),
        Strategy::Front => key.is_front(query),
        Strategy::OverFront => key.is_over_or_front(query),
        Strategy::Back => key.is_back(query),
        Strategy::OverBack => key.is_over_or_back(query),
        Strategy::Before => key.is_before(query),
        Strategy::OverBefore => key.is_over_or_before(query),
        Strategy::After => key.is_after(query),
        Strategy::OverAfter => key.is_over_or_after(query),
    }
}

/// Consistency of an inner node against a spatiotemporal query.
pub fn stbox_inner_consistent(key: &STBox, query: &STBox, strategy: Strategy) -> bool {
    match strategy {
        Strategy::Overlaps | Strategy::ContainedBy => key.overlaps(query),
        Strategy::Contains | Strategy::Same => key.contains(query),
        Strategy::Adjacent => key.is_adjacent(query) || key.overlaps(query),
        Strategy::Left => !key.is_over_or_right(query),
        Strategy::OverLeft => !key.is_right(query),
        Strategy::Right => !key.is_over_or_left(query),
        Strategy::OverRight => !key.is_left(query),
        Strategy::Below => !key.is_over_or_above(query),
        Strategy::OverBelow => !key.is_above(query),
        Strategy::Above => !key.is_over_or_below(query),
        Strategy::OverAbove => !key.is_below(query),
        Strategy::Front => !key.is_over_or_back(query),
        Strategy::OverFront => !key.is_back(query),
        Strategy::Back => !key.is_over_or_front(query),
        Strategy::OverBack => !key.is_front(query),
        Strategy::Before => !key.is_over_or_after(query),
        Strategy::OverBefore => !key.is_after(query),
        Strategy::After => !key.is_over_or_before(query),
        Strategy::OverAfter => !key.is_before(query),
    }
}

/// The minimal box enclosing all the entries.
pub fn union(entries: &[TBox]) -> Option<TBox> {
    let mut iter = entries.iter();
    let mut result = *iter.next()?;
    for entry in iter {
        result.adjust(entry);
    }
    Some(result)
}

/// Insertion penalty: the increase of the enclosing size.
pub fn penalty(original: &TBox, new: &TBox) -> f64 {
    original.penalty(new)
}

/// The outcome of a node split.
#[derive(Debug)]
pub struct SplitResult {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
    pub left_box: TBox,
    pub right_box: TBox,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Axis {
    Xmin,
    Xmax,
    Tmin,
    Tmax,
}

const AXES: [Axis; 4] = [Axis::Xmin, Axis::Xmax, Axis::Tmin, Axis::Tmax];

fn coordinate(entry: &TBox, axis: Axis) -> f64 {
    match axis {
        Axis::Xmin => entry.xmin().unwrap_or(f64::NEG_INFINITY),
        Axis::Xmax => entry.xmax().unwrap_or(f64::INFINITY),
        Axis::Tmin => entry.tmin_micros().map_or(f64::NEG_INFINITY, |t| t as f64),
        Axis::Tmax => entry.tmax_micros().map_or(f64::INFINITY, |t| t as f64),
    }
}

/// The axis projection of an entry: its interval along the value or the
/// time dimension of the split axis.
fn projection(entry: &TBox, axis: Axis) -> (f64, f64) {
    match axis {
        Axis::Xmin | Axis::Xmax => (
            coordinate(entry, Axis::Xmin),
            coordinate(entry, Axis::Xmax),
        ),
        Axis::Tmin | Axis::Tmax => (
            coordinate(entry, Axis::Tmin),
            coordinate(entry, Axis::Tmax),
        ),
    }
}

struct CandidateSplit {
    axis: Axis,
    position: usize,
    order: Vec<usize>,
    overlap: f64,
    dead_space: f64,
    imbalance: usize,
}

impl CandidateSplit {
    /// Primary criterion: overlap along the axis; then dead space, then
    /// balance of the group sizes.
    fn better_than(&self, other: &CandidateSplit) -> bool {
        if self.overlap != other.overlap {
            return self.overlap < other.overlap;
        }
        if self.dead_space != other.dead_space {
            return self.dead_space < other.dead_space;
        }
        self.imbalance < other.imbalance
    }
}

/// Double-sorting split: sort the entries along each splittable
/// coordinate, score every split position by group overlap along the
/// axis, and distribute the entries not affecting the chosen overlap by
/// penalty.
pub fn pick_split(entries: &[TBox]) -> Option<SplitResult> {
    if entries.len() < 2 {
        return None;
    }
    let mut best: Option<CandidateSplit> = None;
    for axis in AXES {
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.sort_by(|&a, &b| {
            coordinate(&entries[a], axis).total_cmp(&coordinate(&entries[b], axis))
        });
        for position in 1..entries.len() {
            let (left, right) = order.split_at(position);
            // group extents along the axis
            let left_upper = left
                .iter()
                .map(|&i| projection(&entries[i], axis).1)
                .fold(f64::NEG_INFINITY, f64::max);
            let left_lower = left
                .iter()
                .map(|&i| projection(&entries[i], axis).0)
                .fold(f64::INFINITY, f64::min);
            let right_lower = right
                .iter()
                .map(|&i| projection(&entries[i], axis).0)
                .fold(f64::INFINITY, f64::min);
            let right_upper = right
                .iter()
                .map(|&i| projection(&entries[i], axis).1)
                .fold(f64::NEG_INFINITY, f64::max);
            let overlap = (left_upper - right_lower).max(0.0);
            let extent = right_upper - left_lower;
            let dead_space = if extent.is_finite() {
                extent - (left_upper - left_lower) - (right_upper - right_lower) + overlap
            } else {
                0.0
            };
            let imbalance = entries.len().abs_diff(2 * position);
            let candidate = CandidateSplit {
                axis,
                position,
                order: order.clone(),
                overlap,
                dead_space: dead_space.abs(),
                imbalance,
            };
            if best.as_ref().is_none_or(|b| candidate.better_than(b)) {
                best = Some(candidate);
            }
        }
    }
    let best = best?;
    let (left_ids, right_ids) = best.order.split_at(best.position);
    let mut left: Vec<usize> = left_ids.to_vec();
    let mut right: Vec<usize> = right_ids.to_vec();

    // the overlap region along the chosen axis
    let left_upper = left
        .iter()
        .map(|&i| projection(&entries[i], best.axis).1)
        .fold(f64::NEG_INFINITY, f64::max);
    let right_lower = right
        .iter()
        .map(|&i| projection(&entries[i], best.axis).0)
        .fold(f64::INFINITY, f64::min);

    // common entries sit entirely inside the overlap region; move each to
    // the group it penalizes least
    let is_common = |i: usize| {
        let (lo, hi) = projection(&entries[i], best.axis);
        lo >= right_lower && hi <= left_upper
    };
    let common: Vec<usize> = left
        .iter()
        .chain(right.iter())
        .copied()
        .filter(|&i| is_common(i))
        .collect();
    left.retain(|&i| !is_common(i));
    right.retain(|&i| !is_common(i));
    if left.is_empty() || right.is_empty() {
        // every entry is common; fall back to the positional split
        left = left_ids.to_vec();
        right = right_ids.to_vec();
    } else {
        let mut left_box = union(&left.iter().map(|&i| entries[i]).collect::<Vec<_>>())
            .expect("left group is non-empty");
        let mut right_box = union(&right.iter().map(|&i| entries[i]).collect::<Vec<_>>())
            .expect("right group is non-empty");
        for i in common {
            let left_penalty = left_box.penalty(&entries[i]);
            let right_penalty = right_box.penalty(&entries[i]);
            let go_left = match left_penalty.partial_cmp(&right_penalty) {
                Some(std::cmp::Ordering::Less) => true,
                Some(std::cmp::Ordering::Greater) => false,
                _ => left.len() <= right.len(),
            };
            if go_left {
                left_box.adjust(&entries[i]);
                left.push(i);
            } else {
                right_box.adjust(&entries[i]);
                right.push(i);
            }
        }
    }
    left.sort_unstable();
    right.sort_unstable();
    let left_box = union(&left.iter().map(|&i| entries[i]).collect::<Vec<_>>())?;
    let right_box = union(&right.iter().map(|&i| entries[i]).collect::<Vec<_>>())?;
    log::debug!(
        "split {} entries into {} + {} (overlap {:.3})",
        entries.len(),
        left.len(),
        right.len(),
        best.overlap
    );
    Some(SplitResult {
        left,
        right,
        left_box,
        right_box,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn tbox(xlo: f64, xhi: f64, day_lo: u32, day_hi: u32) -> TBox {
        TBox::from_str(&format!(
            "TBOXFLOAT XT([{xlo}, {xhi}],[2020-01-{day_lo:02}, 2020-01-{day_hi:02}])"
        ))
        .unwrap()
    }

    #[test]
    fn leaf_and_inner_consistency() {
        let key = tbox(0.0, 2.0, 1, 2);
        let query = tbox(1.0, 3.0, 1, 2);
        assert!(leaf_consistent(&key, &query, Strategy::Overlaps));
        assert!(!leaf_consistent(&key, &query, Strategy::Contains));
        assert!(inner_consistent(&key, &query, Strategy::ContainedBy));
        let far = tbox(10.0, 12.0, 1, 2);
        assert!(leaf_consistent(&key, &far, Strategy::Left));
        assert!(!inner_consistent(&far, &key, Strategy::Left));
    }

    #[test]
    fn union_encloses_everything() {
        let boxes = vec![tbox(0.0, 1.0, 1, 2), tbox(5.0, 6.0, 3, 4)];
        let u = union(&boxes).unwrap();
        assert!(boxes.iter().all(|b| u.contains(b)));
    }

    #[test]
    fn split_separates_clusters() {
        let mut entries = Vec::new();
        for i in 0..5 {
            entries.push(tbox(i as f64, i as f64 + 0.5, 1, 2));
            entries.push(tbox(100.0 + i as f64, 100.5 + i as f64, 1, 2));
        }
        let split = pick_split(&entries).unwrap();
        assert_eq!(split.left.len() + split.right.len(), entries.len());
        // the two clusters end up in different groups
        assert!(!split.left_box.overlaps(&split.right_box));
    }

    #[test]
    fn split_prefers_zero_overlap_axis_regardless_of_order() {
        // value intervals all overlap; time intervals form two clean halves
        let mut entries = Vec::new();
        for i in 0..5u32 {
            entries.push(tbox(0.0, 10.0, 1 + i, 2 + i));
            entries.push(tbox(0.0, 10.0, 20 + i, 21 + i));
        }
        let forward = pick_split(&entries).unwrap();
        let mut reversed_entries = entries.clone();
        reversed_entries.reverse();
        let reversed = pick_split(&reversed_entries).unwrap();
        // the chosen axis separates time, producing disjoint periods
        assert!(forward.left_box.is_before(&forward.right_box));
        assert!(reversed.left_box.is_before(&reversed.right_box));
    }

    #[test]
    fn penalty_drives_common_entry_distribution() {
        // two separated clusters plus one small box inside the left one
        let mut entries = vec![
            tbox(0.0, 10.0, 1, 10),
            tbox(0.0, 10.0, 2, 9),
            tbox(100.0, 110.0, 1, 10),
            tbox(100.0, 110.0, 2, 9),
        ];
        entries.push(tbox(1.0, 2.0, 3, 4));
        let split = pick_split(&entries).unwrap();
        let small_goes_left = split.left.contains(&4);
        let left_has_cluster0 = split.left.contains(&0);
        assert_eq!(small_goes_left, left_has_cluster0);
    }
}
