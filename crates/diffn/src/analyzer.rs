// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Per-rectangle neighbor analysis.
//!
//! For one rectangle `r` and its cached neighbor candidates, a single scan
//! collects everything narrowing needs and proves infeasibility early when
//! one of three volume bounds is violated:
//!
//! - *common area*: the volume every neighbor is forced to occupy inside
//!   `r`'s reach, plus `r`'s own minimal area, must fit into `r`'s reach.
//! - *area*: the minimal areas of `r` and all participating neighbors must
//!   fit into the envelope spanned by their placements.
//! - *capacity*: that envelope must hold at least as many grid cells of the
//!   smallest minimal lengths as there are participating rectangles.
//!
//! Neighbors with a zero minimal length in any dimension take no part in the
//! area and capacity bounds.

use crate::{
    num::{Coordinate, saturating_product},
    rectangle::Rectangle,
};
use diffn_core::math::interval::ClosedOpenInterval;
use diffn_store::{error::Inconsistency, store::Store};
use fixedbitset::FixedBitSet;
use log::trace;
use num_traits::NumCast;
use smallvec::{SmallVec, smallvec};
use std::cmp::{max, min};

/// The volume bound a failed analysis violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Infeasibility {
    CommonArea,
    Area,
    Capacity,
}

impl Infeasibility {
    /// Returns a short, static description of the violated bound.
    #[inline]
    pub fn reason(self) -> &'static str {
        match self {
            Self::CommonArea => "forced neighbor volume exceeds the rectangle's reach",
            Self::Area => "minimal areas exceed the available envelope",
            Self::Capacity => "envelope cannot hold every rectangle at minimal size",
        }
    }
}

impl std::fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

impl From<Infeasibility> for Inconsistency {
    #[inline]
    fn from(kind: Infeasibility) -> Self {
        Inconsistency::Proof(kind.reason())
    }
}

/// Per-dimension boxes of one rectangle.
pub type Boxes<T> = SmallVec<[ClosedOpenInterval<T>; 2]>;

/// The space a neighbor covers in every placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedSpace<T>
where
    T: Coordinate,
{
    /// The neighbor's position in the constraint's rectangle list.
    pub neighbor: usize,
    /// The neighbor's mandatory part per dimension.
    pub boxes: Boxes<T>,
}

/// The result of analyzing one rectangle against its neighbor candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis<T>
where
    T: Coordinate,
{
    /// Candidates whose reach still intersects the rectangle's reach in every
    /// dimension, in cache order.
    pub overlapping: Vec<usize>,
    /// Overlapping neighbors with a well-formed mandatory part in every
    /// dimension.
    pub used: Vec<UsedSpace<T>>,
    /// Overlapping neighbors with positive minimal lengths and at least one
    /// well-formed mandatory interval.
    pub profile_candidates: Vec<usize>,
    /// `true` if a neighbor in `used` or `profile_candidates` has a variable
    /// in the changed set.
    pub neighbor_changed: bool,
}

impl<T> Analysis<T>
where
    T: Coordinate,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            overlapping: Vec::with_capacity(capacity),
            used: Vec::new(),
            profile_candidates: Vec::new(),
            neighbor_changed: false,
        }
    }
}

/// Returns the volume `other` is forced to occupy in dimension `i` of the
/// window `[reach_start, reach_end)`, measured against the window's latest
/// stop `latest_stop` where the neighbor may stick out on the right.
///
/// Each case takes the smaller of the overlaps at the neighbor's earliest
/// and latest placement, which bounds every placement in between.
#[inline]
fn forced_extent<T>(
    other_start: T,
    other_stop: T,
    other_length: T,
    reach_start: T,
    reach_end: T,
    latest_stop: T,
) -> T
where
    T: Coordinate,
{
    let zero = T::zero();
    let earliest_stop = other_start.saturating_add(other_length);
    let late_overlap = other_length.saturating_sub(other_stop.saturating_sub(latest_stop));

    if other_start <= reach_start {
        if other_stop <= reach_end {
            return max(zero, earliest_stop.saturating_sub(reach_start));
        }
        let span = latest_stop.saturating_sub(reach_start);
        let early = min(earliest_stop.saturating_sub(reach_start), span);
        let late = min(late_overlap, span);
        if early < late {
            max(early, zero)
        } else if late > zero {
            min(late, other_length)
        } else {
            zero
        }
    } else if other_stop > reach_end {
        if late_overlap > zero {
            min(late_overlap, other_length)
        } else {
            zero
        }
    } else {
        other_length
    }
}

/// Analyzes rectangle `r` against `neighbors`.
///
/// `r` itself is skipped if it appears among `neighbors`.
///
/// # Errors
///
/// Returns the violated bound as soon as one is proven.
pub fn analyze<T>(
    rectangles: &[Rectangle],
    r: usize,
    neighbors: &[usize],
    store: &Store<T>,
    changed: &FixedBitSet,
) -> Result<Analysis<T>, Infeasibility>
where
    T: Coordinate,
{
    let rect = &rectangles[r];
    let dim = rect.dim();
    let zero = T::zero();

    let reach: SmallVec<[ClosedOpenInterval<T>; 4]> =
        (0..dim).map(|i| rect.reach(store, i)).collect();
    let latest_stop: SmallVec<[T; 4]> = (0..dim)
        .map(|i| store.max(rect.origin(i)).saturating_add(rect.min_length(store, i)))
        .collect();
    let reach_volume = saturating_product(reach.iter().map(|iv| iv.len()));
    let own_area = rect.min_area(store);

    let mut start_min: SmallVec<[T; 4]> = smallvec![T::max_value(); dim];
    let mut stop_max: SmallVec<[T; 4]> = smallvec![T::min_value(); dim];
    let mut min_length: SmallVec<[T; 4]> =
        (0..dim).map(|i| rect.min_length(store, i)).collect();

    let mut area = zero;
    let mut common_area = zero;
    let mut participants = 0usize;
    let mut analysis = Analysis::with_capacity(neighbors.len());

    for &s in neighbors {
        if s == r {
            continue;
        }
        let other = &rectangles[s];

        let overlaps = (0..dim).all(|i| reach[i].intersects(other.reach(store, i)));
        if overlaps {
            analysis.overlapping.push(s);
            let other_changed = other.touches(changed);

            let mut boxes = Boxes::with_capacity(dim);
            let mut fully_used = true;
            for i in 0..dim {
                match other.mandatory(store, i) {
                    Some(part) => boxes.push(part),
                    None => fully_used = false,
                }
            }
            let any_used = !boxes.is_empty();

            if fully_used {
                analysis.used.push(UsedSpace { neighbor: s, boxes });
                analysis.neighbor_changed |= other_changed;
            }

            if !other.has_zero_extent(store) {
                if any_used {
                    analysis.profile_candidates.push(s);
                    analysis.neighbor_changed |= other_changed;
                }

                participants += 1;
                for i in 0..dim {
                    let length = other.min_length(store, i);
                    start_min[i] = min(start_min[i], store.min(other.origin(i)));
                    stop_max[i] = max(stop_max[i], store.max(other.origin(i)).saturating_add(length));
                    min_length[i] = min(min_length[i], length);
                }
                area = area.saturating_add(other.min_area(store));
            }

            let forced = saturating_product((0..dim).map(|i| {
                let length = other.min_length(store, i).max(zero);
                forced_extent(
                    store.min(other.origin(i)),
                    store.max(other.origin(i)).saturating_add(length),
                    length,
                    reach[i].start(),
                    reach[i].end(),
                    latest_stop[i],
                )
            }));
            common_area = common_area.saturating_add(forced);
        }

        if common_area.saturating_add(own_area) > reach_volume {
            trace!(
                "rectangle {} fails common area: {} + {} > {}",
                r, common_area, own_area, reach_volume
            );
            return Err(Infeasibility::CommonArea);
        }
    }

    if participants > 0 {
        area = area.saturating_add(own_area);
        for i in 0..dim {
            start_min[i] = min(start_min[i], reach[i].start());
            stop_max[i] = max(stop_max[i], latest_stop[i]);
        }

        let extent = |i: usize| stop_max[i].saturating_sub(start_min[i]);
        let available = saturating_product((0..dim).map(extent));
        if available < area {
            trace!("rectangle {} fails area: {} > {}", r, area, available);
            return Err(Infeasibility::Area);
        }

        if min_length.iter().all(|&l| l > zero) {
            let capacity =
                saturating_product((0..dim).map(|i| extent(i) / min_length[i]));
            let needed = <T as NumCast>::from(participants + 1).unwrap_or_else(T::max_value);
            if capacity < needed {
                trace!(
                    "rectangle {} fails capacity: {} cells for {} rectangles",
                    r, capacity, needed
                );
                return Err(Infeasibility::Capacity);
            }
        }
    }

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    type Dim = ((i64, i64), (i64, i64));

    /// Builds rectangles from `(origin_min, origin_max), (length_min, length_max)`
    /// per dimension.
    fn build(store: &mut Store<i64>, specs: &[&[Dim]]) -> Vec<Rectangle> {
        specs
            .iter()
            .map(|dims| {
                let origins: Vec<_> = dims.iter().map(|&((a, b), _)| store.new_var(a, b)).collect();
                let lengths: Vec<_> = dims.iter().map(|&(_, (a, b))| store.new_var(a, b)).collect();
                Rectangle::new(origins, lengths)
            })
            .collect()
    }

    fn nothing_changed(store: &Store<i64>) -> FixedBitSet {
        FixedBitSet::with_capacity(store.num_vars())
    }

    #[test]
    fn test_common_area_catches_overcrowded_square() {
        let mut store = Store::new();
        let square: &[Dim] = &[((0, 2), (3, 3)), ((0, 2), (3, 3))];
        let rects = build(&mut store, &[square, square, square, square]);
        let changed = nothing_changed(&store);

        let result = analyze(&rects, 0, &[1, 2, 3], &store, &changed);
        assert_eq!(result, Err(Infeasibility::CommonArea));
    }

    #[test]
    fn test_capacity_catches_two_squares_that_cannot_fit() {
        let mut store = Store::new();
        let square: &[Dim] = &[((0, 2), (3, 3)), ((0, 2), (3, 3))];
        let rects = build(&mut store, &[square, square]);
        let changed = nothing_changed(&store);

        assert_eq!(
            analyze(&rects, 0, &[1], &store, &changed),
            Err(Infeasibility::Capacity)
        );
    }

    #[test]
    fn test_area_catches_crowded_envelope() {
        let mut store = Store::new();
        let stretchy: &[Dim] = &[((0, 0), (1, 6))];
        let block: &[Dim] = &[((0, 1), (2, 2))];
        let rects = build(&mut store, &[stretchy, block, block]);
        let changed = nothing_changed(&store);

        assert_eq!(
            analyze(&rects, 0, &[1, 2], &store, &changed),
            Err(Infeasibility::Area)
        );
    }

    #[test]
    fn test_fixed_overlap_fails() {
        let mut store = Store::new();
        let a: &[Dim] = &[((0, 0), (2, 2)), ((0, 0), (2, 2))];
        let b: &[Dim] = &[((1, 1), (2, 2)), ((1, 1), (2, 2))];
        let rects = build(&mut store, &[a, b]);
        let changed = nothing_changed(&store);

        assert_eq!(
            analyze(&rects, 0, &[1], &store, &changed),
            Err(Infeasibility::CommonArea)
        );
    }

    #[test]
    fn test_collects_neighbor_classes() {
        let mut store = Store::new();
        let r: &[Dim] = &[((0, 10), (3, 3)), ((0, 0), (3, 3))];
        let fixed: &[Dim] = &[((0, 0), (4, 4)), ((0, 0), (4, 4))];
        let loose: &[Dim] = &[((0, 10), (2, 2)), ((0, 0), (2, 2))];
        let far: &[Dim] = &[((0, 10), (2, 2)), ((20, 20), (2, 2))];
        let rects = build(&mut store, &[r, fixed, loose, far]);
        let changed = nothing_changed(&store);

        let analysis = analyze(&rects, 0, &[0, 1, 2, 3], &store, &changed).unwrap();
        assert_eq!(analysis.overlapping, vec![1, 2]);
        assert_eq!(analysis.used.len(), 1);
        assert_eq!(analysis.used[0].neighbor, 1);
        assert_eq!(
            analysis.used[0].boxes.as_slice(),
            &[ClosedOpenInterval::new(0, 4), ClosedOpenInterval::new(0, 4)]
        );
        assert_eq!(analysis.profile_candidates, vec![1, 2]);
        assert!(!analysis.neighbor_changed);
    }

    #[test]
    fn test_neighbor_change_is_reported_for_relevant_neighbors_only() {
        let mut store = Store::new();
        let r: &[Dim] = &[((0, 10), (3, 3)), ((0, 0), (3, 3))];
        let fixed: &[Dim] = &[((0, 0), (4, 4)), ((0, 0), (4, 4))];
        let flat: &[Dim] = &[((0, 10), (0, 2)), ((0, 0), (2, 2))];
        let rects = build(&mut store, &[r, fixed, flat]);

        let mut changed = nothing_changed(&store);
        changed.insert(rects[2].origin(0).get());
        let analysis = analyze(&rects, 0, &[1, 2], &store, &changed).unwrap();
        assert_eq!(analysis.overlapping, vec![1, 2]);
        assert_eq!(analysis.profile_candidates, vec![1]);
        assert!(!analysis.neighbor_changed);

        changed.insert(rects[1].length(1).get());
        let analysis = analyze(&rects, 0, &[1, 2], &store, &changed).unwrap();
        assert!(analysis.neighbor_changed);
    }

    #[test]
    fn test_zero_extent_neighbors_skip_volume_bounds() {
        let mut store = Store::new();
        let square: &[Dim] = &[((0, 2), (3, 3)), ((0, 2), (3, 3))];
        let flat: &[Dim] = &[((0, 2), (0, 3)), ((0, 2), (3, 3))];
        let rects = build(&mut store, &[square, flat, flat, flat]);
        let changed = nothing_changed(&store);

        let analysis = analyze(&rects, 0, &[1, 2, 3], &store, &changed).unwrap();
        assert_eq!(analysis.overlapping, vec![1, 2, 3]);
        assert!(analysis.profile_candidates.is_empty());
    }

    #[test]
    fn test_forced_extent_cases() {
        // Neighbor starts left and stays inside.
        assert_eq!(forced_extent(0i64, 4, 3, 0, 10, 5), 3);
        assert_eq!(forced_extent(-5i64, 4, 3, 0, 10, 5), 0);
        // Neighbor starts left and may stick out right.
        assert_eq!(forced_extent(0i64, 12, 3, 0, 10, 5), 0);
        assert_eq!(forced_extent(0i64, 6, 4, 0, 5, 4), 2);
        // Neighbor starts right and may stick out right.
        assert_eq!(forced_extent(2i64, 6, 4, 0, 5, 4), 2);
        assert_eq!(forced_extent(2i64, 12, 4, 0, 5, 4), 0);
        // Neighbor is inside.
        assert_eq!(forced_extent(2i64, 5, 3, 0, 10, 5), 3);
    }

    #[test]
    fn test_infeasibility_converts_to_proof() {
        let e: Inconsistency = Infeasibility::Capacity.into();
        assert_eq!(e, Inconsistency::Proof(Infeasibility::Capacity.reason()));
    }
}
