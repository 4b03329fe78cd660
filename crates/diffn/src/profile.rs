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

//! Cumulative profiles of mandatory parts.
//!
//! Projecting a set of neighbors onto a sweep dimension `i` and summing,
//! at every point, how much of a second dimension `j` they are forced to
//! occupy gives a step function. Wherever that step function leaves less
//! room in `j` than the rectangle being narrowed needs, the rectangle cannot
//! cover that point of `i`.

use crate::{num::Coordinate, rectangle::Rectangle};
use diffn_core::math::interval::{ClosedOpenInterval, merge_in_place};
use diffn_store::store::Store;

/// A maximal stretch of the sweep dimension with constant height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileSegment<T>
where
    T: Coordinate,
{
    pub interval: ClosedOpenInterval<T>,
    pub height: T,
}

/// A step function over the sweep dimension, stored as its non-zero
/// segments in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile<T>
where
    T: Coordinate,
{
    segments: Vec<ProfileSegment<T>>,
}

impl<T> Profile<T>
where
    T: Coordinate,
{
    /// Builds the profile of `(interval, height)` contributions by an event
    /// sweep. Adjacent stretches of equal height are merged.
    pub fn build<I>(contributions: I) -> Self
    where
        I: IntoIterator<Item = (ClosedOpenInterval<T>, T)>,
    {
        let mut events: Vec<(T, T)> = Vec::new();
        for (interval, height) in contributions {
            if interval.is_empty() || height == T::zero() {
                continue;
            }
            events.push((interval.start(), height));
            events.push((interval.end(), -height));
        }
        events.sort_unstable_by_key(|&(at, _)| at);

        let mut segments: Vec<ProfileSegment<T>> = Vec::new();
        let mut height = T::zero();
        let mut index = 0;
        while index < events.len() {
            let at = events[index].0;
            while index < events.len() && events[index].0 == at {
                height = height + events[index].1;
                index += 1;
            }
            let Some(&(next, _)) = events.get(index) else {
                break;
            };
            if height == T::zero() {
                continue;
            }

            match segments.last_mut() {
                Some(last) if last.interval.end() == at && last.height == height => {
                    last.interval = ClosedOpenInterval::new(last.interval.start(), next);
                }
                _ => segments.push(ProfileSegment {
                    interval: ClosedOpenInterval::new(at, next),
                    height,
                }),
            }
        }

        debug_assert!(height == T::zero(), "profile events must cancel out");
        Self { segments }
    }

    /// Returns the merged stretches where the height exceeds `limit`.
    pub fn above(&self, limit: T) -> Vec<ClosedOpenInterval<T>> {
        let mut regions: Vec<ClosedOpenInterval<T>> = self
            .segments
            .iter()
            .filter(|s| s.height > limit)
            .map(|s| s.interval)
            .collect();
        merge_in_place(&mut regions);
        regions
    }
}

/// Returns the points of dimension `i` that rectangle `r` cannot cover
/// because the profile of `candidates` over `i`, measured in `j`, leaves
/// less than `r`'s minimal length in `j` inside `r`'s reach in `j`.
///
/// A candidate contributes on its mandatory interval in `i`, clipped to
/// `r`'s possible extent in `i`, with the overlap of its mandatory interval
/// in `j` and `r`'s reach in `j`. In more than two dimensions a candidate
/// contributes only if, in every remaining dimension, its mandatory interval
/// contains `r`'s latest origin and `r` is certain to cover that point too.
pub fn forbidden_regions<T>(
    rectangles: &[Rectangle],
    r: usize,
    i: usize,
    j: usize,
    candidates: &[usize],
    store: &Store<T>,
) -> Vec<ClosedOpenInterval<T>>
where
    T: Coordinate,
{
    debug_assert_ne!(i, j, "called `forbidden_regions` with identical dimensions");

    let rect = &rectangles[r];
    let length_i = rect.min_length(store, i);
    let origin_i = rect.origin(i);
    let Some(sweep) =
        ClosedOpenInterval::try_new(store.min(origin_i), store.max(origin_i).saturating_add(length_i))
    else {
        return Vec::new();
    };
    let reach_j = rect.reach(store, j);
    let limit = reach_j.len().saturating_sub(rect.min_length(store, j));

    let shared_points: Option<Vec<(usize, T)>> = (0..rect.dim())
        .filter(|&k| k != i && k != j)
        .map(|k| {
            let point = store.max(rect.origin(k));
            rect.mandatory(store, k)
                .filter(|part| part.contains_point(point))
                .map(|_| (k, point))
        })
        .collect();
    let Some(shared_points) = shared_points else {
        return Vec::new();
    };

    let contributions = candidates.iter().filter_map(|&s| {
        let other = &rectangles[s];
        let along = other.mandatory(store, i)?.intersection(sweep)?;
        let height = other.mandatory(store, j)?.overlap_len(reach_j);
        let shares_rest = shared_points.iter().all(|&(k, point)| {
            other
                .mandatory(store, k)
                .is_some_and(|part| part.contains_point(point))
        });
        (height > T::zero() && shares_rest).then_some((along, height))
    });

    Profile::build(contributions).above(limit)
}
