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

//! Origin tightening from forbidden regions.
//!
//! Both reasoning modes reduce to the same question per dimension `i`: given
//! sorted, disjoint stretches of `i` the rectangle may not cover, how far do
//! its earliest and latest origins have to move so that its minimal extent
//! `[origin, origin + length.min)` avoids all of them.

use crate::{
    analyzer::{Analysis, UsedSpace},
    disjoint::ProfileMode,
    num::Coordinate,
    profile,
    rectangle::Rectangle,
};
use diffn_core::math::interval::{ClosedOpenInterval, merge_in_place};
use diffn_store::{error::Inconsistency, index::VarIndex, store::Store};
use log::trace;

/// Moves the bounds of `origin` past every region in `forbidden` that its
/// minimal extent would overlap at that bound.
///
/// `forbidden` must be sorted and pairwise disjoint, as produced by
/// `merge_in_place`.
///
/// Returns the number of bounds that moved.
///
/// # Errors
///
/// Returns `Inconsistency::EmptyDomain` if no origin avoids the regions.
pub fn tighten_origin<T>(
    store: &mut Store<T>,
    origin: VarIndex,
    length: T,
    forbidden: &[ClosedOpenInterval<T>],
) -> Result<u64, Inconsistency>
where
    T: Coordinate,
{
    if forbidden.is_empty() || length <= T::zero() {
        return Ok(0);
    }

    let min = store.min(origin);
    let max = store.max(origin);

    let mut lo = min;
    for region in forbidden {
        if region.end() <= lo {
            continue;
        }
        if region.start() < lo.saturating_add(length) {
            lo = region.end();
        } else {
            break;
        }
    }

    let mut hi = max;
    for region in forbidden.iter().rev() {
        if region.start() >= hi.saturating_add(length) {
            continue;
        }
        if region.end() > hi {
            hi = region.start().saturating_sub(length);
        } else {
            break;
        }
    }

    let moved = u64::from(lo > min) + u64::from(hi < max);
    if moved > 0 {
        trace!("tightening {} from {}..{} to {}..{}", origin, min, max, lo, hi);
        store.set_bounds(origin, lo, hi)?;
    }
    Ok(moved)
}

/// Returns the stretches of dimension `i` rectangle `r` cannot cover
/// because a neighbor's used space meets `r`'s mandatory part in every
/// other dimension.
pub fn used_space_regions<T>(
    rectangles: &[Rectangle],
    r: usize,
    i: usize,
    used: &[UsedSpace<T>],
    store: &Store<T>,
) -> Vec<ClosedOpenInterval<T>>
where
    T: Coordinate,
{
    let rect = &rectangles[r];
    let mut regions: Vec<ClosedOpenInterval<T>> = used
        .iter()
        .filter(|space| {
            (0..rect.dim()).filter(|&j| j != i).all(|j| {
                rect.mandatory(store, j)
                    .is_some_and(|part| part.intersects(space.boxes[j]))
            })
        })
        .map(|space| space.boxes[i])
        .collect();
    merge_in_place(&mut regions);
    regions
}

/// Tightens every origin of rectangle `r` against its analyzed neighbors.
///
/// Dimensions with a zero minimal length are left alone. Bounds are read
/// live, so later dimensions see what earlier ones tightened.
///
/// Returns the number of bounds that moved.
///
/// # Errors
///
/// Returns `Inconsistency::EmptyDomain` if an origin domain empties.
pub fn narrow_rectangle<T>(
    rectangles: &[Rectangle],
    r: usize,
    analysis: &Analysis<T>,
    mode: ProfileMode,
    store: &mut Store<T>,
) -> Result<u64, Inconsistency>
where
    T: Coordinate,
{
    let rect = &rectangles[r];
    let mut moved = 0;

    for i in 0..rect.dim() {
        let length = rect.min_length(store, i);
        if length <= T::zero() {
            continue;
        }

        let regions = used_space_regions(rectangles, r, i, &analysis.used, store);
        moved += tighten_origin(store, rect.origin(i), length, &regions)?;

        if mode == ProfileMode::Profile && !analysis.profile_candidates.is_empty() {
            for j in (0..rect.dim()).filter(|&j| j != i) {
                let regions = profile::forbidden_regions(
                    rectangles,
                    r,
                    i,
                    j,
                    &analysis.profile_candidates,
                    store,
                );
                moved += tighten_origin(store, rect.origin(i), length, &regions)?;
            }
        }
    }
    Ok(moved)
}
