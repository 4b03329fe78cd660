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

//! Half-open integer intervals `[start, end)`.
//!
//! `ClosedOpenInterval<T>` is the geometric workhorse of the propagator: the
//! mandatory part of a rectangle in one dimension, the reach of an origin
//! domain, and every forbidden region produced by the sweeps are all
//! half-open intervals. An empty interval (`start == end`) is valid and never
//! intersects anything, which is exactly the semantics zero-extent rectangles
//! need.

use num_traits::PrimInt;
use std::cmp::{max, min};

/// A half-open interval `[start, end)` over a primitive integer type.
///
/// # Invariants
///
/// `start_inclusive <= end_exclusive` always holds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClosedOpenInterval<T>
where
    T: PrimInt,
{
    start_inclusive: T,
    end_exclusive: T,
}

impl<T> ClosedOpenInterval<T>
where
    T: PrimInt,
{
    /// Creates a new `ClosedOpenInterval`.
    ///
    /// # Panics
    ///
    /// Panics if `start_inclusive > end_exclusive`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use diffn_core::math::interval::ClosedOpenInterval;
    ///
    /// let iv = ClosedOpenInterval::new(2, 7);
    /// assert_eq!(iv.len(), 5);
    /// ```
    #[inline]
    pub fn new(start_inclusive: T, end_exclusive: T) -> Self {
        assert!(
            start_inclusive <= end_exclusive,
            "Invalid interval: start_inclusive must be less than or equal to end_exclusive"
        );
        Self {
            start_inclusive,
            end_exclusive,
        }
    }

    /// Creates a new `ClosedOpenInterval`, returning `None` when
    /// `start_inclusive > end_exclusive`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use diffn_core::math::interval::ClosedOpenInterval;
    ///
    /// assert!(ClosedOpenInterval::try_new(3, 3).is_some());
    /// assert!(ClosedOpenInterval::try_new(4, 3).is_none());
    /// ```
    #[inline]
    pub fn try_new(start_inclusive: T, end_exclusive: T) -> Option<Self> {
        if start_inclusive <= end_exclusive {
            Some(Self {
                start_inclusive,
                end_exclusive,
            })
        } else {
            None
        }
    }

    /// Returns the inclusive start.
    #[inline(always)]
    pub fn start(&self) -> T {
        self.start_inclusive
    }

    /// Returns the exclusive end.
    #[inline(always)]
    pub fn end(&self) -> T {
        self.end_exclusive
    }

    /// Returns the number of integer points in the interval, saturating at
    /// `T::max_value()`.
    #[inline(always)]
    pub fn len(&self) -> T {
        self.end_exclusive.saturating_sub(self.start_inclusive)
    }

    /// Returns `true` if the interval contains no points.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.start_inclusive == self.end_exclusive
    }

    /// Returns `true` if both intervals share at least one point.
    ///
    /// Touching intervals such as `[0, 5)` and `[5, 8)` do not intersect,
    /// and an empty interval intersects nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use diffn_core::math::interval::ClosedOpenInterval;
    ///
    /// let a = ClosedOpenInterval::new(0, 5);
    /// assert!(a.intersects(ClosedOpenInterval::new(4, 9)));
    /// assert!(!a.intersects(ClosedOpenInterval::new(5, 9)));
    /// assert!(!a.intersects(ClosedOpenInterval::new(2, 2)));
    /// ```
    #[inline]
    pub fn intersects(&self, other: Self) -> bool {
        max(self.start_inclusive, other.start_inclusive)
            < min(self.end_exclusive, other.end_exclusive)
    }

    /// Returns `true` if `value` lies in `[start, end)`.
    #[inline]
    pub fn contains_point(&self, value: T) -> bool {
        self.start_inclusive <= value && value < self.end_exclusive
    }

    /// Returns the common part of both intervals, or `None` if they do not
    /// intersect.
    #[inline]
    pub fn intersection(&self, other: Self) -> Option<Self> {
        let start = max(self.start_inclusive, other.start_inclusive);
        let end = min(self.end_exclusive, other.end_exclusive);
        if start < end {
            Some(Self {
                start_inclusive: start,
                end_exclusive: end,
            })
        } else {
            None
        }
    }

    /// Returns the number of points shared with `other` (zero if disjoint).
    #[inline]
    pub fn overlap_len(&self, other: Self) -> T {
        self.intersection(other)
            .map_or_else(T::zero, |iv| iv.len())
    }

    /// Returns the hull of two intervals that intersect or touch, `None`
    /// otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use diffn_core::math::interval::ClosedOpenInterval;
    ///
    /// let a = ClosedOpenInterval::new(0, 5);
    /// assert_eq!(a.union(ClosedOpenInterval::new(5, 8)), Some(ClosedOpenInterval::new(0, 8)));
    /// assert_eq!(a.union(ClosedOpenInterval::new(6, 8)), None);
    /// ```
    #[inline]
    pub fn union(&self, other: Self) -> Option<Self> {
        if max(self.start_inclusive, other.start_inclusive)
            <= min(self.end_exclusive, other.end_exclusive)
        {
            Some(Self {
                start_inclusive: min(self.start_inclusive, other.start_inclusive),
                end_exclusive: max(self.end_exclusive, other.end_exclusive),
            })
        } else {
            None
        }
    }
}

/// Sorts `intervals` by start and coalesces overlapping or touching
/// neighbors in place. Empty intervals are dropped.
///
/// The output is sorted and pairwise disjoint (non-touching).
///
/// # Examples
///
/// ```rust
/// # use diffn_core::math::interval::{merge_in_place, ClosedOpenInterval};
///
/// let mut ivs = vec![
///     ClosedOpenInterval::new(6, 9),
///     ClosedOpenInterval::new(0, 3),
///     ClosedOpenInterval::new(2, 6),
///     ClosedOpenInterval::new(12, 12),
/// ];
/// merge_in_place(&mut ivs);
/// assert_eq!(ivs, vec![ClosedOpenInterval::new(0, 9)]);
/// ```
pub fn merge_in_place<T>(intervals: &mut Vec<ClosedOpenInterval<T>>)
where
    T: PrimInt,
{
    intervals.retain(|iv| !iv.is_empty());
    if intervals.len() < 2 {
        return;
    }

    intervals.sort_unstable_by_key(|iv| iv.start());

    let mut write_index = 0;
    for read_index in 1..intervals.len() {
        let current = intervals[write_index];
        let next = intervals[read_index];

        if let Some(merged) = current.union(next) {
            intervals[write_index] = merged;
        } else {
            write_index += 1;
            intervals[write_index] = next;
        }
    }
    intervals.truncate(write_index + 1);
}

impl<T> Default for ClosedOpenInterval<T>
where
    T: PrimInt,
{
    fn default() -> Self {
        Self {
            start_inclusive: T::zero(),
            end_exclusive: T::zero(),
        }
    }
}

impl<T> std::fmt::Debug for ClosedOpenInterval<T>
where
    T: PrimInt + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}, {:?})", self.start_inclusive, self.end_exclusive)
    }
}

impl<T> std::fmt::Display for ClosedOpenInterval<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start_inclusive, self.end_exclusive)
    }
}

impl<T> From<std::ops::Range<T>> for ClosedOpenInterval<T>
where
    T: PrimInt,
{
    fn from(range: std::ops::Range<T>) -> Self {
        Self::new(range.start, range.end)
    }
}
