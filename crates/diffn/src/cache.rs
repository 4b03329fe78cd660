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

//! Backtrackable overlap cache.
//!
//! Every rectangle owns one versioned snapshot slot in the store listing the
//! rectangles that may still overlap it. Slots only ever shrink within a
//! branch; backtracking the store restores them together with the domains
//! whose narrowing made them shrink.

use diffn_store::{index::SnapshotIndex, store::Store};
use num_traits::PrimInt;

/// One snapshot slot per rectangle, holding its overlap candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapCache {
    slots: Vec<SnapshotIndex>,
}

impl OverlapCache {
    /// Creates an empty cache. `allocate` must run before any lookup.
    #[inline]
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Allocates one slot per rectangle. Rectangle `r` starts out with every
    /// other rectangle as a candidate.
    pub fn allocate<T>(&mut self, store: &mut Store<T>, count: usize)
    where
        T: PrimInt,
    {
        self.slots = (0..count)
            .map(|r| {
                let others: Vec<usize> = (0..count).filter(|&s| s != r).collect();
                store.new_snapshot(others)
            })
            .collect();
    }

    /// Returns `true` once `allocate` has run.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Returns the current overlap candidates of rectangle `r`.
    #[inline]
    pub fn neighbors<'a, T>(&self, store: &'a Store<T>, r: usize) -> &'a [usize]
    where
        T: PrimInt,
    {
        store.snapshot(self.slots[r])
    }

    /// Replaces the candidates of rectangle `r`.
    ///
    /// The new candidates must be a subset of the current ones.
    pub fn replace<T>(&self, store: &mut Store<T>, r: usize, candidates: Vec<usize>)
    where
        T: PrimInt,
    {
        debug_assert!(
            candidates
                .iter()
                .all(|s| self.neighbors(store, r).contains(s)),
            "called `OverlapCache::replace` with a candidate outside the current set"
        );
        store.set_snapshot(self.slots[r], candidates);
    }
}
