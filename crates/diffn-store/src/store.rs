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

//! The backtrackable constraint store.
//!
//! `Store<T>` owns every variable domain and every versioned snapshot slot of
//! a problem. All mutation goes through it so that:
//! - each write is stamped with the decision level it happened at,
//! - the first write to a slot at a level is recorded on the trail,
//! - `backtrack` restores values and stamps in one sweep,
//! - variables whose domain changed are collected in a changed set that the
//!   propagation engine hands to constraints.
//!
//! Snapshot slots hold `Rc<[usize]>` values. Replacing a slot value is a
//! pointer swap; the previous value lives on in the trail until the level is
//! left, so readers never observe partially restored data.

use crate::{
    domain::IntervalDomain,
    error::Inconsistency,
    index::{SnapshotIndex, VarIndex},
    trail::{Trail, TrailEntry},
};
use fixedbitset::FixedBitSet;
use num_traits::PrimInt;
use std::rc::Rc;

/// Variable domains, snapshot slots and the trail that restores them.
#[derive(Debug, Clone)]
pub struct Store<T> {
    domains: Vec<IntervalDomain<T>>,
    domain_stamps: Vec<usize>,
    snapshots: Vec<Rc<[usize]>>,
    snapshot_stamps: Vec<usize>,
    trail: Trail<T>,
    changed: FixedBitSet,
}

impl<T> Default for Store<T>
where
    T: PrimInt,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Store<T>
where
    T: PrimInt,
{
    /// Creates an empty store at decision level 0.
    #[inline]
    pub fn new() -> Self {
        Self {
            domains: Vec::new(),
            domain_stamps: Vec::new(),
            snapshots: Vec::new(),
            snapshot_stamps: Vec::new(),
            trail: Trail::new(),
            changed: FixedBitSet::new(),
        }
    }

    /// Creates a variable with domain `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn new_var(&mut self, min: T, max: T) -> VarIndex {
        let index = VarIndex::new(self.domains.len());
        self.domains.push(IntervalDomain::new(min, max));
        self.domain_stamps.push(self.level());
        self.changed.grow(self.domains.len());
        index
    }

    /// Creates a variable fixed to `value`.
    #[inline]
    pub fn new_fixed(&mut self, value: T) -> VarIndex {
        self.new_var(value, value)
    }

    /// Returns the number of variables in the store.
    #[inline]
    pub fn num_vars(&self) -> usize {
        self.domains.len()
    }

    /// Returns the current decision level.
    #[inline]
    pub fn level(&self) -> usize {
        self.trail.depth()
    }

    /// Returns the domain of `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var` is out of bounds.
    #[inline]
    pub fn domain(&self, var: VarIndex) -> IntervalDomain<T> {
        self.domains[var.get()]
    }

    #[inline]
    pub fn min(&self, var: VarIndex) -> T {
        self.domains[var.get()].min()
    }

    #[inline]
    pub fn max(&self, var: VarIndex) -> T {
        self.domains[var.get()].max()
    }

    #[inline]
    pub fn is_singleton(&self, var: VarIndex) -> bool {
        self.domains[var.get()].is_singleton()
    }

    /// Returns the value of `var` if its domain is a singleton.
    #[inline]
    pub fn value(&self, var: VarIndex) -> Option<T> {
        let d = self.domains[var.get()];
        d.is_singleton().then(|| d.min())
    }

    /// Returns the decision level at which `var` was last narrowed.
    #[inline]
    pub fn stamp(&self, var: VarIndex) -> usize {
        self.domain_stamps[var.get()]
    }

    /// Raises the lower bound of `var` to `value`.
    ///
    /// Returns `Ok(true)` if the domain changed, `Ok(false)` if `value` was
    /// already implied.
    ///
    /// # Errors
    ///
    /// Returns `Inconsistency::EmptyDomain` if `value` exceeds the current
    /// upper bound. The domain is left untouched in that case.
    #[inline]
    pub fn set_min(&mut self, var: VarIndex, value: T) -> Result<bool, Inconsistency> {
        let max = self.max(var);
        self.set_bounds(var, value, max)
    }

    /// Lowers the upper bound of `var` to `value`.
    ///
    /// # Errors
    ///
    /// Returns `Inconsistency::EmptyDomain` if `value` is below the current
    /// lower bound.
    #[inline]
    pub fn set_max(&mut self, var: VarIndex, value: T) -> Result<bool, Inconsistency> {
        let min = self.min(var);
        self.set_bounds(var, min, value)
    }

    /// Fixes `var` to `value`.
    ///
    /// # Errors
    ///
    /// Returns `Inconsistency::EmptyDomain` if `value` is outside the domain.
    #[inline]
    pub fn fix(&mut self, var: VarIndex, value: T) -> Result<bool, Inconsistency> {
        self.set_bounds(var, value, value)
    }

    /// Intersects the domain of `var` with `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns `Inconsistency::EmptyDomain` if the intersection is empty.
    pub fn set_bounds(&mut self, var: VarIndex, min: T, max: T) -> Result<bool, Inconsistency> {
        let index = var.get();
        let current = self.domains[index];
        let narrowed = current
            .restrict(min, max)
            .ok_or(Inconsistency::EmptyDomain(var))?;
        if narrowed == current {
            return Ok(false);
        }

        let level = self.level();
        let old_stamp = self.domain_stamps[index];
        if old_stamp < level {
            self.trail.record(TrailEntry::Domain {
                var,
                old_domain: current,
                old_stamp,
            });
        }

        self.domains[index] = narrowed;
        self.domain_stamps[index] = level;
        self.changed.insert(index);
        Ok(true)
    }

    /// Allocates a versioned snapshot slot holding `value`.
    pub fn new_snapshot<V>(&mut self, value: V) -> SnapshotIndex
    where
        V: Into<Rc<[usize]>>,
    {
        let index = SnapshotIndex::new(self.snapshots.len());
        self.snapshots.push(value.into());
        self.snapshot_stamps.push(self.level());
        index
    }

    /// Returns the current value of a snapshot slot.
    #[inline]
    pub fn snapshot(&self, slot: SnapshotIndex) -> &[usize] {
        &self.snapshots[slot.get()]
    }

    /// Replaces the value of a snapshot slot.
    ///
    /// The previous value is kept on the trail and comes back when the
    /// current level is backtracked.
    pub fn set_snapshot<V>(&mut self, slot: SnapshotIndex, value: V)
    where
        V: Into<Rc<[usize]>>,
    {
        let index = slot.get();
        let level = self.level();
        let old_stamp = self.snapshot_stamps[index];
        let old_value = std::mem::replace(&mut self.snapshots[index], value.into());
        if old_stamp < level {
            self.trail.record(TrailEntry::Snapshot {
                slot,
                old_value,
                old_stamp,
            });
        }
        self.snapshot_stamps[index] = level;
    }

    /// Opens a new decision level.
    #[inline]
    pub fn push_level(&mut self) {
        self.trail.push_frame();
    }

    /// Leaves the current decision level, restoring every domain and
    /// snapshot written since it was opened.
    ///
    /// The changed-variable set is cleared: whatever was pending belongs to
    /// the abandoned branch. Returns `false` at the root level.
    pub fn backtrack(&mut self) -> bool {
        let domains = &mut self.domains;
        let domain_stamps = &mut self.domain_stamps;
        let snapshots = &mut self.snapshots;
        let snapshot_stamps = &mut self.snapshot_stamps;

        let popped = self.trail.backtrack(|entry| match entry {
            TrailEntry::Domain {
                var,
                old_domain,
                old_stamp,
            } => {
                domains[var.get()] = old_domain;
                domain_stamps[var.get()] = old_stamp;
            }
            TrailEntry::Snapshot {
                slot,
                old_value,
                old_stamp,
            } => {
                snapshots[slot.get()] = old_value;
                snapshot_stamps[slot.get()] = old_stamp;
            }
        });
        self.changed.clear();
        popped
    }

    /// Marks `var` as changed without narrowing it, so the next propagation
    /// round wakes up the constraints watching it.
    #[inline]
    pub fn touch(&mut self, var: VarIndex) {
        self.changed.insert(var.get());
    }

    /// Returns `true` if some variable changed since the last
    /// `take_changed`.
    #[inline]
    pub fn has_changes(&self) -> bool {
        !self.changed.is_clear()
    }

    /// Returns the set of variables changed since the previous call and
    /// starts collecting a fresh one.
    #[inline]
    pub fn take_changed(&mut self) -> FixedBitSet {
        let fresh = FixedBitSet::with_capacity(self.domains.len());
        std::mem::replace(&mut self.changed, fresh)
    }
}

impl<T> std::fmt::Display for Store<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Store(vars: {}, snapshots: {}, level: {}, trail: {})",
            self.domains.len(),
            self.snapshots.len(),
            self.level(),
            self.trail.num_entries()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_var_and_queries() {
        let mut store = Store::<i64>::new();
        let x = store.new_var(0, 10);
        let y = store.new_fixed(4);
        assert_eq!(store.num_vars(), 2);
        assert_eq!((store.min(x), store.max(x)), (0, 10));
        assert!(!store.is_singleton(x));
        assert_eq!(store.value(y), Some(4));
        assert_eq!(store.value(x), None);
        assert_eq!(store.stamp(x), 0);
    }

    #[test]
    fn test_narrowing_reports_change_and_failure() {
        let mut store = Store::<i64>::new();
        let x = store.new_var(0, 10);

        assert_eq!(store.set_min(x, 3), Ok(true));
        assert_eq!(store.set_min(x, 2), Ok(false));
        assert_eq!(store.set_max(x, 8), Ok(true));
        assert_eq!(store.domain(x), IntervalDomain::new(3, 8));

        assert_eq!(store.set_min(x, 9), Err(Inconsistency::EmptyDomain(x)));
        assert_eq!(store.domain(x), IntervalDomain::new(3, 8));

        assert_eq!(store.fix(x, 5), Ok(true));
        assert_eq!(store.value(x), Some(5));
    }

    #[test]
    fn test_changed_set_is_collected_and_reset() {
        let mut store = Store::<i64>::new();
        let x = store.new_var(0, 10);
        let y = store.new_var(0, 10);
        assert!(!store.has_changes());

        store.set_max(y, 5).unwrap();
        store.touch(x);
        let changed = store.take_changed();
        assert!(changed.contains(x.get()));
        assert!(changed.contains(y.get()));
        assert!(!store.has_changes());
    }

    #[test]
    fn test_backtrack_restores_domains_and_stamps() {
        let mut store = Store::<i64>::new();
        let x = store.new_var(0, 10);

        store.push_level();
        store.set_min(x, 2).unwrap();
        assert_eq!(store.stamp(x), 1);

        store.push_level();
        store.set_min(x, 4).unwrap();
        store.set_max(x, 6).unwrap();
        assert_eq!(store.stamp(x), 2);
        assert_eq!(store.level(), 2);

        assert!(store.backtrack());
        assert_eq!(store.domain(x), IntervalDomain::new(2, 10));
        assert_eq!(store.stamp(x), 1);
        assert!(!store.has_changes());

        assert!(store.backtrack());
        assert_eq!(store.domain(x), IntervalDomain::new(0, 10));
        assert_eq!(store.stamp(x), 0);
        assert!(!store.backtrack());
    }

    #[test]
    fn test_snapshots_are_versioned_by_level() {
        let mut store = Store::<i64>::new();
        let slot = store.new_snapshot(vec![1usize, 2, 3]);
        assert_eq!(store.snapshot(slot), &[1, 2, 3]);

        store.push_level();
        store.set_snapshot(slot, vec![1usize, 3]);
        store.set_snapshot(slot, vec![3usize]);
        assert_eq!(store.snapshot(slot), &[3]);

        store.backtrack();
        assert_eq!(store.snapshot(slot), &[1, 2, 3]);
    }

    #[test]
    fn test_root_level_writes_survive_backtrack() {
        let mut store = Store::<i64>::new();
        let x = store.new_var(0, 10);
        let slot = store.new_snapshot(vec![0usize]);
        store.set_max(x, 7).unwrap();
        store.set_snapshot(slot, Vec::<usize>::new());
        assert!(!store.backtrack());
        assert_eq!(store.max(x), 7);
        assert!(store.snapshot(slot).is_empty());
    }
}
