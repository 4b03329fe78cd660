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

//! Fixpoint propagation over a `Store`.
//!
//! `PropagationEngine` owns the store and the posted propagators. Each call
//! to `propagate` repeatedly drains the store's changed-variable set and
//! wakes every propagator whose scope intersects it, until no variable
//! changes any more or a propagator fails.

use crate::{
    error::Inconsistency,
    index::{ConstraintIndex, VarIndex},
    propagator::Propagator,
    store::Store,
};
use fixedbitset::FixedBitSet;
use log::{debug, trace};
use num_traits::PrimInt;

/// Counters collected by a `PropagationEngine`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStatistics {
    /// Calls to `propagate`.
    pub propagations: u64,
    /// Rounds of draining the changed-variable set.
    pub rounds: u64,
    /// Individual propagator invocations.
    pub propagator_calls: u64,
    /// Propagation calls that ended in an inconsistency.
    pub failures: u64,
}

impl std::fmt::Display for EngineStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Propagation Engine Statistics:")?;
        writeln!(f, "  Propagations:      {}", self.propagations)?;
        writeln!(f, "  Rounds:            {}", self.rounds)?;
        writeln!(f, "  Propagator calls:  {}", self.propagator_calls)?;
        writeln!(f, "  Failures:          {}", self.failures)?;
        Ok(())
    }
}

struct Posted<T> {
    propagator: Box<dyn Propagator<T>>,
    watched: FixedBitSet,
}

/// Runs posted propagators to a fixpoint.
pub struct PropagationEngine<T> {
    store: Store<T>,
    posted: Vec<Posted<T>>,
    statistics: EngineStatistics,
}

impl<T> PropagationEngine<T>
where
    T: PrimInt + std::fmt::Display,
{
    /// Creates an engine around an existing store.
    #[inline]
    pub fn new(store: Store<T>) -> Self {
        Self {
            store,
            posted: Vec::new(),
            statistics: EngineStatistics::default(),
        }
    }

    /// Posts a propagator and returns the id it was registered under.
    ///
    /// Every variable of its scope is marked changed, so the next
    /// `propagate` runs it at least once.
    pub fn post<P>(&mut self, propagator: P) -> ConstraintIndex
    where
        P: Propagator<T> + 'static,
    {
        let id = ConstraintIndex::new(self.posted.len());
        let mut propagator: Box<dyn Propagator<T>> = Box::new(propagator);
        propagator.impose(&mut self.store, id);

        let scope: Vec<VarIndex> = propagator.scope();
        let mut watched = FixedBitSet::with_capacity(self.store.num_vars());
        for var in scope {
            watched.insert(var.get());
            self.store.touch(var);
        }

        debug!("posted {} as {}", propagator.name(), id);
        self.posted.push(Posted {
            propagator,
            watched,
        });
        id
    }

    /// Propagates until no domain changes any more.
    ///
    /// # Errors
    ///
    /// Returns the first `Inconsistency` raised by a propagator. The store
    /// is left in the partially narrowed state; backtrack it to recover.
    pub fn propagate(&mut self) -> Result<(), Inconsistency> {
        self.statistics.propagations += 1;

        while self.store.has_changes() {
            let changed = self.store.take_changed();
            self.statistics.rounds += 1;

            for (index, posted) in self.posted.iter_mut().enumerate() {
                if posted.watched.is_disjoint(&changed) {
                    continue;
                }

                self.statistics.propagator_calls += 1;
                trace!("waking {} ({})", posted.propagator.name(), index);
                if let Err(e) = posted.propagator.narrow(&mut self.store, &changed) {
                    self.statistics.failures += 1;
                    debug!(
                        "{} failed at level {}: {}",
                        posted.propagator.name(),
                        self.store.level(),
                        e
                    );
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Returns `true` if every posted propagator is satisfied.
    pub fn satisfied(&self) -> bool {
        self.posted
            .iter()
            .all(|posted| posted.propagator.satisfied(&self.store))
    }

    #[inline]
    pub fn store(&self) -> &Store<T> {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut Store<T> {
        &mut self.store
    }

    #[inline]
    pub fn statistics(&self) -> &EngineStatistics {
        &self.statistics
    }

    /// Describes every posted propagator, one per line.
    pub fn describe(&self) -> String {
        self.posted
            .iter()
            .map(|posted| posted.propagator.describe(&self.store))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<T> std::fmt::Display for PropagationEngine<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PropagationEngine(constraints: {}, {})",
            self.posted.len(),
            self.store
        )
    }
}
