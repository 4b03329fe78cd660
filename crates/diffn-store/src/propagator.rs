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

use crate::{
    error::Inconsistency,
    index::{ConstraintIndex, VarIndex},
    store::Store,
};
use fixedbitset::FixedBitSet;

/// The capability every constraint posted to a `PropagationEngine` provides.
///
/// Implementations read bounds from the store and request narrowing through
/// it; they never hold domains across calls. Any state that must follow the
/// search (such as cached neighbor sets) lives in store snapshot slots
/// allocated during `impose`.
pub trait Propagator<T> {
    /// Returns a short, human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Returns every variable the propagator watches.
    fn scope(&self) -> Vec<VarIndex>;

    /// Registers the propagator with `store` under `id`.
    ///
    /// Called exactly once, before the first `narrow`.
    fn impose(&mut self, store: &mut Store<T>, id: ConstraintIndex);

    /// Narrows domains given the variables changed since the previous call.
    ///
    /// # Errors
    ///
    /// Returns `Inconsistency` as soon as infeasibility is detected. Writes
    /// made before the failure are undone by backtracking the store.
    fn narrow(&mut self, store: &mut Store<T>, changed: &FixedBitSet)
        -> Result<(), Inconsistency>;

    /// Returns `true` if the constraint holds for every assignment within
    /// the current domains.
    fn satisfied(&self, store: &Store<T>) -> bool;

    /// Returns a textual description including current domains.
    fn describe(&self, store: &Store<T>) -> String;
}
