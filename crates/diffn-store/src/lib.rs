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

//! diffn-store: bounds domains, decision-level trail and a fixpoint loop
//!
//! This crate realises the collaborators a propagator needs from a
//! finite-domain solver, and nothing more:
//!
//! - `domain`: interval-bounds domains `[min, max]`.
//! - `store`: the `Store` owning domains and versioned snapshot slots,
//!   stamping every write with its decision level and restoring them on
//!   backtrack.
//! - `trail`: the undo log with one frame per decision level.
//! - `propagator`: the `Propagator` trait constraints implement.
//! - `engine`: `PropagationEngine`, which assigns constraint ids and runs
//!   propagators to a fixpoint over the changed-variable set.
//! - `error`: `Inconsistency`, the single failure kind.
//! - `index`: typed indices for variables, snapshot slots and constraints.
//!
//! Search (decisions, variable/value ordering) is deliberately absent;
//! callers drive `push_level`/`backtrack` themselves.

pub mod domain;
pub mod engine;
pub mod error;
pub mod index;
pub mod propagator;
pub mod store;
pub mod trail;
