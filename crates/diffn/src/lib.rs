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

//! diffn: non-overlapping n-dimensional rectangles
//!
//! A propagator for finite-domain constraint solving that keeps a set of
//! axis-aligned rectangles pairwise disjoint. Each rectangle has an origin
//! and a length variable per dimension; the propagator fails as soon as the
//! rectangles provably cannot be placed and otherwise tightens origin bounds.
//!
//! Core flow
//! - Create variables in a `diffn_store::store::Store<T>`.
//! - Group them into `rectangle::Rectangle`s (or use the conversion helpers).
//! - Post a `disjoint::Disjoint` to a `diffn_store::engine::PropagationEngine`.
//! - Drive `propagate`, `push_level` and `backtrack` from your search.
//!
//! Reasoning per rectangle
//! - Overlap cache: neighbors whose reach no longer meets the rectangle's are
//!   dropped from a store-versioned candidate list.
//! - Volume bounds: common area, total area and capacity prove infeasibility
//!   without placing anything.
//! - Used space: a neighbor's mandatory part forbids positions in one
//!   dimension when it meets the rectangle's mandatory part in all others.
//! - Profiles (`ProfileMode::Profile`): cumulative mandatory parts over one
//!   dimension forbid positions where too little room is left in another.
//!
//! Module map
//! - `rectangle`: the rectangle model and conversion helpers.
//! - `cache`: the backtrackable overlap cache.
//! - `analyzer`: neighbor classification and volume bounds.
//! - `profile`: event-sweep profiles and their forbidden regions.
//! - `narrowing`: origin tightening from forbidden regions.
//! - `disjoint`: the propagator itself.
//! - `stats`: counters reported by the propagator.

pub mod analyzer;
pub mod cache;
pub mod disjoint;
pub mod narrowing;
pub mod num;
pub mod profile;
pub mod rectangle;
pub mod stats;
