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

use crate::analyzer::Infeasibility;

/// Counters collected by a `Disjoint` propagator over its lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisjointStatistics {
    /// Calls to `narrow`.
    pub narrow_calls: u64,
    /// Rectangles analyzed.
    pub rectangles_analyzed: u64,
    /// Rectangles skipped because they were fixed before the current level.
    pub settled_skips: u64,
    /// Rectangles skipped because a length admitted negative values.
    pub negative_length_skips: u64,
    /// Overlap-cache entries replaced by a smaller candidate set.
    pub cache_updates: u64,
    /// Rectangles whose origins were tightened.
    pub tightening_runs: u64,
    /// Origin bounds actually moved by tightening.
    pub bounds_tightened: u64,
    /// Failures proven by the common-area bound.
    pub failures_common_area: u64,
    /// Failures proven by the total-area bound.
    pub failures_area: u64,
    /// Failures proven by the capacity bound.
    pub failures_capacity: u64,
    /// Failures caused by an emptied origin domain.
    pub failures_domain: u64,
}

impl DisjointStatistics {
    #[inline]
    pub fn on_narrow(&mut self) {
        self.narrow_calls = self.narrow_calls.saturating_add(1);
    }

    #[inline]
    pub fn on_rectangle_analyzed(&mut self) {
        self.rectangles_analyzed = self.rectangles_analyzed.saturating_add(1);
    }

    #[inline]
    pub fn on_settled_skip(&mut self) {
        self.settled_skips = self.settled_skips.saturating_add(1);
    }

    #[inline]
    pub fn on_negative_length_skip(&mut self) {
        self.negative_length_skips = self.negative_length_skips.saturating_add(1);
    }

    #[inline]
    pub fn on_cache_update(&mut self) {
        self.cache_updates = self.cache_updates.saturating_add(1);
    }

    /// Records one tightening run that moved `moved` origin bounds.
    #[inline]
    pub fn on_tightening(&mut self, moved: u64) {
        self.tightening_runs = self.tightening_runs.saturating_add(1);
        self.bounds_tightened = self.bounds_tightened.saturating_add(moved);
    }

    #[inline]
    pub fn on_infeasibility(&mut self, kind: Infeasibility) {
        let counter = match kind {
            Infeasibility::CommonArea => &mut self.failures_common_area,
            Infeasibility::Area => &mut self.failures_area,
            Infeasibility::Capacity => &mut self.failures_capacity,
        };
        *counter = counter.saturating_add(1);
    }

    #[inline]
    pub fn on_domain_failure(&mut self) {
        self.failures_domain = self.failures_domain.saturating_add(1);
    }

    /// Returns the number of failures of any kind.
    #[inline]
    pub fn failures(&self) -> u64 {
        self.failures_common_area
            .saturating_add(self.failures_area)
            .saturating_add(self.failures_capacity)
            .saturating_add(self.failures_domain)
    }
}

impl std::fmt::Display for DisjointStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Disjoint Statistics:")?;
        writeln!(f, "  Narrow calls:          {}", self.narrow_calls)?;
        writeln!(f, "  Rectangles analyzed:   {}", self.rectangles_analyzed)?;
        writeln!(f, "  Settled skips:         {}", self.settled_skips)?;
        writeln!(f, "  Negative-length skips: {}", self.negative_length_skips)?;
        writeln!(f, "  Cache updates:         {}", self.cache_updates)?;
        writeln!(f, "  Tightening runs:       {}", self.tightening_runs)?;
        writeln!(f, "  Bounds tightened:      {}", self.bounds_tightened)?;
        writeln!(f, "  Failures (common area):{}", self.failures_common_area)?;
        writeln!(f, "  Failures (area):       {}", self.failures_area)?;
        writeln!(f, "  Failures (capacity):   {}", self.failures_capacity)?;
        writeln!(f, "  Failures (domain):     {}", self.failures_domain)?;
        Ok(())
    }
}
