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

//! Interval-bounds domains.
//!
//! A variable's domain is approximated by its bounds `[min, max]` (both
//! inclusive). Holes are never represented; propagators reason and prune on
//! bounds only.

use num_traits::PrimInt;

/// The admissible values `[min, max]` of a finite-domain variable.
///
/// # Invariants
///
/// `min <= max`. An empty domain is never stored; narrowing that would
/// produce one is reported as an inconsistency by the store instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalDomain<T> {
    min: T,
    max: T,
}

impl<T> IntervalDomain<T>
where
    T: PrimInt,
{
    /// Creates the domain `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    #[inline]
    pub fn new(min: T, max: T) -> Self {
        assert!(
            min <= max,
            "called `IntervalDomain::new` with an empty domain: min must not exceed max"
        );
        Self { min, max }
    }

    #[inline(always)]
    pub fn min(&self) -> T {
        self.min
    }

    #[inline(always)]
    pub fn max(&self) -> T {
        self.max
    }

    /// Returns `true` if the domain holds exactly one value.
    #[inline(always)]
    pub fn is_singleton(&self) -> bool {
        self.min == self.max
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Intersects the domain with `[min, max]`.
    ///
    /// Returns `None` if the intersection is empty.
    #[inline]
    pub fn restrict(&self, min: T, max: T) -> Option<Self> {
        let lo = self.min.max(min);
        let hi = self.max.min(max);
        if lo <= hi {
            Some(Self { min: lo, max: hi })
        } else {
            None
        }
    }
}

impl<T> std::fmt::Display for IntervalDomain<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_singleton() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..{}", self.min, self.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_and_singleton() {
        let d = IntervalDomain::new(2, 9);
        assert_eq!(d.min(), 2);
        assert_eq!(d.max(), 9);
        assert!(!d.is_singleton());
        assert!(d.contains(2) && d.contains(9) && !d.contains(10));
        assert!(IntervalDomain::new(4, 4).is_singleton());
    }

    #[test]
    #[should_panic(expected = "empty domain")]
    fn test_new_rejects_empty() {
        IntervalDomain::new(3, 2);
    }

    #[test]
    fn test_restrict() {
        let d = IntervalDomain::new(0, 10);
        assert_eq!(d.restrict(3, 20), Some(IntervalDomain::new(3, 10)));
        assert_eq!(d.restrict(11, 20), None);
        assert_eq!(d.restrict(-5, 0), Some(IntervalDomain::new(0, 0)));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", IntervalDomain::new(1, 5)), "1..5");
        assert_eq!(format!("{}", IntervalDomain::new(-3, -3)), "-3");
    }
}
