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

//! The `Disjoint` propagator.
//!
//! Enforces that no two rectangles of a set overlap. Every `narrow` call
//! walks the rectangles once; for each rectangle whose situation may have
//! changed it refreshes the overlap cache from the analyzer and tightens the
//! rectangle's origins from its neighbors' mandatory parts.

use crate::{
    analyzer,
    cache::OverlapCache,
    narrowing,
    num::Coordinate,
    rectangle::{Rectangle, RectangleIndex},
    stats::DisjointStatistics,
};
use diffn_store::{
    error::Inconsistency,
    index::{ConstraintIndex, VarIndex},
    propagator::Propagator,
    store::Store,
};
use fixedbitset::FixedBitSet;
use log::{debug, trace, warn};

/// Selects the reasoning applied when tightening a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileMode {
    /// Only pairwise used-space reasoning.
    Pairwise,
    /// Pairwise reasoning plus cumulative profiles over every pair of
    /// dimensions.
    Profile,
}

impl std::fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pairwise => write!(f, "pairwise"),
            Self::Profile => write!(f, "profile"),
        }
    }
}

/// Requires that no two rectangles overlap.
///
/// Rectangles with a zero length in some dimension cover no area and never
/// conflict with anything.
///
/// # Examples
///
/// ```rust
/// # use diffn::{disjoint::{Disjoint, ProfileMode}, rectangle::Rectangle};
/// # use diffn_store::{engine::PropagationEngine, store::Store};
///
/// let mut store = Store::<i64>::new();
/// let fixed = Rectangle::new([store.new_fixed(0), store.new_fixed(0)], [store.new_fixed(4), store.new_fixed(4)]);
/// let x = store.new_var(0, 10);
/// let moving = Rectangle::new([x, store.new_fixed(0)], [store.new_fixed(3), store.new_fixed(3)]);
///
/// let mut engine = PropagationEngine::new(store);
/// engine.post(Disjoint::new(vec![fixed, moving], ProfileMode::Profile));
/// assert!(engine.propagate().is_ok());
/// assert_eq!(engine.store().min(x), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Disjoint {
    id: Option<ConstraintIndex>,
    rectangles: Vec<Rectangle>,
    mode: ProfileMode,
    cache: OverlapCache,
    statistics: DisjointStatistics,
}

impl Disjoint {
    /// Creates a new `Disjoint` over `rectangles`.
    ///
    /// # Panics
    ///
    /// Panics if the rectangles differ in dimensionality.
    pub fn new(rectangles: Vec<Rectangle>, mode: ProfileMode) -> Self {
        if let Some(first) = rectangles.first() {
            let dim = first.dim();
            assert!(
                rectangles.iter().all(|r| r.dim() == dim),
                "called `Disjoint::new` with rectangles of mixed dimensionality"
            );
        }

        Self {
            id: None,
            rectangles,
            mode,
            cache: OverlapCache::new(),
            statistics: DisjointStatistics::default(),
        }
    }

    /// Returns the id assigned when the constraint was imposed.
    #[inline]
    pub fn id(&self) -> Option<ConstraintIndex> {
        self.id
    }

    #[inline]
    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rectangles
    }

    #[inline]
    pub fn mode(&self) -> ProfileMode {
        self.mode
    }

    #[inline]
    pub fn statistics(&self) -> &DisjointStatistics {
        &self.statistics
    }

    /// Returns the rectangles currently cached as possibly overlapping
    /// `rectangle`.
    ///
    /// Before `impose` every other rectangle is reported.
    pub fn overlap_candidates<T>(&self, store: &Store<T>, rectangle: RectangleIndex) -> Vec<usize>
    where
        T: Coordinate,
    {
        let r = rectangle.get();
        if self.cache.is_allocated() {
            self.cache.neighbors(store, r).to_vec()
        } else {
            (0..self.rectangles.len()).filter(|&s| s != r).collect()
        }
    }

    fn label(&self) -> String {
        match self.id {
            Some(id) => format!("Disjoint#{}", id.get()),
            None => "Disjoint".to_string(),
        }
    }

    /// Analyzes and, if needed, tightens rectangle `r`.
    fn narrow_rectangle<T>(
        &mut self,
        store: &mut Store<T>,
        changed: &FixedBitSet,
        r: usize,
    ) -> Result<(), Inconsistency>
    where
        T: Coordinate,
    {
        let rect = &self.rectangles[r];

        if rect.has_negative_length(store) {
            self.statistics.on_negative_length_skip();
            warn!(
                "{}: skipping rectangle {} with a negative minimal length {}",
                self.label(),
                r,
                rect.describe(store)
            );
            return Ok(());
        }
        if rect.is_settled(store) {
            self.statistics.on_settled_skip();
            return Ok(());
        }
        self.statistics.on_rectangle_analyzed();

        let cached = self.cache.neighbors(store, r);
        let cached_len = cached.len();
        let mut analysis = match analyzer::analyze(&self.rectangles, r, cached, store, changed) {
            Ok(analysis) => analysis,
            Err(kind) => {
                self.statistics.on_infeasibility(kind);
                debug!("{}: rectangle {} is infeasible: {}", self.label(), r, kind);
                return Err(kind.into());
            }
        };

        let shrunk = analysis.overlapping.len() != cached_len;
        if !(shrunk || analysis.neighbor_changed || rect.touches(changed)) {
            trace!("{}: rectangle {} unchanged", self.label(), r);
            return Ok(());
        }

        if shrunk {
            trace!(
                "{}: rectangle {} candidates {} -> {}",
                self.label(),
                r,
                cached_len,
                analysis.overlapping.len()
            );
            self.cache
                .replace(store, r, std::mem::take(&mut analysis.overlapping));
            self.statistics.on_cache_update();
        }

        match narrowing::narrow_rectangle(&self.rectangles, r, &analysis, self.mode, store) {
            Ok(moved) => {
                self.statistics.on_tightening(moved);
                Ok(())
            }
            Err(e) => {
                self.statistics.on_domain_failure();
                debug!("{}: tightening rectangle {} failed: {}", self.label(), r, e);
                Err(e)
            }
        }
    }
}

impl<T> Propagator<T> for Disjoint
where
    T: Coordinate,
{
    fn name(&self) -> &str {
        "Disjoint"
    }

    fn scope(&self) -> Vec<VarIndex> {
        self.rectangles.iter().flat_map(|r| r.vars()).collect()
    }

    fn impose(&mut self, store: &mut Store<T>, id: ConstraintIndex) {
        self.id = Some(id);
        self.cache.allocate(store, self.rectangles.len());
        debug!(
            "{}: imposed over {} rectangles ({})",
            self.label(),
            self.rectangles.len(),
            self.mode
        );
    }

    fn narrow(&mut self, store: &mut Store<T>, changed: &FixedBitSet) -> Result<(), Inconsistency> {
        debug_assert!(
            self.rectangles.is_empty() || self.cache.is_allocated(),
            "called `Disjoint::narrow` before `Disjoint::impose`"
        );

        self.statistics.on_narrow();
        for r in 0..self.rectangles.len() {
            self.narrow_rectangle(store, changed, r)?;
        }
        Ok(())
    }

    fn satisfied(&self, store: &Store<T>) -> bool {
        self.rectangles.iter().enumerate().all(|(r, rect)| {
            self.overlap_candidates(store, RectangleIndex::new(r))
                .into_iter()
                .all(|s| !rect.dom_overlap(&self.rectangles[s], store))
        })
    }

    fn describe(&self, store: &Store<T>) -> String {
        let rectangles = self
            .rectangles
            .iter()
            .map(|r| r.describe(store))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} : disjoint([{}], {})", self.label(), rectangles, self.mode)
    }
}

impl std::fmt::Display for Disjoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rectangles = self
            .rectangles
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{}(mode: {}, rectangles: [{}])",
            self.label(),
            self.mode,
            rectangles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffn_store::engine::PropagationEngine;

    type Dim = ((i64, i64), (i64, i64));

    fn rect(store: &mut Store<i64>, dims: &[Dim]) -> Rectangle {
        let origins: Vec<VarIndex> = dims.iter().map(|&((a, b), _)| store.new_var(a, b)).collect();
        let lengths: Vec<VarIndex> = dims.iter().map(|&(_, (a, b))| store.new_var(a, b)).collect();
        Rectangle::new(origins, lengths)
    }

    fn fixed(store: &mut Store<i64>, x: i64, y: i64, w: i64, h: i64) -> Rectangle {
        rect(store, &[((x, x), (w, w)), ((y, y), (h, h))])
    }

    /// Imposes `disjoint` and runs it to a fixpoint without an engine, so
    /// its cache and statistics stay inspectable.
    fn impose(disjoint: &mut Disjoint, store: &mut Store<i64>) {
        Propagator::<i64>::impose(disjoint, store, ConstraintIndex::new(0));
        for v in disjoint.scope_vars() {
            store.touch(v);
        }
    }

    fn fixpoint(disjoint: &mut Disjoint, store: &mut Store<i64>) -> Result<(), Inconsistency> {
        while store.has_changes() {
            let changed = store.take_changed();
            disjoint.narrow(store, &changed)?;
        }
        Ok(())
    }

    fn bounds(store: &Store<i64>, var: VarIndex) -> (i64, i64) {
        (store.min(var), store.max(var))
    }

    impl Disjoint {
        fn scope_vars(&self) -> Vec<VarIndex> {
            Propagator::<i64>::scope(self)
        }
    }

    #[test]
    fn test_four_squares_do_not_fit_in_five_by_five() {
        let mut store = Store::new();
        let square: &[Dim] = &[((0, 2), (3, 3)), ((0, 2), (3, 3))];
        let rects = (0..4).map(|_| rect(&mut store, square)).collect();

        let mut engine = PropagationEngine::new(store);
        engine.post(Disjoint::new(rects, ProfileMode::Pairwise));
        let result = engine.propagate();
        assert!(matches!(result, Err(Inconsistency::Proof(_))));
    }

    #[test]
    fn test_failure_is_counted_by_kind() {
        let mut store = Store::new();
        let rects = vec![fixed(&mut store, 0, 0, 2, 2), fixed(&mut store, 1, 1, 2, 2)];
        let mut disjoint = Disjoint::new(rects, ProfileMode::Profile);
        impose(&mut disjoint, &mut store);

        assert_eq!(
            fixpoint(&mut disjoint, &mut store),
            Err(Inconsistency::from(analyzer::Infeasibility::CommonArea))
        );
        assert_eq!(disjoint.statistics().failures_common_area, 1);
        assert_eq!(disjoint.statistics().failures(), 1);
    }

    #[test]
    fn test_disjoint_fixed_placement_is_satisfied_without_change() {
        let mut store = Store::new();
        let rects = vec![fixed(&mut store, 0, 0, 2, 2), fixed(&mut store, 5, 5, 2, 2)];
        let vars: Vec<VarIndex> = rects.iter().flat_map(|r| r.vars()).collect();
        let before: Vec<_> = vars.iter().map(|&v| store.domain(v)).collect();

        let mut engine = PropagationEngine::new(store);
        engine.post(Disjoint::new(rects, ProfileMode::Profile));
        assert!(engine.satisfied());
        assert_eq!(engine.propagate(), Ok(()));
        assert!(engine.satisfied());

        let after: Vec<_> = vars.iter().map(|&v| engine.store().domain(v)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_overlapping_fixed_placement_fails() {
        let mut store = Store::new();
        let rects = vec![fixed(&mut store, 0, 0, 2, 2), fixed(&mut store, 1, 1, 2, 2)];

        let mut engine = PropagationEngine::new(store);
        engine.post(Disjoint::new(rects, ProfileMode::Pairwise));
        assert!(!engine.satisfied());
        assert!(engine.propagate().is_err());
    }

    #[test]
    fn test_zero_length_rectangle_is_immune() {
        let mut store = Store::new();
        let square = rect(&mut store, &[((0, 2), (3, 3)), ((0, 2), (3, 3))]);
        let flat = rect(&mut store, &[((0, 5), (0, 0)), ((0, 5), (3, 3))]);
        let rects = vec![square.clone(), flat.clone()];
        let mut disjoint = Disjoint::new(rects, ProfileMode::Profile);
        impose(&mut disjoint, &mut store);

        assert_eq!(fixpoint(&mut disjoint, &mut store), Ok(()));
        assert!(!square.dom_overlap(&flat, &store));
        assert!(disjoint.overlap_candidates(&store, RectangleIndex::new(0)).is_empty());
        assert!(disjoint.overlap_candidates(&store, RectangleIndex::new(1)).is_empty());
        assert_eq!(bounds(&store, square.origin(0)), (0, 2));
        assert_eq!(bounds(&store, flat.origin(0)), (0, 5));
        assert!(Propagator::<i64>::satisfied(&disjoint, &store));
    }

    #[test]
    fn test_pairwise_pushes_rectangle_past_fixed_block() {
        let mut store = Store::new();
        let block = fixed(&mut store, 0, 0, 4, 4);
        let moving = rect(&mut store, &[((0, 10), (3, 3)), ((0, 0), (3, 3))]);
        let x = moving.origin(0);

        let mut engine = PropagationEngine::new(store);
        engine.post(Disjoint::new(vec![block, moving], ProfileMode::Pairwise));
        assert_eq!(engine.propagate(), Ok(()));
        assert_eq!(bounds(engine.store(), x), (4, 10));
        assert!(engine.satisfied());
    }

    #[test]
    fn test_profile_prunes_beyond_pairwise() {
        let build = |store: &mut Store<i64>| {
            vec![
                rect(store, &[((0, 10), (2, 2)), ((0, 1), (3, 3))]),
                fixed(store, 0, 0, 3, 1),
                fixed(store, 0, 3, 3, 1),
            ]
        };

        let mut store = Store::new();
        let rects = build(&mut store);
        let x = rects[0].origin(0);
        let mut pairwise = PropagationEngine::new(store);
        pairwise.post(Disjoint::new(rects, ProfileMode::Pairwise));
        assert_eq!(pairwise.propagate(), Ok(()));
        assert_eq!(bounds(pairwise.store(), x), (0, 10));

        let mut store = Store::new();
        let rects = build(&mut store);
        let mut profile = PropagationEngine::new(store);
        profile.post(Disjoint::new(rects, ProfileMode::Profile));
        assert_eq!(profile.propagate(), Ok(()));
        assert_eq!(bounds(profile.store(), x), (3, 10));
    }

    #[test]
    fn test_backtracking_restores_cache_and_domains() {
        let mut store = Store::new();
        let block = fixed(&mut store, 0, 0, 2, 2);
        let free = rect(&mut store, &[((0, 10), (2, 2)), ((0, 10), (2, 2))]);
        let x = free.origin(0);
        let mut disjoint = Disjoint::new(vec![block, free], ProfileMode::Profile);
        impose(&mut disjoint, &mut store);
        assert_eq!(fixpoint(&mut disjoint, &mut store), Ok(()));
        assert_eq!(disjoint.overlap_candidates(&store, RectangleIndex::new(0)), vec![1]);
        assert_eq!(disjoint.overlap_candidates(&store, RectangleIndex::new(1)), vec![0]);

        store.push_level();
        store.set_min(x, 5).unwrap();
        assert_eq!(fixpoint(&mut disjoint, &mut store), Ok(()));
        // The block is settled at this level and keeps its entry.
        assert_eq!(disjoint.overlap_candidates(&store, RectangleIndex::new(0)), vec![1]);
        assert!(disjoint.overlap_candidates(&store, RectangleIndex::new(1)).is_empty());
        assert_eq!(disjoint.statistics().cache_updates, 1);

        assert!(store.backtrack());
        assert_eq!(bounds(&store, x), (0, 10));
        assert_eq!(store.stamp(x), 0);
        assert_eq!(disjoint.overlap_candidates(&store, RectangleIndex::new(0)), vec![1]);
        assert_eq!(disjoint.overlap_candidates(&store, RectangleIndex::new(1)), vec![0]);
    }

    #[test]
    fn test_second_call_without_changes_is_a_no_op() {
        let mut store = Store::new();
        let rects = vec![
            fixed(&mut store, 0, 0, 4, 4),
            rect(&mut store, &[((0, 10), (3, 3)), ((0, 0), (3, 3))]),
            rect(&mut store, &[((0, 10), (2, 2)), ((0, 6), (2, 2))]),
        ];
        let mut disjoint = Disjoint::new(rects, ProfileMode::Profile);
        impose(&mut disjoint, &mut store);
        assert_eq!(fixpoint(&mut disjoint, &mut store), Ok(()));

        let vars = disjoint.scope_vars();
        let before: Vec<_> = vars.iter().map(|&v| store.domain(v)).collect();
        let analyzed = disjoint.statistics().rectangles_analyzed;

        let nothing = FixedBitSet::with_capacity(store.num_vars());
        assert_eq!(disjoint.narrow(&mut store, &nothing), Ok(()));
        assert!(!store.has_changes());
        let after: Vec<_> = vars.iter().map(|&v| store.domain(v)).collect();
        assert_eq!(before, after);
        assert_eq!(disjoint.statistics().rectangles_analyzed, analyzed + 3);
    }

    #[test]
    fn test_settled_rectangles_are_skipped_above_their_level() {
        let mut store = Store::new();
        let rects = vec![fixed(&mut store, 0, 0, 2, 2), fixed(&mut store, 4, 0, 2, 2)];
        let mut disjoint = Disjoint::new(rects, ProfileMode::Pairwise);
        impose(&mut disjoint, &mut store);
        assert_eq!(fixpoint(&mut disjoint, &mut store), Ok(()));
        assert_eq!(disjoint.statistics().settled_skips, 0);

        store.push_level();
        let nothing = FixedBitSet::with_capacity(store.num_vars());
        assert_eq!(disjoint.narrow(&mut store, &nothing), Ok(()));
        assert_eq!(disjoint.statistics().settled_skips, 2);
    }

    #[test]
    fn test_negative_length_is_skipped_and_counted() {
        let mut store = Store::new();
        let odd = rect(&mut store, &[((0, 5), (-2, 3)), ((0, 5), (2, 2))]);
        let square = rect(&mut store, &[((0, 5), (2, 2)), ((0, 5), (2, 2))]);
        let mut disjoint = Disjoint::new(vec![odd, square], ProfileMode::Profile);
        impose(&mut disjoint, &mut store);

        assert_eq!(fixpoint(&mut disjoint, &mut store), Ok(()));
        assert!(disjoint.statistics().negative_length_skips >= 1);
    }

    #[test]
    fn test_one_dimensional_rectangles_act_as_disjunctive() {
        let mut store = Store::new();
        let a = rect(&mut store, &[((0, 2), (4, 4))]);
        let b = rect(&mut store, &[((0, 5), (3, 3))]);
        let (ax, bx) = (a.origin(0), b.origin(0));

        let mut engine = PropagationEngine::new(store);
        engine.post(Disjoint::new(vec![a, b], ProfileMode::Profile));
        assert_eq!(engine.propagate(), Ok(()));
        assert_eq!(bounds(engine.store(), ax), (0, 1));
        assert_eq!(bounds(engine.store(), bx), (4, 5));

        engine.store_mut().push_level();
        engine.store_mut().set_min(ax, 1).unwrap();
        assert_eq!(engine.propagate(), Ok(()));
        assert_eq!(bounds(engine.store(), bx), (5, 5));
        engine.store_mut().backtrack();
        assert_eq!(bounds(engine.store(), bx), (4, 5));

        engine.store_mut().push_level();
        engine.store_mut().set_min(ax, 1).unwrap();
        engine.store_mut().set_max(bx, 4).unwrap();
        assert!(engine.propagate().is_err());
        engine.store_mut().backtrack();
        assert_eq!(bounds(engine.store(), ax), (0, 1));
    }

    #[test]
    fn test_origins_near_the_type_limits_do_not_overflow() {
        for mode in [ProfileMode::Pairwise, ProfileMode::Profile] {
            let mut store = Store::<i32>::new();
            let block = Rectangle::new(
                [store.new_fixed(0), store.new_fixed(0)],
                [store.new_fixed(4), store.new_fixed(4)],
            );
            let x = store.new_var(0, i32::MAX - 1);
            let high = Rectangle::new([x, store.new_fixed(0)], [store.new_fixed(4), store.new_fixed(4)]);

            let mut engine = PropagationEngine::new(store);
            engine.post(Disjoint::new(vec![block, high], mode));
            assert_eq!(engine.propagate(), Ok(()));
            assert_eq!((engine.store().min(x), engine.store().max(x)), (4, i32::MAX - 1));

            let mut store = Store::<i32>::new();
            let block = Rectangle::new(
                [store.new_fixed(-4), store.new_fixed(0)],
                [store.new_fixed(4), store.new_fixed(4)],
            );
            let x = store.new_var(i32::MIN + 1, -2);
            let low = Rectangle::new([x, store.new_fixed(0)], [store.new_fixed(4), store.new_fixed(4)]);

            let mut engine = PropagationEngine::new(store);
            engine.post(Disjoint::new(vec![block, low], mode));
            assert_eq!(engine.propagate(), Ok(()));
            assert_eq!((engine.store().min(x), engine.store().max(x)), (i32::MIN + 1, -8));
        }
    }

    #[test]
    fn test_describe_and_display() {
        let mut store = Store::new();
        let a = fixed(&mut store, 0, 0, 2, 2);
        let b = rect(&mut store, &[((3, 5), (1, 1)), ((0, 0), (1, 2))]);

        let mut engine = PropagationEngine::new(store);
        engine.post(Disjoint::new(vec![a, b], ProfileMode::Pairwise));
        assert_eq!(
            engine.describe(),
            "Disjoint#0 : disjoint([[origin: [0, 0], length: [2, 2]], [origin: [3..5, 0], length: [1, 1..2]]], pairwise)"
        );

        let mut store = Store::<i64>::new();
        let c = fixed(&mut store, 1, 1, 1, 1);
        let disjoint = Disjoint::new(vec![c], ProfileMode::Profile);
        assert_eq!(
            disjoint.to_string(),
            "Disjoint(mode: profile, rectangles: [Rectangle(origin: [0, 1], length: [2, 3])])"
        );
        assert_eq!(disjoint.id(), None);
        assert_eq!(disjoint.mode(), ProfileMode::Profile);
    }

    #[test]
    #[should_panic(expected = "mixed dimensionality")]
    fn test_mixed_dimensionality_panics() {
        let mut store = Store::new();
        let flat = rect(&mut store, &[((0, 1), (1, 1))]);
        let square = fixed(&mut store, 0, 0, 1, 1);
        Disjoint::new(vec![flat, square], ProfileMode::Pairwise);
    }
}
