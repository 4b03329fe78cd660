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

//! Axis-aligned n-dimensional rectangles over store variables.
//!
//! A `Rectangle` is pure identity: per dimension it names an origin variable
//! and a length variable. All geometry is derived on demand from the current
//! domains in a `Store`, so a rectangle never needs updating when the search
//! narrows or backtracks.
//!
//! Terminology used throughout the crate, per dimension `i`:
//! - *reach*: `[origin.min, origin.max + length.max)`, every point the
//!   rectangle could ever cover.
//! - *mandatory part*: `[origin.max, origin.min + length.min)`, the points it
//!   covers in every placement. Only well-formed when
//!   `origin.max <= origin.min + length.min`; it may still be empty.

use diffn_core::{
    math::interval::ClosedOpenInterval,
    utils::index::{TypedIndex, TypedIndexTag},
};
use diffn_store::{index::VarIndex, store::Store};
use fixedbitset::FixedBitSet;
use num_traits::{PrimInt, SaturatingMul, Signed};
use smallvec::SmallVec;

/// A tag type for rectangle indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RectangleIndexTag;

impl TypedIndexTag for RectangleIndexTag {
    const NAME: &'static str = "RectangleIndex";
}

/// A typed index of a rectangle within one `Disjoint` constraint.
pub type RectangleIndex = TypedIndex<RectangleIndexTag>;

/// An axis-aligned rectangle whose origin and length in every dimension are
/// store variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rectangle {
    origins: SmallVec<[VarIndex; 2]>,
    lengths: SmallVec<[VarIndex; 2]>,
}

impl Rectangle {
    /// Creates a rectangle from per-dimension origin and length variables.
    ///
    /// # Panics
    ///
    /// Panics if `origins` is empty or if `origins` and `lengths` differ in
    /// length.
    pub fn new<O, L>(origins: O, lengths: L) -> Self
    where
        O: IntoIterator<Item = VarIndex>,
        L: IntoIterator<Item = VarIndex>,
    {
        let origins: SmallVec<[VarIndex; 2]> = origins.into_iter().collect();
        let lengths: SmallVec<[VarIndex; 2]> = lengths.into_iter().collect();
        assert!(
            !origins.is_empty(),
            "called `Rectangle::new` with zero dimensions"
        );
        assert_eq!(
            origins.len(),
            lengths.len(),
            "called `Rectangle::new` with {} origins but {} lengths",
            origins.len(),
            lengths.len()
        );
        Self { origins, lengths }
    }

    /// Creates a rectangle from a row laid out as
    /// `[origin_1, .., origin_d, length_1, .., length_d]`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is empty or has odd length.
    pub fn from_row(row: &[VarIndex]) -> Self {
        assert!(
            !row.is_empty() && row.len() % 2 == 0,
            "called `Rectangle::from_row` with a row of length {}; expected a non-empty even length",
            row.len()
        );
        let dim = row.len() / 2;
        Self::new(row[..dim].iter().copied(), row[dim..].iter().copied())
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn dim(&self) -> usize {
        self.origins.len()
    }

    /// Returns the origin variable of dimension `i`.
    #[inline]
    pub fn origin(&self, i: usize) -> VarIndex {
        self.origins[i]
    }

    /// Returns the length variable of dimension `i`.
    #[inline]
    pub fn length(&self, i: usize) -> VarIndex {
        self.lengths[i]
    }

    /// Returns every origin and length variable.
    #[inline]
    pub fn vars(&self) -> impl Iterator<Item = VarIndex> + '_ {
        self.origins.iter().chain(self.lengths.iter()).copied()
    }

    /// Returns `true` if any variable of this rectangle is in `changed`.
    #[inline]
    pub fn touches(&self, changed: &FixedBitSet) -> bool {
        self.vars().any(|v| changed.contains(v.get()))
    }

    /// Returns `[origin.min, origin.max + length.max)` of dimension `i`.
    ///
    /// Empty if the length cannot be positive: such a rectangle covers no
    /// point at all. The end saturates at `T::max_value()`.
    #[inline]
    pub fn reach<T>(&self, store: &Store<T>, i: usize) -> ClosedOpenInterval<T>
    where
        T: PrimInt + Signed,
    {
        let start = store.min(self.origins[i]);
        let length = store.max(self.lengths[i]);
        if length <= T::zero() {
            return ClosedOpenInterval::new(start, start);
        }
        ClosedOpenInterval::new(start, store.max(self.origins[i]).saturating_add(length))
    }

    /// Returns the mandatory part `[origin.max, origin.min + length.min)` of
    /// dimension `i`, or `None` if the latest start lies after the earliest
    /// stop.
    #[inline]
    pub fn mandatory<T>(&self, store: &Store<T>, i: usize) -> Option<ClosedOpenInterval<T>>
    where
        T: PrimInt + Signed,
    {
        let start = store.max(self.origins[i]);
        let stop = store.min(self.origins[i]).saturating_add(store.min(self.lengths[i]));
        ClosedOpenInterval::try_new(start, stop)
    }

    /// Returns the minimal length of dimension `i`.
    #[inline]
    pub fn min_length<T>(&self, store: &Store<T>, i: usize) -> T
    where
        T: PrimInt,
    {
        store.min(self.lengths[i])
    }

    /// Returns `true` if some dimension has a minimal length of zero or less.
    #[inline]
    pub fn has_zero_extent<T>(&self, store: &Store<T>) -> bool
    where
        T: PrimInt,
    {
        self.lengths.iter().any(|&l| store.min(l) <= T::zero())
    }

    /// Returns `true` if some length variable admits only negative values
    /// at its minimum.
    #[inline]
    pub fn has_negative_length<T>(&self, store: &Store<T>) -> bool
    where
        T: PrimInt,
    {
        self.lengths.iter().any(|&l| store.min(l) < T::zero())
    }

    /// Returns `true` if every variable is fixed and none of them was
    /// narrowed at the current decision level.
    pub fn is_settled<T>(&self, store: &Store<T>) -> bool
    where
        T: PrimInt,
    {
        let level = store.level();
        self.vars()
            .all(|v| store.is_singleton(v) && store.stamp(v) < level)
    }

    /// Returns the product of the minimal lengths, saturating at
    /// `T::max_value()`. Zero if any minimal length is zero.
    pub fn min_area<T>(&self, store: &Store<T>) -> T
    where
        T: PrimInt + Signed + SaturatingMul,
    {
        self.lengths.iter().fold(T::one(), |area, &l| {
            area.saturating_mul(&store.min(l).max(T::zero()))
        })
    }

    /// Returns `true` if the reaches of both rectangles intersect in every
    /// dimension.
    ///
    /// A rectangle with a zero minimal length in any dimension is never
    /// reported as overlapping, matching `min_area` treating it as taking
    /// no space.
    pub fn dom_overlap<T>(&self, other: &Rectangle, store: &Store<T>) -> bool
    where
        T: PrimInt + Signed,
    {
        debug_assert_eq!(
            self.dim(),
            other.dim(),
            "called `Rectangle::dom_overlap` with rectangles of different dimensionality"
        );

        if self.has_zero_extent(store) || other.has_zero_extent(store) {
            return false;
        }
        (0..self.dim()).all(|i| self.reach(store, i).intersects(other.reach(store, i)))
    }

    /// Describes the rectangle with its current domains.
    pub fn describe<T>(&self, store: &Store<T>) -> String
    where
        T: PrimInt + std::fmt::Display,
    {
        let join = |vars: &[VarIndex]| {
            vars.iter()
                .map(|&v| store.domain(v).to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "[origin: [{}], length: [{}]]",
            join(&self.origins),
            join(&self.lengths)
        )
    }
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let join = |vars: &[VarIndex]| {
            vars.iter()
                .map(|v| v.get().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "Rectangle(origin: [{}], length: [{}])",
            join(&self.origins),
            join(&self.lengths)
        )
    }
}

/// Builds rectangles from column-major collections: `origins[d][k]` and
/// `lengths[d][k]` are the variables of rectangle `k` in dimension `d`.
///
/// # Panics
///
/// Panics if there are no dimensions, if `origins` and `lengths` differ in
/// dimensionality, or if the columns differ in length.
pub fn rectangles_from_columns(origins: &[Vec<VarIndex>], lengths: &[Vec<VarIndex>]) -> Vec<Rectangle> {
    assert!(
        !origins.is_empty(),
        "called `rectangles_from_columns` with zero dimensions"
    );
    assert_eq!(
        origins.len(),
        lengths.len(),
        "called `rectangles_from_columns` with {} origin columns but {} length columns",
        origins.len(),
        lengths.len()
    );
    let count = origins[0].len();
    assert!(
        origins.iter().chain(lengths.iter()).all(|c| c.len() == count),
        "called `rectangles_from_columns` with columns of different lengths"
    );

    (0..count)
        .map(|k| {
            Rectangle::new(
                origins.iter().map(|column| column[k]),
                lengths.iter().map(|column| column[k]),
            )
        })
        .collect()
}

/// Builds two-dimensional rectangles from four parallel collections.
///
/// # Panics
///
/// Panics if the collections differ in length.
pub fn rectangles_from_parallel_2d(
    origins_x: &[VarIndex],
    origins_y: &[VarIndex],
    lengths_x: &[VarIndex],
    lengths_y: &[VarIndex],
) -> Vec<Rectangle> {
    rectangles_from_columns(
        &[origins_x.to_vec(), origins_y.to_vec()],
        &[lengths_x.to_vec(), lengths_y.to_vec()],
    )
}

/// Builds rectangles from rows laid out as in `Rectangle::from_row`.
pub fn rectangles_from_rows<R>(rows: &[R]) -> Vec<Rectangle>
where
    R: AsRef<[VarIndex]>,
{
    rows.iter().map(|row| Rectangle::from_row(row.as_ref())).collect()
}
