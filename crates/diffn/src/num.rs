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

use num_traits::{PrimInt, SaturatingMul, Signed};

/// The integer types rectangle coordinates and lengths are expressed in.
///
/// Implemented for every signed primitive integer.
pub trait Coordinate:
    PrimInt + Signed + SaturatingMul + std::fmt::Display + std::fmt::Debug + 'static
{
}

impl<T> Coordinate for T where
    T: PrimInt + Signed + SaturatingMul + std::fmt::Display + std::fmt::Debug + 'static
{
}

/// Multiplies `factors`, saturating at `T::max_value()`.
#[inline]
pub fn saturating_product<T, I>(factors: I) -> T
where
    T: Coordinate,
    I: IntoIterator<Item = T>,
{
    factors
        .into_iter()
        .fold(T::one(), |product, factor| product.saturating_mul(&factor))
}
