/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Approximate equality assertions for floating point data.
//!
//! ```ignore
//! assert_close!(abs=1e-12, chol.lower(), expected_lower);
//! assert_close!(rel=1e-8, abs=1e-12, det, 8.0, "bad determinant for {:?}", matrix);
//! ```

use ndarray::{ArrayBase, Data, Dimension};
use std::fmt;

pub const DEFAULT_NONZERO_TOL: f64 = 1e-9;

#[macro_export]
macro_rules! assert_close {
    ($($t:tt)*) => {
        $crate::assert_close_impl!{@parsing [$($t)*] [[@rel $crate::DEFAULT_NONZERO_TOL] [@abs 0.0]]}
    };
}

#[macro_export]
macro_rules! debug_assert_close {
    ($($t:tt)*) => {{
        #[cfg(debug_assertions)] {
            $crate::assert_close!{$($t)*}
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! assert_close_impl {
    (@parsing [rel=$tol:expr, $($rest:tt)*] [$($assignment:tt)*]) => {
        $crate::assert_close_impl!(@parsing [$($rest)*] [$($assignment)* [@rel $tol]]);
    };
    (@parsing [abs=$tol:expr, $($rest:tt)*] [$($assignment:tt)*]) => {
        $crate::assert_close_impl!(@parsing [$($rest)*] [$($assignment)* [@abs $tol]]);
    };
    (@parsing [$a:expr, $b:expr $(,)*] $assignments:tt) => {
        $crate::assert_close_impl!(@expand $assignments [@comp $a, $b] [@fmt "not nearly equal!"])
    };
    (@parsing [$a:expr, $b:expr, $($fmt:tt)+] $assignments:tt) => {
        $crate::assert_close_impl!(@expand $assignments [@comp $a, $b] [@fmt $($fmt)+])
    };
    (@expand [$($assignment:tt)*] [@comp $a:expr, $b:expr] [@fmt $($fmt:tt)+] ) => {
        #[allow(unused_mut)]
        #[allow(unused_assignments)]
        {
            let a = $a;
            let b = $b;

            let mut abs: f64;
            let mut rel: f64;
            $(
                $crate::assert_close_impl!{@stmt::assign [abs, rel] $assignment}
            )*

            if let Err(e) = $crate::CheckClose::check_close(&a, &b, $crate::Tolerances { abs, rel }) {
                panic!(
                "{} (tolerances: rel={}, abs={})\n left: {:?}\nright: {:?}\n{}",
                 format!($($fmt)*), rel, abs, a, b, e);
            }
        }
    };
    (@stmt::assign [$abs:ident, $rel:ident] [@abs $tol:expr]) => { $abs = $tol; };
    (@stmt::assign [$abs:ident, $rel:ident] [@rel $tol:expr]) => { $rel = $tol; };
}

/// `math.isclose` from Python 3.5.
#[inline]
pub fn is_close(a: f64, b: f64, Tolerances { abs, rel }: Tolerances) -> bool {
    assert!(rel >= 0.0);
    assert!(abs >= 0.0);

    // catch infinities of same sign
    if a == b { return true; }

    // catch infinities of opposite sign, avoiding infinite relative tolerance
    if a.is_infinite() || b.is_infinite() { return false; }

    // case for general values and NaN.
    (a - b).abs() < abs.max(rel * a.abs()).max(rel * b.abs())
}

#[derive(Debug, Copy, Clone)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

/// The first pair of elements found to differ.
#[derive(Debug, Clone)]
pub struct CheckCloseError<T = f64> {
    /// Position in iteration order (zero for scalars).
    pub index: usize,
    pub values: (T, T),
    pub tol: Tolerances,
}

impl<T: fmt::Debug> fmt::Display for CheckCloseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (ref left, ref right) = self.values;
        write!(f, "failed at element {}:
  left: {:?}
 right: {:?}
   tol: {:?}", self.index, left, right, self.tol)
    }
}

impl<T: fmt::Debug> std::error::Error for CheckCloseError<T> { }

impl<T> CheckCloseError<T> {
    fn at(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

pub trait CheckClose<Rhs: ?Sized = Self> {
    type Scalar;

    /// Test that all values of self and other are close.
    fn check_close(&self, other: &Rhs, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>;
}

macro_rules! impl_float {
    ($($F:ty)*) => {$(
        impl CheckClose for $F {
            type Scalar = $F;

            #[inline]
            fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<$F>> {
                match is_close(f64::from(*self), f64::from(*other), tol) {
                    true => Ok(()),
                    false => Err(CheckCloseError { index: 0, values: (*self, *other), tol }),
                }
            }
        }
    )*};
}

impl_float!{ f32 f64 }

impl<'a, T: ?Sized + CheckClose> CheckClose for &'a T {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { CheckClose::check_close(*self, *other, tol) }
}

impl<T: CheckClose> CheckClose for [T] {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    {
        assert_eq!(self.len(), other.len());
        check_pairs(self.iter().zip(other), tol)
    }
}

impl<T: CheckClose> CheckClose for Vec<T> {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { self[..].check_close(&other[..], tol) }
}

impl<T: CheckClose, const N: usize> CheckClose for [T; N] {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { self[..].check_close(&other[..], tol) }
}

/// Arrays must have identical shapes; the memory layouts may differ.
impl<T, S, S2, D> CheckClose<ArrayBase<S2, D>> for ArrayBase<S, D>
where
    T: CheckClose,
    S: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    type Scalar = T::Scalar;

    fn check_close(&self, other: &ArrayBase<S2, D>, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    {
        assert_eq!(self.shape(), other.shape(), "shape mismatch");
        check_pairs(self.iter().zip(other.iter()), tol)
    }
}

fn check_pairs<'a, 'b, T: CheckClose + 'a + 'b>(
    pairs: impl Iterator<Item = (&'a T, &'b T)>,
    tol: Tolerances,
) -> Result<(), CheckCloseError<T::Scalar>> {
    for (index, (a, b)) in pairs.enumerate() {
        a.check_close(b, tol).map_err(|e| e.at(index))?;
    }
    Ok(())
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, ShapeBuilder, Array2};

    #[test]
    fn macro_output_can_compile() {
        assert_close!(1.0, 1.0);
        assert_close!(abs=1e-8, 1.0, 1.0);
        assert_close!(rel=1e-8, abs=1e-8, 1.0, 1.0);
        assert_close!(1.0, 1.0,);
        assert_close!(abs=1e-8, 1.0, 1.0,);
        assert_close!(rel=1e-8, abs=1e-8, 1.0, 1.0,);
        assert_close!(abs=1e-6, 1.0f32, 1.0f32);
    }

    #[test]
    fn bad_parse_regression() {
        #[derive(Debug)] struct S;
        impl S { fn x(self) -> S { self } }
        impl CheckClose for S {
            type Scalar = f64;
            fn check_close(&self, _: &S, _: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>> { Ok(()) }
        }
        assert_close!(
            abs=1e-10,
            S.x().x().x(),
            S.x().x().x(),
        );
        debug_assert_close!(
            abs=1e-10,
            S.x().x().x(),
            S.x().x().x(),
        );
        assert_close!(
            abs=1e-10,
            S.x().x().x(),
            S.x().x().x(),
            "{}", "hello",
        );
    }

    #[test]
    #[should_panic]
    fn not_close() {
        assert_close!(abs=0.0, rel=0.0, 1.0, 1.1);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic)]
    fn debug_not_close() {
        debug_assert_close!(abs=0.0, rel=0.0, 1.0, 1.1);
    }

    #[test]
    fn nan_is_never_close() {
        let tol = Tolerances { abs: 1.0, rel: 1.0 };
        assert!(!is_close(f64::NAN, f64::NAN, tol));
        assert!(!is_close(f64::INFINITY, f64::NEG_INFINITY, tol));
        assert!(is_close(f64::INFINITY, f64::INFINITY, tol));
    }

    #[test]
    fn arrays_compare_by_logical_order() {
        let c = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let f = Array2::from_shape_vec((2, 2).f(), vec![1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_close!(abs=0.0, c.clone(), f.clone());
        assert_close!(abs=0.0, c.view(), f.view());
        assert_close!(abs=1e-12, arr1(&[0.1 + 0.2]), arr1(&[0.3]));
        assert_close!(abs=0.0, [1.0, 2.0], [1.0, 2.0]);
    }

    #[test]
    fn error_names_the_element() {
        let tol = Tolerances { abs: 1e-3, rel: 0.0 };
        let err = vec![1.0, 2.0, 3.0].check_close(&vec![1.0, 2.5, 3.0], tol).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.values, (2.0, 2.5));
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn arrays_of_different_shape() {
        assert_close!(arr2(&[[1.0, 2.0]]), arr2(&[[1.0], [2.0]]));
    }
}
