/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The numerical kernels behind [`Cholesky`](crate::Cholesky).
//!
//! All primitives operate on the lower triangle of a square, contiguous,
//! column-major buffer, and report back with LAPACK's `info` convention:
//!
//! * `0` on success,
//! * `k > 0` if the `k`th (1-based) leading minor is not positive definite
//!   (factorization) or the `k`th diagonal element of the factor is zero
//!   (inversion),
//! * `-i` if argument number `i` was bad.

use crate::Scalar;
use std::convert::TryFrom;

/// A provider of Cholesky primitives for element type `A`.
///
/// None of these may read or write the strict upper triangle of `a` or `factor`.
pub trait CholeskyBackend<A: Scalar> {
    /// `?potrf` with `uplo = 'L'`: overwrite the lower triangle of `a` with `L`.
    fn factorize_lower(&self, n: usize, a: &mut [A]) -> i32;

    /// `?potrs` with `uplo = 'L'`: overwrite the `n x nrhs` matrix `b` with
    /// the solution to `(L L^T) x = b`.
    fn solve_lower(&self, n: usize, nrhs: usize, factor: &[A], b: &mut [A]) -> i32;

    /// `?potri` with `uplo = 'L'`: overwrite the lower triangle of `a` (which
    /// holds `L`) with the lower triangle of `(L L^T)^-1`.
    fn invert_lower(&self, n: usize, a: &mut [A]) -> i32;
}

impl<'a, A: Scalar, B: CholeskyBackend<A> + ?Sized> CholeskyBackend<A> for &'a B {
    fn factorize_lower(&self, n: usize, a: &mut [A]) -> i32
    { (**self).factorize_lower(n, a) }

    fn solve_lower(&self, n: usize, nrhs: usize, factor: &[A], b: &mut [A]) -> i32
    { (**self).solve_lower(n, nrhs, factor, b) }

    fn invert_lower(&self, n: usize, a: &mut [A]) -> i32
    { (**self).invert_lower(n, a) }
}

#[cfg(feature = "lapack")]
pub type DefaultBackend = Lapacke;
#[cfg(not(feature = "lapack"))]
pub type DefaultBackend = Reference;

//------------------------------------------------------------------------------

#[cfg(feature = "lapack")]
pub use self::lapacke_impl::Lapacke;

#[cfg(feature = "lapack")]
mod lapacke_impl {
    use super::*;
    use lapacke::Layout;

    /// Calls into the native LAPACK through LAPACKe.
    ///
    /// Uses the `_work` entry points, which skip LAPACKe's NaN screening; a NaN
    /// in the matrix is a failed pivot like any other, not a bad argument.
    ///
    /// Zero-sized problems never reach this; LAPACKe hates size-zero arrays.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Lapacke;

    macro_rules! impl_lapacke {
        ($A:ty, $potrf:ident, $potrs:ident, $potri:ident) => {
            impl CholeskyBackend<$A> for Lapacke {
                fn factorize_lower(&self, n: usize, a: &mut [$A]) -> i32 {
                    let n = match lapack_int(n) { Some(n) => n, None => return -2 };
                    if a.len() < square_len(n) { return -4; }
                    let info = unsafe { lapacke::$potrf(Layout::ColumnMajor, b'L', n, a, n.max(1)) };
                    first_bad_pivot(n as usize, a, info)
                }

                fn solve_lower(&self, n: usize, nrhs: usize, factor: &[$A], b: &mut [$A]) -> i32 {
                    let n = match lapack_int(n) { Some(n) => n, None => return -2 };
                    let nrhs = match lapack_int(nrhs) { Some(nrhs) => nrhs, None => return -3 };
                    if factor.len() < square_len(n) { return -5; }
                    if b.len() < (n as usize) * (nrhs as usize) { return -7; }
                    unsafe { lapacke::$potrs(Layout::ColumnMajor, b'L', n, nrhs, factor, n.max(1), b, n.max(1)) }
                }

                fn invert_lower(&self, n: usize, a: &mut [$A]) -> i32 {
                    let n = match lapack_int(n) { Some(n) => n, None => return -2 };
                    if a.len() < square_len(n) { return -4; }
                    unsafe { lapacke::$potri(Layout::ColumnMajor, b'L', n, a, n.max(1)) }
                }
            }
        };
    }

    impl_lapacke!(f32, spotrf_work, spotrs_work, spotri_work);
    impl_lapacke!(f64, dpotrf_work, dpotrs_work, dpotri_work);

    fn lapack_int(n: usize) -> Option<i32> { i32::try_from(n).ok() }

    fn square_len(n: i32) -> usize { (n as usize) * (n as usize) }

    // Not every LAPACK checks its pivots for NaN; report the first one that
    // isn't positive, just as `?potf2` does.
    fn first_bad_pivot<A: Scalar>(n: usize, factor: &[A], info: i32) -> i32 {
        if info < 0 {
            return info;
        }
        let checked = match info {
            0 => n,
            k => k as usize - 1,
        };
        match (0..checked).find(|&j| !(factor[j + j * n] > A::zero())) {
            Some(j) => (j + 1) as i32,
            None => info,
        }
    }
}

//------------------------------------------------------------------------------

/// Unblocked Cholesky kernels written in plain Rust.
///
/// These follow the reference LAPACK routines (`?potf2`, `?potrs`, `?trti2` and
/// `?lauu2`) one column at a time, and are meant for checking other backends
/// and for builds without a native LAPACK. They are `O(n^3)` with no attempt
/// at cache blocking.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reference;

impl<A: Scalar> CholeskyBackend<A> for Reference {
    fn factorize_lower(&self, n: usize, a: &mut [A]) -> i32 {
        if too_big(n) { return -2; }
        if a.len() < n * n { return -4; }
        let at = |i: usize, j: usize| i + j * n;

        for j in 0..n {
            let mut ajj = a[at(j, j)];
            for k in 0..j {
                ajj = ajj - a[at(j, k)] * a[at(j, k)];
            }
            // (also catches NaN)
            if !(ajj > A::zero()) {
                a[at(j, j)] = ajj;
                return (j + 1) as i32;
            }
            let ajj = ajj.sqrt();
            a[at(j, j)] = ajj;

            for i in j + 1..n {
                let mut aij = a[at(i, j)];
                for k in 0..j {
                    aij = aij - a[at(i, k)] * a[at(j, k)];
                }
                a[at(i, j)] = aij / ajj;
            }
        }
        0
    }

    fn solve_lower(&self, n: usize, nrhs: usize, factor: &[A], b: &mut [A]) -> i32 {
        if too_big(n) { return -2; }
        if too_big(nrhs) { return -3; }
        if factor.len() < n * n { return -5; }
        if b.len() < n * nrhs { return -7; }
        if n == 0 { return 0; }
        let at = |i: usize, j: usize| i + j * n;

        for x in b.chunks_mut(n).take(nrhs) {
            // L y = b
            for i in 0..n {
                let mut xi = x[i];
                for k in 0..i {
                    xi = xi - factor[at(i, k)] * x[k];
                }
                x[i] = xi / factor[at(i, i)];
            }
            // L^T x = y
            for i in (0..n).rev() {
                let mut xi = x[i];
                for k in i + 1..n {
                    xi = xi - factor[at(k, i)] * x[k];
                }
                x[i] = xi / factor[at(i, i)];
            }
        }
        0
    }

    fn invert_lower(&self, n: usize, a: &mut [A]) -> i32 {
        if too_big(n) { return -2; }
        if a.len() < n * n { return -4; }
        let at = |i: usize, j: usize| i + j * n;

        if let Some(i) = (0..n).find(|&i| a[at(i, i)] == A::zero()) {
            return (i + 1) as i32;
        }

        // L^-1, in place.  The trailing block is already inverted when we
        // reach column j, so column j is just a product with it.
        for j in (0..n).rev() {
            let ajj = A::one() / a[at(j, j)];
            a[at(j, j)] = ajj;
            // each row only reads entries of column j above it
            for i in (j + 1..n).rev() {
                let mut sum = A::zero();
                for k in j + 1..=i {
                    sum = sum + a[at(i, k)] * a[at(k, j)];
                }
                a[at(i, j)] = -ajj * sum;
            }
        }

        // L^-T L^-1, lower triangle only.
        let inv_l = a[..n * n].to_vec();
        for j in 0..n {
            for i in j..n {
                let mut sum = A::zero();
                for k in i..n {
                    sum = sum + inv_l[at(k, i)] * inv_l[at(k, j)];
                }
                a[at(i, j)] = sum;
            }
        }
        0
    }
}

// keep the status codes meaningful
fn too_big(n: usize) -> bool { i32::try_from(n).is_err() }
