/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Cholesky factorization of symmetric positive-(semi)definite matrices.
//!
//! The work is done by [`Cholesky`], which hands the numerics to a
//! [`CholeskyBackend`] (the system LAPACK by default) and answers
//! solve, determinant, rank and inverse queries from the factor.

pub use lchol_linalg::{backend, Cholesky, CholeskyBackend, CholeskyError, FMatrix, Reference, Scalar};
#[cfg(feature = "lapack")]
pub use lchol_linalg::Lapacke;

pub mod version {
    pub fn get() -> &'static str { env!("CARGO_PKG_VERSION") }
}
