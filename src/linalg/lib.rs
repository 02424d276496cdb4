/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

#[macro_use]
extern crate log;
#[cfg(feature = "lapack")]
extern crate lapack_src;
#[cfg(test)]
#[macro_use]
extern crate lchol_assert_close;

pub use crate::f_matrix::FMatrix;
mod f_matrix;

pub use crate::backend::{CholeskyBackend, DefaultBackend, Reference};
#[cfg(feature = "lapack")]
pub use crate::backend::Lapacke;
pub mod backend;

pub use crate::cholesky::Cholesky;
mod cholesky;

use std::fmt;

/// Floating point types that the backends can factorize.
pub trait Scalar
    : ndarray::LinalgScalar
    + num_traits::Float
    + fmt::Debug
    + fmt::Display
    + Send + Sync
{ }

impl Scalar for f32 { }
impl Scalar for f64 { }

/// Names used for the backend primitives in error messages.
pub mod routine {
    pub const FACTORIZE: &str = "potrf";
    pub const SOLVE: &str = "potrs";
    pub const INVERT: &str = "potri";
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CholeskyError {
    /// An argument's dimension disagrees with the adapter's.
    ///
    /// Always detected before the backend is called.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// The backend rejected argument number `arg`.
    ///
    /// This indicates a bug (in the adapter or the backend), never bad matrix data.
    #[error("bad arg number {arg} to {routine}")]
    InvalidArgument {
        routine: &'static str,
        arg: i32,
    },

    /// The backend met an exactly zero pivot at `index` (1-based) while
    /// solving or inverting.
    #[error("{routine} found a zero diagonal element at index {index}; the factor is singular")]
    Singular {
        routine: &'static str,
        index: usize,
    },

    #[error("no matrix has been factorized yet")]
    NotFactorized,
}
