/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::{CholeskyBackend, CholeskyError, DefaultBackend, FMatrix, Scalar};
use crate::routine;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};

type Result<T> = std::result::Result<T, CholeskyError>;

/// Cholesky decomposition `A = L L^T` of a symmetric positive-(semi)definite matrix.
///
/// Only the lower triangle of `A` is ever read.
///
/// The factor can then be used to compute `A^-1 x`, `A^-1 M`, `M A^-1 M^T`,
/// and `A^-1` itself (though the latter rarely needs to be formed),
/// along with `det(A)` and the rank at which factorization broke down.
///
/// ```ignore
/// let a = arr2(&[[4.0, 2.0], [2.0, 3.0]]);
/// let chol = Cholesky::<f64>::from_matrix(&a)?;
/// assert_eq!(chol.rank(), 2);
/// let x = chol.backsub(&arr1(&[1.0, 2.0]))?; // A^-1 [1, 2]
/// ```
///
/// # Rank deficiency
///
/// A matrix that is not positive definite is *not* an error.  Factorization
/// stops at the first leading minor that fails, and [`rank`] reports how many
/// columns of `L` are trustworthy.  Everything else ([`determinant`],
/// [`backsub`], [`inverse`], ...) assumes full rank and does not check it;
/// past the failure point the factor holds whatever the backend left there.
///
/// [`rank`]: Cholesky::rank
/// [`determinant`]: Cholesky::determinant
/// [`backsub`]: Cholesky::backsub
/// [`inverse`]: Cholesky::inverse
#[derive(Debug, Clone)]
pub struct Cholesky<A: Scalar = f64, B = DefaultBackend> {
    // Backend layout.  Lower triangle is L, strict upper triangle is zero.
    // invariant: square, with the dimension given at construction
    factor: FMatrix<A>,
    rank: usize,
    factorized: bool,
    backend: B,
}

impl<A: Scalar> Cholesky<A>
where DefaultBackend: CholeskyBackend<A>,
{
    /// Create an empty decomposition for `size x size` matrices, for later use with [`compute`].
    ///
    /// [`compute`]: Cholesky::compute
    pub fn new(size: usize) -> Self
    { Self::with_backend(size, DefaultBackend::default()) }

    /// Decompose a square matrix.  The dimension is taken from the matrix.
    pub fn from_matrix<S>(matrix: &ArrayBase<S, Ix2>) -> Result<Self>
    where S: Data<Elem = A>,
    { Self::from_matrix_with_backend(matrix, DefaultBackend::default()) }
}

impl<A: Scalar, B: CholeskyBackend<A>> Cholesky<A, B> {
    pub fn with_backend(size: usize, backend: B) -> Self {
        Cholesky {
            factor: FMatrix::zeros((size, size)),
            rank: 0,
            factorized: false,
            backend,
        }
    }

    pub fn from_matrix_with_backend<S>(matrix: &ArrayBase<S, Ix2>, backend: B) -> Result<Self>
    where S: Data<Elem = A>,
    {
        check_dim("matrix column count", matrix.nrows(), matrix.ncols())?;

        let mut chol = Self::with_backend(matrix.nrows(), backend);
        chol.compute(matrix)?;
        Ok(chol)
    }

    /// Factorize a new matrix of the same dimension, replacing the old factor.
    ///
    /// On error, the previous factorization is left untouched.
    pub fn compute<S>(&mut self, matrix: &ArrayBase<S, Ix2>) -> Result<()>
    where S: Data<Elem = A>,
    {
        let n = self.dim();
        check_dim("matrix column count", matrix.nrows(), matrix.ncols())?;
        check_dim("matrix row count", n, matrix.nrows())?;

        let mut factor = FMatrix::from(matrix);
        let info = match n {
            0 => 0,
            _ => self.backend.factorize_lower(n, factor.f_order_data_mut()),
        };
        trace!("{}: n = {}, info = {}", routine::FACTORIZE, n, info);

        let rank = match info {
            0 => n,
            info if info > 0 => {
                let rank = info as usize - 1;
                debug!(
                    "matrix is not positive definite (leading minor {} of {}); rank = {}",
                    info, n, rank,
                );
                rank
            },
            info => return Err(CholeskyError::InvalidArgument {
                routine: routine::FACTORIZE,
                arg: -info,
            }),
        };

        // the backend leaves the upper triangle alone, so it still holds input data
        factor.zero_strict_upper();

        self.factor = factor;
        self.rank = rank;
        self.factorized = true;
        Ok(())
    }

    /// The number of rows (and columns) of the matrices this decomposes.
    pub fn dim(&self) -> usize { self.factor.nrows() }

    /// Size of the leading block that was verified to be positive definite.
    ///
    /// Equal to [`dim`] for a positive definite matrix. Zero until the first [`compute`].
    ///
    /// [`dim`]: Cholesky::dim
    /// [`compute`]: Cholesky::compute
    pub fn rank(&self) -> usize { self.rank }

    pub fn is_full_rank(&self) -> bool { self.factorized && self.rank == self.dim() }

    pub fn is_factorized(&self) -> bool { self.factorized }

    pub fn backend(&self) -> &B { &self.backend }

    /// Compute `A^-1 v`.
    pub fn backsub<S>(&self, v: &ArrayBase<S, Ix1>) -> Result<Array1<A>>
    where S: Data<Elem = A>,
    {
        check_dim("right-hand side length", self.dim(), v.len())?;
        self.check_factorized()?;

        let mut x = v.to_vec();
        self.solve_in_place(1, &mut x)?;
        Ok(Array1::from(x))
    }

    /// Compute `A^-1 M`, solving all columns of `M` at once.
    ///
    /// The output is in column-major order.
    pub fn backsub_matrix<S>(&self, m: &ArrayBase<S, Ix2>) -> Result<Array2<A>>
    where S: Data<Elem = A>,
    {
        check_dim("right-hand side row count", self.dim(), m.nrows())?;
        self.check_factorized()?;

        let mut x = FMatrix::from(m);
        self.solve_in_place(m.ncols(), x.f_order_data_mut())?;
        Ok(x.into_inner())
    }

    /// Compute `v^T A^-1 v`, e.g. the squared Mahalanobis distance when `A` is a covariance.
    pub fn mahalanobis<S>(&self, v: &ArrayBase<S, Ix1>) -> Result<A>
    where S: Data<Elem = A>,
    { Ok(v.dot(&self.backsub(v)?)) }

    /// Compute `M A^-1 M^T` for a matrix `M` with [`dim`] columns.
    ///
    /// [`dim`]: Cholesky::dim
    pub fn transform_inverse<S>(&self, m: &ArrayBase<S, Ix2>) -> Result<Array2<A>>
    where S: Data<Elem = A>,
    {
        check_dim("transform column count", self.dim(), m.ncols())?;
        let inv_mt = self.backsub_matrix(&m.t())?;
        Ok(m.dot(&inv_mt))
    }

    /// A row-major copy of `L`, with zeros above the diagonal.
    pub fn lower(&self) -> Array2<A> { self.factor.to_c_order() }

    /// `L L^T`, i.e. the matrix that was factorized (assuming full rank).
    pub fn reconstruct(&self) -> Array2<A> {
        let lower = self.lower();
        lower.dot(&lower.t())
    }

    /// `det(A)`, as the squared product of the diagonal of `L`.
    ///
    /// Not meaningful unless [`is_full_rank`]; this is not checked.
    ///
    /// [`is_full_rank`]: Cholesky::is_full_rank
    pub fn determinant(&self) -> A {
        let det = self.factor.diag().iter().fold(A::one(), |acc, &x| acc * x);
        det * det
    }

    /// `ln det(A)`, which stays finite long after [`determinant`] overflows.
    ///
    /// Not meaningful unless [`is_full_rank`]; this is not checked.
    ///
    /// [`determinant`]: Cholesky::determinant
    /// [`is_full_rank`]: Cholesky::is_full_rank
    pub fn log_determinant(&self) -> A {
        let half = self.factor.diag().iter().fold(A::zero(), |acc, &x| acc + x.ln());
        half + half
    }

    /// Explicitly compute `A^-1`.
    ///
    /// Not meaningful unless [`is_full_rank`]; this is not checked.
    ///
    /// [`is_full_rank`]: Cholesky::is_full_rank
    pub fn inverse(&self) -> Result<Array2<A>> {
        self.check_factorized()?;

        let n = self.dim();
        let mut inv = self.factor.clone();
        if n > 0 {
            let info = self.backend.invert_lower(n, inv.f_order_data_mut());
            trace!("{}: n = {}, info = {}", routine::INVERT, n, info);
            check_info(routine::INVERT, info)?;
        }

        // only the lower half was written
        let mut inv = inv.into_inner();
        for i in 1..n {
            for j in 0..i {
                inv[(j, i)] = inv[(i, j)];
            }
        }
        Ok(inv)
    }

    fn solve_in_place(&self, nrhs: usize, b: &mut [A]) -> Result<()> {
        let n = self.dim();
        if n == 0 || nrhs == 0 {
            return Ok(());
        }

        let info = self.backend.solve_lower(n, nrhs, self.factor.f_order_data(), b);
        trace!("{}: n = {}, nrhs = {}, info = {}", routine::SOLVE, n, nrhs, info);
        check_info(routine::SOLVE, info)
    }

    fn check_factorized(&self) -> Result<()> {
        match self.factorized {
            true => Ok(()),
            false => Err(CholeskyError::NotFactorized),
        }
    }
}

fn check_dim(what: &'static str, expected: usize, found: usize) -> Result<()> {
    match expected == found {
        true => Ok(()),
        false => Err(CholeskyError::ShapeMismatch { what, expected, found }),
    }
}

fn check_info(routine: &'static str, info: i32) -> Result<()> {
    match info {
        0 => Ok(()),
        info if info < 0 => Err(CholeskyError::InvalidArgument { routine, arg: -info }),
        info => Err(CholeskyError::Singular { routine, index: info as usize }),
    }
}
