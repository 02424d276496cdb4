/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use ndarray::{Array, Array2, ArrayBase, ArrayView2, Ix2, ShapeBuilder};
use num_traits::Zero;

/// Owned, contiguous, Fortran-order matrix data.
///
/// This is the layout LAPACK works in, so a `FMatrix` can be handed to
/// a backend as a flat slice with `lda == rows`.
#[derive(Debug, Clone)]
pub struct FMatrix<A = f64>(
    // invariant: .strides[0] == 1
    // invariant: .strides[1] == .nrows()
    // invariant: .len() == product of dims
    Array2<A>
);

impl<A> FMatrix<A> {
    pub fn into_inner(self) -> Array2<A> { self.0 }
    pub fn f_order_data(&self) -> &[A] { self.0.as_slice_memory_order().expect("(BUG) not f-order!!") }
    pub fn f_order_data_mut(&mut self) -> &mut [A] { self.0.as_slice_memory_order_mut().expect("(BUG) not f-order!!") }

    /// The leading dimension, as LAPACK calls it.
    pub fn stride(&self) -> usize { self.nrows() }
}

impl<A: Clone + Zero> FMatrix<A> {
    pub fn zeros((rows, cols): (usize, usize)) -> Self {
        FMatrix(Array2::zeros((rows, cols).f()))
    }

    /// Overwrite every element strictly above the diagonal with zero.
    pub fn zero_strict_upper(&mut self) {
        let cols = self.ncols();
        let rows = self.nrows();
        // column-major, so walk each column's head
        for (col, column) in self.f_order_data_mut().chunks_mut(rows.max(1)).take(cols).enumerate() {
            for x in column.iter_mut().take(col.min(rows)) {
                *x = A::zero();
            }
        }
    }
}

impl<A: Clone> FMatrix<A> {
    /// Copy into a standard (row-major) array.
    pub fn to_c_order(&self) -> Array2<A> {
        self.0.as_standard_layout().into_owned()
    }
}

impl<A> std::ops::Deref for FMatrix<A> {
    type Target = Array2<A>;

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl<A: Clone> From<Array2<A>> for FMatrix<A> {
    fn from(arr: Array2<A>) -> Self {
        if arr.t().is_standard_layout() {
            FMatrix(arr)
        } else {
            arr.view().into()
        }
    }
}

impl<'a, A: Clone> From<ArrayView2<'a, A>> for FMatrix<A> {
    fn from(arr: ArrayView2<'a, A>) -> Self {
        let dim = arr.raw_dim();
        if arr.t().is_standard_layout() {
            if let Some(data) = arr.as_slice_memory_order() {
                return FMatrix(Array::from_shape_vec(dim.f(), data.to_vec()).expect("BUG"));
            }
        }
        FMatrix(Array::from_shape_fn(dim.f(), |ix| arr[ix].clone()))
    }
}

impl<'a, A: Clone, S> From<&'a ArrayBase<S, Ix2>> for FMatrix<A>
where S: ndarray::Data<Elem = A>,
{
    fn from(arr: &'a ArrayBase<S, Ix2>) -> Self {
        arr.view().into()
    }
}
