/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::config::{Backend, Precision};

/// Everything `lchol` writes out.
///
/// Quantities that assume a positive definite matrix are omitted
/// when the factorization stopped early.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Report {
    pub dim: usize,
    pub rank: usize,
    pub precision: Precision,
    pub backend: Backend,
    /// Rows of `L`.
    pub lower: Vec<Vec<f64>>,
    pub determinant: Option<f64>,
    pub log_determinant: Option<f64>,
    pub inverse: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub solves: Vec<Solve>,
    /// Rows of `M A^-1 M^T`.
    pub transformed: Option<Vec<Vec<f64>>>,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Solve {
    pub rhs: Vec<f64>,
    pub solution: Vec<f64>,
    pub mahalanobis: f64,
}

impl Report {
    pub fn is_full_rank(&self) -> bool { self.rank == self.dim }
}
