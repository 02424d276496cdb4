/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;
use crate::config::{self, Backend, Precision, Settings};
use crate::report::{Report, Solve};
use lchol_linalg::{Cholesky, CholeskyBackend, Reference, Scalar};
use ndarray::{Array1, Array2};

/// Factorize the configured matrix and compute everything the config asks for.
pub fn run(settings: &Settings) -> FailResult<Report> {
    let matrix = config::matrix_from_rows("matrix", &settings.matrix)?;
    debug!("backend = {:?}, precision = {:?}", settings.backend, settings.precision);

    match (settings.backend, settings.precision) {
        (Backend::Reference, Precision::F64) => run_with::<f64, _>(settings, &matrix, Reference),
        (Backend::Reference, Precision::F32) => run_with::<f32, _>(settings, &matrix, Reference),

        #[cfg(feature = "lapack")]
        (Backend::Lapack, Precision::F64) => run_with::<f64, _>(settings, &matrix, lchol_linalg::Lapacke),
        #[cfg(feature = "lapack")]
        (Backend::Lapack, Precision::F32) => run_with::<f32, _>(settings, &matrix, lchol_linalg::Lapacke),

        #[cfg(not(feature = "lapack"))]
        (Backend::Lapack, _) => bail!("this build of lchol does not include the LAPACK backend"),
    }
}

fn run_with<A, B>(settings: &Settings, matrix: &Array2<f64>, backend: B) -> FailResult<Report>
where
    A: Scalar,
    B: CholeskyBackend<A>,
{
    let chol = Cholesky::from_matrix_with_backend(&narrow_matrix::<A>(matrix)?, backend)?;
    let (dim, rank) = (chol.dim(), chol.rank());
    info!("Factorized a {}x{} matrix (rank {})", dim, dim, rank);

    let full_rank = chol.is_full_rank();
    if !full_rank {
        warn!(
            "Matrix is not positive definite (leading minor {} failed). \
             Only the partial factor will be written.",
            rank + 1,
        );
    }

    let mut report = Report {
        dim,
        rank,
        precision: settings.precision,
        backend: settings.backend,
        lower: rows_of(&chol.lower()),
        determinant: None,
        log_determinant: None,
        inverse: None,
        solves: vec![],
        transformed: None,
    };
    if !full_rank {
        return Ok(report);
    }

    report.determinant = Some(widen(chol.determinant()));
    report.log_determinant = Some(widen(chol.log_determinant()));

    if settings.want_inverse {
        report.inverse = Some(rows_of(&chol.inverse()?));
    }

    for rhs in &settings.rhs {
        let v = rhs.iter().map(|&x| narrow::<A>(x)).collect::<FailResult<Array1<A>>>()?;
        report.solves.push(Solve {
            rhs: rhs.clone(),
            solution: chol.backsub(&v)?.iter().map(|&x| widen(x)).collect(),
            mahalanobis: widen(chol.mahalanobis(&v)?),
        });
    }

    if let Some(rows) = &settings.transform {
        let m = narrow_matrix::<A>(&config::matrix_from_rows("transform", rows)?)?;
        report.transformed = Some(rows_of(&chol.transform_inverse(&m)?));
    }

    Ok(report)
}

fn narrow<A: Scalar>(x: f64) -> FailResult<A> {
    num_traits::cast(x).ok_or_else(|| format_err!("{} cannot be represented at the requested precision", x))
}

fn narrow_matrix<A: Scalar>(m: &Array2<f64>) -> FailResult<Array2<A>> {
    let data = m.iter().map(|&x| narrow(x)).collect::<FailResult<Vec<A>>>()?;
    Ok(Array2::from_shape_vec(m.dim(), data)?)
}

// (never fails for f32 or f64)
fn widen<A: Scalar>(x: A) -> f64 { num_traits::cast(x).unwrap_or(f64::NAN) }

fn rows_of<A: Scalar>(m: &Array2<A>) -> Vec<Vec<f64>> {
    m.outer_iter().map(|row| row.iter().map(|&x| widen(x)).collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::YamlRead;

    fn settings(yaml: &str) -> Settings { Settings::from_reader(yaml.as_bytes()).unwrap() }

    #[test]
    fn two_by_two() {
        let report = run(&settings("
matrix: [[4, 2], [2, 3]]
backend: reference
rhs: [[1, 2]]
transform: [[1, 0], [0, 1]]
")).unwrap();

        assert_eq!((report.dim, report.rank), (2, 2));
        assert!(report.is_full_rank());
        assert_close!(abs=1e-12, report.lower.concat(), vec![2.0, 0.0, 1.0, 2f64.sqrt()]);
        assert_close!(rel=1e-12, report.determinant.unwrap(), 8.0);
        assert_close!(rel=1e-12, report.log_determinant.unwrap(), 8f64.ln());

        let inverse = vec![0.375, -0.25, -0.25, 0.5];
        assert_close!(abs=1e-12, report.inverse.unwrap().concat(), inverse.clone());
        // M = I
        assert_close!(abs=1e-12, report.transformed.unwrap().concat(), inverse);

        let solve = &report.solves[0];
        assert_close!(abs=1e-12, solve.solution.clone(), vec![-0.125, 0.75]);
        assert_close!(abs=1e-12, solve.mahalanobis, 1.375);
    }

    #[test]
    fn single_precision() {
        let report = run(&settings("
matrix: [[4, 0], [0, 9]]
precision: f32
backend: reference
want-inverse: false
")).unwrap();
        assert_eq!(report.precision, Precision::F32);
        assert_close!(rel=1e-6, report.determinant.unwrap(), 36.0);
        assert_eq!(report.inverse, None);
    }

    #[test]
    fn rank_deficient() {
        let report = run(&settings("
matrix: [[1, 1, 0], [1, 1, 0], [0, 0, 1]]
backend: reference
rhs: [[1, 1, 1]]
")).unwrap();
        assert_eq!(report.rank, 1);
        assert_eq!(report.determinant, None);
        assert_eq!(report.inverse, None);
        assert!(report.solves.is_empty());
        assert_eq!(report.lower[0], vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn nan_matrix_is_not_an_error() {
        for backend in &["reference", "lapack"] {
            if cfg!(not(feature = "lapack")) && *backend == "lapack" {
                continue;
            }
            let yaml = format!("matrix: [[.nan, 0], [0, 1]]\nbackend: {}", backend);
            let report = run(&settings(&yaml)).unwrap();
            assert_eq!(report.rank, 0, "{}", backend);
            assert_eq!(report.determinant, None);
        }
    }

    #[test]
    fn bad_shapes() {
        assert!(run(&settings("matrix: [[1, 2, 3], [4, 5, 6]]\nbackend: reference")).is_err());
        assert!(run(&settings("matrix: [[1, 0], [0]]\nbackend: reference")).is_err());
        assert!(run(&settings("matrix: [[1, 0], [0, 1]]\nbackend: reference\nrhs: [[1]]")).is_err());
        assert!(run(&settings("matrix: [[1, 0], [0, 1]]\nbackend: reference\ntransform: [[1]]")).is_err());
    }

    #[cfg(feature = "lapack")]
    #[test]
    fn lapack() {
        let report = run(&settings("matrix: [[4, 2], [2, 3]]\nbackend: lapack")).unwrap();
        assert_close!(rel=1e-12, report.determinant.unwrap(), 8.0);
        assert_close!(abs=1e-12, report.inverse.unwrap().concat(), vec![0.375, -0.25, -0.25, 0.5]);
    }

    #[cfg(not(feature = "lapack"))]
    #[test]
    fn lapack_unavailable() {
        assert!(run(&settings("matrix: [[1]]\nbackend: lapack")).is_err());
    }
}
