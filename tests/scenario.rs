#[macro_use] extern crate lchol_assert_close;

use lchol::{Cholesky, CholeskyBackend, CholeskyError, Reference, Scalar};
use ndarray::{arr1, arr2, Array1, Array2};
use rand::Rng;

fn random_spd(rng: &mut impl Rng, n: usize) -> Array2<f64> {
    let x = Array2::from_shape_fn((n, n), |_| 1.0 - 2.0 * rng.gen::<f64>());
    x.dot(&x.t()) + Array2::<f64>::eye(n) * n as f64
}

fn check_two_by_two<B: CholeskyBackend<f64>>(backend: B) {
    let a = arr2(&[[4.0, 2.0], [2.0, 3.0]]);
    let chol = Cholesky::from_matrix_with_backend(&a, backend).unwrap();

    assert_eq!(chol.rank(), 2);
    assert_close!(rel=1e-5, abs=1e-12, chol.lower(), arr2(&[[2.0, 0.0], [1.0, 1.41421356]]));
    assert_close!(rel=1e-12, chol.determinant(), 8.0);
    assert_close!(abs=1e-12, chol.inverse().unwrap(), arr2(&[[0.375, -0.25], [-0.25, 0.5]]));

    let b = arr1(&[1.0, 2.0]);
    let x = chol.backsub(&b).unwrap();
    assert_close!(abs=1e-12, a.dot(&x), b.clone());
    assert_eq!(chol.mahalanobis(&b).unwrap(), b.dot(&x));
}

#[test]
fn two_by_two_reference() { check_two_by_two(Reference); }

#[cfg(feature = "lapack")]
#[test]
fn two_by_two_lapack() { check_two_by_two(lchol::Lapacke); }

fn check_properties<A, B>(chol: &Cholesky<A, B>, a: &Array2<A>, b: &Array1<A>, tol: f64)
where
    A: Scalar,
    B: CholeskyBackend<A>,
{
    let n = a.nrows();
    let to_f64 = |m: Array2<A>| m.mapv(|x| x.to_f64().unwrap());

    assert_eq!(chol.rank(), n);
    let lower = chol.lower();
    assert_close!(abs=tol, to_f64(lower.dot(&lower.t())), to_f64(a.clone()));
    assert_close!(abs=tol, to_f64(chol.inverse().unwrap().dot(a)), Array2::<f64>::eye(n));

    let x = chol.backsub(b).unwrap();
    let ax = a.dot(&x).mapv(|x| x.to_f64().unwrap());
    assert_close!(abs=tol, ax, b.mapv(|x| x.to_f64().unwrap()));

    // det(A) = det(L)^2 = exp(log det(A))
    let det = chol.determinant().to_f64().unwrap();
    assert_close!(rel=tol, det, chol.log_determinant().to_f64().unwrap().exp());
}

#[test]
fn random_spd_matrices() {
    let mut rng = ::rand::thread_rng();
    for _ in 0..30 {
        let n = rng.gen_range(1, 12);
        let a = random_spd(&mut rng, n);
        let b = Array1::from_shape_fn(n, |_| rng.gen::<f64>());

        let chol = Cholesky::from_matrix(&a).unwrap();
        check_properties(&chol, &a, &b, 1e-9);

        let a32 = a.mapv(|x| x as f32);
        let b32 = b.mapv(|x| x as f32);
        let chol32 = Cholesky::from_matrix(&a32).unwrap();
        check_properties(&chol32, &a32, &b32, 1e-3);
    }
}

#[test]
fn reuse_for_many_matrices() {
    let mut rng = ::rand::thread_rng();
    let mut chol = Cholesky::<f64>::new(5);
    assert!(!chol.is_factorized());
    for _ in 0..5 {
        let a = random_spd(&mut rng, 5);
        chol.compute(&a).unwrap();
        assert_close!(abs=1e-9, chol.reconstruct(), a);
    }

    match chol.compute(&random_spd(&mut rng, 4)) {
        Err(CholeskyError::ShapeMismatch { expected: 5, found: 4, .. }) => {},
        r => panic!("{:?}", r),
    }
}

#[test]
fn rank_deficiency_starts_at_first_bad_minor() {
    let mut a = Array2::<f64>::eye(4);
    a[(2, 2)] = 0.0;
    a[(3, 3)] = 5.0;

    let chol = Cholesky::from_matrix_with_backend(&a, Reference).unwrap();
    assert_eq!(chol.rank(), 2);
    assert!(!chol.is_full_rank());
    assert_close!(chol.lower().slice(ndarray::s![..2, ..2]).to_owned(), Array2::<f64>::eye(2));
}
