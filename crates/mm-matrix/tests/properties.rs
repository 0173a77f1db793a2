use approx::assert_relative_eq;
use mm_matrix::{BackendKind, MatmulError, Matrix, Multiplier, MultiplierConfig};
use proptest::prelude::*;

/// Textbook triple loop in f64, used as ground truth.
fn reference(a: &Matrix, b: &Matrix) -> Vec<f64> {
    let (n, m, p) = (a.rows(), a.cols(), b.cols());
    let mut c = vec![0.0f64; n * p];
    for i in 0..n {
        for j in 0..p {
            let mut sum = 0.0f64;
            for k in 0..m {
                sum += a.data()[i * m + k] as f64 * b.data()[k * p + j] as f64;
            }
            c[i * p + j] = sum;
        }
    }
    c
}

fn matrix(rows: usize, cols: usize) -> impl Strategy<Value = Matrix> {
    prop::collection::vec(-8.0f32..8.0, rows * cols)
        .prop_map(move |data| Matrix::from_vec(rows, cols, data).unwrap())
}

/// An (n x m, m x p) operand pair.
fn operands() -> impl Strategy<Value = (Matrix, Matrix)> {
    (1usize..12, 1usize..12, 1usize..12)
        .prop_flat_map(|(n, m, p)| (matrix(n, m), matrix(m, p)))
}

fn backends() -> Vec<Multiplier> {
    vec![
        Multiplier::new(MultiplierConfig::with_backend(BackendKind::Sequential)).unwrap(),
        Multiplier::new(MultiplierConfig {
            backend: BackendKind::Parallel,
            num_threads: Some(3),
            rows_per_task: 2,
            ..MultiplierConfig::default()
        })
        .unwrap(),
    ]
}

proptest! {
    #[test]
    fn matches_reference((a, b) in operands()) {
        let expected = reference(&a, &b);
        // Worst-case rounding of an m-term f32 dot product with |entries| < 8.
        let m = a.cols() as f64;
        let abs_tol = 64.0 * m * m * f32::EPSILON as f64;
        for mult in backends() {
            let c = mult.multiply(&a, &b).unwrap();
            prop_assert_eq!(c.rows(), a.rows());
            prop_assert_eq!(c.cols(), b.cols());
            for (&got, &want) in c.data().iter().zip(expected.iter()) {
                let diff = (got as f64 - want).abs();
                prop_assert!(
                    diff <= abs_tol.max(1e-4 * want.abs()),
                    "{} vs {} on {}", got, want, mult.backend().name()
                );
            }
        }
    }

    #[test]
    fn right_identity_is_neutral(a in (1usize..10, 1usize..10).prop_flat_map(|(n, m)| matrix(n, m))) {
        let identity = Matrix::identity(a.cols()).unwrap();
        for mult in backends() {
            let c = mult.multiply(&a, &identity).unwrap();
            prop_assert!(c.approx_eq(&a, 1e-4));
        }
    }

    #[test]
    fn zero_matrix_annihilates(
        a in (1usize..10, 1usize..10).prop_flat_map(|(n, m)| matrix(n, m)),
        p in 1usize..10,
    ) {
        let zeros = Matrix::zeros(a.cols(), p).unwrap();
        for mult in backends() {
            let c = mult.multiply(&a, &zeros).unwrap();
            prop_assert_eq!(c.shape(), mm_matrix::Shape::new(a.rows(), p));
            prop_assert!(c.data().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn mismatched_inner_dimension_fails(
        n in 1usize..8, m in 1usize..8, m2 in 1usize..8, p in 1usize..8,
    ) {
        prop_assume!(m != m2);
        let a = Matrix::ones(n, m).unwrap();
        let b = Matrix::ones(m2, p).unwrap();
        for mult in backends() {
            prop_assert_eq!(
                mult.multiply(&a, &b).unwrap_err(),
                MatmulError::DimensionMismatch { n, m, m2, p }
            );
        }
    }
}

#[test]
fn large_parallel_product_matches_sequential() {
    let n = 129;
    let a = Matrix::from_vec(n, n, (0..n * n).map(|i| ((i * 7) % 11) as f32 * 0.1).collect()).unwrap();
    let b = Matrix::from_vec(n, n, (0..n * n).map(|i| ((i * 3) % 13) as f32 * 0.2).collect()).unwrap();
    let mut results = backends().into_iter().map(|m| m.multiply(&a, &b).unwrap());
    let seq = results.next().unwrap();
    let par = results.next().unwrap();
    for (x, y) in seq.data().iter().zip(par.data().iter()) {
        assert_relative_eq!(x, y, max_relative = 1e-4);
    }
}
