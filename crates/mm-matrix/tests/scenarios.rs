use mm_matrix::{BackendKind, MatmulError, Matrix, Multiplier, MultiplierConfig};

fn cpu_multipliers() -> Vec<Multiplier> {
    vec![
        Multiplier::new(MultiplierConfig::with_backend(BackendKind::Sequential)).unwrap(),
        Multiplier::new(MultiplierConfig {
            backend: BackendKind::Parallel,
            num_threads: Some(4),
            rows_per_task: 1,
            ..MultiplierConfig::default()
        })
        .unwrap(),
        Multiplier::new(MultiplierConfig::with_backend(BackendKind::Parallel)).unwrap(),
    ]
}

#[test]
fn selector_rows_scenario() {
    let a = Matrix::from_rows(&[[1.0f32, 0.0], [0.0, 1.0], [1.0, 1.0]]).unwrap();
    let b = Matrix::from_rows(&[[2.0f32, 3.0], [4.0, 5.0]]).unwrap();
    let expected = Matrix::from_rows(&[[2.0f32, 3.0], [4.0, 5.0], [6.0, 8.0]]).unwrap();

    for m in cpu_multipliers() {
        let c = m.multiply(&a, &b).unwrap();
        assert_eq!(c, expected, "backend {}", m.backend().name());
    }
}

#[test]
fn all_ones_scenario() {
    let a = Matrix::ones(3, 4).unwrap();
    let b = Matrix::ones(4, 5).unwrap();

    for m in cpu_multipliers() {
        let c = m.multiply(&a, &b).unwrap();
        assert_eq!(c.rows(), 3);
        assert_eq!(c.cols(), 5);
        assert!(c.data().iter().all(|&v| v == 4.0), "backend {}", m.backend().name());
    }
}

#[test]
fn binary_inputs_cast_from_integers() {
    // 0/1 integer inputs cast to f32, as a caller would prepare them.
    let a = Matrix::from_integers(3, 4, &[1, 0, 1, 0, 0, 1, 1, 1, 1, 1, 0, 0]).unwrap();
    let b = Matrix::from_integers(4, 5, &[1, 0, 0, 1, 1, 0, 1, 0, 1, 0, 1, 1, 1, 0, 0, 0, 0, 1, 1, 1])
        .unwrap();
    let expected = Matrix::from_rows(&[
        [2.0f32, 1.0, 1.0, 1.0, 1.0],
        [1.0, 2.0, 2.0, 2.0, 1.0],
        [1.0, 1.0, 0.0, 2.0, 1.0],
    ])
    .unwrap();

    for m in cpu_multipliers() {
        assert_eq!(m.multiply(&a, &b).unwrap(), expected);
    }
}

#[test]
fn single_element_and_degenerate_vectors() {
    let seq = Multiplier::new(MultiplierConfig::with_backend(BackendKind::Sequential)).unwrap();
    let s = seq
        .multiply(&Matrix::filled(1, 1, 3.0).unwrap(), &Matrix::filled(1, 1, -2.0).unwrap())
        .unwrap();
    assert_eq!(s.data(), &[-6.0]);

    // Outer product of a column and a row.
    let col = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
    let row = Matrix::from_vec(1, 2, vec![10.0, 20.0]).unwrap();
    let outer = seq.multiply(&col, &row).unwrap();
    assert_eq!(outer.data(), &[10.0, 20.0, 20.0, 40.0, 30.0, 60.0]);
}

#[test]
fn mismatch_reported_by_every_backend() {
    let a = Matrix::ones(2, 3).unwrap();
    let b = Matrix::ones(4, 2).unwrap();
    for m in cpu_multipliers() {
        assert!(matches!(
            m.multiply(&a, &b),
            Err(MatmulError::DimensionMismatch { n: 2, m: 3, m2: 4, p: 2 })
        ));
    }
}

#[test]
fn instances_with_different_backends_coexist() {
    let seq = Multiplier::new(MultiplierConfig::with_backend(BackendKind::Sequential)).unwrap();
    let par = Multiplier::new(MultiplierConfig::with_backend(BackendKind::Parallel)).unwrap();
    assert_eq!(seq.backend_kind(), BackendKind::Sequential);
    assert_eq!(par.backend_kind(), BackendKind::Parallel);

    let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(seq.multiply(&a, &a).unwrap(), par.multiply(&a, &a).unwrap());
}
