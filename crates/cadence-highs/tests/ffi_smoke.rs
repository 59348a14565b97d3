use cadence_highs::{HighsModel, HighsModelError, HighsStatus, ObjectiveSense, highs_version};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_minimize_simple() {
    init_tracing();

    // minimize x subject to x >= 1 (column bound)
    let mut model = HighsModel::new();
    let x = model.add_col(1.0, f64::INFINITY, 1.0);
    model.set_objective_sense(ObjectiveSense::Minimize);
    assert_eq!(model.columns(), 1);

    let status = model.solve();
    assert_eq!(status, HighsStatus::Optimal);
    assert_eq!(model.columns(), 0);
    assert!(model.has_primal_solution());

    let obj_value = model.objective_value().expect("missing objective value");
    let snapshot = model.solution_snapshot().expect("missing solution");
    let x_value = snapshot.col_values()[x];

    assert!(
        (obj_value - 1.0).abs() < 1e-6,
        "Expected objective value ~1.0, got {}",
        obj_value
    );
    assert!(
        (x_value - 1.0).abs() < 1e-6,
        "Expected x ~1.0, got {}",
        x_value
    );
}

#[test]
fn test_integer_variable_is_enforced() {
    init_tracing();

    let mut model = HighsModel::new();
    let x = model.add_integer_col(0.0, 10.0, 1.0);
    model
        .add_row(f64::NEG_INFINITY, 1.5, &[x], &[1.0])
        .expect("failed to add row");
    model.set_objective_sense(ObjectiveSense::Maximize);

    let status = model.solve();
    assert_eq!(status, HighsStatus::Optimal);

    let snapshot = model.solution_snapshot().expect("missing solution");
    let x_value = snapshot.col_values()[x];
    assert!(
        (x_value - 1.0).abs() < 1e-6,
        "Expected integer x = 1.0, got {}",
        x_value
    );
    assert!(model.mip_gap().is_some());
}

#[test]
fn test_row_activity_and_duals() {
    init_tracing();

    // max x + y s.t. x + 2y <= 4, x <= 2
    let mut model = HighsModel::new();
    let x = model.add_col(0.0, f64::INFINITY, 1.0);
    let y = model.add_col(0.0, f64::INFINITY, 1.0);
    model
        .add_row(f64::NEG_INFINITY, 4.0, &[x, y], &[1.0, 2.0])
        .expect("row");
    model
        .add_row(f64::NEG_INFINITY, 2.0, &[x], &[1.0])
        .expect("row");
    model.set_objective_sense(ObjectiveSense::Maximize);

    assert_eq!(model.solve(), HighsStatus::Optimal);
    let snapshot = model.solution_snapshot().expect("solution");
    assert!((snapshot.col_values()[x] - 2.0).abs() < 1e-6);
    assert!((snapshot.col_values()[y] - 1.0).abs() < 1e-6);
    assert!((snapshot.row_values()[0] - 4.0).abs() < 1e-6);
    assert!((snapshot.row_duals()[0].abs() - 0.5).abs() < 1e-6);
    assert!(model.iteration_count() <= 10);
}

#[test]
fn test_add_row_rejects_bad_input() {
    let mut model = HighsModel::new();
    model.add_col(0.0, 1.0, 1.0);

    assert_eq!(
        model.add_row(0.0, 1.0, &[0, 1], &[1.0]).unwrap_err(),
        HighsModelError::ColumnCoefficientLengthMismatch {
            columns: 2,
            coefficients: 1
        }
    );
    assert_eq!(
        model.add_row(0.0, 1.0, &[3], &[1.0]).unwrap_err(),
        HighsModelError::ColumnIndexOutOfBounds {
            column_index: 3,
            num_columns: 1
        }
    );
}

#[test]
fn test_highs_version_is_reported() {
    let version = highs_version().expect("version string");
    assert!(!version.is_empty());
}
