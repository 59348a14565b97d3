use super::support::{init_tracing, production_model};
use super::*;

#[test]
fn export_lists_columns_rows_and_objective() {
    init_tracing();
    let (model, _, _, rows) = production_model();
    rows[2].set_enabled(false);
    let text = model.to_exchange_string().expect("export");

    let lines: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(
        lines,
        vec![
            "NAME production",
            "SENSE MAX",
            "VAR x C 0 inf",
            "VAR y C 0 inf",
            "OBJ obj 0",
            "OBJTERM x 3",
            "OBJTERM y 2",
            "ROW labor L -inf 4",
            "TERM x 1",
            "TERM y 1",
            "ROW material L -inf 6",
            "TERM x 1",
            "TERM y 3",
            "ROW x_cap L -inf 3 off",
            "TERM x 1",
            "END",
        ]
    );
}

#[test]
fn import_restores_structure() {
    let (model, _, _, rows) = production_model();
    rows[0].set_enabled(false);
    let text = model.to_exchange_string().expect("export");
    let restored = Model::from_exchange_str(&text).expect("import");

    assert_eq!(restored.name(), Some("production"));
    assert_eq!(restored.num_variables(), 2);
    assert_eq!(restored.num_constraints(), 3);
    assert_eq!(restored.num_coefficients(), model.num_coefficients());
    assert_eq!(restored.objective().sense(), Sense::Maximize);
    assert_eq!(restored.variable(1).map(Variable::name), Some("y"));

    let labor = restored.constraint_by_name("labor").expect("labor row");
    assert!(!labor.is_enabled());
    assert_eq!(labor.upper(), 4.0);
    assert_eq!(restored.row_terms(1), vec![(0, 1.0), (1, 3.0)]);

    // exporting again yields identical text
    assert_eq!(restored.to_exchange_string().expect("re-export"), text);
}

#[test]
fn round_trip_keeps_kinds_ranges_and_quadratic_terms() {
    let mut model = Model::new();
    let n = Variable::integer("n", -2.0, 7.0).unwrap();
    let b = Variable::binary("b");
    let z = Variable::builder().name("z").free().build().unwrap();
    model.add(&Constraint::range(0.5, &n + &b * 0.1, 9.25).named("band")).unwrap();
    model.add(&(&z - &n).equals(1.0 / 3.0).named("tie")).unwrap();
    model.minimize(&z * &z + &n * &b * 2.0 - &z + 4.0).unwrap();

    let text = model.to_exchange_string().unwrap();
    assert!(text.contains("VAR n I -2 7"));
    assert!(text.contains("VAR b B 0 1"));
    assert!(text.contains("VAR z C -inf inf"));
    assert!(text.contains("ROW band R 0.5 9.25"));

    let restored = Model::from_exchange_str(&text).unwrap();
    let tie = restored.constraint_by_name("tie").unwrap();
    assert_eq!(tie.lower(), 1.0 / 3.0);
    assert_eq!(tie.sense(), cadence_expr::ComparisonSense::Equal);
    let objective = restored.objective();
    assert_eq!(objective.offset(), 4.0);
    assert_eq!(objective.expr().num_quadratic_terms(), 2);
    assert_eq!(
        restored.variable_by_name("b").map(Variable::kind),
        Some(cadence_expr::VariableKind::Binary)
    );
}

#[test]
fn export_rejects_bad_names() {
    let mut model = Model::new();
    let a = Variable::new("x");
    let b = Variable::new("x");
    model.add(&(&a + &b).le(1.0)).unwrap();
    assert_eq!(
        model.to_exchange_string().unwrap_err(),
        ExchangeError::DuplicateName {
            name: "x".to_string()
        }
    );

    let mut model = Model::new();
    let spaced = Variable::new("flow rate");
    model.add(&spaced.le(1.0)).unwrap();
    assert_eq!(
        model.to_exchange_string().unwrap_err().code(),
        "EXCHANGE_INVALID_NAME"
    );
}

#[test]
fn import_errors_carry_line_numbers() {
    let unknown = "SENSE MIN\nVAR x C 0 1\nROW r L -inf 1\nTERM y 1\nEND\n";
    let err = Model::from_exchange_str(unknown).unwrap_err();
    assert_eq!(
        err,
        ExchangeError::UnknownVariable {
            line: 4,
            name: "y".to_string()
        }
    );

    let bad_number = "# header\nVAR x C zero 1\nEND\n";
    let err = Model::from_exchange_str(bad_number).unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.code(), "EXCHANGE_SYNTAX");

    let missing_end = "VAR x C 0 1\n";
    let err = Model::from_exchange_str(missing_end).unwrap_err();
    assert!(err.to_string().contains("missing END"));

    let bad_bounds = "VAR x C 0 1\nROW r R 5 1\nTERM x 1\nEND\n";
    let err = Model::from_exchange_str(bad_bounds).unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::Construction {
            line: 2,
            source: ConstructionError::InvalidBounds { .. }
        }
    ));
}

#[test]
fn frozen_variables_survive_round_trip() {
    let mut model = Model::new();
    let n = Variable::integer("n", 0.0, 10.0).unwrap();
    let x = Variable::continuous("x", 1.0, 5.0).unwrap();
    model.add(&(&n + &x).le(12.0).named("cap")).unwrap();
    n.record_value(3.2);
    n.freeze();

    let text = model.to_exchange_string().unwrap();
    assert!(text.contains("VAR n I 0 10 FROZEN 3\n"));
    assert!(text.contains("VAR x C 1 5\n"));

    let restored = Model::from_exchange_str(&text).unwrap();
    let n = restored.variable_by_name("n").unwrap();
    assert!(n.is_frozen());
    assert_eq!(n.lower(), 3.0);
    assert_eq!(n.upper(), 3.0);
    assert!(n.unfreeze());
    assert_eq!(n.upper(), 10.0);
    assert!(!restored.variable_by_name("x").unwrap().is_frozen());
}

#[test]
fn import_rejects_second_objective() {
    let text = "VAR x C 0 1\nOBJ cost 1\nOBJTERM x 2\nOBJ cost 5\nOBJTERM x 1\nEND\n";
    let err = Model::from_exchange_str(text).unwrap_err();
    assert_eq!(err.line(), Some(4));
    assert_eq!(err.code(), "EXCHANGE_SYNTAX");
    assert!(err.to_string().contains("duplicate OBJ line"));

    let bad_frozen = "VAR x C 0 1 FIXED 1\nEND\n";
    let err = Model::from_exchange_str(bad_frozen).unwrap_err();
    assert_eq!(err.line(), Some(1));
}
