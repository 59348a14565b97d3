use cadence_expr::{Constraint, Variable};

use crate::model::Model;

pub(super) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Two-variable production model:
/// max 3x + 2y s.t. x + y <= 4, x + 3y <= 6, x <= 3.
pub(super) fn production_model() -> (Model, Variable, Variable, Vec<Constraint>) {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let rows = vec![
        (&x + &y).le(4.0).named("labor"),
        (&x + &y * 3.0).le(6.0).named("material"),
        x.le(3.0).named("x_cap"),
    ];
    let mut model = Model::with_name("production");
    model.add_all(&rows).expect("rows added");
    model.maximize(&x * 3.0 + &y * 2.0).expect("objective set");
    (model, x, y, rows)
}
