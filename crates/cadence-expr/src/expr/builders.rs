//! Aggregate builders: sums and for-all families over index sets.

use std::fmt::Display;

use crate::error::ConstructionError;
use crate::expr::constraint::Constraint;
use crate::expr::core::Expr;
use crate::variable::Variable;

/// Fold expression-likes into one expression in a single pass.
pub fn sum<I, T>(items: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
{
    let mut total = Expr::zero();
    for item in items {
        total += item.into();
    }
    total
}

/// Map each key to an expression-like and fold the results.
pub fn sum_over<K, I, T, F>(keys: I, mut term: F) -> Expr
where
    I: IntoIterator<Item = K>,
    T: Into<Expr>,
    F: FnMut(K) -> T,
{
    sum(keys.into_iter().map(&mut term))
}

/// `Σ coefficients[i] * variables[i]`.
pub fn scalar_product(
    coefficients: &[f64],
    variables: &[Variable],
) -> Result<Expr, ConstructionError> {
    if coefficients.len() != variables.len() {
        return Err(ConstructionError::MismatchedLengths {
            left: coefficients.len(),
            right: variables.len(),
        });
    }
    let mut expr = Expr::zero();
    for (coeff, var) in coefficients.iter().zip(variables) {
        expr.add_term(var, *coeff);
    }
    Ok(expr)
}

/// One constraint per key, in key order, each named `name[key]`.
pub fn for_all<K, I, F>(name: &str, keys: I, mut build: F) -> Vec<Constraint>
where
    K: Display,
    I: IntoIterator<Item = K>,
    F: FnMut(K) -> Constraint,
{
    keys.into_iter()
        .map(|key| {
            let label = format!("{name}[{key}]");
            build(key).named(label)
        })
        .collect()
}

/// Like [`for_all`] but leaves the constraints unnamed.
pub fn for_all_unnamed<K, I, F>(keys: I, build: F) -> Vec<Constraint>
where
    I: IntoIterator<Item = K>,
    F: FnMut(K) -> Constraint,
{
    keys.into_iter().map(build).collect()
}
