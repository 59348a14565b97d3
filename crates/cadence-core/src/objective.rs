//! Objective function: an expression, a sense and the value of the last solve.

use std::cell::Cell;

use cadence_expr::{ConstructionError, Expr, Variable};

use crate::types::Sense;

pub const DEFAULT_OBJECTIVE_NAME: &str = "obj";

#[derive(Debug, Clone, Default)]
pub struct Objective {
    expr: Expr,
    sense: Sense,
    name: Option<String>,
    value: Cell<Option<f64>>,
}

impl Objective {
    pub fn new(expr: impl Into<Expr>, sense: Sense) -> Self {
        Self {
            expr: expr.into(),
            sense,
            name: None,
            value: Cell::new(None),
        }
    }

    pub fn minimize(expr: impl Into<Expr>) -> Self {
        Self::new(expr, Sense::Minimize)
    }

    pub fn maximize(expr: impl Into<Expr>) -> Self {
        Self::new(expr, Sense::Maximize)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Name, `obj` when none was given.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_OBJECTIVE_NAME)
    }

    /// Constant part of the expression, added to the solver's objective value.
    pub fn offset(&self) -> f64 {
        self.expr.constant()
    }

    pub fn is_linear(&self) -> bool {
        self.expr.is_linear()
    }

    /// Objective value from the most recent solve.
    pub fn value(&self) -> Option<f64> {
        self.value.get()
    }

    pub fn record_value(&self, value: f64) {
        self.value.set(Some(value));
    }

    pub fn clear_value(&self) {
        self.value.set(None);
    }

    /// Every coefficient, and the constant, must be finite.
    pub(crate) fn validate(&self) -> Result<(), ConstructionError> {
        check_finite(self.expr.constant(), "objective constant")?;
        for (_, coeff) in self.expr.linear_terms() {
            check_finite(coeff, "objective coefficient")?;
        }
        for (_, _, coeff) in self.expr.quadratic_terms() {
            check_finite(coeff, "objective quadratic coefficient")?;
        }
        Ok(())
    }

    /// Variables in registration order: linear terms, then quadratic pairs.
    pub(crate) fn variables(&self) -> Vec<&Variable> {
        self.expr.variables()
    }
}

pub(crate) fn check_finite(value: f64, context: &'static str) -> Result<(), ConstructionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConstructionError::NonFiniteCoefficient { context, value })
    }
}
