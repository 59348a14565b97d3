//! Model builder methods for adding constraints, variables, and objectives.

use std::time::Instant;

use cadence_expr::{Constraint, ConstructionError, Expr, Variable};

use crate::model::Model;
use crate::objective::{Objective, check_finite};

impl Model {
    /// Append a constraint row. Variables seen for the first time get the
    /// next column, in the row's term order. Returns the row index.
    ///
    /// On error the model is left unchanged.
    pub fn add(&mut self, constraint: &Constraint) -> Result<usize, ConstructionError> {
        self.insert_row(constraint, constraint.name())
    }

    /// Like [`Model::add`], naming the constraint first.
    pub fn add_named(
        &mut self,
        name: impl Into<String>,
        constraint: &Constraint,
    ) -> Result<usize, ConstructionError> {
        self.insert_row(constraint, Some(name.into()))
    }

    /// Add constraints in sequence, stopping at the first failure. Rows added
    /// before the failure stay in the model.
    pub fn add_all<'a, I>(&mut self, constraints: I) -> Result<usize, ConstructionError>
    where
        I: IntoIterator<Item = &'a Constraint>,
    {
        let started = Instant::now();
        let mut added = 0;
        for constraint in constraints {
            self.add(constraint)?;
            added += 1;
        }
        tracing::debug!(
            component = "model",
            operation = "add_all",
            status = "success",
            rows = added,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Added constraint batch"
        );
        Ok(added)
    }

    /// Register a variable column without referencing it in a row.
    /// Returns the existing column if already registered.
    pub fn add_variable(&mut self, variable: &Variable) -> usize {
        if let Some(column) = self.column_of(variable) {
            return column;
        }
        let column = self.register_variable(variable);
        self.bump_revision();
        column
    }

    /// Replace the objective. Its variables are registered linear terms
    /// first, then the members of quadratic pairs.
    pub fn set_objective(&mut self, objective: Objective) -> Result<(), ConstructionError> {
        objective.validate()?;
        for variable in objective.variables() {
            self.register_variable(variable);
        }
        tracing::debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            sense = objective.sense().as_str(),
            terms = objective.expr().num_linear_terms(),
            quadratic_terms = objective.expr().num_quadratic_terms(),
            "Set objective function"
        );
        self.objective = objective;
        self.bump_revision();
        Ok(())
    }

    /// Minimize an expression, replacing any previous objective.
    pub fn minimize(&mut self, expr: impl Into<Expr>) -> Result<(), ConstructionError> {
        self.set_objective(Objective::minimize(expr))
    }

    /// Maximize an expression, replacing any previous objective.
    pub fn maximize(&mut self, expr: impl Into<Expr>) -> Result<(), ConstructionError> {
        self.set_objective(Objective::maximize(expr))
    }

    fn insert_row(
        &mut self,
        constraint: &Constraint,
        name: Option<String>,
    ) -> Result<usize, ConstructionError> {
        if self.rows.contains_key(&constraint.id()) {
            return Err(ConstructionError::AlreadyAdded {
                id: constraint.id(),
            });
        }
        if !constraint.is_linear() {
            return Err(ConstructionError::UnsupportedConstraintForm {
                reason: "quadratic terms are only allowed in the objective",
            });
        }
        constraint.bounds().validate()?;
        for (_, coeff) in constraint.expr().linear_terms() {
            check_finite(coeff, "constraint coefficient")?;
        }
        if constraint.is_name_sealed() && name != constraint.name() {
            return Err(ConstructionError::NameSealed {
                id: constraint.id(),
            });
        }
        if let Some(name) = name.as_deref() {
            if self.constraint_names.contains_key(name) {
                return Err(ConstructionError::DuplicateName {
                    name: name.to_string(),
                });
            }
        }

        let columns_before = self.variables.len();
        for (variable, _) in constraint.expr().linear_terms() {
            self.register_variable(variable);
        }

        let row = self.constraints.len();
        constraint.seal_name(name.clone())?;
        if let Some(name) = name {
            self.constraint_names.insert(name, row);
        }
        self.rows.insert(constraint.id(), row);
        self.constraints.push(constraint.clone());
        self.bump_revision();

        tracing::trace!(
            component = "model",
            operation = "add_constraint",
            status = "success",
            row,
            terms = constraint.expr().num_linear_terms(),
            new_columns = self.variables.len() - columns_before,
            "Added constraint row"
        );
        Ok(row)
    }
}
