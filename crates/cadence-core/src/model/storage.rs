//! Storage access methods for the model.

use cadence_expr::{Constraint, Variable};

use super::Model;

impl Model {
    /// Get the number of variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Get the number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Get the number of nonzero constraint coefficients in the model.
    pub fn num_coefficients(&self) -> usize {
        self.constraints
            .iter()
            .map(|constraint| constraint.expr().num_linear_terms())
            .sum()
    }

    /// Variables in column order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Constraints in row order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Variable at a column index.
    pub fn variable(&self, column: usize) -> Option<&Variable> {
        self.variables.get(column)
    }

    /// Constraint at a row index.
    pub fn constraint(&self, row: usize) -> Option<&Constraint> {
        self.constraints.get(row)
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.columns.contains_key(&variable.id())
    }

    pub fn contains_constraint(&self, constraint: &Constraint) -> bool {
        self.rows.contains_key(&constraint.id())
    }

    pub fn column_of(&self, variable: &Variable) -> Option<usize> {
        self.columns.get(&variable.id()).copied()
    }

    pub fn row_of(&self, constraint: &Constraint) -> Option<usize> {
        self.rows.get(&constraint.id()).copied()
    }

    /// Lookup a constraint by name.
    pub fn constraint_by_name(&self, name: &str) -> Option<&Constraint> {
        self.constraint_names
            .get(name)
            .and_then(|&row| self.constraints.get(row))
    }

    /// Lookup a variable by name. With duplicate names, the lowest column wins.
    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name() == name)
    }

    /// Row coefficients as (column, coefficient) pairs in term order.
    pub fn row_terms(&self, row: usize) -> Vec<(usize, f64)> {
        let Some(constraint) = self.constraints.get(row) else {
            return Vec::new();
        };
        constraint
            .expr()
            .linear_terms()
            .filter_map(|(variable, coeff)| self.column_of(variable).map(|col| (col, coeff)))
            .collect()
    }

    /// Whether any registered column is integer or binary.
    pub fn has_integer_variables(&self) -> bool {
        self.variables.iter().any(Variable::is_integer)
    }
}
