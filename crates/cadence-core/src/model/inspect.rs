//! Model inspection and snapshot methods.

use std::collections::HashSet;

use cadence_expr::{ConstraintId, VariableId};
use serde::Serialize;

use crate::model::Model;
use crate::types::Sense;

/// View of a variable in a model snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableView {
    pub column: usize,
    pub id: u32,
    pub name: String,
    pub kind: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub value: Option<f64>,
    pub metadata: Option<serde_json::Value>,
}

/// View of a constraint in a model snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintView {
    pub row: usize,
    pub id: u32,
    pub name: String,
    pub sense: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub nnz: usize,
    pub enabled: bool,
    pub activity: Option<f64>,
    pub dual: Option<f64>,
    pub metadata: Option<serde_json::Value>,
}

/// View of a coefficient in a model snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoefficientView {
    pub row: usize,
    pub column: usize,
    pub value: f64,
}

/// Quadratic objective entry by column pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadraticView {
    pub first: usize,
    pub second: usize,
    pub value: f64,
}

/// View of the objective in a model snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveView {
    pub name: String,
    pub sense: Sense,
    pub offset: f64,
    pub terms: Vec<(usize, f64)>,
    pub quadratic: Vec<QuadraticView>,
    pub value: Option<f64>,
}

/// Metadata about a model snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotMetadata {
    pub variables: usize,
    pub constraints: usize,
    pub coefficients: usize,
    pub revision: u64,
}

/// A complete snapshot of a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSnapshot {
    pub name: Option<String>,
    pub variables: Vec<VariableView>,
    pub constraints: Vec<ConstraintView>,
    pub coefficients: Option<Vec<CoefficientView>>,
    pub objective: ObjectiveView,
    pub metadata: SnapshotMetadata,
}

impl ModelSnapshot {
    /// Pretty-printed JSON. Infinite bounds serialize as `null`.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Options for inspecting a model.
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    pub include_coefficients: bool,
    pub variable_filter: Option<Vec<VariableId>>,
    pub constraint_filter: Option<Vec<ConstraintId>>,
}

impl Model {
    /// Inspect the model structure and return a structured snapshot.
    pub fn inspect(&self, options: InspectOptions) -> ModelSnapshot {
        let InspectOptions {
            include_coefficients,
            variable_filter,
            constraint_filter,
        } = options;

        let var_filter: Option<HashSet<VariableId>> =
            variable_filter.map(|ids| ids.into_iter().collect());
        let con_filter: Option<HashSet<ConstraintId>> =
            constraint_filter.map(|ids| ids.into_iter().collect());

        let mut coefficients: Vec<CoefficientView> = Vec::new();
        let mut constraints = Vec::new();

        for (row, constraint) in self.constraints.iter().enumerate() {
            if con_filter
                .as_ref()
                .is_some_and(|filter| !filter.contains(&constraint.id()))
            {
                continue;
            }
            let mut nnz = 0;
            for (variable, coeff) in constraint.expr().linear_terms() {
                if var_filter
                    .as_ref()
                    .is_some_and(|filter| !filter.contains(&variable.id()))
                {
                    continue;
                }
                nnz += 1;
                if include_coefficients {
                    if let Some(column) = self.column_of(variable) {
                        coefficients.push(CoefficientView {
                            row,
                            column,
                            value: coeff,
                        });
                    }
                }
            }
            let bounds = constraint.bounds();
            constraints.push(ConstraintView {
                row,
                id: constraint.id().inner(),
                name: constraint.display_name(),
                sense: constraint.sense().as_str(),
                lower: bounds.lower,
                upper: bounds.upper,
                nnz,
                enabled: constraint.is_enabled(),
                activity: constraint.activity(),
                dual: constraint.dual(),
                metadata: self.constraint_metadata(constraint).cloned(),
            });
        }

        let variables = self
            .variables
            .iter()
            .enumerate()
            .filter(|(_, var)| {
                var_filter
                    .as_ref()
                    .is_none_or(|filter| filter.contains(&var.id()))
            })
            .map(|(column, var)| VariableView {
                column,
                id: var.id().inner(),
                name: var.name().to_string(),
                kind: var.kind().as_str(),
                lower: var.lower(),
                upper: var.upper(),
                value: var.value(),
                metadata: self.variable_metadata(var).cloned(),
            })
            .collect();

        let objective = &self.objective;
        let terms = objective
            .expr()
            .linear_terms()
            .filter_map(|(var, coeff)| self.column_of(var).map(|column| (column, coeff)))
            .collect();
        let quadratic = objective
            .expr()
            .quadratic_terms()
            .filter_map(|(a, b, value)| {
                Some(QuadraticView {
                    first: self.column_of(a)?,
                    second: self.column_of(b)?,
                    value,
                })
            })
            .collect();

        ModelSnapshot {
            name: self.name.clone(),
            variables,
            constraints,
            coefficients: include_coefficients.then_some(coefficients),
            objective: ObjectiveView {
                name: objective.name().to_string(),
                sense: objective.sense(),
                offset: objective.offset(),
                terms,
                quadratic,
                value: objective.value(),
            },
            metadata: SnapshotMetadata {
                variables: self.num_variables(),
                constraints: self.num_constraints(),
                coefficients: self.num_coefficients(),
                revision: self.revision(),
            },
        }
    }
}
