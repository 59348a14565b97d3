//! Human-readable and JSON solution dumps.

use std::fmt;

use cadence_core::{Model, format_ascii_number};
use serde::Serialize;

use crate::{SolveResult, SolverStatus};

#[derive(Debug, Clone, Serialize)]
pub struct VariableValue {
    pub name: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstraintValue {
    pub name: String,
    pub activity: Option<f64>,
    pub dual: Option<f64>,
    pub enabled: bool,
}

/// Variable values, constraint activities and the objective value of one
/// solve, labelled with model names.
#[derive(Debug, Clone, Serialize)]
pub struct SolutionReport {
    pub model: Option<String>,
    pub status: SolverStatus,
    pub objective_name: String,
    pub objective_value: Option<f64>,
    pub iteration_count: Option<u64>,
    pub mip_gap: Option<f64>,
    pub solve_time_seconds: f64,
    pub variables: Vec<VariableValue>,
    pub constraints: Vec<ConstraintValue>,
}

impl SolutionReport {
    /// Pair `result` with the names in `model`. Values are taken from the
    /// result, so the report is accurate even if the model was solved again
    /// afterwards.
    pub fn new(model: &Model, result: &SolveResult) -> Self {
        let has_solution = result.has_solution();
        let variables = model
            .variables()
            .iter()
            .enumerate()
            .map(|(column, variable)| VariableValue {
                name: variable.name().to_string(),
                value: has_solution
                    .then(|| result.primal_values.get(column).copied())
                    .flatten(),
            })
            .collect();
        let constraints = model
            .constraints()
            .iter()
            .enumerate()
            .map(|(row, constraint)| ConstraintValue {
                name: constraint.display_name(),
                activity: has_solution
                    .then(|| result.row_activities.get(row).copied())
                    .flatten(),
                dual: has_solution
                    .then(|| {
                        result
                            .row_duals
                            .as_ref()
                            .and_then(|duals| duals.get(row).copied())
                    })
                    .flatten(),
                enabled: constraint.is_enabled(),
            })
            .collect();

        Self {
            model: model.name().map(str::to_string),
            status: result.status,
            objective_name: model.objective().name().to_string(),
            objective_value: if has_solution {
                result.objective_value
            } else {
                None
            },
            iteration_count: result.iteration_count,
            mip_gap: result.mip_gap,
            solve_time_seconds: result.solve_time_seconds,
            variables,
            constraints,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), format_ascii_number)
}

impl fmt::Display for SolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.model {
            writeln!(f, "Model: {name}")?;
        }
        writeln!(f, "Status: {}", self.status)?;
        writeln!(
            f,
            "Objective ({}): {}",
            self.objective_name,
            format_optional(self.objective_value)
        )?;
        if let Some(gap) = self.mip_gap {
            writeln!(f, "MIP gap: {}", format_ascii_number(gap))?;
        }
        writeln!(f, "Variables:")?;
        for variable in &self.variables {
            writeln!(f, "  {} = {}", variable.name, format_optional(variable.value))?;
        }
        writeln!(f, "Constraints:")?;
        for constraint in &self.constraints {
            write!(
                f,
                "  {} = {}",
                constraint.name,
                format_optional(constraint.activity)
            )?;
            if let Some(dual) = constraint.dual {
                write!(f, " (dual {})", format_ascii_number(dual))?;
            }
            if !constraint.enabled {
                write!(f, " (disabled)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
