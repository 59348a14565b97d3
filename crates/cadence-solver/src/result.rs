//! Solve results and write-back onto model entities.

use std::time::Instant;

use cadence_core::Model;
use tracing::debug;

use crate::SolverStatus;
use crate::traits::SolutionView;

/// Everything a backend reports for one solve, indexed by the model's
/// column and row order at solve time.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub status: SolverStatus,
    /// Objective value including the constant offset.
    pub objective_value: Option<f64>,
    /// Whether the backend reported a primal feasible point.
    pub primal_feasible: bool,
    pub iteration_count: Option<u64>,
    /// Relative gap of the incumbent; MIP solves only.
    pub mip_gap: Option<f64>,
    pub solve_time_seconds: f64,
    pub primal_values: Vec<f64>,
    pub row_activities: Vec<f64>,
    /// Row duals; `None` for MIP solves.
    pub row_duals: Option<Vec<f64>>,
    /// Reduced costs; `None` for MIP solves.
    pub column_duals: Option<Vec<f64>>,
}

impl SolveResult {
    /// A result carrying only a status, for outcomes without a point.
    pub fn without_solution(status: SolverStatus, solve_time_seconds: f64) -> Self {
        Self {
            status,
            objective_value: None,
            primal_feasible: false,
            iteration_count: None,
            mip_gap: None,
            solve_time_seconds,
            primal_values: Vec::new(),
            row_activities: Vec::new(),
            row_duals: None,
            column_duals: None,
        }
    }

    /// True when solution values are meaningful: optimal, or a limit was
    /// hit with a feasible incumbent.
    pub fn has_solution(&self) -> bool {
        match self.status {
            SolverStatus::Optimal => true,
            SolverStatus::ReachedTimeLimit | SolverStatus::ReachedIterationLimit => {
                self.primal_feasible
            }
            _ => false,
        }
    }

    pub fn is_proven_optimal(&self) -> bool {
        self.status.is_proven_optimal()
    }

    pub fn is_proven_infeasible(&self) -> bool {
        self.status.is_proven_infeasible()
    }

    pub fn is_proven_unbounded(&self) -> bool {
        self.status.is_proven_unbounded()
    }

    /// Copy values onto the model's variables, constraints and objective.
    ///
    /// When there is no solution, every value field is cleared so stale
    /// values from a previous solve are never read.
    pub fn write_back(&self, model: &Model) {
        let started = Instant::now();
        if !self.has_solution() {
            for variable in model.variables() {
                variable.clear_value();
            }
            for constraint in model.constraints() {
                constraint.clear_solution();
            }
            model.objective().clear_value();
            debug!(
                component = "solver",
                operation = "write_back",
                status = "cleared",
                solver_status = %self.status,
                "No solution available; cleared model values"
            );
            return;
        }

        for (column, variable) in model.variables().iter().enumerate() {
            match self.primal_values.get(column) {
                Some(value) => variable.record_value(*value),
                None => variable.clear_value(),
            }
        }
        for (row, constraint) in model.constraints().iter().enumerate() {
            match self.row_activities.get(row) {
                Some(activity) => {
                    let dual = self
                        .row_duals
                        .as_ref()
                        .and_then(|duals| duals.get(row).copied());
                    constraint.record_solution(*activity, dual);
                }
                None => constraint.clear_solution(),
            }
        }
        match self.objective_value {
            Some(value) => model.objective().record_value(value),
            None => model.objective().clear_value(),
        }

        debug!(
            component = "solver",
            operation = "write_back",
            status = "success",
            num_variables = model.num_variables(),
            num_constraints = model.num_constraints(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Wrote solution back onto model"
        );
    }
}

impl SolutionView for SolveResult {
    fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    fn status(&self) -> SolverStatus {
        self.status
    }

    fn get_primal(&self, index: usize) -> Option<f64> {
        self.primal_values.get(index).copied()
    }

    fn get_variable_dual(&self, index: usize) -> Option<f64> {
        self.column_duals.as_ref()?.get(index).copied()
    }

    fn get_constraint_dual(&self, index: usize) -> Option<f64> {
        self.row_duals.as_ref()?.get(index).copied()
    }

    fn get_row_activity(&self, index: usize) -> Option<f64> {
        self.row_activities.get(index).copied()
    }

    fn primal_values(&self) -> &[f64] {
        &self.primal_values
    }

    fn solve_time_seconds(&self) -> f64 {
        self.solve_time_seconds
    }
}
