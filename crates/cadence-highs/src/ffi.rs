//! Safe wrapper over the `highs` row-problem API for linear and mixed-integer
//! solves.
//!
//! This module contains unsafe code for reading solver info values.
#![allow(unsafe_code)]

use highs::{Col, HighsModelStatus, RowProblem, Sense as HighsSense, SolvedModel};
use std::ffi::{CStr, CString};
use std::fmt;
use tracing::{debug, trace, warn};

/// `primal_solution_status` info value for a feasible point.
pub(crate) const SOLUTION_STATUS_FEASIBLE: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    Minimize,
    Maximize,
}

/// Model status as reported by HiGHS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighsStatus {
    Optimal,
    Infeasible,
    Unbounded,
    UnboundedOrInfeasible,
    ReachedTimeLimit,
    ReachedIterationLimit,
    Unknown,
}

/// Errors returned by the HiGHS model wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsModelError {
    ColumnCoefficientLengthMismatch {
        columns: usize,
        coefficients: usize,
    },
    ColumnIndexOutOfBounds {
        column_index: usize,
        num_columns: usize,
    },
    SolveRequired {
        operation: &'static str,
    },
}

impl fmt::Display for HighsModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighsModelError::ColumnCoefficientLengthMismatch {
                columns,
                coefficients,
            } => write!(
                f,
                "columns length ({}) must match coefficients length ({})",
                columns, coefficients
            ),
            HighsModelError::ColumnIndexOutOfBounds {
                column_index,
                num_columns,
            } => write!(
                f,
                "column index {} out of bounds (num_columns = {})",
                column_index, num_columns
            ),
            HighsModelError::SolveRequired { operation } => {
                write!(f, "solve must be called before {}", operation)
            }
        }
    }
}

impl std::error::Error for HighsModelError {}

/// Primal and dual values copied out of a solved model.
#[derive(Debug, Clone)]
pub struct SolutionSnapshot {
    col_values: Vec<f64>,
    col_duals: Vec<f64>,
    row_values: Vec<f64>,
    row_duals: Vec<f64>,
}

impl SolutionSnapshot {
    pub fn col_values(&self) -> &[f64] {
        &self.col_values
    }

    /// Reduced costs.
    pub fn col_duals(&self) -> &[f64] {
        &self.col_duals
    }

    /// Row activities.
    pub fn row_values(&self) -> &[f64] {
        &self.row_values
    }

    /// Shadow prices.
    pub fn row_duals(&self) -> &[f64] {
        &self.row_duals
    }

    pub(crate) fn into_parts(self) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        (self.col_values, self.col_duals, self.row_values, self.row_duals)
    }
}

/// Option value types for HiGHS solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsOption {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

/// A row problem being assembled, then solved once.
pub struct HighsModel {
    problem: RowProblem,
    objective_sense: ObjectiveSense,
    solved: Option<SolvedModel>,
    columns: Vec<Col>,
    options: Vec<(String, HighsOption)>,
    output: bool,
}

impl HighsModel {
    pub fn new() -> Self {
        trace!(
            component = "solver",
            operation = "init_highs",
            status = "success",
            "Creating new HiGHS model"
        );
        HighsModel {
            problem: RowProblem::default(),
            objective_sense: ObjectiveSense::Minimize,
            solved: None,
            columns: Vec::new(),
            options: Vec::new(),
            output: false,
        }
    }

    /// Add a continuous column and return its index.
    pub fn add_col(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        objective_coefficient: f64,
    ) -> usize {
        self.add_col_with_integrality(lower_bound, upper_bound, objective_coefficient, false)
    }

    /// Add an integer column and return its index.
    pub fn add_integer_col(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        objective_coefficient: f64,
    ) -> usize {
        self.add_col_with_integrality(lower_bound, upper_bound, objective_coefficient, true)
    }

    fn add_col_with_integrality(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        objective_coefficient: f64,
        is_integer: bool,
    ) -> usize {
        trace!(
            lower_bound,
            upper_bound,
            objective_coefficient,
            is_integer,
            component = "solver",
            operation = "add_column",
            status = "success",
            "Adding column"
        );
        self.solved = None;
        let col = if is_integer {
            self.problem
                .add_integer_column(objective_coefficient, lower_bound..=upper_bound)
        } else {
            self.problem
                .add_column(objective_coefficient, lower_bound..=upper_bound)
        };
        self.columns.push(col);
        self.columns.len() - 1
    }

    /// Add a row over previously added columns and return its index.
    ///
    /// # Errors
    ///
    /// Returns an error if columns and coefficients have different lengths
    /// or if any column index is out of bounds.
    pub fn add_row(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        columns: &[usize],
        coefficients: &[f64],
    ) -> Result<usize, HighsModelError> {
        if columns.len() != coefficients.len() {
            warn!(
                component = "solver",
                operation = "add_row",
                status = "error",
                columns = columns.len(),
                coefficients = coefficients.len(),
                "Column/coefficients length mismatch"
            );
            return Err(HighsModelError::ColumnCoefficientLengthMismatch {
                columns: columns.len(),
                coefficients: coefficients.len(),
            });
        }
        self.solved = None;
        let num_columns = self.columns.len();
        let mut factors = Vec::with_capacity(columns.len());
        for (col_idx, coeff) in columns.iter().copied().zip(coefficients.iter().copied()) {
            let col = *self
                .columns
                .get(col_idx)
                .ok_or(HighsModelError::ColumnIndexOutOfBounds {
                    column_index: col_idx,
                    num_columns,
                })?;
            factors.push((col, coeff));
        }
        self.problem.add_row(lower_bound..=upper_bound, factors);
        Ok(self.problem.num_rows().saturating_sub(1))
    }

    pub fn set_objective_sense(&mut self, sense: ObjectiveSense) {
        self.objective_sense = sense;
    }

    /// Turn HiGHS console output on or off for the next solve.
    pub fn set_output(&mut self, enabled: bool) {
        self.output = enabled;
    }

    /// Set a HiGHS option for the next solve.
    pub fn set_option(&mut self, option: impl Into<String>, value: HighsOption) {
        self.options.push((option.into(), value));
    }

    /// Solve the assembled problem. The problem is consumed; results stay
    /// readable until the next column or row is added.
    pub fn solve(&mut self) -> HighsStatus {
        debug!(
            num_cols = self.problem.num_cols(),
            num_rows = self.problem.num_rows(),
            ?self.objective_sense,
            component = "solver",
            operation = "solve",
            status = "start",
            "Solving row problem"
        );

        let sense = match self.objective_sense {
            ObjectiveSense::Minimize => HighsSense::Minimise,
            ObjectiveSense::Maximize => HighsSense::Maximise,
        };

        let problem = std::mem::take(&mut self.problem);
        let mut model = problem.optimise(sense);
        if self.output {
            model.set_option("output_flag", true);
            model.set_option("log_to_console", true);
        } else {
            model.make_quiet();
        }
        for (option, value) in self.options.drain(..) {
            match value {
                HighsOption::Bool(val) => model.set_option(option.as_str(), val),
                HighsOption::Int(val) => model.set_option(option.as_str(), val),
                HighsOption::Float(val) => model.set_option(option.as_str(), val),
                HighsOption::Str(val) => model.set_option(option.as_str(), val.as_str()),
            }
        }
        let solution = model.solve();
        let status = map_status(solution.status());

        trace!(
            component = "solver",
            operation = "solve",
            status = "success",
            ?status,
            "Solution status received"
        );
        self.solved = Some(solution);
        self.columns.clear();
        status
    }

    /// Number of columns added since the last solve.
    pub fn columns(&self) -> usize {
        self.columns.len()
    }

    /// Objective value of the last solve, without any constant offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has not been solved yet.
    pub fn objective_value(&self) -> Result<f64, HighsModelError> {
        let solved = self.solved.as_ref().ok_or(HighsModelError::SolveRequired {
            operation: "objective_value",
        })?;
        Ok(solved.objective_value())
    }

    /// Relative MIP gap; `None` before a solve or when HiGHS reports none.
    pub fn mip_gap(&self) -> Option<f64> {
        let gap = self.solved.as_ref()?.mip_gap();
        gap.is_finite().then_some(gap)
    }

    /// Simplex plus barrier iterations of the last solve.
    pub fn iteration_count(&self) -> u64 {
        self.get_int_info("simplex_iteration_count").unwrap_or(0)
            + self.get_int_info("barrier_iteration_count").unwrap_or(0)
    }

    /// Whether the last solve left a primal feasible point.
    pub fn has_primal_solution(&self) -> bool {
        self.get_int_info("primal_solution_status") == Some(SOLUTION_STATUS_FEASIBLE)
    }

    fn get_int_info(&self, name: &str) -> Option<u64> {
        let solved = self.solved.as_ref()?;
        let c_name = CString::new(name).ok()?;
        let mut value: highs_sys::HighsInt = 0;
        let status = unsafe {
            highs_sys::Highs_getIntInfoValue(solved.as_ptr(), c_name.as_ptr(), &raw mut value)
        };
        if status != highs_sys::STATUS_OK {
            debug!(
                component = "solver",
                operation = "solve_info",
                info = name,
                status_code = status,
                "Info value not available"
            );
            return None;
        }
        u64::try_from(value).ok()
    }

    /// Primal and dual values of the last solve.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has not been solved yet.
    pub fn solution_snapshot(&self) -> Result<SolutionSnapshot, HighsModelError> {
        let solution = self.solved.as_ref().ok_or(HighsModelError::SolveRequired {
            operation: "solution_snapshot",
        })?;
        let solution = solution.get_solution();

        Ok(SolutionSnapshot {
            col_values: solution.columns().to_vec(),
            col_duals: solution.dual_columns().to_vec(),
            row_values: solution.rows().to_vec(),
            row_duals: solution.dual_rows().to_vec(),
        })
    }
}

impl Default for HighsModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Return the HiGHS version string, if available.
pub fn highs_version() -> Option<String> {
    unsafe {
        let ptr = highs_sys::Highs_version();
        if ptr.is_null() {
            None
        } else {
            CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
        }
    }
}

impl fmt::Debug for HighsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let objective_value = self.solved.as_ref().map(|s| s.objective_value());
        f.debug_struct("HighsModel")
            .field("num_variables", &self.problem.num_cols())
            .field("num_constraints", &self.problem.num_rows())
            .field("objective_sense", &self.objective_sense)
            .field("objective_value", &objective_value)
            .finish_non_exhaustive()
    }
}

fn map_status(status: HighsModelStatus) -> HighsStatus {
    match status {
        HighsModelStatus::Optimal => HighsStatus::Optimal,
        HighsModelStatus::Infeasible => HighsStatus::Infeasible,
        HighsModelStatus::Unbounded => HighsStatus::Unbounded,
        HighsModelStatus::UnboundedOrInfeasible => HighsStatus::UnboundedOrInfeasible,
        HighsModelStatus::ReachedTimeLimit => HighsStatus::ReachedTimeLimit,
        HighsModelStatus::ReachedIterationLimit => HighsStatus::ReachedIterationLimit,
        _ => HighsStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use crate::ffi::{HighsModel, HighsModelError, ObjectiveSense};

    #[test]
    fn test_create_model() {
        let model = HighsModel::new();
        assert_eq!(model.columns(), 0);
        assert!(model.mip_gap().is_none());
        assert!(!model.has_primal_solution());
    }

    #[test]
    fn test_objective_sense() {
        let mut model = HighsModel::new();
        assert_eq!(model.objective_sense, ObjectiveSense::Minimize);

        model.set_objective_sense(ObjectiveSense::Maximize);
        assert_eq!(model.objective_sense, ObjectiveSense::Maximize);
    }

    #[test]
    fn test_results_require_solve() {
        let model = HighsModel::new();
        assert_eq!(
            model.objective_value().unwrap_err(),
            HighsModelError::SolveRequired {
                operation: "objective_value"
            }
        );
        assert!(model.solution_snapshot().is_err());
    }
}
