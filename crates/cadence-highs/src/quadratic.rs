//! Quadratic objectives through the HiGHS C API.
//!
//! The `highs` row-problem API has no Hessian support, so QP solves pass the
//! whole model in one `Highs_passModel` call with a lower-triangular Hessian.
#![allow(unsafe_code)]

use std::ffi::{CString, c_void};
use std::ptr;

use cadence_solver::SparseMatrix;
use highs_sys::HighsInt;
use tracing::{debug, warn};

use crate::ffi::{HighsOption, HighsStatus, SOLUTION_STATUS_FEASIBLE};

const MATRIX_FORMAT_COLUMN_WISE: HighsInt = 1;
const HESSIAN_FORMAT_TRIANGULAR: HighsInt = 1;
const OBJECTIVE_SENSE_MINIMIZE: HighsInt = 1;

const MODEL_STATUS_OPTIMAL: HighsInt = 7;
const MODEL_STATUS_INFEASIBLE: HighsInt = 8;
const MODEL_STATUS_UNBOUNDED_OR_INFEASIBLE: HighsInt = 9;
const MODEL_STATUS_UNBOUNDED: HighsInt = 10;
const MODEL_STATUS_TIME_LIMIT: HighsInt = 13;
const MODEL_STATUS_ITERATION_LIMIT: HighsInt = 14;

/// Failures of the raw C API path.
#[derive(Debug, Clone, PartialEq)]
pub enum QuadraticError {
    /// `Highs_create` returned null.
    CreateFailed,
    /// A size does not fit in `HighsInt`.
    TooLarge { what: &'static str, value: usize },
    /// A call returned `kHighsStatusError`.
    Call { function: &'static str, code: i32 },
    InvalidOptionName(String),
}

impl std::fmt::Display for QuadraticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuadraticError::CreateFailed => write!(f, "Highs_create returned null"),
            QuadraticError::TooLarge { what, value } => {
                write!(f, "{what} ({value}) exceeds the HiGHS index range")
            }
            QuadraticError::Call { function, code } => {
                write!(f, "{function} failed with status {code}")
            }
            QuadraticError::InvalidOptionName(name) => {
                write!(f, "option name {name:?} contains a NUL byte")
            }
        }
    }
}

impl std::error::Error for QuadraticError {}

/// Dense problem data for one QP solve, already in minimization form.
#[derive(Debug)]
pub struct QuadraticProblem<'a> {
    pub col_cost: &'a [f64],
    pub col_lower: &'a [f64],
    pub col_upper: &'a [f64],
    pub row_lower: &'a [f64],
    pub row_upper: &'a [f64],
    /// Constraint matrix, column-wise.
    pub matrix: &'a SparseMatrix,
    /// Lower triangle of the Hessian, column-wise.
    pub hessian: &'a SparseMatrix,
    pub offset: f64,
}

/// Raw output of a QP solve.
#[derive(Debug, Clone)]
pub struct QuadraticSolution {
    pub status: HighsStatus,
    pub primal_feasible: bool,
    pub objective_value: f64,
    pub iteration_count: u64,
    pub col_values: Vec<f64>,
    pub col_duals: Vec<f64>,
    pub row_values: Vec<f64>,
    pub row_duals: Vec<f64>,
}

/// Owned `Highs` instance, destroyed on drop.
struct RawHighs(*mut c_void);

impl RawHighs {
    fn create() -> Result<Self, QuadraticError> {
        let handle = unsafe { highs_sys::Highs_create() };
        if handle.is_null() {
            return Err(QuadraticError::CreateFailed);
        }
        Ok(RawHighs(handle))
    }

    fn set_option(&mut self, name: &str, value: &HighsOption) -> Result<(), QuadraticError> {
        let c_name =
            CString::new(name).map_err(|_| QuadraticError::InvalidOptionName(name.to_string()))?;
        let code = unsafe {
            match value {
                HighsOption::Bool(val) => highs_sys::Highs_setBoolOptionValue(
                    self.0,
                    c_name.as_ptr(),
                    HighsInt::from(*val),
                ),
                HighsOption::Int(val) => {
                    highs_sys::Highs_setIntOptionValue(self.0, c_name.as_ptr(), *val)
                }
                HighsOption::Float(val) => {
                    highs_sys::Highs_setDoubleOptionValue(self.0, c_name.as_ptr(), *val)
                }
                HighsOption::Str(val) => {
                    let c_value = CString::new(val.as_str())
                        .map_err(|_| QuadraticError::InvalidOptionName(val.clone()))?;
                    highs_sys::Highs_setStringOptionValue(self.0, c_name.as_ptr(), c_value.as_ptr())
                }
            }
        };
        check(code, "Highs_set*OptionValue")
    }

    fn int_info(&self, name: &str) -> Option<u64> {
        let c_name = CString::new(name).ok()?;
        let mut value: HighsInt = 0;
        let code =
            unsafe { highs_sys::Highs_getIntInfoValue(self.0, c_name.as_ptr(), &raw mut value) };
        if code != highs_sys::STATUS_OK {
            return None;
        }
        u64::try_from(value).ok()
    }
}

impl Drop for RawHighs {
    fn drop(&mut self) {
        unsafe { highs_sys::Highs_destroy(self.0) };
    }
}

fn check(code: HighsInt, function: &'static str) -> Result<(), QuadraticError> {
    if code == highs_sys::STATUS_ERROR {
        return Err(QuadraticError::Call { function, code });
    }
    if code != highs_sys::STATUS_OK {
        warn!(
            component = "solver",
            operation = "highs_call",
            status = "warn",
            function,
            status_code = code,
            "HiGHS call returned a warning"
        );
    }
    Ok(())
}

fn to_highs_int(what: &'static str, value: usize) -> Result<HighsInt, QuadraticError> {
    HighsInt::try_from(value).map_err(|_| QuadraticError::TooLarge { what, value })
}

fn to_highs_indices(what: &'static str, values: &[usize]) -> Result<Vec<HighsInt>, QuadraticError> {
    values.iter().map(|&value| to_highs_int(what, value)).collect()
}

fn map_model_status(code: HighsInt) -> HighsStatus {
    match code {
        MODEL_STATUS_OPTIMAL => HighsStatus::Optimal,
        MODEL_STATUS_INFEASIBLE => HighsStatus::Infeasible,
        MODEL_STATUS_UNBOUNDED_OR_INFEASIBLE => HighsStatus::UnboundedOrInfeasible,
        MODEL_STATUS_UNBOUNDED => HighsStatus::Unbounded,
        MODEL_STATUS_TIME_LIMIT => HighsStatus::ReachedTimeLimit,
        MODEL_STATUS_ITERATION_LIMIT => HighsStatus::ReachedIterationLimit,
        _ => HighsStatus::Unknown,
    }
}

/// Minimize `offset + c'x + 0.5 x'Qx` subject to row and column bounds.
pub fn solve_quadratic(
    problem: &QuadraticProblem<'_>,
    options: &[(&'static str, HighsOption)],
) -> Result<QuadraticSolution, QuadraticError> {
    let num_col = problem.col_cost.len();
    let num_row = problem.row_lower.len();

    let a_start = to_highs_indices("matrix start", &problem.matrix.starts)?;
    let a_index = to_highs_indices("matrix index", &problem.matrix.indices)?;
    let q_start = to_highs_indices("hessian start", &problem.hessian.starts)?;
    let q_index = to_highs_indices("hessian index", &problem.hessian.indices)?;

    let mut highs = RawHighs::create()?;
    for (name, value) in options {
        highs.set_option(name, value)?;
    }

    let code = unsafe {
        highs_sys::Highs_passModel(
            highs.0,
            to_highs_int("columns", num_col)?,
            to_highs_int("rows", num_row)?,
            to_highs_int("nonzeros", problem.matrix.num_nonzeros())?,
            to_highs_int("hessian nonzeros", problem.hessian.num_nonzeros())?,
            MATRIX_FORMAT_COLUMN_WISE,
            HESSIAN_FORMAT_TRIANGULAR,
            OBJECTIVE_SENSE_MINIMIZE,
            problem.offset,
            problem.col_cost.as_ptr(),
            problem.col_lower.as_ptr(),
            problem.col_upper.as_ptr(),
            problem.row_lower.as_ptr(),
            problem.row_upper.as_ptr(),
            a_start.as_ptr(),
            a_index.as_ptr(),
            problem.matrix.values.as_ptr(),
            q_start.as_ptr(),
            q_index.as_ptr(),
            problem.hessian.values.as_ptr(),
            ptr::null(),
        )
    };
    check(code, "Highs_passModel")?;

    let code = unsafe { highs_sys::Highs_run(highs.0) };
    check(code, "Highs_run")?;

    let status = map_model_status(unsafe { highs_sys::Highs_getModelStatus(highs.0) });
    let primal_feasible = status == HighsStatus::Optimal
        || highs.int_info("primal_solution_status") == Some(SOLUTION_STATUS_FEASIBLE);
    let iteration_count = ["simplex_iteration_count", "qp_iteration_count"]
        .iter()
        .filter_map(|name| highs.int_info(name))
        .sum();

    let mut col_values = vec![0.0; num_col];
    let mut col_duals = vec![0.0; num_col];
    let mut row_values = vec![0.0; num_row];
    let mut row_duals = vec![0.0; num_row];
    let code = unsafe {
        highs_sys::Highs_getSolution(
            highs.0,
            col_values.as_mut_ptr(),
            col_duals.as_mut_ptr(),
            row_values.as_mut_ptr(),
            row_duals.as_mut_ptr(),
        )
    };
    check(code, "Highs_getSolution")?;
    let objective_value = unsafe { highs_sys::Highs_getObjectiveValue(highs.0) };

    debug!(
        component = "solver",
        operation = "solve_quadratic",
        status = "success",
        solver_status = ?status,
        num_cols = num_col,
        num_rows = num_row,
        hessian_nonzeros = problem.hessian.num_nonzeros(),
        objective_value,
        iteration_count,
        "HiGHS QP solve completed"
    );

    Ok(QuadraticSolution {
        status,
        primal_feasible,
        objective_value,
        iteration_count,
        col_values,
        col_duals,
        row_values,
        row_duals,
    })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_model_status_codes() {
        assert_eq!(map_model_status(7), HighsStatus::Optimal);
        assert_eq!(map_model_status(8), HighsStatus::Infeasible);
        assert_eq!(map_model_status(9), HighsStatus::UnboundedOrInfeasible);
        assert_eq!(map_model_status(10), HighsStatus::Unbounded);
        assert_eq!(map_model_status(13), HighsStatus::ReachedTimeLimit);
        assert_eq!(map_model_status(14), HighsStatus::ReachedIterationLimit);
        assert_eq!(map_model_status(0), HighsStatus::Unknown);
    }

    #[test]
    fn test_single_variable_qp() {
        // min x^2 - 2x  ->  x = 1, objective -1
        let matrix = SparseMatrix {
            starts: vec![0, 0],
            indices: vec![],
            values: vec![],
        };
        let hessian = SparseMatrix {
            starts: vec![0, 1],
            indices: vec![0],
            values: vec![2.0],
        };
        let problem = QuadraticProblem {
            col_cost: &[-2.0],
            col_lower: &[f64::NEG_INFINITY],
            col_upper: &[f64::INFINITY],
            row_lower: &[],
            row_upper: &[],
            matrix: &matrix,
            hessian: &hessian,
            offset: 0.0,
        };
        let options = [("output_flag", HighsOption::Bool(false))];
        let solution = solve_quadratic(&problem, &options).unwrap();
        assert_eq!(solution.status, HighsStatus::Optimal);
        assert!(solution.primal_feasible);
        assert!((solution.col_values[0] - 1.0).abs() < 1e-6);
        assert!((solution.objective_value + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_error_display() {
        let err = QuadraticError::Call {
            function: "Highs_run",
            code: -1,
        };
        assert_eq!(err.to_string(), "Highs_run failed with status -1");
        let err = QuadraticError::TooLarge {
            what: "columns",
            value: 5,
        };
        assert!(err.to_string().contains("columns (5)"));
    }
}
