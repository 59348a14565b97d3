//! HiGHS implementation of [`Solve`].

use std::time::Instant;

use cadence_core::{Model, Sense};
use cadence_solver::{MatrixForm, Solve, SolveError, SolveResult, SolverConfig, SolverStatus};
use tracing::{debug, trace, warn};

use crate::ffi::{
    HighsModel, HighsModelError, HighsOption, HighsStatus, ObjectiveSense, highs_version,
};
use crate::quadratic::{QuadraticError, QuadraticProblem, solve_quadratic};
use crate::status::{highs_may_have_solution, highs_to_solver_status};

/// Solves Cadence models with HiGHS.
///
/// The lowered matrix is cached between solves and reused while the model
/// revision is unchanged; only bounds are re-read in that case.
#[derive(Debug, Default)]
pub struct HighsSolver {
    config: SolverConfig,
    cache: Option<MatrixForm>,
}

impl HighsSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replace the configuration. A change of `relax_integrality` drops the
    /// cached matrix on the next solve.
    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
    }

    fn update_config(&mut self, update: impl FnOnce(SolverConfig) -> SolverConfig) {
        self.config = update(std::mem::take(&mut self.config));
    }

    pub fn set_time_limit(&mut self, seconds: f64) {
        self.update_config(|config| config.with_time_limit(seconds));
    }

    pub fn set_relax_integrality(&mut self, relax: bool) {
        self.update_config(|config| config.with_relax_integrality(relax));
    }

    /// Whether the cached matrix still describes `model`.
    pub fn has_cached_matrix_for(&self, model: &Model) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|form| form.matches(model, self.config.relax_integrality))
    }

    fn prepare(&mut self, model: &Model) -> &MatrixForm {
        let relax = self.config.relax_integrality;
        match self.cache.take() {
            Some(mut form) if form.matches(model, relax) => {
                debug!(
                    component = "solver",
                    operation = "prepare",
                    status = "reuse",
                    revision = form.revision,
                    "Reusing cached matrix; refreshing bounds"
                );
                form.refresh_bounds(model);
                self.cache.insert(form)
            }
            _ => self.cache.insert(MatrixForm::build(model, relax)),
        }
    }
}

impl Solve for HighsSolver {
    fn solve_with_sense(&mut self, model: &Model, sense: Sense) -> Result<SolveResult, SolveError> {
        validate_model(model, &self.config)?;

        let solver_version = highs_version().unwrap_or_else(|| "unknown".to_string());
        let started = Instant::now();
        debug!(
            component = "solver",
            operation = "solve",
            status = "start",
            solver = "highs",
            solver_version = %solver_version,
            variables = model.num_variables() as u64,
            constraints = model.num_constraints() as u64,
            nnz = model.num_coefficients() as u64,
            sense = %sense,
            "Starting solve"
        );

        let options = highs_options(&self.config);
        let form = self.prepare(model);
        let outcome = if form.is_quadratic() {
            solve_qp(form, sense, &options)
        } else {
            solve_lp(form, sense, &options)
        };
        let mut result = match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    component = "solver",
                    operation = "solve",
                    status = "error",
                    error = %err,
                    "HiGHS solve failed"
                );
                // clear values from any earlier solve
                SolveResult::without_solution(SolverStatus::Unknown, 0.0)
                    .write_back(model);
                return Err(err);
            }
        };
        result.solve_time_seconds = started.elapsed().as_secs_f64();
        result.write_back(model);

        if result.status.is_proven_optimal() {
            debug!(
                component = "solver",
                operation = "solve",
                status = "success",
                solver = "highs",
                solver_status = %result.status,
                objective_value = ?result.objective_value,
                iteration_count = ?result.iteration_count,
                mip_gap = ?result.mip_gap,
                duration_ms = result.solve_time_seconds * 1000.0,
                "HiGHS solve completed"
            );
        } else {
            warn!(
                component = "solver",
                operation = "solve",
                status = "warn",
                solver = "highs",
                solver_status = %result.status,
                has_solution = result.has_solution(),
                iteration_count = ?result.iteration_count,
                duration_ms = result.solve_time_seconds * 1000.0,
                "Solver did not prove optimality"
            );
        }
        Ok(result)
    }
}

fn validate_model(model: &Model, config: &SolverConfig) -> Result<(), SolveError> {
    if model.num_variables() == 0 {
        return Err(SolveError::EmptyModel);
    }
    if !model.objective().is_linear()
        && model.has_integer_variables()
        && !config.relax_integrality
    {
        return Err(SolveError::UnsupportedModel {
            reason: "quadratic objective with integer columns; set relax_integrality to solve the relaxation"
                .to_string(),
        });
    }
    Ok(())
}

/// HiGHS option names for a configuration.
fn highs_options(config: &SolverConfig) -> Vec<(&'static str, HighsOption)> {
    let mut options = Vec::new();
    let output = config.log_to_console.unwrap_or(false) || config.verbosity.unwrap_or(0) > 0;
    options.push(("output_flag", HighsOption::Bool(output)));
    options.push(("log_to_console", HighsOption::Bool(output)));

    if let Some(limit) = config.time_limit {
        options.push(("time_limit", HighsOption::Float(limit)));
    }
    if let Some(limit) = config.iteration_limit {
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        options.push(("simplex_iteration_limit", HighsOption::Int(limit)));
    }
    if let Some(gap) = config.mip_gap {
        options.push(("mip_rel_gap", HighsOption::Float(gap)));
    }
    if let Some(presolve) = config.presolve {
        let presolve_str = if presolve { "on" } else { "off" };
        options.push(("presolve", HighsOption::Str(presolve_str.to_string())));
    }
    if let Some(threads) = config.threads {
        let threads = i32::try_from(threads).unwrap_or(i32::MAX);
        options.push(("threads", HighsOption::Int(threads)));
    }
    if let Some(tolerance) = config.tolerance {
        options.push(("primal_feasibility_tolerance", HighsOption::Float(tolerance)));
        options.push(("dual_feasibility_tolerance", HighsOption::Float(tolerance)));
    }
    options
}

fn model_error(err: HighsModelError) -> SolveError {
    SolveError::Backend(err.to_string())
}

fn quadratic_error(err: QuadraticError) -> SolveError {
    match err {
        QuadraticError::CreateFailed => SolveError::BackendUnavailable {
            reason: err.to_string(),
        },
        other => SolveError::Backend(other.to_string()),
    }
}

fn solve_lp(
    form: &MatrixForm,
    sense: Sense,
    options: &[(&'static str, HighsOption)],
) -> Result<SolveResult, SolveError> {
    let mut highs_model = HighsModel::new();
    for (name, value) in options {
        if *name == "output_flag" {
            if let HighsOption::Bool(output) = value {
                highs_model.set_output(*output);
            }
            continue;
        }
        highs_model.set_option(*name, value.clone());
    }
    highs_model.set_objective_sense(match sense {
        Sense::Minimize => ObjectiveSense::Minimize,
        Sense::Maximize => ObjectiveSense::Maximize,
    });

    for col in 0..form.num_cols() {
        let (lower, upper, cost) = (form.col_lower[col], form.col_upper[col], form.objective[col]);
        if form.integrality[col] {
            highs_model.add_integer_col(lower, upper, cost);
        } else {
            highs_model.add_col(lower, upper, cost);
        }
    }
    trace!(
        component = "solver",
        operation = "add_columns",
        status = "success",
        columns = highs_model.columns(),
        integer = form.has_integer_columns(),
        "Added columns to HiGHS"
    );
    for row in 0..form.num_rows() {
        let (columns, coefficients): (Vec<usize>, Vec<f64>) = form.rows.slice(row).unzip();
        highs_model
            .add_row(form.row_lower[row], form.row_upper[row], &columns, &coefficients)
            .map_err(model_error)?;
        trace!(
            component = "solver",
            operation = "add_constraint",
            status = "success",
            row,
            num_coeffs = columns.len(),
            "Added constraint to HiGHS"
        );
    }

    let highs_status = highs_model.solve();
    let status = highs_to_solver_status(highs_status);
    let iteration_count = Some(highs_model.iteration_count());
    let is_mip = form.has_integer_columns();
    let mip_gap = if is_mip { highs_model.mip_gap() } else { None };
    let primal_feasible =
        highs_status == HighsStatus::Optimal || highs_model.has_primal_solution();

    if !highs_may_have_solution(highs_status) || !primal_feasible {
        let mut result = SolveResult::without_solution(status, 0.0);
        result.iteration_count = iteration_count;
        return Ok(result);
    }

    let snapshot = highs_model.solution_snapshot().map_err(model_error)?;
    let objective = highs_model.objective_value().map_err(model_error)? + form.offset;
    let (col_values, col_duals, row_values, row_duals) = snapshot.into_parts();

    Ok(SolveResult {
        status,
        objective_value: Some(objective),
        primal_feasible,
        iteration_count,
        mip_gap,
        solve_time_seconds: 0.0,
        primal_values: col_values,
        row_activities: row_values,
        row_duals: (!is_mip).then_some(row_duals),
        column_duals: (!is_mip).then_some(col_duals),
    })
}

fn solve_qp(
    form: &MatrixForm,
    sense: Sense,
    options: &[(&'static str, HighsOption)],
) -> Result<SolveResult, SolveError> {
    let (col_cost, offset, hessian) = form.minimization_objective(sense);
    let hessian = hessian.unwrap_or_default();
    let matrix = form.to_column_major();
    let problem = QuadraticProblem {
        col_cost: &col_cost,
        col_lower: &form.col_lower,
        col_upper: &form.col_upper,
        row_lower: &form.row_lower,
        row_upper: &form.row_upper,
        matrix: &matrix,
        hessian: &hessian,
        offset,
    };
    let solution = solve_quadratic(&problem, options).map_err(quadratic_error)?;
    let status = highs_to_solver_status(solution.status);

    if !highs_may_have_solution(solution.status) || !solution.primal_feasible {
        let mut result = SolveResult::without_solution(status, 0.0);
        result.iteration_count = Some(solution.iteration_count);
        return Ok(result);
    }

    // Undo the sign flip applied for maximization.
    let sign = match sense {
        Sense::Minimize => 1.0,
        Sense::Maximize => -1.0,
    };
    let flip = |values: Vec<f64>| values.into_iter().map(|v| sign * v).collect::<Vec<_>>();

    Ok(SolveResult {
        status,
        objective_value: Some(sign * solution.objective_value),
        primal_feasible: true,
        iteration_count: Some(solution.iteration_count),
        mip_gap: None,
        solve_time_seconds: 0.0,
        primal_values: solution.col_values,
        row_activities: solution.row_values,
        row_duals: Some(flip(solution.row_duals)),
        column_duals: Some(flip(solution.col_duals)),
    })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use cadence_expr::Variable;

    #[test]
    fn test_empty_model_is_rejected() {
        let model = Model::new();
        let mut solver = HighsSolver::new();
        assert_eq!(solver.solve(&model).unwrap_err(), SolveError::EmptyModel);
    }

    #[test]
    fn test_integer_qp_requires_relaxation() {
        let n = Variable::integer("n", 0.0, 5.0).unwrap();
        let mut model = Model::new();
        model.minimize(&n * &n - 3.0 * &n).unwrap();

        let mut solver = HighsSolver::new();
        let err = solver.solve(&model).unwrap_err();
        assert_eq!(err.code(), "MODEL_UNSUPPORTED");

        solver.set_relax_integrality(true);
        let result = solver.solve(&model).unwrap();
        assert!(result.is_proven_optimal());
        assert!((n.value().unwrap() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_highs_options_mapping() {
        let config = SolverConfig::new()
            .with_time_limit(5.0)
            .with_iteration_limit(u64::MAX)
            .with_presolve(false)
            .with_tolerance(1e-7);
        let options = highs_options(&config);
        assert!(options.contains(&("output_flag", HighsOption::Bool(false))));
        assert!(options.contains(&("time_limit", HighsOption::Float(5.0))));
        assert!(options.contains(&("simplex_iteration_limit", HighsOption::Int(i32::MAX))));
        assert!(options.contains(&("presolve", HighsOption::Str("off".to_string()))));
        assert!(options.contains(&("dual_feasibility_tolerance", HighsOption::Float(1e-7))));

        let loud = highs_options(&SolverConfig::new().with_verbosity(1));
        assert!(loud.contains(&("output_flag", HighsOption::Bool(true))));
    }

    #[test]
    fn test_matrix_is_cached_across_bound_edits() {
        let x = Variable::new("x");
        let mut model = Model::new();
        model.add(&x.le(10.0)).unwrap();
        model.maximize(&x).unwrap();

        let mut solver = HighsSolver::new();
        solver.solve(&model).unwrap();
        assert!(solver.has_cached_matrix_for(&model));
        assert!((x.value().unwrap() - 10.0).abs() < 1e-9);

        x.set_upper(4.0).unwrap();
        assert!(solver.has_cached_matrix_for(&model));
        solver.solve(&model).unwrap();
        assert!((x.value().unwrap() - 4.0).abs() < 1e-9);
    }
}
