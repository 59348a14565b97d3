//! Backend-neutral solve interface.

use cadence_core::{Model, Sense};

use crate::{SolveError, SolveResult, SolverStatus};

/// Read access to solution data by column or row index.
pub trait SolutionView {
    fn objective_value(&self) -> Option<f64>;

    fn status(&self) -> SolverStatus;

    fn get_primal(&self, index: usize) -> Option<f64>;

    /// Reduced cost of a column, when the backend reports duals.
    fn get_variable_dual(&self, index: usize) -> Option<f64>;

    /// Shadow price of a row, when the backend reports duals.
    fn get_constraint_dual(&self, index: usize) -> Option<f64>;

    fn get_row_activity(&self, index: usize) -> Option<f64>;

    fn primal_values(&self) -> &[f64];

    fn solve_time_seconds(&self) -> f64;

    fn is_proven_optimal(&self) -> bool {
        self.status().is_proven_optimal()
    }

    fn is_feasible(&self) -> bool {
        self.status().is_feasible()
    }

    fn is_proven_infeasible(&self) -> bool {
        self.status().is_proven_infeasible()
    }

    fn is_proven_unbounded(&self) -> bool {
        self.status().is_proven_unbounded()
    }
}

/// A solver backend.
///
/// One call is one blocking solve. On return the model's variables,
/// constraints and objective carry the result (or have been cleared).
pub trait Solve {
    /// Solve `model`, optimizing in `sense` regardless of the sense stored
    /// on its objective.
    ///
    /// # Errors
    ///
    /// Returns a `SolveError` when the backend cannot run at all. Infeasible,
    /// unbounded and limit outcomes are reported through the result status.
    fn solve_with_sense(&mut self, model: &Model, sense: Sense) -> Result<SolveResult, SolveError>;

    /// Solve in the objective's own sense.
    fn solve(&mut self, model: &Model) -> Result<SolveResult, SolveError> {
        let sense = model.objective().sense();
        self.solve_with_sense(model, sense)
    }

    fn minimize(&mut self, model: &Model) -> Result<SolveResult, SolveError> {
        self.solve_with_sense(model, Sense::Minimize)
    }

    fn maximize(&mut self, model: &Model) -> Result<SolveResult, SolveError> {
        self.solve_with_sense(model, Sense::Maximize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_expr::Variable;

    /// Records the requested sense and reports an empty optimal result.
    struct RecordingSolver {
        seen: Vec<Sense>,
    }

    impl Solve for RecordingSolver {
        fn solve_with_sense(
            &mut self,
            _model: &Model,
            sense: Sense,
        ) -> Result<SolveResult, SolveError> {
            self.seen.push(sense);
            Ok(SolveResult::without_solution(SolverStatus::Optimal, 0.0))
        }
    }

    #[test]
    fn test_solve_uses_objective_sense() {
        let x = Variable::new("x");
        let mut model = Model::new();
        model.maximize(&x).unwrap();

        let mut solver = RecordingSolver { seen: Vec::new() };
        solver.solve(&model).unwrap();
        solver.minimize(&model).unwrap();
        solver.maximize(&model).unwrap();
        assert_eq!(
            solver.seen,
            vec![Sense::Maximize, Sense::Minimize, Sense::Maximize]
        );
    }

    #[test]
    fn test_solution_view_defaults_follow_status() {
        let result = SolveResult::without_solution(SolverStatus::Unbounded, 0.0);
        assert!(result.is_proven_unbounded());
        assert!(!SolutionView::is_feasible(&result));
        assert!(!SolutionView::is_proven_infeasible(&result));

        let result = SolveResult::without_solution(SolverStatus::ReachedTimeLimit, 0.0);
        assert!(SolutionView::is_feasible(&result));
    }
}
