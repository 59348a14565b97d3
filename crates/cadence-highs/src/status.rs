//! Status conversions for HiGHS integration.

use crate::ffi::HighsStatus;
use cadence_solver::SolverStatus;

pub(crate) fn highs_to_solver_status(status: HighsStatus) -> SolverStatus {
    match status {
        HighsStatus::Optimal => SolverStatus::Optimal,
        HighsStatus::Infeasible => SolverStatus::Infeasible,
        HighsStatus::Unbounded => SolverStatus::Unbounded,
        HighsStatus::UnboundedOrInfeasible => SolverStatus::InfeasibleOrUnbounded,
        HighsStatus::ReachedTimeLimit => SolverStatus::ReachedTimeLimit,
        HighsStatus::ReachedIterationLimit => SolverStatus::ReachedIterationLimit,
        HighsStatus::Unknown => SolverStatus::Unknown,
    }
}

/// Whether solution values may be read for this status. On a limit the
/// primal solution status decides.
pub(crate) fn highs_may_have_solution(status: HighsStatus) -> bool {
    matches!(
        status,
        HighsStatus::Optimal | HighsStatus::ReachedTimeLimit | HighsStatus::ReachedIterationLimit
    )
}
