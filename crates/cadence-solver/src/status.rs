//! Terminal solve status.

use serde::Serialize;

/// Outcome reported by the backend. Infeasible and unbounded models are
/// statuses, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Presolve proved one of the two without deciding which.
    InfeasibleOrUnbounded,
    /// Stopped on the time limit; a feasible point may be available.
    ReachedTimeLimit,
    /// Stopped on the iteration limit; a feasible point may be available.
    ReachedIterationLimit,
    Unknown,
}

impl SolverStatus {
    pub fn is_proven_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    /// Optimal, or stopped on a limit. Whether a point is actually available
    /// on a limit is reported by [`crate::SolveResult::has_solution`].
    pub fn is_feasible(self) -> bool {
        matches!(
            self,
            SolverStatus::Optimal
                | SolverStatus::ReachedTimeLimit
                | SolverStatus::ReachedIterationLimit
        )
    }

    pub fn is_proven_infeasible(self) -> bool {
        matches!(self, SolverStatus::Infeasible)
    }

    pub fn is_proven_unbounded(self) -> bool {
        matches!(self, SolverStatus::Unbounded)
    }

    pub fn is_limit(self) -> bool {
        matches!(
            self,
            SolverStatus::ReachedTimeLimit | SolverStatus::ReachedIterationLimit
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Unbounded => "unbounded",
            SolverStatus::InfeasibleOrUnbounded => "infeasible_or_unbounded",
            SolverStatus::ReachedTimeLimit => "time_limit",
            SolverStatus::ReachedIterationLimit => "iteration_limit",
            SolverStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_proven_optimal() {
        assert!(SolverStatus::Optimal.is_proven_optimal());
        assert!(!SolverStatus::Infeasible.is_proven_optimal());
        assert!(!SolverStatus::ReachedTimeLimit.is_proven_optimal());
        assert!(!SolverStatus::Unknown.is_proven_optimal());
    }

    #[test]
    fn test_status_is_feasible() {
        assert!(SolverStatus::Optimal.is_feasible());
        assert!(SolverStatus::ReachedTimeLimit.is_feasible());
        assert!(SolverStatus::ReachedIterationLimit.is_feasible());
        assert!(!SolverStatus::Infeasible.is_feasible());
        assert!(!SolverStatus::Unbounded.is_feasible());
        assert!(!SolverStatus::InfeasibleOrUnbounded.is_feasible());
    }

    #[test]
    fn test_ambiguous_status_proves_nothing() {
        let status = SolverStatus::InfeasibleOrUnbounded;
        assert!(!status.is_proven_infeasible());
        assert!(!status.is_proven_unbounded());
        assert!(!status.is_limit());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(SolverStatus::Optimal.to_string(), "optimal");
        assert_eq!(SolverStatus::ReachedTimeLimit.as_str(), "time_limit");
        assert_eq!(
            serde_json::to_string(&SolverStatus::InfeasibleOrUnbounded).unwrap(),
            "\"infeasible_or_unbounded\""
        );
    }
}
