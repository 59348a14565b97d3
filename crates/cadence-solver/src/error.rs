//! Solve-time error types.

/// Failures that prevent a solve from producing any status.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The backend could not be created or initialized.
    BackendUnavailable { reason: String },
    /// Model has no variables.
    EmptyModel,
    /// The model uses a form the backend cannot solve.
    UnsupportedModel { reason: String },
    /// The backend rejected the problem or failed during the run.
    Backend(String),
}

impl SolveError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolveError::BackendUnavailable { .. } => "SOLVER_UNAVAILABLE",
            SolveError::EmptyModel => "MODEL_EMPTY",
            SolveError::UnsupportedModel { .. } => "MODEL_UNSUPPORTED",
            SolveError::Backend(_) => "SOLVER_INTERNAL",
        }
    }
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::BackendUnavailable { reason } => {
                write!(f, "[{}] Solver backend unavailable: {}", self.code(), reason)
            }
            SolveError::EmptyModel => write!(f, "[{}] Model has no variables", self.code()),
            SolveError::UnsupportedModel { reason } => {
                write!(f, "[{}] Unsupported model: {}", self.code(), reason)
            }
            SolveError::Backend(msg) => {
                write!(f, "[{}] Solver internal error: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for SolveError {}
