//! Backend-neutral solver layer for Cadence models.
//!
//! - [`SolverConfig`]: options passed through to the backend
//! - [`SolverStatus`]: terminal status of a solve
//! - [`SolveError`]: failures that prevent a solve from running
//! - [`MatrixForm`]: a model lowered to sparse arrays
//! - [`SolveResult`]: raw backend output plus write-back onto the model
//! - [`SolutionReport`]: named dump of a result
//! - [`Solve`] / [`SolutionView`]: traits implemented by backends

mod config;
mod error;
mod matrix;
mod report;
mod result;
mod status;
mod traits;

pub use config::SolverConfig;
pub use error::SolveError;
pub use matrix::{MatrixForm, SparseMatrix};
pub use report::{ConstraintValue, SolutionReport, VariableValue};
pub use result::SolveResult;
pub use status::SolverStatus;
pub use traits::{SolutionView, Solve};
