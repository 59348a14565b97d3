//! HiGHS backend for Cadence models.
//!
//! Linear and mixed-integer models go through the `highs` row-problem API
//! ([`HighsModel`]); quadratic objectives go through the C API with a
//! triangular Hessian ([`quadratic`]). [`HighsSolver`] picks the path,
//! caches the lowered matrix and writes results back onto the model.

pub mod ffi;
pub mod quadratic;
pub mod solver;
mod status;

pub use ffi::{
    HighsModel, HighsModelError, HighsOption, HighsStatus, ObjectiveSense, SolutionSnapshot,
    highs_version,
};
pub use quadratic::{QuadraticError, QuadraticProblem, QuadraticSolution, solve_quadratic};
pub use solver::HighsSolver;
