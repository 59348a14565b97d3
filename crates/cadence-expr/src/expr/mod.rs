//! Expression types for optimization modeling.
//!
//! - `core`      : Expr: canonical linear and quadratic terms + constant
//! - `ops`       : operator overloads over Variable, Expr and f64
//! - `constraint`: Constraint: bounded row built from a relation
//! - `builders`  : Sum / ForAll combinators over index sets

pub mod builders;
pub mod constraint;
pub mod core;
mod ops;

pub use builders::{for_all, for_all_unnamed, scalar_product, sum, sum_over};
pub use constraint::{ComparisonSense, Constraint};
pub use core::Expr;
