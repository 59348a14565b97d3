//! Modeling primitives: variables, expressions and constraints.

pub mod error;
pub mod expr;
pub mod ids;
pub mod variable;

pub use error::ConstructionError;
pub use expr::{
    ComparisonSense, Constraint, Expr, for_all, for_all_unnamed, scalar_product, sum, sum_over,
};
pub use ids::{ConstraintId, VariableId};
pub use variable::{Bounds, Variable, VariableBuilder, VariableKind};
