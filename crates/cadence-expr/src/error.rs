//! Construction errors shared by variables, expressions, constraints and models.

use crate::ids::{ConstraintId, VariableId};

/// Errors raised synchronously while building a model.
///
/// A failing call never leaves partially registered state behind.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructionError {
    /// Lower bound exceeds upper bound, or a bound is NaN.
    InvalidBounds { lower: f64, upper: f64 },
    /// A constraint with this name is already present in the model.
    DuplicateName { name: String },
    /// The constraint object was already added to the model.
    AlreadyAdded { id: ConstraintId },
    /// The constraint cannot be expressed as a linear row.
    UnsupportedConstraintForm { reason: &'static str },
    /// A coefficient or constant is NaN or infinite.
    NonFiniteCoefficient { context: &'static str, value: f64 },
    /// Division of an expression by zero.
    DivisionByZero,
    /// Product or square of an expression that already has quadratic terms.
    NonLinearOperand,
    /// Paired inputs have different lengths.
    MismatchedLengths { left: usize, right: usize },
    /// The variable is not registered in the model.
    UnknownVariable { id: VariableId },
    /// The constraint is not registered in the model.
    UnknownConstraint { id: ConstraintId },
    /// The constraint belongs to a model, which fixes its name.
    NameSealed { id: ConstraintId },
}

impl ConstructionError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ConstructionError::InvalidBounds { .. } => "BOUNDS_INVALID",
            ConstructionError::DuplicateName { .. } => "NAME_DUPLICATE",
            ConstructionError::AlreadyAdded { .. } => "CONSTRAINT_ALREADY_ADDED",
            ConstructionError::UnsupportedConstraintForm { .. } => "CONSTRAINT_UNSUPPORTED_FORM",
            ConstructionError::NonFiniteCoefficient { .. } => "EXPR_NON_FINITE",
            ConstructionError::DivisionByZero => "EXPR_DIVISION_BY_ZERO",
            ConstructionError::NonLinearOperand => "EXPR_NON_LINEAR_OPERAND",
            ConstructionError::MismatchedLengths { .. } => "EXPR_MISMATCHED_LENGTHS",
            ConstructionError::UnknownVariable { .. } => "VARIABLE_UNKNOWN",
            ConstructionError::UnknownConstraint { .. } => "CONSTRAINT_UNKNOWN",
            ConstructionError::NameSealed { .. } => "CONSTRAINT_NAME_SEALED",
        }
    }
}

impl std::fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructionError::InvalidBounds { lower, upper } => write!(
                f,
                "[{}] Bounds invalid: lower ({}) must not exceed upper ({})",
                self.code(),
                lower,
                upper
            ),
            ConstructionError::DuplicateName { name } => write!(
                f,
                "[{}] A constraint named '{}' already exists in the model",
                self.code(),
                name
            ),
            ConstructionError::AlreadyAdded { id } => write!(
                f,
                "[{}] Constraint {} was already added to the model",
                self.code(),
                id
            ),
            ConstructionError::UnsupportedConstraintForm { reason } => {
                write!(f, "[{}] Unsupported constraint: {}", self.code(), reason)
            }
            ConstructionError::NonFiniteCoefficient { context, value } => write!(
                f,
                "[{}] Non-finite value {} in {}",
                self.code(),
                value,
                context
            ),
            ConstructionError::DivisionByZero => {
                write!(f, "[{}] Expression divided by zero", self.code())
            }
            ConstructionError::NonLinearOperand => write!(
                f,
                "[{}] Only linear expressions can be multiplied or squared",
                self.code()
            ),
            ConstructionError::MismatchedLengths { left, right } => write!(
                f,
                "[{}] Inputs must have the same length ({} vs {})",
                self.code(),
                left,
                right
            ),
            ConstructionError::UnknownVariable { id } => write!(
                f,
                "[{}] Variable {} is not part of the model",
                self.code(),
                id
            ),
            ConstructionError::UnknownConstraint { id } => write!(
                f,
                "[{}] Constraint {} is not part of the model",
                self.code(),
                id
            ),
            ConstructionError::NameSealed { id } => write!(
                f,
                "[{}] Constraint {} belongs to a model and cannot be renamed",
                self.code(),
                id
            ),
        }
    }
}

impl std::error::Error for ConstructionError {}
