//! Cadence model container: objective, row/column registration, inspection
//! and the plain-text exchange format.

pub mod model;
pub mod objective;
pub mod types;

pub use model::{
    CoefficientView, ConstraintView, ExchangeError, InspectOptions, Model, ModelSnapshot,
    ObjectiveView, PrettyPrintOptions, QuadraticView, SnapshotMetadata, VariableView,
    format_ascii_number,
};
pub use objective::Objective;
pub use types::Sense;
