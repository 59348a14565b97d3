//! Model module for building optimization models.
//!
//! This module provides the core [`Model`] type: an ordered collection of
//! constraint rows over variable columns, plus one objective.
//!
//! # Module Organization
//!
//! - [`error`]: Exchange format error types
//! - [`builder`]: Methods for adding constraints, variables, and objectives
//! - [`storage`]: Column/row lookup and iteration
//! - [`metadata`]: Model name and attached JSON metadata
//! - [`inspect`]: Model inspection and snapshots
//! - [`pretty`]: ASCII rendering
//! - [`exchange`]: Plain-text exchange format

mod builder;
mod error;
mod exchange;
mod inspect;
mod metadata;
mod pretty;
mod storage;

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use cadence_expr::{Constraint, ConstraintId, Variable, VariableId};

use crate::objective::Objective;

pub use error::ExchangeError;
pub use inspect::{
    CoefficientView, ConstraintView, InspectOptions, ModelSnapshot, ObjectiveView,
    QuadraticView, SnapshotMetadata, VariableView,
};
pub use pretty::{PrettyPrintOptions, format_ascii_number};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn fresh_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// A linear or mixed-integer program under construction.
///
/// Rows keep insertion order and columns keep first-appearance order; an
/// index never changes once assigned. The model holds clones of the
/// caller's handles, so solver results are visible through either.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) name: Option<String>,
    pub(crate) variables: Vec<Variable>,
    pub(crate) columns: HashMap<VariableId, usize>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) rows: HashMap<ConstraintId, usize>,
    pub(crate) constraint_names: HashMap<String, usize>,
    pub(crate) objective: Objective,
    revision: u64,
    // Lazy-allocated metadata storage
    pub(crate) variable_metadata: Option<BTreeMap<VariableId, serde_json::Value>>,
    pub(crate) constraint_metadata: Option<BTreeMap<ConstraintId, serde_json::Value>>,
}

impl Model {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self {
            name: None,
            variables: Vec::new(),
            columns: HashMap::new(),
            constraints: Vec::new(),
            rows: HashMap::new(),
            constraint_names: HashMap::new(),
            objective: Objective::default(),
            revision: fresh_revision(),
            variable_metadata: None,
            constraint_metadata: None,
        }
    }

    /// Create a new named model.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    /// Get the objective
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Process-unique stamp of the model structure. Changes whenever a
    /// row, column or objective is added or replaced; bound edits on
    /// variables and enabling or disabling rows leave it unchanged.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision = fresh_revision();
    }

    /// Register `variable` at the next column unless already present.
    /// Returns the column index.
    pub(crate) fn register_variable(&mut self, variable: &Variable) -> usize {
        if let Some(&column) = self.columns.get(&variable.id()) {
            return column;
        }
        let column = self.variables.len();
        self.columns.insert(variable.id(), column);
        self.variables.push(variable.clone());
        tracing::trace!(
            component = "model",
            operation = "register_variable",
            status = "success",
            column,
            name = variable.name(),
            "Registered variable column"
        );
        column
    }

    pub(crate) fn ensure_variable_exists(
        &self,
        variable: &Variable,
    ) -> Result<usize, cadence_expr::ConstructionError> {
        self.columns
            .get(&variable.id())
            .copied()
            .ok_or(cadence_expr::ConstructionError::UnknownVariable { id: variable.id() })
    }

    pub(crate) fn ensure_constraint_exists(
        &self,
        constraint: &Constraint,
    ) -> Result<usize, cadence_expr::ConstructionError> {
        self.rows
            .get(&constraint.id())
            .copied()
            .ok_or(cadence_expr::ConstructionError::UnknownConstraint {
                id: constraint.id(),
            })
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_ascii(PrettyPrintOptions::preview()))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::Sense;
    use cadence_expr::{ConstructionError, Expr};

    mod exchange_format;
    mod metadata_inspect;
    mod support;

    use support::init_tracing;

    #[test]
    fn test_new_model_is_empty() {
        let model = Model::new();
        assert_eq!(model.num_variables(), 0);
        assert_eq!(model.num_constraints(), 0);
        assert_eq!(model.objective().sense(), Sense::Minimize);
    }

    #[test]
    fn test_columns_follow_first_appearance() {
        init_tracing();
        let mut model = Model::new();
        let x = Variable::new("x");
        let y = Variable::new("y");
        let z = Variable::new("z");

        model.add(&(&y + &x).le(4.0)).unwrap();
        model.add(&(&z + &y).ge(1.0)).unwrap();

        assert_eq!(model.column_of(&y), Some(0));
        assert_eq!(model.column_of(&x), Some(1));
        assert_eq!(model.column_of(&z), Some(2));
        let names: Vec<&str> = model.variables().iter().map(Variable::name).collect();
        assert_eq!(names, vec!["y", "x", "z"]);
    }

    #[test]
    fn test_rows_follow_insertion_order() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let first = x.le(10.0);
        let second = x.ge(1.0);
        model.add(&first).unwrap();
        model.add(&second).unwrap();
        assert_eq!(model.row_of(&first), Some(0));
        assert_eq!(model.row_of(&second), Some(1));
        assert_eq!(model.constraint(1).map(Constraint::id), Some(second.id()));
    }

    #[test]
    fn test_readding_constraint_is_rejected() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let c = x.le(1.0);
        model.add(&c).unwrap();
        assert_eq!(
            model.add(&c).unwrap_err(),
            ConstructionError::AlreadyAdded { id: c.id() }
        );
        assert_eq!(model.num_constraints(), 1);
    }

    #[test]
    fn test_duplicate_name_is_rejected_without_partial_state() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let y = Variable::new("y");
        model.add_named("cap", &x.le(1.0)).unwrap();
        let revision = model.revision();

        let err = model.add_named("cap", &y.le(2.0)).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::DuplicateName {
                name: "cap".to_string()
            }
        );
        assert_eq!(model.num_constraints(), 1);
        assert_eq!(model.num_variables(), 1);
        assert!(!model.contains(&y));
        assert_eq!(model.revision(), revision);
    }

    #[test]
    fn test_quadratic_row_is_rejected() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let err = model.add(&(&x * &x).le(1.0)).unwrap_err();
        assert_eq!(err.code(), "CONSTRAINT_UNSUPPORTED_FORM");
        assert_eq!(model.num_variables(), 0);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let err = model.add(&x.between(5.0, 1.0)).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::InvalidBounds {
                lower: 5.0,
                upper: 1.0
            }
        );
    }

    #[test]
    fn test_non_finite_coefficient_is_rejected() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let err = model.add(&(&x / 0.0).le(1.0)).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::NonFiniteCoefficient { .. }
        ));
        assert_eq!(model.num_constraints(), 0);
    }

    #[test]
    fn test_objective_registers_linear_then_quadratic_variables() {
        let mut model = Model::new();
        let a = Variable::new("a");
        let b = Variable::new("b");
        let c = Variable::new("c");
        model.minimize(&a * &b + Expr::term(&c, 2.0)).unwrap();
        assert_eq!(model.column_of(&c), Some(0));
        assert_eq!(model.column_of(&a), Some(1));
        assert_eq!(model.column_of(&b), Some(2));
    }

    #[test]
    fn test_set_objective_replaces_previous() {
        let mut model = Model::new();
        let x = Variable::new("x");
        model.minimize(&x + 1.0).unwrap();
        model.maximize(&x * 3.0).unwrap();
        assert_eq!(model.objective().sense(), Sense::Maximize);
        assert_eq!(model.objective().expr().coefficient(&x), 3.0);
        assert_eq!(model.objective().offset(), 0.0);
        assert_eq!(model.num_variables(), 1);
    }

    #[test]
    fn test_revision_changes_on_structure_only() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let start = model.revision();
        let c = x.le(1.0);
        model.add(&c).unwrap();
        let after_add = model.revision();
        assert_ne!(start, after_add);

        x.set_upper(3.0).unwrap();
        c.set_enabled(false);
        assert_eq!(model.revision(), after_add);

        model.minimize(&x).unwrap();
        assert_ne!(model.revision(), after_add);
        assert_ne!(Model::new().revision(), Model::new().revision());
    }

    #[test]
    fn test_add_variable_is_idempotent() {
        let mut model = Model::new();
        let x = Variable::new("x");
        assert_eq!(model.add_variable(&x), 0);
        assert_eq!(model.add_variable(&x), 0);
        assert_eq!(model.num_variables(), 1);
        assert!(model.contains(&x));
    }

    #[test]
    fn test_add_all_stops_at_first_failure() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let rows = vec![x.le(1.0), x.ge(0.0).named("dup"), x.le(5.0).named("dup")];
        let err = model.add_all(&rows).unwrap_err();
        assert_eq!(err.code(), "NAME_DUPLICATE");
        assert_eq!(model.num_constraints(), 2);
    }

    #[test]
    fn test_lookups_by_name() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let c = x.le(2.0).named("limit");
        model.add(&c).unwrap();
        assert_eq!(
            model.constraint_by_name("limit").map(Constraint::id),
            Some(c.id())
        );
        assert_eq!(model.variable_by_name("x"), Some(&x));
        assert!(model.constraint_by_name("missing").is_none());
        assert!(model.variable_by_name("missing").is_none());
    }

    #[test]
    fn test_added_rows_keep_their_name() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let a = x.le(2.0).named("a");
        let b = x.ge(1.0).named("b");
        model.add(&a).unwrap();
        model.add(&b).unwrap();

        let err = b.set_name("a").unwrap_err();
        assert_eq!(err.code(), "CONSTRAINT_NAME_SEALED");
        assert_eq!(b.name().as_deref(), Some("b"));
        assert_eq!(model.constraint_by_name("a").map(Constraint::id), Some(a.id()));
        assert_eq!(model.constraint_by_name("b").map(Constraint::id), Some(b.id()));
    }

    #[test]
    fn test_add_named_does_not_rename_rows_of_other_models() {
        let x = Variable::new("x");
        let cap = x.le(2.0);
        let mut first = Model::new();
        first.add_named("cap", &cap).unwrap();

        let mut second = Model::new();
        let err = second.add_named("limit", &cap).unwrap_err();
        assert_eq!(err.code(), "CONSTRAINT_NAME_SEALED");
        assert_eq!(second.num_constraints(), 0);
        assert_eq!(cap.name().as_deref(), Some("cap"));
        assert!(first.constraint_by_name("cap").is_some());

        // same name is fine
        second.add_named("cap", &cap).unwrap();
        assert_eq!(second.constraint_by_name("cap").map(Constraint::id), Some(cap.id()));
    }

    #[test]
    fn test_num_coefficients_counts_row_terms() {
        let mut model = Model::new();
        let x = Variable::new("x");
        let y = Variable::new("y");
        model.add(&(&x + &y).le(1.0)).unwrap();
        model.add(&x.ge(0.5)).unwrap();
        assert_eq!(model.num_coefficients(), 3);
        assert_eq!(model.row_terms(0), vec![(0, 1.0), (1, 1.0)]);
    }
}
