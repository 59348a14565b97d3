//! Decision variables.
//!
//! A [`Variable`] is a cheap-to-clone handle. Clones share identity, bounds and
//! the solution value written back by a solver, so a caller can keep a handle
//! while the model holds another.

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::ConstructionError;
use crate::expr::{Constraint, Expr};
use crate::ids::VariableId;

/// Lower and upper bound pair for a variable or constraint row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// (-inf, +inf)
    pub fn free() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// [0, +inf)
    pub fn non_negative() -> Self {
        Self::new(0.0, f64::INFINITY)
    }

    pub fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn binary() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Reject NaN bounds and `lower > upper`.
    pub fn validate(self) -> Result<Self, ConstructionError> {
        if self.lower.is_nan() || self.upper.is_nan() || self.lower > self.upper {
            return Err(ConstructionError::InvalidBounds {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(self)
    }

    pub fn is_fixed(self) -> bool {
        self.lower == self.upper
    }

    /// Whether `value` lies within the bounds, allowing `tolerance` slack on each side.
    pub fn contains(self, value: f64, tolerance: f64) -> bool {
        value >= self.lower - tolerance && value <= self.upper + tolerance
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariableKind {
    #[default]
    Continuous,
    Integer,
    /// Integer restricted to [0, 1].
    Binary,
}

impl VariableKind {
    pub fn is_integer(self) -> bool {
        matches!(self, VariableKind::Integer | VariableKind::Binary)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Continuous => "continuous",
            VariableKind::Integer => "integer",
            VariableKind::Binary => "binary",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct VariableCell {
    id: VariableId,
    name: String,
    kind: VariableKind,
    bounds: Cell<Bounds>,
    // Original bounds while frozen at a solution value.
    frozen: Cell<Option<Bounds>>,
    value: Cell<Option<f64>>,
}

/// A named, bounded decision quantity.
///
/// Equality, ordering and hashing use the process-unique [`VariableId`] only.
#[derive(Clone)]
pub struct Variable(Rc<VariableCell>);

impl Variable {
    // ── Constructors ────────────────────────────────────────

    /// Continuous variable with bounds [0, +inf).
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(
            Some(name.into()),
            Bounds::non_negative(),
            VariableKind::Continuous,
        )
    }

    pub fn builder() -> VariableBuilder {
        VariableBuilder::default()
    }

    pub fn continuous(
        name: impl Into<String>,
        lower: f64,
        upper: f64,
    ) -> Result<Self, ConstructionError> {
        Self::builder().name(name).bounds(lower, upper).build()
    }

    pub fn integer(
        name: impl Into<String>,
        lower: f64,
        upper: f64,
    ) -> Result<Self, ConstructionError> {
        Self::builder()
            .name(name)
            .bounds(lower, upper)
            .integer()
            .build()
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self::from_parts(Some(name.into()), Bounds::binary(), VariableKind::Binary)
    }

    fn try_new(
        name: Option<String>,
        bounds: Bounds,
        kind: VariableKind,
    ) -> Result<Self, ConstructionError> {
        let bounds = bounds.validate()?;
        if kind == VariableKind::Binary {
            check_binary_bounds(bounds)?;
        }
        Ok(Self::from_parts(name, bounds, kind))
    }

    fn from_parts(name: Option<String>, bounds: Bounds, kind: VariableKind) -> Self {
        let id = VariableId::fresh();
        let name = name.unwrap_or_else(|| format!("Var_{id}"));
        Variable(Rc::new(VariableCell {
            id,
            name,
            kind,
            bounds: Cell::new(bounds),
            frozen: Cell::new(None),
            value: Cell::new(None),
        }))
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn id(&self) -> VariableId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> VariableKind {
        self.0.kind
    }

    pub fn is_integer(&self) -> bool {
        self.0.kind.is_integer()
    }

    pub fn bounds(&self) -> Bounds {
        self.0.bounds.get()
    }

    pub fn lower(&self) -> f64 {
        self.bounds().lower
    }

    pub fn upper(&self) -> f64 {
        self.bounds().upper
    }

    /// Value from the most recent solve, if any.
    pub fn value(&self) -> Option<f64> {
        self.0.value.get()
    }

    pub fn is_frozen(&self) -> bool {
        self.0.frozen.get().is_some()
    }

    /// Bounds saved by [`Variable::freeze`], if frozen.
    pub fn frozen_bounds(&self) -> Option<Bounds> {
        self.0.frozen.get()
    }

    // ── Bound mutation ──────────────────────────────────────

    /// Replace both bounds. Clears any cached solution value.
    /// Replace the bounds. On a frozen variable the new bounds win and the
    /// bounds saved by [`Variable::freeze`] are dropped.
    pub fn set_bounds(&self, lower: f64, upper: f64) -> Result<(), ConstructionError> {
        let bounds = Bounds::new(lower, upper).validate()?;
        if self.0.kind == VariableKind::Binary {
            check_binary_bounds(bounds)?;
        }
        self.0.bounds.set(bounds);
        self.0.frozen.set(None);
        self.0.value.set(None);
        Ok(())
    }

    pub fn set_lower(&self, lower: f64) -> Result<(), ConstructionError> {
        self.set_bounds(lower, self.upper())
    }

    pub fn set_upper(&self, upper: f64) -> Result<(), ConstructionError> {
        self.set_bounds(self.lower(), upper)
    }

    /// Fix the variable to a single value.
    pub fn fix(&self, value: f64) -> Result<(), ConstructionError> {
        self.set_bounds(value, value)
    }

    /// Fix the variable at its current solution value, remembering the
    /// original bounds. Integer variables are rounded to the nearest integer.
    ///
    /// Returns the frozen value, or `None` if the variable has no value yet.
    pub fn freeze(&self) -> Option<f64> {
        let value = self.value()?;
        let value = if self.is_integer() {
            value.round()
        } else {
            value
        };
        if self.0.frozen.get().is_none() {
            self.0.frozen.set(Some(self.bounds()));
        }
        self.0.bounds.set(Bounds::fixed(value));
        Some(value)
    }

    /// Restore the bounds saved by [`Variable::freeze`]. Returns whether the
    /// variable was frozen.
    pub fn unfreeze(&self) -> bool {
        match self.0.frozen.take() {
            Some(original) => {
                self.0.bounds.set(original);
                true
            }
            None => false,
        }
    }

    // ── Solution write-back ─────────────────────────────────

    /// Store a solution value. Called by solver bridges.
    pub fn record_value(&self, value: f64) {
        self.0.value.set(Some(value));
    }

    pub fn clear_value(&self) {
        self.0.value.set(None);
    }

    /// Check the current value against bounds and integrality.
    ///
    /// Returns `None` when the variable has not been solved.
    pub fn is_feasible(&self, tolerance: f64) -> Option<bool> {
        let value = self.value()?;
        let in_bounds = self.bounds().contains(value, tolerance);
        let integral = !self.is_integer() || (value - value.round()).abs() <= tolerance;
        Some(in_bounds && integral)
    }

    /// One-line description: `name : kind : [lower, upper]`.
    pub fn describe(&self) -> String {
        let bounds = self.bounds();
        format!(
            "{} : {} : [{}, {}]",
            self.name(),
            self.kind(),
            bounds.lower,
            bounds.upper
        )
    }

    // ── Relations (produce Constraint) ──────────────────────

    pub fn le(&self, rhs: impl Into<Expr>) -> Constraint {
        Expr::from(self).le(rhs)
    }

    pub fn ge(&self, rhs: impl Into<Expr>) -> Constraint {
        Expr::from(self).ge(rhs)
    }

    pub fn equals(&self, rhs: impl Into<Expr>) -> Constraint {
        Expr::from(self).equals(rhs)
    }

    pub fn between(&self, lower: f64, upper: f64) -> Constraint {
        Expr::from(self).between(lower, upper)
    }
}

fn check_binary_bounds(bounds: Bounds) -> Result<(), ConstructionError> {
    if bounds.lower < 0.0 || bounds.upper > 1.0 {
        return Err(ConstructionError::InvalidBounds {
            lower: bounds.lower,
            upper: bounds.upper,
        });
    }
    Ok(())
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Variable {}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("kind", &self.0.kind)
            .field("bounds", &self.bounds())
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builder for variables and indexed variable families.
#[derive(Debug, Clone)]
pub struct VariableBuilder {
    name: Option<String>,
    bounds: Bounds,
    kind: VariableKind,
}

impl Default for VariableBuilder {
    fn default() -> Self {
        Self {
            name: None,
            bounds: Bounds::non_negative(),
            kind: VariableKind::Continuous,
        }
    }
}

impl VariableBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bounds(mut self, lower: f64, upper: f64) -> Self {
        self.bounds = Bounds::new(lower, upper);
        self
    }

    pub fn lower(mut self, lower: f64) -> Self {
        self.bounds.lower = lower;
        self
    }

    pub fn upper(mut self, upper: f64) -> Self {
        self.bounds.upper = upper;
        self
    }

    pub fn free(self) -> Self {
        self.bounds(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn kind(mut self, kind: VariableKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn integer(self) -> Self {
        self.kind(VariableKind::Integer)
    }

    /// Binary kind; also resets bounds to [0, 1].
    pub fn binary(mut self) -> Self {
        self.kind = VariableKind::Binary;
        self.bounds = Bounds::binary();
        self
    }

    pub fn build(&self) -> Result<Variable, ConstructionError> {
        Variable::try_new(self.name.clone(), self.bounds, self.kind)
    }

    /// Build `count` variables named `name[0]`, `name[1]`, ...
    pub fn build_vec(&self, count: usize) -> Result<Vec<Variable>, ConstructionError> {
        (0..count)
            .map(|index| Variable::try_new(self.indexed_name(&index), self.bounds, self.kind))
            .collect()
    }

    /// Build one variable per key, named `name[key]`, preserving key order.
    pub fn build_map<K, I>(&self, keys: I) -> Result<IndexMap<K, Variable>, ConstructionError>
    where
        K: std::hash::Hash + Eq + fmt::Display,
        I: IntoIterator<Item = K>,
    {
        let mut family = IndexMap::new();
        for key in keys {
            let variable = Variable::try_new(self.indexed_name(&key), self.bounds, self.kind)?;
            family.insert(key, variable);
        }
        Ok(family)
    }

    fn indexed_name(&self, key: &dyn fmt::Display) -> Option<String> {
        self.name.as_ref().map(|base| format!("{base}[{key}]"))
    }
}
