//! Constraints: a constant-free expression between a lower and an upper bound.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::ConstructionError;
use crate::expr::core::Expr;
use crate::ids::ConstraintId;
use crate::variable::Bounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonSense {
    LessEqual,
    GreaterEqual,
    Equal,
    /// Both bounds finite or not, set explicitly.
    Range,
}

impl ComparisonSense {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "le",
            ComparisonSense::GreaterEqual => "ge",
            ComparisonSense::Equal => "eq",
            ComparisonSense::Range => "range",
        }
    }

    pub fn operator(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "<=",
            ComparisonSense::GreaterEqual => ">=",
            ComparisonSense::Equal => "==",
            ComparisonSense::Range => "in",
        }
    }
}

struct ConstraintCell {
    id: ConstraintId,
    name: RefCell<Option<String>>,
    /// Set once a model registers the row; the name is fixed from then on.
    name_sealed: Cell<bool>,
    expr: Expr,
    sense: ComparisonSense,
    bounds: Bounds,
    enabled: Cell<bool>,
    activity: Cell<Option<f64>>,
    dual: Cell<Option<f64>>,
}

/// A linear (or, until rejected by a model, quadratic) row with bounds.
///
/// Like [`crate::Variable`], this is a shared handle: the model keeps one
/// clone and solver results written to it are visible through every other.
#[derive(Clone)]
pub struct Constraint(Rc<ConstraintCell>);

impl Constraint {
    // ── Construction ────────────────────────────────────────

    /// Rearrange `lhs <sense> rhs` into `expr <sense> bound` with every
    /// variable term on the left and the constants folded into the bound.
    pub fn compare(lhs: &Expr, sense: ComparisonSense, rhs: &Expr) -> Self {
        let combined = lhs.sub_expr(rhs);
        let bound = -combined.constant();
        let bounds = match sense {
            ComparisonSense::LessEqual => Bounds::new(f64::NEG_INFINITY, bound),
            ComparisonSense::GreaterEqual => Bounds::new(bound, f64::INFINITY),
            ComparisonSense::Equal | ComparisonSense::Range => Bounds::fixed(bound),
        };
        let sense = match sense {
            ComparisonSense::Range => ComparisonSense::Equal,
            other => other,
        };
        Self::from_parts(combined.without_constant(), sense, bounds)
    }

    pub fn le(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(&lhs.into(), ComparisonSense::LessEqual, &rhs.into())
    }

    pub fn ge(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(&lhs.into(), ComparisonSense::GreaterEqual, &rhs.into())
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(&lhs.into(), ComparisonSense::Equal, &rhs.into())
    }

    /// `lower <= expr <= upper` as one row. The expression constant is folded
    /// into both bounds. Inverted bounds are reported when the row is added
    /// to a model.
    pub fn range(lower: f64, expr: impl Into<Expr>, upper: f64) -> Self {
        let expr = expr.into();
        let offset = expr.constant();
        Self::from_parts(
            expr.without_constant(),
            ComparisonSense::Range,
            Bounds::new(lower - offset, upper - offset),
        )
    }

    fn from_parts(expr: Expr, sense: ComparisonSense, bounds: Bounds) -> Self {
        Constraint(Rc::new(ConstraintCell {
            id: ConstraintId::fresh(),
            name: RefCell::new(None),
            name_sealed: Cell::new(false),
            expr,
            sense,
            bounds,
            enabled: Cell::new(true),
            activity: Cell::new(None),
            dual: Cell::new(None),
        }))
    }

    /// Attach a name, builder style. Meant for rows not yet added to a
    /// model: once the name is sealed it is kept as is.
    #[must_use]
    pub fn named(self, name: impl Into<String>) -> Self {
        if !self.is_name_sealed() {
            *self.0.name.borrow_mut() = Some(name.into());
        }
        self
    }

    /// Rename the row. Fails with `NameSealed` once a model holds it, since
    /// the model indexes rows by name.
    pub fn set_name(&self, name: impl Into<String>) -> Result<(), ConstructionError> {
        if self.is_name_sealed() {
            return Err(ConstructionError::NameSealed { id: self.0.id });
        }
        *self.0.name.borrow_mut() = Some(name.into());
        Ok(())
    }

    /// Fix the name, optionally assigning it first. Called by a model when
    /// it registers the row.
    pub fn seal_name(&self, name: Option<String>) -> Result<(), ConstructionError> {
        if let Some(name) = name {
            let unchanged = self.0.name.borrow().as_deref() == Some(name.as_str());
            if !unchanged {
                self.set_name(name)?;
            }
        }
        self.0.name_sealed.set(true);
        Ok(())
    }

    pub fn is_name_sealed(&self) -> bool {
        self.0.name_sealed.get()
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn id(&self) -> ConstraintId {
        self.0.id
    }

    pub fn name(&self) -> Option<String> {
        self.0.name.borrow().clone()
    }

    /// The name, or `Con[{id}]` when none was given.
    pub fn display_name(&self) -> String {
        self.name().unwrap_or_else(|| format!("Con[{}]", self.0.id))
    }

    pub fn expr(&self) -> &Expr {
        &self.0.expr
    }

    pub fn sense(&self) -> ComparisonSense {
        self.0.sense
    }

    pub fn bounds(&self) -> Bounds {
        self.0.bounds
    }

    pub fn lower(&self) -> f64 {
        self.0.bounds.lower
    }

    pub fn upper(&self) -> f64 {
        self.0.bounds.upper
    }

    /// Right-hand side of a one-sided or equality row; `None` for ranges.
    pub fn rhs(&self) -> Option<f64> {
        match self.0.sense {
            ComparisonSense::LessEqual => Some(self.0.bounds.upper),
            ComparisonSense::GreaterEqual | ComparisonSense::Equal => Some(self.0.bounds.lower),
            ComparisonSense::Range => None,
        }
    }

    pub fn is_linear(&self) -> bool {
        self.0.expr.is_linear()
    }

    // ── Enable / disable ────────────────────────────────────

    /// A disabled row stays in the model but is passed to the solver as free.
    pub fn set_enabled(&self, enabled: bool) {
        self.0.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.enabled.get()
    }

    /// Bounds as seen by the solver for the next solve.
    pub fn effective_bounds(&self) -> Bounds {
        if self.is_enabled() {
            self.0.bounds
        } else {
            Bounds::free()
        }
    }

    // ── Solution write-back ─────────────────────────────────

    pub fn record_solution(&self, activity: f64, dual: Option<f64>) {
        self.0.activity.set(Some(activity));
        self.0.dual.set(dual);
    }

    pub fn clear_solution(&self) {
        self.0.activity.set(None);
        self.0.dual.set(None);
    }

    /// Row activity from the most recent solve.
    pub fn activity(&self) -> Option<f64> {
        self.0.activity.get()
    }

    /// Dual value from the most recent solve (LP solves only).
    pub fn dual(&self) -> Option<f64> {
        self.0.dual.get()
    }

    /// Distance to the nearest bound at the current activity. Negative when
    /// the row is violated.
    pub fn slack(&self) -> Option<f64> {
        let activity = self.activity().or_else(|| self.0.expr.level())?;
        let bounds = self.0.bounds;
        Some((activity - bounds.lower).min(bounds.upper - activity))
    }

    /// Evaluate the row at the variables' current values. Disabled rows are
    /// always feasible; `None` if some variable has no value.
    pub fn is_feasible(&self, tolerance: f64) -> Option<bool> {
        if !self.is_enabled() {
            return Some(true);
        }
        let level = self.0.expr.level()?;
        Some(self.0.bounds.contains(level, tolerance))
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("id", &self.0.id)
            .field("name", &self.0.name.borrow())
            .field("sense", &self.0.sense)
            .field("bounds", &self.0.bounds)
            .field("expr", &self.0.expr)
            .field("enabled", &self.0.enabled.get())
            .finish()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.display_name();
        let bounds = self.0.bounds;
        match self.0.sense {
            ComparisonSense::Range => write!(
                f,
                "{name} : {} <= {} <= {}",
                bounds.lower, self.0.expr, bounds.upper
            ),
            sense => {
                let rhs = self.rhs().unwrap_or(bounds.lower);
                write!(f, "{name} : {} {} {rhs}", self.0.expr, sense.operator())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{ComparisonSense, Constraint};
    use crate::expr::Expr;
    use crate::variable::{Bounds, Variable};

    #[test]
    fn le_moves_constants_to_the_bound() {
        let x = Variable::new("x");
        let c = (&x + 3.0).le(10.0);
        assert_eq!(c.sense(), ComparisonSense::LessEqual);
        assert_eq!(c.upper(), 7.0);
        assert_eq!(c.lower(), f64::NEG_INFINITY);
        assert_eq!(c.rhs(), Some(7.0));
        assert_eq!(c.expr().constant(), 0.0);
    }

    #[test]
    fn expressions_on_both_sides_are_rearranged() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        // x + 3 >= y + 7  ->  x - y >= 4
        let c = (&x + 3.0).ge(&y + 7.0);
        assert_eq!(c.lower(), 4.0);
        assert_eq!(c.upper(), f64::INFINITY);
        assert_eq!(c.expr().coefficient(&x), 1.0);
        assert_eq!(c.expr().coefficient(&y), -1.0);
    }

    #[test]
    fn equality_fixes_both_bounds() {
        let x = Variable::new("x");
        let c = Constraint::eq(&x * 2.0, 5.0);
        assert_eq!(c.sense(), ComparisonSense::Equal);
        assert_eq!(c.bounds(), Bounds::fixed(5.0));
    }

    #[test]
    fn range_folds_constant_into_both_bounds() {
        let x = Variable::new("x");
        let c = Constraint::range(1.0, &x + 2.0, 5.0);
        assert_eq!(c.sense(), ComparisonSense::Range);
        assert_eq!(c.bounds(), Bounds::new(-1.0, 3.0));
        assert!(c.rhs().is_none());

        let d = x.between(0.0, 4.0);
        assert_eq!(d.bounds(), Bounds::new(0.0, 4.0));
    }

    #[test]
    fn sealed_name_cannot_change() {
        let x = Variable::new("x");
        let c = x.le(1.0).named("a");
        c.set_name("b").unwrap();
        c.seal_name(None).unwrap();
        assert!(c.is_name_sealed());
        assert_eq!(c.name().as_deref(), Some("b"));

        let err = c.set_name("c").unwrap_err();
        assert_eq!(err.code(), "CONSTRAINT_NAME_SEALED");
        let renamed = c.clone().named("c");
        assert_eq!(renamed.name().as_deref(), Some("b"));
        // sealing again under the same name is a no-op
        c.seal_name(Some("b".to_string())).unwrap();
        assert!(c.seal_name(Some("d".to_string())).is_err());
    }

    #[test]
    fn constraint_ids_are_unique() {
        let x = Variable::new("x");
        let a = x.le(1.0);
        let b = x.le(1.0);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn names_and_display() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let c = (&x + &y * 2.0).le(4.0).named("cap");
        assert_eq!(c.name().as_deref(), Some("cap"));
        assert_eq!(c.to_string(), "cap : x + 2 y <= 4");

        let unnamed = x.ge(1.0);
        assert_eq!(unnamed.display_name(), format!("Con[{}]", unnamed.id()));

        let r = Constraint::range(0.0, Expr::from(&x), 2.5).named("r");
        assert_eq!(r.to_string(), "r : 0 <= x <= 2.5");
    }

    #[test]
    fn disabled_rows_are_free_and_feasible() {
        let x = Variable::new("x");
        let c = x.le(1.0);
        x.record_value(5.0);
        assert_eq!(c.is_feasible(1e-9), Some(false));

        c.set_enabled(false);
        assert!(!c.is_enabled());
        assert_eq!(c.effective_bounds(), Bounds::free());
        assert_eq!(c.is_feasible(1e-9), Some(true));
    }

    #[test]
    fn slack_prefers_recorded_activity() {
        let x = Variable::new("x");
        let c = x.le(10.0);
        assert!(c.slack().is_none());

        x.record_value(4.0);
        assert_eq!(c.slack(), Some(6.0));

        c.record_solution(9.0, Some(0.0));
        assert_eq!(c.slack(), Some(1.0));
        assert_eq!(c.dual(), Some(0.0));

        c.clear_solution();
        assert!(c.activity().is_none());
        assert!(c.dual().is_none());
    }

    #[test]
    fn quadratic_rows_are_detectable() {
        let x = Variable::new("x");
        let c = (&x * &x).le(1.0);
        assert!(!c.is_linear());
    }
}
