//! Core expression type: canonical terms + constant.
//!
//! Linear terms live in an insertion-ordered map keyed by variable identity,
//! so duplicates are summed on insert and cancelled entries are removed. The
//! insertion order is what a model uses for first-appearance column numbering;
//! equality ignores it.
//!
//! Quadratic terms are keyed by the variable pair ordered by id, which makes
//! `x*y` and `y*x` the same entry. Only objectives may carry them.

use indexmap::IndexMap;

use crate::error::ConstructionError;
use crate::expr::constraint::{ComparisonSense, Constraint};
use crate::variable::Variable;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    constant: f64,
    linear: IndexMap<Variable, f64>,
    quadratic: IndexMap<(Variable, Variable), f64>,
}

impl Expr {
    // ── Constructors ────────────────────────────────────────

    /// Empty expression (all zeros).
    pub fn zero() -> Self {
        Self::default()
    }

    /// Just a constant, no variable terms.
    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            ..Default::default()
        }
    }

    /// Single linear term: coeff * var.
    pub fn term(var: &Variable, coeff: f64) -> Self {
        let mut expr = Self::default();
        expr.add_term(var, coeff);
        expr
    }

    /// Single quadratic term: coeff * a * b.
    pub fn quadratic_term(a: &Variable, b: &Variable, coeff: f64) -> Self {
        let mut expr = Self::default();
        expr.add_quadratic_term(a, b, coeff);
        expr
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Linear terms in first-insertion order.
    pub fn linear_terms(&self) -> impl Iterator<Item = (&Variable, f64)> + '_ {
        self.linear.iter().map(|(var, coeff)| (var, *coeff))
    }

    pub fn quadratic_terms(&self) -> impl Iterator<Item = (&Variable, &Variable, f64)> + '_ {
        self.quadratic
            .iter()
            .map(|((a, b), coeff)| (a, b, *coeff))
    }

    pub fn num_linear_terms(&self) -> usize {
        self.linear.len()
    }

    pub fn num_quadratic_terms(&self) -> usize {
        self.quadratic.len()
    }

    /// Max degree of any term (0 = constant only).
    pub fn degree(&self) -> usize {
        if !self.quadratic.is_empty() {
            2
        } else {
            usize::from(!self.linear.is_empty())
        }
    }

    pub fn is_linear(&self) -> bool {
        self.quadratic.is_empty()
    }

    /// Coefficient of `var` in the linear part (0 if absent).
    pub fn coefficient(&self, var: &Variable) -> f64 {
        self.linear.get(var).copied().unwrap_or(0.0)
    }

    /// Every referenced variable in first-appearance order: linear terms
    /// first, then members of quadratic pairs. Each variable appears once.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut seen: IndexMap<&Variable, ()> = IndexMap::new();
        for var in self.linear.keys() {
            seen.insert(var, ());
        }
        for (a, b) in self.quadratic.keys() {
            seen.entry(a).or_insert(());
            seen.entry(b).or_insert(());
        }
        seen.into_keys().collect()
    }

    // ── In-place accumulation ───────────────────────────────

    /// Add `coeff * var`, merging with an existing entry. A sum of exactly
    /// zero removes the entry.
    pub fn add_term(&mut self, var: &Variable, coeff: f64) {
        if coeff == 0.0 {
            return;
        }
        match self.linear.get_mut(var) {
            Some(existing) => {
                *existing += coeff;
                if *existing == 0.0 {
                    self.linear.shift_remove(var);
                }
            }
            None => {
                self.linear.insert(var.clone(), coeff);
            }
        }
    }

    /// Add `coeff * a * b`.
    pub fn add_quadratic_term(&mut self, a: &Variable, b: &Variable, coeff: f64) {
        if coeff == 0.0 {
            return;
        }
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        match self.quadratic.get_mut(&key) {
            Some(existing) => {
                *existing += coeff;
                if *existing == 0.0 {
                    self.quadratic.shift_remove(&key);
                }
            }
            None => {
                self.quadratic.insert(key, coeff);
            }
        }
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Replace the linear coefficient of `var`; zero removes the term.
    pub fn set_coefficient(&mut self, var: &Variable, coeff: f64) {
        if coeff == 0.0 {
            self.linear.shift_remove(var);
        } else if let Some(existing) = self.linear.get_mut(var) {
            *existing = coeff;
        } else {
            self.linear.insert(var.clone(), coeff);
        }
    }

    /// `self += factor * other`, one pass over `other`'s terms.
    pub(crate) fn accumulate(&mut self, other: &Expr, factor: f64) {
        self.constant += factor * other.constant;
        for (var, coeff) in &other.linear {
            self.add_term(var, factor * coeff);
        }
        for ((a, b), coeff) in &other.quadratic {
            self.add_quadratic_term(a, b, factor * coeff);
        }
    }

    // ── Operations (return new expressions) ─────────────────

    /// Scale all terms and constant by a factor.
    pub fn scale(&self, by: f64) -> Self {
        if by == 0.0 {
            return Self::default();
        }
        Self {
            constant: self.constant * by,
            linear: self
                .linear
                .iter()
                .map(|(v, c)| (v.clone(), *c * by))
                .filter(|(_, c)| *c != 0.0)
                .collect(),
            quadratic: self
                .quadratic
                .iter()
                .map(|(pair, c)| (pair.clone(), *c * by))
                .filter(|(_, c)| *c != 0.0)
                .collect(),
        }
    }

    pub fn add_expr(&self, other: &Expr) -> Self {
        let mut result = self.clone();
        result.accumulate(other, 1.0);
        result
    }

    pub fn sub_expr(&self, other: &Expr) -> Self {
        let mut result = self.clone();
        result.accumulate(other, -1.0);
        result
    }

    /// Copy with constant set to zero.
    pub fn without_constant(&self) -> Self {
        Self {
            constant: 0.0,
            linear: self.linear.clone(),
            quadratic: self.quadratic.clone(),
        }
    }

    /// Division that reports a zero divisor instead of producing infinities.
    pub fn checked_div(&self, divisor: f64) -> Result<Self, ConstructionError> {
        if divisor == 0.0 {
            return Err(ConstructionError::DivisionByZero);
        }
        Ok(self.scale(1.0 / divisor))
    }

    /// Product of two linear expressions.
    pub fn product(&self, other: &Expr) -> Result<Self, ConstructionError> {
        if !self.is_linear() || !other.is_linear() {
            return Err(ConstructionError::NonLinearOperand);
        }
        let mut result = Expr::from_constant(self.constant * other.constant);
        for (var, coeff) in &other.linear {
            result.add_term(var, self.constant * coeff);
        }
        for (var, coeff) in &self.linear {
            result.add_term(var, other.constant * coeff);
        }
        for (a, ca) in &self.linear {
            for (b, cb) in &other.linear {
                result.add_quadratic_term(a, b, ca * cb);
            }
        }
        Ok(result)
    }

    /// Sum of pairwise products of the expression with itself.
    pub fn squared(&self) -> Result<Self, ConstructionError> {
        self.product(self)
    }

    /// Evaluate with caller-supplied variable values. `None` if any
    /// referenced variable has no value.
    pub fn evaluate(&self, value_of: impl Fn(&Variable) -> Option<f64>) -> Option<f64> {
        let mut total = self.constant;
        for (var, coeff) in &self.linear {
            total += coeff * value_of(var)?;
        }
        for ((a, b), coeff) in &self.quadratic {
            total += coeff * value_of(a)? * value_of(b)?;
        }
        Some(total)
    }

    /// Value at the variables' current solution values.
    pub fn level(&self) -> Option<f64> {
        self.evaluate(Variable::value)
    }

    /// Same terms and constant within an absolute tolerance.
    pub fn approx_eq(&self, other: &Expr, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
        if !close(self.constant, other.constant) {
            return false;
        }
        let linear_close = |lhs: &Expr, rhs: &Expr| {
            lhs.linear
                .iter()
                .all(|(var, coeff)| close(*coeff, rhs.coefficient(var)))
        };
        let quadratic_close = |lhs: &Expr, rhs: &Expr| {
            lhs.quadratic.iter().all(|(pair, coeff)| {
                close(*coeff, rhs.quadratic.get(pair).copied().unwrap_or(0.0))
            })
        };
        linear_close(self, other)
            && linear_close(other, self)
            && quadratic_close(self, other)
            && quadratic_close(other, self)
    }

    // ── Relations (produce Constraint) ──────────────────────

    /// `self <= rhs`, rearranged so every variable term is on the left.
    pub fn le(&self, rhs: impl Into<Expr>) -> Constraint {
        Constraint::compare(self, ComparisonSense::LessEqual, &rhs.into())
    }

    /// `self >= rhs`
    pub fn ge(&self, rhs: impl Into<Expr>) -> Constraint {
        Constraint::compare(self, ComparisonSense::GreaterEqual, &rhs.into())
    }

    /// `self == rhs`
    pub fn equals(&self, rhs: impl Into<Expr>) -> Constraint {
        Constraint::compare(self, ComparisonSense::Equal, &rhs.into())
    }

    /// `lower <= self <= upper` as a single range row.
    pub fn between(&self, lower: f64, upper: f64) -> Constraint {
        Constraint::range(lower, self.clone(), upper)
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (var, coeff) in &self.linear {
            write_term(f, &mut first, *coeff, var.name())?;
        }
        for ((a, b), coeff) in &self.quadratic {
            let body = if a == b {
                format!("{}^2", a.name())
            } else {
                format!("{} {}", a.name(), b.name())
            };
            write_term(f, &mut first, *coeff, &body)?;
        }
        if self.constant != 0.0 || first {
            write_term(f, &mut first, self.constant, "")?;
        }
        Ok(())
    }
}

fn write_term(
    f: &mut std::fmt::Formatter<'_>,
    first: &mut bool,
    coeff: f64,
    body: &str,
) -> std::fmt::Result {
    let magnitude = coeff.abs();
    if *first {
        if coeff < 0.0 {
            f.write_str("-")?;
        }
    } else if coeff < 0.0 {
        f.write_str(" - ")?;
    } else {
        f.write_str(" + ")?;
    }
    *first = false;
    if body.is_empty() {
        write!(f, "{magnitude}")
    } else if magnitude == 1.0 {
        f.write_str(body)
    } else {
        write!(f, "{magnitude} {body}")
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::from_constant(value)
    }
}

impl From<&Variable> for Expr {
    fn from(var: &Variable) -> Self {
        Expr::term(var, 1.0)
    }
}

impl From<Variable> for Expr {
    fn from(var: Variable) -> Self {
        Expr::term(&var, 1.0)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}
