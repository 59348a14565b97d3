//! Lowering a model into the sparse arrays a backend consumes.

use std::collections::BTreeMap;
use std::time::Instant;

use cadence_core::{Model, Sense};
use tracing::{debug, trace, warn};

/// Compressed sparse storage. `starts` has one entry per major index plus a
/// final entry equal to the number of nonzeros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseMatrix {
    pub starts: Vec<usize>,
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseMatrix {
    pub fn num_nonzeros(&self) -> usize {
        self.values.len()
    }

    /// Entries of one major index as (minor, value) pairs.
    pub fn slice(&self, major: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.starts.get(major).copied().unwrap_or(0);
        let end = self.starts.get(major + 1).copied().unwrap_or(start);
        self.indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }
}

/// Everything a backend needs for one solve, in the model's column and row
/// order. The structure is tied to the model revision it was built from;
/// bounds can be refreshed without rebuilding it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixForm {
    pub revision: u64,
    pub relaxed: bool,
    pub col_lower: Vec<f64>,
    pub col_upper: Vec<f64>,
    pub integrality: Vec<bool>,
    pub row_lower: Vec<f64>,
    pub row_upper: Vec<f64>,
    /// Constraint matrix, row-wise.
    pub rows: SparseMatrix,
    pub objective: Vec<f64>,
    pub offset: f64,
    /// Lower triangle of the objective Hessian, column-wise, scaled so the
    /// objective is `c'x + 0.5 x'Qx`.
    pub hessian: Option<SparseMatrix>,
}

impl MatrixForm {
    /// Lower the model. With `relax_integrality` every column is passed as
    /// continuous.
    pub fn build(model: &Model, relax_integrality: bool) -> Self {
        let started = Instant::now();
        let num_cols = model.num_variables();

        let mut rows = SparseMatrix {
            starts: Vec::with_capacity(model.num_constraints() + 1),
            indices: Vec::with_capacity(model.num_coefficients()),
            values: Vec::with_capacity(model.num_coefficients()),
        };
        rows.starts.push(0);
        for row in 0..model.num_constraints() {
            for (col, coeff) in model.row_terms(row) {
                rows.indices.push(col);
                rows.values.push(coeff);
            }
            rows.starts.push(rows.indices.len());
        }

        let objective_expr = model.objective().expr();
        let mut objective = vec![0.0; num_cols];
        for (variable, coeff) in objective_expr.linear_terms() {
            match model.column_of(variable) {
                Some(col) => objective[col] += coeff,
                None => warn!(
                    component = "solver",
                    operation = "build_matrix",
                    status = "warn",
                    variable = variable.name(),
                    "Objective variable has no column; skipping coefficient"
                ),
            }
        }

        let hessian = if objective_expr.is_linear() {
            None
        } else {
            Some(build_hessian(model, num_cols))
        };

        let mut form = Self {
            revision: model.revision(),
            relaxed: relax_integrality,
            col_lower: Vec::with_capacity(num_cols),
            col_upper: Vec::with_capacity(num_cols),
            integrality: Vec::with_capacity(num_cols),
            row_lower: Vec::with_capacity(model.num_constraints()),
            row_upper: Vec::with_capacity(model.num_constraints()),
            rows,
            objective,
            offset: objective_expr.constant(),
            hessian,
        };
        form.refresh_bounds(model);

        debug!(
            component = "solver",
            operation = "build_matrix",
            status = "success",
            num_cols,
            num_rows = form.num_rows(),
            num_nonzeros = form.rows.num_nonzeros(),
            quadratic = form.hessian.is_some(),
            relaxed = relax_integrality,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Built matrix form"
        );
        form
    }

    /// Re-read column bounds, integrality and row bounds. Disabled rows are
    /// passed as free.
    pub fn refresh_bounds(&mut self, model: &Model) {
        self.col_lower.clear();
        self.col_upper.clear();
        self.integrality.clear();
        for variable in model.variables() {
            let bounds = variable.bounds();
            self.col_lower.push(bounds.lower);
            self.col_upper.push(bounds.upper);
            self.integrality
                .push(variable.is_integer() && !self.relaxed);
        }

        self.row_lower.clear();
        self.row_upper.clear();
        for constraint in model.constraints() {
            let bounds = constraint.effective_bounds();
            self.row_lower.push(bounds.lower);
            self.row_upper.push(bounds.upper);
        }

        trace!(
            component = "solver",
            operation = "refresh_bounds",
            status = "success",
            num_cols = self.col_lower.len(),
            num_rows = self.row_lower.len(),
            "Refreshed column and row bounds"
        );
    }

    /// Whether this structure still describes `model`.
    pub fn matches(&self, model: &Model, relax_integrality: bool) -> bool {
        self.revision == model.revision() && self.relaxed == relax_integrality
    }

    pub fn num_cols(&self) -> usize {
        self.col_lower.len()
    }

    pub fn num_rows(&self) -> usize {
        self.row_lower.len()
    }

    pub fn is_quadratic(&self) -> bool {
        self.hessian.is_some()
    }

    pub fn has_integer_columns(&self) -> bool {
        self.integrality.iter().any(|&integer| integer)
    }

    /// The constraint matrix transposed to column-wise storage.
    pub fn to_column_major(&self) -> SparseMatrix {
        let num_cols = self.num_cols();
        let mut counts = vec![0usize; num_cols + 1];
        for &col in &self.rows.indices {
            counts[col + 1] += 1;
        }
        for col in 0..num_cols {
            counts[col + 1] += counts[col];
        }

        let nnz = self.rows.num_nonzeros();
        let mut indices = vec![0usize; nnz];
        let mut values = vec![0.0; nnz];
        let mut next = counts.clone();
        for row in 0..self.num_rows() {
            for (col, value) in self.rows.slice(row) {
                let slot = next[col];
                indices[slot] = row;
                values[slot] = value;
                next[col] += 1;
            }
        }

        SparseMatrix {
            starts: counts,
            indices,
            values,
        }
    }

    /// Objective data expressed for minimization: negated when `sense` is
    /// maximize. Returns (linear, offset, hessian).
    pub fn minimization_objective(&self, sense: Sense) -> (Vec<f64>, f64, Option<SparseMatrix>) {
        let sign = match sense {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };
        let linear = self.objective.iter().map(|c| sign * c).collect();
        let hessian = self.hessian.as_ref().map(|q| SparseMatrix {
            starts: q.starts.clone(),
            indices: q.indices.clone(),
            values: q.values.iter().map(|v| sign * v).collect(),
        });
        (linear, sign * self.offset, hessian)
    }
}

/// Q_ii = 2c for `c x_i^2`, Q_ij = c for `c x_i x_j`, stored at
/// (row = larger column, col = smaller column).
fn build_hessian(model: &Model, num_cols: usize) -> SparseMatrix {
    let mut entries: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for (a, b, coeff) in model.objective().expr().quadratic_terms() {
        let (Some(i), Some(j)) = (model.column_of(a), model.column_of(b)) else {
            warn!(
                component = "solver",
                operation = "build_hessian",
                status = "warn",
                first = a.name(),
                second = b.name(),
                "Quadratic term variable has no column; skipping"
            );
            continue;
        };
        let value = if i == j { 2.0 * coeff } else { coeff };
        *entries.entry((i.min(j), i.max(j))).or_insert(0.0) += value;
    }

    let mut hessian = SparseMatrix {
        starts: Vec::with_capacity(num_cols + 1),
        indices: Vec::with_capacity(entries.len()),
        values: Vec::with_capacity(entries.len()),
    };
    let mut iter = entries.into_iter().peekable();
    for col in 0..num_cols {
        hessian.starts.push(hessian.indices.len());
        while let Some(((_, row), value)) = iter.next_if(|((c, _), _)| *c == col) {
            if value != 0.0 {
                hessian.indices.push(row);
                hessian.values.push(value);
            }
        }
    }
    hessian.starts.push(hessian.indices.len());
    hessian
}
