//! Human-readable ASCII model formatting.

use std::fmt::Write as _;

use cadence_expr::{ComparisonSense, Constraint, Expr, Variable, VariableKind};

use crate::model::Model;

const PREVIEW_ROWS: usize = 20;
const PREVIEW_TERMS: usize = 30;
const PREVIEW_COLUMNS: usize = 20;

/// Truncation limits for [`Model::format_ascii`]. `None` means no limit.
#[derive(Debug, Clone, Copy)]
pub struct PrettyPrintOptions {
    pub rows: Option<usize>,
    /// Terms per expression, linear and quadratic together.
    pub terms: Option<usize>,
    pub columns: Option<usize>,
}

impl PrettyPrintOptions {
    /// Limits used by `Display`.
    pub fn preview() -> Self {
        Self {
            rows: Some(PREVIEW_ROWS),
            terms: Some(PREVIEW_TERMS),
            columns: Some(PREVIEW_COLUMNS),
        }
    }

    pub fn full() -> Self {
        Self {
            rows: None,
            terms: None,
            columns: None,
        }
    }
}

impl Model {
    /// Render the model as text: objective, rows in insertion order, then
    /// columns in first-appearance order.
    ///
    /// ```text
    /// Model: plant
    /// Max profit: 3 x + 2 y
    ///
    /// Subject to:
    ///  r0 labor: x + y <= 4
    ///  r1 band: 0.5 <= x + 0.1 y <= 9.25
    ///
    /// Columns:
    ///  c0 x continuous [0, inf]
    ///  c1 y integer [0, 4] frozen
    /// ```
    pub fn format_ascii(&self, options: PrettyPrintOptions) -> String {
        let mut out = String::new();
        if let Some(name) = self.name() {
            let _ = writeln!(out, "Model: {name}");
        }
        let objective = self.objective();
        let _ = writeln!(
            out,
            "{} {}: {}",
            objective.sense().label(),
            objective.name(),
            format_expr(objective.expr(), options.terms)
        );

        out.push_str("\nSubject to:\n");
        let shown = limit(options.rows, self.constraints.len());
        if shown == 0 {
            out.push_str(" (none)\n");
        }
        for (row, constraint) in self.constraints.iter().take(shown).enumerate() {
            let _ = writeln!(out, " r{row} {}", format_row(constraint, options.terms));
        }
        if shown < self.constraints.len() {
            let _ = writeln!(out, " ... ({} more rows)", self.constraints.len() - shown);
        }

        if !self.variables.is_empty() {
            out.push_str("\nColumns:\n");
            let shown = limit(options.columns, self.variables.len());
            for (column, variable) in self.variables.iter().take(shown).enumerate() {
                let _ = writeln!(out, " c{column} {}", format_column(variable));
            }
            if shown < self.variables.len() {
                let _ = writeln!(
                    out,
                    " ... ({} more columns)",
                    self.variables.len() - shown
                );
            }
        }

        let len = out.trim_end().len();
        out.truncate(len);
        out
    }
}

fn limit(max: Option<usize>, total: usize) -> usize {
    max.unwrap_or(total).min(total)
}

fn format_row(constraint: &Constraint, max_terms: Option<usize>) -> String {
    let expr = format_expr(constraint.expr(), max_terms);
    let bounds = constraint.bounds();
    let body = match constraint.sense() {
        ComparisonSense::LessEqual => format!("{expr} <= {}", format_ascii_number(bounds.upper)),
        ComparisonSense::GreaterEqual => {
            format!("{expr} >= {}", format_ascii_number(bounds.lower))
        }
        ComparisonSense::Equal => format!("{expr} == {}", format_ascii_number(bounds.lower)),
        ComparisonSense::Range => format!(
            "{} <= {expr} <= {}",
            format_ascii_number(bounds.lower),
            format_ascii_number(bounds.upper)
        ),
    };
    let mut line = format!("{}: {body}", constraint.display_name());
    if !constraint.is_enabled() {
        line.push_str(" (disabled)");
    }
    line
}

fn format_column(variable: &Variable) -> String {
    let mut line = format!("{} {}", variable.name(), variable.kind());
    // Binary columns always carry [0, 1] unless frozen.
    if variable.kind() != VariableKind::Binary || variable.is_frozen() {
        let bounds = variable.bounds();
        let _ = write!(
            line,
            " [{}, {}]",
            format_ascii_number(bounds.lower),
            format_ascii_number(bounds.upper)
        );
    }
    if variable.is_frozen() {
        line.push_str(" frozen");
    }
    line
}

fn format_expr(expr: &Expr, max_terms: Option<usize>) -> String {
    let mut terms: Vec<(String, f64)> = expr
        .linear_terms()
        .map(|(var, coeff)| (var.name().to_string(), coeff))
        .collect();
    terms.extend(expr.quadratic_terms().map(|(a, b, coeff)| {
        let body = if a == b {
            format!("{}^2", a.name())
        } else {
            format!("{} * {}", a.name(), b.name())
        };
        (body, coeff)
    }));
    terms.retain(|(_, coeff)| *coeff != 0.0);

    let constant = expr.constant();
    if terms.is_empty() {
        return format_ascii_number(constant);
    }

    let shown = limit(max_terms, terms.len());
    let mut out = String::new();
    for (idx, (label, coeff)) in terms.iter().take(shown).enumerate() {
        let sign = match (idx, *coeff < 0.0) {
            (0, true) => "-",
            (0, false) => "",
            (_, true) => " - ",
            (_, false) => " + ",
        };
        out.push_str(sign);
        if coeff.abs() != 1.0 {
            let _ = write!(out, "{} ", format_ascii_number(coeff.abs()));
        }
        out.push_str(label);
    }
    if shown < terms.len() {
        let _ = write!(out, " + ... ({} more terms)", terms.len() - shown);
    }
    if constant != 0.0 {
        let sign = if constant < 0.0 { '-' } else { '+' };
        let _ = write!(out, " {sign} {}", format_ascii_number(constant.abs()));
    }
    out
}

/// Shared numeric formatter for ASCII output: at most 12 decimals,
/// trailing zeros trimmed.
pub fn format_ascii_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-inf" } else { "inf" }.to_string();
    }

    let mut rendered = format!("{value:.12}");
    while rendered.ends_with('0') {
        rendered.pop();
    }
    if rendered.ends_with('.') {
        rendered.pop();
    }
    if rendered == "-0" {
        "0".to_string()
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use cadence_expr::{Constraint, Variable};

    use super::format_ascii_number;
    use crate::model::{Model, PrettyPrintOptions};

    #[test]
    fn format_ascii_renders_rows_by_sense() {
        let mut model = Model::with_name("demo");
        let x = Variable::continuous("x", 0.0, 10.0).expect("x");
        let y = Variable::integer("y", 0.0, 4.0).expect("y");
        model.add(&(&x + &y * 2.0).le(5.0).named("cap")).expect("cap");
        model.add(&x.ge(1.0)).expect("floor");
        model.add(&(&x - &y).equals(0.5).named("tie")).expect("tie");
        model
            .add(&Constraint::range(0.5, &x + &y * 0.1, 9.25).named("band"))
            .expect("band");
        model.minimize(&x + &y * 3.0).expect("objective");

        let rendered = model.format_ascii(PrettyPrintOptions::full());
        let floor = model.constraint(1).expect("row").display_name();
        assert!(rendered.starts_with("Model: demo\nMin obj: x + 3 y\n"));
        assert!(rendered.contains("\nSubject to:\n r0 cap: x + 2 y <= 5\n"));
        assert!(rendered.contains(&format!(" r1 {floor}: x >= 1\n")));
        assert!(rendered.contains(" r2 tie: x - y == 0.5\n"));
        assert!(rendered.contains(" r3 band: 0.5 <= x + 0.1 y <= 9.25\n"));
        assert!(rendered.ends_with("Columns:\n c0 x continuous [0, 10]\n c1 y integer [0, 4]"));
    }

    #[test]
    fn format_ascii_marks_disabled_rows_and_frozen_columns() {
        let mut model = Model::new();
        let b = Variable::binary("b");
        let n = Variable::integer("n", 0.0, 4.0).expect("int");
        let y = Variable::builder().name("y").free().build().expect("free");
        let row = (&b + &n - &y).ge(1.0).named("mix");
        model.add(&row).expect("row");
        row.set_enabled(false);
        model.maximize(&n * &n + 2.5).expect("objective");
        n.record_value(2.2);
        n.freeze();

        let rendered = model.format_ascii(PrettyPrintOptions::full());
        assert!(rendered.starts_with("Max obj: n^2 + 2.5\n"));
        assert!(rendered.contains(" r0 mix: b + n - y >= 1 (disabled)\n"));
        assert!(rendered.contains(" c0 b binary\n"));
        assert!(rendered.contains(" c1 n integer [2, 2] frozen\n"));
        assert!(rendered.contains(" c2 y continuous [-inf, inf]"));
    }

    #[test]
    fn format_ascii_preview_truncates_rows_and_columns() {
        let mut model = Model::new();
        let xs: Vec<Variable> = (0..25)
            .map(|i| Variable::continuous(format!("x{i}"), 0.0, 1.0).expect("var"))
            .collect();
        for (i, x) in xs.iter().enumerate() {
            model.add(&x.le(i as f64)).expect("constraint");
        }

        let rendered = model.format_ascii(PrettyPrintOptions::preview());
        assert!(rendered.contains(" ... (5 more rows)"));
        assert!(rendered.ends_with(" ... (5 more columns)"));
        assert_eq!(rendered, model.to_string());
    }

    #[test]
    fn empty_model_prints_placeholder() {
        let rendered = Model::new().format_ascii(PrettyPrintOptions::full());
        assert_eq!(rendered, "Min obj: 0\n\nSubject to:\n (none)");
    }

    #[test]
    fn numbers_trim_trailing_zeros() {
        assert_eq!(format_ascii_number(2.50), "2.5");
        assert_eq!(format_ascii_number(-0.0), "0");
        assert_eq!(format_ascii_number(1.0 / 3.0), "0.333333333333");
        assert_eq!(format_ascii_number(f64::NEG_INFINITY), "-inf");
    }
}
