//! Plain-text exchange format.
//!
//! One keyword per line; `#` starts a comment line:
//!
//! ```text
//! NAME <model>
//! SENSE MIN|MAX
//! VAR <name> C|I|B <lower> <upper> [FROZEN <value>]
//! OBJ <name> <constant>
//! OBJTERM <var> <coeff>
//! OBJQUAD <var> <var> <coeff>
//! ROW <name> L|G|E|R <lower> <upper> [off]
//! TERM <var> <coeff>
//! END
//! ```
//!
//! VAR lines are written in column order and ROW lines in row order, each
//! followed by its TERM lines. A frozen variable lists the bounds it had
//! before freezing and the value it is fixed at; importing freezes it again.
//! A model has at most one OBJ line. Floats use the shortest representation that
//! parses back to the same value, with `inf` and `-inf` for unbounded sides.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use cadence_expr::{Bounds, ComparisonSense, Constraint, Expr, Variable, VariableKind};

use crate::model::Model;
use crate::model::error::ExchangeError;
use crate::objective::Objective;
use crate::types::Sense;

impl Model {
    /// Serialize the model. Fails if a variable or constraint name is empty,
    /// contains whitespace, or is shared with another of the same kind.
    pub fn to_exchange_string(&self) -> Result<String, ExchangeError> {
        check_names(self.variables.iter().map(|var| var.name().to_string()))?;
        check_names(self.constraints.iter().map(Constraint::display_name))?;
        let objective = self.objective();
        check_name(objective.name())?;

        let mut out = String::new();
        let _ = writeln!(out, "# cadence exchange format");
        if let Some(name) = self.name() {
            check_name(name)?;
            let _ = writeln!(out, "NAME {name}");
        }
        let sense = match objective.sense() {
            Sense::Minimize => "MIN",
            Sense::Maximize => "MAX",
        };
        let _ = writeln!(out, "SENSE {sense}");

        for var in &self.variables {
            let bounds = var.frozen_bounds().unwrap_or_else(|| var.bounds());
            let _ = write!(
                out,
                "VAR {} {} {} {}",
                var.name(),
                kind_code(var.kind()),
                bounds.lower,
                bounds.upper
            );
            if var.is_frozen() {
                let _ = write!(out, " FROZEN {}", var.lower());
            }
            out.push('\n');
        }

        let _ = writeln!(out, "OBJ {} {}", objective.name(), objective.offset());
        for (var, coeff) in objective.expr().linear_terms() {
            let _ = writeln!(out, "OBJTERM {} {coeff}", var.name());
        }
        for (a, b, coeff) in objective.expr().quadratic_terms() {
            let _ = writeln!(out, "OBJQUAD {} {} {coeff}", a.name(), b.name());
        }

        for constraint in &self.constraints {
            let bounds = constraint.bounds();
            let off = if constraint.is_enabled() { "" } else { " off" };
            let _ = writeln!(
                out,
                "ROW {} {} {} {}{off}",
                constraint.display_name(),
                sense_code(constraint.sense()),
                bounds.lower,
                bounds.upper
            );
            for (var, coeff) in constraint.expr().linear_terms() {
                let _ = writeln!(out, "TERM {} {coeff}", var.name());
            }
        }
        out.push_str("END\n");

        tracing::debug!(
            component = "model",
            operation = "export",
            status = "success",
            variables = self.num_variables(),
            constraints = self.num_constraints(),
            bytes = out.len(),
            "Exported model"
        );
        Ok(out)
    }

    /// Rebuild a model from the exchange format. Variables keep their
    /// column order and rows their row order.
    pub fn from_exchange_str(text: &str) -> Result<Model, ExchangeError> {
        let mut parser = Parser::default();
        let mut ended = false;
        let mut last_line = 0;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            last_line = line;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if ended {
                return Err(syntax(line, "content after END"));
            }
            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            match fields[0] {
                "NAME" => parser.name(line, &fields)?,
                "SENSE" => parser.sense(line, &fields)?,
                "VAR" => parser.variable(line, &fields)?,
                "OBJ" => parser.objective(line, &fields)?,
                "OBJTERM" => parser.objective_term(line, &fields)?,
                "OBJQUAD" => parser.objective_quad(line, &fields)?,
                "ROW" => parser.row(line, &fields)?,
                "TERM" => parser.term(line, &fields)?,
                "END" => {
                    expect_fields(line, &fields, 1)?;
                    parser.flush_row()?;
                    ended = true;
                }
                keyword => return Err(syntax(line, &format!("unknown keyword '{keyword}'"))),
            }
        }

        if !ended {
            return Err(syntax(last_line + 1, "missing END"));
        }
        let model = parser.finish()?;
        tracing::debug!(
            component = "model",
            operation = "import",
            status = "success",
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "Imported model"
        );
        Ok(model)
    }
}

struct PendingRow {
    line: usize,
    name: String,
    sense: ComparisonSense,
    bounds: Bounds,
    enabled: bool,
    expr: Expr,
}

enum Section {
    Header,
    Objective,
    Row(PendingRow),
}

struct Parser {
    model: Model,
    variables: HashMap<String, Variable>,
    sense: Sense,
    objective_name: Option<String>,
    objective_expr: Expr,
    objective_line: usize,
    section: Section,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            model: Model::new(),
            variables: HashMap::new(),
            sense: Sense::Minimize,
            objective_name: None,
            objective_expr: Expr::zero(),
            objective_line: 0,
            section: Section::Header,
        }
    }
}

impl Parser {
    fn name(&mut self, line: usize, fields: &[&str]) -> Result<(), ExchangeError> {
        expect_fields(line, fields, 2)?;
        self.model.set_name(fields[1]);
        Ok(())
    }

    fn sense(&mut self, line: usize, fields: &[&str]) -> Result<(), ExchangeError> {
        expect_fields(line, fields, 2)?;
        self.sense = match fields[1] {
            "MIN" => Sense::Minimize,
            "MAX" => Sense::Maximize,
            other => return Err(syntax(line, &format!("unknown sense '{other}'"))),
        };
        Ok(())
    }

    fn variable(&mut self, line: usize, fields: &[&str]) -> Result<(), ExchangeError> {
        let frozen_at = match fields.len() {
            5 => None,
            7 if fields[5] == "FROZEN" => Some(parse_float(line, fields[6])?),
            _ => {
                return Err(syntax(
                    line,
                    "expected VAR <name> <kind> <lower> <upper> [FROZEN <value>]",
                ));
            }
        };
        let name = fields[1];
        if self.variables.contains_key(name) {
            return Err(syntax(line, &format!("duplicate variable '{name}'")));
        }
        let kind = match fields[2] {
            "C" => VariableKind::Continuous,
            "I" => VariableKind::Integer,
            "B" => VariableKind::Binary,
            other => return Err(syntax(line, &format!("unknown variable kind '{other}'"))),
        };
        let lower = parse_float(line, fields[3])?;
        let upper = parse_float(line, fields[4])?;
        let variable = Variable::builder()
            .name(name)
            .kind(kind)
            .bounds(lower, upper)
            .build()
            .map_err(|source| ExchangeError::Construction { line, source })?;
        if let Some(value) = frozen_at {
            variable.record_value(value);
            variable.freeze();
        }
        self.model.add_variable(&variable);
        self.variables.insert(name.to_string(), variable);
        Ok(())
    }

    fn objective(&mut self, line: usize, fields: &[&str]) -> Result<(), ExchangeError> {
        expect_fields(line, fields, 3)?;
        if self.objective_name.is_some() {
            return Err(syntax(
                line,
                &format!("duplicate OBJ line, first at line {}", self.objective_line),
            ));
        }
        self.flush_row()?;
        self.objective_name = Some(fields[1].to_string());
        self.objective_expr.add_constant(parse_float(line, fields[2])?);
        self.objective_line = line;
        self.section = Section::Objective;
        Ok(())
    }

    fn objective_term(&mut self, line: usize, fields: &[&str]) -> Result<(), ExchangeError> {
        expect_fields(line, fields, 3)?;
        if !matches!(self.section, Section::Objective) {
            return Err(syntax(line, "OBJTERM outside the OBJ section"));
        }
        let var = self.lookup(line, fields[1])?.clone();
        let coeff = parse_float(line, fields[2])?;
        self.objective_expr.add_term(&var, coeff);
        Ok(())
    }

    fn objective_quad(&mut self, line: usize, fields: &[&str]) -> Result<(), ExchangeError> {
        expect_fields(line, fields, 4)?;
        if !matches!(self.section, Section::Objective) {
            return Err(syntax(line, "OBJQUAD outside the OBJ section"));
        }
        let a = self.lookup(line, fields[1])?.clone();
        let b = self.lookup(line, fields[2])?.clone();
        let coeff = parse_float(line, fields[3])?;
        self.objective_expr.add_quadratic_term(&a, &b, coeff);
        Ok(())
    }

    fn row(&mut self, line: usize, fields: &[&str]) -> Result<(), ExchangeError> {
        let enabled = match fields.len() {
            5 => true,
            6 if fields[5] == "off" => false,
            _ => return Err(syntax(line, "expected ROW <name> <sense> <lower> <upper> [off]")),
        };
        self.flush_row()?;
        let sense = match fields[2] {
            "L" => ComparisonSense::LessEqual,
            "G" => ComparisonSense::GreaterEqual,
            "E" => ComparisonSense::Equal,
            "R" => ComparisonSense::Range,
            other => return Err(syntax(line, &format!("unknown row sense '{other}'"))),
        };
        let bounds = Bounds::new(parse_float(line, fields[3])?, parse_float(line, fields[4])?);
        self.section = Section::Row(PendingRow {
            line,
            name: fields[1].to_string(),
            sense,
            bounds,
            enabled,
            expr: Expr::zero(),
        });
        Ok(())
    }

    fn term(&mut self, line: usize, fields: &[&str]) -> Result<(), ExchangeError> {
        expect_fields(line, fields, 3)?;
        let var = self.lookup(line, fields[1])?.clone();
        let coeff = parse_float(line, fields[2])?;
        match &mut self.section {
            Section::Row(pending) => {
                pending.expr.add_term(&var, coeff);
                Ok(())
            }
            _ => Err(syntax(line, "TERM outside a ROW section")),
        }
    }

    fn flush_row(&mut self) -> Result<(), ExchangeError> {
        let Section::Row(pending) = std::mem::replace(&mut self.section, Section::Header) else {
            return Ok(());
        };
        let PendingRow {
            line,
            name,
            sense,
            bounds,
            enabled,
            expr,
        } = pending;
        let constraint = match sense {
            ComparisonSense::LessEqual => Constraint::le(expr, bounds.upper),
            ComparisonSense::GreaterEqual => Constraint::ge(expr, bounds.lower),
            ComparisonSense::Equal => Constraint::eq(expr, bounds.lower),
            ComparisonSense::Range => Constraint::range(bounds.lower, expr, bounds.upper),
        };
        self.model
            .add_named(name, &constraint)
            .map_err(|source| ExchangeError::Construction { line, source })?;
        constraint.set_enabled(enabled);
        Ok(())
    }

    fn lookup(&self, line: usize, name: &str) -> Result<&Variable, ExchangeError> {
        self.variables
            .get(name)
            .ok_or_else(|| ExchangeError::UnknownVariable {
                line,
                name: name.to_string(),
            })
    }

    fn finish(mut self) -> Result<Model, ExchangeError> {
        let mut objective = Objective::new(self.objective_expr, self.sense);
        if let Some(name) = self.objective_name {
            objective = objective.named(name);
        }
        let line = self.objective_line;
        self.model
            .set_objective(objective)
            .map_err(|source| ExchangeError::Construction { line, source })?;
        Ok(self.model)
    }
}

fn kind_code(kind: VariableKind) -> &'static str {
    match kind {
        VariableKind::Continuous => "C",
        VariableKind::Integer => "I",
        VariableKind::Binary => "B",
    }
}

fn sense_code(sense: ComparisonSense) -> &'static str {
    match sense {
        ComparisonSense::LessEqual => "L",
        ComparisonSense::GreaterEqual => "G",
        ComparisonSense::Equal => "E",
        ComparisonSense::Range => "R",
    }
}

fn check_name(name: &str) -> Result<(), ExchangeError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(ExchangeError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn check_names(names: impl Iterator<Item = String>) -> Result<(), ExchangeError> {
    let mut seen = HashSet::new();
    for name in names {
        check_name(&name)?;
        if !seen.insert(name.clone()) {
            return Err(ExchangeError::DuplicateName { name });
        }
    }
    Ok(())
}

fn expect_fields(line: usize, fields: &[&str], count: usize) -> Result<(), ExchangeError> {
    if fields.len() != count {
        return Err(syntax(
            line,
            &format!(
                "{} expects {} fields, found {}",
                fields[0],
                count,
                fields.len()
            ),
        ));
    }
    Ok(())
}

fn parse_float(line: usize, token: &str) -> Result<f64, ExchangeError> {
    token
        .parse::<f64>()
        .map_err(|_| syntax(line, &format!("invalid number '{token}'")))
}

fn syntax(line: usize, message: &str) -> ExchangeError {
    ExchangeError::Syntax {
        line,
        message: message.to_string(),
    }
}
