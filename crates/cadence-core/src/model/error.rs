//! Exchange format error types.

use cadence_expr::ConstructionError;

/// Errors raised while writing or reading the plain-text exchange format.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeError {
    /// Malformed line.
    Syntax { line: usize, message: String },
    /// A TERM/OBJTERM/OBJQUAD line names a variable with no VAR line.
    UnknownVariable { line: usize, name: String },
    /// A name is empty or contains whitespace and cannot be written.
    InvalidName { name: String },
    /// Two variables or two constraints share a name and cannot be written.
    DuplicateName { name: String },
    /// Rebuilding the model from parsed lines failed.
    Construction {
        line: usize,
        source: ConstructionError,
    },
}

impl ExchangeError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ExchangeError::Syntax { .. } => "EXCHANGE_SYNTAX",
            ExchangeError::UnknownVariable { .. } => "EXCHANGE_UNKNOWN_VARIABLE",
            ExchangeError::InvalidName { .. } => "EXCHANGE_INVALID_NAME",
            ExchangeError::DuplicateName { .. } => "EXCHANGE_DUPLICATE_NAME",
            ExchangeError::Construction { .. } => "EXCHANGE_CONSTRUCTION",
        }
    }

    /// 1-based line number for import errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            ExchangeError::Syntax { line, .. }
            | ExchangeError::UnknownVariable { line, .. }
            | ExchangeError::Construction { line, .. } => Some(*line),
            ExchangeError::InvalidName { .. } | ExchangeError::DuplicateName { .. } => None,
        }
    }
}

impl std::fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangeError::Syntax { line, message } => {
                write!(f, "[{}] Line {}: {}", self.code(), line, message)
            }
            ExchangeError::UnknownVariable { line, name } => write!(
                f,
                "[{}] Line {}: variable '{}' is not declared",
                self.code(),
                line,
                name
            ),
            ExchangeError::InvalidName { name } => write!(
                f,
                "[{}] Name '{}' must be non-empty and contain no whitespace",
                self.code(),
                name
            ),
            ExchangeError::DuplicateName { name } => write!(
                f,
                "[{}] Name '{}' is used more than once",
                self.code(),
                name
            ),
            ExchangeError::Construction { line, source } => {
                write!(f, "[{}] Line {}: {}", self.code(), line, source)
            }
        }
    }
}

impl std::error::Error for ExchangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExchangeError::Construction { source, .. } => Some(source),
            _ => None,
        }
    }
}
