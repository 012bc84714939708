use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when formula text cannot be turned into a valid [`Formula`](crate::Formula).
///
/// Positions are 1-based token indices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaFormatError {
    #[error("formula must contain at least one token")]
    Empty,

    #[error("invalid token \"{token}\" at position {position}")]
    InvalidToken { token: String, position: usize },

    #[error("token \"{token}\" at position {position} cannot follow the previous token")]
    UnexpectedToken { token: String, position: usize },

    #[error("unbalanced parentheses: {open} '(' and {close} ')'")]
    UnbalancedParens { open: usize, close: usize },

    #[error("closing parenthesis at position {position} has no matching '('")]
    UnmatchedClose { position: usize },

    #[error("formula must begin with a number, variable or '('")]
    InvalidStart,

    #[error("formula must end with a number, variable or ')'")]
    InvalidEnd,

    #[error("variable \"{variable}\" at position {position} normalized to invalid \"{normalized}\"")]
    InvalidVariable {
        variable: String,
        normalized: String,
        position: usize,
    },
}

/// Evaluation failure stored as a cell value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "name")]
pub enum FormulaError {
    /// #DIV/0!
    #[error("division by zero")]
    DivisionByZero,
    /// #REF! - the variable had no numeric value
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
}

impl FormulaError {
    /// Short spreadsheet-style code for display in a grid
    pub fn code(&self) -> &'static str {
        match self {
            FormulaError::DivisionByZero => "#DIV/0!",
            FormulaError::UndefinedVariable(_) => "#REF!",
        }
    }

    /// Human readable reason without the variable name
    pub fn reason(&self) -> &'static str {
        match self {
            FormulaError::DivisionByZero => "division by zero",
            FormulaError::UndefinedVariable(_) => "undefined variable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(FormulaError::DivisionByZero.code(), "#DIV/0!");
        assert_eq!(FormulaError::UndefinedVariable("A1".into()).code(), "#REF!");
        assert_eq!(
            FormulaError::UndefinedVariable("A1".into()).to_string(),
            "undefined variable: A1"
        );
    }
}
