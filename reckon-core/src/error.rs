//! Structured evaluation errors
//!
//! Errors never crash the engine. Every failure of a formula is one of the
//! variants below and carries a stable machine-readable code so callers can
//! branch on it without matching message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const UNDEFINED_VAR: &str = "UNDEFINED_VAR";
    pub const UNDEFINED_FUNC: &str = "UNDEFINED_FUNC";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const NON_FINITE: &str = "NON_FINITE";
}

/// Error raised while parsing or evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Parse error at {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Missing variable: {0}")]
    UndefinedVariable(String),

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String, similar: Vec<String> },

    #[error("{func}() expects {expected} arguments, got {got}")]
    ArgCount { func: String, expected: String, got: usize },

    #[error("{func}() argument '{arg}': expected {expected}, got {got}")]
    ArgType { func: String, arg: String, expected: String, got: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Result is not a finite number")]
    NonFinite,
}

impl EvalError {
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse { position, message: message.into() }
    }

    pub fn undefined_var(name: &str) -> Self {
        Self::UndefinedVariable(name.to_string())
    }

    pub fn unknown_func(name: &str) -> Self {
        Self::UnknownFunction { name: name.to_string(), similar: Vec::new() }
    }

    /// Arity mismatch. `expected` is free text so ranges ("1 or 2") read well.
    pub fn arg_count(func: &str, expected: impl ToString, got: usize) -> Self {
        Self::ArgCount { func: func.to_string(), expected: expected.to_string(), got }
    }

    pub fn arg_type(func: &str, arg: &str, expected: &str, got: &str) -> Self {
        Self::ArgType {
            func: func.to_string(),
            arg: arg.to_string(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    pub fn domain(details: impl Into<String>) -> Self {
        Self::Domain(details.into())
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            EvalError::Parse { .. } => codes::PARSE_ERROR,
            EvalError::UndefinedVariable(_) => codes::UNDEFINED_VAR,
            EvalError::UnknownFunction { .. } => codes::UNDEFINED_FUNC,
            EvalError::ArgCount { .. } => codes::ARG_COUNT,
            EvalError::ArgType { .. } => codes::ARG_TYPE,
            EvalError::DivisionByZero => codes::DIV_ZERO,
            EvalError::Domain(_) => codes::DOMAIN_ERROR,
            EvalError::NonFinite => codes::NON_FINITE,
        }
    }

    /// Hint for fixing the error, when one exists
    pub fn suggestion(&self) -> Option<String> {
        match self {
            EvalError::Parse { .. } => Some("Check formula syntax".to_string()),
            EvalError::UndefinedVariable(name) => {
                Some(format!("Provide a numeric value for '{}' or check spelling", name))
            }
            EvalError::UnknownFunction { similar, .. } if !similar.is_empty() => {
                Some(format!("Similar: {}", similar.join(", ")))
            }
            EvalError::UnknownFunction { .. } => Some("Use list_functions to see what is available".to_string()),
            EvalError::ArgCount { func, .. } => Some(format!("Use help('{}') for usage", func)),
            EvalError::DivisionByZero => Some("Ensure divisor is not zero".to_string()),
            _ => None,
        }
    }

    /// Serializable form for logs and JSON responses
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            code: self.code().to_string(),
            message: self.to_string(),
            suggestion: self.suggestion(),
        }
    }
}

/// Flattened error suitable for JSON output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}
