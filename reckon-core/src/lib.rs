//! Reckon Core - Fundamental types
//!
//! This crate provides the core types used throughout Reckon:
//! - `Value`: Raw input and intermediate values (numbers, text, booleans, null)
//! - `EvalError`: Structured errors for expression parsing and evaluation
//! - numeric parsing of form input

mod number;
mod value;
mod error;

pub use number::{parse_number, display_number, is_multiple_of};
pub use value::Value;
pub use error::{EvalError, Diagnostic, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Value, EvalError};
    pub use crate::error::codes;
}
