//! Reckon - formula evaluation and validation for calculators
//!
//! A calculator is a list of typed input variables plus formulas over them.
//! [`CalculatorValidator`] checks raw inputs, [`FormulaEvaluator`] computes
//! and formats each formula, and [`Engine`] runs the whole cycle against a
//! [`CalculatorRegistry`].

mod ast;
mod parser;
mod eval;
mod format;
mod schema;
mod validator;
mod evaluator;
mod check;
mod catalog;
mod registry;
mod engine;
mod config;

pub use ast::{BinOp, Expr, UnaryOp};
pub use parser::parse;
pub use eval::Interpreter;
pub use format::{to_fixed, CurrencyFormat, FormulaOutput, ResultFormatter};
pub use schema::{
    CalculatorConfig, FormulaDefinition, Inputs, ResultType, SelectOption, SeoMeta, ValidationRules,
    VariableDefinition, VariableType,
};
pub use validator::{parse_date, CalculatorValidator, ValidationResult};
pub use evaluator::{CalculationStep, FormulaEvaluator, FormulaValidation};
pub use check::{check_config, ConfigIssue, IssueKind};
pub use catalog::builtin_calculators;
pub use registry::{CalculatorRegistry, CalculatorRegistryBuilder, DEFAULT_RELATED_LIMIT};
pub use engine::{CalculateError, Calculation, Engine, FormulaFailure, FormulaResult};
pub use config::{load_catalog, parse_catalog, ConfigError, EngineConfig};

pub use reckon_core::{Diagnostic, EvalError, Value};
pub use reckon_units::UnitConverter;

/// Build an [`Inputs`] map: `inputs! { weight: 70, height: "175" }`
#[macro_export]
macro_rules! inputs {
    {} => { $crate::Inputs::new() };
    { $($key:ident : $value:expr),* $(,)? } => {{
        let mut map = $crate::Inputs::new();
        $(
            map.insert(stringify!($key).to_string(), $crate::Value::from($value));
        )*
        map
    }};
}
