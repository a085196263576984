//! Static configuration checks
//!
//! Catches calculator definitions that could never evaluate: duplicated ids,
//! selects without choices, formulas that do not parse or that mention names
//! nothing defines.

use crate::parser::parse;
use crate::schema::{CalculatorConfig, VariableType};
use reckon_core::EvalError;
use reckon_plugin::PluginRegistry;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicateVariable,
    DuplicateFormula,
    SelectWithoutOptions,
    ParseError,
    UnresolvedIdentifier,
    UnknownFunction,
}

/// A configuration problem, attached to the variable or formula it concerns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub kind: IssueKind,
    pub subject: String,
    pub message: String,
}

impl ConfigIssue {
    fn new(kind: IssueKind, subject: &str, message: String) -> Self {
        Self { kind, subject: subject.to_string(), message }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Check one calculator against the functions and constants in `registry`.
///
/// A formula may refer to variables, to formulas declared before it, and to
/// registered constants.
pub fn check_config(config: &CalculatorConfig, registry: &PluginRegistry) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    let mut known: HashSet<&str> = HashSet::new();

    for variable in &config.variables {
        if !known.insert(variable.id.as_str()) {
            issues.push(ConfigIssue::new(
                IssueKind::DuplicateVariable,
                &variable.id,
                format!("variable '{}' is declared more than once", variable.id),
            ));
        }
        if variable.var_type == VariableType::Select && variable.select_options().map_or(true, |o| o.is_empty()) {
            issues.push(ConfigIssue::new(
                IssueKind::SelectWithoutOptions,
                &variable.id,
                format!("select variable '{}' has no options", variable.id),
            ));
        }
    }

    let mut formula_ids: HashSet<&str> = HashSet::new();
    for formula in &config.formulas {
        if !formula_ids.insert(formula.id.as_str()) {
            issues.push(ConfigIssue::new(
                IssueKind::DuplicateFormula,
                &formula.id,
                format!("formula '{}' is declared more than once", formula.id),
            ));
        }

        match parse(&formula.expression) {
            Err(err) => {
                let message = match &err {
                    EvalError::Parse { position, message } => format!("parse error at {}: {}", position, message),
                    other => other.to_string(),
                };
                issues.push(ConfigIssue::new(IssueKind::ParseError, &formula.id, message));
            }
            Ok(expr) => {
                for name in expr.free_variables() {
                    if !known.contains(name.as_str()) && registry.get_constant(&name).is_none() {
                        issues.push(ConfigIssue::new(
                            IssueKind::UnresolvedIdentifier,
                            &formula.id,
                            format!("'{}' is not a variable, an earlier formula or a constant", name),
                        ));
                    }
                }
                for name in expr.function_names() {
                    if !registry.is_function(&name) {
                        issues.push(ConfigIssue::new(
                            IssueKind::UnknownFunction,
                            &formula.id,
                            format!("unknown function '{}'", name),
                        ));
                    }
                }
            }
        }

        known.insert(formula.id.as_str());
    }

    issues
}
