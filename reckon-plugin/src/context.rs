//! Evaluation Context

use reckon_core::EvalError;
use crate::PluginRegistry;
use std::collections::HashMap;

/// Variable bindings visible to one expression
pub type Scope = HashMap<String, f64>;

/// Borrowed view handed to the interpreter and to plugins for a single
/// evaluation. Nothing here outlives the call.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub registry: &'a PluginRegistry,
    pub variables: &'a Scope,
}

impl<'a> EvalContext<'a> {
    pub fn new(registry: &'a PluginRegistry, variables: &'a Scope) -> Self {
        Self { registry, variables }
    }

    /// Resolve an identifier: scope first, then registered constants.
    pub fn get_var(&self, name: &str) -> Result<f64, EvalError> {
        if let Some(v) = self.variables.get(name) {
            return Ok(*v);
        }
        self.registry
            .constant(name)
            .ok_or_else(|| EvalError::undefined_var(name))
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.variables.contains_key(name) || self.registry.constant(name).is_some()
    }
}
