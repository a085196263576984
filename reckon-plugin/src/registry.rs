//! Plugin Registry

use crate::{EvalContext, FunctionMeta, FunctionPlugin};
use reckon_core::{EvalError, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Definition of a named constant usable in formulas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantDef {
    pub name: String,
    pub value: f64,
    pub category: String,
    pub description: String,
}

impl ConstantDef {
    pub fn new(name: &str, value: f64, category: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            value,
            category: category.to_string(),
            description: description.to_string(),
        }
    }
}

/// Functions and constants available to formulas.
///
/// Built once, then shared read-only behind an `Arc`.
pub struct PluginRegistry {
    functions: HashMap<String, Arc<dyn FunctionPlugin>>,
    constants: HashMap<String, ConstantDef>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            constants: HashMap::new(),
        }
    }

    pub fn with_function<F: FunctionPlugin + 'static>(mut self, f: F) -> Self {
        let name = f.meta().name.to_lowercase();
        self.functions.insert(name, Arc::new(f));
        self
    }

    pub fn with_constant(mut self, def: ConstantDef) -> Self {
        let name = def.name.to_lowercase();
        self.constants.insert(name, def);
        self
    }

    pub fn get_function(&self, name: &str) -> Option<&dyn FunctionPlugin> {
        self.functions.get(&name.to_lowercase()).map(|f| f.as_ref())
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    pub fn get_constant(&self, name: &str) -> Option<&ConstantDef> {
        self.constants.get(&name.to_lowercase())
    }

    /// Numeric value of a constant
    pub fn constant(&self, name: &str) -> Option<f64> {
        self.get_constant(name).map(|c| c.value)
    }

    /// Sorted function names
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn call_function(&self, name: &str, args: &[Value], ctx: &EvalContext) -> Result<Value, EvalError> {
        match self.get_function(name) {
            Some(f) => f.call(args, ctx),
            None => Err(EvalError::UnknownFunction {
                name: name.to_string(),
                similar: self.find_similar_functions(name).into_iter().take(5).collect(),
            }),
        }
    }

    /// Find function names similar to the given name (for error suggestions)
    fn find_similar_functions(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let floor = name_lower.chars().count();
        let mut matches: Vec<(String, usize)> = self.functions.keys()
            .filter_map(|func_name| {
                let score = Self::similarity_score(&name_lower, func_name);
                if score > floor {
                    Some((func_name.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Higher score first, then alphabetical so output is stable
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        score += common * 2;

        let len_diff = (query.len() as i64 - candidate.len() as i64).unsigned_abs() as usize;
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }

    /// Help for one function or constant, or an overview when `name` is `None`.
    /// Returns `None` for an unknown name.
    pub fn help(&self, name: Option<&str>) -> Option<serde_json::Value> {
        match name {
            Some(n) => self.help_for(n),
            None => Some(self.general_help()),
        }
    }

    fn help_for(&self, name: &str) -> Option<serde_json::Value> {
        if let Some(f) = self.get_function(name) {
            return Some(Self::function_to_help(f.meta()));
        }
        self.get_constant(name).map(|c| {
            json!({
                "name": c.name,
                "type": "constant",
                "value": c.value,
                "category": c.category,
                "description": c.description,
            })
        })
    }

    fn general_help(&self) -> serde_json::Value {
        let mut funcs_by_cat: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for name in self.function_names() {
            if let Some(f) = self.functions.get(name) {
                funcs_by_cat.entry(f.meta().category).or_default().push(name);
            }
        }
        let mut constants: Vec<&str> = self.constants.values().map(|c| c.name.as_str()).collect();
        constants.sort_unstable();

        json!({
            "functions": funcs_by_cat,
            "constants": constants,
            "usage": "Call help('function_name') for detailed help.",
        })
    }

    fn function_to_help(meta: FunctionMeta) -> serde_json::Value {
        json!({
            "name": meta.name,
            "type": "function",
            "description": meta.description,
            "usage": meta.usage,
            "returns": meta.returns,
            "category": meta.category,
            "args": meta.args,
            "examples": meta.examples,
            "related": meta.related,
        })
    }

    /// Function metadata, optionally restricted to one category, sorted by name
    pub fn list_functions(&self, category: Option<&str>) -> Vec<FunctionMeta> {
        self.function_names()
            .into_iter()
            .filter_map(|name| self.functions.get(name))
            .map(|f| f.meta())
            .filter(|m| category.map_or(true, |c| m.category.eq_ignore_ascii_case(c)))
            .collect()
    }

    pub fn list_constants(&self) -> Vec<&ConstantDef> {
        let mut consts: Vec<&ConstantDef> = self.constants.values().collect();
        consts.sort_by(|a, b| a.name.cmp(&b.name));
        consts
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
