//! Calculator configuration types
//!
//! Field names serialize in camelCase so catalogs can be written as JSON in
//! the same shape calculators are declared in.

use reckon_core::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw user input keyed by variable id
pub type Inputs = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Number,
    Percentage,
    Currency,
    Date,
    Select,
}

/// How a formula's numeric result is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    #[default]
    Number,
    Currency,
    Percentage,
    Decimal,
    Integer,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
}

fn default_true() -> bool {
    true
}

/// One input field of a calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    #[serde(alias = "name")]
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    /// Options declared beside the variable rather than under `validation`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default, alias = "units", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VariableDefinition {
    pub fn new(id: &str, label: &str, var_type: VariableType) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            var_type,
            required: true,
            default_value: None,
            validation: None,
            options: None,
            unit: None,
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        let rules = self.validation.get_or_insert_with(ValidationRules::default);
        rules.min = Some(min);
        rules.max = Some(max);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.validation.get_or_insert_with(ValidationRules::default).min = Some(min);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.validation.get_or_insert_with(ValidationRules::default).step = Some(step);
        self
    }

    pub fn with_options(mut self, options: &[(&str, &str)]) -> Self {
        let options = options
            .iter()
            .map(|(value, label)| SelectOption { value: value.to_string(), label: label.to_string() })
            .collect();
        self.validation.get_or_insert_with(ValidationRules::default).options = Some(options);
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn min(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.max)
    }

    pub fn step(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.step)
    }

    /// Select options from either placement; `validation.options` wins.
    pub fn select_options(&self) -> Option<&[SelectOption]> {
        self.validation
            .as_ref()
            .and_then(|v| v.options.as_deref())
            .or(self.options.as_deref())
    }
}

/// One derived output of a calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaDefinition {
    #[serde(alias = "name")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub expression: String,
    #[serde(default)]
    pub result_type: ResultType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FormulaDefinition {
    pub fn new(id: &str, expression: &str, result_type: ResultType) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            expression: expression.to_string(),
            result_type,
            precision: None,
            unit: None,
            description: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Search-engine metadata; only `keywords` takes part in search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A complete calculator: inputs, outputs and catalog metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorConfig {
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    #[serde(default)]
    pub formulas: Vec<FormulaDefinition>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub trending: bool,
    #[serde(default = "default_true")]
    pub auto_calculate: bool,
    #[serde(default)]
    pub show_steps: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl CalculatorConfig {
    pub fn new(id: &str, title: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            category: category.to_string(),
            variables: Vec::new(),
            formulas: Vec::new(),
            tags: Vec::new(),
            featured: false,
            trending: false,
            auto_calculate: true,
            show_steps: false,
            seo: None,
            last_updated: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_variable(mut self, variable: VariableDefinition) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_formula(mut self, formula: FormulaDefinition) -> Self {
        self.formulas.push(formula);
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.seo.get_or_insert_with(SeoMeta::default).keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub fn trending(mut self) -> Self {
        self.trending = true;
        self
    }

    pub fn with_steps(mut self) -> Self {
        self.show_steps = true;
        self
    }

    pub fn variable(&self, id: &str) -> Option<&VariableDefinition> {
        self.variables.iter().find(|v| v.id == id)
    }

    pub fn formula(&self, id: &str) -> Option<&FormulaDefinition> {
        self.formulas.iter().find(|f| f.id == id)
    }

    pub fn keywords(&self) -> &[String] {
        self.seo.as_ref().map(|s| s.keywords.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_declared_shape() {
        let json = r#"{
            "id": "compound-interest",
            "title": "Compound Interest Calculator",
            "category": "finance",
            "showSteps": true,
            "variables": [
                { "name": "principal", "label": "Initial Principal", "type": "currency",
                  "defaultValue": 10000, "validation": { "min": 1, "max": 10000000 } },
                { "name": "frequency", "label": "Compounding Frequency", "type": "select",
                  "defaultValue": "12",
                  "options": [{ "label": "Annually", "value": "1" }, { "label": "Monthly", "value": "12" }] }
            ],
            "formulas": [
                { "name": "futureValue", "expression": "principal * 2", "resultType": "currency" }
            ]
        }"#;
        let config: CalculatorConfig = serde_json::from_str(json).unwrap();
        assert!(config.show_steps);
        assert!(config.auto_calculate);
        let principal = config.variable("principal").unwrap();
        assert!(principal.required);
        assert_eq!(principal.default_value, Some(Value::Number(10000.0)));
        assert_eq!(principal.min(), Some(1.0));
        let frequency = config.variable("frequency").unwrap();
        assert_eq!(frequency.select_options().map(|o| o.len()), Some(2));
        assert_eq!(config.formula("futureValue").unwrap().result_type, ResultType::Currency);
    }

    #[test]
    fn test_result_type_defaults_to_number() {
        let f: FormulaDefinition = serde_json::from_str(r#"{"id": "x", "expression": "1"}"#).unwrap();
        assert_eq!(f.result_type, ResultType::Number);
        assert_eq!(f.precision, None);
    }

    #[test]
    fn test_builder_serializes_camel_case() {
        let v = VariableDefinition::new("rate", "Rate", VariableType::Percentage).with_default(7);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["defaultValue"], 7.0);
        assert_eq!(json["type"], "percentage");
    }
}
