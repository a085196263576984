//! Calculation cycle
//!
//! Looks a calculator up, fills in defaults, validates, then evaluates every
//! formula in declaration order. Later formulas can refer to the raw results
//! of earlier ones.

use crate::config::{load_catalog, ConfigError, EngineConfig};
use crate::evaluator::{CalculationStep, FormulaEvaluator};
use crate::format::{FormulaOutput, ResultFormatter};
use crate::registry::CalculatorRegistry;
use crate::schema::{CalculatorConfig, Inputs};
use crate::validator::{CalculatorValidator, ValidationResult};
use reckon_core::{Diagnostic, Value};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq)]
pub enum CalculateError {
    #[error("Calculator not found: {0}")]
    NotFound(String),
}

/// One formula's output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaResult {
    pub id: String,
    pub label: String,
    pub value: Option<FormulaOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<CalculationStep>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaFailure {
    pub formula_id: String,
    pub diagnostic: Diagnostic,
}

/// Everything a presentation layer needs after one calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    pub calculator_id: String,
    /// Inputs after defaults were applied
    pub inputs: Inputs,
    pub validation: ValidationResult,
    pub results: Vec<FormulaResult>,
    pub failures: Vec<FormulaFailure>,
}

impl Calculation {
    pub fn result(&self, id: &str) -> Option<&FormulaResult> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn is_complete(&self) -> bool {
        self.validation.is_valid && self.failures.is_empty()
    }
}

/// Registry, evaluator and validator wired together. Cheap to clone and
/// safe to share between threads.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<CalculatorRegistry>,
    evaluator: FormulaEvaluator,
    validator: CalculatorValidator,
}

impl Engine {
    pub fn new(registry: Arc<CalculatorRegistry>, evaluator: FormulaEvaluator, validator: CalculatorValidator) -> Self {
        Self { registry, evaluator, validator }
    }

    /// Build an engine from settings: built-in catalog plus the optional
    /// catalog file, formatted for the configured locale and currency.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let mut builder = CalculatorRegistry::builder().with_calculators(crate::catalog::builtin_calculators());
        if let Some(path) = &config.catalog_path {
            let extra = load_catalog(path)?;
            info!(path = %path.display(), count = extra.len(), "loaded calculator catalog");
            builder = builder.with_calculators(extra);
        }

        let functions = reckon_units::load_units_library(reckon_std::standard_registry());
        let formatter = ResultFormatter::new(&config.locale, &config.currency)
            .with_default_precision(config.default_precision);
        let evaluator = FormulaEvaluator::new(Arc::new(functions), formatter);

        let registry = builder.build();
        registry.check_all(evaluator.registry());

        Ok(Self::new(Arc::new(registry), evaluator, CalculatorValidator::new()))
    }

    pub fn registry(&self) -> &CalculatorRegistry {
        &self.registry
    }

    pub fn evaluator(&self) -> &FormulaEvaluator {
        &self.evaluator
    }

    pub fn validator(&self) -> &CalculatorValidator {
        &self.validator
    }

    pub fn calculate(&self, id: &str, inputs: &Inputs) -> Result<Calculation, CalculateError> {
        let config = self
            .registry
            .get_calculator_config(id)
            .ok_or_else(|| CalculateError::NotFound(id.to_string()))?;
        Ok(self.calculate_config(config, inputs))
    }

    /// Run the cycle for a calculator that need not be in the registry
    pub fn calculate_config(&self, config: &CalculatorConfig, inputs: &Inputs) -> Calculation {
        let inputs = with_defaults(config, inputs);
        let validation = self.validator.validate_inputs(&inputs, &config.variables);

        let mut calculation = Calculation {
            calculator_id: config.id.clone(),
            inputs,
            validation,
            results: Vec::new(),
            failures: Vec::new(),
        };
        if !calculation.validation.is_valid {
            debug!(calculator = %config.id, "inputs rejected");
            return calculation;
        }

        let mut scope = FormulaEvaluator::coerce_inputs(&calculation.inputs);
        for formula in &config.formulas {
            let steps = config.show_steps.then(|| self.evaluator.steps_in_scope(formula, &scope));
            let label = formula.label.clone().unwrap_or_else(|| formula.id.clone());

            let outcome = self.evaluator.eval_in_scope(&formula.expression, &scope).and_then(|value| {
                let formatted = self.evaluator.format_value(value.clone(), formula)?;
                Ok((value.as_number(), formatted))
            });

            match outcome {
                Ok((raw, formatted)) => {
                    if let Some(n) = raw {
                        scope.insert(formula.id.clone(), n);
                    }
                    calculation.results.push(FormulaResult {
                        id: formula.id.clone(),
                        label,
                        value: Some(formatted),
                        raw,
                        steps,
                    });
                }
                Err(err) => {
                    warn!(calculator = %config.id, formula = %formula.id, code = err.code(), "{}", err);
                    calculation.failures.push(FormulaFailure {
                        formula_id: formula.id.clone(),
                        diagnostic: err.to_diagnostic(),
                    });
                    calculation.results.push(FormulaResult {
                        id: formula.id.clone(),
                        label,
                        value: None,
                        raw: None,
                        steps,
                    });
                }
            }
        }
        calculation
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(
            Arc::new(CalculatorRegistry::builtin()),
            FormulaEvaluator::default(),
            CalculatorValidator::new(),
        )
    }
}

/// Caller inputs with each absent or blank field replaced by its default
fn with_defaults(config: &CalculatorConfig, inputs: &Inputs) -> Inputs {
    let mut seeded = inputs.clone();
    for variable in &config.variables {
        let Some(default) = &variable.default_value else {
            continue;
        };
        let missing = seeded.get(&variable.id).map_or(true, Value::is_blank);
        if missing {
            seeded.insert(variable.id.clone(), default.clone());
        }
    }
    seeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FormulaDefinition, ResultType, VariableDefinition, VariableType};

    fn inputs(pairs: &[(&str, Value)]) -> Inputs {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn text(s: &str) -> Option<FormulaOutput> {
        Some(FormulaOutput::Text(s.to_string()))
    }

    #[test]
    fn test_unknown_calculator() {
        let engine = Engine::default();
        assert_eq!(
            engine.calculate("nope", &Inputs::new()).unwrap_err(),
            CalculateError::NotFound("nope".to_string())
        );
    }

    #[test]
    fn test_loan_chains_formulas() {
        let engine = Engine::default();
        let calc = engine
            .calculate("loan", &inputs(&[("amount", 200000.0.into()), ("rate", 3.5.into()), ("term", 30.0.into())]))
            .unwrap();
        assert!(calc.is_complete());
        assert_eq!(calc.result("monthlyPayment").unwrap().value, text("$898.09"));
        assert_eq!(calc.result("totalPayment").unwrap().value, text("$323,312.18"));
        assert_eq!(calc.result("totalInterest").unwrap().value, text("$123,312.18"));
        let raw = calc.result("monthlyPayment").unwrap().raw.unwrap();
        assert!((raw - 898.089375617647).abs() < 1e-6);
    }

    #[test]
    fn test_defaults_fill_absent_and_blank() {
        let engine = Engine::default();
        let calc = engine.calculate("compound-interest", &inputs(&[("principal", "".into())])).unwrap();
        assert!(calc.is_complete());
        assert_eq!(calc.inputs["principal"], Value::Number(10000.0));
        assert_eq!(calc.inputs["frequency"], Value::Text("12".to_string()));
        assert_eq!(calc.result("futureValue").unwrap().value, text("$20,096.61"));
        assert_eq!(calc.result("totalInterest").unwrap().value, text("$10,096.61"));
    }

    #[test]
    fn test_mortgage_optional_down_payment() {
        let engine = Engine::default();
        let calc = engine
            .calculate("mortgage", &inputs(&[("principal", 400000.0.into()), ("downPayment", 80000.0.into())]))
            .unwrap();
        assert!(calc.is_complete());
        assert_eq!(calc.result("loanAmount").unwrap().value, text("$320,000.00"));
        assert_eq!(calc.result("monthlyPayment").unwrap().value, text("$2,022.62"));
        assert_eq!(calc.result("totalInterest").unwrap().value, text("$408,142.36"));
    }

    #[test]
    fn test_invalid_inputs_skip_formulas() {
        let engine = Engine::default();
        let calc = engine.calculate("bmi", &inputs(&[("weight", "heavy".into())])).unwrap();
        assert!(!calc.validation.is_valid);
        assert_eq!(calc.validation.errors_for("weight"), ["Weight must be a valid number"]);
        assert!(calc.results.is_empty());
    }

    #[test]
    fn test_steps_only_when_declared() {
        let engine = Engine::default();
        let bmi = engine.calculate("bmi", &Inputs::new()).unwrap();
        assert!(bmi.results.iter().all(|r| r.steps.is_none()));
        let loan = engine.calculate("loan", &Inputs::new()).unwrap();
        let steps = loan.result("totalPayment").unwrap().steps.as_ref().unwrap();
        assert_eq!(steps.last().unwrap().step, "monthlyPayment * term * 12");
        assert!(steps.iter().any(|s| s.step == "monthlyPayment"));
    }

    #[test]
    fn test_failure_does_not_stop_other_formulas() {
        let config = CalculatorConfig::new("ratio", "Ratio", "math")
            .with_variable(VariableDefinition::new("a", "A", VariableType::Number))
            .with_variable(VariableDefinition::new("b", "B", VariableType::Number))
            .with_formula(FormulaDefinition::new("q", "a / b", ResultType::Number))
            .with_formula(FormulaDefinition::new("s", "a + b", ResultType::Number))
            .with_formula(FormulaDefinition::new("t", "q + 1", ResultType::Number));
        let calc = Engine::default().calculate_config(&config, &inputs(&[("a", 1.0.into()), ("b", 0.0.into())]));

        assert!(calc.validation.is_valid);
        assert_eq!(calc.result("q").unwrap().value, None);
        assert_eq!(calc.result("s").unwrap().value, Some(FormulaOutput::Number(1.0)));
        assert_eq!(calc.result("t").unwrap().value, None);
        let codes: Vec<&str> = calc.failures.iter().map(|f| f.diagnostic.code.as_str()).collect();
        assert_eq!(codes, vec!["DIV_ZERO", "UNDEFINED_VAR"]);
    }

    #[test]
    fn test_unrenderable_percentage_is_a_failure() {
        let config = CalculatorConfig::new("huge", "Huge", "math")
            .with_variable(VariableDefinition::new("a", "A", VariableType::Number))
            .with_formula(FormulaDefinition::new("share", "a", ResultType::Percentage))
            .with_formula(FormulaDefinition::new("half", "a / 2", ResultType::Decimal));
        let calc = Engine::default().calculate_config(&config, &inputs(&[("a", 1e307.into())]));

        assert_eq!(calc.result("share").unwrap().value, None);
        assert_eq!(calc.failures[0].diagnostic.code, "NON_FINITE");
        let half = calc.result("half").unwrap().value.as_ref().unwrap().to_string();
        assert!(!half.contains("inf"));
    }
}
