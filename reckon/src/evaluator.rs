//! Formula evaluation
//!
//! Inputs are coerced to numbers first. Values that do not parse are left out
//! of the scope, so a formula that needs them fails with a missing-variable
//! error instead of silently computing with zero.

use crate::eval::Interpreter;
use crate::format::{FormulaOutput, ResultFormatter};
use crate::parser::parse;
use crate::schema::{FormulaDefinition, Inputs};
use reckon_core::{EvalError, Value};
use reckon_plugin::{EvalContext, PluginRegistry, Scope};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// One line of a calculation breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationStep {
    pub step: String,
    pub value: FormulaOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Dry-run report for a formula
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Evaluates formulas against user inputs. Holds no per-call state, so one
/// instance can serve any number of concurrent calculations.
#[derive(Clone)]
pub struct FormulaEvaluator {
    registry: Arc<PluginRegistry>,
    formatter: ResultFormatter,
    interpreter: Interpreter,
}

impl FormulaEvaluator {
    pub fn new(registry: Arc<PluginRegistry>, formatter: ResultFormatter) -> Self {
        Self { registry, formatter, interpreter: Interpreter::new() }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn formatter(&self) -> &ResultFormatter {
        &self.formatter
    }

    /// Numeric view of the inputs; unparsable entries are dropped
    pub fn coerce_inputs(inputs: &Inputs) -> Scope {
        inputs
            .iter()
            .filter_map(|(k, v)| v.coerce_number().map(|n| (k.clone(), n)))
            .collect()
    }

    /// Evaluate and format; `None` on any failure, which is logged.
    pub fn evaluate(&self, formula: &FormulaDefinition, inputs: &Inputs) -> Option<FormulaOutput> {
        match self.try_evaluate(formula, inputs) {
            Ok(out) => Some(out),
            Err(err) => {
                warn!(
                    formula = %formula.id,
                    expression = %formula.expression,
                    code = err.code(),
                    "formula evaluation failed: {}",
                    err
                );
                None
            }
        }
    }

    pub fn try_evaluate(&self, formula: &FormulaDefinition, inputs: &Inputs) -> Result<FormulaOutput, EvalError> {
        let scope = Self::coerce_inputs(inputs);
        let value = self.eval_in_scope(&formula.expression, &scope)?;
        self.format_value(value, formula)
    }

    /// Unformatted numeric result
    pub fn evaluate_raw(&self, formula: &FormulaDefinition, inputs: &Inputs) -> Result<f64, EvalError> {
        let scope = Self::coerce_inputs(inputs);
        let value = self.eval_in_scope(&formula.expression, &scope)?;
        value
            .as_number()
            .ok_or_else(|| EvalError::arg_type(&formula.id, "result", "Number", value.type_name()))
    }

    pub(crate) fn eval_in_scope(&self, expression: &str, scope: &Scope) -> Result<Value, EvalError> {
        let expr = parse(expression)?;
        let ctx = EvalContext::new(&self.registry, scope);
        self.interpreter.eval_expr(&expr, &ctx)
    }

    pub(crate) fn format_value(&self, value: Value, formula: &FormulaDefinition) -> Result<FormulaOutput, EvalError> {
        match value {
            Value::Number(n) => self.formatter.format(n, formula.result_type, formula.precision),
            other => Ok(FormulaOutput::Text(other.to_string())),
        }
    }

    /// Inputs (sorted by name) followed by the expression and its formatted
    /// result. Empty when the formula cannot be evaluated.
    pub fn get_steps(&self, formula: &FormulaDefinition, inputs: &Inputs) -> Vec<CalculationStep> {
        self.steps_in_scope(formula, &Self::coerce_inputs(inputs))
    }

    pub(crate) fn steps_in_scope(&self, formula: &FormulaDefinition, scope: &Scope) -> Vec<CalculationStep> {
        let value = match self
            .eval_in_scope(&formula.expression, scope)
            .and_then(|v| self.format_value(v, formula))
        {
            Ok(v) => v,
            Err(err) => {
                warn!(formula = %formula.id, code = err.code(), "step calculation failed: {}", err);
                return Vec::new();
            }
        };

        let mut names: Vec<&String> = scope.keys().collect();
        names.sort();

        let mut steps: Vec<CalculationStep> = names
            .into_iter()
            .map(|name| CalculationStep {
                step: name.clone(),
                value: FormulaOutput::Number(scope[name]),
                description: Some(format!("Input: {}", name)),
            })
            .collect();

        steps.push(CalculationStep {
            step: formula.expression.clone(),
            value,
            description: Some(formula.description.clone().unwrap_or_else(|| "Final calculation".to_string())),
        });
        steps
    }

    /// Parse, look for variables the inputs do not supply, then try to
    /// evaluate. Never fails; problems come back as messages.
    pub fn validate(&self, formula: &FormulaDefinition, inputs: &Inputs) -> FormulaValidation {
        let mut errors = Vec::new();
        let scope = Self::coerce_inputs(inputs);

        match parse(&formula.expression) {
            Err(err) => errors.push(format!("Formula error: {}", err)),
            Ok(expr) => {
                let ctx = EvalContext::new(&self.registry, &scope);
                let missing: Vec<String> = expr
                    .free_variables()
                    .into_iter()
                    .filter(|v| !ctx.is_bound(v))
                    .collect();
                if !missing.is_empty() {
                    errors.push(format!("Missing variables: {}", missing.join(", ")));
                }
                if let Err(err) = self.interpreter.eval_expr(&expr, &ctx) {
                    errors.push(format!("Formula error: {}", err));
                }
            }
        }

        FormulaValidation { is_valid: errors.is_empty(), errors }
    }
}

impl Default for FormulaEvaluator {
    fn default() -> Self {
        let registry = reckon_units::load_units_library(reckon_std::standard_registry());
        Self::new(Arc::new(registry), ResultFormatter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ResultType;

    fn inputs(pairs: &[(&str, Value)]) -> Inputs {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn bmi() -> FormulaDefinition {
        FormulaDefinition::new("bmi", "weight / ((height/100)^2)", ResultType::Decimal)
    }

    #[test]
    fn test_bmi_decimal() {
        let ev = FormulaEvaluator::default();
        let out = ev.evaluate(&bmi(), &inputs(&[("weight", 70.0.into()), ("height", 175.0.into())]));
        assert_eq!(out, Some(FormulaOutput::Text("22.86".to_string())));
    }

    #[test]
    fn test_string_inputs_are_parsed() {
        let ev = FormulaEvaluator::default();
        let out = ev.evaluate(&bmi(), &inputs(&[("weight", "70".into()), ("height", " 175 ".into())]));
        assert_eq!(out, Some(FormulaOutput::Text("22.86".to_string())));
    }

    #[test]
    fn test_unparsable_input_is_missing() {
        let ev = FormulaEvaluator::default();
        let vars = inputs(&[("weight", "seventy".into()), ("height", 175.0.into())]);
        assert_eq!(ev.evaluate(&bmi(), &vars), None);
        assert_eq!(ev.try_evaluate(&bmi(), &vars).unwrap_err(), EvalError::undefined_var("weight"));
    }

    #[test]
    fn test_percentage_and_currency() {
        let ev = FormulaEvaluator::default();
        let rate = FormulaDefinition::new("r", "rate / 100", ResultType::Percentage);
        assert_eq!(ev.evaluate(&rate, &inputs(&[("rate", 7.0.into())])), Some(FormulaOutput::Text("7.00%".to_string())));
        let pay = FormulaDefinition::new("p", "amount * 12", ResultType::Currency);
        assert_eq!(
            ev.evaluate(&pay, &inputs(&[("amount", 1250.5.into())])),
            Some(FormulaOutput::Text("$15,006.00".to_string()))
        );
    }

    #[test]
    fn test_precision_override() {
        let ev = FormulaEvaluator::default();
        let f = FormulaDefinition::new("x", "1 / 3", ResultType::Decimal).with_precision(4);
        assert_eq!(ev.evaluate(&f, &Inputs::new()), Some(FormulaOutput::Text("0.3333".to_string())));
    }

    #[test]
    fn test_huge_results_never_render_inf() {
        let ev = FormulaEvaluator::default();
        let decimal = FormulaDefinition::new("x", "1e307", ResultType::Decimal);
        let out = ev.evaluate(&decimal, &Inputs::new()).unwrap().to_string();
        assert!(!out.contains("inf") && out.ends_with(".00"));

        let money = FormulaDefinition::new("x", "1e307", ResultType::Currency);
        assert!(!ev.evaluate(&money, &Inputs::new()).unwrap().to_string().contains("inf"));

        let percent = FormulaDefinition::new("x", "1e307", ResultType::Percentage);
        assert_eq!(ev.evaluate(&percent, &Inputs::new()), None);
        assert_eq!(ev.try_evaluate(&percent, &Inputs::new()).unwrap_err(), EvalError::NonFinite);
    }

    #[test]
    fn test_precision_is_capped() {
        let ev = FormulaEvaluator::default();
        let f = FormulaDefinition::new("x", "0", ResultType::Decimal).with_precision(400);
        assert_eq!(ev.evaluate(&f, &Inputs::new()), Some(FormulaOutput::Text("0.000000000000000".to_string())));
    }

    #[test]
    fn test_division_by_zero_is_none() {
        let ev = FormulaEvaluator::default();
        let f = FormulaDefinition::new("x", "a / b", ResultType::Number);
        assert_eq!(ev.evaluate(&f, &inputs(&[("a", 1.0.into()), ("b", 0.0.into())])), None);
    }

    #[test]
    fn test_evaluate_raw() {
        let ev = FormulaEvaluator::default();
        let raw = ev.evaluate_raw(&bmi(), &inputs(&[("weight", 70.0.into()), ("height", 175.0.into())])).unwrap();
        assert!((raw - 22.857142857142858).abs() < 1e-12);
    }

    #[test]
    fn test_steps() {
        let ev = FormulaEvaluator::default();
        let f = bmi().with_description("Your Body Mass Index");
        let steps = ev.get_steps(&f, &inputs(&[("weight", 70.0.into()), ("height", 175.0.into())]));
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].step, "height");
        assert_eq!(steps[0].value, FormulaOutput::Number(175.0));
        assert_eq!(steps[0].description.as_deref(), Some("Input: height"));
        assert_eq!(steps[1].step, "weight");
        assert_eq!(steps[2].step, "weight / ((height/100)^2)");
        assert_eq!(steps[2].value, FormulaOutput::Text("22.86".to_string()));
        assert_eq!(steps[2].description.as_deref(), Some("Your Body Mass Index"));
    }

    #[test]
    fn test_steps_empty_on_failure() {
        let ev = FormulaEvaluator::default();
        assert!(ev.get_steps(&bmi(), &Inputs::new()).is_empty());
    }

    #[test]
    fn test_validate_reports_missing_variables() {
        let ev = FormulaEvaluator::default();
        let report = ev.validate(&bmi(), &inputs(&[("weight", 70.0.into())]));
        assert!(!report.is_valid);
        assert_eq!(report.errors[0], "Missing variables: height");
        assert!(report.errors[1].starts_with("Formula error:"));
    }

    #[test]
    fn test_validate_parse_error() {
        let ev = FormulaEvaluator::default();
        let f = FormulaDefinition::new("x", "1 +", ResultType::Number);
        let report = ev.validate(&f, &Inputs::new());
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Formula error: Parse error at 3"));
    }

    #[test]
    fn test_validate_ok() {
        let ev = FormulaEvaluator::default();
        let report = ev.validate(&bmi(), &inputs(&[("weight", 70.0.into()), ("height", 175.0.into())]));
        assert_eq!(report, FormulaValidation { is_valid: true, errors: vec![] });
    }

    #[test]
    fn test_constants_are_not_missing() {
        let ev = FormulaEvaluator::default();
        let f = FormulaDefinition::new("area", "pi * r ^ 2", ResultType::Decimal);
        assert!(ev.validate(&f, &inputs(&[("r", 1.0.into())])).is_valid);
    }
}
