//! Input validation against variable definitions
//!
//! Errors block a calculation; warnings are advisory. A field that is not
//! required and left empty is not checked at all.

use crate::schema::{Inputs, VariableDefinition, VariableType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reckon_core::{display_number, is_multiple_of, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of validating one set of inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: BTreeMap<String, Vec<String>>,
    pub warnings: BTreeMap<String, Vec<String>>,
}

impl ValidationResult {
    pub fn errors_for(&self, id: &str) -> &[String] {
        self.errors.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn warnings_for(&self, id: &str) -> &[String] {
        self.warnings.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[derive(Default)]
struct FieldReport {
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Stateless validator. The reference time used for "in the future" checks
/// defaults to the wall clock and can be pinned for reproducible results.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorValidator {
    reference_time: Option<DateTime<Utc>>,
}

impl CalculatorValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn validate_inputs(&self, inputs: &Inputs, variables: &[VariableDefinition]) -> ValidationResult {
        let mut result = ValidationResult::default();

        for variable in variables {
            let value = inputs.get(&variable.id).filter(|v| !v.is_blank());
            let Some(value) = value else {
                if variable.required {
                    result.errors.insert(variable.id.clone(), vec![format!("{} is required", variable.label)]);
                }
                continue;
            };

            let mut report = FieldReport::default();
            match variable.var_type {
                VariableType::Number => self.validate_number(value, variable, &mut report),
                VariableType::Percentage => self.validate_percentage(value, variable, &mut report),
                VariableType::Currency => self.validate_currency(value, variable, &mut report),
                VariableType::Date => self.validate_date(value, variable, &mut report),
                VariableType::Select => self.validate_select(value, variable, &mut report),
            }

            if !report.errors.is_empty() {
                result.errors.insert(variable.id.clone(), report.errors);
            }
            if !report.warnings.is_empty() {
                result.warnings.insert(variable.id.clone(), report.warnings);
            }
        }

        result.is_valid = result.errors.is_empty();
        result
    }

    fn validate_number(&self, value: &Value, variable: &VariableDefinition, report: &mut FieldReport) {
        let Some(n) = value.coerce_number() else {
            report.errors.push(format!("{} must be a valid number", variable.label));
            return;
        };

        if let Some(min) = variable.min() {
            if n < min {
                report.errors.push(format!("{} must be at least {}", variable.label, display_number(min)));
            }
        }
        if let Some(max) = variable.max() {
            if n > max {
                report.errors.push(format!("{} must be at most {}", variable.label, display_number(max)));
            }
        }
        if let Some(step) = variable.step() {
            if !is_multiple_of(n, step) {
                report.warnings.push(format!("{} should be a multiple of {}", variable.label, display_number(step)));
            }
        }
    }

    fn validate_percentage(&self, value: &Value, variable: &VariableDefinition, report: &mut FieldReport) {
        let Some(n) = value.coerce_number() else {
            report.errors.push(format!("{} must be a valid percentage", variable.label));
            return;
        };
        if !(0.0..=100.0).contains(&n) {
            report.warnings.push(format!("{} is typically between 0% and 100%", variable.label));
        }
    }

    fn validate_currency(&self, value: &Value, variable: &VariableDefinition, report: &mut FieldReport) {
        let Some(n) = value.coerce_number() else {
            report.errors.push(format!("{} must be a valid amount", variable.label));
            return;
        };
        if n < 0.0 {
            report.warnings.push(format!("{} is negative", variable.label));
        }
    }

    fn validate_date(&self, value: &Value, variable: &VariableDefinition, report: &mut FieldReport) {
        let Some(date) = parse_date(value) else {
            report.errors.push(format!("{} must be a valid date", variable.label));
            return;
        };
        let now = self.reference_time.unwrap_or_else(Utc::now);
        if date > now {
            report.warnings.push(format!("{} is in the future", variable.label));
        }
    }

    fn validate_select(&self, value: &Value, variable: &VariableDefinition, report: &mut FieldReport) {
        let options = match variable.select_options() {
            Some(options) if !options.is_empty() => options,
            _ => {
                report.errors.push(format!("{} has no available options", variable.label));
                return;
            }
        };

        let submitted = match value {
            Value::Text(s) => Some(s.clone()),
            Value::Number(n) => Some(display_number(*n)),
            _ => None,
        };
        let matched = submitted.is_some_and(|s| options.iter().any(|o| o.value == s));
        if !matched {
            let choices: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
            report.errors.push(format!("{} must be one of: {}", variable.label, choices.join(", ")));
        }
    }
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (UTC)
/// and numbers as epoch milliseconds.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Text(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                return Some(dt.and_utc());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        }
        Value::Number(ms) if ms.is_finite() => DateTime::from_timestamp_millis(*ms as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn inputs(pairs: &[(&str, Value)]) -> Inputs {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn validator() -> CalculatorValidator {
        CalculatorValidator::new().with_reference_time(Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap())
    }

    fn number_field() -> VariableDefinition {
        VariableDefinition::new("weight", "Weight", VariableType::Number).with_range(20.0, 300.0)
    }

    #[test]
    fn test_required_field_missing() {
        let result = validator().validate_inputs(&Inputs::new(), &[number_field()]);
        assert!(!result.is_valid);
        assert_eq!(result.errors_for("weight"), ["Weight is required"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let result = validator().validate_inputs(&inputs(&[("weight", "  ".into())]), &[number_field()]);
        assert_eq!(result.errors_for("weight"), ["Weight is required"]);
    }

    #[test]
    fn test_optional_empty_field_skipped() {
        let field = number_field().optional();
        let result = validator().validate_inputs(&inputs(&[("weight", Value::Null)]), &[field]);
        assert!(result.is_valid);
        assert!(result.errors.is_empty() && result.warnings.is_empty());
    }

    #[test]
    fn test_number_range_is_error() {
        let result = validator().validate_inputs(&inputs(&[("weight", 10.0.into())]), &[number_field()]);
        assert!(!result.is_valid);
        assert_eq!(result.errors_for("weight"), ["Weight must be at least 20"]);

        let result = validator().validate_inputs(&inputs(&[("weight", "301".into())]), &[number_field()]);
        assert_eq!(result.errors_for("weight"), ["Weight must be at most 300"]);
    }

    #[test]
    fn test_step_is_warning() {
        let field = VariableDefinition::new("qty", "Quantity", VariableType::Number).with_step(0.5);
        let result = validator().validate_inputs(&inputs(&[("qty", 1.25.into())]), &[field.clone()]);
        assert!(result.is_valid);
        assert_eq!(result.warnings_for("qty"), ["Quantity should be a multiple of 0.5"]);

        let result = validator().validate_inputs(&inputs(&[("qty", 1.5.into())]), &[field]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_step_tolerates_float_noise() {
        let field = VariableDefinition::new("rate", "Rate", VariableType::Number).with_step(0.1);
        let result = validator().validate_inputs(&inputs(&[("rate", 0.3.into())]), &[field]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_step_warns_on_large_values() {
        let whole = VariableDefinition::new("amount", "Amount", VariableType::Number).with_step(1.0);
        let result = validator().validate_inputs(&inputs(&[("amount", 600_000_000.5.into())]), &[whole]);
        assert!(result.is_valid);
        assert_eq!(result.warnings_for("amount"), ["Amount should be a multiple of 1"]);

        let cents = VariableDefinition::new("amount", "Amount", VariableType::Number).with_step(0.01);
        let result = validator().validate_inputs(&inputs(&[("amount", 10_000_000.005.into())]), &[cents.clone()]);
        assert_eq!(result.warnings_for("amount"), ["Amount should be a multiple of 0.01"]);

        let result = validator().validate_inputs(&inputs(&[("amount", "10000000.01".into())]), &[cents]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_invalid_number() {
        let result = validator().validate_inputs(&inputs(&[("weight", "heavy".into())]), &[number_field()]);
        assert_eq!(result.errors_for("weight"), ["Weight must be a valid number"]);
    }

    #[test]
    fn test_percentage_out_of_range_is_warning() {
        let field = VariableDefinition::new("growth", "Growth", VariableType::Percentage);
        let result = validator().validate_inputs(&inputs(&[("growth", 150.0.into())]), &[field.clone()]);
        assert!(result.is_valid);
        assert_eq!(result.warnings_for("growth"), ["Growth is typically between 0% and 100%"]);

        let result = validator().validate_inputs(&inputs(&[("growth", "x".into())]), &[field]);
        assert_eq!(result.errors_for("growth"), ["Growth must be a valid percentage"]);
    }

    #[test]
    fn test_negative_currency_is_warning() {
        let field = VariableDefinition::new("balance", "Balance", VariableType::Currency);
        let result = validator().validate_inputs(&inputs(&[("balance", (-5.0).into())]), &[field.clone()]);
        assert!(result.is_valid);
        assert_eq!(result.warnings_for("balance"), ["Balance is negative"]);

        let result = validator().validate_inputs(&inputs(&[("balance", Value::Bool(true))]), &[field]);
        assert_eq!(result.errors_for("balance"), ["Balance must be a valid amount"]);
    }

    #[test]
    fn test_dates() {
        let field = VariableDefinition::new("start", "Start Date", VariableType::Date);
        let result = validator().validate_inputs(&inputs(&[("start", "2024-06-01".into())]), &[field.clone()]);
        assert!(result.is_valid && result.warnings.is_empty());

        let result = validator().validate_inputs(&inputs(&[("start", "2030-01-01T08:00:00Z".into())]), &[field.clone()]);
        assert!(result.is_valid);
        assert_eq!(result.warnings_for("start"), ["Start Date is in the future"]);

        let result = validator().validate_inputs(&inputs(&[("start", "not a date".into())]), &[field]);
        assert_eq!(result.errors_for("start"), ["Start Date must be a valid date"]);
    }

    #[test]
    fn test_select_exact_match() {
        let field = VariableDefinition::new("frequency", "Frequency", VariableType::Select)
            .with_options(&[("1", "Annually"), ("12", "Monthly")]);
        let result = validator().validate_inputs(&inputs(&[("frequency", "12".into())]), &[field.clone()]);
        assert!(result.is_valid);

        let result = validator().validate_inputs(&inputs(&[("frequency", 12.0.into())]), &[field.clone()]);
        assert!(result.is_valid);

        let result = validator().validate_inputs(&inputs(&[("frequency", "monthly".into())]), &[field]);
        assert!(!result.is_valid);
        assert_eq!(result.errors_for("frequency"), ["Frequency must be one of: 1, 12"]);
    }

    #[test]
    fn test_select_case_sensitive() {
        let field = VariableDefinition::new("plan", "Plan", VariableType::Select).with_options(&[("Basic", "Basic")]);
        let result = validator().validate_inputs(&inputs(&[("plan", "basic".into())]), &[field]);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_select_without_options() {
        let field = VariableDefinition::new("plan", "Plan", VariableType::Select);
        let result = validator().validate_inputs(&inputs(&[("plan", "a".into())]), &[field]);
        assert_eq!(result.errors_for("plan"), ["Plan has no available options"]);
    }

    #[test]
    fn test_multiple_fields_collected() {
        let vars = [
            number_field(),
            VariableDefinition::new("height", "Height", VariableType::Number).with_range(100.0, 250.0),
        ];
        let result = validator().validate_inputs(&inputs(&[("weight", 70.0.into())]), &vars);
        assert!(!result.is_valid);
        assert!(result.errors_for("weight").is_empty());
        assert_eq!(result.errors_for("height"), ["Height is required"]);
    }
}
