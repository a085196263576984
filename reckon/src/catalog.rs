//! Built-in calculators

use crate::schema::{CalculatorConfig, FormulaDefinition, ResultType, VariableDefinition, VariableType};

const MONTHLY_PAYMENT: &str =
    "loanAmount * (rate/100/12 * (1 + rate/100/12)^(term*12)) / ((1 + rate/100/12)^(term*12) - 1)";

/// Every calculator shipped with the engine, in catalog order
pub fn builtin_calculators() -> Vec<CalculatorConfig> {
    vec![compound_interest(), loan(), mortgage(), bmi()]
}

pub fn bmi() -> CalculatorConfig {
    CalculatorConfig::new("bmi", "BMI Calculator", "health")
        .with_description("Calculate your Body Mass Index and health category")
        .featured()
        .with_tags(&["bmi", "weight", "health", "fitness"])
        .with_keywords(&["bmi calculator", "body mass index calculator", "ideal weight calculator"])
        .with_variable(
            VariableDefinition::new("weight", "Weight", VariableType::Number)
                .with_unit("kg")
                .with_default(70)
                .with_range(20.0, 300.0)
                .with_description("Your weight in kilograms"),
        )
        .with_variable(
            VariableDefinition::new("height", "Height", VariableType::Number)
                .with_unit("cm")
                .with_default(175)
                .with_range(100.0, 250.0)
                .with_description("Your height in centimeters"),
        )
        .with_formula(
            FormulaDefinition::new("bmi", "weight / ((height/100)^2)", ResultType::Decimal)
                .with_label("BMI")
                .with_description("Your Body Mass Index"),
        )
        .with_formula(
            FormulaDefinition::new("idealWeightMin", "18.5 * (height/100)^2", ResultType::Decimal)
                .with_label("Healthy Weight Range (Min)")
                .with_precision(1),
        )
        .with_formula(
            FormulaDefinition::new("idealWeightMax", "24.9 * (height/100)^2", ResultType::Decimal)
                .with_label("Healthy Weight Range (Max)")
                .with_precision(1),
        )
}

pub fn compound_interest() -> CalculatorConfig {
    CalculatorConfig::new("compound-interest", "Compound Interest Calculator", "finance")
        .with_description("Calculate the future value of your investments with compound interest")
        .featured()
        .trending()
        .with_steps()
        .with_tags(&["investment", "savings", "retirement", "interest"])
        .with_keywords(&["compound interest calculator", "investment calculator", "savings calculator"])
        .with_variable(
            VariableDefinition::new("principal", "Initial Principal", VariableType::Currency)
                .with_default(10000)
                .with_range(1.0, 10_000_000.0)
                .with_description("The initial amount of money invested"),
        )
        .with_variable(
            VariableDefinition::new("rate", "Annual Interest Rate", VariableType::Percentage)
                .with_default(7)
                .with_range(0.01, 50.0)
                .with_description("The annual interest rate (as a percentage)"),
        )
        .with_variable(
            VariableDefinition::new("time", "Time Period", VariableType::Number)
                .with_unit("years")
                .with_default(10)
                .with_range(1.0, 100.0)
                .with_description("The number of years the money is invested"),
        )
        .with_variable(
            VariableDefinition::new("frequency", "Compounding Frequency", VariableType::Select)
                .with_default("12")
                .with_options(&[
                    ("1", "Annually"),
                    ("2", "Semi-annually"),
                    ("4", "Quarterly"),
                    ("12", "Monthly"),
                    ("365", "Daily"),
                ])
                .with_description("How often the interest is compounded"),
        )
        .with_formula(
            FormulaDefinition::new(
                "futureValue",
                "principal * (1 + (rate/100)/frequency)^(frequency * time)",
                ResultType::Currency,
            )
            .with_label("Future Value")
            .with_description("The total amount after compound interest"),
        )
        .with_formula(
            FormulaDefinition::new("totalInterest", "futureValue - principal", ResultType::Currency)
                .with_label("Total Interest Earned")
                .with_description("The total interest earned over the investment period"),
        )
}

pub fn loan() -> CalculatorConfig {
    CalculatorConfig::new("loan", "Loan Payment Calculator", "finance")
        .with_description("Calculate monthly payments and total interest for loans")
        .featured()
        .with_steps()
        .with_tags(&["auto loan", "personal loan", "debt", "interest"])
        .with_keywords(&["loan payment calculator", "monthly payment calculator", "loan interest calculator"])
        .with_variable(
            VariableDefinition::new("amount", "Loan Amount", VariableType::Currency)
                .with_default(200000)
                .with_range(1000.0, 10_000_000.0)
                .with_description("The total amount of the loan"),
        )
        .with_variable(
            VariableDefinition::new("rate", "Annual Interest Rate", VariableType::Percentage)
                .with_default(3.5)
                .with_range(0.1, 30.0)
                .with_description("The annual interest rate of the loan"),
        )
        .with_variable(
            VariableDefinition::new("term", "Loan Term", VariableType::Number)
                .with_unit("years")
                .with_default(30)
                .with_range(1.0, 50.0)
                .with_description("The length of the loan in years"),
        )
        .with_formula(
            FormulaDefinition::new(
                "monthlyPayment",
                "(amount * ((rate/100)/12) * (1 + (rate/100)/12)^(term*12)) / ((1 + (rate/100)/12)^(term*12) - 1)",
                ResultType::Currency,
            )
            .with_label("Monthly Payment")
            .with_description("The monthly payment amount"),
        )
        .with_formula(
            FormulaDefinition::new("totalPayment", "monthlyPayment * term * 12", ResultType::Currency)
                .with_label("Total Payment")
                .with_description("The total amount paid over the life of the loan"),
        )
        .with_formula(
            FormulaDefinition::new("totalInterest", "totalPayment - amount", ResultType::Currency)
                .with_label("Total Interest")
                .with_description("The total interest paid over the life of the loan"),
        )
}

pub fn mortgage() -> CalculatorConfig {
    CalculatorConfig::new("mortgage", "Mortgage Calculator", "finance")
        .with_description("Estimate monthly mortgage payments after a down payment")
        .trending()
        .with_steps()
        .with_tags(&["mortgage", "home", "real estate", "interest"])
        .with_keywords(&["mortgage calculator", "home loan calculator", "mortgage payment calculator"])
        .with_variable(
            VariableDefinition::new("principal", "Home Price", VariableType::Currency)
                .with_default(400000)
                .with_min(1000.0)
                .with_description("Purchase price of the home"),
        )
        .with_variable(
            VariableDefinition::new("downPayment", "Down Payment", VariableType::Currency)
                .optional()
                .with_default(0)
                .with_min(0.0)
                .with_description("Cash paid up front"),
        )
        .with_variable(
            VariableDefinition::new("rate", "Annual Interest Rate", VariableType::Percentage)
                .with_default(6.5)
                .with_range(0.01, 30.0),
        )
        .with_variable(
            VariableDefinition::new("term", "Loan Term", VariableType::Number)
                .with_unit("years")
                .with_default(30)
                .with_range(1.0, 50.0),
        )
        .with_formula(
            FormulaDefinition::new("loanAmount", "principal - downPayment", ResultType::Currency)
                .with_label("Loan Amount"),
        )
        .with_formula(
            FormulaDefinition::new("monthlyPayment", MONTHLY_PAYMENT, ResultType::Currency)
                .with_label("Monthly Payment")
                .with_description("Required monthly payment (principal + interest)"),
        )
        .with_formula(
            FormulaDefinition::new("totalPaid", "monthlyPayment * term * 12", ResultType::Currency)
                .with_label("Total Paid"),
        )
        .with_formula(
            FormulaDefinition::new("totalInterest", "totalPaid - loanAmount", ResultType::Currency)
                .with_label("Total Interest"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_config;

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let registry = reckon_std::standard_registry();
        for config in builtin_calculators() {
            let issues = check_config(&config, &registry);
            assert!(issues.is_empty(), "{}: {:?}", config.id, issues);
        }
    }

    #[test]
    fn test_builtin_ids() {
        let ids: Vec<String> = builtin_calculators().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["compound-interest", "loan", "mortgage", "bmi"]);
    }
}
