//! Aggregate functions

use reckon_plugin::prelude::*;
use reckon_plugin::number_arg;

pub struct Sum;
pub struct Avg;
pub struct Min;
pub struct Max;

static VALUES_ARGS: [ArgMeta; 1] = [ArgMeta::required("values", "Number...", "One or more values")];

static SUM_EXAMPLES: [&str; 1] = ["sum(1, 2, 3)"];
static AVG_EXAMPLES: [&str; 1] = ["avg(q1, q2, q3, q4)"];
static MIN_EXAMPLES: [&str; 2] = ["min(3, 1, 2)", "min(payment, balance)"];
static MAX_EXAMPLES: [&str; 2] = ["max(3, 1, 2)", "max(0, income - expenses)"];

static AGGREGATE_RELATED: [&str; 4] = ["sum", "avg", "min", "max"];

fn numbers(func: &str, args: &[Value]) -> Result<Vec<f64>, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arg_count(func, "at least 1", 0));
    }
    args.iter().map(|a| number_arg(func, "values", a)).collect()
}

impl FunctionPlugin for Sum {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "sum",
            description: "Sum of values",
            usage: "sum(a, b, ...)",
            args: &VALUES_ARGS,
            returns: "Number",
            examples: &SUM_EXAMPLES,
            category: "aggregate",
            related: &AGGREGATE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        Ok(Value::Number(numbers("sum", args)?.iter().sum()))
    }
}

impl FunctionPlugin for Avg {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "avg",
            description: "Arithmetic mean of values",
            usage: "avg(a, b, ...)",
            args: &VALUES_ARGS,
            returns: "Number",
            examples: &AVG_EXAMPLES,
            category: "aggregate",
            related: &AGGREGATE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        let values = numbers("avg", args)?;
        Ok(Value::Number(values.iter().sum::<f64>() / values.len() as f64))
    }
}

impl FunctionPlugin for Min {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "min",
            description: "Smallest of the values",
            usage: "min(a, b, ...)",
            args: &VALUES_ARGS,
            returns: "Number",
            examples: &MIN_EXAMPLES,
            category: "aggregate",
            related: &AGGREGATE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        Ok(Value::Number(numbers("min", args)?.into_iter().fold(f64::INFINITY, f64::min)))
    }
}

impl FunctionPlugin for Max {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "max",
            description: "Largest of the values",
            usage: "max(a, b, ...)",
            args: &VALUES_ARGS,
            returns: "Number",
            examples: &MAX_EXAMPLES,
            category: "aggregate",
            related: &AGGREGATE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        Ok(Value::Number(numbers("max", args)?.into_iter().fold(f64::NEG_INFINITY, f64::max)))
    }
}
