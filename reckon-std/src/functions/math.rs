//! Core math functions

use reckon_plugin::prelude::*;
use reckon_plugin::number_arg;

pub struct Sqrt;
pub struct Ln;
pub struct Log10;
pub struct Exp;
pub struct Pow;
pub struct Abs;
pub struct Round;
pub struct Floor;
pub struct Ceil;

static SQRT_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value (must be non-negative)")];
static SQRT_EXAMPLES: [&str; 2] = ["sqrt(2)", "sqrt(area)"];
static SQRT_RELATED: [&str; 2] = ["pow", "exp"];

static LN_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value (must be positive)")];
static LN_EXAMPLES: [&str; 2] = ["ln(e)", "ln(2)"];
static LN_RELATED: [&str; 2] = ["exp", "log10"];

static LOG10_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value (must be positive)")];
static LOG10_EXAMPLES: [&str; 2] = ["log10(1000)", "log10(2)"];
static LOG10_RELATED: [&str; 1] = ["ln"];

static EXP_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Exponent")];
static EXP_EXAMPLES: [&str; 2] = ["exp(1)", "exp(rate * years)"];
static EXP_RELATED: [&str; 2] = ["ln", "pow"];

static POW_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("base", "Number", "Base value"),
    ArgMeta::required("exponent", "Number", "Exponent, may be fractional or negative"),
];
static POW_EXAMPLES: [&str; 2] = ["pow(2, 10)", "pow(1 + rate / 12, months)"];
static POW_RELATED: [&str; 2] = ["sqrt", "exp"];

static ABS_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value")];
static ABS_EXAMPLES: [&str; 2] = ["abs(-5)", "abs(3.14)"];
static ABS_RELATED: [&str; 0] = [];

static ROUND_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("x", "Number", "Value to round"),
    ArgMeta::optional("digits", "Number", "Decimal places to keep", "0"),
];
static ROUND_EXAMPLES: [&str; 3] = ["round(3.5)", "round(3.4)", "round(22.857, 1)"];
static ROUND_RELATED: [&str; 2] = ["floor", "ceil"];

static FLOOR_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value to floor")];
static FLOOR_EXAMPLES: [&str; 2] = ["floor(3.7)", "floor(-2.3)"];
static FLOOR_RELATED: [&str; 2] = ["ceil", "round"];

static CEIL_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value to ceil")];
static CEIL_EXAMPLES: [&str; 2] = ["ceil(3.2)", "ceil(-2.7)"];
static CEIL_RELATED: [&str; 2] = ["floor", "round"];

/// Single numeric argument, arity checked
fn one_number(func: &str, args: &[Value]) -> Result<f64, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arg_count(func, 1, args.len()));
    }
    number_arg(func, "x", &args[0])
}

impl FunctionPlugin for Sqrt {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "sqrt",
            description: "Square root",
            usage: "sqrt(x)",
            args: &SQRT_ARGS,
            returns: "Number",
            examples: &SQRT_EXAMPLES,
            category: "math",
            related: &SQRT_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        let x = one_number("sqrt", args)?;
        if x < 0.0 {
            return Err(EvalError::domain(format!("sqrt of negative number {}", x)));
        }
        Ok(Value::Number(x.sqrt()))
    }
}

impl FunctionPlugin for Ln {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "ln",
            description: "Natural logarithm",
            usage: "ln(x)",
            args: &LN_ARGS,
            returns: "Number",
            examples: &LN_EXAMPLES,
            category: "math",
            related: &LN_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        let x = one_number("ln", args)?;
        if x <= 0.0 {
            return Err(EvalError::domain(format!("ln of non-positive number {}", x)));
        }
        Ok(Value::Number(x.ln()))
    }
}

impl FunctionPlugin for Log10 {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "log10",
            description: "Base-10 logarithm",
            usage: "log10(x)",
            args: &LOG10_ARGS,
            returns: "Number",
            examples: &LOG10_EXAMPLES,
            category: "math",
            related: &LOG10_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        let x = one_number("log10", args)?;
        if x <= 0.0 {
            return Err(EvalError::domain(format!("log10 of non-positive number {}", x)));
        }
        Ok(Value::Number(x.log10()))
    }
}

impl FunctionPlugin for Exp {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "exp",
            description: "Exponential function (e^x)",
            usage: "exp(x)",
            args: &EXP_ARGS,
            returns: "Number",
            examples: &EXP_EXAMPLES,
            category: "math",
            related: &EXP_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        Ok(Value::Number(one_number("exp", args)?.exp()))
    }
}

impl FunctionPlugin for Pow {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "pow",
            description: "Raise to power",
            usage: "pow(base, exponent)",
            args: &POW_ARGS,
            returns: "Number",
            examples: &POW_EXAMPLES,
            category: "math",
            related: &POW_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        if args.len() != 2 {
            return Err(EvalError::arg_count("pow", 2, args.len()));
        }
        let base = number_arg("pow", "base", &args[0])?;
        let exp = number_arg("pow", "exponent", &args[1])?;
        Ok(Value::Number(base.powf(exp)))
    }
}

impl FunctionPlugin for Abs {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "abs",
            description: "Absolute value",
            usage: "abs(x)",
            args: &ABS_ARGS,
            returns: "Number",
            examples: &ABS_EXAMPLES,
            category: "math",
            related: &ABS_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        Ok(Value::Number(one_number("abs", args)?.abs()))
    }
}

impl FunctionPlugin for Round {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "round",
            description: "Round half away from zero, optionally to a number of decimal places",
            usage: "round(x, digits?)",
            args: &ROUND_ARGS,
            returns: "Number",
            examples: &ROUND_EXAMPLES,
            category: "math",
            related: &ROUND_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        if args.is_empty() || args.len() > 2 {
            return Err(EvalError::arg_count("round", "1 or 2", args.len()));
        }
        let x = number_arg("round", "x", &args[0])?;
        let digits = match args.get(1) {
            Some(d) => number_arg("round", "digits", d)?,
            None => 0.0,
        };
        if digits.fract() != 0.0 || !(0.0..=15.0).contains(&digits) {
            return Err(EvalError::domain(format!("round digits must be an integer in 0..=15, got {}", digits)));
        }
        let factor = 10f64.powi(digits as i32);
        let scaled = x * factor;
        // Past this size an f64 has no fractional digits to round away
        if !scaled.is_finite() {
            return Ok(Value::Number(x));
        }
        Ok(Value::Number(scaled.round() / factor))
    }
}

impl FunctionPlugin for Floor {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "floor",
            description: "Largest integer less than or equal to x",
            usage: "floor(x)",
            args: &FLOOR_ARGS,
            returns: "Number",
            examples: &FLOOR_EXAMPLES,
            category: "math",
            related: &FLOOR_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        Ok(Value::Number(one_number("floor", args)?.floor()))
    }
}

impl FunctionPlugin for Ceil {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "ceil",
            description: "Smallest integer greater than or equal to x",
            usage: "ceil(x)",
            args: &CEIL_ARGS,
            returns: "Number",
            examples: &CEIL_EXAMPLES,
            category: "math",
            related: &CEIL_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        Ok(Value::Number(one_number("ceil", args)?.ceil()))
    }
}
