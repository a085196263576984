//! The `convert` formula function

use reckon_plugin::prelude::*;
use reckon_plugin::{number_arg, text_arg};
use crate::UnitConverter;

pub struct Convert;

static CONVERT_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("value", "Number", "Value to convert"),
    ArgMeta::required("from_unit", "Text", "Source unit name or symbol (e.g., \"km\")"),
    ArgMeta::required("to_unit", "Text", "Target unit name or symbol (e.g., \"mile\")"),
];

static CONVERT_EXAMPLES: [&str; 3] = [
    "convert(100, \"km\", \"mi\") → 62.137",
    "convert(32, \"fahrenheit\", \"celsius\") → 0",
    "convert(weight, \"lb\", \"kg\")",
];

static CONVERT_RELATED: [&str; 0] = [];

impl FunctionPlugin for Convert {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "convert",
            description: "Convert a value from one unit to another of the same category",
            usage: "convert(value, from_unit, to_unit)",
            args: &CONVERT_ARGS,
            returns: "Number",
            examples: &CONVERT_EXAMPLES,
            category: "units",
            related: &CONVERT_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
        if args.len() != 3 {
            return Err(EvalError::arg_count("convert", 3, args.len()));
        }
        let value = number_arg("convert", "value", &args[0])?;
        let from = text_arg("convert", "from_unit", &args[1])?;
        let to = text_arg("convert", "to_unit", &args[2])?;

        UnitConverter::new()
            .convert_checked(value, from, to)
            .map(Value::Number)
            .map_err(|e| EvalError::domain(e.to_string()))
    }
}
