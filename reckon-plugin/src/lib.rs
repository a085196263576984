//! Reckon Plugin System
//!
//! Provides the trait for extending formulas with custom functions and the
//! registry that holds functions and named constants.

mod traits;
mod registry;
mod context;

pub use traits::{FunctionPlugin, FunctionMeta, ArgMeta};
pub use registry::{PluginRegistry, ConstantDef};
pub use context::{EvalContext, Scope};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        FunctionPlugin, FunctionMeta, ArgMeta,
        PluginRegistry, ConstantDef, EvalContext, Scope,
    };
    pub use reckon_core::prelude::*;
}

/// Extract a numeric argument or fail with `ArgType`.
pub fn number_arg(func: &str, arg: &str, value: &reckon_core::Value) -> Result<f64, reckon_core::EvalError> {
    value
        .as_number()
        .ok_or_else(|| reckon_core::EvalError::arg_type(func, arg, "Number", value.type_name()))
}

/// Extract a text argument or fail with `ArgType`.
pub fn text_arg<'v>(func: &str, arg: &str, value: &'v reckon_core::Value) -> Result<&'v str, reckon_core::EvalError> {
    value
        .as_text()
        .ok_or_else(|| reckon_core::EvalError::arg_type(func, arg, "Text", value.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reckon_core::{EvalError, Value};

    struct Double;

    static DOUBLE_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value to double")];

    impl FunctionPlugin for Double {
        fn meta(&self) -> FunctionMeta {
            FunctionMeta {
                name: "double",
                description: "Multiply by two",
                usage: "double(x)",
                args: &DOUBLE_ARGS,
                returns: "Number",
                examples: &["double(4)"],
                category: "test",
                related: &[],
            }
        }

        fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, EvalError> {
            if args.len() != 1 {
                return Err(EvalError::arg_count("double", 1, args.len()));
            }
            Ok(Value::Number(number_arg("double", "x", &args[0])? * 2.0))
        }
    }

    fn registry() -> PluginRegistry {
        PluginRegistry::new()
            .with_function(Double)
            .with_constant(ConstantDef::new("pi", std::f64::consts::PI, "math", "Ratio of circumference to diameter"))
    }

    #[test]
    fn test_call_registered_function() {
        let reg = registry();
        let scope = Scope::new();
        let ctx = EvalContext::new(&reg, &scope);
        let out = reg.call_function("DOUBLE", &[Value::Number(4.0)], &ctx).unwrap();
        assert_eq!(out, Value::Number(8.0));
    }

    #[test]
    fn test_unknown_function_lists_similar() {
        let reg = registry();
        let scope = Scope::new();
        let ctx = EvalContext::new(&reg, &scope);
        let err = reg.call_function("doubel", &[], &ctx).unwrap_err();
        match err {
            EvalError::UnknownFunction { name, similar } => {
                assert_eq!(name, "doubel");
                assert_eq!(similar, vec!["double".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_arg_type_error() {
        let reg = registry();
        let scope = Scope::new();
        let ctx = EvalContext::new(&reg, &scope);
        let err = reg.call_function("double", &[Value::from("x")], &ctx).unwrap_err();
        assert_eq!(err.code(), reckon_core::codes::ARG_TYPE);
    }

    #[test]
    fn test_scope_shadows_constant() {
        let reg = registry();
        let mut scope = Scope::new();
        assert!((EvalContext::new(&reg, &scope).get_var("pi").unwrap() - std::f64::consts::PI).abs() < 1e-12);
        scope.insert("pi".to_string(), 3.0);
        assert_eq!(EvalContext::new(&reg, &scope).get_var("pi").unwrap(), 3.0);
    }

    #[test]
    fn test_missing_variable() {
        let reg = registry();
        let scope = Scope::new();
        let err = EvalContext::new(&reg, &scope).get_var("height").unwrap_err();
        assert_eq!(err, EvalError::undefined_var("height"));
    }

    #[test]
    fn test_help_for_function_and_constant() {
        let reg = registry();
        let help = reg.help(Some("double")).unwrap();
        assert_eq!(help["type"], "function");
        assert_eq!(help["usage"], "double(x)");
        let help = reg.help(Some("pi")).unwrap();
        assert_eq!(help["type"], "constant");
        assert!(reg.help(Some("nope")).is_none());
        let general = reg.help(None).unwrap();
        assert_eq!(general["functions"]["test"][0], "double");
    }

    #[test]
    fn test_list_functions_by_category() {
        let reg = registry();
        assert_eq!(reg.list_functions(Some("test")).len(), 1);
        assert!(reg.list_functions(Some("finance")).is_empty());
        assert_eq!(reg.list_functions(None).len(), 1);
    }
}
