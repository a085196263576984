//! Reckon Standard Library

pub mod functions;
pub mod constants;

use reckon_plugin::PluginRegistry;

/// Load standard library into registry
pub fn load_standard_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        .with_function(functions::Sqrt)
        .with_function(functions::Ln)
        .with_function(functions::Log10)
        .with_function(functions::Exp)
        .with_function(functions::Pow)
        .with_function(functions::Abs)
        .with_function(functions::Round)
        .with_function(functions::Floor)
        .with_function(functions::Ceil)
        .with_function(functions::Sum)
        .with_function(functions::Avg)
        .with_function(functions::Min)
        .with_function(functions::Max)
        .with_constant(constants::pi())
        .with_constant(constants::e())
}

/// Create registry with standard library
pub fn standard_registry() -> PluginRegistry {
    load_standard_library(PluginRegistry::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reckon_core::{codes, EvalError, Value};
    use reckon_plugin::{EvalContext, Scope};

    fn call(name: &str, args: &[f64]) -> Result<Value, EvalError> {
        let reg = standard_registry();
        let scope = Scope::new();
        let ctx = EvalContext::new(&reg, &scope);
        let args: Vec<Value> = args.iter().map(|n| Value::Number(*n)).collect();
        reg.call_function(name, &args, &ctx)
    }

    fn num(name: &str, args: &[f64]) -> f64 {
        call(name, args).unwrap().as_number().unwrap()
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(num("sqrt", &[16.0]), 4.0);
        let err = call("sqrt", &[-1.0]).unwrap_err();
        assert_eq!(err.code(), codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_pow_fractional() {
        assert_eq!(num("pow", &[2.0, 10.0]), 1024.0);
        assert!((num("pow", &[9.0, 0.5]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_digits() {
        assert_eq!(num("round", &[2.5]), 3.0);
        assert_eq!(num("round", &[-2.5]), -3.0);
        assert_eq!(num("round", &[22.857, 2.0]), 22.86);
        assert_eq!(call("round", &[1.0, 0.5]).unwrap_err().code(), codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_round_huge_value_is_unchanged() {
        assert_eq!(num("round", &[1e300, 15.0]), 1e300);
        assert_eq!(num("round", &[-1e300, 15.0]), -1e300);
        assert_eq!(num("round", &[1e300]), 1e300);
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(num("sum", &[1.0, 2.0, 3.0]), 6.0);
        assert_eq!(num("avg", &[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(num("min", &[3.0, -1.0, 2.0]), -1.0);
        assert_eq!(num("max", &[3.0, -1.0, 2.0]), 3.0);
        assert_eq!(call("max", &[]).unwrap_err().code(), codes::ARG_COUNT);
    }

    #[test]
    fn test_logs() {
        assert_eq!(num("log10", &[1000.0]), 3.0);
        assert_eq!(num("ln", &[1.0]), 0.0);
        assert_eq!(call("ln", &[0.0]).unwrap_err().code(), codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_arity() {
        let err = call("pow", &[2.0]).unwrap_err();
        assert_eq!(err, EvalError::arg_count("pow", 2, 1));
    }

    #[test]
    fn test_constants_registered() {
        let reg = standard_registry();
        assert_eq!(reg.constant("PI"), Some(std::f64::consts::PI));
        assert_eq!(reg.constant("e"), Some(std::f64::consts::E));
        assert!(reg.is_function("Sqrt"));
    }
}
