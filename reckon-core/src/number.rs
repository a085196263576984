//! Numeric parsing for raw calculator input
//!
//! Form fields arrive as text. Only plain decimal notation is accepted:
//! an optional sign, digits with at most one decimal point, and an optional
//! exponent. `NaN`, `inf` and trailing garbage are rejected.

/// Parse a raw input string into a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if !s.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) {
        return None;
    }
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Render a number the way it appears in validation messages.
///
/// Integral values print without a fractional part (`100`, not `100.0`).
pub fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Ratios at or above this have no fractional bits left in an f64
const MAX_FRACTIONAL_RATIO: f64 = 4_503_599_627_370_496.0; // 2^52

/// True when `value` is an integer multiple of `step`, within float noise.
///
/// The tolerance is absolute for small ratios and a few ULPs of the ratio
/// for large ones, so it never approaches half a step.
pub fn is_multiple_of(value: f64, step: f64) -> bool {
    if step == 0.0 || !step.is_finite() {
        return true;
    }
    let ratio = value / step;
    if !ratio.is_finite() || ratio.abs() >= MAX_FRACTIONAL_RATIO {
        return true;
    }
    let tolerance = 1e-9_f64.max(ratio.abs() * f64::EPSILON * 8.0);
    (ratio - ratio.round()).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" -3.5 "), Some(-3.5));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("+7"), Some(7.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("1.2.3"), None);
    }

    #[test]
    fn test_display_number() {
        assert_eq!(display_number(100.0), "100");
        assert_eq!(display_number(0.01), "0.01");
        assert_eq!(display_number(-2.5), "-2.5");
    }

    #[test]
    fn test_multiple_of() {
        assert!(is_multiple_of(10.0, 5.0));
        assert!(is_multiple_of(0.3, 0.1));
        assert!(!is_multiple_of(7.0, 5.0));
        assert!(is_multiple_of(3.0, 0.0));
    }

    #[test]
    fn test_multiple_of_large_values() {
        assert!(!is_multiple_of(600_000_000.5, 1.0));
        assert!(!is_multiple_of(10_000_000.005, 0.01));
        assert!(is_multiple_of(10_000_000.01, 0.01));
        assert!(is_multiple_of(600_000_000.0, 1.0));
        assert!(is_multiple_of(1e300, 0.01));
    }
}
