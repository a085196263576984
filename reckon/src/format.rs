//! Result formatting by result type
//!
//! Currency follows locale conventions for symbol placement, digit grouping
//! and decimal separator. Locales without a table entry fall back to en-US.

use crate::schema::ResultType;
use reckon_core::{display_number, EvalError};
use serde::{Deserialize, Serialize};
use std::fmt;

const NBSP: &str = "\u{a0}";
const NARROW_NBSP: &str = "\u{202f}";

/// Most decimal places any output is rendered with
pub const MAX_PRECISION: u32 = 15;

/// Formatted value of one formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormulaOutput {
    Number(f64),
    Text(String),
}

impl FormulaOutput {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaOutput::Number(n) => Some(*n),
            FormulaOutput::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormulaOutput::Text(s) => Some(s),
            FormulaOutput::Number(_) => None,
        }
    }
}

impl fmt::Display for FormulaOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaOutput::Number(n) => write!(f, "{}", display_number(*n)),
            FormulaOutput::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Round half away from zero to `digits` places and render with exactly that many.
/// `digits` is capped at [`MAX_PRECISION`].
pub fn to_fixed(value: f64, digits: u32) -> String {
    let digits = digits.min(MAX_PRECISION);
    let factor = 10f64.powi(digits as i32);
    let scaled = value * factor;
    // Too large to scale: there is no fraction left to round
    if !scaled.is_finite() {
        return format!("{:.*}", digits as usize, value);
    }
    let rounded = scaled.round() / factor;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.*}", digits as usize, rounded)
}

/// Locale conventions for rendering money
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyFormat {
    pub locale: String,
    pub currency: String,
    pub symbol: String,
    pub symbol_after: bool,
    pub group_separator: &'static str,
    pub decimal_separator: &'static str,
    pub minor_digits: u32,
}

impl CurrencyFormat {
    pub fn resolve(locale: &str, currency: &str) -> Self {
        let currency = currency.to_ascii_uppercase();
        let (locale, symbol_after, group, decimal) = match locale {
            "en-GB" => ("en-GB", false, ",", "."),
            "de-DE" => ("de-DE", true, ".", ","),
            "fr-FR" => ("fr-FR", true, NARROW_NBSP, ","),
            "ja-JP" => ("ja-JP", false, ",", "."),
            _ => ("en-US", false, ",", "."),
        };
        let symbol = match (currency.as_str(), locale) {
            ("USD", "en-US") => "$".to_string(),
            ("USD", "en-GB") | ("USD", "ja-JP") => "US$".to_string(),
            ("USD", _) => "$".to_string(),
            ("EUR", _) => "€".to_string(),
            ("GBP", _) => "£".to_string(),
            ("JPY", "ja-JP") => "￥".to_string(),
            ("JPY", _) => "¥".to_string(),
            (code, _) => code.to_string(),
        };
        let minor_digits = match currency.as_str() {
            "JPY" | "KRW" => 0,
            _ => 2,
        };
        Self {
            locale: locale.to_string(),
            currency,
            symbol,
            symbol_after,
            group_separator: group,
            decimal_separator: decimal,
            minor_digits,
        }
    }

    /// Render an amount; `digits` overrides the currency's minor digits
    pub fn format(&self, amount: f64, digits: Option<u32>) -> String {
        let digits = digits.unwrap_or(self.minor_digits);
        let fixed = to_fixed(amount.abs(), digits);
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut number = group_digits(int_part, self.group_separator);
        if let Some(frac) = frac_part {
            number.push_str(self.decimal_separator);
            number.push_str(frac);
        }

        let negative = amount < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
        let sign = if negative { "-" } else { "" };
        // Alphabetic codes are spaced from the number; symbols are not
        let spacer = if self.symbol.chars().all(|c| c.is_ascii_alphabetic()) { NBSP } else { "" };

        if self.symbol_after {
            format!("{}{}{}{}", sign, number, NBSP, self.symbol)
        } else {
            format!("{}{}{}{}", sign, self.symbol, spacer, number)
        }
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Applies a result type to a raw number
#[derive(Debug, Clone)]
pub struct ResultFormatter {
    currency: CurrencyFormat,
    default_precision: u32,
}

impl ResultFormatter {
    pub fn new(locale: &str, currency: &str) -> Self {
        Self {
            currency: CurrencyFormat::resolve(locale, currency),
            default_precision: 2,
        }
    }

    pub fn with_default_precision(mut self, precision: u32) -> Self {
        self.default_precision = precision;
        self
    }

    pub fn currency_format(&self) -> &CurrencyFormat {
        &self.currency
    }

    /// Format `value` for `result_type`. `precision` applies to decimal,
    /// percentage and currency output and is capped at [`MAX_PRECISION`].
    ///
    /// Fails with `NonFinite` rather than rendering `inf` or `NaN`.
    pub fn format(&self, value: f64, result_type: ResultType, precision: Option<u32>) -> Result<FormulaOutput, EvalError> {
        if !value.is_finite() {
            return Err(EvalError::NonFinite);
        }
        let digits = precision.unwrap_or(self.default_precision).min(MAX_PRECISION);
        let out = match result_type {
            ResultType::Currency => FormulaOutput::Text(self.currency.format(value, precision.map(|p| p.min(MAX_PRECISION)))),
            ResultType::Percentage => {
                let percent = value * 100.0;
                if !percent.is_finite() {
                    return Err(EvalError::NonFinite);
                }
                FormulaOutput::Text(format!("{}%", to_fixed(percent, digits)))
            }
            ResultType::Decimal => FormulaOutput::Text(to_fixed(value, digits)),
            ResultType::Integer => FormulaOutput::Number(value.round()),
            ResultType::Number | ResultType::Text => FormulaOutput::Number(value),
        };
        Ok(out)
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new("en-US", "USD")
    }
}
