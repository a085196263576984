//! Unit representation with conversion factors

use serde::Serialize;
use thiserror::Error;

/// A unit within a category, converted linearly through the category's base unit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDef {
    /// The unit name (e.g., "meter", "pound")
    pub name: &'static str,
    /// The unit symbol (e.g., "m", "lb")
    pub symbol: &'static str,
    /// value_base = value * to_base. Ignored for temperature.
    pub to_base: f64,
    /// Category key (e.g., "length")
    pub category: &'static str,
}

impl UnitDef {
    pub const fn new(name: &'static str, symbol: &'static str, to_base: f64, category: &'static str) -> Self {
        Self { name, symbol, to_base, category }
    }

    /// Matches by exact name or exact symbol
    pub fn matches(&self, unit: &str) -> bool {
        self.name == unit || self.symbol == unit
    }
}

/// A named group of mutually convertible units
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCategory {
    pub key: &'static str,
    pub name: &'static str,
    pub base_unit: &'static str,
    pub units: Vec<UnitDef>,
}

/// Why a conversion could not be performed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    #[error("cannot convert {from} ({from_category}) to {to} ({to_category}): different categories")]
    IncompatibleCategories {
        from: String,
        to: String,
        from_category: String,
        to_category: String,
    },
}
