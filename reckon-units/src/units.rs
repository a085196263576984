//! Unit definitions organized by category

use std::sync::LazyLock;
use crate::{UnitCategory, UnitDef};

/// Every known category, in display order
pub static UNIT_CATEGORIES: LazyLock<Vec<UnitCategory>> = LazyLock::new(|| {
    vec![length_units(), weight_units(), temperature_units(), currency_units()]
});

fn length_units() -> UnitCategory {
    UnitCategory {
        key: "length",
        name: "Length",
        base_unit: "meter",
        units: vec![
            UnitDef::new("millimeter", "mm", 0.001, "length"),
            UnitDef::new("centimeter", "cm", 0.01, "length"),
            UnitDef::new("meter", "m", 1.0, "length"),
            UnitDef::new("kilometer", "km", 1000.0, "length"),
            UnitDef::new("inch", "in", 0.0254, "length"),
            UnitDef::new("foot", "ft", 0.3048, "length"),
            UnitDef::new("yard", "yd", 0.9144, "length"),
            UnitDef::new("mile", "mi", 1609.344, "length"),
        ],
    }
}

fn weight_units() -> UnitCategory {
    UnitCategory {
        key: "weight",
        name: "Weight",
        base_unit: "kilogram",
        units: vec![
            UnitDef::new("gram", "g", 0.001, "weight"),
            UnitDef::new("kilogram", "kg", 1.0, "weight"),
            UnitDef::new("pound", "lb", 0.453592, "weight"),
            UnitDef::new("ounce", "oz", 0.0283495, "weight"),
            UnitDef::new("stone", "st", 6.35029, "weight"),
        ],
    }
}

// Factors are unused: temperature scales are affine and converted through Celsius.
fn temperature_units() -> UnitCategory {
    UnitCategory {
        key: "temperature",
        name: "Temperature",
        base_unit: "celsius",
        units: vec![
            UnitDef::new("celsius", "°C", 1.0, "temperature"),
            UnitDef::new("fahrenheit", "°F", 1.0, "temperature"),
            UnitDef::new("kelvin", "K", 1.0, "temperature"),
        ],
    }
}

// Static rates of 1 USD = 0.85 EUR = 0.73 GBP = 110 JPY. `to_base` is USD
// per unit (1 / rate), the inverse of the per-dollar quote.
fn currency_units() -> UnitCategory {
    UnitCategory {
        key: "currency",
        name: "Currency",
        base_unit: "USD",
        units: vec![
            UnitDef::new("USD", "$", 1.0, "currency"),
            UnitDef::new("EUR", "€", 1.0 / 0.85, "currency"),
            UnitDef::new("GBP", "£", 1.0 / 0.73, "currency"),
            UnitDef::new("JPY", "¥", 1.0 / 110.0, "currency"),
        ],
    }
}
