//! Category-aware unit conversion

use crate::units::UNIT_CATEGORIES;
use crate::{ConversionError, UnitCategory, UnitDef};

const TEMPERATURE: &str = "temperature";

/// Stateless converter over the static unit table
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitConverter;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scale {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl Scale {
    fn of(unit: &UnitDef) -> Scale {
        match unit.name {
            "fahrenheit" => Scale::Fahrenheit,
            "kelvin" => Scale::Kelvin,
            _ => Scale::Celsius,
        }
    }

    fn to_celsius(self, value: f64) -> f64 {
        match self {
            Scale::Celsius => value,
            Scale::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Scale::Kelvin => value - 273.15,
        }
    }

    fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            Scale::Celsius => celsius,
            Scale::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            Scale::Kelvin => celsius + 273.15,
        }
    }
}

impl UnitConverter {
    pub fn new() -> Self {
        UnitConverter
    }

    /// Convert between two units of the same category.
    /// `None` when either unit is unknown or the categories differ.
    pub fn convert(&self, value: f64, from_unit: &str, to_unit: &str) -> Option<f64> {
        self.convert_checked(value, from_unit, to_unit).ok()
    }

    /// Like [`convert`](Self::convert), but says why a conversion failed.
    pub fn convert_checked(&self, value: f64, from_unit: &str, to_unit: &str) -> Result<f64, ConversionError> {
        let from = self
            .find_unit(from_unit)
            .ok_or_else(|| ConversionError::UnknownUnit(from_unit.to_string()))?;
        let to = self
            .find_unit(to_unit)
            .ok_or_else(|| ConversionError::UnknownUnit(to_unit.to_string()))?;

        if from.category != to.category {
            return Err(ConversionError::IncompatibleCategories {
                from: from_unit.to_string(),
                to: to_unit.to_string(),
                from_category: from.category.to_string(),
                to_category: to.category.to_string(),
            });
        }

        if from.category == TEMPERATURE {
            return Ok(Scale::of(to).from_celsius(Scale::of(from).to_celsius(value)));
        }

        Ok(value * from.to_base / to.to_base)
    }

    /// Units of a category in declaration order; empty for an unknown category
    pub fn units_for_category(&self, category: &str) -> &'static [UnitDef] {
        UNIT_CATEGORIES
            .iter()
            .find(|c| c.key == category)
            .map(|c| c.units.as_slice())
            .unwrap_or(&[])
    }

    /// Look a unit up by name or symbol across all categories
    pub fn find_unit(&self, unit: &str) -> Option<&'static UnitDef> {
        UNIT_CATEGORIES
            .iter()
            .flat_map(|c| c.units.iter())
            .find(|u| u.matches(unit))
    }

    pub fn categories(&self) -> &'static [UnitCategory] {
        UNIT_CATEGORIES.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_temperature_fixed_points() {
        let c = UnitConverter::new();
        assert!(close(c.convert(0.0, "celsius", "fahrenheit").unwrap(), 32.0));
        assert!(close(c.convert(100.0, "celsius", "fahrenheit").unwrap(), 212.0));
        assert!(close(c.convert(0.0, "celsius", "kelvin").unwrap(), 273.15));
        assert!(close(c.convert(32.0, "°F", "°C").unwrap(), 0.0));
        assert!(close(c.convert(273.15, "K", "fahrenheit").unwrap(), 32.0));
    }

    #[test]
    fn test_linear_conversion() {
        let c = UnitConverter::new();
        assert!(close(c.convert(1.0, "mile", "km").unwrap(), 1.609344));
        assert!(close(c.convert(12.0, "in", "ft").unwrap(), 1.0));
        assert!(close(c.convert(1.0, "st", "lb").unwrap(), 6.35029 / 0.453592));
    }

    #[test]
    fn test_currency_uses_dollar_rates() {
        let c = UnitConverter::new();
        assert!(close(c.convert(1.0, "USD", "EUR").unwrap(), 0.85));
        assert!(close(c.convert(110.0, "¥", "$").unwrap(), 1.0));
    }

    #[test]
    fn test_cross_category_rejected() {
        let c = UnitConverter::new();
        assert_eq!(c.convert(5.0, "kg", "mile"), None);
        assert!(matches!(
            c.convert_checked(5.0, "kg", "mile"),
            Err(ConversionError::IncompatibleCategories { .. })
        ));
    }

    #[test]
    fn test_unknown_unit() {
        let c = UnitConverter::new();
        assert_eq!(c.convert(1.0, "parsec", "m"), None);
        assert_eq!(
            c.convert_checked(1.0, "m", "furlong"),
            Err(ConversionError::UnknownUnit("furlong".to_string()))
        );
    }

    #[test]
    fn test_units_for_category() {
        let c = UnitConverter::new();
        let names: Vec<&str> = c.units_for_category("weight").iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["gram", "kilogram", "pound", "ounce", "stone"]);
        assert!(c.units_for_category("volume").is_empty());
    }

    #[test]
    fn test_categories_order() {
        let keys: Vec<&str> = UnitConverter::new().categories().iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["length", "weight", "temperature", "currency"]);
    }

    proptest! {
        #[test]
        fn prop_linear_round_trip(x in -1.0e6f64..1.0e6) {
            let c = UnitConverter::new();
            for category in c.categories().iter().filter(|cat| cat.key != TEMPERATURE) {
                for a in &category.units {
                    for b in &category.units {
                        let there = c.convert(x, a.name, b.name).unwrap();
                        let back = c.convert(there, b.symbol, a.symbol).unwrap();
                        prop_assert!(close(back, x), "{} -> {} -> {}: {} != {}", a.name, b.name, a.name, back, x);
                    }
                }
            }
        }

        #[test]
        fn prop_temperature_round_trip(x in -500.0f64..5000.0) {
            let c = UnitConverter::new();
            for a in ["celsius", "fahrenheit", "kelvin"] {
                for b in ["celsius", "fahrenheit", "kelvin"] {
                    let back = c.convert(c.convert(x, a, b).unwrap(), b, a).unwrap();
                    prop_assert!((back - x).abs() < 1e-9 * x.abs().max(1.0) + 1e-9);
                }
            }
        }
    }
}
