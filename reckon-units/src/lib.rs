//! Reckon Units - Unit conversion
//!
//! Categories:
//! - Length (mm, cm, m, km, in, ft, yd, mi), base meter
//! - Weight (g, kg, lb, oz, st), base kilogram
//! - Temperature (°C, °F, K), converted through Celsius
//! - Currency (USD, EUR, GBP, JPY) at static rates, base USD
//!
//! Units are looked up by exact name or symbol. Converting across categories
//! is refused rather than guessed.

mod unit;
mod units;
mod converter;
mod convert;

pub use unit::{UnitDef, UnitCategory, ConversionError};
pub use units::UNIT_CATEGORIES;
pub use converter::UnitConverter;
pub use convert::Convert;

use reckon_plugin::PluginRegistry;

/// Load unit functions into registry
pub fn load_units_library(registry: PluginRegistry) -> PluginRegistry {
    registry.with_function(convert::Convert)
}
