//! Engine settings
//!
//! Defaults suit a US deployment. Every field can be overridden from the
//! environment, and extra calculators can be read from a JSON catalog file.

use crate::schema::CalculatorConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_LOCALE: &str = "RECKON_LOCALE";
pub const ENV_CURRENCY: &str = "RECKON_CURRENCY";
pub const ENV_PRECISION: &str = "RECKON_PRECISION";
pub const ENV_CATALOG_PATH: &str = "RECKON_CATALOG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub locale: String,
    pub currency: String,
    pub default_precision: u32,
    pub catalog_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            currency: "USD".to_string(),
            default_precision: 2,
            catalog_path: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `RECKON_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(locale) = get(ENV_LOCALE) {
            config.locale = locale;
        }
        if let Some(currency) = get(ENV_CURRENCY) {
            config.currency = currency.to_uppercase();
        }
        if let Some(raw) = get(ENV_PRECISION) {
            config.default_precision = raw
                .parse::<u32>()
                .ok()
                .filter(|p| *p <= 15)
                .ok_or(ConfigError::InvalidEnv { var: ENV_PRECISION, value: raw })?;
        }
        if let Some(path) = get(ENV_CATALOG_PATH) {
            config.catalog_path = Some(PathBuf::from(path));
        }
        Ok(config)
    }
}

/// Read a JSON array of calculators
pub fn load_catalog(path: &Path) -> Result<Vec<CalculatorConfig>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    parse_catalog(&text).map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
}

pub fn parse_catalog(text: &str) -> Result<Vec<CalculatorConfig>, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.default_precision, 2);
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_LOCALE, "de-DE"),
            (ENV_CURRENCY, "eur"),
            (ENV_PRECISION, "3"),
            (ENV_CATALOG_PATH, "/etc/reckon/catalog.json"),
        ]))
        .unwrap();
        assert_eq!(config.locale, "de-DE");
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.default_precision, 3);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/etc/reckon/catalog.json")));
    }

    #[test]
    fn test_bad_precision() {
        let err = EngineConfig::from_lookup(lookup(&[(ENV_PRECISION, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: ENV_PRECISION, .. }));
        assert!(EngineConfig::from_lookup(lookup(&[(ENV_PRECISION, "40")])).is_err());
    }

    #[test]
    fn test_parse_catalog() {
        let text = r#"[{
            "id": "tip", "title": "Tip Calculator", "category": "everyday",
            "variables": [{ "id": "bill", "label": "Bill", "type": "currency" }],
            "formulas": [{ "id": "tip", "expression": "bill * 0.15", "resultType": "currency" }]
        }]"#;
        let catalog = parse_catalog(text).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].variables[0].id, "bill");
        assert!(catalog[0].variables[0].required);
        assert!(catalog[0].auto_calculate);
    }

    #[test]
    fn test_missing_catalog_file() {
        let err = load_catalog(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
