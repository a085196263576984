//! Calculator registry
//!
//! An immutable catalog built once at startup and shared by reference.
//! Lookups are read-only and never allocate more than the returned list.

use crate::catalog::builtin_calculators;
use crate::check::{check_config, ConfigIssue};
use crate::schema::CalculatorConfig;
use reckon_plugin::PluginRegistry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

/// Default number of related calculators returned
pub const DEFAULT_RELATED_LIMIT: usize = 4;

/// Read-only catalog of calculators, kept in declaration order
#[derive(Debug, Clone, Default)]
pub struct CalculatorRegistry {
    calculators: Vec<CalculatorConfig>,
    index: HashMap<String, usize>,
}

/// Collects calculators before freezing them into a [`CalculatorRegistry`]
#[derive(Debug, Default)]
pub struct CalculatorRegistryBuilder {
    calculators: Vec<CalculatorConfig>,
}

impl CalculatorRegistryBuilder {
    /// Add one calculator. A later calculator with the same id replaces the
    /// earlier one in place.
    pub fn with_calculator(mut self, config: CalculatorConfig) -> Self {
        match self.calculators.iter_mut().find(|c| c.id == config.id) {
            Some(existing) => {
                warn!(id = %config.id, "duplicate calculator id, later definition wins");
                *existing = config;
            }
            None => self.calculators.push(config),
        }
        self
    }

    pub fn with_calculators(self, configs: impl IntoIterator<Item = CalculatorConfig>) -> Self {
        configs.into_iter().fold(self, |b, c| b.with_calculator(c))
    }

    pub fn build(self) -> CalculatorRegistry {
        let index = self
            .calculators
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        debug!(count = self.calculators.len(), "calculator registry built");
        CalculatorRegistry { calculators: self.calculators, index }
    }
}

impl CalculatorRegistry {
    pub fn builder() -> CalculatorRegistryBuilder {
        CalculatorRegistryBuilder::default()
    }

    /// Registry holding the built-in catalog
    pub fn builtin() -> Self {
        Self::builder().with_calculators(builtin_calculators()).build()
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }

    pub fn get_calculator_config(&self, id: &str) -> Option<&CalculatorConfig> {
        self.index.get(id).map(|&i| &self.calculators[i])
    }

    pub fn get_all_calculators(&self) -> &[CalculatorConfig] {
        &self.calculators
    }

    pub fn get_calculators_by_category(&self, category: &str) -> Vec<&CalculatorConfig> {
        self.calculators.iter().filter(|c| c.category == category).collect()
    }

    pub fn get_featured_calculators(&self) -> Vec<&CalculatorConfig> {
        self.calculators.iter().filter(|c| c.featured).collect()
    }

    pub fn get_trending_calculators(&self) -> Vec<&CalculatorConfig> {
        self.calculators.iter().filter(|c| c.trending).collect()
    }

    /// Case-insensitive substring search over title, description, tags,
    /// keywords and category. A blank query matches nothing.
    pub fn search_calculators(&self, query: &str) -> Vec<&CalculatorConfig> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let hit = |s: &str| s.to_lowercase().contains(&needle);

        self.calculators
            .iter()
            .filter(|c| {
                hit(&c.title)
                    || hit(&c.description)
                    || hit(&c.category)
                    || c.tags.iter().any(|t| hit(t))
                    || c.keywords().iter().any(|k| hit(k))
            })
            .collect()
    }

    pub fn get_categories(&self) -> Vec<String> {
        self.calculators
            .iter()
            .map(|c| c.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Other calculators sharing the category or a tag, in catalog order
    pub fn get_related_calculators(&self, id: &str, limit: usize) -> Vec<&CalculatorConfig> {
        let Some(current) = self.get_calculator_config(id) else {
            return Vec::new();
        };
        self.calculators
            .iter()
            .filter(|c| c.id != current.id)
            .filter(|c| c.category == current.category || c.tags.iter().any(|t| current.tags.contains(t)))
            .take(limit)
            .collect()
    }

    /// Run [`check_config`] over every calculator. Only calculators with
    /// issues appear in the result.
    pub fn check_all(&self, functions: &PluginRegistry) -> BTreeMap<String, Vec<ConfigIssue>> {
        let mut report = BTreeMap::new();
        for config in &self.calculators {
            let issues = check_config(config, functions);
            if issues.is_empty() {
                continue;
            }
            for issue in &issues {
                warn!(calculator = %config.id, kind = ?issue.kind, "{}", issue);
            }
            report.insert(config.id.clone(), issues);
        }
        report
    }
}
