//! Configuration synthesis
//!
//! The generator emits one entry per configurable blueprint, descending only
//! into the selected branch of each selector, so that its output validates
//! clean against the tree it came from.

use std::collections::{BTreeMap, HashSet};

use crate::blueprint::{BlueprintKind, BlueprintTree, BranchOption, PropertyBlueprint};
use crate::config::{ConfigFile, Configuration, ConfigurationEntry};
use crate::error::{Result, TileError};
use crate::samples::SampleValues;
use crate::validator::{job_prefix, PROPERTIES_PREFIX};
use crate::value::PropertyValue;

/// Builds a configuration from a blueprint tree
#[derive(Debug, Clone)]
pub struct Generator<'a> {
    tree: &'a BlueprintTree,
    samples: &'a SampleValues,
    overrides: BTreeMap<String, String>,
}

impl<'a> Generator<'a> {
    /// A generator using the standard sample values and no overrides
    pub fn new(tree: &'a BlueprintTree) -> Self {
        Self {
            tree,
            samples: SampleValues::standard(),
            overrides: BTreeMap::new(),
        }
    }

    /// Use a different placeholder table
    pub fn with_samples(mut self, samples: &'a SampleValues) -> Self {
        self.samples = samples;
        self
    }

    /// Pin the raw value for one property path
    pub fn with_override(mut self, path: impl Into<String>, raw: impl Into<String>) -> Self {
        self.overrides.insert(path.into(), raw.into());
        self
    }

    pub fn with_overrides<K, V>(mut self, overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Synthesize the configuration
    ///
    /// Fails if an override cannot be coerced to its property's kind, or
    /// names a path that is never generated.
    pub fn generate(&self) -> Result<Configuration> {
        let mut configuration = Configuration::new();
        let mut used = HashSet::new();

        self.fill_properties(
            &mut configuration,
            &mut used,
            PROPERTIES_PREFIX,
            &self.tree.property_blueprints,
        )?;
        for job in &self.tree.job_types {
            self.fill_properties(
                &mut configuration,
                &mut used,
                &job_prefix(&job.name),
                &job.property_blueprints,
            )?;
        }

        if let Some(unused) = self.overrides.keys().find(|key| !used.contains(key.as_str())) {
            return Err(TileError::invalid_override(
                unused.clone(),
                "no configurable property is generated at this path",
            ));
        }

        tracing::info!(
            product = %self.tree.name,
            properties = configuration.len(),
            "generated configuration"
        );
        Ok(configuration)
    }

    /// Synthesize the configuration wrapped in a config file envelope
    pub fn config_file(&self) -> Result<ConfigFile> {
        Ok(ConfigFile::new(self.tree.name.clone(), self.generate()?))
    }

    fn fill_properties(
        &self,
        configuration: &mut Configuration,
        used: &mut HashSet<String>,
        prefix: &str,
        blueprints: &[PropertyBlueprint],
    ) -> Result<()> {
        for blueprint in blueprints {
            let key = format!("{}.{}", prefix, blueprint.name);
            if !blueprint.configurable {
                tracing::debug!(path = %key, "skipping non-configurable property");
                // the branch picked by the default is still active
                if let Some(branch) = default_branch(blueprint) {
                    let branch_prefix = format!("{}.{}", key, branch.name);
                    self.fill_properties(configuration, used, &branch_prefix, &branch.property_blueprints)?;
                }
                continue;
            }

            let value = match self.overrides.get(&key) {
                Some(raw) => {
                    used.insert(key.clone());
                    Some(coerce_override(blueprint, &key, raw)?)
                }
                None => self.default_value(blueprint),
            };
            let value = match value {
                Some(value) => value,
                None => {
                    tracing::warn!(path = %key, "dropdown has no options and no default, leaving it out");
                    continue;
                }
            };

            let selected = match &blueprint.kind {
                BlueprintKind::Selector { branches } => {
                    branches.iter().find(|branch| branch.is_selected_by(&value))
                }
                _ => None,
            };

            tracing::debug!(path = %key, value = %value, "generated property");
            configuration.insert(key.clone(), ConfigurationEntry::new(blueprint.type_name(), value));

            if let Some(branch) = selected {
                let branch_prefix = format!("{}.{}", key, branch.name);
                self.fill_properties(configuration, used, &branch_prefix, &branch.property_blueprints)?;
            }
        }
        Ok(())
    }

    /// Value for a property with no override, or `None` for an empty dropdown
    fn default_value(&self, blueprint: &PropertyBlueprint) -> Option<PropertyValue> {
        if let Some(default) = blueprint.configured_default() {
            return Some(default);
        }
        match &blueprint.kind {
            BlueprintKind::DropdownSelect { options } => {
                options.first().map(|option| option.name.clone())
            }
            BlueprintKind::Selector { branches } if !branches.is_empty() => {
                Some(PropertyValue::from(branches[0].select_value.clone()))
            }
            BlueprintKind::Collection { item_blueprints } => {
                Some(PropertyValue::List(vec![self.sample_item(item_blueprints)]))
            }
            _ => Some(self.samples.placeholder(blueprint.type_name())),
        }
    }

    /// One collection item holding every configurable item property
    ///
    /// Item values are not checked against dropdown options, so an empty
    /// dropdown still gets a key holding the kind's placeholder.
    fn sample_item(&self, item_blueprints: &[PropertyBlueprint]) -> PropertyValue {
        item_blueprints
            .iter()
            .filter(|blueprint| blueprint.configurable)
            .map(|blueprint| {
                let value = self
                    .default_value(blueprint)
                    .unwrap_or_else(|| self.samples.placeholder(blueprint.type_name()));
                (blueprint.name.clone(), value)
            })
            .collect()
    }
}

/// Synthesize a configuration for `tree`, applying raw string overrides
pub fn synthesize(tree: &BlueprintTree, overrides: &BTreeMap<String, String>) -> Result<Configuration> {
    Generator::new(tree)
        .with_overrides(overrides.iter().map(|(k, v)| (k.clone(), v.clone())))
        .generate()
}

/// Branch selected by a selector's declared default
fn default_branch(blueprint: &PropertyBlueprint) -> Option<&BranchOption> {
    let default = blueprint.default.as_ref()?;
    match &blueprint.kind {
        BlueprintKind::Selector { branches } => {
            branches.iter().find(|branch| branch.is_selected_by(default))
        }
        _ => None,
    }
}

/// Coerce a raw override string to the value shape of `blueprint`
fn coerce_override(blueprint: &PropertyBlueprint, key: &str, raw: &str) -> Result<PropertyValue> {
    match &blueprint.kind {
        BlueprintKind::Secret => Ok(PropertyValue::secret(raw)),
        BlueprintKind::DropdownSelect { options } => options
            .iter()
            .find(|option| option.name.to_string() == raw)
            .map(|option| option.name.clone())
            .ok_or_else(|| {
                TileError::invalid_override(key, format!("{} is not one of the dropdown options", raw))
            }),
        BlueprintKind::Selector { branches } => {
            if branches.iter().any(|branch| branch.select_value == raw) {
                Ok(PropertyValue::from(raw))
            } else {
                Err(TileError::invalid_override(
                    key,
                    format!("{} does not select any branch", raw),
                ))
            }
        }
        BlueprintKind::Collection { .. } => {
            let value: PropertyValue = serde_yaml::from_str(raw)
                .map_err(|e| TileError::invalid_override(key, e.to_string()))?;
            match &value {
                PropertyValue::List(items) if items.iter().all(|item| item.as_record().is_some()) => {
                    Ok(value)
                }
                _ => Err(TileError::invalid_override(key, "expected a list of records")),
            }
        }
        BlueprintKind::Scalar(kind) => match kind.as_str() {
            "boolean" => raw
                .parse::<bool>()
                .map(PropertyValue::Bool)
                .map_err(|e| TileError::invalid_override(key, e.to_string())),
            "integer" | "port" => raw
                .parse::<i64>()
                .map(PropertyValue::Int)
                .map_err(|e| TileError::invalid_override(key, e.to_string())),
            _ => Ok(PropertyValue::from(raw)),
        },
    }
}
