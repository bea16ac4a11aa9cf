//! Candidate configurations and the config file envelope
//!
//! A configuration is a flat map from fully-qualified dotted property paths
//! (`.properties.network.tcp.port`) to typed values. On disk it sits under the
//! `product-properties` key of a JSON or YAML config file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, TileError};
use crate::value::PropertyValue;

/// One configured property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationEntry {
    /// Declared property kind, informational only
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Configured value
    #[serde(default)]
    pub value: PropertyValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl ConfigurationEntry {
    pub fn new(kind: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            kind: Some(kind.into()),
            value: value.into(),
            required: None,
        }
    }

    /// An entry carrying only a value
    pub fn untyped(value: impl Into<PropertyValue>) -> Self {
        Self {
            kind: None,
            value: value.into(),
            required: None,
        }
    }
}

/// Mapping from dotted property path to entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    entries: BTreeMap<String, ConfigurationEntry>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, returning the configuration for chaining
    pub fn with(mut self, path: impl Into<String>, entry: ConfigurationEntry) -> Self {
        self.insert(path, entry);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, entry: ConfigurationEntry) {
        self.entries.insert(path.into(), entry);
    }

    pub fn get(&self, path: &str) -> Option<&ConfigurationEntry> {
        self.entries.get(path)
    }

    /// The configured value at a path
    pub fn value(&self, path: &str) -> Option<&PropertyValue> {
        self.entries.get(path).map(|entry| &entry.value)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ConfigurationEntry)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, ConfigurationEntry)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(path, entry)| (path.into(), entry))
                .collect(),
        }
    }
}

/// Config file envelope as read by `check-config` and written by `make-config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(
        rename = "product-name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub product_name: Option<String>,
    #[serde(
        rename = "product-properties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub product_properties: Option<Configuration>,
}

impl ConfigFile {
    pub fn new(product_name: impl Into<String>, properties: Configuration) -> Self {
        Self {
            product_name: Some(product_name.into()),
            product_properties: Some(properties),
        }
    }

    /// Decode a JSON or YAML config document
    ///
    /// An empty document decodes to an envelope with no sections. JSON is
    /// tried first since YAML rejects tab indentation that JSON allows.
    pub fn from_text(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        if let Ok(decoded) = serde_json::from_str::<ConfigFile>(text) {
            return Ok(decoded);
        }
        let decoded: Option<ConfigFile> = serde_yaml::from_str(text)
            .map_err(|e| TileError::ConfigFileDecode(e.to_string()))?;
        Ok(decoded.unwrap_or_default())
    }

    /// Read and decode a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TileError::ConfigFileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "read config file");
        Self::from_text(&text)
    }

    /// The `product-properties` section, which must be present
    pub fn properties(&self) -> Result<&Configuration> {
        self.product_properties
            .as_ref()
            .ok_or(TileError::MissingProductProperties)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
