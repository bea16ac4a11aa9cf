//! Placeholder values for generated configurations
//!
//! When a blueprint has no default, the generator fills in a placeholder
//! looked up by property kind. The table is built once and shared.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::value::PropertyValue;

static STANDARD: Lazy<SampleValues> = Lazy::new(SampleValues::build_standard);

/// Lookup table from property kind to placeholder value
#[derive(Debug, Clone, Default)]
pub struct SampleValues {
    table: HashMap<String, PropertyValue>,
}

impl SampleValues {
    /// The process-wide standard table
    pub fn standard() -> &'static SampleValues {
        &STANDARD
    }

    /// An empty table; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    fn build_standard() -> Self {
        Self::empty()
            .with("boolean", false)
            .with("integer", 0i64)
            .with("port", 0i64)
            .with("string", "SAMPLE_STRING_VALUE")
            .with("network_address", "SAMPLE_NETWORK_ADDRESS")
            .with("secret", PropertyValue::secret("SAMPLE_SECRET_VALUE"))
            .with("disk_type_dropdown", "{disk_type}")
            .with("vm_type_dropdown", "{vm_type}")
    }

    /// Add or replace the placeholder for a kind
    pub fn with(mut self, kind: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.table.insert(kind.into(), value.into());
        self
    }

    /// Placeholder for a kind, if one is known
    pub fn lookup(&self, kind: &str) -> Option<&PropertyValue> {
        self.table.get(kind)
    }

    /// Placeholder for a kind, or null for unknown kinds
    pub fn placeholder(&self, kind: &str) -> PropertyValue {
        match self.lookup(kind) {
            Some(value) => value.clone(),
            None => {
                tracing::warn!(kind, "no sample value for property kind, using null");
                PropertyValue::Null
            }
        }
    }
}
