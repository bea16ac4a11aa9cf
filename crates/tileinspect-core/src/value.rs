//! Dynamically shaped property values
//!
//! Config files and tile metadata carry values of arbitrary shape. They are
//! decoded into a closed sum type so that shape checks in the validator are
//! exhaustive matches rather than runtime casts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field name of the single-field record that wraps secret values
pub const SECRET_FIELD: &str = "secret";

/// A decoded scalar, record, or list value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<PropertyValue>),
    Record(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Wrap a plain value in the `{secret: value}` record
    pub fn secret(value: impl Into<PropertyValue>) -> Self {
        let mut record = BTreeMap::new();
        record.insert(SECRET_FIELD.to_string(), value.into());
        PropertyValue::Record(record)
    }

    /// The string held by a well-formed `{secret: "..."}` record
    ///
    /// Returns `None` for any other shape, including records with extra
    /// fields or a non-string secret.
    pub fn as_secret(&self) -> Option<&str> {
        match self {
            PropertyValue::Record(record) if record.len() == 1 => match record.get(SECRET_FIELD) {
                Some(PropertyValue::Str(secret)) => Some(secret),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, PropertyValue>> {
        match self {
            PropertyValue::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Short name of the value's shape, for messages
    pub fn shape_name(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Bool(_) => "boolean",
            PropertyValue::Int(_) => "integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::Str(_) => "string",
            PropertyValue::List(_) => "list",
            PropertyValue::Record(_) => "record",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "null"),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{}", x),
            PropertyValue::Str(s) => write!(f, "{}", s),
            compound => match serde_json::to_string(compound) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "<{}>", compound.shape_name()),
            },
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl<V: Into<PropertyValue>> From<Vec<V>> for PropertyValue {
    fn from(items: Vec<V>) -> Self {
        PropertyValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for PropertyValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PropertyValue::Record(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
