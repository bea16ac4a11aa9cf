//! Property blueprint tree
//!
//! A tile declares its configurable surface as a tree of property blueprints.
//! Each node shares a name, configurability, optionality and default; the
//! kind-specific payload (dropdown options, selector branches, collection item
//! blueprints) lives on [`BlueprintKind`].
//!
//! The on-disk metadata shape is flat (every node may carry `options`,
//! `option_templates` and `property_blueprints`), so decoding goes through a
//! raw mirror struct and is folded into the tagged form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::value::PropertyValue;

pub const KIND_SECRET: &str = "secret";
pub const KIND_DROPDOWN_SELECT: &str = "dropdown_select";
pub const KIND_SELECTOR: &str = "selector";
pub const KIND_COLLECTION: &str = "collection";

/// Root aggregate decoded from a tile's metadata file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintTree {
    /// Product name
    pub name: String,
    /// Product version, if declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_version: Option<String>,
    /// Top-level properties, rooted at `.properties`
    pub property_blueprints: Vec<PropertyBlueprint>,
    /// Per-job property groups, each rooted at `.{job-name}`
    pub job_types: Vec<JobType>,
    /// Opaque stemcell requirements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stemcell_criteria: Option<BTreeMap<String, PropertyValue>>,
}

impl BlueprintTree {
    /// Create an empty tree with the given product name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a top-level property
    pub fn with_property(mut self, blueprint: PropertyBlueprint) -> Self {
        self.property_blueprints.push(blueprint);
        self
    }

    /// Add a job type
    pub fn with_job(mut self, job: JobType) -> Self {
        self.job_types.push(job);
        self
    }

    /// Decode a tree from metadata YAML (or JSON) text
    pub fn from_yaml(text: &str) -> crate::Result<Self> {
        serde_yaml::from_str(text).map_err(|e| crate::TileError::metadata_decode(e.to_string()))
    }
}

/// A named group of properties scoped under `.{name}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobType {
    pub name: String,
    #[serde(default)]
    pub property_blueprints: Vec<PropertyBlueprint>,
}

impl JobType {
    pub fn new(name: impl Into<String>, property_blueprints: Vec<PropertyBlueprint>) -> Self {
        Self {
            name: name.into(),
            property_blueprints,
        }
    }
}

/// One declared property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPropertyBlueprint", into = "RawPropertyBlueprint")]
pub struct PropertyBlueprint {
    /// Identifier, unique among siblings
    pub name: String,
    /// Whether a configuration may set this property at all
    pub configurable: bool,
    /// Whether a value may be left out when there is no default
    pub optional: bool,
    /// Declared default; for secrets this is the bare secret string
    pub default: Option<PropertyValue>,
    /// Display label
    pub label: Option<String>,
    /// Kind and kind-specific payload
    pub kind: BlueprintKind,
}

/// Kind-specific part of a property blueprint
#[derive(Debug, Clone, PartialEq)]
pub enum BlueprintKind {
    /// `string`, `boolean`, `integer`, `port` and any other plain scalar kind
    Scalar(String),
    /// Value configured as `{secret: "..."}`
    Secret,
    /// Value must be one of the option names
    DropdownSelect { options: Vec<DropdownOption> },
    /// Value selects exactly one branch
    Selector { branches: Vec<BranchOption> },
    /// Value is a list of flat records, one per item
    Collection { item_blueprints: Vec<PropertyBlueprint> },
}

impl BlueprintKind {
    /// Resolve a metadata `type` string to a kind with empty payload
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            KIND_SECRET => BlueprintKind::Secret,
            KIND_DROPDOWN_SELECT => BlueprintKind::DropdownSelect {
                options: Vec::new(),
            },
            KIND_SELECTOR => BlueprintKind::Selector {
                branches: Vec::new(),
            },
            KIND_COLLECTION => BlueprintKind::Collection {
                item_blueprints: Vec::new(),
            },
            other => BlueprintKind::Scalar(other.to_string()),
        }
    }

    /// The metadata `type` string for this kind
    pub fn type_name(&self) -> &str {
        match self {
            BlueprintKind::Scalar(name) => name,
            BlueprintKind::Secret => KIND_SECRET,
            BlueprintKind::DropdownSelect { .. } => KIND_DROPDOWN_SELECT,
            BlueprintKind::Selector { .. } => KIND_SELECTOR,
            BlueprintKind::Collection { .. } => KIND_COLLECTION,
        }
    }
}

impl fmt::Display for BlueprintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// One entry of a dropdown's option list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownOption {
    /// Option value; compared against configured values with its native type
    pub name: PropertyValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<PropertyValue>,
}

impl DropdownOption {
    pub fn new(name: impl Into<PropertyValue>, label: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            label: Some(label.into()),
        }
    }
}

/// One branch of a selector property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchOption {
    /// Branch key, used to build child property paths
    pub name: String,
    /// Value the selector must hold for this branch to be selected
    #[serde(default)]
    pub select_value: String,
    /// Properties that exist only while this branch is selected
    #[serde(default)]
    pub property_blueprints: Vec<PropertyBlueprint>,
}

impl BranchOption {
    pub fn new(
        name: impl Into<String>,
        select_value: impl Into<String>,
        property_blueprints: Vec<PropertyBlueprint>,
    ) -> Self {
        Self {
            name: name.into(),
            select_value: select_value.into(),
            property_blueprints,
        }
    }

    /// Whether a value picks this branch
    pub fn is_selected_by(&self, value: &PropertyValue) -> bool {
        value.as_str() == Some(self.select_value.as_str())
    }
}

impl PropertyBlueprint {
    /// A configurable, required property of the given kind
    pub fn new(name: impl Into<String>, kind: BlueprintKind) -> Self {
        Self {
            name: name.into(),
            configurable: true,
            optional: false,
            default: None,
            label: None,
            kind,
        }
    }

    /// A configurable, required scalar property of the given type
    pub fn scalar(name: impl Into<String>, type_name: &str) -> Self {
        Self::new(name, BlueprintKind::from_type_name(type_name))
    }

    pub fn secret(name: impl Into<String>) -> Self {
        Self::new(name, BlueprintKind::Secret)
    }

    pub fn dropdown(name: impl Into<String>, options: Vec<DropdownOption>) -> Self {
        Self::new(name, BlueprintKind::DropdownSelect { options })
    }

    pub fn selector(name: impl Into<String>, branches: Vec<BranchOption>) -> Self {
        Self::new(name, BlueprintKind::Selector { branches })
    }

    pub fn collection(name: impl Into<String>, item_blueprints: Vec<PropertyBlueprint>) -> Self {
        Self::new(name, BlueprintKind::Collection { item_blueprints })
    }

    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_default(mut self, default: impl Into<PropertyValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    pub fn is_secret(&self) -> bool {
        matches!(self.kind, BlueprintKind::Secret)
    }

    /// Whether a configuration must carry a value for this property
    ///
    /// A dropdown without a default falls back to its first option, so it is
    /// never missing.
    pub fn requires_value(&self) -> bool {
        self.configurable
            && !self.optional
            && self.default.is_none()
            && !matches!(self.kind, BlueprintKind::DropdownSelect { .. })
    }

    /// Default as it appears in a configuration (secrets are wrapped)
    pub fn configured_default(&self) -> Option<PropertyValue> {
        let default = self.default.clone()?;
        if self.is_secret() {
            Some(PropertyValue::secret(default))
        } else {
            Some(default)
        }
    }
}

/// On-disk mirror of a blueprint node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawPropertyBlueprint {
    name: String,
    #[serde(rename = "type", default)]
    type_name: String,
    #[serde(default)]
    configurable: bool,
    #[serde(default)]
    optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, alias = "Options", skip_serializing_if = "Vec::is_empty")]
    options: Vec<DropdownOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    option_templates: Vec<BranchOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    property_blueprints: Vec<PropertyBlueprint>,
}

impl From<RawPropertyBlueprint> for PropertyBlueprint {
    fn from(raw: RawPropertyBlueprint) -> Self {
        let kind = match BlueprintKind::from_type_name(&raw.type_name) {
            BlueprintKind::DropdownSelect { .. } => BlueprintKind::DropdownSelect {
                options: raw.options,
            },
            BlueprintKind::Selector { .. } => BlueprintKind::Selector {
                branches: raw.option_templates,
            },
            BlueprintKind::Collection { .. } => BlueprintKind::Collection {
                item_blueprints: raw.property_blueprints,
            },
            other => other,
        };

        Self {
            name: raw.name,
            configurable: raw.configurable,
            optional: raw.optional,
            default: raw.default,
            label: raw.label,
            kind,
        }
    }
}

impl From<PropertyBlueprint> for RawPropertyBlueprint {
    fn from(blueprint: PropertyBlueprint) -> Self {
        let mut raw = RawPropertyBlueprint {
            name: blueprint.name,
            type_name: blueprint.kind.type_name().to_string(),
            configurable: blueprint.configurable,
            optional: blueprint.optional,
            default: blueprint.default,
            label: blueprint.label,
            ..Default::default()
        };

        match blueprint.kind {
            BlueprintKind::DropdownSelect { options } => raw.options = options,
            BlueprintKind::Selector { branches } => raw.option_templates = branches,
            BlueprintKind::Collection { item_blueprints } => {
                raw.property_blueprints = item_blueprints
            }
            BlueprintKind::Scalar(_) | BlueprintKind::Secret => {}
        }

        raw
    }
}
