//! Blueprint conformance checking
//!
//! The validator walks the blueprint tree once per scope (`.properties` and
//! one `.{job}` scope per job type), collecting every declared path and every
//! violation in declaration order. Configuration keys that match no declared
//! path anywhere are reported last, in key order.
//!
//! A scope is *active* when a configuration is expected to fill it: the
//! top-level and job scopes always are, a selector branch is active only when
//! its parent scope is active and the branch is selected. Required-property
//! checks run only in active scopes. Values found under an inactive branch of
//! an active selector are reported as not selected; deeper inactive levels
//! leave that report to the outermost one so each path is reported once.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::blueprint::{BlueprintKind, BlueprintTree, BranchOption, DropdownOption, PropertyBlueprint};
use crate::config::Configuration;
use crate::value::PropertyValue;

/// Prefix of top-level property paths
pub const PROPERTIES_PREFIX: &str = ".properties";

/// Path prefix for a job type's properties
pub fn job_prefix(job_name: &str) -> String {
    format!(".{}", job_name)
}

/// One conformance failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Required property has no value
    PropertyMissing { path: String },
    /// Value supplied for a property the tile does not let you set
    PropertyNotConfigurable { path: String },
    /// Key matches no declared property path
    PropertyUndeclared { path: String },
    /// Value supplied under a selector branch that is not selected
    PropertyNotSelected { path: String },
    /// Secret value is not `{secret: "<string>"}`
    SecretFormatInvalid { path: String },
    /// Dropdown value matches no option
    DropdownValueInvalid {
        path: String,
        value: PropertyValue,
        allowed: Vec<PropertyValue>,
    },
    /// Collection value is not a list of records
    CollectionShapeInvalid { path: String },
    /// Collection item lacks a required property
    CollectionItemMissing { path: String, property: String },
    /// Collection item sets a non-configurable property
    CollectionItemNotConfigurable { path: String, property: String },
}

impl Violation {
    /// Stable tag for this kind of violation
    pub fn code(&self) -> &'static str {
        match self {
            Violation::PropertyMissing { .. } => "property_missing",
            Violation::PropertyNotConfigurable { .. } => "property_not_configurable",
            Violation::PropertyUndeclared { .. } => "property_undeclared",
            Violation::PropertyNotSelected { .. } => "property_not_selected",
            Violation::SecretFormatInvalid { .. } => "secret_format_invalid",
            Violation::DropdownValueInvalid { .. } => "dropdown_value_invalid",
            Violation::CollectionShapeInvalid { .. } => "collection_shape_invalid",
            Violation::CollectionItemMissing { .. } => "collection_item_missing",
            Violation::CollectionItemNotConfigurable { .. } => "collection_item_not_configurable",
        }
    }

    /// Fully-qualified path the violation concerns
    pub fn path(&self) -> &str {
        match self {
            Violation::PropertyMissing { path }
            | Violation::PropertyNotConfigurable { path }
            | Violation::PropertyUndeclared { path }
            | Violation::PropertyNotSelected { path }
            | Violation::SecretFormatInvalid { path }
            | Violation::DropdownValueInvalid { path, .. }
            | Violation::CollectionShapeInvalid { path }
            | Violation::CollectionItemMissing { path, .. }
            | Violation::CollectionItemNotConfigurable { path, .. } => path,
        }
    }

    /// Suggested fix
    pub fn suggestion(&self) -> String {
        match self {
            Violation::PropertyMissing { path } => {
                format!("Add a value for {} to product-properties", path)
            }
            Violation::PropertyNotConfigurable { path } => {
                format!("Remove {}; the tile does not allow it to be set", path)
            }
            Violation::PropertyUndeclared { path } => {
                format!("Remove {} or check its name for typos", path)
            }
            Violation::PropertyNotSelected { path } => {
                format!("Remove {} or change the selector to pick its branch", path)
            }
            Violation::SecretFormatInvalid { .. } => {
                "Set the value to {\"secret\": \"<SECRET VALUE>\"}".to_string()
            }
            Violation::DropdownValueInvalid { allowed, .. } => {
                let names: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                format!("Use one of: {}", names.join(", "))
            }
            Violation::CollectionShapeInvalid { .. } => {
                "Set the value to a list of records".to_string()
            }
            Violation::CollectionItemMissing { property, .. } => {
                format!("Add {} to every item", property)
            }
            Violation::CollectionItemNotConfigurable { property, .. } => {
                format!("Remove {} from every item", property)
            }
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::PropertyMissing { path } => {
                write!(f, "the config file is missing a required property ({})", path)
            }
            Violation::PropertyNotConfigurable { path } => write!(
                f,
                "the config file contains a property ({}) that is not configurable",
                path
            ),
            Violation::PropertyUndeclared { path } => write!(
                f,
                "the config file contains a property ({}) that is not defined in the tile",
                path
            ),
            Violation::PropertyNotSelected { path } => write!(
                f,
                "the config file contains a property ({}) that is not selected",
                path
            ),
            Violation::SecretFormatInvalid { path } => write!(
                f,
                "the config file value for property ({}) is not in the right format. Should be {{\"secret\": \"<SECRET VALUE>\"}}",
                path
            ),
            Violation::DropdownValueInvalid { path, value, .. } => write!(
                f,
                "the config file value for property ({}) is invalid: {}",
                path, value
            ),
            Violation::CollectionShapeInvalid { path } => write!(
                f,
                "the config file value for collection ({}) is not a list of records",
                path
            ),
            Violation::CollectionItemMissing { path, property } => write!(
                f,
                "collection ({}) is missing required property {}",
                path, property
            ),
            Violation::CollectionItemNotConfigurable { path, property } => write!(
                f,
                "collection ({}) contains unconfigurable property {}",
                path, property
            ),
        }
    }
}

/// Paths and violations gathered from one scope
#[derive(Debug, Default)]
struct ScopeReport {
    paths: Vec<String>,
    violations: Vec<Violation>,
}

impl ScopeReport {
    fn merge(&mut self, other: ScopeReport) {
        self.paths.extend(other.paths);
        self.violations.extend(other.violations);
    }
}

/// Checks configurations against one blueprint tree
///
/// The validator only borrows the tree and holds no state between calls, so
/// one instance can check any number of configurations.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    tree: &'a BlueprintTree,
}

impl<'a> Validator<'a> {
    pub fn new(tree: &'a BlueprintTree) -> Self {
        Self { tree }
    }

    /// Every violation of `configuration` against the tree
    pub fn validate(&self, configuration: &Configuration) -> Vec<Violation> {
        let report = self.check_scopes(configuration);
        let declared: HashSet<&str> = report.paths.iter().map(String::as_str).collect();

        let mut violations = report.violations;
        for path in configuration.paths() {
            if !declared.contains(path) {
                violations.push(Violation::PropertyUndeclared {
                    path: path.to_string(),
                });
            }
        }

        tracing::info!(
            product = %self.tree.name,
            properties = configuration.len(),
            violations = violations.len(),
            "validated configuration"
        );
        violations
    }

    /// Every path the tree declares, including all selector branches
    pub fn declared_paths(&self) -> Vec<String> {
        self.check_scopes(&Configuration::new()).paths
    }

    fn check_scopes(&self, configuration: &Configuration) -> ScopeReport {
        let mut report = self.check_properties(
            true,
            PROPERTIES_PREFIX,
            configuration,
            &self.tree.property_blueprints,
        );
        for job in &self.tree.job_types {
            report.merge(self.check_properties(
                true,
                &job_prefix(&job.name),
                configuration,
                &job.property_blueprints,
            ));
        }
        report
    }

    fn check_properties(
        &self,
        active: bool,
        prefix: &str,
        configuration: &Configuration,
        blueprints: &[PropertyBlueprint],
    ) -> ScopeReport {
        let mut report = ScopeReport::default();

        for blueprint in blueprints {
            let key = format!("{}.{}", prefix, blueprint.name);
            report.paths.push(key.clone());

            let configured = configuration.value(&key);
            let mut has_value = configured.is_some();
            let mut check_required = active;

            if has_value && !blueprint.configurable {
                report
                    .violations
                    .push(Violation::PropertyNotConfigurable { path: key.clone() });
            }

            if let (BlueprintKind::Secret, Some(value)) = (&blueprint.kind, configured) {
                match value.as_secret() {
                    None => {
                        report
                            .violations
                            .push(Violation::SecretFormatInvalid { path: key.clone() });
                        check_required = false;
                    }
                    Some("") => has_value = false,
                    Some(_) => {}
                }
            }

            if check_required && blueprint.requires_value() && !has_value {
                tracing::debug!(path = %key, "required property has no value");
                report
                    .violations
                    .push(Violation::PropertyMissing { path: key.clone() });
            }

            match &blueprint.kind {
                BlueprintKind::Selector { branches } => {
                    let selection = configured.or(blueprint.default.as_ref());
                    let branch_report =
                        self.check_branches(active, &key, selection, configuration, branches);
                    report.merge(branch_report);
                }
                BlueprintKind::DropdownSelect { options } => {
                    if let Some(value) = configured {
                        if let Some(violation) = check_dropdown(&key, value, options) {
                            report.violations.push(violation);
                        }
                    }
                }
                BlueprintKind::Collection { item_blueprints } => {
                    if let Some(value) = configured {
                        match collection_items(value) {
                            Some(items) => report.violations.extend(check_collection_items(
                                active,
                                &key,
                                &items,
                                item_blueprints,
                            )),
                            None => report
                                .violations
                                .push(Violation::CollectionShapeInvalid { path: key.clone() }),
                        }
                    }
                }
                BlueprintKind::Scalar(_) | BlueprintKind::Secret => {}
            }
        }

        report
    }

    fn check_branches(
        &self,
        active: bool,
        key: &str,
        selection: Option<&PropertyValue>,
        configuration: &Configuration,
        branches: &[BranchOption],
    ) -> ScopeReport {
        let mut report = ScopeReport::default();

        for branch in branches {
            let is_selected = selection.map_or(false, |value| branch.is_selected_by(value));
            let branch_prefix = format!("{}.{}", key, branch.name);
            let child = self.check_properties(
                active && is_selected,
                &branch_prefix,
                configuration,
                &branch.property_blueprints,
            );

            let mut not_selected = Vec::new();
            if active && !is_selected {
                for path in &child.paths {
                    if configuration.contains(path) {
                        tracing::debug!(path = %path, branch = %branch.name, "value under unselected branch");
                        not_selected.push(Violation::PropertyNotSelected { path: path.clone() });
                    }
                }
            }

            report.merge(child);
            report.violations.extend(not_selected);
        }

        report
    }
}

/// Check `configuration` against `tree`
pub fn validate(tree: &BlueprintTree, configuration: &Configuration) -> Vec<Violation> {
    Validator::new(tree).validate(configuration)
}

fn check_dropdown(key: &str, value: &PropertyValue, options: &[DropdownOption]) -> Option<Violation> {
    if options.iter().any(|option| &option.name == value) {
        return None;
    }
    Some(Violation::DropdownValueInvalid {
        path: key.to_string(),
        value: value.clone(),
        allowed: options.iter().map(|option| option.name.clone()).collect(),
    })
}

/// Items of a collection value, if it is a list of records
fn collection_items(value: &PropertyValue) -> Option<Vec<&BTreeMap<String, PropertyValue>>> {
    match value {
        PropertyValue::List(items) => items.iter().map(PropertyValue::as_record).collect(),
        _ => None,
    }
}

fn check_collection_items(
    active: bool,
    key: &str,
    items: &[&BTreeMap<String, PropertyValue>],
    blueprints: &[PropertyBlueprint],
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let missing = |blueprint: &PropertyBlueprint| Violation::CollectionItemMissing {
        path: key.to_string(),
        property: blueprint.name.clone(),
    };

    if items.is_empty() {
        if active {
            violations.extend(
                blueprints
                    .iter()
                    .filter(|blueprint| blueprint.configurable && !blueprint.optional)
                    .map(missing),
            );
        }
        return violations;
    }

    for item in items {
        for blueprint in blueprints {
            let present = item.contains_key(&blueprint.name);
            if present && !blueprint.configurable {
                violations.push(Violation::CollectionItemNotConfigurable {
                    path: key.to_string(),
                    property: blueprint.name.clone(),
                });
            }
            if !present && active && blueprint.configurable && !blueprint.optional {
                violations.push(missing(blueprint));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::JobType;
    use crate::config::ConfigurationEntry;

    fn string_entry(value: &str) -> ConfigurationEntry {
        ConfigurationEntry::new("string", value)
    }

    #[test]
    fn test_violation_messages() {
        let missing = Violation::PropertyMissing {
            path: ".properties.space".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "the config file is missing a required property (.properties.space)"
        );
        assert_eq!(missing.code(), "property_missing");
        assert_eq!(missing.path(), ".properties.space");

        let secret = Violation::SecretFormatInvalid {
            path: ".properties.my-password".to_string(),
        };
        assert_eq!(
            secret.to_string(),
            "the config file value for property (.properties.my-password) is not in the right format. Should be {\"secret\": \"<SECRET VALUE>\"}"
        );

        let dropdown = Violation::DropdownValueInvalid {
            path: ".properties.flow-rate".to_string(),
            value: PropertyValue::from("ludicrous"),
            allowed: vec!["low".into(), "high".into()],
        };
        assert_eq!(
            dropdown.to_string(),
            "the config file value for property (.properties.flow-rate) is invalid: ludicrous"
        );
        assert_eq!(dropdown.suggestion(), "Use one of: low, high");
    }

    #[test]
    fn test_violation_serializes_with_kind_tag() {
        let violation = Violation::CollectionItemMissing {
            path: ".properties.users".to_string(),
            property: "name".to_string(),
        };
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["kind"], "collection_item_missing");
        assert_eq!(json["property"], "name");
    }

    #[test]
    fn test_job_scope_uses_job_prefix() {
        let tree = BlueprintTree::new("tile").with_job(JobType::new(
            "web",
            vec![PropertyBlueprint::scalar("listen", "string")],
        ));

        let violations = validate(&tree, &Configuration::new());
        assert_eq!(
            violations,
            vec![Violation::PropertyMissing {
                path: ".web.listen".to_string()
            }]
        );

        let config = Configuration::new().with(".web.listen", string_entry("0.0.0.0"));
        assert!(validate(&tree, &config).is_empty());

        let misplaced = Configuration::new()
            .with(".web.listen", string_entry("0.0.0.0"))
            .with(".properties.listen", string_entry("0.0.0.0"));
        assert_eq!(
            validate(&tree, &misplaced),
            vec![Violation::PropertyUndeclared {
                path: ".properties.listen".to_string()
            }]
        );
    }

    #[test]
    fn test_declared_paths_cover_every_branch() {
        let tree = BlueprintTree::new("tile").with_property(PropertyBlueprint::selector(
            "network",
            vec![
                BranchOption::new("tcp", "TCP", vec![PropertyBlueprint::scalar("port", "port")]),
                BranchOption::new("udp", "UDP", vec![PropertyBlueprint::scalar("port", "port")]),
            ],
        ));

        assert_eq!(
            Validator::new(&tree).declared_paths(),
            vec![
                ".properties.network".to_string(),
                ".properties.network.tcp.port".to_string(),
                ".properties.network.udp.port".to_string(),
            ]
        );
    }

    #[test]
    fn test_nested_selector_in_unselected_branch_is_inactive() {
        let inner = PropertyBlueprint::selector(
            "mode",
            vec![BranchOption::new(
                "fast",
                "Fast",
                vec![PropertyBlueprint::scalar("threads", "integer")],
            )],
        )
        .with_default("Fast");
        let tree = BlueprintTree::new("tile").with_property(
            PropertyBlueprint::selector(
                "engine",
                vec![
                    BranchOption::new("simple", "Simple", vec![]),
                    BranchOption::new("tuned", "Tuned", vec![inner]),
                ],
            )
            .with_default("Simple"),
        );

        assert!(validate(&tree, &Configuration::new()).is_empty());

        let config = Configuration::new().with(
            ".properties.engine.tuned.mode.fast.threads",
            ConfigurationEntry::new("integer", 4i64),
        );
        assert_eq!(
            validate(&tree, &config),
            vec![Violation::PropertyNotSelected {
                path: ".properties.engine.tuned.mode.fast.threads".to_string()
            }]
        );
    }

    #[test]
    fn test_collection_shape() {
        let tree = BlueprintTree::new("tile").with_property(PropertyBlueprint::collection(
            "users",
            vec![PropertyBlueprint::scalar("name", "string")],
        ));

        let not_a_list = Configuration::new().with(
            ".properties.users",
            ConfigurationEntry::new("collection", "alice"),
        );
        assert_eq!(
            validate(&tree, &not_a_list),
            vec![Violation::CollectionShapeInvalid {
                path: ".properties.users".to_string()
            }]
        );

        let list_of_scalars = Configuration::new().with(
            ".properties.users",
            ConfigurationEntry::new("collection", vec!["alice"]),
        );
        assert_eq!(
            validate(&tree, &list_of_scalars),
            vec![Violation::CollectionShapeInvalid {
                path: ".properties.users".to_string()
            }]
        );
    }

    #[test]
    fn test_collection_item_checks_repeat_per_item() {
        let tree = BlueprintTree::new("tile").with_property(PropertyBlueprint::collection(
            "users",
            vec![PropertyBlueprint::scalar("name", "string")],
        ));
        let item: PropertyValue = vec![("other", "x")].into_iter().collect();
        let config = Configuration::new().with(
            ".properties.users",
            ConfigurationEntry::new("collection", PropertyValue::List(vec![item.clone(), item])),
        );

        let violations = validate(&tree, &config);
        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .all(|v| v.code() == "collection_item_missing"));
    }
}
