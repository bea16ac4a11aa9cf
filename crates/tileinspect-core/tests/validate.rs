//! Integration tests for blueprint conformance checking
//!
//! Covers:
//! - Undeclared and non-configurable properties
//! - Selector branch selection and required children
//! - Dropdown option matching with native types
//! - Secret shape and emptiness
//! - Collection items, including under unselected branches

use tileinspect_core::{
    validate, BlueprintTree, BranchOption, Configuration, ConfigurationEntry, DropdownOption,
    PropertyBlueprint, PropertyValue, Violation,
};

/// Helper to build a configuration from path/value pairs
fn config(entries: Vec<(&str, PropertyValue)>) -> Configuration {
    entries
        .into_iter()
        .map(|(path, value)| (path, ConfigurationEntry::untyped(value)))
        .collect()
}

/// Helper to render violations as the messages users see
fn messages(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(ToString::to_string).collect()
}

fn simple_defaults_tile() -> BlueprintTree {
    BlueprintTree::new("tile")
        .with_property(PropertyBlueprint::scalar("property-one", "string").with_default("on"))
        .with_property(PropertyBlueprint::scalar("property-two", "string").configurable(false))
        .with_property(PropertyBlueprint::scalar("property-three", "boolean").with_default(true))
        .with_property(PropertyBlueprint::scalar("property-four", "boolean").configurable(false))
}

fn selector_tile() -> BlueprintTree {
    BlueprintTree::new("tile")
        .with_property(PropertyBlueprint::scalar("simple-property", "string"))
        .with_property(PropertyBlueprint::selector(
            "selector-property",
            vec![
                BranchOption::new(
                    "option-one",
                    "Option One",
                    vec![
                        PropertyBlueprint::scalar("option-one-property-one", "string"),
                        PropertyBlueprint::scalar("option-one-property-two", "string"),
                    ],
                ),
                BranchOption::new(
                    "option-two",
                    "Option Two",
                    vec![PropertyBlueprint::scalar("option-two-property-one", "boolean")],
                ),
            ],
        ))
}

fn required_selector_tile(optional: bool) -> BlueprintTree {
    BlueprintTree::new("tile").with_property(
        PropertyBlueprint::selector(
            "selector-property",
            vec![BranchOption::new(
                "option-one",
                "Option One",
                vec![PropertyBlueprint::scalar("option-one-property-one", "string")],
            )],
        )
        .optional(optional),
    )
}

fn flow_rate_tile() -> BlueprintTree {
    BlueprintTree::new("tile").with_property(PropertyBlueprint::dropdown(
        "flow-rate",
        vec![
            DropdownOption::new("low", "Low"),
            DropdownOption::new("medium", "Medium"),
            DropdownOption::new("high", "High"),
        ],
    ))
}

fn secret_tile(optional: bool) -> BlueprintTree {
    BlueprintTree::new("tile")
        .with_property(PropertyBlueprint::secret("my-password").optional(optional))
}

fn collection_tile() -> BlueprintTree {
    BlueprintTree::new("tile").with_property(PropertyBlueprint::collection(
        "collection-properties",
        vec![
            PropertyBlueprint::scalar("property1", "string"),
            PropertyBlueprint::scalar("property2", "string").configurable(false),
        ],
    ))
}

#[test]
fn test_empty_tile_and_empty_config() {
    let tree = BlueprintTree::new("tile");
    assert!(validate(&tree, &Configuration::new()).is_empty());
}

#[test]
fn test_empty_tile_reports_every_key() {
    let tree = BlueprintTree::new("tile");
    let violations = validate(
        &tree,
        &config(vec![(".properties.my-property", "hi".into())]),
    );
    assert_eq!(
        messages(&violations),
        vec!["the config file contains a property (.properties.my-property) that is not defined in the tile"]
    );
}

#[test]
fn test_simple_defaults() {
    let tree = simple_defaults_tile();
    assert!(validate(&tree, &Configuration::new()).is_empty());

    let valid = config(vec![(".properties.property-one", "hi".into())]);
    assert!(validate(&tree, &valid).is_empty());
}

#[test]
fn test_key_without_prefix_is_undeclared() {
    let violations = validate(
        &simple_defaults_tile(),
        &config(vec![("property-one", "hi".into())]),
    );
    assert_eq!(
        violations,
        vec![Violation::PropertyUndeclared {
            path: "property-one".to_string()
        }]
    );
}

#[test]
fn test_non_configurable_in_declaration_order() {
    let violations = validate(
        &simple_defaults_tile(),
        &config(vec![
            (".properties.property-four", true.into()),
            (".properties.property-two", "hi".into()),
        ]),
    );
    assert_eq!(
        messages(&violations),
        vec![
            "the config file contains a property (.properties.property-two) that is not configurable",
            "the config file contains a property (.properties.property-four) that is not configurable",
        ]
    );
}

#[test]
fn test_selector_valid_branch() {
    let configuration = config(vec![
        (".properties.simple-property", "hi".into()),
        (".properties.selector-property", "Option Two".into()),
        (
            ".properties.selector-property.option-two.option-two-property-one",
            false.into(),
        ),
    ]);
    assert!(validate(&selector_tile(), &configuration).is_empty());
}

#[test]
fn test_selector_multiple_branches() {
    let configuration = config(vec![
        (".properties.simple-property", "hi".into()),
        (".properties.selector-property", "Option Two".into()),
        (
            ".properties.selector-property.option-two.option-two-property-one",
            false.into(),
        ),
        (
            ".properties.selector-property.option-one.option-one-property-two",
            false.into(),
        ),
    ]);
    assert_eq!(
        messages(&validate(&selector_tile(), &configuration)),
        vec!["the config file contains a property (.properties.selector-property.option-one.option-one-property-two) that is not selected"]
    );
}

#[test]
fn test_required_property() {
    let tree = BlueprintTree::new("tile")
        .with_property(PropertyBlueprint::scalar("simple-property", "string"));
    assert_eq!(
        messages(&validate(&tree, &Configuration::new())),
        vec!["the config file is missing a required property (.properties.simple-property)"]
    );

    let tree = BlueprintTree::new("tile")
        .with_property(PropertyBlueprint::scalar("simple-property", "string").optional(true));
    assert!(validate(&tree, &Configuration::new()).is_empty());
}

#[test]
fn test_optional_selector_with_required_children() {
    assert!(validate(&required_selector_tile(true), &Configuration::new()).is_empty());
}

#[test]
fn test_required_selector_with_required_children() {
    let tree = required_selector_tile(false);

    assert_eq!(
        messages(&validate(&tree, &Configuration::new())),
        vec!["the config file is missing a required property (.properties.selector-property)"]
    );

    let only_selector = config(vec![(".properties.selector-property", "Option One".into())]);
    assert_eq!(
        messages(&validate(&tree, &only_selector)),
        vec!["the config file is missing a required property (.properties.selector-property.option-one.option-one-property-one)"]
    );

    let complete = config(vec![
        (".properties.selector-property", "Option One".into()),
        (
            ".properties.selector-property.option-one.option-one-property-one",
            "my-value".into(),
        ),
    ]);
    assert!(validate(&tree, &complete).is_empty());
}

#[test]
fn test_selector_default_selects_branch() {
    let tree = BlueprintTree::new("tile").with_property(
        PropertyBlueprint::selector(
            "network",
            vec![
                BranchOption::new("tcp", "TCP", vec![PropertyBlueprint::scalar("port", "port")]),
                BranchOption::new("udp", "UDP", vec![PropertyBlueprint::scalar("port", "port")]),
            ],
        )
        .with_default("UDP"),
    );

    assert_eq!(
        validate(&tree, &Configuration::new()),
        vec![Violation::PropertyMissing {
            path: ".properties.network.udp.port".to_string()
        }]
    );

    let wrong_branch = config(vec![(".properties.network.tcp.port", PropertyValue::Int(80))]);
    assert_eq!(
        validate(&tree, &wrong_branch),
        vec![
            Violation::PropertyNotSelected {
                path: ".properties.network.tcp.port".to_string()
            },
            Violation::PropertyMissing {
                path: ".properties.network.udp.port".to_string()
            },
        ]
    );
}

#[test]
fn test_dropdown_without_value_or_default() {
    assert!(validate(&flow_rate_tile(), &Configuration::new()).is_empty());

    let mut tree = flow_rate_tile();
    tree.property_blueprints[0].default = Some("med".into());
    assert!(validate(&tree, &Configuration::new()).is_empty());
}

#[test]
fn test_dropdown_values() {
    let tree = flow_rate_tile();

    let invalid = config(vec![(".properties.flow-rate", "ludicrous".into())]);
    assert_eq!(
        messages(&validate(&tree, &invalid)),
        vec!["the config file value for property (.properties.flow-rate) is invalid: ludicrous"]
    );

    let valid = config(vec![(".properties.flow-rate", "high".into())]);
    assert!(validate(&tree, &valid).is_empty());
}

#[test]
fn test_dropdown_compares_native_types() {
    let tree = BlueprintTree::new("tile").with_property(PropertyBlueprint::dropdown(
        "quantity",
        vec![
            DropdownOption::new(0i64, 0i64),
            DropdownOption::new(1i64, 1i64),
            DropdownOption::new(2i64, 2i64),
        ],
    ));

    let numeric = config(vec![(".properties.quantity", PropertyValue::Int(1))]);
    assert!(validate(&tree, &numeric).is_empty());

    let textual = config(vec![(".properties.quantity", "1".into())]);
    let violations = validate(&tree, &textual);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code(), "dropdown_value_invalid");
}

#[test]
fn test_secret_with_wrong_shape() {
    let expected = "the config file value for property (.properties.my-password) is not in the right format. Should be {\"secret\": \"<SECRET VALUE>\"}";

    let plain = config(vec![(".properties.my-password", "shhhh".into())]);
    assert_eq!(messages(&validate(&secret_tile(false), &plain)), vec![expected]);

    let list = config(vec![(
        ".properties.my-password",
        PropertyValue::secret(vec![1i64, 2, 3]),
    )]);
    assert_eq!(messages(&validate(&secret_tile(false), &list)), vec![expected]);
}

#[test]
fn test_empty_secret_counts_as_absent() {
    let empty = config(vec![(".properties.my-password", PropertyValue::secret(""))]);

    assert_eq!(
        messages(&validate(&secret_tile(false), &empty)),
        vec!["the config file is missing a required property (.properties.my-password)"]
    );
    assert!(validate(&secret_tile(true), &empty).is_empty());
}

#[test]
fn test_valid_secret() {
    let valid = config(vec![(".properties.my-password", PropertyValue::secret("shhhh"))]);
    assert!(validate(&secret_tile(false), &valid).is_empty());
}

#[test]
fn test_collection_missing() {
    assert_eq!(
        messages(&validate(&collection_tile(), &Configuration::new())),
        vec!["the config file is missing a required property (.properties.collection-properties)"]
    );
}

#[test]
fn test_collection_empty_list() {
    let empty = config(vec![(
        ".properties.collection-properties",
        PropertyValue::List(vec![]),
    )]);
    assert_eq!(
        messages(&validate(&collection_tile(), &empty)),
        vec!["collection (.properties.collection-properties) is missing required property property1"]
    );
}

#[test]
fn test_collection_under_unselected_branch() {
    let tree = BlueprintTree::new("tile").with_property(
        PropertyBlueprint::selector(
            "network",
            vec![
                BranchOption::new(
                    "tcp",
                    "TCP",
                    vec![PropertyBlueprint::scalar("port", "port").with_default(8080i64)],
                ),
                BranchOption::new(
                    "udp",
                    "UDP",
                    vec![PropertyBlueprint::collection(
                        "routes",
                        vec![PropertyBlueprint::scalar("name", "string")],
                    )],
                ),
            ],
        )
        .with_default("TCP"),
    );

    let incomplete: PropertyValue = Vec::<(&str, PropertyValue)>::new().into_iter().collect();
    for routes in [PropertyValue::List(vec![]), PropertyValue::List(vec![incomplete])] {
        let configuration = config(vec![
            (".properties.network", PropertyValue::from("TCP")),
            (".properties.network.udp.routes", routes),
        ]);
        assert_eq!(
            validate(&tree, &configuration),
            vec![Violation::PropertyNotSelected {
                path: ".properties.network.udp.routes".to_string(),
            }]
        );
    }
}

#[test]
fn test_collection_items() {
    let item: PropertyValue = vec![("property1", "value1")].into_iter().collect();
    let valid = config(vec![(
        ".properties.collection-properties",
        PropertyValue::List(vec![item]),
    )]);
    assert!(validate(&collection_tile(), &valid).is_empty());

    let item: PropertyValue = vec![("property1", "value1"), ("property2", "value2")]
        .into_iter()
        .collect();
    let with_fixed = config(vec![(
        ".properties.collection-properties",
        PropertyValue::List(vec![item]),
    )]);
    assert_eq!(
        messages(&validate(&collection_tile(), &with_fixed)),
        vec!["collection (.properties.collection-properties) contains unconfigurable property property2"]
    );
}

#[test]
fn test_undeclared_reported_after_walk() {
    let tree = BlueprintTree::new("tile")
        .with_property(PropertyBlueprint::scalar("space", "string"));
    let violations = validate(
        &tree,
        &config(vec![(".properties.unknown-key", "x".into())]),
    );
    assert_eq!(
        violations,
        vec![
            Violation::PropertyMissing {
                path: ".properties.space".to_string()
            },
            Violation::PropertyUndeclared {
                path: ".properties.unknown-key".to_string()
            },
        ]
    );
}

#[test]
fn test_decoded_tile_and_config_file() {
    let tree = BlueprintTree::from_yaml(
        r#"
name: example-tile
property_blueprints:
  - name: space
    type: string
    configurable: true
    optional: false
job_types:
  - name: router
    property_blueprints:
      - name: instances
        type: integer
        configurable: true
"#,
    )
    .unwrap();

    let file = tileinspect_core::ConfigFile::from_text(
        r#"---
product-properties:
  ".properties.space":
    value: test-tile-space
    type: string
"#,
    )
    .unwrap();

    assert_eq!(
        messages(&validate(&tree, file.properties().unwrap())),
        vec!["the config file is missing a required property (.router.instances)"]
    );
}

#[test]
fn test_validation_is_deterministic() {
    let tree = selector_tile();
    let configuration = config(vec![
        (".properties.selector-property", "Option One".into()),
        (".properties.selector-property.option-two.option-two-property-one", true.into()),
        (".properties.zzz", "x".into()),
        (".properties.aaa", "x".into()),
    ]);

    let first = validate(&tree, &configuration);
    for _ in 0..5 {
        assert_eq!(validate(&tree, &configuration), first);
    }
    assert_eq!(
        first.last(),
        Some(&Violation::PropertyUndeclared {
            path: ".properties.zzz".to_string()
        })
    );
}
