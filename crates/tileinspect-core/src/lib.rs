//! Tile blueprint conformance
//!
//! Checks candidate configurations against the property blueprints a tile
//! declares, and synthesizes starter configurations that pass those checks.
//!
//! ## Features
//!
//! - **Validation**: every violation in one pass, in blueprint declaration order
//! - **Generation**: defaults, first options and sample placeholders, with
//!   typed overrides
//! - **Metadata loading**: `.pivotal` archives, bare metadata files, in-memory fixtures
//! - **Stemcell criteria**: OS and version pins with the derived `floating` flag
//!
//! ## Architecture
//!
//! 1. **Blueprint model** (`blueprint`): the tree of declared properties, a sum
//!    type over scalar, secret, dropdown, selector and collection kinds.
//!
//! 2. **Values** (`value`): the closed value type shared by configurations and
//!    blueprint defaults.
//!
//! 3. **Configuration** (`config`): the flat path-to-entry map and the config
//!    file envelope around it.
//!
//! 4. **Validator** (`validator`) and **Generator** (`generator`): pure walks
//!    over an immutable tree.
//!
//! 5. **Metadata** (`metadata`) and **Stemcell** (`stemcell`): the loaders that
//!    feed the tree in.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use tileinspect_core::{synthesize, validate, BlueprintTree, PropertyBlueprint};
//!
//! let tree = BlueprintTree::new("example-tile")
//!     .with_property(PropertyBlueprint::scalar("space", "string"))
//!     .with_property(PropertyBlueprint::secret("password"));
//!
//! let configuration = synthesize(&tree, &BTreeMap::new()).unwrap();
//! assert!(validate(&tree, &configuration).is_empty());
//! ```

pub mod blueprint;
pub mod config;
pub mod error;
pub mod generator;
pub mod metadata;
pub mod samples;
pub mod stemcell;
pub mod validator;
pub mod value;

pub use blueprint::{
    BlueprintKind, BlueprintTree, BranchOption, DropdownOption, JobType, PropertyBlueprint,
};
pub use config::{ConfigFile, Configuration, ConfigurationEntry};
pub use error::{Result, TileError};
pub use generator::{synthesize, Generator};
pub use metadata::{
    InMemoryMetadata, MetadataFile, MetadataFormat, MetadataSource, MetadataSourceExt, TileArchive,
};
pub use samples::SampleValues;
pub use stemcell::stemcell_criteria;
pub use validator::{validate, Validator, Violation};
pub use value::PropertyValue;
