//! Stemcell criteria
//!
//! A tile pins its stemcell by OS and version. A version without a minor
//! component (`"97"`) floats to the newest patch; `"97.32"` is exact.

use std::collections::BTreeMap;

use crate::blueprint::BlueprintTree;
use crate::error::{Result, TileError};
use crate::value::PropertyValue;

/// Field added to the criteria record
pub const FLOATING_FIELD: &str = "floating";

/// Stemcell criteria with the derived `floating` flag
pub fn stemcell_criteria(tree: &BlueprintTree) -> Result<BTreeMap<String, PropertyValue>> {
    let mut criteria = tree.stemcell_criteria.clone().unwrap_or_default();

    let version = criteria
        .get("version")
        .and_then(PropertyValue::as_str)
        .ok_or_else(|| {
            TileError::StemcellCriteria(
                "could not convert stemcell criteria version to string".to_string(),
            )
        })?;
    let floating = !version.contains('.');

    tracing::debug!(version, floating, "read stemcell criteria");
    criteria.insert(FLOATING_FIELD.to_string(), PropertyValue::Bool(floating));
    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(criteria: &[(&str, PropertyValue)]) -> BlueprintTree {
        let mut tree = BlueprintTree::new("tile");
        tree.stemcell_criteria = Some(
            criteria
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        );
        tree
    }

    #[test]
    fn test_pinned_version() {
        let tree = tree_with(&[("os", "ubuntu-xenial".into()), ("version", "97.32".into())]);
        let criteria = stemcell_criteria(&tree).unwrap();
        assert_eq!(criteria.get("floating"), Some(&PropertyValue::Bool(false)));
        assert_eq!(criteria.get("os"), Some(&PropertyValue::from("ubuntu-xenial")));
    }

    #[test]
    fn test_floating_version() {
        let tree = tree_with(&[("os", "ubuntu-xenial".into()), ("version", "97".into())]);
        let criteria = stemcell_criteria(&tree).unwrap();
        assert_eq!(criteria.get("floating"), Some(&PropertyValue::Bool(true)));
    }

    #[test]
    fn test_version_must_be_a_string() {
        let tree = tree_with(&[("version", PropertyValue::Float(97.32))]);
        let err = stemcell_criteria(&tree).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not convert stemcell criteria version to string"
        );

        let err = stemcell_criteria(&BlueprintTree::new("tile")).unwrap_err();
        assert!(matches!(err, TileError::StemcellCriteria(_)));
    }
}
