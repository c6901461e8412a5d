// SPDX-License-Identifier: Apache-2.0

//! Data model of a fully resolved registry.
//!
//! A resolved registry is the immutable output of the resolution process:
//! every `extends` has been expanded, every `ref` has been replaced by a
//! fully merged attribute, and shared attributes have been deduplicated into
//! a catalog referenced by stable indexes. Downstream components hold
//! read-only handles to this structure.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::registry::Registry;

pub mod attribute;
pub mod catalog;
pub mod lineage;
pub mod registry;

/// A resolved registry: the registry groups plus the attribute catalog their
/// attribute references point into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ResolvedRegistry {
    /// The resolved registry groups.
    pub registry: Registry,
    /// The deduplicated attribute catalog.
    pub catalog: Catalog,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;
    use crate::lineage::{AttributeLineage, GroupLineage};
    use crate::registry::Group;
    use heddle_semconv::attribute::{
        AttributeType, BasicRequirementLevelSpec, PrimitiveOrArrayTypeSpec, RequirementLevel,
    };
    use heddle_semconv::group::GroupType;
    use heddle_semconv::provenance::Provenance;

    fn sample() -> ResolvedRegistry {
        let mut catalog = Catalog::default();
        let attr_ref = catalog.push(Attribute {
            name: "demo.op.x".to_owned(),
            r#type: AttributeType::PrimitiveOrArray(PrimitiveOrArrayTypeSpec::String),
            brief: "X.".to_owned(),
            examples: None,
            requirement_level: RequirementLevel::Basic(BasicRequirementLevelSpec::Required),
            note: String::new(),
            stability: None,
            deprecated: None,
        });
        let mut lineage = GroupLineage::new(Provenance::new("default", "r.yaml"));
        lineage.add_attribute_lineage(
            "x".to_owned(),
            AttributeLineage::new("demo.op"),
        );
        ResolvedRegistry {
            registry: Registry {
                registry_id: "default".to_owned(),
                groups: vec![Group {
                    id: "demo.op".to_owned(),
                    r#type: GroupType::Span,
                    brief: "Op.".to_owned(),
                    note: String::new(),
                    stability: None,
                    deprecated: None,
                    attributes: vec![attr_ref],
                    span_kind: None,
                    events: vec![],
                    metric_name: None,
                    instrument: None,
                    unit: None,
                    name: None,
                    lineage: Some(lineage),
                }],
            },
            catalog,
        }
    }

    // A resolved registry emitted as YAML and loaded back must be
    // structurally equal.
    #[test]
    fn test_yaml_round_trip() {
        let resolved = sample();
        let yaml = serde_yaml::to_string(&resolved).unwrap();
        let reloaded: ResolvedRegistry = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(resolved, reloaded);
    }

    #[test]
    fn test_json_round_trip() {
        let resolved = sample();
        let json = serde_json::to_string(&resolved).unwrap();
        let reloaded: ResolvedRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(resolved, reloaded);
    }
}
