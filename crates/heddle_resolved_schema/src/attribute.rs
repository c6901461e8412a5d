// SPDX-License-Identifier: Apache-2.0

//! A fully resolved attribute.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use heddle_semconv::attribute::{
    AttributeType, BasicRequirementLevelSpec, Examples, RequirementLevel,
};
use heddle_semconv::deprecated::Deprecated;
use heddle_semconv::stability::Stability;

/// A resolved attribute: the merge of a declaration with everything it
/// inherited through `ref` and `extends`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Attribute {
    /// The fully qualified attribute name: the defining group id followed by
    /// the attribute id.
    pub name: String,
    /// The attribute type.
    pub r#type: AttributeType,
    /// A brief description of the attribute.
    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub brief: String,
    /// Example values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Examples>,
    /// The requirement level of the attribute.
    pub requirement_level: RequirementLevel,
    /// A more elaborate description of the attribute.
    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
    /// The stability of the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<Stability>,
    /// The deprecation status of the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
}

impl Attribute {
    /// Returns true if the attribute is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.requirement_level == RequirementLevel::Basic(BasicRequirementLevelSpec::Required)
    }

    /// Returns the first dotted segment of the attribute name, used to group
    /// attributes by root namespace.
    #[must_use]
    pub fn root_namespace(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}

/// An internal reference to an attribute in the catalog.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct AttributeRef(pub u32);
