// SPDX-License-Identifier: Apache-2.0

//! Resolved registry groups.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::attribute::AttributeRef;
use crate::lineage::GroupLineage;
use heddle_semconv::deprecated::Deprecated;
use heddle_semconv::group::{GroupType, InstrumentSpec, SpanKindSpec};
use heddle_semconv::stability::Stability;

/// The resolved groups of a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Registry {
    /// The id of the registry the groups were loaded from.
    pub registry_id: String,
    /// The resolved groups, in the deterministic load order.
    pub groups: Vec<Group>,
}

impl Registry {
    /// Looks up a group by id.
    #[must_use]
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }
}

/// A resolved group: the common header shared by every group kind, the
/// attribute closure as catalog references, and the kind-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Group {
    /// The id of the group.
    pub id: String,
    /// The effective type of the group.
    pub r#type: GroupType,
    /// A brief description of the group.
    pub brief: String,
    /// A more elaborate description of the group.
    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
    /// The stability of the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<Stability>,
    /// The deprecation status of the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
    /// References into the catalog for the group's attribute closure, in
    /// resolution order (parent attributes first, then local).
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRef>,
    /// The span kind, for span groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_kind: Option<SpanKindSpec>,
    /// The associated event group ids, for span groups.
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    /// The metric name, for metric groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    /// The instrument, for metric groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<InstrumentSpec>,
    /// The unit, for metric groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// The signal name, for events and resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The lineage of the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage: Option<GroupLineage>,
}
