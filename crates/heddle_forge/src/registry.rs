// SPDX-License-Identifier: Apache-2.0

//! The template-facing view of a resolved registry: groups with their
//! attributes inlined, ready to be serialized into the rendering context.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use heddle_resolved_schema::attribute::Attribute;
use heddle_resolved_schema::lineage::GroupLineage;
use heddle_resolved_schema::registry::Group;
use heddle_resolved_schema::ResolvedRegistry;
use heddle_semconv::deprecated::Deprecated;
use heddle_semconv::group::{GroupType, InstrumentSpec, SpanKindSpec};
use heddle_semconv::stability::Stability;

/// A resolved registry with catalog references replaced by the attributes
/// themselves. This is the shape filters and templates see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRegistry {
    /// The id of the registry.
    pub registry_id: String,
    /// The groups of the registry with inlined attributes.
    pub groups: Vec<TemplateGroup>,
}

/// A group with its attribute closure inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateGroup {
    /// The id of the group.
    pub id: String,
    /// The type of the group.
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
    /// The attribute closure of the group.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
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

impl TemplateRegistry {
    /// Builds the template-facing view from a resolved registry.
    ///
    /// # Errors
    ///
    /// Returns an error when a group references an attribute missing from
    /// the catalog.
    pub fn try_from_resolved(resolved: &ResolvedRegistry) -> Result<Self, Error> {
        let groups = resolved
            .registry
            .groups
            .iter()
            .map(|group| try_inline_group(resolved, group))
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(TemplateRegistry {
            registry_id: resolved.registry.registry_id.clone(),
            groups,
        })
    }
}

fn try_inline_group(resolved: &ResolvedRegistry, group: &Group) -> Result<TemplateGroup, Error> {
    let attributes = group
        .attributes
        .iter()
        .map(|attr_ref| {
            resolved
                .catalog
                .attribute(*attr_ref)
                .cloned()
                .ok_or(Error::AttributeNotFound {
                    group_id: group.id.clone(),
                    attr_ref: attr_ref.0,
                })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(TemplateGroup {
        id: group.id.clone(),
        r#type: group.r#type,
        brief: group.brief.clone(),
        note: group.note.clone(),
        stability: group.stability.clone(),
        deprecated: group.deprecated.clone(),
        attributes,
        span_kind: group.span_kind,
        events: group.events.clone(),
        metric_name: group.metric_name.clone(),
        instrument: group.instrument,
        unit: group.unit.clone(),
        name: group.name.clone(),
        lineage: group.lineage.clone(),
    })
}
