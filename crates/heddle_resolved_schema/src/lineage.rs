// SPDX-License-Identifier: Apache-2.0

//! Lineage of resolved groups: where each group and attribute came from and
//! which fields were inherited rather than locally set.

use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use heddle_semconv::provenance::Provenance;

/// Lineage of a single resolved attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttributeLineage {
    /// The id of the group defining the attribute.
    pub source_group: String,
    /// The names of the fields taken from the source definition because the
    /// local declaration did not set them. Empty when the attribute was not
    /// locally re-declared.
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub inherited_fields: BTreeSet<String>,
}

impl AttributeLineage {
    /// Creates a lineage entry for an attribute defined by `source_group`
    /// with no inherited fields.
    #[must_use]
    pub fn new(source_group: &str) -> Self {
        Self {
            source_group: source_group.to_owned(),
            inherited_fields: BTreeSet::new(),
        }
    }

    /// Records that the named field was inherited from the source definition.
    pub fn inherit(&mut self, field: &str) {
        let _ = self.inherited_fields.insert(field.to_owned());
    }
}

/// Lineage of a resolved group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[must_use]
pub struct GroupLineage {
    /// The provenance of the group.
    provenance: Provenance,
    /// Per-attribute lineage, keyed by the attribute id local to the group.
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, AttributeLineage>,
}

impl GroupLineage {
    /// Creates a new group lineage.
    pub fn new(provenance: Provenance) -> Self {
        Self {
            provenance,
            attributes: BTreeMap::new(),
        }
    }

    /// Records the lineage of an attribute of the group.
    pub fn add_attribute_lineage(&mut self, local_id: String, lineage: AttributeLineage) {
        let _ = self.attributes.insert(local_id, lineage);
    }

    /// Returns the provenance of the group.
    #[must_use]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Returns the lineage of the given attribute, if recorded.
    #[must_use]
    pub fn attribute(&self, local_id: &str) -> Option<&AttributeLineage> {
        self.attributes.get(local_id)
    }

    /// Returns true if the group records lineage for the given attribute.
    #[must_use]
    pub fn has_attribute(&self, local_id: &str) -> bool {
        self.attributes.contains_key(local_id)
    }

    /// Iterates over the per-attribute lineage entries.
    pub fn attributes(&self) -> impl Iterator<Item = (&String, &AttributeLineage)> {
        self.attributes.iter()
    }
}
