// SPDX-License-Identifier: Apache-2.0

//! Attribute catalog builder and the table of referenceable attributes.

use std::collections::HashMap;

use heddle_resolved_schema::attribute::{Attribute, AttributeRef};
use heddle_resolved_schema::catalog::Catalog;
use heddle_semconv::attribute::AttributeSpec;
use heddle_semconv::registry::SpecRegistry;

/// Builds the deduplicated attribute catalog: identical resolved attributes
/// share a single [`AttributeRef`].
#[derive(Debug, Default)]
pub struct AttributeCatalog {
    catalog: Catalog,
    index: HashMap<Attribute, AttributeRef>,
}

impl AttributeCatalog {
    /// Returns the reference of the given resolved attribute, inserting it
    /// into the catalog on first sight.
    pub fn attribute_ref(&mut self, attribute: Attribute) -> AttributeRef {
        if let Some(existing) = self.index.get(&attribute) {
            return *existing;
        }
        let attr_ref = self.catalog.push(attribute.clone());
        let _ = self.index.insert(attribute, attr_ref);
        attr_ref
    }

    /// Consumes the builder and returns the catalog.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}

/// A referenceable attribute: a locally defined (non-ref) attribute of some
/// group, addressable as `<owner_group_id>.<attribute_id>`.
#[derive(Debug, Clone)]
pub struct RefTarget {
    /// The id of the defining group.
    pub group_id: String,
    /// The attribute id local to the defining group.
    pub local_id: String,
    /// The attribute built from the raw definition.
    pub attribute: Attribute,
}

/// Builds the table of referenceable attributes over the whole registry.
///
/// Only locally defined attributes can be referenced; an attribute a group
/// itself obtained through `ref` or `extends` is not re-exported under that
/// group's id.
#[must_use]
pub fn build_ref_table(registry: &SpecRegistry) -> HashMap<String, RefTarget> {
    let mut table = HashMap::new();
    for group in registry.groups() {
        for spec in &group.spec.attributes {
            if let AttributeSpec::Id {
                id,
                r#type,
                brief,
                examples,
                requirement_level,
                note,
                stability,
                deprecated,
            } = spec
            {
                let full_name = format!("{}.{}", group.spec.id, id);
                let _ = table.insert(
                    full_name.clone(),
                    RefTarget {
                        group_id: group.spec.id.clone(),
                        local_id: id.clone(),
                        attribute: Attribute {
                            name: full_name,
                            r#type: r#type.clone(),
                            brief: brief.clone(),
                            examples: examples.clone(),
                            requirement_level: requirement_level.clone(),
                            note: note.clone(),
                            stability: stability.clone(),
                            deprecated: deprecated.clone(),
                        },
                    },
                );
            }
        }
    }
    table
}
