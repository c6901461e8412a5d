// SPDX-License-Identifier: Apache-2.0

//! The attribute catalog: a deduplicated arena of resolved attributes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, AttributeRef};

/// The deduplicated arena of resolved attributes. Groups reference entries
/// by [`AttributeRef`]; two identical attribute occurrences share one entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    /// All the attributes of the registry, in insertion order.
    pub attributes: Vec<Attribute>,
}

impl Catalog {
    /// Appends an attribute and returns its reference. Deduplication is the
    /// caller's concern (see the resolver's attribute catalog builder).
    pub fn push(&mut self, attribute: Attribute) -> AttributeRef {
        let index =
            u32::try_from(self.attributes.len()).expect("more than u32::MAX attributes");
        self.attributes.push(attribute);
        AttributeRef(index)
    }

    /// Returns the attribute behind a reference.
    #[must_use]
    pub fn attribute(&self, attr_ref: AttributeRef) -> Option<&Attribute> {
        self.attributes.get(attr_ref.0 as usize)
    }

    /// The number of distinct attributes in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true when the catalog holds no attribute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
