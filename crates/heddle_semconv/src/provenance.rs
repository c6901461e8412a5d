// SPDX-License-Identifier: Apache-2.0

//! The provenance of a semantic convention specification file.

use std::fmt::Display;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifies where a group was defined: the registry it belongs to and the
/// path of the specification file, relative to the registry root.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Provenance {
    /// The registry id containing the specification file.
    pub registry_id: Arc<str>,

    /// The path to the specification file, relative to the registry root.
    pub path: String,
}

impl Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.registry_id, self.path)
    }
}

impl Provenance {
    /// Creates a new `Provenance` instance.
    #[must_use]
    pub fn new(registry_id: &str, path: &str) -> Self {
        Provenance {
            registry_id: Arc::from(registry_id),
            path: path.to_owned(),
        }
    }

    /// Creates an undefined `Provenance`, used for synthetic groups in tests.
    #[must_use]
    pub fn undefined() -> Self {
        Provenance {
            registry_id: Arc::from("undefined"),
            path: "undefined".to_owned(),
        }
    }
}
