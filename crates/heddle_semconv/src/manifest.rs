// SPDX-License-Identifier: Apache-2.0

//! Optional registry manifest (`registry_manifest.yaml`) describing the
//! registry itself.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The file name of the registry manifest, looked up at the registry root.
pub const REGISTRY_MANIFEST: &str = "registry_manifest.yaml";

/// Registry-level metadata. When present, `name` becomes the registry id
/// recorded in every group's provenance.
#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
pub struct RegistryManifest {
    /// The name of the registry, used as registry id.
    pub name: String,
    /// An optional description of the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// An optional version of the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semconv_version: Option<String>,
}

impl RegistryManifest {
    /// Loads the manifest at the registry root, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error when a manifest file exists but cannot be parsed.
    pub fn try_from_registry_root(root: &Path) -> Result<Option<Self>, Error> {
        let path = root.join(REGISTRY_MANIFEST);
        if !path.is_file() {
            return Ok(None);
        }
        let content =
            std::fs::read_to_string(&path).map_err(|e| Error::InvalidRegistryManifest {
                path: path.clone(),
                error: e.to_string(),
            })?;
        serde_yaml::from_str(&content)
            .map(Some)
            .map_err(|e| Error::InvalidRegistryManifest {
                path,
                error: e.to_string(),
            })
    }
}
