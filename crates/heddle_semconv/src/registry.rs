// SPDX-License-Identifier: Apache-2.0

//! Loader accumulating the groups of every specification file found under a
//! registry root.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::group::{GroupSpec, GroupSpecWithProvenance};
use crate::manifest::{RegistryManifest, REGISTRY_MANIFEST};
use crate::provenance::Provenance;
use crate::Error;
use heddle_common::result::WResult;

/// The content of a single specification file: a top-level `groups` list.
#[derive(Debug, Clone, Deserialize)]
struct SpecFile {
    #[serde(default)]
    groups: Vec<GroupSpec>,
}

/// Per-registry statistics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RegistryStats {
    /// Number of groups in the registry.
    pub group_count: usize,
    /// Number of attribute mentions across all groups.
    pub attribute_count: usize,
    /// Number of groups per group type.
    pub group_type_histogram: BTreeMap<String, usize>,
}

/// A loaded, unresolved registry: the groups of every specification file
/// found under the registry root, each stamped with its provenance.
#[derive(Debug, Clone)]
pub struct SpecRegistry {
    id: Arc<str>,
    groups: Vec<GroupSpecWithProvenance>,
}

impl SpecRegistry {
    /// Loads every `.yaml`/`.yml` file under `root` (any depth) into a
    /// registry. Files are visited in lexical path order so that provenance
    /// is deterministic; nothing else depends on the order.
    ///
    /// Non-fatal errors (including all warnings from the static checks) are
    /// accumulated; unreadable or unparsable files are fatal.
    pub fn try_from_path(registry_id: &str, root: &Path) -> WResult<Self, Error> {
        let manifest = match RegistryManifest::try_from_registry_root(root) {
            Ok(m) => m,
            Err(e) => return WResult::with_fatal_error(e),
        };
        let id: Arc<str> = match &manifest {
            Some(m) => Arc::from(m.name.as_str()),
            None => Arc::from(registry_id),
        };

        let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| {
                let ext = p.extension().and_then(|e| e.to_str()).unwrap_or_default();
                let is_manifest =
                    p.file_name().and_then(|n| n.to_str()) == Some(REGISTRY_MANIFEST);
                (ext == "yaml" || ext == "yml") && !is_manifest
            })
            .collect();
        paths.sort();

        let mut non_fatal = vec![];
        let mut groups = Vec::new();
        for path in paths {
            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();
            let provenance = Provenance {
                registry_id: id.clone(),
                path: rel,
            };
            match load_spec_file(&path, &provenance, &mut non_fatal) {
                Ok(specs) => groups.extend(specs),
                Err(e) => return WResult::with_fatal_error(e),
            }
        }

        let registry = SpecRegistry { id, groups };
        registry.check_duplicate_group_ids(&mut non_fatal);
        for group in &registry.groups {
            match group
                .spec
                .validate(&group.provenance)
                .into_result_with_non_fatal()
            {
                Ok(((), nfes)) => non_fatal.extend(nfes),
                Err(fatal) => return WResult::with_fatal_error(fatal),
            }
        }

        WResult::with_non_fatal_errors(registry, non_fatal)
    }

    /// Builds a registry from already-parsed groups. Used by tests and by
    /// callers that synthesize registries programmatically.
    pub fn from_groups(
        registry_id: &str,
        groups: impl IntoIterator<Item = GroupSpecWithProvenance>,
    ) -> Self {
        SpecRegistry {
            id: Arc::from(registry_id),
            groups: groups.into_iter().collect(),
        }
    }

    /// The registry id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Iterates over the groups of the registry, in load order.
    pub fn groups(&self) -> impl Iterator<Item = &GroupSpecWithProvenance> {
        self.groups.iter()
    }

    /// The number of groups in the registry.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Computes group/attribute counts and the group type histogram.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let mut histogram: BTreeMap<String, usize> = BTreeMap::new();
        let mut attribute_count = 0;
        for group in &self.groups {
            *histogram
                .entry(group.spec.group_type().to_string())
                .or_default() += 1;
            attribute_count += group.spec.attributes.len();
        }
        RegistryStats {
            group_count: self.groups.len(),
            attribute_count,
            group_type_histogram: histogram,
        }
    }

    fn check_duplicate_group_ids(&self, errors: &mut Vec<Error>) {
        let mut seen: HashMap<&str, &Provenance> = HashMap::new();
        for group in &self.groups {
            match seen.entry(group.spec.id.as_str()) {
                Entry::Vacant(entry) => {
                    let _ = entry.insert(&group.provenance);
                }
                Entry::Occupied(entry) => errors.push(Error::DuplicateGroupId {
                    id: group.spec.id.clone(),
                    first: (*entry.get()).clone(),
                    second: group.provenance.clone(),
                }),
            }
        }
    }
}

fn load_spec_file(
    path: &Path,
    provenance: &Provenance,
    non_fatal: &mut Vec<Error>,
) -> Result<Vec<GroupSpecWithProvenance>, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::InvalidSpecFile {
        path: path.to_path_buf(),
        line: None,
        error: e.to_string(),
    })?;

    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| Error::InvalidSpecFile {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            error: e.to_string(),
        })?;

    // Unknown top-level keys are tolerated with a warning; groups themselves
    // are parsed strictly.
    if let serde_yaml::Value::Mapping(mapping) = &value {
        for key in mapping.keys() {
            if let serde_yaml::Value::String(key) = key {
                if key != "groups" {
                    non_fatal.push(Error::UnknownTopLevelKey {
                        path: path.to_path_buf(),
                        key: key.clone(),
                    });
                }
            }
        }
    }

    let spec: SpecFile = serde_yaml::from_value(value).map_err(|e| Error::InvalidSpecFile {
        path: path.to_path_buf(),
        line: e.location().map(|l| l.line()),
        error: e.to_string(),
    })?;

    Ok(spec
        .groups
        .into_iter()
        .map(|spec| GroupSpecWithProvenance {
            spec,
            provenance: provenance.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_sorted_and_stamped() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "b/span.yaml",
            "groups:\n  - id: demo.op\n    type: span\n    span_kind: server\n    brief: Op.\n    attributes:\n      - id: x\n        type: string\n        brief: X.\n        requirement_level: required\n        examples: x\n",
        );
        write(
            dir.path(),
            "a/common.yml",
            "groups:\n  - id: demo.common\n    type: attribute_group\n    brief: Common.\n    attributes:\n      - id: y\n        type: int\n        brief: Y.\n",
        );

        let registry = SpecRegistry::try_from_path("default", dir.path())
            .into_result_failing_non_fatal()
            .unwrap();
        let ids: Vec<_> = registry.groups().map(|g| g.spec.id.clone()).collect();
        // Lexical file order: a/common.yml before b/span.yaml.
        assert_eq!(ids, vec!["demo.common", "demo.op"]);
        assert_eq!(
            registry.groups().next().unwrap().provenance.path,
            "a/common.yml"
        );
    }

    #[test]
    fn test_unknown_top_level_key_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "r.yaml",
            "version: 3\ngroups:\n  - id: g\n    type: attribute_group\n    brief: G.\n    attributes:\n      - id: a\n        type: int\n        brief: A.\n",
        );
        let (_, nfes) = SpecRegistry::try_from_path("default", dir.path())
            .into_result_with_non_fatal()
            .unwrap();
        assert!(nfes
            .iter()
            .any(|e| matches!(e, Error::UnknownTopLevelKey { key, .. } if key == "version")));
    }

    #[test]
    fn test_duplicate_group_id_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let group = "groups:\n  - id: g\n    type: attribute_group\n    brief: G.\n    attributes:\n      - id: a\n        type: int\n        brief: A.\n";
        write(dir.path(), "one.yaml", group);
        write(dir.path(), "two.yaml", group);
        let result = SpecRegistry::try_from_path("default", dir.path())
            .ignore_warnings()
            .into_result_failing_non_fatal();
        let err = result.expect_err("duplicate group ids must fail");
        assert!(err
            .to_string()
            .contains("is defined in both `default:one.yaml` and `default:two.yaml`"));
    }

    #[test]
    fn test_parse_error_carries_location() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.yaml", "groups:\n  - id: [\n");
        let result = SpecRegistry::try_from_path("default", dir.path())
            .into_result_failing_non_fatal();
        assert!(matches!(
            result,
            Err(Error::InvalidSpecFile { line: Some(_), .. })
        ));
    }

    #[test]
    fn test_manifest_overrides_registry_id() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), REGISTRY_MANIFEST, "name: acme\n");
        write(
            dir.path(),
            "r.yaml",
            "groups:\n  - id: g\n    type: attribute_group\n    brief: G.\n    attributes:\n      - id: a\n        type: int\n        brief: A.\n",
        );
        let registry = SpecRegistry::try_from_path("default", dir.path())
            .into_result_failing_non_fatal()
            .unwrap();
        assert_eq!(registry.id(), "acme");
    }

    #[test]
    fn test_empty_registry_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let registry = SpecRegistry::try_from_path("default", dir.path())
            .into_result_failing_non_fatal()
            .unwrap();
        assert_eq!(registry.group_count(), 0);
    }
}
