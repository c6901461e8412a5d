// SPDX-License-Identifier: Apache-2.0

//! Resolution of a loaded registry: expansion of `extends` clauses,
//! resolution of attribute references, cycle detection, and construction of
//! the attribute closure of every group.
//!
//! The resolver runs once per generation run; its output is immutable and
//! shared read-only with the rendering and validation stages.

use std::collections::HashMap;

use miette::Diagnostic;
use serde::Serialize;

use heddle_common::error::{format_errors, HeddleError};
use heddle_resolved_schema::registry::{Group, Registry};
use heddle_resolved_schema::ResolvedRegistry;
use heddle_semconv::provenance::Provenance;
use heddle_semconv::registry::SpecRegistry;

use crate::attribute::AttributeCatalog;
use crate::registry::ResolvedAttributeEntry;

pub mod attribute;
mod extends;
mod registry;

/// Errors emitted by the resolution process. All of them are fatal: a
/// registry that does not resolve cannot be rendered.
#[derive(thiserror::Error, Debug, Clone, Diagnostic, Serialize)]
#[non_exhaustive]
pub enum Error {
    /// An `extends` clause cites a group that does not exist.
    #[error("The group `{group_id}` ({provenance}) extends `{extends}` which does not exist")]
    UnresolvedExtends {
        /// The group carrying the dangling clause.
        group_id: String,
        /// The cited parent id.
        extends: String,
        /// Where the group was defined.
        provenance: Provenance,
    },

    /// The `extends` graph contains a cycle.
    #[error("The extends clauses form a cycle: {}", .cycle.join(" -> "))]
    ExtendsCycle {
        /// The ids of every group on the cycle.
        cycle: Vec<String>,
    },

    /// A `ref` attribute cites an attribute that does not exist.
    #[error("The group `{group_id}` ({provenance}) references the attribute `{attribute_ref}` which does not exist")]
    UnresolvedRef {
        /// The group carrying the dangling reference.
        group_id: String,
        /// The cited attribute, `<owner_group_id>.<attribute_id>`.
        attribute_ref: String,
        /// Where the group was defined.
        provenance: Provenance,
    },

    /// The attribute closure of a group contains the same attribute id twice.
    #[error("The group `{group_id}` ends up with two attributes named `{attribute_id}` after resolution")]
    DuplicateAttributeId {
        /// The group id.
        group_id: String,
        /// The duplicated attribute id.
        attribute_id: String,
    },

    /// The same group id is defined more than once.
    #[error("The group `{group_id}` is defined more than once")]
    DuplicateGroupId {
        /// The duplicated group id.
        group_id: String,
    },

    /// A container for multiple errors.
    #[error("{}", format_errors(.0))]
    CompoundError(Vec<Error>),
}

impl HeddleError<Error> for Error {
    fn compound(errors: Vec<Error>) -> Error {
        Error::CompoundError(
            errors
                .into_iter()
                .flat_map(|e| match e {
                    Error::CompoundError(errs) => errs,
                    e => vec![e],
                })
                .collect(),
        )
    }

    fn errors(&self) -> Vec<String> {
        match self {
            Error::CompoundError(errors) => errors.iter().flat_map(|e| e.errors()).collect(),
            _ => vec![self.to_string()],
        }
    }
}

fn compound_or_single(mut errors: Vec<Error>) -> Error {
    if errors.len() == 1 {
        errors.remove(0)
    } else {
        Error::compound(errors)
    }
}

/// Resolves a loaded registry into its immutable resolved form.
///
/// The process, in order: build the symbol table, topologically order groups
/// over `extends` edges (cycles are fatal and name every participant),
/// expand each group's attribute closure parent-first, resolve `ref`
/// attributes against the table of defined attributes, and deduplicate the
/// resolved attributes into the catalog.
///
/// # Errors
///
/// Returns a (possibly compound) fatal error when any reference or extends
/// clause does not resolve, when the extends graph is cyclic, or when a
/// group's closure ends up with duplicate attribute ids.
pub fn resolve_registry(spec_registry: &SpecRegistry) -> Result<ResolvedRegistry, Error> {
    let groups: Vec<_> = spec_registry.groups().collect();
    let n = groups.len();

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
    let mut errors = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if index.insert(group.spec.id.as_str(), i).is_some() {
            errors.push(Error::DuplicateGroupId {
                group_id: group.spec.id.clone(),
            });
        }
    }

    let ids: Vec<&str> = groups.iter().map(|g| g.spec.id.as_str()).collect();
    let parents: Vec<Option<usize>> = groups
        .iter()
        .map(|g| match &g.spec.extends {
            Some(parent_id) => match index.get(parent_id.as_str()) {
                Some(parent) => Some(*parent),
                None => {
                    errors.push(Error::UnresolvedExtends {
                        group_id: g.spec.id.clone(),
                        extends: parent_id.clone(),
                        provenance: g.provenance.clone(),
                    });
                    None
                }
            },
            None => None,
        })
        .collect();
    if !errors.is_empty() {
        return Err(compound_or_single(errors));
    }

    let order = extends::topo_order(&ids, &parents)?;
    let ref_table = attribute::build_ref_table(spec_registry);

    let mut catalog = AttributeCatalog::default();
    let mut resolved_entries: Vec<Option<Vec<ResolvedAttributeEntry>>> = vec![None; n];
    let mut resolved_groups: Vec<Option<Group>> = vec![None; n];
    for idx in order {
        let group = groups[idx];
        let parent_group: Option<Group> = parents[idx].map(|p| {
            resolved_groups[p]
                .clone()
                .expect("parents are resolved before their children")
        });
        let parent_entries: Option<Vec<ResolvedAttributeEntry>> = parents[idx].map(|p| {
            resolved_entries[p]
                .clone()
                .expect("parents are resolved before their children")
        });
        let entries = registry::resolve_group_attributes(
            group,
            parent_entries.as_deref(),
            &ref_table,
            &mut errors,
        );
        let resolved =
            registry::build_group(group, parent_group.as_ref(), &entries, &mut catalog);
        resolved_entries[idx] = Some(entries);
        resolved_groups[idx] = Some(resolved);
    }
    if !errors.is_empty() {
        return Err(compound_or_single(errors));
    }

    Ok(ResolvedRegistry {
        registry: Registry {
            registry_id: spec_registry.id().to_owned(),
            groups: resolved_groups
                .into_iter()
                .map(|g| g.expect("every group is resolved"))
                .collect(),
        },
        catalog: catalog.into_catalog(),
    })
}
