// SPDX-License-Identifier: Apache-2.0

//! Data model and loader for semantic convention registries.
//!
//! A registry is an unordered collection of groups parsed from the YAML files
//! found under a registry root directory. This crate owns the raw
//! specification model ([`group::GroupSpec`], [`attribute::AttributeSpec`]),
//! the loader ([`registry::SpecRegistry`]), and the static well-formedness
//! checks applied before resolution.

use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;

use heddle_common::error::{format_errors, HeddleError};
use crate::provenance::Provenance;

pub mod attribute;
pub mod deprecated;
pub mod group;
pub mod manifest;
pub mod provenance;
pub mod registry;
pub mod stability;

/// Errors emitted while loading and validating a registry.
#[derive(thiserror::Error, Debug, Clone, Diagnostic, Serialize)]
#[non_exhaustive]
pub enum Error {
    /// A specification file could not be read or parsed.
    #[error("Invalid registry file `{path}`{}: {error}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    InvalidSpecFile {
        /// The path of the offending file.
        path: PathBuf,
        /// The line of the parse failure when known.
        line: Option<usize>,
        /// The cause of the failure.
        error: String,
    },

    /// The registry manifest could not be parsed.
    #[error("Invalid registry manifest `{path}`: {error}")]
    InvalidRegistryManifest {
        /// The path of the manifest file.
        path: PathBuf,
        /// The cause of the failure.
        error: String,
    },

    /// The same group id is defined in more than one file.
    #[error("The group `{id}` is defined in both `{first}` and `{second}`")]
    DuplicateGroupId {
        /// The duplicated group id.
        id: String,
        /// Where the group was first defined.
        first: Provenance,
        /// Where the group was defined again.
        second: Provenance,
    },

    /// A specification file carries a top-level key the loader does not know.
    #[diagnostic(severity(Warning))]
    #[error("Unknown top-level key `{key}` in `{path}`; the key is ignored")]
    UnknownTopLevelKey {
        /// The path of the file.
        path: PathBuf,
        /// The unknown key.
        key: String,
    },

    /// A group does not declare its type.
    #[diagnostic(severity(Warning), help("declare an explicit `type`; `span` is assumed"))]
    #[error("The group `{group_id}` ({provenance}) does not declare a type, defaulting to `span`")]
    MissingGroupType {
        /// The provenance of the group.
        provenance: Provenance,
        /// The group id.
        group_id: String,
    },

    /// A group is declared under the reserved `otel.` namespace.
    #[diagnostic(severity(Warning))]
    #[error("The group `{group_id}` ({provenance}) is under the reserved `otel.` namespace")]
    ReservedNamespace {
        /// The provenance of the group.
        provenance: Provenance,
        /// The group id.
        group_id: String,
    },

    /// A stability value is outside the known domain.
    #[diagnostic(severity(Warning))]
    #[error("Unknown stability value on `{id}` ({provenance})")]
    UnknownStability {
        /// The provenance of the enclosing group.
        provenance: Provenance,
        /// The group or attribute id carrying the unknown stability.
        id: String,
    },

    /// A group is malformed.
    #[error("Invalid group `{group_id}` ({provenance}): {error}")]
    InvalidGroup {
        /// The provenance of the group.
        provenance: Provenance,
        /// The group id.
        group_id: String,
        /// What is wrong with it.
        error: String,
    },

    /// A metric group is missing one of its mandatory fields.
    #[error("Invalid metric `{group_id}` ({provenance}): {error}")]
    InvalidMetric {
        /// The provenance of the group.
        provenance: Provenance,
        /// The group id.
        group_id: String,
        /// What is wrong with it.
        error: String,
    },

    /// An attribute is malformed.
    #[error("Invalid attribute `{attribute_id}` in group `{group_id}` ({provenance}): {error}")]
    InvalidAttribute {
        /// The provenance of the enclosing group.
        provenance: Provenance,
        /// The group id.
        group_id: String,
        /// The attribute id.
        attribute_id: String,
        /// What is wrong with it.
        error: String,
    },

    /// A non-blocking attribute issue.
    #[diagnostic(severity(Warning))]
    #[error("Attribute `{attribute_id}` in group `{group_id}` ({provenance}): {error}")]
    InvalidAttributeWarning {
        /// The provenance of the enclosing group.
        provenance: Provenance,
        /// The group id.
        group_id: String,
        /// The attribute id.
        attribute_id: String,
        /// What is odd about it.
        error: String,
    },

    /// Example values do not match the declared attribute type.
    #[diagnostic(severity(Warning))]
    #[error("Examples of attribute `{attribute_id}` in group `{group_id}` ({provenance}): {error}")]
    InvalidExampleWarning {
        /// The provenance of the enclosing group.
        provenance: Provenance,
        /// The group id.
        group_id: String,
        /// The attribute id.
        attribute_id: String,
        /// What is odd about them.
        error: String,
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
