// SPDX-License-Identifier: Apache-2.0

//! Span-based artifact validation.
//!
//! After generation, the spans captured from a smoke execution of the
//! generated artifacts are compared against the span groups the registry
//! declares: every matched span must carry the group's required attributes.
//! The comparison produces a health score and a per-group findings report;
//! it never fails the build by itself.

use miette::Diagnostic;
use serde::Serialize;

use heddle_common::error::{format_errors, HeddleError};

pub mod checker;
pub mod ingester;
pub mod sample;

/// Errors of the span-check subsystem.
#[derive(thiserror::Error, Debug, Clone, Diagnostic, Serialize)]
#[non_exhaustive]
pub enum Error {
    /// Reading or parsing the span capture failed.
    #[error("Failed to ingest the span capture: {error}")]
    IngestError {
        /// The cause of the failure.
        error: String,
    },

    /// Writing the report failed.
    #[error("Failed to write the span-check report: {error}")]
    OutputError {
        /// The cause of the failure.
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

/// Ingesters produce an iterator of samples from some source.
pub trait Ingester<T> {
    /// Ingests the source and returns an iterator over the samples.
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot be read or parsed.
    fn ingest(&self) -> Result<Box<dyn Iterator<Item = T>>, Error>;
}
