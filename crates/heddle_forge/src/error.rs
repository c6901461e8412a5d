// SPDX-License-Identifier: Apache-2.0

//! Error types of the generation engine.

use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;

use heddle_common::error::{format_errors, HeddleError};

/// Errors emitted by this crate.
#[derive(thiserror::Error, Debug, Clone, Diagnostic, Serialize)]
#[non_exhaustive]
pub enum Error {
    /// Invalid target configuration file.
    #[error("Invalid config file `{config_file}`: {error}")]
    InvalidConfigFile {
        /// Config file.
        config_file: PathBuf,
        /// Error message.
        error: String,
    },

    /// Target not found under the templates root.
    #[error("Target `{target}` not found in `{root_path}`: {error}")]
    TargetNotSupported {
        /// Root path.
        root_path: String,
        /// Target name.
        target: String,
        /// Error message.
        error: String,
    },

    /// Invalid template file.
    #[error("Invalid template file `{template}`: {error}")]
    InvalidTemplateFile {
        /// Template path.
        template: PathBuf,
        /// Error message.
        error: String,
    },

    /// Error loading a file through the file loader.
    #[error("Error loading the file `{file}`: {error}")]
    FileLoaderError {
        /// File path.
        file: PathBuf,
        /// Error message.
        error: String,
    },

    /// Template compile or evaluation failure.
    #[error("Template `{template}`{} failed: {error}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    TemplateEvaluationFailed {
        /// Template path.
        template: PathBuf,
        /// The line of the failure when known.
        line: Option<usize>,
        /// Error message.
        error: String,
    },

    /// Filter parse, compile, or evaluation failure.
    #[error("Filter `{filter}` failed: {error}")]
    FilterError {
        /// The filter expression.
        filter: String,
        /// Error message.
        error: String,
    },

    /// The serialization of the rendering context failed.
    #[error("The serialization of the context failed: {error}")]
    ContextSerializationFailed {
        /// Error message.
        error: String,
    },

    /// The file name expression did not evaluate.
    #[error("Invalid file name expression `{file_name}`: {error}")]
    InvalidFilePath {
        /// The file name expression.
        file_name: String,
        /// Error message.
        error: String,
    },

    /// The computed output file name is empty.
    #[error("The template `{template}` produced an empty output file name")]
    EmptyFileName {
        /// Template path.
        template: PathBuf,
    },

    /// The computed output path escapes the output directory.
    #[error("The output path `{path}` escapes the output directory")]
    PathEscape {
        /// The offending path.
        path: PathBuf,
    },

    /// The output file already exists and `force` is not set, or the same
    /// path was produced twice in one run.
    #[error("The output file `{path}` already exists (use --force to overwrite)")]
    FileExists {
        /// The existing path.
        path: PathBuf,
    },

    /// Writing a generated file failed.
    #[error("Writing the generated file `{path}` failed: {error}")]
    WriteGeneratedCodeFailed {
        /// The target path.
        path: PathBuf,
        /// Error message.
        error: String,
    },

    /// An attribute reference does not exist in the catalog.
    #[error("Attribute reference {attr_ref} (group: {group_id}) not found in the catalog")]
    AttributeNotFound {
        /// Group id.
        group_id: String,
        /// Attribute reference index.
        attr_ref: u32,
    },

    /// The generation run was cancelled.
    #[error("The generation run was cancelled")]
    Cancelled,

    /// A generic container for multiple errors.
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
