// SPDX-License-Identifier: Apache-2.0

//! The run manifest: the record of every file produced by a generation run.

use std::path::PathBuf;

use serde::Serialize;

/// A single generated file.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    /// The template that produced the file.
    pub template: String,
    /// The path of the file, under the output directory.
    pub output_path: PathBuf,
    /// The size of the file in bytes.
    pub bytes: u64,
    /// The SHA-256 digest of the file content, hex encoded.
    pub sha256: String,
}

/// The manifest of a generation run. Entries are ordered by
/// `(template index, filter output index)`, which makes the manifest a
/// deterministic function of the run inputs.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RunManifest {
    /// The generated files, in deterministic order.
    pub files: Vec<GeneratedFile>,
}

impl RunManifest {
    /// The number of generated files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when the run produced no file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
