// SPDX-License-Identifier: Apache-2.0

//! A trait implemented by every error type of the workspace, plus helpers to
//! collapse lists of errors into compound errors.

use std::error::Error;

use miette::Diagnostic;
use serde::Serialize;

/// A workspace error. Every crate-level error enum implements this trait so
/// that errors can be aggregated and reported uniformly.
pub trait HeddleError<E> {
    /// Constructs a single compound error from a list of errors.
    /// Implementations are expected to flatten nested compound errors.
    fn compound(errors: Vec<E>) -> E;

    /// Returns the individual error messages carried by this error.
    fn errors(&self) -> Vec<String>;
}

/// Collapses a list of errors into `Ok(())` when the list is empty, or a
/// single compound error otherwise.
///
/// # Errors
///
/// Returns a compound error when `errors` is non-empty.
pub fn handle_errors<E>(errors: Vec<E>) -> Result<(), E>
where
    E: HeddleError<E> + Error + Diagnostic + Serialize + Send + Sync,
{
    if errors.is_empty() {
        Ok(())
    } else {
        Err(E::compound(errors))
    }
}

/// Formats a list of errors, one per line, used by the `CompoundError`
/// `Display` implementations across the workspace.
pub fn format_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
