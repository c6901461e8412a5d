// SPDX-License-Identifier: Apache-2.0

//! Result type supporting both non-fatal errors (NFEs) and fatal errors.
//!
//! NFEs do not prevent the surrounding operation from completing; they are
//! accumulated alongside the result and either reported as warnings or
//! escalated into a fatal compound error at the caller's discretion.

use std::error::Error;

use miette::Diagnostic;
use serde::Serialize;

use crate::diagnostic::{DiagnosticMessage, DiagnosticMessages};
use crate::error::HeddleError;

/// Result of an operation that may succeed while still carrying non-fatal
/// errors.
#[must_use]
pub enum WResult<T, E> {
    /// The operation succeeded; the result is returned along with any
    /// non-fatal errors collected on the way.
    Ok(T, Vec<E>),
    /// The operation failed with a fatal error.
    Err(E),
}

impl<T, E> WResult<T, E>
where
    E: HeddleError<E> + Error + Diagnostic + Serialize + Send + Sync + 'static,
{
    /// Creates a new [`WResult`] with the given result and non-fatal errors.
    pub fn with_non_fatal_errors(result: T, non_fatal_errors: Vec<E>) -> Self {
        WResult::Ok(result, non_fatal_errors)
    }

    /// Creates a new [`WResult`] holding a fatal error.
    pub fn with_fatal_error(error: E) -> Self {
        WResult::Err(error)
    }

    /// Maps the success value, leaving non-fatal errors untouched.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> WResult<U, E> {
        match self {
            WResult::Ok(result, nfes) => WResult::Ok(f(result), nfes),
            WResult::Err(e) => WResult::Err(e),
        }
    }

    /// Converts into a standard `Result`, moving all non-fatal errors into
    /// the provided accumulator.
    ///
    /// # Errors
    ///
    /// Returns the fatal error, if any.
    pub fn capture_non_fatal_errors(
        self,
        accumulator: &mut Vec<DiagnosticMessage>,
    ) -> Result<T, E> {
        match self {
            WResult::Ok(result, nfes) => {
                accumulator.extend(nfes.into_iter().map(DiagnosticMessage::new));
                Ok(result)
            }
            WResult::Err(fatal) => Err(fatal),
        }
    }

    /// Moves warning-severity NFEs into `diag_msgs` and keeps the rest.
    pub fn capture_warnings(self, diag_msgs: &mut DiagnosticMessages) -> WResult<T, E> {
        if let WResult::Ok(result, nfes) = self {
            let (warnings, errors): (Vec<_>, Vec<_>) = nfes
                .into_iter()
                .partition(|e| matches!(e.severity(), Some(miette::Severity::Warning)));
            diag_msgs.extend_from_vec(warnings.into_iter().map(DiagnosticMessage::new).collect());
            WResult::Ok(result, errors)
        } else {
            self
        }
    }

    /// Drops warning-severity NFEs.
    pub fn ignore_warnings(self) -> WResult<T, E> {
        match self {
            WResult::Ok(result, nfes) => {
                let errors = nfes
                    .into_iter()
                    .filter(|e| !matches!(e.severity(), Some(miette::Severity::Warning)))
                    .collect();
                WResult::Ok(result, errors)
            }
            WResult::Err(e) => WResult::Err(e),
        }
    }

    /// Converts into a standard `Result`, failing when any non-fatal error
    /// remains by aggregating them into a single compound error.
    ///
    /// # Errors
    ///
    /// Returns the fatal error or a compound of the remaining NFEs.
    pub fn into_result_failing_non_fatal(self) -> Result<T, E> {
        match self {
            WResult::Ok(result, errors) => {
                if errors.is_empty() {
                    Ok(result)
                } else {
                    Err(E::compound(errors))
                }
            }
            WResult::Err(e) => Err(e),
        }
    }

    /// Converts into a standard `Result` carrying the result alongside any
    /// non-fatal errors.
    ///
    /// # Errors
    ///
    /// Returns the fatal error, if any.
    pub fn into_result_with_non_fatal(self) -> Result<(T, Vec<E>), E> {
        match self {
            WResult::Ok(result, errors) => Ok((result, errors)),
            WResult::Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::format_errors;

    #[derive(thiserror::Error, Debug, Clone, Diagnostic, Serialize)]
    enum TestError {
        #[error("fatal")]
        Fatal,
        #[diagnostic(severity(Warning))]
        #[error("warning")]
        Warning,
        #[error("{}", format_errors(.0))]
        Compound(Vec<TestError>),
    }

    impl HeddleError<TestError> for TestError {
        fn compound(errors: Vec<TestError>) -> TestError {
            TestError::Compound(errors)
        }
        fn errors(&self) -> Vec<String> {
            match self {
                TestError::Compound(errs) => errs.iter().flat_map(|e| e.errors()).collect(),
                e => vec![e.to_string()],
            }
        }
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let result: WResult<i32, TestError> =
            WResult::with_non_fatal_errors(7, vec![TestError::Warning]);
        let mut diags = DiagnosticMessages::empty();
        let result = result.capture_warnings(&mut diags);
        assert_eq!(diags.len(), 1);
        assert_eq!(result.into_result_failing_non_fatal().ok(), Some(7));
    }

    #[test]
    fn test_non_fatal_errors_fail_on_demand() {
        let result: WResult<i32, TestError> =
            WResult::with_non_fatal_errors(7, vec![TestError::Fatal]);
        assert!(result.into_result_failing_non_fatal().is_err());
    }
}
