// SPDX-License-Identifier: Apache-2.0

//! Serializable diagnostic messages decoupling library errors from the
//! reporting surface (console or JSON).

use std::error::Error;

use miette::{Diagnostic, Severity};
use serde::Serialize;

/// A serializable representation of a single diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticMessage {
    /// The structured error this diagnostic was built from.
    pub(crate) error: serde_json::Value,
    /// The rendered diagnostic message.
    pub message: String,
    /// An optional diagnostic code (Rust-path style, e.g. `resolver::cycle`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Diagnostic severity; absent means error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Additional help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl DiagnosticMessage {
    /// Creates a diagnostic message from any serializable diagnostic error.
    pub fn new<E: Error + Diagnostic + Serialize + Send + Sync + 'static>(error: E) -> Self {
        let json_error = serde_json::to_value(&error).unwrap_or(serde_json::Value::Null);
        Self {
            message: error.to_string(),
            code: error.code().map(|c| c.to_string()),
            severity: error.severity(),
            help: error.help().map(|h| h.to_string()),
            error: json_error,
        }
    }

    /// Returns true if this diagnostic is a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity == Some(Severity::Warning)
    }
}

/// An ordered list of diagnostic messages.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DiagnosticMessages(Vec<DiagnosticMessage>);

impl From<DiagnosticMessage> for DiagnosticMessages {
    fn from(value: DiagnosticMessage) -> Self {
        Self(vec![value])
    }
}

impl DiagnosticMessages {
    /// Creates an empty list of diagnostic messages.
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Creates a list of diagnostic messages from a list of errors.
    pub fn from_errors<E: Error + Diagnostic + Serialize + Send + Sync + 'static>(
        errors: Vec<E>,
    ) -> Self {
        Self(errors.into_iter().map(DiagnosticMessage::new).collect())
    }

    /// Creates a list containing a single diagnostic message built from the
    /// given error.
    pub fn from_error<E: Error + Diagnostic + Serialize + Send + Sync + 'static>(error: E) -> Self {
        Self(vec![DiagnosticMessage::new(error)])
    }

    /// Appends all the messages of `other`.
    pub fn extend(&mut self, other: DiagnosticMessages) {
        self.0.extend(other.0);
    }

    /// Appends a vector of diagnostic messages.
    pub fn extend_from_vec(&mut self, msgs: Vec<DiagnosticMessage>) {
        self.0.extend(msgs);
    }

    /// Returns the number of diagnostic messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if at least one message has error severity.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.0.iter().any(|m| !m.is_warning())
    }

    /// Logs every message through the `log` facade, warnings as warnings and
    /// everything else as errors.
    pub fn log(&self) {
        for msg in &self.0 {
            if msg.is_warning() {
                log::warn!("{}", msg.message);
            } else {
                log::error!("{}", msg.message);
            }
        }
    }

    /// Consumes the list and returns the underlying messages.
    #[must_use]
    pub fn into_inner(self) -> Vec<DiagnosticMessage> {
        self.0
    }
}

/// The outcome of the registry validation pass, split into hard errors and
/// warnings. Serialized as the `check` report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Diagnostics that abort the run.
    pub errors: Vec<DiagnosticMessage>,
    /// Diagnostics that annotate the run without aborting it.
    pub warnings: Vec<DiagnosticMessage>,
}

impl ValidationReport {
    /// Splits a list of diagnostic messages into a validation report.
    #[must_use]
    pub fn from_diagnostics(diag_msgs: DiagnosticMessages) -> Self {
        let (warnings, errors): (Vec<_>, Vec<_>) =
            diag_msgs.into_inner().into_iter().partition(|m| m.is_warning());
        Self { errors, warnings }
    }

    /// Returns true if the report contains no hard error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::format_errors;
    use crate::error::HeddleError;

    #[derive(thiserror::Error, Debug, Clone, Diagnostic, Serialize)]
    enum TestError {
        #[error("something failed")]
        Failure,
        #[diagnostic(severity(Warning), help("consider fixing it"))]
        #[error("something is odd")]
        Odd,
        #[error("{}", format_errors(.0))]
        Compound(Vec<TestError>),
    }

    impl HeddleError<TestError> for TestError {
        fn compound(errors: Vec<TestError>) -> TestError {
            TestError::Compound(errors)
        }
        fn errors(&self) -> Vec<String> {
            vec![self.to_string()]
        }
    }

    #[test]
    fn test_validation_report_partition() {
        let msgs = DiagnosticMessages::from_errors(vec![TestError::Failure, TestError::Odd]);
        assert!(msgs.has_error());
        let report = ValidationReport::from_diagnostics(msgs);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(!report.is_success());
        assert_eq!(
            report.warnings[0].help.as_deref(),
            Some("consider fixing it")
        );
    }
}
