// SPDX-License-Identifier: Apache-2.0

//! Commands to manage a semantic convention registry.

use std::path::Path;

use clap::{Args, Subcommand};

use heddle_common::diagnostic::DiagnosticMessages;
use heddle_forge::registry::TemplateRegistry;
use heddle_resolved_schema::ResolvedRegistry;
use heddle_resolver::resolve_registry;
use heddle_semconv::registry::SpecRegistry;

use crate::registry::check::CheckRegistry;
use crate::registry::generate::GenerateRegistry;
use crate::registry::resolve::ResolveRegistry;
use crate::registry::span_check::SpanCheckRegistry;
use crate::registry::stats::StatsRegistry;

mod check;
mod generate;
mod resolve;
mod span_check;
mod stats;

/// Exit code for validation failures.
pub(crate) const EXIT_VALIDATION: i32 = 1;
/// Exit code for generation (render or IO) failures.
pub(crate) const EXIT_GENERATION: i32 = 2;
/// Exit code for configuration errors.
pub(crate) const EXIT_CONFIG: i32 = 3;
/// Exit code for cancelled runs.
pub(crate) const EXIT_CANCELLED: i32 = 130;

/// Parameters for the `registry` command.
#[derive(Debug, Args)]
pub struct RegistryCommand {
    /// Sub-commands of the `registry` command.
    #[clap(subcommand)]
    pub command: RegistrySubCommand,
}

/// Sub-commands to manage a registry.
#[derive(Debug, Subcommand)]
pub enum RegistrySubCommand {
    /// Validates a registry (parsing, reference and extends resolution,
    /// static well-formedness checks).
    Check(CheckRegistry),
    /// Generates artifacts for one or more targets from a registry.
    Generate(GenerateRegistry),
    /// Resolves a registry and prints the result.
    Resolve(ResolveRegistry),
    /// Displays general statistics on a registry.
    Stats(StatsRegistry),
    /// Validates generated artifacts against a span capture and computes a
    /// health score.
    SpanCheck(SpanCheckRegistry),
}

/// A command failure: the exit code plus the diagnostics to report.
pub(crate) struct CommandError {
    pub(crate) code: i32,
    pub(crate) diagnostics: DiagnosticMessages,
}

impl CommandError {
    pub(crate) fn new(code: i32, diagnostics: DiagnosticMessages) -> Self {
        Self { code, diagnostics }
    }
}

/// Dispatches a `registry` sub-command and returns the process exit code.
pub fn semconv_registry(command: &RegistryCommand) -> i32 {
    let result = match &command.command {
        RegistrySubCommand::Check(args) => check::command(args),
        RegistrySubCommand::Generate(args) => generate::command(args),
        RegistrySubCommand::Resolve(args) => resolve::command(args),
        RegistrySubCommand::Stats(args) => stats::command(args),
        RegistrySubCommand::SpanCheck(args) => span_check::command(args),
    };
    match result {
        Ok(()) => 0,
        Err(error) => {
            error.diagnostics.log();
            error.code
        }
    }
}

/// Loads and resolves a registry. Warnings accumulate in `diag_msgs`; any
/// hard error aborts with the validation exit code.
pub(crate) fn load_and_resolve(
    registry_path: &Path,
    diag_msgs: &mut DiagnosticMessages,
) -> Result<(SpecRegistry, ResolvedRegistry), CommandError> {
    let spec_registry = SpecRegistry::try_from_path("default", registry_path)
        .capture_warnings(diag_msgs)
        .into_result_failing_non_fatal()
        .map_err(|e| CommandError::new(EXIT_VALIDATION, DiagnosticMessages::from_error(e)))?;

    let resolved = resolve_registry(&spec_registry)
        .map_err(|e| CommandError::new(EXIT_VALIDATION, DiagnosticMessages::from_error(e)))?;

    Ok((spec_registry, resolved))
}

/// Builds the template-facing view of a resolved registry.
pub(crate) fn template_registry(
    resolved: &ResolvedRegistry,
) -> Result<TemplateRegistry, CommandError> {
    TemplateRegistry::try_from_resolved(resolved)
        .map_err(|e| CommandError::new(EXIT_VALIDATION, DiagnosticMessages::from_error(e)))
}
