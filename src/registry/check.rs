// SPDX-License-Identifier: Apache-2.0

//! Validate a semantic convention registry.

use std::path::PathBuf;

use clap::Args;

use heddle_common::diagnostic::{DiagnosticMessages, ValidationReport};

use crate::registry::{load_and_resolve, CommandError, EXIT_VALIDATION};

/// Output format of the validation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DiagnosticFormat {
    /// Human-oriented console output.
    Ansi,
    /// Machine-readable JSON report.
    Json,
}

/// Parameters for the `registry check` sub-command.
#[derive(Debug, Args)]
pub struct CheckRegistry {
    /// Path of the registry to check.
    #[arg(short = 'r', long, env = "REGISTRY_PATH")]
    pub registry: PathBuf,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,

    /// Format of the validation report.
    #[arg(long, value_enum, default_value = "ansi")]
    pub diagnostic_format: DiagnosticFormat,
}

/// Checks the registry: parsing, static well-formedness, and resolution.
/// Exits 0 when only warnings were emitted (unless `--strict`), 1 on any
/// error.
pub(crate) fn command(args: &CheckRegistry) -> Result<(), CommandError> {
    let mut diag_msgs = DiagnosticMessages::empty();
    let loaded = load_and_resolve(&args.registry, &mut diag_msgs);

    // Fatal load/resolution errors join the report instead of short-circuiting
    // so that the JSON output is complete.
    if let Err(error) = loaded {
        diag_msgs.extend(error.diagnostics);
    }

    let report = ValidationReport::from_diagnostics(diag_msgs);
    let failed = !report.is_success() || (args.strict && !report.warnings.is_empty());

    match args.diagnostic_format {
        DiagnosticFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(|e| {
                CommandError::new(
                    EXIT_VALIDATION,
                    DiagnosticMessages::from_error(heddle_semconv::Error::InvalidSpecFile {
                        path: args.registry.clone(),
                        line: None,
                        error: e.to_string(),
                    }),
                )
            })?;
            println!("{json}");
        }
        DiagnosticFormat::Ansi => {
            for warning in &report.warnings {
                log::warn!("{}", warning.message);
            }
            for error in &report.errors {
                log::error!("{}", error.message);
            }
            log::info!(
                "Registry checked: {} error(s), {} warning(s)",
                report.errors.len(),
                report.warnings.len()
            );
        }
    }

    if failed {
        return Err(CommandError::new(
            EXIT_VALIDATION,
            DiagnosticMessages::empty(),
        ));
    }
    Ok(())
}
