// SPDX-License-Identifier: Apache-2.0

//! Resolve a registry and print the result.

use std::path::PathBuf;

use clap::Args;

use heddle_common::diagnostic::DiagnosticMessages;

use crate::registry::{load_and_resolve, CommandError, EXIT_GENERATION};

/// Serialization format of the resolved registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// YAML output.
    Yaml,
    /// JSON output.
    Json,
}

/// Parameters for the `registry resolve` sub-command.
#[derive(Debug, Args)]
pub struct ResolveRegistry {
    /// Path of the registry to resolve.
    #[arg(short = 'r', long, env = "REGISTRY_PATH")]
    pub registry: PathBuf,

    /// Output format.
    #[arg(short = 'f', long, value_enum, default_value = "yaml")]
    pub format: Format,

    /// Write the resolved registry to this file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Resolves the registry and prints it in the requested format.
pub(crate) fn command(args: &ResolveRegistry) -> Result<(), CommandError> {
    let mut diag_msgs = DiagnosticMessages::empty();
    let (_, resolved) = load_and_resolve(&args.registry, &mut diag_msgs)?;
    diag_msgs.log();

    let rendered = match args.format {
        Format::Yaml => serde_yaml::to_string(&resolved).map_err(|e| e.to_string()),
        Format::Json => serde_json::to_string_pretty(&resolved).map_err(|e| e.to_string()),
    }
    .map_err(|error| {
        CommandError::new(
            EXIT_GENERATION,
            DiagnosticMessages::from_error(heddle_forge::error::Error::ContextSerializationFailed {
                error,
            }),
        )
    })?;

    match &args.output {
        Some(path) => std::fs::write(path, rendered).map_err(|e| {
            CommandError::new(
                EXIT_GENERATION,
                DiagnosticMessages::from_error(
                    heddle_forge::error::Error::WriteGeneratedCodeFailed {
                        path: path.clone(),
                        error: e.to_string(),
                    },
                ),
            )
        })?,
        None => println!("{rendered}"),
    }
    Ok(())
}
