// SPDX-License-Identifier: Apache-2.0

//! Validate generated artifacts against a span capture.

use std::path::PathBuf;

use clap::Args;

use heddle_common::diagnostic::DiagnosticMessages;
use heddle_span_check::checker::{CheckConfig, SpanChecker};
use heddle_span_check::ingester::{JsonFileIngester, JsonStdinIngester};
use heddle_span_check::sample::SampleSpan;
use heddle_span_check::Ingester;

use crate::registry::{load_and_resolve, template_registry, CommandError, EXIT_GENERATION};

/// Parameters for the `registry span-check` sub-command.
#[derive(Debug, Args)]
pub struct SpanCheckRegistry {
    /// Path of the registry declaring the span groups.
    #[arg(short = 'r', long, env = "REGISTRY_PATH")]
    pub registry: PathBuf,

    /// Span capture: a JSON lines file, or `-` for standard input.
    #[arg(long)]
    pub spans: String,

    /// Duration bound (milliseconds) of the performance score.
    #[arg(long, default_value_t = 1000.0)]
    pub max_duration_ms: f64,

    /// Health score threshold below which the report is flagged.
    #[arg(long, default_value_t = 0.8)]
    pub health_threshold: f64,

    /// Write the report (JSON) to this file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Runs the span-based artifact validation. The command always exits 0 when
/// the report could be produced; a poor health score flags the report but
/// never fails the run.
pub(crate) fn command(args: &SpanCheckRegistry) -> Result<(), CommandError> {
    let mut diag_msgs = DiagnosticMessages::empty();
    let (_, resolved) = load_and_resolve(&args.registry, &mut diag_msgs)?;
    diag_msgs.log();
    let registry = template_registry(&resolved)?;

    let spans: Vec<SampleSpan> = if args.spans == "-" {
        JsonStdinIngester::new().ingest()
    } else {
        JsonFileIngester::new(PathBuf::from(&args.spans)).ingest()
    }
    .map_err(|e| CommandError::new(EXIT_GENERATION, DiagnosticMessages::from_error(e)))?
    .collect();

    let config = CheckConfig {
        max_duration_ms: args.max_duration_ms,
        health_threshold: args.health_threshold,
        ..Default::default()
    };
    let report = SpanChecker::new(&registry, config).check(&spans);
    if report.below_threshold {
        log::warn!(
            "Health score {:.3} is below the threshold {:.3}",
            report.health_score,
            args.health_threshold
        );
    }

    let json = serde_json::to_string_pretty(&report).map_err(|e| {
        CommandError::new(
            EXIT_GENERATION,
            DiagnosticMessages::from_error(heddle_span_check::Error::OutputError {
                error: e.to_string(),
            }),
        )
    })?;
    match &args.output {
        Some(path) => std::fs::write(path, json).map_err(|e| {
            CommandError::new(
                EXIT_GENERATION,
                DiagnosticMessages::from_error(heddle_span_check::Error::OutputError {
                    error: format!("{}: {e}", path.display()),
                }),
            )
        })?,
        None => println!("{json}"),
    }
    Ok(())
}
