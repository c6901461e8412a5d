// SPDX-License-Identifier: Apache-2.0

//! Generate artifacts for a semantic convention registry.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Args;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use heddle_common::diagnostic::DiagnosticMessages;
use heddle_forge::config::{Params, TargetManifest};
use heddle_forge::file_loader::FileSystemFileLoader;
use heddle_forge::manifest::RunManifest;
use heddle_forge::{GenerationOptions, TemplateEngine};

use crate::registry::{
    load_and_resolve, template_registry, CommandError, EXIT_CANCELLED, EXIT_CONFIG,
    EXIT_GENERATION,
};

/// Parameters for the `registry generate` sub-command.
#[derive(Debug, Args)]
pub struct GenerateRegistry {
    /// Path of the registry to generate from.
    #[arg(short = 'r', long, env = "REGISTRY_PATH")]
    pub registry: PathBuf,

    /// Targets to generate. Repeat the flag for cross-target runs; targets
    /// run in parallel.
    #[arg(short = 't', long = "target", required = true)]
    pub targets: Vec<String>,

    /// Root directory of the templates; targets live under
    /// `<templates>/registry/<target>/`.
    #[arg(long, default_value = "templates")]
    pub templates: PathBuf,

    /// Output directory. Each target writes under `<output>/<target>` when
    /// more than one target is generated.
    #[arg(short = 'o', long, env = "OUTPUT_DIR")]
    pub output: PathBuf,

    /// `name=value` parameters merged over the manifest's `params`.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Overwrite existing output files.
    #[arg(long)]
    pub force: bool,

    /// Cancel the remaining targets as soon as one fails.
    #[arg(long)]
    pub fail_fast: bool,

    /// Size of the worker pool; defaults to the available CPU count.
    #[arg(long, env = "WORKERS")]
    pub workers: Option<usize>,

    /// Write the run manifest (JSON) to this path.
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

/// Generates every requested target, in parallel, over the shared resolved
/// registry.
pub(crate) fn command(args: &GenerateRegistry) -> Result<(), CommandError> {
    let params = parse_params(&args.params)?;

    let mut diag_msgs = DiagnosticMessages::empty();
    let (_, resolved) = load_and_resolve(&args.registry, &mut diag_msgs)?;
    diag_msgs.log();
    let registry = template_registry(&resolved)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.workers.unwrap_or(0))
        .build()
        .map_err(|e| {
            CommandError::new(
                EXIT_CONFIG,
                DiagnosticMessages::from_error(heddle_forge::error::Error::InvalidConfigFile {
                    config_file: args.templates.clone(),
                    error: e.to_string(),
                }),
            )
        })?;

    let cancel = Arc::new(AtomicBool::new(false));
    let single_target = args.targets.len() == 1;
    let results: Vec<(String, Result<RunManifest, CommandError>)> = pool.install(|| {
        args.targets
            .par_iter()
            .map(|target| {
                let result = generate_target(args, target, &registry, &params, &cancel);
                if result.is_err() && args.fail_fast {
                    cancel.store(true, std::sync::atomic::Ordering::Release);
                }
                (target.clone(), result)
            })
            .collect()
    });

    let mut manifests: BTreeMap<String, RunManifest> = BTreeMap::new();
    let mut first_error: Option<CommandError> = None;
    let mut cancelled = false;
    for (target, result) in results {
        match result {
            Ok(manifest) => {
                log::info!("Target `{target}`: {} file(s) generated", manifest.len());
                let _ = manifests.insert(target, manifest);
            }
            Err(error) => {
                if error.code == EXIT_CANCELLED {
                    cancelled = true;
                } else if first_error.is_none() {
                    first_error = Some(error);
                } else {
                    error.diagnostics.log();
                }
            }
        }
    }

    if let Some(path) = &args.manifest {
        write_manifest(path, &manifests, single_target)?;
    }

    if let Some(error) = first_error {
        return Err(error);
    }
    if cancelled {
        return Err(CommandError::new(
            EXIT_CANCELLED,
            DiagnosticMessages::empty(),
        ));
    }
    Ok(())
}

fn generate_target(
    args: &GenerateRegistry,
    target: &str,
    registry: &heddle_forge::registry::TemplateRegistry,
    params: &Params,
    cancel: &Arc<AtomicBool>,
) -> Result<RunManifest, CommandError> {
    let targets_root = args.templates.join("registry");
    let config = TargetManifest::try_from_path(targets_root.join(target))
        .map_err(|e| CommandError::new(EXIT_CONFIG, DiagnosticMessages::from_error(e)))?;
    let loader = FileSystemFileLoader::try_new(targets_root, target)
        .map_err(|e| CommandError::new(EXIT_CONFIG, DiagnosticMessages::from_error(e)))?;
    let engine = TemplateEngine::try_new(config, loader, params.clone())
        .map_err(|e| CommandError::new(EXIT_CONFIG, DiagnosticMessages::from_error(e)))?;

    let output_dir = if args.targets.len() == 1 {
        args.output.clone()
    } else {
        args.output.join(target)
    };
    let options = GenerationOptions {
        force: args.force,
        fsync: false,
        cancel: Some(cancel.clone()),
    };
    engine.generate(registry, &output_dir, &options).map_err(|e| {
        let code = match &e {
            heddle_forge::error::Error::Cancelled => EXIT_CANCELLED,
            _ => EXIT_GENERATION,
        };
        CommandError::new(code, DiagnosticMessages::from_error(e))
    })
}

fn parse_params(pairs: &[String]) -> Result<Params, CommandError> {
    let mut params = Params::default();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(CommandError::new(
                EXIT_CONFIG,
                DiagnosticMessages::from_error(heddle_forge::error::Error::InvalidConfigFile {
                    config_file: PathBuf::from("--param"),
                    error: format!("`{pair}` is not of the form name=value"),
                }),
            ));
        };
        let value: serde_yaml::Value =
            serde_yaml::from_str(value).unwrap_or(serde_yaml::Value::String(value.to_owned()));
        let _ = params.params.insert(name.to_owned(), value);
    }
    Ok(params)
}

fn write_manifest(
    path: &std::path::Path,
    manifests: &BTreeMap<String, RunManifest>,
    single_target: bool,
) -> Result<(), CommandError> {
    let json = if single_target {
        manifests
            .values()
            .next()
            .map(serde_json::to_string_pretty)
            .transpose()
    } else {
        serde_json::to_string_pretty(&manifests).map(Some)
    };
    let json = json
        .map_err(|e| io_command_error(path, &e.to_string()))?
        .unwrap_or_else(|| "[]".to_owned());
    std::fs::write(path, json).map_err(|e| io_command_error(path, &e.to_string()))
}

fn io_command_error(path: &std::path::Path, error: &str) -> CommandError {
    CommandError::new(
        EXIT_GENERATION,
        DiagnosticMessages::from_error(heddle_forge::error::Error::WriteGeneratedCodeFailed {
            path: path.to_path_buf(),
            error: error.to_owned(),
        }),
    )
}
