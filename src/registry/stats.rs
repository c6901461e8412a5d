// SPDX-License-Identifier: Apache-2.0

//! Display general statistics on a registry.

use std::path::PathBuf;

use clap::Args;

use heddle_common::diagnostic::DiagnosticMessages;

use crate::registry::{load_and_resolve, CommandError};

/// Parameters for the `registry stats` sub-command.
#[derive(Debug, Args)]
pub struct StatsRegistry {
    /// Path of the registry to inspect.
    #[arg(short = 'r', long, env = "REGISTRY_PATH")]
    pub registry: PathBuf,
}

/// Computes and prints registry statistics: group count, attribute count,
/// and the per-type group histogram.
pub(crate) fn command(args: &StatsRegistry) -> Result<(), CommandError> {
    let mut diag_msgs = DiagnosticMessages::empty();
    let (spec_registry, resolved) = load_and_resolve(&args.registry, &mut diag_msgs)?;
    diag_msgs.log();

    let stats = spec_registry.stats();
    println!("Registry `{}`", spec_registry.id());
    println!("  groups: {}", stats.group_count);
    println!("  attribute mentions: {}", stats.attribute_count);
    println!("  distinct resolved attributes: {}", resolved.catalog.len());
    println!("  groups by type:");
    for (group_type, count) in &stats.group_type_histogram {
        println!("    {group_type}: {count}");
    }
    Ok(())
}
