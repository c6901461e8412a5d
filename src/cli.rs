// SPDX-License-Identifier: Apache-2.0

//! Command line arguments.

use clap::{Parser, Subcommand};

use crate::registry::RegistryCommand;

/// Command line arguments.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Turn the quiet mode on (i.e., minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List of supported commands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Supported commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage a semantic convention registry
    Registry(RegistryCommand),
}
