//! Heddle CLI tool.

#![allow(clippy::print_stdout)]

use clap::Parser;

use heddle_common::logging::ConsoleLogger;

use crate::cli::{Cli, Commands};
use crate::registry::semconv_registry;

mod cli;
mod registry;

fn main() {
    let cli = Cli::parse();
    ConsoleLogger::init(cli.debug, cli.quiet);

    let exit_code = match &cli.command {
        Some(Commands::Registry(command)) => semconv_registry(command),
        None => 0,
    };

    #[allow(clippy::exit)]
    std::process::exit(exit_code);
}
