// SPDX-License-Identifier: Apache-2.0

//! Console logger backing the `log` facade used across the workspace.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{Level, LevelFilter, Metadata, Record};
use paris::formatter::colorize_string;

/// A console logger with paris-style tags. Warnings and errors go to stderr,
/// everything else to stdout. The logger can be muted at runtime, in which
/// case only warnings and errors are emitted.
#[derive(Default)]
pub struct ConsoleLogger {
    muted: AtomicBool,
}

static LOGGER: ConsoleLogger = ConsoleLogger {
    muted: AtomicBool::new(false),
};

impl ConsoleLogger {
    /// Installs the console logger as the global `log` backend.
    ///
    /// `debug_level` 0 logs info and above, 1 adds debug, 2 and more adds
    /// trace. `quiet` mutes everything below warning.
    pub fn init(debug_level: u8, quiet: bool) {
        let max_level = match debug_level {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        LOGGER.muted.store(quiet, Ordering::Release);
        // set_logger fails only when a logger is already installed, which is
        // fine in tests.
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(max_level);
        }
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        if self.muted.load(Ordering::Acquire) {
            metadata.level() <= Level::Warn
        } else {
            true
        }
    }

    #[allow(clippy::print_stdout, clippy::print_stderr)]
    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error => {
                eprintln!("{}", colorize_string(format!("<red>✖</> {}", record.args())));
            }
            Level::Warn => {
                eprintln!(
                    "{}",
                    colorize_string(format!("<yellow>⚠</> {}", record.args()))
                );
            }
            Level::Info => {
                println!("{}", colorize_string(format!("<cyan>ℹ</> {}", record.args())));
            }
            _ => println!("{}", record.args()),
        }
    }

    fn flush(&self) {}
}
