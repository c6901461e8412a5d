// SPDX-License-Identifier: Apache-2.0

//! Common infrastructure shared by all heddle crates: structured diagnostics,
//! the fatal/non-fatal result type, and the console logger installed by the
//! CLI.

pub mod diagnostic;
pub mod error;
pub mod logging;
pub mod result;
