// SPDX-License-Identifier: Apache-2.0

//! Filters, tests, and functions installed into the template environment.

pub mod case;
pub mod code;
pub mod semconv;
pub mod util;
