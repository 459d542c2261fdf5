// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — Core types, errors, configuration and the ordered image
// collection shared across all crates.

pub mod collection;
pub mod config;
pub mod error;
pub mod types;

pub use collection::{ImageCollection, format_size};
pub use config::ComposeConfig;
pub use error::{BildwerkError, ValidationError};
pub use types::*;
