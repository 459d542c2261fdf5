// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout module — raster budgeting and image placement on the page.

pub mod budget;
pub mod placement;

pub use budget::{DEFAULT_TARGET_DPI, ResizeBudgeter};
pub use placement::{PlacementCalculator, PlacementResult};
