// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster budgeting — the largest pixel dimensions an image is resampled to
// before it is encoded into the document.

/// Resolution used when no other target is configured.
pub const DEFAULT_TARGET_DPI: f32 = 150.0;

const MM_PER_INCH: f64 = 25.4;

/// Derives pixel budgets from a physical page footprint and a target DPI.
///
/// The budget bounds both resampling cost and output size regardless of how
/// large the source photo is. Images already inside the budget are never
/// upscaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeBudgeter {
    target_dpi: f32,
}

impl Default for ResizeBudgeter {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_DPI)
    }
}

impl ResizeBudgeter {
    pub fn new(target_dpi: f32) -> Self {
        Self { target_dpi }
    }

    pub fn target_dpi(&self) -> f32 {
        self.target_dpi
    }

    /// Maximum `(width, height)` in pixels for a footprint of the given size.
    pub fn budget(&self, width_mm: f32, height_mm: f32) -> (u32, u32) {
        let px_per_mm = f64::from(self.target_dpi) / MM_PER_INCH;
        let to_px = |mm: f32| (f64::from(mm) * px_per_mm).round().max(1.0) as u32;
        (to_px(width_mm), to_px(height_mm))
    }

    /// Scale `(orig_w, orig_h)` down into `(max_w, max_h)`, keeping the aspect ratio.
    ///
    /// The binding axis is chosen by comparing the image ratio with the budget
    /// ratio, and that axis is only clamped when it actually exceeds its bound.
    pub fn fit_within_budget(orig_w: u32, orig_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
        if orig_w <= max_w && orig_h <= max_h {
            return (orig_w, orig_h);
        }

        let (w, h) = (f64::from(orig_w), f64::from(orig_h));
        let orig_ratio = w / h;
        let budget_ratio = f64::from(max_w) / f64::from(max_h);

        let (new_w, new_h) = if orig_ratio > budget_ratio {
            if orig_w > max_w {
                (max_w, (f64::from(max_w) * h / w).round() as u32)
            } else {
                (orig_w, orig_h)
            }
        } else if orig_h > max_h {
            ((f64::from(max_h) * w / h).round() as u32, max_h)
        } else {
            (orig_w, orig_h)
        };

        (new_w.max(1), new_h.max(1))
    }
}
