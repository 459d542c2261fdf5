// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Placement — maps an image's aspect ratio onto a page's safe area according
// to the fit policy, and centres the result.

use bildwerk_core::{FitPolicy, Rotation};

/// Size and position of an image on its page, in millimetres.
///
/// Offsets are relative to the safe-area origin (the top-left corner after
/// the margin). Under [`FitPolicy::Cover`] they are negative on the axis that
/// overflows, and the drawn rectangle must be clipped to the safe area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementResult {
    pub draw_width_mm: f32,
    pub draw_height_mm: f32,
    pub offset_x_mm: f32,
    pub offset_y_mm: f32,
}

/// Stateless fit/cover/stretch calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementCalculator;

impl PlacementCalculator {
    /// Compute the drawn rectangle for an image of `image_w_px` x `image_h_px`
    /// (before rotation) inside a safe area of `safe_w_mm` x `safe_h_mm`.
    ///
    /// The caller guarantees non-zero image dimensions.
    pub fn place(
        image_w_px: u32,
        image_h_px: u32,
        rotation: Rotation,
        safe_w_mm: f32,
        safe_h_mm: f32,
        fit: FitPolicy,
    ) -> PlacementResult {
        let (w, h) = if rotation.swaps_axes() {
            (image_h_px, image_w_px)
        } else {
            (image_w_px, image_h_px)
        };
        let image_ratio = (f64::from(w) / f64::from(h)) as f32;
        let page_ratio = safe_w_mm / safe_h_mm;
        let wider = image_ratio > page_ratio;

        let (draw_w, draw_h) = match fit {
            FitPolicy::Stretch => (safe_w_mm, safe_h_mm),
            FitPolicy::Fit if wider => (safe_w_mm, safe_w_mm / image_ratio),
            FitPolicy::Fit => (safe_h_mm * image_ratio, safe_h_mm),
            FitPolicy::Cover if wider => (safe_h_mm * image_ratio, safe_h_mm),
            FitPolicy::Cover => (safe_w_mm, safe_w_mm / image_ratio),
        };

        PlacementResult {
            draw_width_mm: draw_w,
            draw_height_mm: draw_h,
            offset_x_mm: (safe_w_mm - draw_w) / 2.0,
            offset_y_mm: (safe_h_mm - draw_h) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    /// Image sizes and safe areas covering wide, tall and square cases.
    fn cases() -> Vec<(u32, u32, f32, f32)> {
        vec![
            (4000, 3000, 190.0, 277.0),
            (3000, 4000, 190.0, 277.0),
            (1000, 1000, 190.0, 277.0),
            (5000, 200, 277.0, 190.0),
            (200, 5000, 277.0, 190.0),
            (1754, 1240, 100.0, 100.0),
        ]
    }

    const ROTATIONS: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    #[test]
    fn a4_fit_scenario() {
        let p = PlacementCalculator::place(4000, 3000, Rotation::Deg0, 190.0, 277.0, FitPolicy::Fit);
        assert!(close(p.draw_width_mm, 190.0));
        assert!(close(p.draw_height_mm, 142.5));
        assert!(close(p.offset_x_mm, 0.0));
        assert!(close(p.offset_y_mm, 67.25));
    }

    #[test]
    fn a4_cover_scenario() {
        let p =
            PlacementCalculator::place(4000, 3000, Rotation::Deg0, 190.0, 277.0, FitPolicy::Cover);
        assert!((p.draw_width_mm - 369.333).abs() < 0.01, "{p:?}");
        assert!(close(p.draw_height_mm, 277.0));
        assert!((p.offset_x_mm - (-89.667)).abs() < 0.01, "{p:?}");
        assert!(close(p.offset_y_mm, 0.0));
    }

    #[test]
    fn quarter_turn_swaps_the_aspect_ratio() {
        let p = PlacementCalculator::place(4000, 3000, Rotation::Deg90, 190.0, 277.0, FitPolicy::Fit);
        // Rotated, the image is 3:4, still wider than the 190:277 safe area,
        // so the width binds.
        assert!(close(p.draw_width_mm, 190.0));
        assert!(close(p.draw_height_mm, 190.0 * 4.0 / 3.0));

        let upright =
            PlacementCalculator::place(4000, 3000, Rotation::Deg180, 190.0, 277.0, FitPolicy::Fit);
        assert!(close(upright.draw_height_mm, 142.5));
    }

    #[test]
    fn fit_is_contained_and_touches_one_side() {
        for (w, h, sw, sh) in cases() {
            for rotation in ROTATIONS {
                let p = PlacementCalculator::place(w, h, rotation, sw, sh, FitPolicy::Fit);
                assert!(p.draw_width_mm <= sw + EPS && p.draw_height_mm <= sh + EPS, "{p:?}");
                assert!(
                    close(p.draw_width_mm, sw) || close(p.draw_height_mm, sh),
                    "neither side touches the safe area: {p:?}"
                );
                assert!(p.offset_x_mm >= -EPS && p.offset_y_mm >= -EPS);
            }
        }
    }

    #[test]
    fn cover_contains_the_safe_area() {
        for (w, h, sw, sh) in cases() {
            for rotation in ROTATIONS {
                let p = PlacementCalculator::place(w, h, rotation, sw, sh, FitPolicy::Cover);
                assert!(p.offset_x_mm <= EPS && p.offset_y_mm <= EPS, "{p:?}");
                assert!(p.draw_width_mm + p.offset_x_mm >= sw - EPS, "{p:?}");
                assert!(p.draw_height_mm + p.offset_y_mm >= sh - EPS, "{p:?}");
            }
        }
    }

    #[test]
    fn stretch_fills_the_safe_area_exactly() {
        for (w, h, sw, sh) in cases() {
            let p = PlacementCalculator::place(w, h, Rotation::Deg90, sw, sh, FitPolicy::Stretch);
            assert_eq!(
                p,
                PlacementResult {
                    draw_width_mm: sw,
                    draw_height_mm: sh,
                    offset_x_mm: 0.0,
                    offset_y_mm: 0.0,
                }
            );
        }
    }
}
