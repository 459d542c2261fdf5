// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page composer — the per-image pipeline: decode, budget and resample, encode,
// place, and emit one page.

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{FitPolicy, ImageRecord, OutputFormat, PageGeometry};
use tracing::{debug, instrument};

use crate::layout::{PlacementCalculator, PlacementResult, ResizeBudgeter};
use crate::traits::{Decoder, Encoder, PageWriter, ResampleOptions, Resampler};

/// Distance of the page-number label from the safe-area corner, in mm.
pub const LABEL_INSET_MM: f32 = 5.0;

/// Default page-number font size in points.
pub const DEFAULT_LABEL_FONT_SIZE_PT: f32 = 10.0;

/// Average Helvetica glyph width as a fraction of the font size.
const HELVETICA_AVG_GLYPH_EM: f32 = 0.5;

const MM_PER_PT: f32 = 0.3528;

/// What ended up on a composed page.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPage {
    pub placement: PlacementResult,
    pub format: OutputFormat,
    /// Dimensions of the embedded raster after budgeting.
    pub raster_width_px: u32,
    pub raster_height_px: u32,
    pub encoded_bytes: usize,
}

/// Composes a single image onto a fresh page.
pub struct PageComposer<'a> {
    decoder: &'a dyn Decoder,
    resampler: &'a dyn Resampler,
    encoder: &'a dyn Encoder,
    budgeter: ResizeBudgeter,
    label_font_size_pt: f32,
}

impl<'a> PageComposer<'a> {
    pub fn new(
        decoder: &'a dyn Decoder,
        resampler: &'a dyn Resampler,
        encoder: &'a dyn Encoder,
        budgeter: ResizeBudgeter,
    ) -> Self {
        Self {
            decoder,
            resampler,
            encoder,
            budgeter,
            label_font_size_pt: DEFAULT_LABEL_FONT_SIZE_PT,
        }
    }

    pub fn with_label_font_size(mut self, font_size_pt: f32) -> Self {
        self.label_font_size_pt = font_size_pt;
        self
    }

    /// Put `record` (position `index` of `total`) on a new page of `writer`.
    ///
    /// Raster preparation happens before the page is started, so a failing
    /// image never leaves an empty page behind.
    #[instrument(skip_all, fields(index = index, name = record.name()))]
    pub fn compose_page(
        &self,
        writer: &mut dyn PageWriter,
        record: &ImageRecord,
        index: usize,
        total: usize,
        geometry: &PageGeometry,
    ) -> Result<ComposedPage> {
        let raster = self
            .decoder
            .decode(&record.data, record.format)
            .map_err(|err| BildwerkError::Decode {
                index,
                name: record.name().to_string(),
                reason: err.to_string(),
            })?;
        let (orig_w, orig_h) = (raster.width(), raster.height());
        if orig_w == 0 || orig_h == 0 {
            return Err(BildwerkError::Decode {
                index,
                name: record.name().to_string(),
                reason: format!("image has no pixels ({}x{})", orig_w, orig_h),
            });
        }

        let format = geometry.output_format_for(record.format);

        // The budget applies to the image as drawn, so quarter turns swap the
        // page axes it is measured against.
        let (footprint_w, footprint_h) = if record.rotation.swaps_axes() {
            (geometry.height_mm(), geometry.width_mm())
        } else {
            (geometry.width_mm(), geometry.height_mm())
        };
        let (max_w, max_h) = self.budgeter.budget(footprint_w, footprint_h);
        let (target_w, target_h) = ResizeBudgeter::fit_within_budget(orig_w, orig_h, max_w, max_h);

        let resized = self
            .resampler
            .resize(
                &raster,
                target_w,
                target_h,
                ResampleOptions {
                    preserve_alpha: format.supports_alpha(),
                },
            )
            .map_err(|err| BildwerkError::Resample {
                index,
                name: record.name().to_string(),
                reason: err.to_string(),
            })?;
        drop(raster);

        let encoded = self
            .encoder
            .encode(&resized, format, geometry.jpeg_quality())
            .map_err(|err| BildwerkError::Encode {
                index,
                name: record.name().to_string(),
                reason: err.to_string(),
            })?;

        let placement = PlacementCalculator::place(
            orig_w,
            orig_h,
            record.rotation,
            geometry.safe_width_mm(),
            geometry.safe_height_mm(),
            geometry.fit(),
        );

        self.emit(writer, &encoded, format, record, placement, geometry)?;
        if geometry.page_numbers() {
            self.draw_label(writer, index, total, geometry);
        }

        debug!(
            orig_w,
            orig_h,
            target_w,
            target_h,
            bytes = encoded.len(),
            ?placement,
            "Page composed"
        );

        Ok(ComposedPage {
            placement,
            format,
            raster_width_px: resized.width(),
            raster_height_px: resized.height(),
            encoded_bytes: encoded.len(),
        })
    }

    fn emit(
        &self,
        writer: &mut dyn PageWriter,
        encoded: &[u8],
        format: OutputFormat,
        record: &ImageRecord,
        placement: PlacementResult,
        geometry: &PageGeometry,
    ) -> Result<()> {
        let margin = geometry.margin_mm();
        let clip = geometry.fit() == FitPolicy::Cover;

        writer.start_page(geometry.width_mm(), geometry.height_mm());
        if clip {
            writer.clip_rect(
                margin,
                margin,
                geometry.safe_width_mm(),
                geometry.safe_height_mm(),
            );
        }
        let drawn = writer.draw_image(
            encoded,
            format,
            margin + placement.offset_x_mm,
            margin + placement.offset_y_mm,
            placement.draw_width_mm,
            placement.draw_height_mm,
            record.rotation,
        );
        if clip {
            writer.unclip();
        }
        drawn
    }

    /// Right-aligned "n / total" near the bottom-right corner of the safe area.
    fn draw_label(
        &self,
        writer: &mut dyn PageWriter,
        index: usize,
        total: usize,
        geometry: &PageGeometry,
    ) {
        let text = format!("{} / {}", index + 1, total);
        let text_width_mm = label_width_mm(&text, self.label_font_size_pt);
        let right = geometry.width_mm() - geometry.margin_mm() - LABEL_INSET_MM;
        let baseline = geometry.height_mm() - geometry.margin_mm() - LABEL_INSET_MM;
        writer.draw_text(&text, right - text_width_mm, baseline, self.label_font_size_pt);
    }
}

/// Estimated rendered width of `text` in the built-in Helvetica.
fn label_width_mm(text: &str, font_size_pt: f32) -> f32 {
    text.chars().count() as f32 * HELVETICA_AVG_GLYPH_EM * font_size_pt * MM_PER_PT
}
