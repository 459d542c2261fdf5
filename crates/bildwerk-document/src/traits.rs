// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability traits consumed by the composition pipeline.
//
// The composer never decodes, resamples, encodes or writes PDF objects itself.
// It is handed these capabilities, so the pipeline can be driven by the
// `image`/`printpdf` backed implementations in this crate or by test doubles.

use bildwerk_core::error::BildwerkError;
use bildwerk_core::{OutputFormat, Rotation, SourceFormat};
use thiserror::Error;

/// Decoded raster handed between pipeline stages.
pub type RasterImage = image::DynamicImage;

/// Failure of a single decode, resample or encode call.
///
/// Carries only the underlying reason; the composer attaches the image index
/// and name when it turns this into a `BildwerkError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StageError(pub String);

impl StageError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Turns encoded bytes into a raster.
pub trait Decoder: Send + Sync {
    /// Decode `data`, which was identified as `format` when it was loaded.
    fn decode(&self, data: &[u8], format: SourceFormat) -> Result<RasterImage, StageError>;
}

/// Options for [`Resampler::resize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResampleOptions {
    /// Keep the alpha channel; otherwise the result is flattened to RGB.
    pub preserve_alpha: bool,
}

/// Produces a resized copy of a raster.
pub trait Resampler: Send + Sync {
    /// Resize `source` to exactly `width` x `height` pixels.
    fn resize(
        &self,
        source: &RasterImage,
        width: u32,
        height: u32,
        options: ResampleOptions,
    ) -> Result<RasterImage, StageError>;
}

/// Serialises a raster into an embeddable container format.
pub trait Encoder: Send + Sync {
    /// `quality` is on the 1–100 scale and only affects JPEG output.
    fn encode(
        &self,
        raster: &RasterImage,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, StageError>;
}

/// Output-document builder.
///
/// Coordinates and sizes are millimetres measured from the top-left corner of
/// the current page.
pub trait PageWriter {
    /// Begin a new page; everything drawn afterwards lands on it.
    fn start_page(&mut self, width_mm: f32, height_mm: f32);

    /// Draw an encoded image into the `w` x `h` rectangle at `(x, y)`.
    ///
    /// The image is turned clockwise by `rotation` first, so `w` and `h` are
    /// the dimensions as seen on the page.
    #[allow(clippy::too_many_arguments)]
    fn draw_image(
        &mut self,
        data: &[u8],
        format: OutputFormat,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
        rotation: Rotation,
    ) -> Result<(), BildwerkError>;

    /// Restrict subsequent drawing to the given rectangle until [`unclip`](Self::unclip).
    fn clip_rect(&mut self, x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32);

    /// Lift the clip set by the last [`clip_rect`](Self::clip_rect).
    fn unclip(&mut self);

    /// Draw a single line of text whose baseline starts at `(x, y)`.
    fn draw_text(&mut self, text: &str, x_mm: f32, y_mm: f32, font_size_pt: f32);

    /// Serialise every page drawn so far into the final document bytes.
    fn finalize(&mut self) -> Result<Vec<u8>, BildwerkError>;
}
