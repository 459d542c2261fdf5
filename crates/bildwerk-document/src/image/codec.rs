// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image codec — decode, resample and encode in-memory rasters using the `image`
// crate. This is the default implementation of the decoder, resampler and
// encoder capabilities.

use std::io::Cursor;

use bildwerk_core::{OutputFormat, SourceFormat};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, instrument};

use crate::traits::{Decoder, Encoder, RasterImage, ResampleOptions, Resampler, StageError};

/// Decoder, resampler and encoder backed by the `image` crate.
///
/// Resampling uses Lanczos3 filtering for high-quality downscaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for ImageCodec {
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    fn decode(&self, data: &[u8], format: SourceFormat) -> Result<RasterImage, StageError> {
        let image = image::load_from_memory_with_format(data, source_image_format(format))
            .map_err(|err| StageError::new(format!("failed to decode image: {}", err)))?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Ok(image)
    }
}

impl Resampler for ImageCodec {
    #[instrument(skip(self, source), fields(from_w = source.width(), from_h = source.height()))]
    fn resize(
        &self,
        source: &RasterImage,
        width: u32,
        height: u32,
        options: ResampleOptions,
    ) -> Result<RasterImage, StageError> {
        if width == 0 || height == 0 {
            return Err(StageError::new(format!(
                "cannot resample to an empty {}x{} raster",
                width, height
            )));
        }

        let working = if options.preserve_alpha || !source.color().has_alpha() {
            std::borrow::Cow::Borrowed(source)
        } else {
            std::borrow::Cow::Owned(DynamicImage::ImageRgb8(source.to_rgb8()))
        };

        if working.width() == width && working.height() == height {
            debug!("Raster already at target size");
            return Ok(working.into_owned());
        }

        let resized = working.resize_exact(width, height, FilterType::Lanczos3);
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            "Resize complete"
        );
        Ok(resized)
    }
}

impl Encoder for ImageCodec {
    #[instrument(skip(self, raster))]
    fn encode(
        &self,
        raster: &RasterImage,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, StageError> {
        let bytes = match format {
            OutputFormat::Png => encode_png(raster)?,
            OutputFormat::Jpeg => encode_jpeg(raster, quality)?,
        };
        debug!(bytes = bytes.len(), "Raster encoded");
        Ok(bytes)
    }
}

fn source_image_format(format: SourceFormat) -> ImageFormat {
    match format {
        SourceFormat::Png => ImageFormat::Png,
        SourceFormat::Jpeg => ImageFormat::Jpeg,
        SourceFormat::Webp => ImageFormat::WebP,
    }
}

/// Encode as PNG, keeping whatever channels the raster has.
fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, StageError> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|err| StageError::new(format!("PNG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Encode as JPEG with the given quality (1-100). Alpha is dropped.
fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, StageError> {
    let mut buffer = Vec::new();
    let rgb = image.to_rgb8();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|err| StageError::new(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}
