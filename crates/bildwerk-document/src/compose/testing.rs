// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles shared by the composer and assembler tests.

use std::io::Cursor;

use bildwerk_core::error::BildwerkError;
use bildwerk_core::{ImageRecord, OutputFormat, Rotation, SourceFormat};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::image::ImageCodec;
use crate::traits::{Decoder, PageWriter, RasterImage, StageError};

/// One call made against a [`RecordingWriter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    StartPage { width_mm: f32, height_mm: f32 },
    DrawImage {
        format: OutputFormat,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
        rotation: Rotation,
    },
    Clip { x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32 },
    Unclip,
    Text { text: String, x_mm: f32, y_mm: f32 },
    Finalize,
}

/// Writer that records calls instead of producing a document.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    pub calls: Vec<Call>,
}

impl RecordingWriter {
    pub fn pages_started(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::StartPage { .. }))
            .count()
    }

    pub fn finalized(&self) -> bool {
        self.calls.contains(&Call::Finalize)
    }
}

impl PageWriter for RecordingWriter {
    fn start_page(&mut self, width_mm: f32, height_mm: f32) {
        self.calls.push(Call::StartPage { width_mm, height_mm });
    }

    fn draw_image(
        &mut self,
        _data: &[u8],
        format: OutputFormat,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
        rotation: Rotation,
    ) -> Result<(), BildwerkError> {
        self.calls.push(Call::DrawImage {
            format,
            x_mm,
            y_mm,
            w_mm,
            h_mm,
            rotation,
        });
        Ok(())
    }

    fn clip_rect(&mut self, x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32) {
        self.calls.push(Call::Clip { x_mm, y_mm, w_mm, h_mm });
    }

    fn unclip(&mut self) {
        self.calls.push(Call::Unclip);
    }

    fn draw_text(&mut self, text: &str, x_mm: f32, y_mm: f32, _font_size_pt: f32) {
        self.calls.push(Call::Text {
            text: text.to_string(),
            x_mm,
            y_mm,
        });
    }

    fn finalize(&mut self) -> Result<Vec<u8>, BildwerkError> {
        self.calls.push(Call::Finalize);
        Ok(b"recorded".to_vec())
    }
}

/// Decoder that rejects any payload starting with `BAD` and defers to
/// [`ImageCodec`] otherwise.
#[derive(Debug, Default)]
pub struct PickyDecoder;

impl Decoder for PickyDecoder {
    fn decode(&self, data: &[u8], format: SourceFormat) -> Result<RasterImage, StageError> {
        if data.starts_with(b"BAD") {
            return Err(StageError::new("corrupt test payload"));
        }
        ImageCodec::new().decode(data, format)
    }
}

/// Decoder returning an empty raster for every input.
#[derive(Debug, Default)]
pub struct EmptyDecoder;

impl Decoder for EmptyDecoder {
    fn decode(&self, _data: &[u8], _format: SourceFormat) -> Result<RasterImage, StageError> {
        Ok(DynamicImage::new_rgb8(0, 0))
    }
}

/// Encoded PNG of a solid `width` x `height` image.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 120, 200])));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encode test png");
    buffer
}

/// A PNG record of pseudo-random pixels, which JPEG cannot compress well.
pub fn noisy_png_record(name: &str, width: u32, height: u32) -> ImageRecord {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let n = (x.wrapping_mul(374_761_393) ^ y.wrapping_mul(668_265_263))
            .wrapping_mul(1_274_126_177);
        Rgb([(n >> 8) as u8, (n >> 16) as u8, (n >> 24) as u8])
    }));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encode test png");
    ImageRecord::new(name, buffer, SourceFormat::Png, width, height)
}

/// A PNG record named `name`.
pub fn png_record(name: &str, width: u32, height: u32) -> ImageRecord {
    ImageRecord::new(name, png_bytes(width, height), SourceFormat::Png, width, height)
}

/// A record whose payload the [`PickyDecoder`] rejects.
pub fn bad_record(name: &str) -> ImageRecord {
    ImageRecord::new(name, b"BAD payload".to_vec(), SourceFormat::Jpeg, 10, 10)
}
