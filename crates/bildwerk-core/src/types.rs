// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Bildwerk: image records, page options and the resolved
// page geometry every composition run works from.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Duplicate-detection key of an image: its file name and byte size.
///
/// Two different files that share both name and size are treated as the same
/// image. This is a heuristic, not a content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageIdentity {
    pub name: String,
    pub size_bytes: u64,
}

impl ImageIdentity {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }
}

impl fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size_bytes)
    }
}

/// Accepted input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Webp,
}

impl SourceFormat {
    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Container format of the raster embedded into a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Whether the format can carry an alpha channel.
    pub fn supports_alpha(&self) -> bool {
        matches!(self, Self::Png)
    }
}

/// Clockwise quarter-turn applied to an image when it is placed on its page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Accepts any multiple of 90, normalised into `0..360`.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// The next quarter-turn: +90 mod 360.
    pub fn advance(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    /// True for 90 and 270, where the drawn image's width and height trade places.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// One user-supplied image.
///
/// The encoded bytes are shared behind an `Arc`, so cloning a record (and
/// therefore snapshotting a collection) never copies pixel data.
#[derive(Clone)]
pub struct ImageRecord {
    pub identity: ImageIdentity,
    pub data: Arc<[u8]>,
    pub format: SourceFormat,
    /// Native width as probed when the file was loaded.
    pub width_px: u32,
    /// Native height as probed when the file was loaded.
    pub height_px: u32,
    pub rotation: Rotation,
}

impl ImageRecord {
    /// Build a record from encoded bytes. The identity size is taken from the
    /// byte length.
    pub fn new(
        name: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
        format: SourceFormat,
        width_px: u32,
        height_px: u32,
    ) -> Self {
        let data = data.into();
        Self {
            identity: ImageIdentity::new(name, data.len() as u64),
            data,
            format,
            width_px,
            height_px,
            rotation: Rotation::Deg0,
        }
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.identity.size_bytes
    }
}

impl fmt::Debug for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRecord")
            .field("identity", &self.identity)
            .field("format", &self.format)
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("rotation", &self.rotation)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Paper sizes offered for output pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    Letter,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PageSize {
    /// Dimensions in millimetres (width, height), portrait.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::Letter => (216.0, 279.0),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Resolve a page-size key as typed by a user ("a4", "letter", "custom").
    ///
    /// `custom` requires the explicit dimensions in `custom_mm`.
    pub fn from_key(key: &str, custom_mm: Option<(f32, f32)>) -> Result<Self, ValidationError> {
        match key.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            "custom" => {
                let (width_mm, height_mm) = custom_mm.unwrap_or((0.0, 0.0));
                Self::custom(width_mm, height_mm)
            }
            _ => Err(ValidationError::UnknownPageSize(key.to_string())),
        }
    }

    /// A custom size, rejecting non-positive or non-finite dimensions.
    pub fn custom(width_mm: f32, height_mm: f32) -> Result<Self, ValidationError> {
        if !(width_mm.is_finite() && height_mm.is_finite() && width_mm > 0.0 && height_mm > 0.0)
        {
            return Err(ValidationError::InvalidCustomSize {
                width_mm,
                height_mm,
            });
        }
        Ok(Self::Custom {
            width_mm,
            height_mm,
        })
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Apply the orientation to portrait dimensions; landscape swaps them.
    pub fn apply(&self, (width_mm, height_mm): (f32, f32)) -> (f32, f32) {
        match self {
            Self::Portrait => (width_mm, height_mm),
            Self::Landscape => (height_mm, width_mm),
        }
    }
}

/// How an image's aspect ratio is mapped onto the safe area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitPolicy {
    /// Contain: the whole image is visible, one axis may leave background.
    #[default]
    Fit,
    /// Fill: the safe area is covered, the overflow is clipped.
    Cover,
    /// Ignore the aspect ratio and fill the safe area exactly.
    Stretch,
}

/// Page options as chosen by the user, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// Margin applied on every side, in millimetres.
    pub margin_mm: f32,
    pub fit: FitPolicy,
    /// Draw an "n / total" label on every page.
    pub page_numbers: bool,
    /// Output quality in `[0, 1]`, used for JPEG encoding.
    pub quality: f32,
    /// Keep PNG sources as PNG (with alpha) instead of re-encoding to JPEG.
    pub preserve_png: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin_mm: 10.0,
            fit: FitPolicy::Fit,
            page_numbers: false,
            quality: 0.92,
            preserve_png: false,
        }
    }
}

impl PageOptions {
    /// Validate the options and resolve them into a [`PageGeometry`].
    pub fn resolve(&self) -> Result<PageGeometry, ValidationError> {
        if let PageSize::Custom {
            width_mm,
            height_mm,
        } = self.page_size
        {
            PageSize::custom(width_mm, height_mm)?;
        }
        let (width_mm, height_mm) = self.orientation.apply(self.page_size.dimensions_mm());
        Ok(
            PageGeometry::new(width_mm, height_mm, self.margin_mm, self.fit)?
                .with_page_numbers(self.page_numbers)
                .with_quality(self.quality)?
                .with_preserve_png(self.preserve_png),
        )
    }
}

/// Resolved, validated page configuration.
///
/// A `PageGeometry` always has a positive safe area: it can only be built
/// through [`PageGeometry::new`] or [`PageOptions::resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    width_mm: f32,
    height_mm: f32,
    margin_mm: f32,
    fit: FitPolicy,
    page_numbers: bool,
    quality: f32,
    preserve_png: bool,
}

impl PageGeometry {
    /// Orientation-adjusted page size plus margin and fit policy.
    pub fn new(
        width_mm: f32,
        height_mm: f32,
        margin_mm: f32,
        fit: FitPolicy,
    ) -> Result<Self, ValidationError> {
        if !(margin_mm.is_finite() && margin_mm >= 0.0) {
            return Err(ValidationError::InvalidMargin(margin_mm));
        }
        if !(width_mm > 2.0 * margin_mm && height_mm > 2.0 * margin_mm)
            || !width_mm.is_finite()
            || !height_mm.is_finite()
        {
            return Err(ValidationError::NonPositiveSafeArea {
                width_mm,
                height_mm,
                margin_mm,
            });
        }
        Ok(Self {
            width_mm,
            height_mm,
            margin_mm,
            fit,
            page_numbers: false,
            quality: PageOptions::default().quality,
            preserve_png: false,
        })
    }

    pub fn with_page_numbers(mut self, page_numbers: bool) -> Self {
        self.page_numbers = page_numbers;
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&quality) {
            return Err(ValidationError::QualityOutOfRange(quality));
        }
        self.quality = quality;
        Ok(self)
    }

    pub fn with_preserve_png(mut self, preserve_png: bool) -> Self {
        self.preserve_png = preserve_png;
        self
    }

    pub fn width_mm(&self) -> f32 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f32 {
        self.height_mm
    }

    pub fn margin_mm(&self) -> f32 {
        self.margin_mm
    }

    pub fn fit(&self) -> FitPolicy {
        self.fit
    }

    pub fn page_numbers(&self) -> bool {
        self.page_numbers
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn preserve_png(&self) -> bool {
        self.preserve_png
    }

    /// Width of the page minus the margin on both sides.
    pub fn safe_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    /// Height of the page minus the margin on both sides.
    pub fn safe_height_mm(&self) -> f32 {
        self.height_mm - 2.0 * self.margin_mm
    }

    /// PNG only when PNG preservation is on and the source was a PNG.
    pub fn output_format_for(&self, source: SourceFormat) -> OutputFormat {
        if self.preserve_png && source == SourceFormat::Png {
            OutputFormat::Png
        } else {
            OutputFormat::Jpeg
        }
    }

    /// Quality mapped onto the 1–100 scale JPEG encoders expect.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}
