// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use thiserror::Error;

/// Top-level error type for all Bildwerk operations.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Configuration / preconditions --
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("image index {index} is out of range (collection has {len} images)")]
    IndexOutOfRange { index: usize, len: usize },

    // -- Per-image pipeline errors --
    #[error("image {} ({name}) could not be decoded: {reason}", .index + 1)]
    Decode {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("image {} ({name}) could not be resampled: {reason}", .index + 1)]
    Resample {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("image {} ({name}) could not be encoded: {reason}", .index + 1)]
    Encode {
        index: usize,
        name: String,
        reason: String,
    },

    // -- Input / output --
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BildwerkError {
    /// Zero-based position of the image that caused a per-image failure.
    pub fn image_index(&self) -> Option<usize> {
        match self {
            Self::Decode { index, .. }
            | Self::Resample { index, .. }
            | Self::Encode { index, .. }
            | Self::IndexOutOfRange { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Whether the error was raised before any page was started.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Rejected page configuration or input set. Raised before a page is started;
/// the caller recovers by adjusting the options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no images to compose")]
    EmptyCollection,

    #[error(
        "margin of {margin_mm} mm leaves no printable area on a {width_mm} x {height_mm} mm page"
    )]
    NonPositiveSafeArea {
        width_mm: f32,
        height_mm: f32,
        margin_mm: f32,
    },

    #[error("unknown page size {0:?} (expected \"a4\", \"letter\" or \"custom\")")]
    UnknownPageSize(String),

    #[error("custom page size must be positive, got {width_mm} x {height_mm} mm")]
    InvalidCustomSize { width_mm: f32, height_mm: f32 },

    #[error("margin must be a finite, non-negative number of millimetres, got {0}")]
    InvalidMargin(f32),

    #[error("output quality must be between 0 and 1, got {0}")]
    QualityOutOfRange(f32),

    #[error("target DPI must be positive, got {0}")]
    InvalidDpi(f32),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;
