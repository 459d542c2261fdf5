// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-document — Page layout, raster budgeting and PDF composition for
// Bildwerk.
//
// Provides the placement and resize-budget arithmetic, the `image`-backed
// codec, the `printpdf`-backed page writer, and the composer/assembler that
// turn an ordered image snapshot into one PDF page per image.

pub mod compose;
pub mod image;
pub mod layout;
pub mod loader;
pub mod pdf;
pub mod traits;

// Re-export the primary entry points so callers can use `bildwerk_document::compose_document` etc.
pub use compose::{
    CancelToken, Callbacks, ComposeOutcome, ComposedPage, Document, DocumentAssembler,
    NoProgress, PageComposer, ProgressSink, compose_document,
};
pub use compose::assembler::compose_with_config;
pub use self::image::ImageCodec;
pub use layout::{PlacementCalculator, PlacementResult, ResizeBudgeter};
pub use loader::{load_image, load_images, probe_record};
pub use pdf::PdfWriter;
pub use traits::{Decoder, Encoder, PageWriter, RasterImage, ResampleOptions, Resampler, StageError};
