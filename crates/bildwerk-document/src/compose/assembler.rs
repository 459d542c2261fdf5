// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembler — runs the page composer over an image snapshot, in
// order, and finalizes the output document.

use std::sync::Arc;

use bildwerk_core::error::{BildwerkError, Result, ValidationError};
use bildwerk_core::{ComposeConfig, ImageRecord, PageGeometry, PageOptions};
use tracing::{info, instrument, warn};

use super::page::{DEFAULT_LABEL_FONT_SIZE_PT, PageComposer};
use super::{CancelToken, ComposeOutcome, Document, ProgressSink};
use crate::image::ImageCodec;
use crate::layout::ResizeBudgeter;
use crate::pdf::PdfWriter;
use crate::traits::{Decoder, Encoder, PageWriter, Resampler};

/// Owns the raster capabilities and drives a composition run.
#[derive(Clone)]
pub struct DocumentAssembler {
    decoder: Arc<dyn Decoder>,
    resampler: Arc<dyn Resampler>,
    encoder: Arc<dyn Encoder>,
    budgeter: ResizeBudgeter,
    label_font_size_pt: f32,
}

impl DocumentAssembler {
    pub fn new(
        decoder: Arc<dyn Decoder>,
        resampler: Arc<dyn Resampler>,
        encoder: Arc<dyn Encoder>,
    ) -> Self {
        Self {
            decoder,
            resampler,
            encoder,
            budgeter: ResizeBudgeter::default(),
            label_font_size_pt: DEFAULT_LABEL_FONT_SIZE_PT,
        }
    }

    /// Assembler using [`ImageCodec`] for every raster stage.
    pub fn with_image_codec() -> Self {
        let codec = Arc::new(ImageCodec::new());
        Self::new(codec.clone(), codec.clone(), codec)
    }

    /// [`ImageCodec`]-backed assembler tuned by `config`.
    pub fn from_config(config: &ComposeConfig) -> Self {
        Self::with_image_codec()
            .with_target_dpi(config.target_dpi)
            .with_label_font_size(config.label_font_size_pt)
    }

    pub fn with_target_dpi(mut self, target_dpi: f32) -> Self {
        self.budgeter = ResizeBudgeter::new(target_dpi);
        self
    }

    pub fn with_label_font_size(mut self, font_size_pt: f32) -> Self {
        self.label_font_size_pt = font_size_pt;
        self
    }

    /// Compose one page per image of `snapshot` into `writer`.
    ///
    /// The first failing image ends the run: `progress.on_error` is told, the
    /// error is returned and the writer is left unfinalized. A tripped
    /// `cancel` token ends it with [`ComposeOutcome::Cancelled`].
    #[instrument(skip_all, fields(images = snapshot.len()))]
    pub fn compose(
        &self,
        snapshot: &[ImageRecord],
        geometry: &PageGeometry,
        writer: &mut dyn PageWriter,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<ComposeOutcome> {
        let total = snapshot.len();
        if total == 0 {
            let err = BildwerkError::from(ValidationError::EmptyCollection);
            progress.on_error(&err);
            return Err(err);
        }

        let composer = PageComposer::new(
            self.decoder.as_ref(),
            self.resampler.as_ref(),
            self.encoder.as_ref(),
            self.budgeter,
        )
        .with_label_font_size(self.label_font_size_pt);

        for (index, record) in snapshot.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(completed = index, total, "Composition cancelled");
                return Ok(ComposeOutcome::Cancelled {
                    completed: index,
                    total,
                });
            }

            if let Err(err) = composer.compose_page(writer, record, index, total, geometry) {
                warn!(index, name = record.name(), error = %err, "Composition aborted");
                progress.on_error(&err);
                return Err(err);
            }
            progress.on_progress(index + 1, total);
        }

        let bytes = writer.finalize().inspect_err(|err| progress.on_error(err))?;
        info!(pages = total, bytes = bytes.len(), "Document composed");
        Ok(ComposeOutcome::Finished(Document {
            bytes,
            page_count: total,
        }))
    }
}

/// Compose `images` into a PDF laid out by `options`.
///
/// `config` supplies the resampling DPI, the document title and the label
/// size; its own `page` field is not consulted, see [`compose_with_config`].
/// Validation failures are returned before any page is started.
pub fn compose_document(
    images: &[ImageRecord],
    options: &PageOptions,
    config: &ComposeConfig,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<ComposeOutcome> {
    if images.is_empty() {
        let err = BildwerkError::from(ValidationError::EmptyCollection);
        progress.on_error(&err);
        return Err(err);
    }
    let geometry = options
        .resolve()
        .and_then(|geometry| config.check_target_dpi().map(|()| geometry))
        .map_err(BildwerkError::from)
        .inspect_err(|err| progress.on_error(err))?;

    let mut writer = PdfWriter::new(&config.title);
    DocumentAssembler::from_config(config).compose(images, &geometry, &mut writer, progress, cancel)
}

/// [`compose_document`] with the page options taken from `config`.
pub fn compose_with_config(
    images: &[ImageRecord],
    config: &ComposeConfig,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<ComposeOutcome> {
    compose_document(images, &config.page, config, progress, cancel)
}
