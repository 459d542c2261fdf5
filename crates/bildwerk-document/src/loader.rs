// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image loader — reads files into `ImageRecord`s, sniffing the format and
// probing the native dimensions without decoding the pixels.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{ImageRecord, SourceFormat};
use image::{ImageFormat, ImageReader};
use tracing::{debug, instrument, warn};

/// Load every path concurrently.
///
/// Results come back in input order, one per path, so the caller decides how
/// to treat files that failed.
#[instrument(skip_all, fields(files = paths.len()))]
pub async fn load_images(paths: &[PathBuf]) -> Vec<Result<ImageRecord>> {
    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| tokio::spawn(async move { load_image(&path).await }))
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (handle, path) in handles.into_iter().zip(paths) {
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => Err(BildwerkError::Io(std::io::Error::other(format!(
                "loading {} did not complete: {}",
                path.display(),
                err
            )))),
        };
        if let Err(err) = &result {
            warn!(path = %path.display(), error = %err, "Skipping file");
        }
        results.push(result);
    }
    results
}

/// Read and probe a single file.
pub async fn load_image(path: &Path) -> Result<ImageRecord> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let hint = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(SourceFormat::from_extension);

    tokio::task::spawn_blocking(move || probe_record_with_hint(name, bytes, hint))
        .await
        .map_err(|err| BildwerkError::Io(std::io::Error::other(err.to_string())))?
}

/// Build a record from in-memory bytes, identifying the format from content.
pub fn probe_record(name: impl Into<String>, bytes: Vec<u8>) -> Result<ImageRecord> {
    probe_record_with_hint(name.into(), bytes, None)
}

fn probe_record_with_hint(
    name: String,
    bytes: Vec<u8>,
    hint: Option<SourceFormat>,
) -> Result<ImageRecord> {
    let format = match image::guess_format(&bytes) {
        Ok(sniffed) => source_format(sniffed).ok_or_else(|| {
            BildwerkError::UnsupportedFormat(format!("{} ({:?})", name, sniffed))
        })?,
        Err(_) => hint.ok_or_else(|| {
            BildwerkError::UnsupportedFormat(format!("{} (unrecognised content)", name))
        })?,
    };

    let (width, height) = ImageReader::with_format(Cursor::new(&bytes), image_format(format))
        .into_dimensions()
        .map_err(|err| BildwerkError::UnsupportedFormat(format!("{} ({})", name, err)))?;

    debug!(%name, ?format, width, height, bytes = bytes.len(), "Image probed");
    Ok(ImageRecord::new(name, bytes, format, width, height))
}

fn source_format(format: ImageFormat) -> Option<SourceFormat> {
    match format {
        ImageFormat::Png => Some(SourceFormat::Png),
        ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
        ImageFormat::WebP => Some(SourceFormat::Webp),
        _ => None,
    }
}

fn image_format(format: SourceFormat) -> ImageFormat {
    match format {
        SourceFormat::Png => ImageFormat::Png,
        SourceFormat::Jpeg => ImageFormat::Jpeg,
        SourceFormat::Webp => ImageFormat::WebP,
    }
}
