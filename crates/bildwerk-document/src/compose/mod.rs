// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Composition — turns an ordered image snapshot into a finished document.
//
// `PageComposer` handles one image (raster preparation, placement, page
// emission); `DocumentAssembler` drives it over the whole snapshot with
// progress reporting, cancellation and abort-on-first-failure.

pub mod assembler;
pub mod page;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bildwerk_core::error::{BildwerkError, Result};
use tracing::info;

pub use assembler::{DocumentAssembler, compose_document};
pub use page::{ComposedPage, PageComposer};

/// Receives progress and failure notifications during a composition run.
///
/// Called synchronously from the pipeline; implementations should return
/// quickly and must not assume anything about the thread they run on.
pub trait ProgressSink {
    /// `completed` of `total` images have been placed.
    fn on_progress(&mut self, completed: usize, total: usize);

    /// The run is about to stop with `error`.
    fn on_error(&mut self, _error: &BildwerkError) {}
}

/// Sink that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _completed: usize, _total: usize) {}
}

/// Sink built from a pair of closures.
pub struct Callbacks<P, E> {
    on_progress: P,
    on_error: E,
}

impl<P, E> Callbacks<P, E>
where
    P: FnMut(usize, usize),
    E: FnMut(&BildwerkError),
{
    pub fn new(on_progress: P, on_error: E) -> Self {
        Self {
            on_progress,
            on_error,
        }
    }
}

impl<P> Callbacks<P, fn(&BildwerkError)>
where
    P: FnMut(usize, usize),
{
    /// Only observe progress; failures are reported through the return value.
    pub fn progress_only(on_progress: P) -> Self {
        fn ignore(_: &BildwerkError) {}
        Self {
            on_progress,
            on_error: ignore,
        }
    }
}

impl<P, E> ProgressSink for Callbacks<P, E>
where
    P: FnMut(usize, usize),
    E: FnMut(&BildwerkError),
{
    fn on_progress(&mut self, completed: usize, total: usize) {
        (self.on_progress)(completed, total);
    }

    fn on_error(&mut self, error: &BildwerkError) {
        (self.on_error)(error);
    }
}

/// Cooperative cancellation flag, checked between images.
///
/// Clones share the same flag, so one can be handed to a signal handler while
/// the pipeline holds another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A finished, serialised document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl Document {
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), &self.bytes)?;
        info!(
            pages = self.page_count,
            "Wrote document to {}",
            path.as_ref().display()
        );
        Ok(())
    }
}

/// How a composition run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeOutcome {
    Finished(Document),
    /// Stopped by the cancel token after `completed` of `total` images. No
    /// document is produced.
    Cancelled { completed: usize, total: usize },
}

impl ComposeOutcome {
    pub fn document(self) -> Option<Document> {
        match self {
            Self::Finished(document) => Some(document),
            Self::Cancelled { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_clones_share_state() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn callbacks_forward_notifications() {
        let mut seen = Vec::new();
        let mut errors = 0;
        {
            let mut sink = Callbacks::new(|c, t| seen.push((c, t)), |_: &BildwerkError| errors += 1);
            sink.on_progress(1, 2);
            sink.on_error(&BildwerkError::Pdf("boom".into()));
        }
        assert_eq!(seen, [(1, 2)]);
        assert_eq!(errors, 1);
    }
}
