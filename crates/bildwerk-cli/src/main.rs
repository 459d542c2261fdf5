// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — turns an ordered set of photos and scans into a paginated PDF.
//
// Entry point. Initialises logging, loads the images into a collection, runs
// the composition on a blocking worker with a progress bar, and writes the
// result. Ctrl-C cancels between pages.

mod args;

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use bildwerk_core::{ImageCollection, format_size};
use bildwerk_document::{Callbacks, CancelToken, ComposeOutcome, compose_with_config, load_images};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

use args::Args;

/// Exit status after a Ctrl-C, following the shell convention for SIGINT.
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = args.compose_config()?;
    let rotations = args.rotations()?;
    info!("Bildwerk starting");

    let mut collection = collect(&args).await?;
    for index in rotations {
        let rotation = collection
            .rotate(index)
            .with_context(|| format!("Cannot rotate page {}", index + 1))?;
        info!(page = index + 1, degrees = rotation.degrees(), "Rotated image");
    }

    if !args.quiet {
        eprintln!(
            "{} images ({})",
            collection.len(),
            format_size(collection.total_bytes())
        );
    }

    let progress = progress_bar(collection.len(), args.quiet);
    let cancel = CancelToken::new();
    let snapshot = collection.snapshot();

    let worker = tokio::task::spawn_blocking({
        let progress = progress.clone();
        let cancel = cancel.clone();
        let config = config.clone();
        move || {
            let mut sink = Callbacks::new(
                |done, _total| progress.set_position(done as u64),
                |err: &bildwerk_core::BildwerkError| progress.abandon_with_message(err.to_string()),
            );
            compose_with_config(&snapshot, &config, &mut sink, &cancel)
        }
    });

    let outcome = await_worker(worker, tokio::signal::ctrl_c(), &cancel)
        .await
        .context("Composition worker failed")?
        .context("Could not build the PDF")?;

    match outcome {
        ComposeOutcome::Finished(document) => {
            progress.finish_and_clear();
            document
                .write_to_file(&args.output)
                .with_context(|| format!("Failed to write {}", args.output.display()))?;
            if !args.quiet {
                eprintln!(
                    "Wrote {} pages to {}",
                    document.page_count,
                    args.output.display()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        ComposeOutcome::Cancelled { completed, total } => {
            progress.abandon();
            eprintln!("Cancelled after {completed} of {total} pages; nothing written");
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
    }
}

/// Wait for the composition worker, cancelling it when `interrupt` fires.
///
/// If the interrupt cannot be listened for, the worker runs to completion.
async fn await_worker<T>(
    mut worker: JoinHandle<T>,
    interrupt: impl Future<Output = std::io::Result<()>>,
    cancel: &CancelToken,
) -> Result<T, JoinError> {
    tokio::select! {
        joined = &mut worker => joined,
        signal = interrupt => {
            match signal {
                Ok(()) => {
                    warn!("Interrupted, stopping after the current page");
                    cancel.cancel();
                }
                Err(err) => warn!(error = %err, "Cannot listen for Ctrl-C"),
            }
            worker.await
        }
    }
}

/// Load the input files and add them in order, skipping duplicates and files
/// that could not be read.
async fn collect(args: &Args) -> Result<ImageCollection> {
    let mut collection = ImageCollection::new();
    for (path, result) in args.images.iter().zip(load_images(&args.images).await) {
        match result {
            Ok(record) => {
                let name = record.name().to_string();
                if !collection.append(record) {
                    eprintln!("Skipping {}: already added", name);
                }
            }
            Err(err) => eprintln!("Skipping {}: {}", path.display(), err),
        }
    }
    if collection.is_empty() {
        bail!("None of the {} input files could be used", args.images.len());
    }
    Ok(collection)
}

fn progress_bar(total: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages {msg}")
    {
        Ok(style) => bar.set_style(style.progress_chars("=> ")),
        Err(err) => warn!(error = %err, "Falling back to the default progress style"),
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    use bildwerk_document::ImageCodec;
    use bildwerk_document::traits::Encoder;

    fn write_png(dir: &std::path::Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let raster = bildwerk_document::RasterImage::new_rgb8(width, height);
        let bytes = ImageCodec::new()
            .encode(&raster, bildwerk_core::OutputFormat::Png, 90)
            .expect("encode png");
        let path = dir.join(name);
        std::fs::write(&path, bytes).expect("write png");
        path
    }

    #[tokio::test]
    async fn collect_skips_duplicates_and_unreadable_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = write_png(dir.path(), "a.png", 8, 6);
        let b = write_png(dir.path(), "b.png", 6, 8);
        let junk = dir.path().join("junk.png");
        std::fs::write(&junk, b"not an image").expect("write junk");

        let args = Args::parse_from([
            "bildwerk",
            a.to_str().expect("utf-8"),
            junk.to_str().expect("utf-8"),
            b.to_str().expect("utf-8"),
            a.to_str().expect("utf-8"),
        ]);
        let collection = collect(&args).await.expect("collect");

        let names: Vec<_> = collection.iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }

    #[tokio::test]
    async fn collect_fails_when_nothing_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.jpg");
        let args = Args::parse_from(["bildwerk", missing.to_str().expect("utf-8")]);
        assert!(collect(&args).await.is_err());
    }

    #[tokio::test]
    async fn run_writes_the_pdf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = write_png(dir.path(), "a.png", 40, 30);
        let b = write_png(dir.path(), "b.png", 30, 40);
        let output = dir.path().join("out.pdf");

        let args = Args::parse_from([
            "bildwerk",
            "--quiet",
            "--dpi",
            "20",
            "--rotate",
            "2",
            "-o",
            output.to_str().expect("utf-8"),
            a.to_str().expect("utf-8"),
            b.to_str().expect("utf-8"),
        ]);
        let code = run(args).await.expect("run");

        assert_eq!(code, ExitCode::SUCCESS);
        let bytes = std::fs::read(&output).expect("output exists");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn interrupt_cancels_the_worker() {
        let cancel = CancelToken::new();
        let worker = tokio::task::spawn({
            let cancel = cancel.clone();
            async move {
                while !cancel.is_cancelled() {
                    tokio::task::yield_now().await;
                }
                "stopped"
            }
        });

        let joined = await_worker(worker, async { Ok(()) }, &cancel).await;
        assert_eq!(joined.expect("worker joins"), "stopped");
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn failed_interrupt_listener_lets_the_worker_finish() {
        let cancel = CancelToken::new();
        let (release, released) = tokio::sync::oneshot::channel::<()>();
        let worker = tokio::task::spawn(async move {
            released.await.expect("released");
            "finished"
        });

        let listener = async { Err(std::io::Error::other("no signal handler")) };
        let joined = tokio::join!(await_worker(worker, listener, &cancel), async move {
            tokio::task::yield_now().await;
            release.send(()).expect("worker waiting");
        })
        .0;

        assert_eq!(joined.expect("worker joins"), "finished");
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn progress_bar_is_hidden_when_quiet() {
        assert!(progress_bar(3, true).is_hidden());
    }
}
