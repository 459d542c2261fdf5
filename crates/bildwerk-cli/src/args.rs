// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and how they override a `ComposeConfig`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bildwerk_core::{ComposeConfig, FitPolicy, Orientation, PageSize};
use clap::{Parser, ValueEnum};

/// Fit policy as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum FitArg {
    /// Show the whole image, leaving background on one axis
    Fit,
    /// Fill the printable area, clipping the overflow
    Cover,
    /// Fill the printable area, ignoring the aspect ratio
    Stretch,
}

impl From<FitArg> for FitPolicy {
    fn from(arg: FitArg) -> Self {
        match arg {
            FitArg::Fit => Self::Fit,
            FitArg::Cover => Self::Cover,
            FitArg::Stretch => Self::Stretch,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "bildwerk",
    about = "Lay out images as a PDF, one image per page",
    long_about = "Lay out images as a PDF, one image per page.\n\
                  \n\
                  Accepts PNG, JPEG and WEBP files. Pages follow the order the files are\n\
                  given in; a file repeated with the same name and size is added once.",
    version
)]
pub struct Args {
    /// Image files, in page order
    #[arg(value_name = "IMAGES", required = true)]
    pub images: Vec<PathBuf>,

    /// Output PDF path
    #[arg(short, long, value_name = "OUTPUT", default_value = "images.pdf")]
    pub output: PathBuf,

    /// JSON config file; flags given here override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Page size: a4, letter or custom
    #[arg(long, value_name = "SIZE")]
    pub page_size: Option<String>,

    /// Custom page width in millimetres
    #[arg(long, value_name = "MM", requires = "height_mm")]
    pub width_mm: Option<f32>,

    /// Custom page height in millimetres
    #[arg(long, value_name = "MM", requires = "width_mm")]
    pub height_mm: Option<f32>,

    /// Lay pages out in landscape
    #[arg(long)]
    pub landscape: bool,

    /// Margin on every side, in millimetres
    #[arg(short, long, value_name = "MM")]
    pub margin: Option<f32>,

    /// How images fill the printable area
    #[arg(long, value_enum)]
    pub fit: Option<FitArg>,

    /// JPEG quality between 0 and 1
    #[arg(short, long, value_name = "Q")]
    pub quality: Option<f32>,

    /// Print "n / total" on every page
    #[arg(long)]
    pub page_numbers: bool,

    /// Keep PNG images as PNG (with transparency) instead of re-encoding them
    #[arg(long)]
    pub preserve_png: bool,

    /// Resolution images are resampled to before embedding
    #[arg(long, value_name = "DPI")]
    pub dpi: Option<f32>,

    /// Title stored in the PDF metadata
    #[arg(long)]
    pub title: Option<String>,

    /// Turn the image at page N a quarter turn clockwise (repeatable)
    #[arg(short, long, value_name = "N")]
    pub rotate: Vec<usize>,

    /// Suppress the progress bar and summary
    #[arg(long)]
    pub quiet: bool,

    /// Show debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
}

impl Args {
    /// Load the config file, if any, and apply the flags on top of it.
    pub fn compose_config(&self) -> Result<ComposeConfig> {
        let mut config = match &self.config {
            Some(path) => ComposeConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?,
            None => ComposeConfig::default(),
        };
        self.apply_to(&mut config)?;
        config.validate().context("Invalid page options")?;
        Ok(config)
    }

    fn apply_to(&self, config: &mut ComposeConfig) -> Result<()> {
        let custom = self.width_mm.zip(self.height_mm);
        match (&self.page_size, custom) {
            (Some(key), _) => config.page.page_size = PageSize::from_key(key, custom)?,
            (None, Some((width_mm, height_mm))) => {
                config.page.page_size = PageSize::custom(width_mm, height_mm)?
            }
            (None, None) => {}
        }
        if self.landscape {
            config.page.orientation = Orientation::Landscape;
        }
        if let Some(margin) = self.margin {
            config.page.margin_mm = margin;
        }
        if let Some(fit) = self.fit {
            config.page.fit = fit.into();
        }
        if let Some(quality) = self.quality {
            config.page.quality = quality;
        }
        if self.page_numbers {
            config.page.page_numbers = true;
        }
        if self.preserve_png {
            config.page.preserve_png = true;
        }
        if let Some(dpi) = self.dpi {
            config.target_dpi = dpi;
        }
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        Ok(())
    }

    /// Zero-based indices to rotate, in the order given.
    pub fn rotations(&self) -> Result<Vec<usize>> {
        self.rotate
            .iter()
            .map(|&page| match page {
                0 => bail!("--rotate takes a 1-based page number"),
                n => Ok(n - 1),
            })
            .collect()
    }
}
