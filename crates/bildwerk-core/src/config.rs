// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Composition configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::types::PageOptions;

/// Settings for a composition run, loadable from JSON.
///
/// Missing fields fall back to their defaults, so a config file only needs to
/// list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Page layout options applied to every page.
    pub page: PageOptions,
    /// Resolution images are resampled to before embedding (default 150).
    pub target_dpi: f32,
    /// Title embedded in the PDF metadata.
    pub title: String,
    /// Font size of the page-number label, in points.
    pub label_font_size_pt: f32,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            page: PageOptions::default(),
            target_dpi: 150.0,
            title: "images".into(),
            label_font_size_pt: 10.0,
        }
    }
}

impl ComposeConfig {
    /// Parse a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Check the target DPI and the page options.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        self.check_target_dpi()?;
        self.page.resolve().map(|_| ())
    }

    /// The resampling DPI must be a positive, finite number.
    pub fn check_target_dpi(&self) -> std::result::Result<(), ValidationError> {
        if self.target_dpi.is_finite() && self.target_dpi > 0.0 {
            Ok(())
        } else {
            Err(ValidationError::InvalidDpi(self.target_dpi))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BildwerkError;
    use crate::types::{FitPolicy, Orientation, PageSize};

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ComposeConfig::from_json(
            r#"{ "target_dpi": 300, "page": { "fit": "cover", "orientation": "landscape" } }"#,
        )
        .expect("parse config");

        assert_eq!(config.target_dpi, 300.0);
        assert_eq!(config.page.fit, FitPolicy::Cover);
        assert_eq!(config.page.orientation, Orientation::Landscape);
        assert_eq!(config.page.page_size, PageSize::A4);
        assert_eq!(config.page.margin_mm, 10.0);
        assert_eq!(config.title, "images");
    }

    #[test]
    fn custom_page_size_parses() {
        let config = ComposeConfig::from_json(
            r#"{ "page": { "page_size": { "custom": { "width_mm": 100, "height_mm": 150 } } } }"#,
        )
        .expect("parse config");
        assert_eq!(
            config.page.page_size,
            PageSize::Custom {
                width_mm: 100.0,
                height_mm: 150.0
            }
        );
    }

    #[test]
    fn zero_dpi_is_rejected() {
        let err = ComposeConfig::from_json(r#"{ "target_dpi": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            BildwerkError::Validation(ValidationError::InvalidDpi(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bildwerk.json");
        std::fs::write(&path, r#"{ "page": { "page_numbers": true } }"#).expect("write");

        let config = ComposeConfig::from_json_file(&path).expect("load config");
        assert!(config.page.page_numbers);
    }
}
