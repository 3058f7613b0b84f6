// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rendering configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StampError};

/// Rendering settings for a stamping run.
///
/// Every field has a default, so a JSON config file only needs to name the
/// settings it changes. Command-line flags are applied on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampConfig {
    /// Watermark fill alpha (0-255). The outline uses 90% of this.
    pub opacity: u8,
    /// Watermark rotation in degrees, counter-clockwise.
    pub angle_degrees: f32,
    /// Tile spacing as a fraction of the shorter page side.
    pub density: f32,
    /// Watermark font size as a fraction of the shorter page side.
    pub font_size_ratio: f32,
    /// Rasterization resolution for PDF input and the resolution tag of the
    /// output pages.
    pub dpi: f32,
    /// Draw the footer band on every page.
    pub footer: bool,
    /// Font file used for watermark and footer text.
    pub font_path: Option<PathBuf>,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            opacity: 80,
            angle_degrees: 30.0,
            density: 0.1,
            font_size_ratio: 0.015,
            dpi: 300.0,
            footer: false,
            font_path: None,
        }
    }
}

impl StampConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot produce an image at all.
    ///
    /// Opacity is bounded by its type. Density is not checked here; the
    /// compositor forces a minimum tile step. The resolution is a divisor.
    pub fn validate(&self) -> Result<()> {
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(StampError::Config(format!(
                "dpi must be a positive number, got {}",
                self.dpi
            )));
        }
        if !self.font_size_ratio.is_finite() {
            return Err(StampError::Config(format!(
                "font_size_ratio must be finite, got {}",
                self.font_size_ratio
            )));
        }
        if !self.angle_degrees.is_finite() {
            return Err(StampError::Config(format!(
                "angle_degrees must be finite, got {}",
                self.angle_degrees
            )));
        }
        Ok(())
    }
}
