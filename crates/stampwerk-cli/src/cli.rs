// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and their translation into a stamping job.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use stampwerk_core::error::Result;
use stampwerk_core::{Credentials, RedactionBox, StampConfig, StampIdentity};
use stampwerk_document::pipeline::StampJob;

/// Burn a purpose-bound watermark into a copy of an identity document and
/// write it as a flattened, optionally password-protected PDF.
#[derive(Parser, Debug)]
#[command(name = "stampwerk")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input PDF or image (JPG, PNG, GIF, WebP, TIFF, ...)
    #[arg(long, default_value = "input.pdf")]
    pub input: PathBuf,

    /// Output PDF
    #[arg(long, default_value = "output_with_watermark.pdf")]
    pub output: PathBuf,

    /// Who the copy is issued to
    #[arg(long, default_value = "XXX Corporation")]
    pub who: String,

    /// What the copy may be used for
    #[arg(long, default_value = "For refund application only")]
    pub purpose: String,

    /// Document holder's name
    #[arg(long, default_value = "Your Name")]
    pub name: String,

    /// Issue date (YYYY-MM-DD); today when omitted
    #[arg(long)]
    pub date: Option<String>,

    /// Box to black out, as x1,y1,x2,y2 in page pixels (repeatable)
    #[arg(long = "mask", value_name = "x1,y1,x2,y2", action = ArgAction::Append)]
    pub masks: Vec<String>,

    /// Password required to open the output
    #[arg(long)]
    pub userpw: Option<String>,

    /// Owner password for the output
    #[arg(long)]
    pub ownerpw: Option<String>,

    /// TTF/OTF/TTC font for watermark text
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Draw the footer band on every page
    #[arg(long, action = ArgAction::SetTrue)]
    pub footer: bool,

    /// Watermark fill alpha, 0-255
    #[arg(long)]
    pub opacity: Option<u8>,

    /// Watermark rotation in degrees, counter-clockwise
    #[arg(long)]
    pub angle: Option<f32>,

    /// Tile spacing as a fraction of the shorter page side
    #[arg(long)]
    pub density: Option<f32>,

    /// Watermark font size as a fraction of the shorter page side
    #[arg(long = "font-size-ratio")]
    pub font_size_ratio: Option<f32>,

    /// Rasterization and output resolution
    #[arg(long)]
    pub dpi: Option<f32>,

    /// JSON rendering configuration; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub verbose: bool,
}

impl Args {
    /// Config file (or defaults) with any flag overrides applied.
    pub fn resolve_config(&self) -> Result<StampConfig> {
        let mut config = match &self.config {
            Some(path) => StampConfig::load(path)?,
            None => StampConfig::default(),
        };

        if let Some(opacity) = self.opacity {
            config.opacity = opacity;
        }
        if let Some(angle) = self.angle {
            config.angle_degrees = angle;
        }
        if let Some(density) = self.density {
            config.density = density;
        }
        if let Some(ratio) = self.font_size_ratio {
            config.font_size_ratio = ratio;
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if self.font.is_some() {
            config.font_path = self.font.clone();
        }
        if self.footer {
            config.footer = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Build the job. `today` fills in a missing `--date`.
    pub fn into_job(self, today: String) -> Result<StampJob> {
        let config = self.resolve_config()?;
        let masks = parse_masks(&self.masks, |warning| eprintln!("{}", warning));

        Ok(StampJob {
            input: self.input,
            output: self.output,
            identity: StampIdentity::new(
                self.who,
                self.purpose,
                self.name,
                self.date.unwrap_or(today),
            ),
            masks,
            credentials: Credentials::new(self.userpw, self.ownerpw),
            config,
        })
    }
}

/// Parse `--mask` values, reporting and skipping malformed ones.
pub fn parse_masks(raw: &[String], mut report: impl FnMut(String)) -> Vec<RedactionBox> {
    raw.iter()
        .filter_map(|spec| match spec.parse::<RedactionBox>() {
            Ok(mask) => Some(mask),
            Err(err) => {
                report(format!("[WARN] {}", err));
                None
            }
        })
        .collect()
}
