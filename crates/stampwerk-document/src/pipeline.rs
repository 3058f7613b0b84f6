// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamping pipeline — decode, redact, watermark, flatten, protect.

use std::path::PathBuf;

use stampwerk_core::error::Result;
use stampwerk_core::{Credentials, FontChoice, RedactionBox, StampConfig, StampIdentity};
use stampwerk_security::TraceToken;
use tracing::{info, instrument};

use crate::image::{WatermarkParams, load_font};
use crate::input::load_pages;
use crate::pdf::save_flat_pdf;
use crate::stamp::PageStamper;

/// One invocation: what to read, what to write, and how to mark it.
#[derive(Debug, Clone)]
pub struct StampJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub identity: StampIdentity,
    pub masks: Vec<RedactionBox>,
    pub credentials: Credentials,
    pub config: StampConfig,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampReport {
    pub pages: usize,
    pub token: TraceToken,
    pub font: FontChoice,
    pub encrypted: bool,
}

/// Run the full pipeline for `job`.
#[instrument(skip_all, fields(input = %job.input.display(), output = %job.output.display()))]
pub fn run(job: &StampJob) -> Result<StampReport> {
    job.config.validate()?;

    let token = TraceToken::derive(&job.identity);
    let watermark_text = job.identity.watermark_text(token.as_str());
    let footer_text = job
        .config
        .footer
        .then(|| job.identity.footer_text(token.as_str()));

    let (font, font_choice) = load_font(job.config.font_path.as_deref());
    info!(%token, font = %font_choice, masks = job.masks.len(), "Stamping");

    let stamper = PageStamper::new(font, WatermarkParams::from(&job.config), watermark_text)
        .with_masks(job.masks.clone())
        .with_footer(footer_text);

    let pages = load_pages(&job.input, job.config.dpi)?;
    let stamped = stamper.stamp_all(pages);
    let page_count = stamped.len();

    let encrypted = save_flat_pdf(&stamped, &job.output, &job.credentials, job.config.dpi)?;

    info!(pages = page_count, encrypted, "Copy written");
    Ok(StampReport {
        pages: page_count,
        token,
        font: font_choice,
        encrypted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PdfReader;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgb, RgbImage, Rgba, RgbaImage};
    use stampwerk_core::StampError;
    use std::path::Path;

    fn job(input: &Path, output: &Path) -> StampJob {
        StampJob {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            identity: StampIdentity::new("ABC Corp", "loan application", "Jane Doe", "2024-01-01"),
            masks: vec![RedactionBox::new(5, 5, 20, 20)],
            credentials: Credentials::default(),
            config: StampConfig {
                dpi: 150.0,
                ..StampConfig::default()
            },
        }
    }

    #[test]
    fn png_becomes_single_flat_page() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("id.png");
        let output = dir.path().join("out.pdf");
        RgbImage::from_pixel(200, 120, Rgb([240, 240, 240]))
            .save(&input)
            .unwrap();

        let report = run(&job(&input, &output)).unwrap();
        assert_eq!(report.pages, 1);
        assert!(!report.encrypted);
        assert_eq!(report.font, FontChoice::Builtin);
        assert_eq!(report.token.as_str().len(), 16);

        let reader = PdfReader::open(&output).unwrap();
        assert_eq!(reader.page_count(), 1);
        assert!(!reader.contains_text().unwrap());
    }

    #[test]
    fn gif_frames_become_pages() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scan.gif");
        let output = dir.path().join("out.pdf");
        {
            let mut encoder = GifEncoder::new(std::fs::File::create(&input).unwrap());
            let frames = [30u8, 90, 150, 210].map(|shade| {
                Frame::from_parts(
                    RgbaImage::from_pixel(64, 48, Rgba([shade, shade, shade, 255])),
                    0,
                    0,
                    Delay::from_numer_denom_ms(50, 1),
                )
            });
            encoder.encode_frames(frames).unwrap();
        }

        let report = run(&job(&input, &output)).unwrap();
        assert_eq!(report.pages, 4);
        assert_eq!(PdfReader::open(&output).unwrap().page_count(), 4);
    }

    #[test]
    fn password_protects_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("id.png");
        let output = dir.path().join("locked.pdf");
        RgbImage::from_pixel(80, 60, Rgb([255, 255, 255]))
            .save(&input)
            .unwrap();

        let mut locked = job(&input, &output);
        locked.credentials = Credentials::new(Some("1234".into()), None);

        let report = run(&locked).unwrap();
        assert!(report.encrypted);
        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.windows(8).any(|w| w == b"/Encrypt"));
    }

    #[test]
    fn same_identity_same_token() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("id.png");
        RgbImage::from_pixel(40, 40, Rgb([0, 0, 0])).save(&input).unwrap();

        let first = run(&job(&input, &dir.path().join("a.pdf"))).unwrap();
        let second = run(&job(&input, &dir.path().join("b.pdf"))).unwrap();
        assert_eq!(first.token, second.token);
    }

    #[test]
    fn missing_input_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let result = run(&job(&dir.path().join("nope.png"), &output));
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = job(&dir.path().join("in.png"), &dir.path().join("out.pdf"));
        bad.config.dpi = 0.0;
        assert!(matches!(run(&bad), Err(StampError::Config(_))));
    }
}
