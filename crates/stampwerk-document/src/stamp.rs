// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page stamper — everything needed to process one page, applied identically
// to every page of a run.

use image::RgbImage;
use stampwerk_core::RedactionBox;
use tracing::{debug, instrument};

use crate::image::{ImageProcessor, StampFont, WatermarkParams};

/// Redaction, watermark, and optional footer settings for a run.
#[derive(Debug)]
pub struct PageStamper {
    font: StampFont,
    params: WatermarkParams,
    watermark_text: String,
    footer_text: Option<String>,
    masks: Vec<RedactionBox>,
}

impl PageStamper {
    pub fn new(font: StampFont, params: WatermarkParams, watermark_text: impl Into<String>) -> Self {
        Self {
            font,
            params,
            watermark_text: watermark_text.into(),
            footer_text: None,
            masks: Vec::new(),
        }
    }

    /// Boxes to black out before watermarking.
    pub fn with_masks(mut self, masks: Vec<RedactionBox>) -> Self {
        self.masks = masks;
        self
    }

    /// Enable the footer band with `text`; `None` disables it.
    pub fn with_footer(mut self, text: Option<String>) -> Self {
        self.footer_text = text;
        self
    }

    /// Redact, watermark, then footer one page.
    #[instrument(skip_all, fields(width = page.width(), height = page.height()))]
    pub fn stamp_page(&self, page: RgbImage) -> RgbImage {
        let processor = ImageProcessor::from_rgb(page)
            .redact(&self.masks)
            .watermark(&self.watermark_text, &self.font, &self.params);

        let processor = match &self.footer_text {
            Some(text) => processor.footer(text, &self.font),
            None => processor,
        };
        processor.into_rgb()
    }

    /// Stamp `pages` in order.
    pub fn stamp_all(&self, pages: Vec<RgbImage>) -> Vec<RgbImage> {
        let total = pages.len();
        pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| {
                debug!(page = index + 1, total, "Stamping page");
                self.stamp_page(page)
            })
            .collect()
    }
}
