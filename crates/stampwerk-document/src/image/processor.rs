// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — the per-page chain: redaction, watermark, footer. Operates
// on in-memory RGB pages using the `image` and `imageproc` crates.

use image::{Rgba, RgbImage, RgbaImage, imageops};
use imageproc::geometric_transformations::{self, Interpolation};
use stampwerk_core::RedactionBox;
use tracing::{debug, instrument};

use super::font::StampFont;
use super::footer::draw_footer;
use super::redact::apply_redactions;
use super::watermark::{WatermarkParams, apply_watermark};

/// Processing chain operating on a single page image.
///
/// All operations consume `self` and return a new `ImageProcessor` wrapping
/// the transformed page, enabling method chaining.
///
/// ```ignore
/// let page = ImageProcessor::from_rgb(page)
///     .redact(&masks)
///     .watermark(&text, &font, &params)
///     .into_rgb();
/// ```
pub struct ImageProcessor {
    /// The current working page.
    image: RgbImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Wrap an RGB page.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    /// Consume the processor and return the page.
    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Black out each box. A no-op for an empty slice.
    pub fn redact(self, boxes: &[RedactionBox]) -> Self {
        if boxes.is_empty() {
            return self;
        }
        Self {
            image: apply_redactions(&self.image, boxes),
        }
    }

    /// Bake the tiled watermark and hatch into the page.
    pub fn watermark(self, text: &str, font: &StampFont, params: &WatermarkParams) -> Self {
        Self {
            image: apply_watermark(&self.image, text, font, params),
        }
    }

    /// Draw the footer band.
    pub fn footer(self, text: &str, font: &StampFont) -> Self {
        Self {
            image: draw_footer(&self.image, text, font),
        }
    }
}

/// Rotate an RGBA image counter-clockwise by `degrees`, expanding the canvas
/// so no corner is clipped. Uncovered areas are transparent.
///
/// Multiples of 90 degrees use lossless rotation; other angles use bilinear
/// interpolation.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rotate_expanded(image: &RgbaImage, degrees: f32) -> RgbaImage {
    // Fast-path for exact multiples of 90. `image` rotates clockwise.
    let normalised = degrees.rem_euclid(360.0);
    if normalised.abs() < 0.01 || (normalised - 360.0).abs() < 0.01 {
        return image.clone();
    }
    if (normalised - 90.0).abs() < 0.01 {
        return imageops::rotate270(image);
    }
    if (normalised - 180.0).abs() < 0.01 {
        return imageops::rotate180(image);
    }
    if (normalised - 270.0).abs() < 0.01 {
        return imageops::rotate90(image);
    }

    let (width, height) = image.dimensions();
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let out_w = (width as f32 * cos + height as f32 * sin).ceil().max(1.0) as u32;
    let out_h = (width as f32 * sin + height as f32 * cos).ceil().max(1.0) as u32;

    // rotate_about_center keeps the canvas size, so centre the source on a
    // canvas large enough for both the source and the rotated bounds.
    let canvas_w = width.max(out_w);
    let canvas_h = height.max(out_h);
    let mut canvas = RgbaImage::new(canvas_w, canvas_h);
    imageops::replace(
        &mut canvas,
        image,
        ((canvas_w - width) / 2) as i64,
        ((canvas_h - height) / 2) as i64,
    );

    // Positive theta turns clockwise in image space.
    let rotated = geometric_transformations::rotate_about_center(
        &canvas,
        -radians,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
    );

    let cropped = imageops::crop_imm(
        &rotated,
        (canvas_w - out_w) / 2,
        (canvas_h - out_h) / 2,
        out_w,
        out_h,
    )
    .to_image();

    debug!(out_w, out_h, "General rotation applied");
    cropped
}
