// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Footer stamp — a centred line of text on a translucent white band along the
// bottom of the page.

use image::{DynamicImage, Pixel, Rgba, RgbImage};
use tracing::instrument;

use super::font::StampFont;

/// Footer font size, per shorter side.
pub const FOOTER_SIZE_RATIO: f32 = 0.035;
/// Gap between the text and the bottom edge, per shorter side.
pub const FOOTER_MARGIN_RATIO: f32 = 0.02;
/// Alpha of the white band behind the text.
pub const BAND_ALPHA: u8 = 200;

/// Where the footer lands on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterLayout {
    /// Left edge of the text; negative when the text is wider than the page.
    pub text_x: i64,
    /// Top edge of the text.
    pub text_y: i64,
    /// First band row (inclusive).
    pub band_top: i64,
    /// Last band row (inclusive).
    pub band_bottom: i64,
}

impl FooterLayout {
    pub fn compute(width: u32, height: u32, text_w: u32, text_h: u32) -> Self {
        let margin = (width.min(height) as f32 * FOOTER_MARGIN_RATIO) as i64;
        let text_x = (width as i64 - text_w as i64).div_euclid(2);
        let text_y = height as i64 - text_h as i64 - margin;
        Self {
            text_x,
            text_y,
            band_top: text_y - margin / 2,
            band_bottom: text_y + text_h as i64 + margin / 2,
        }
    }
}

/// Draw `text` centred at the bottom of `page` over a translucent band.
#[instrument(skip_all, fields(width = page.width(), height = page.height()))]
pub fn draw_footer(page: &RgbImage, text: &str, font: &StampFont) -> RgbImage {
    let (width, height) = page.dimensions();
    let px = ((width.min(height) as f32 * FOOTER_SIZE_RATIO).floor()).max(1.0);

    let glyphs = font.render_mask(text, px);
    let layout = FooterLayout::compute(width, height, glyphs.width(), glyphs.height());

    let mut canvas = DynamicImage::ImageRgb8(page.clone()).to_rgba8();

    let band = Rgba([255, 255, 255, BAND_ALPHA]);
    let top = layout.band_top.max(0);
    let bottom = layout.band_bottom.min(height as i64 - 1);
    for y in top..=bottom {
        for x in 0..width {
            canvas.get_pixel_mut(x, y as u32).blend(&band);
        }
    }

    for (gx, gy, coverage) in glyphs.enumerate_pixels() {
        let coverage = coverage.0[0];
        if coverage == 0 {
            continue;
        }
        let x = layout.text_x + gx as i64;
        let y = layout.text_y + gy as i64;
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            continue;
        }
        canvas
            .get_pixel_mut(x as u32, y as u32)
            .blend(&Rgba([0, 0, 0, coverage]));
    }

    DynamicImage::ImageRgba8(canvas).to_rgb8()
}
