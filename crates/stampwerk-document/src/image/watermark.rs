// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Watermark compositor — a rotated, outlined text stamp tiled across the whole
// page plus a faint crossing hatch. Cropping or inpainting one region leaves
// the rest of the pattern intact.
//
// Every size is derived from the shorter page side, so the result looks the
// same at 150 DPI and at 600 DPI.

use image::{DynamicImage, GrayImage, Pixel, Rgba, RgbImage, RgbaImage, imageops};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_line_segment_mut;
use imageproc::morphology::dilate;
use stampwerk_core::StampConfig;
use tracing::{debug, instrument};

use super::font::StampFont;
use super::processor::rotate_expanded;

/// Outline width around each glyph, in pixels.
pub const STROKE_WIDTH: u32 = 2;
/// Transparent margin around the text inside a tile, per shorter side.
pub const PAD_RATIO: f32 = 0.02;
/// Outline alpha relative to the fill alpha.
pub const OUTLINE_ALPHA_RATIO: f32 = 0.9;
/// Added to the tile size when the density step would make tiles overlap.
pub const STEP_SLACK: u32 = 2;
/// Distance between hatch lines, per shorter side.
pub const HATCH_GAP_RATIO: f32 = 0.06;
/// Alpha of the hatch lines.
pub const HATCH_ALPHA: u8 = 18;

/// Rendering parameters for [`apply_watermark`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkParams {
    /// Fill alpha, 0-255.
    pub opacity: u8,
    /// Counter-clockwise rotation in degrees.
    pub angle_degrees: f32,
    /// Tile step as a fraction of the shorter side.
    pub density: f32,
    /// Font size as a fraction of the shorter side.
    pub font_size_ratio: f32,
}

impl Default for WatermarkParams {
    fn default() -> Self {
        Self::from(&StampConfig::default())
    }
}

impl From<&StampConfig> for WatermarkParams {
    fn from(config: &StampConfig) -> Self {
        Self {
            opacity: config.opacity,
            angle_degrees: config.angle_degrees,
            density: config.density,
            font_size_ratio: config.font_size_ratio,
        }
    }
}

/// Watermark font size in pixels for a page whose shorter side is
/// `short_side`. Never below one pixel.
pub fn font_px(short_side: u32, ratio: f32) -> f32 {
    let px = (short_side as f32 * ratio).floor();
    if px.is_finite() { px.max(1.0) } else { 1.0 }
}

/// Distance between tile placements.
///
/// The density step is used unless it is smaller than the rotated tile, in
/// which case tiles would overlap and darken the page; the step is then forced
/// to just past the tile. Non-finite or negative densities take the forced
/// step, so the result is always at least `tile_max + 2` or the density step,
/// and never zero.
pub fn tiling_step(short_side: u32, density: f32, tile_max: u32) -> u32 {
    let raw = (short_side as f32 * density).floor();
    let step = if raw.is_finite() && raw > 0.0 {
        raw as u32
    } else {
        0
    };
    if step < tile_max {
        tile_max + STEP_SLACK
    } else {
        step
    }
}

/// Placement origins along one axis: from one tile before the page edge to
/// one tile past the far edge.
pub fn tile_origins(extent: u32, tile: u32, step: u32) -> Vec<i64> {
    let start = -(tile as i64);
    let end = extent as i64 + tile as i64;
    (start..end).step_by(step.max(1) as usize).collect()
}

/// Render one stamp: white translucent text over a darker, slightly less
/// opaque outline, with `pad` transparent pixels on every side.
pub fn render_tile(text: &str, font: &StampFont, px: f32, pad: u32, opacity: u8) -> RgbaImage {
    let glyphs = font.render_mask(text, px);

    // Room for the outline on every side of the glyphs.
    let mut fill = GrayImage::new(
        glyphs.width() + 2 * STROKE_WIDTH,
        glyphs.height() + 2 * STROKE_WIDTH,
    );
    imageops::replace(&mut fill, &glyphs, STROKE_WIDTH as i64, STROKE_WIDTH as i64);
    let outline = dilate(&fill, Norm::LInf, STROKE_WIDTH as u8);

    let outline_alpha = (opacity as f32 * OUTLINE_ALPHA_RATIO).floor() / 255.0;
    let fill_alpha = opacity as f32 / 255.0;

    let mut tile = RgbaImage::new(fill.width() + 2 * pad, fill.height() + 2 * pad);
    for (x, y, coverage) in fill.enumerate_pixels() {
        let ring = outline.get_pixel(x, y).0[0];
        let coverage = coverage.0[0];
        if ring == 0 && coverage == 0 {
            continue;
        }

        let mut pixel = Rgba([0, 0, 0, scale_alpha(ring, outline_alpha)]);
        if coverage > 0 {
            pixel.blend(&Rgba([255, 255, 255, scale_alpha(coverage, fill_alpha)]));
        }
        tile.put_pixel(x + pad, y + pad, pixel);
    }
    tile
}

fn scale_alpha(coverage: u8, alpha: f32) -> u8 {
    (coverage as f32 * alpha).round().clamp(0.0, 255.0) as u8
}

/// Full-page transparent layer with `tile` stamped at every origin pair.
pub fn tile_layer(width: u32, height: u32, tile: &RgbaImage, step: u32) -> RgbaImage {
    let mut layer = RgbaImage::new(width, height);
    let xs = tile_origins(width, tile.width(), step);
    let ys = tile_origins(height, tile.height(), step);
    for &y in &ys {
        for &x in &xs {
            imageops::overlay(&mut layer, tile, x, y);
        }
    }
    debug!(columns = xs.len(), rows = ys.len(), step, "Tiles placed");
    layer
}

/// Two families of 1 px lines at a fixed gap, very faint.
pub fn hatch_layer(width: u32, height: u32) -> RgbaImage {
    let mut hatch = RgbaImage::new(width, height);
    let gap = ((width.min(height) as f32 * HATCH_GAP_RATIO) as u32).max(1);
    let color = Rgba([0, 0, 0, HATCH_ALPHA]);
    let (w, h) = (width as f32, height as f32);

    for i in (0..width + height).step_by(gap as usize) {
        let i = i as f32;
        draw_line_segment_mut(&mut hatch, (i, 0.0), (0.0, i), color);
        draw_line_segment_mut(&mut hatch, (w, i), (i, h), color);
    }
    hatch
}

/// Composite the tiled watermark and the hatch over `base`.
///
/// Order is base, watermark, hatch; the result is opaque RGB.
#[instrument(skip(base, text, font), fields(width = base.width(), height = base.height()))]
pub fn apply_watermark(
    base: &RgbImage,
    text: &str,
    font: &StampFont,
    params: &WatermarkParams,
) -> RgbImage {
    let (width, height) = base.dimensions();
    let short_side = width.min(height);

    let px = font_px(short_side, params.font_size_ratio);
    let pad = (short_side as f32 * PAD_RATIO) as u32;
    let tile = rotate_expanded(
        &render_tile(text, font, px, pad, params.opacity),
        params.angle_degrees,
    );
    let tile_max = tile.width().max(tile.height());
    let step = tiling_step(short_side, params.density, tile_max);

    debug!(
        font_px = px,
        tile_w = tile.width(),
        tile_h = tile.height(),
        step,
        "Watermark tile ready"
    );

    let layer = tile_layer(width, height, &tile, step);
    let hatch = hatch_layer(width, height);

    let mut merged = DynamicImage::ImageRgb8(base.clone()).to_rgba8();
    imageops::overlay(&mut merged, &layer, 0, 0);
    imageops::overlay(&mut merged, &hatch, 0, 0);
    DynamicImage::ImageRgba8(merged).to_rgb8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn font_size_follows_shorter_side() {
        assert_eq!(font_px(2480, 0.015), 37.0);
        assert_eq!(font_px(10, 0.015), 1.0);
        assert_eq!(font_px(1000, f32::NAN), 1.0);
    }

    #[test]
    fn density_step_used_when_large_enough() {
        assert_eq!(tiling_step(1000, 0.25, 150), 250);
        assert_eq!(tiling_step(1000, 0.15, 150), 150);
    }

    #[test]
    fn small_step_forced_past_tile() {
        assert_eq!(tiling_step(1000, 0.1, 150), 152);
        assert_eq!(tiling_step(1000, 0.0, 40), 42);
    }

    #[test]
    fn degenerate_density_is_forced() {
        assert_eq!(tiling_step(1000, -0.5, 30), 32);
        assert_eq!(tiling_step(1000, f32::NAN, 30), 32);
        assert_eq!(tiling_step(1000, f32::INFINITY, 30), 32);
    }

    #[test]
    fn step_never_below_tile_for_any_density() {
        for tile_max in [1u32, 7, 64, 500] {
            for density in [-1.0f32, 0.0, 0.01, 0.1, 0.3, 1.0, 5.0] {
                let step = tiling_step(800, density, tile_max);
                assert!(step >= tile_max, "density {density}, tile {tile_max}");
            }
        }
    }

    #[test]
    fn origins_cover_page_and_margins() {
        let (extent, tile, step) = (1000u32, 150u32, 152u32);
        let origins = tile_origins(extent, tile, step);
        assert_eq!(origins[0], -150);
        assert!(*origins.last().unwrap() + step as i64 >= (extent + tile) as i64);
        // Every page pixel falls inside some [origin, origin + step) cell.
        for p in 0..extent as i64 {
            assert!(origins.iter().any(|&o| o <= p && p < o + step as i64), "gap at {p}");
        }
    }

    #[test]
    fn tile_has_padding_stroke_and_colours() {
        let font = StampFont::Builtin;
        let (tw, th) = font.measure("AB", 8.0);
        let tile = render_tile("AB", &font, 8.0, 5, 80);
        assert_eq!(tile.width(), tw + 2 * STROKE_WIDTH + 10);
        assert_eq!(tile.height(), th + 2 * STROKE_WIDTH + 10);

        // Padding stays transparent.
        for x in 0..tile.width() {
            assert_eq!(tile.get_pixel(x, 0).0[3], 0);
        }

        // Outline-only pixels are black at 90% of the fill alpha.
        assert!(tile.pixels().any(|p| p.0 == [0, 0, 0, 72]));
        // Fill pixels are lighter and at least as opaque as the fill.
        assert!(tile.pixels().any(|p| p.0[0] > 100 && p.0[3] >= 80));
    }

    #[test]
    fn empty_text_gives_valid_transparent_tile() {
        let tile = render_tile("", &StampFont::Builtin, 12.0, 3, 80);
        assert_eq!(tile.width(), 2 * STROKE_WIDTH + 6);
        assert!(tile.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn hatch_is_faint_and_gapped() {
        let hatch = hatch_layer(100, 100);
        // Gap is 6 px: the line (6,0)-(0,6) passes through (3,3) and (2,4).
        assert_eq!(hatch.get_pixel(3, 3).0, [0, 0, 0, HATCH_ALPHA]);
        assert_eq!(hatch.get_pixel(2, 4).0[3], HATCH_ALPHA);
        assert!(hatch.pixels().all(|p| p.0[3] == 0 || p.0[3] == HATCH_ALPHA));
        assert!(hatch.pixels().any(|p| p.0[3] == 0));
    }

    #[test]
    fn watermark_changes_page_but_keeps_size() {
        let page = RgbImage::from_pixel(300, 200, WHITE);
        let out = apply_watermark(&page, "CONFIDENTIAL COPY", &StampFont::Builtin, &WatermarkParams::default());
        assert_eq!(out.dimensions(), page.dimensions());
        assert!(out.pixels().any(|p| *p != WHITE));
    }

    #[test]
    fn outline_font_watermark_marks_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("helvetica.ttf");
        std::fs::write(&path, printpdf::BuiltinFont::Helvetica.get_subset_font().bytes).unwrap();
        let font = StampFont::from_file(&path).unwrap();

        let page = RgbImage::from_pixel(400, 400, WHITE);
        let params = WatermarkParams {
            opacity: 200,
            font_size_ratio: 0.05,
            ..WatermarkParams::default()
        };
        let out = apply_watermark(&page, "ID:0123456789abcdef", &font, &params);
        assert_eq!(out.dimensions(), page.dimensions());
        // Darker than the hatch alone can make white.
        assert!(out.pixels().any(|p| p.0[0] < 150));
    }

    #[test]
    fn watermark_is_deterministic() {
        let page = RgbImage::from_fn(160, 120, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        let params = WatermarkParams::default();
        let a = apply_watermark(&page, "ID:0123456789abcdef", &StampFont::Builtin, &params);
        let b = apply_watermark(&page, "ID:0123456789abcdef", &StampFont::Builtin, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn watermark_reaches_every_quadrant() {
        let page = RgbImage::from_pixel(400, 400, WHITE);
        let params = WatermarkParams {
            opacity: 200,
            font_size_ratio: 0.05,
            ..WatermarkParams::default()
        };
        let out = apply_watermark(&page, "STAMP", &StampFont::Builtin, &params);
        // Outline pixels darken far more than the hatch can on its own.
        let dark_in = |x0: u32, y0: u32| {
            (y0..y0 + 200).any(|y| (x0..x0 + 200).any(|x| out.get_pixel(x, y).0[0] < 150))
        };
        assert!(dark_in(0, 0));
        assert!(dark_in(200, 0));
        assert!(dark_in(0, 200));
        assert!(dark_in(200, 200));
    }

    #[test]
    fn empty_text_leaves_only_hatch() {
        let page = RgbImage::from_pixel(200, 150, WHITE);
        let out = apply_watermark(&page, "", &StampFont::Builtin, &WatermarkParams::default());
        // White under an alpha-18 black line lands around 237.
        assert!(out.pixels().all(|p| p.0[0] >= 230));
        assert!(out.pixels().any(|p| *p != WHITE));
    }

    #[test]
    fn zero_opacity_leaves_only_hatch() {
        let page = RgbImage::from_pixel(200, 150, WHITE);
        let params = WatermarkParams {
            opacity: 0,
            ..WatermarkParams::default()
        };
        let out = apply_watermark(&page, "INVISIBLE", &StampFont::Builtin, &params);
        assert!(out.pixels().all(|p| p.0[0] >= 230));
    }

    #[test]
    fn negative_density_still_renders() {
        let page = RgbImage::from_pixel(120, 120, WHITE);
        let params = WatermarkParams {
            density: -1.0,
            ..WatermarkParams::default()
        };
        let out = apply_watermark(&page, "X", &StampFont::Builtin, &params);
        assert_eq!(out.dimensions(), (120, 120));
    }
}
