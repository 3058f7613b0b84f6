// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font loading and text rasterization.
//
// Text is rendered to an 8-bit coverage mask (`GrayImage`) rather than
// directly onto a page, so the watermark and footer can colour, outline, and
// blend it however they need.

use std::path::Path;

use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{GrayImage, Luma};
use stampwerk_core::FontChoice;
use stampwerk_core::error::{Result, StampError};
use tracing::{debug, instrument, warn};

/// Cell size of the built-in bitmap face.
const BUILTIN_CELL: u32 = 8;

/// A face able to rasterize text at an arbitrary pixel size.
pub enum StampFont {
    /// A TrueType/OpenType face loaded from disk.
    Outline(FontVec),
    /// The built-in 8x8 bitmap face (basic Latin and Latin-1), scaled by an
    /// integer factor. Characters outside those blocks render blank.
    Builtin,
}

impl std::fmt::Debug for StampFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline(_) => f.write_str("StampFont::Outline"),
            Self::Builtin => f.write_str("StampFont::Builtin"),
        }
    }
}

impl StampFont {
    /// Parse a font file (TTF, OTF, or the first face of a TTC).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref()).map_err(|err| {
            StampError::FontError(format!("{}: {}", path.as_ref().display(), err))
        })?;
        let font = FontVec::try_from_vec_and_index(data, 0).map_err(|err| {
            StampError::FontError(format!("{}: {}", path.as_ref().display(), err))
        })?;
        Ok(Self::Outline(font))
    }

    /// Size `(width, height)` of the mask [`StampFont::render_mask`] produces.
    ///
    /// Outline text covers the advance box and every glyph's ink, so italic
    /// overhangs and descenders past the nominal line are not clipped.
    pub fn measure(&self, text: &str, px: f32) -> (u32, u32) {
        match self {
            Self::Outline(font) => {
                let layout = layout_outline(font, text, px);
                (layout.width, layout.height)
            }
            Self::Builtin => {
                let factor = builtin_factor(px);
                let chars = text.chars().count() as u32;
                (chars * BUILTIN_CELL * factor, BUILTIN_CELL * factor)
            }
        }
    }

    /// Rasterize `text` into a coverage mask, 0 = empty, 255 = fully inked.
    pub fn render_mask(&self, text: &str, px: f32) -> GrayImage {
        match self {
            Self::Outline(font) => {
                let layout = layout_outline(font, text, px);
                let mut mask = GrayImage::new(layout.width, layout.height);
                draw_outline_text(&mut mask, font, layout.glyphs);
                mask
            }
            Self::Builtin => {
                let (width, height) = self.measure(text, px);
                let mut mask = GrayImage::new(width, height);
                draw_bitmap_text(&mut mask, text, builtin_factor(px));
                mask
            }
        }
    }
}

/// Try the requested font file, fall back to the built-in face.
///
/// Never fails: an unreadable or unparseable file is logged and replaced.
/// The returned [`FontChoice`] records which face is in use.
#[instrument(skip_all, fields(requested = ?requested.map(|p| p.display().to_string())))]
pub fn load_font(requested: Option<&Path>) -> (StampFont, FontChoice) {
    if let Some(path) = requested {
        match StampFont::from_file(path) {
            Ok(font) => {
                debug!("Using requested font");
                return (font, FontChoice::Requested(path.to_path_buf()));
            }
            Err(err) => warn!(%err, "Requested font unavailable, using built-in font"),
        }
    }
    (StampFont::Builtin, FontChoice::Builtin)
}

/// Positioned glyphs and the mask size that holds all of them.
struct OutlineLayout {
    glyphs: Vec<Glyph>,
    width: u32,
    height: u32,
}

fn layout_outline(font: &FontVec, text: &str, px: f32) -> OutlineLayout {
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);
    let baseline = scaled.ascent();

    let mut glyphs = Vec::with_capacity(text.len());
    let mut cursor = 0.0f32;
    let mut prev: Option<ab_glyph::GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            cursor += scaled.kern(prev, id);
        }
        glyphs.push(id.with_scale_and_position(scale, point(cursor, baseline)));
        cursor += scaled.h_advance(id);
        prev = Some(id);
    }

    // Advance box first, then grown to the ink of every glyph.
    let (mut min_x, mut min_y) = (0.0f32, 0.0f32);
    let (mut max_x, mut max_y) = (cursor.max(0.0), (baseline - scaled.descent()).max(0.0));
    for glyph in &glyphs {
        if let Some(outlined) = font.outline_glyph(glyph.clone()) {
            let bounds = outlined.px_bounds();
            min_x = min_x.min(bounds.min.x);
            min_y = min_y.min(bounds.min.y);
            max_x = max_x.max(bounds.max.x);
            max_y = max_y.max(bounds.max.y);
        }
    }

    // Whole-pixel shift keeps each glyph's subpixel phase.
    let (dx, dy) = (-min_x.floor(), -min_y.floor());
    for glyph in &mut glyphs {
        glyph.position.x += dx;
        glyph.position.y += dy;
    }

    OutlineLayout {
        glyphs,
        width: (max_x + dx).ceil().max(0.0) as u32,
        height: (max_y + dy).ceil().max(0.0) as u32,
    }
}

fn draw_outline_text(mask: &mut GrayImage, font: &FontVec, glyphs: Vec<Glyph>) {
    let (width, height) = mask.dimensions();

    for glyph in glyphs {
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = gx as i32 + bounds.min.x as i32;
            let y = gy as i32 + bounds.min.y as i32;
            if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = mask.get_pixel_mut(x as u32, y as u32);
                // Overlapping glyph edges keep the stronger coverage.
                pixel.0[0] = pixel.0[0].max(value);
            }
        });
    }
}

fn builtin_factor(px: f32) -> u32 {
    if px.is_finite() {
        ((px / BUILTIN_CELL as f32).round() as u32).max(1)
    } else {
        1
    }
}

fn builtin_glyph(c: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(c).or_else(|| LATIN_FONTS.get(c))
}

fn draw_bitmap_text(mask: &mut GrayImage, text: &str, factor: u32) {
    let cell = BUILTIN_CELL * factor;
    for (index, c) in text.chars().enumerate() {
        let Some(rows) = builtin_glyph(c) else {
            continue;
        };
        let origin_x = index as u32 * cell;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..BUILTIN_CELL {
                // Bit 0 is the leftmost pixel.
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..factor {
                    for dx in 0..factor {
                        let x = origin_x + col * factor + dx;
                        let y = row as u32 * factor + dy;
                        mask.put_pixel(x, y, Luma([255]));
                    }
                }
            }
        }
    }
}
