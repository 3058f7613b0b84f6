// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redaction — solid black boxes drawn before the watermark.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use stampwerk_core::RedactionBox;
use tracing::{debug, instrument};

/// Return a copy of `page` with every box filled black.
///
/// Boxes are clamped to the page; boxes entirely off the page are skipped.
#[instrument(skip_all, fields(boxes = boxes.len()))]
pub fn apply_redactions(page: &RgbImage, boxes: &[RedactionBox]) -> RgbImage {
    let mut canvas = page.clone();
    for mask in boxes {
        match clamp_to_page(mask, canvas.width(), canvas.height()) {
            Some(rect) => draw_filled_rect_mut(&mut canvas, rect, Rgb([0, 0, 0])),
            None => debug!(%mask, "Redaction box lies outside the page"),
        }
    }
    canvas
}

/// Clip an inclusive box to `[0, width) x [0, height)`.
fn clamp_to_page(mask: &RedactionBox, width: u32, height: u32) -> Option<Rect> {
    if width == 0 || height == 0 {
        return None;
    }
    let b = mask.normalized();
    let (max_x, max_y) = (width as i64 - 1, height as i64 - 1);

    if b.x2 < 0 || b.y2 < 0 || b.x1 as i64 > max_x || b.y1 as i64 > max_y {
        return None;
    }

    let x1 = (b.x1 as i64).clamp(0, max_x);
    let y1 = (b.y1 as i64).clamp(0, max_y);
    let x2 = (b.x2 as i64).clamp(0, max_x);
    let y2 = (b.y2 as i64).clamp(0, max_y);

    Some(Rect::at(x1 as i32, y1 as i32).of_size((x2 - x1 + 1) as u32, (y2 - y1 + 1) as u32))
}
