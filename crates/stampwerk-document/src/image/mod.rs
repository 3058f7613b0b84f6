// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — fonts, redaction, watermark compositing, footer stamp, and
// the per-page processing chain.

pub mod font;
pub mod footer;
pub mod processor;
pub mod redact;
pub mod watermark;

pub use font::{StampFont, load_font};
pub use processor::ImageProcessor;
pub use watermark::WatermarkParams;
