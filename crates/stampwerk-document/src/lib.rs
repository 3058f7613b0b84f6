// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stampwerk-document — Page processing for Stampwerk.
//
// Decodes PDFs and images into pages, burns in redactions, the tiled
// watermark and the optional footer, and writes the result as a flat,
// image-only PDF.

pub mod image;
pub mod input;
pub mod pdf;
pub mod pipeline;
pub mod stamp;

// Re-export the primary items so callers can use `stampwerk_document::PageStamper` etc.
pub use crate::image::processor::ImageProcessor;
pub use input::load_pages;
pub use pdf::reader::PdfReader;
pub use pdf::writer::FlatPdfWriter;
pub use pipeline::{StampJob, StampReport, run};
pub use stamp::PageStamper;
