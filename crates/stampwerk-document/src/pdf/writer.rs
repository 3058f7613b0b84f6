// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flat PDF writer — one raster image per page using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Pages here carry a single image XObject and nothing
// else, so the output has no selectable text by construction.

use image::RgbImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use stampwerk_core::error::{Result, StampError};
use tracing::{debug, info, instrument};

const MM_PER_INCH: f32 = 25.4;

/// Title metadata embedded in the PDF /Info dictionary.
const DOCUMENT_TITLE: &str = "Stampwerk Copy";

/// Writes page images into a single image-only PDF.
pub struct FlatPdfWriter {
    /// Resolution tag: pixels per inch of the page images.
    dpi: f32,
}

impl FlatPdfWriter {
    pub fn new(dpi: f32) -> Self {
        Self { dpi }
    }

    /// Physical page size in millimetres for an image of `width` x `height`
    /// pixels at this writer's resolution.
    pub fn page_size_mm(&self, width: u32, height: u32) -> (f32, f32) {
        (
            width as f32 / self.dpi * MM_PER_INCH,
            height as f32 / self.dpi * MM_PER_INCH,
        )
    }

    /// Encode `pages` in order, one page each, sized to the image.
    #[instrument(skip_all, fields(pages = pages.len(), dpi = self.dpi))]
    pub fn render(&self, pages: &[RgbImage]) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(StampError::EmptyDocument(
                "no pages to write".to_string(),
            ));
        }

        let mut doc = PdfDocument::new(DOCUMENT_TITLE);
        let mut pdf_pages: Vec<PdfPage> = Vec::with_capacity(pages.len());

        for (index, page) in pages.iter().enumerate() {
            let (width, height) = page.dimensions();
            let raw = RawImage {
                pixels: RawImageData::U8(page.as_raw().clone()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            // At the tagged DPI the image fills the page exactly.
            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: Some(1.0),
                    scale_y: Some(1.0),
                    dpi: Some(self.dpi),
                    rotate: None,
                },
            }];

            let (w_mm, h_mm) = self.page_size_mm(width, height);
            pdf_pages.push(PdfPage::new(Mm(w_mm), Mm(h_mm), ops));
            debug!(page = index + 1, width, height, w_mm, h_mm, "Page placed");
        }

        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        info!(
            bytes = output.len(),
            warnings = warnings.len(),
            "Flat PDF encoded"
        );
        Ok(output)
    }
}
