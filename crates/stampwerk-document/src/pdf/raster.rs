// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF rasterizer — render every page of a PDF to an RGB image through PDFium
// (`pdfium-render`, dynamically bound at runtime).

use std::path::Path;

use image::{DynamicImage, RgbImage, RgbaImage};
use pdfium_render::prelude::*;
use stampwerk_core::error::{Result, StampError};
use tracing::{debug, info, instrument};

/// PDF user-space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Renders PDF pages at a fixed resolution.
pub struct PdfRasterizer {
    pdfium: Pdfium,
    dpi: f32,
}

impl PdfRasterizer {
    /// Bind PDFium and prepare to render at `dpi`.
    ///
    /// The library is looked up in the working directory, then
    /// `vendor/pdfium/lib/`, then the system library path.
    pub fn new(dpi: f32) -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                    "./vendor/pdfium/lib/",
                ))
            })
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|err| {
                StampError::PdfError(format!(
                    "PDFium library not found (place libpdfium next to the binary or install it system-wide): {:?}",
                    err
                ))
            })?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
            dpi,
        })
    }

    /// Scale from PDF points to output pixels.
    pub fn scale(&self) -> f32 {
        self.dpi / POINTS_PER_INCH
    }

    /// Render every page of the PDF at `path`, in document order.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), dpi = self.dpi))]
    pub fn rasterize_file(&self, path: impl AsRef<Path>) -> Result<Vec<RgbImage>> {
        let document = self
            .pdfium
            .load_pdf_from_file(path.as_ref(), None)
            .map_err(|err| {
                StampError::PdfError(format!(
                    "failed to open {}: {:?}",
                    path.as_ref().display(),
                    err
                ))
            })?;

        let config = PdfRenderConfig::new().scale_page_by_factor(self.scale());
        let mut pages = Vec::new();

        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page.render_with_config(&config).map_err(|err| {
                StampError::PdfError(format!("failed to render page {}: {:?}", index + 1, err))
            })?;

            let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
            let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(
                || {
                    StampError::PdfError(format!(
                        "page {} bitmap does not match {}x{}",
                        index + 1,
                        width,
                        height
                    ))
                },
            )?;

            debug!(page = index + 1, width, height, "Page rasterized");
            pages.push(DynamicImage::ImageRgba8(rgba).to_rgb8());
        }

        info!(pages = pages.len(), "PDF rasterized");
        Ok(pages)
    }
}
