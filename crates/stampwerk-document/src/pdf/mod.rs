// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — rasterizing input PDFs, writing flat image-only PDFs, and
// inspecting the result.

pub mod output;
pub mod raster;
pub mod reader;
pub mod writer;

pub use output::save_flat_pdf;
pub use raster::PdfRasterizer;
pub use reader::PdfReader;
pub use writer::FlatPdfWriter;
