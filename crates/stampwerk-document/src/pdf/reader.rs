// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — inspect a finished PDF with `lopdf`: page count, page size, and
// whether any page still carries text operators.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Object};
use stampwerk_core::error::{Result, StampError};
use tracing::{debug, info, instrument};

/// Text-showing and text-object operators.
const TEXT_OPERATORS: [&str; 5] = ["BT", "Tj", "TJ", "'", "\""];

/// Read-only view of an existing PDF.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            StampError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            StampError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page size `(width, height)` in points for a 1-indexed page, from its
    /// `/MediaBox`.
    pub fn page_size(&self, page_number: u32) -> Result<(f32, f32)> {
        let pages = self.document.get_pages();
        let page_id = *pages.get(&page_number).ok_or_else(|| {
            StampError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })?;

        let media_box = self
            .document
            .get_object(page_id)
            .and_then(Object::as_dict)
            .and_then(|page| page.get(b"MediaBox"))
            .and_then(Object::as_array)
            .map_err(|err| {
                StampError::PdfError(format!("page {} has no MediaBox: {}", page_number, err))
            })?;

        let coords: Vec<f32> = media_box
            .iter()
            .map(Object::as_float)
            .collect::<std::result::Result<_, _>>()
            .map_err(|err| StampError::PdfError(format!("malformed MediaBox: {}", err)))?;

        match coords.as_slice() {
            [x1, y1, x2, y2] => Ok(((x2 - x1).abs(), (y2 - y1).abs())),
            _ => Err(StampError::PdfError(format!(
                "MediaBox has {} entries",
                coords.len()
            ))),
        }
    }

    /// Whether any page content stream contains text operators. A flattened
    /// document has none.
    pub fn contains_text(&self) -> Result<bool> {
        for (page_number, page_id) in self.document.get_pages() {
            let content = self.document.get_page_content(page_id).map_err(|err| {
                StampError::PdfError(format!("page {} content: {}", page_number, err))
            })?;
            let decoded = Content::decode(&content).map_err(|err| {
                StampError::PdfError(format!("page {} content: {}", page_number, err))
            })?;
            if decoded
                .operations
                .iter()
                .any(|op| TEXT_OPERATORS.contains(&op.operator.as_str()))
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
