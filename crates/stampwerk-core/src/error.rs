// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Stampwerk.

use thiserror::Error;

/// Top-level error type for all Stampwerk operations.
#[derive(Debug, Error)]
pub enum StampError {
    // -- Input / decoding --
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("input contains no pages: {0}")]
    EmptyDocument(String),

    // -- Rendering --
    #[error("font could not be loaded: {0}")]
    FontError(String),

    #[error("invalid mask \"{0}\", expected x1,y1,x2,y2")]
    InvalidMask(String),

    // -- Output protection --
    #[error("encryption failed: {0}")]
    Encryption(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StampError>;
