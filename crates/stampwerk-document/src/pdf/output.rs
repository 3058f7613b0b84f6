// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output stage — write the flat PDF beside the destination, optionally encrypt
// it, then move the result into place. The destination path only ever sees a
// complete file.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use stampwerk_core::error::Result;
use stampwerk_core::types::Credentials;
use stampwerk_security::encrypt_pdf_file;
use tracing::{info, instrument, warn};

use super::writer::FlatPdfWriter;

/// Suffix of the unencrypted intermediate file.
pub const TEMP_SUFFIX: &str = ".__tmp.pdf";
/// Suffix of the encrypted file before it is renamed over the destination.
pub const STAGED_SUFFIX: &str = ".__enc.pdf";

/// `<output>.__tmp.pdf`, next to `output`.
pub fn temp_path_for(output: &Path) -> PathBuf {
    with_suffix(output, TEMP_SUFFIX)
}

fn staged_path_for(output: &Path) -> PathBuf {
    with_suffix(output, STAGED_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn discard(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), %err, "Could not remove intermediate file");
        }
    }
}

/// Write `pages` as an image-only PDF at `output`.
///
/// With a non-empty password the document is encrypted (print only) before it
/// reaches `output`. Returns whether encryption was applied.
#[instrument(skip_all, fields(output = %output.display(), pages = pages.len()))]
pub fn save_flat_pdf(
    pages: &[RgbImage],
    output: &Path,
    credentials: &Credentials,
    dpi: f32,
) -> Result<bool> {
    let bytes = FlatPdfWriter::new(dpi).render(pages)?;

    let temp = temp_path_for(output);
    if let Err(err) = fs::write(&temp, &bytes) {
        discard(&temp);
        return Err(err.into());
    }

    if !credentials.requires_encryption() {
        if let Err(err) = fs::rename(&temp, output) {
            discard(&temp);
            return Err(err.into());
        }
        info!(bytes = bytes.len(), "PDF written");
        return Ok(false);
    }

    let staged = staged_path_for(output);
    let encrypted = encrypt_pdf_file(&temp, &staged, credentials)
        .and_then(|()| fs::rename(&staged, output).map_err(Into::into));

    if let Err(err) = encrypted {
        discard(&staged);
        discard(&temp);
        return Err(err);
    }

    discard(&temp);
    info!(bytes = bytes.len(), "Encrypted PDF written");
    Ok(true)
}
