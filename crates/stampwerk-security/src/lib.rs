// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! stampwerk-security — provenance and protection for stamped copies.
//!
//! Derives the traceability token embedded in every watermark and applies
//! PDF password protection with a print-only permission set. The token is a
//! label for informal provenance; nothing here signs or verifies documents.

pub mod encryption;
pub mod integrity;
pub mod token;

pub use encryption::{encrypt_document, encrypt_pdf_file, restricted_permissions};
pub use integrity::{digest_bytes, hash_bytes};
pub use token::TraceToken;
