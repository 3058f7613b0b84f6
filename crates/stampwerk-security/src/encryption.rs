// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF password protection — re-open a finished PDF with `lopdf` and re-save it
// under the standard security handler with a print-only permission set.

use std::path::Path;

use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Document, Object, StringFormat};
use stampwerk_core::error::{Result, StampError};
use stampwerk_core::Credentials;
use tracing::{debug, info, instrument};

use crate::integrity::digest_bytes;

/// RC4 key length in bits (standard security handler, revision 3).
const KEY_LENGTH_BITS: usize = 128;

/// The only operation granted without the owner password: low-resolution
/// printing. High-quality printing, copying, modification, annotation, form
/// filling, and assembly are all withheld.
pub fn restricted_permissions() -> Permissions {
    Permissions::PRINTABLE
}

/// Encrypt the PDF at `source` and write the protected copy to `destination`.
///
/// `source` is left untouched; the caller decides when to delete it. A missing
/// password is treated as the empty string, so supplying only an owner
/// password yields a file that opens without a prompt but keeps the
/// permission restrictions.
#[instrument(skip_all, fields(source = %source.as_ref().display(), destination = %destination.as_ref().display()))]
pub fn encrypt_pdf_file(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    credentials: &Credentials,
) -> Result<()> {
    let bytes = std::fs::read(source.as_ref())?;
    let mut document = Document::load_mem(&bytes).map_err(|err| {
        StampError::PdfError(format!(
            "failed to reopen {}: {}",
            source.as_ref().display(),
            err
        ))
    })?;

    ensure_file_id(&mut document, &bytes);
    encrypt_document(&mut document, credentials)?;

    document.save(destination.as_ref()).map_err(|err| {
        StampError::Encryption(format!(
            "failed to write {}: {}",
            destination.as_ref().display(),
            err
        ))
    })?;

    info!("Encrypted PDF written");
    Ok(())
}

/// Apply the standard security handler to an in-memory document.
pub fn encrypt_document(document: &mut Document, credentials: &Credentials) -> Result<()> {
    let version = EncryptionVersion::V2 {
        document: &*document,
        owner_password: credentials.owner_password(),
        user_password: credentials.user_password(),
        key_length: KEY_LENGTH_BITS,
        permissions: restricted_permissions(),
    };
    let state = EncryptionState::try_from(version)
        .map_err(|err| StampError::Encryption(err.to_string()))?;

    document
        .encrypt(&state)
        .map_err(|err| StampError::Encryption(err.to_string()))?;

    debug!(
        user_password = credentials.user.is_some(),
        owner_password = credentials.owner.is_some(),
        "Security handler applied"
    );
    Ok(())
}

/// The standard security handler keys off the first trailer `/ID` entry.
/// Writers are not required to emit one, so derive it from the file bytes
/// when absent.
fn ensure_file_id(document: &mut Document, file_bytes: &[u8]) {
    if document.trailer.get(b"ID").is_ok() {
        return;
    }
    let id = digest_bytes(file_bytes)[..16].to_vec();
    document.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );
    debug!("Added trailer /ID");
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Smallest document lopdf will round-trip: catalog, page tree, one page.
    fn one_page_document() -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn only_low_resolution_printing_permitted() {
        let perms = restricted_permissions();
        assert!(perms.contains(Permissions::PRINTABLE));
        assert!(!perms.contains(Permissions::PRINTABLE_IN_HIGH_QUALITY));
        assert!(!perms.contains(Permissions::COPYABLE));
        assert!(!perms.contains(Permissions::MODIFIABLE));
        assert!(!perms.contains(Permissions::ANNOTABLE));
    }

    #[test]
    fn file_id_added_when_missing() {
        let mut doc = one_page_document();
        assert!(doc.trailer.get(b"ID").is_err());
        ensure_file_id(&mut doc, b"bytes");
        let id = doc.trailer.get(b"ID").unwrap().as_array().unwrap();
        assert_eq!(id.len(), 2);
    }

    #[test]
    fn encrypted_file_carries_encrypt_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.pdf");
        let protected = dir.path().join("protected.pdf");
        one_page_document().save(&plain).unwrap();

        let creds = Credentials::new(Some("user".into()), Some("owner".into()));
        encrypt_pdf_file(&plain, &protected, &creds).unwrap();

        let bytes = std::fs::read(&protected).unwrap();
        assert!(bytes.windows(8).any(|w| w == b"/Encrypt"));
        // Source stays in place for the caller to remove.
        assert!(plain.exists());
    }

    /// Write a one-page document and encrypt it with `creds`.
    fn protected_copy(creds: &Credentials) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.pdf");
        let protected = dir.path().join("protected.pdf");
        one_page_document().save(&plain).unwrap();
        encrypt_pdf_file(&plain, &protected, creds).unwrap();
        (dir, protected)
    }

    fn opens_with(path: &Path, password: &str) -> bool {
        Document::load(path).unwrap().decrypt(password).is_ok()
    }

    /// `(P, V, R)` from the written /Encrypt dictionary.
    fn security_entries(path: &Path) -> (i64, i64, i64) {
        let doc = Document::load(path).unwrap();
        let encrypt = doc.get_encrypted().unwrap();
        let entry = |key: &[u8]| encrypt.get(key).unwrap().as_i64().unwrap();
        (entry(b"P"), entry(b"V"), entry(b"R"))
    }

    #[test]
    fn either_password_opens_and_others_do_not() {
        let creds = Credentials::new(Some("user".into()), Some("owner".into()));
        let (_dir, protected) = protected_copy(&creds);

        assert!(!opens_with(&protected, "wrong"));
        assert!(opens_with(&protected, "user"));
        assert!(opens_with(&protected, "owner"));
    }

    #[test]
    fn written_permissions_allow_low_resolution_printing_only() {
        let creds = Credentials::new(Some("user".into()), Some("owner".into()));
        let (_dir, protected) = protected_copy(&creds);
        let (p, v, r) = security_entries(&protected);

        assert_eq!((v, r), (2, 3));
        // Bit positions are 1-based in the PDF reference.
        assert_ne!(p & (1 << 2), 0, "bit 3 (print) must be set, P = {p}");
        assert_eq!(p & (1 << 11), 0, "bit 12 (high-quality print) must be clear, P = {p}");
        assert_eq!(p & (1 << 3), 0, "bit 4 (modify) must be clear, P = {p}");
        assert_eq!(p & (1 << 4), 0, "bit 5 (copy) must be clear, P = {p}");
    }

    #[test]
    fn owner_only_opens_without_prompt_but_stays_restricted() {
        let creds = Credentials::new(None, Some("owner".into()));
        let (_dir, protected) = protected_copy(&creds);

        assert!(opens_with(&protected, ""));
        assert!(opens_with(&protected, "owner"));
        assert!(!opens_with(&protected, "wrong"));

        let (p, _, _) = security_entries(&protected);
        assert_ne!(p & (1 << 2), 0);
        assert_eq!(p & (1 << 11), 0);
    }

    #[test]
    fn unreadable_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.pdf");
        std::fs::write(&bogus, b"not a pdf").unwrap();
        let result = encrypt_pdf_file(
            &bogus,
            dir.path().join("out.pdf"),
            &Credentials::new(Some("pw".into()), None),
        );
        assert!(matches!(result, Err(StampError::PdfError(_))));
    }
}
