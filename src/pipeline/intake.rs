//! Intake: classify the upload and stage it into the scratch area.
//!
//! ## Why extension-based classification?
//!
//! The format tag decides one thing only: whether the upload needs
//! rasterisation before decoding. A wrong guess is self-correcting — a PNG
//! renamed to `.pdf` fails to open in the renderer and degrades to "nothing
//! detected", while a PDF renamed to `.png` fails to load in the decode
//! stage with the same end state. Content sniffing would buy little here
//! and is deliberately out of scope; this is a heuristic, not a verified
//! format check.

use crate::error::VerifyError;
use crate::scratch::ScratchContext;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Derived format tag for an uploaded document, decided once at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Multi-page format requiring rasterisation before decoding (`.pdf`).
    Paginated,
    /// Anything else: the upload itself is the only candidate image.
    SingleImage,
}

/// Classify an upload by its filename extension, case-insensitively.
///
/// Pure function of the name — it never touches the filesystem, so it is
/// trivially unit-testable and cheap to call before any bytes are staged.
pub fn classify_document(original_filename: &str) -> DocumentFormat {
    let ext = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => DocumentFormat::Paginated,
        _ => DocumentFormat::SingleImage,
    }
}

/// Write the uploaded bytes into the request's scratch area.
///
/// Rejects empty uploads before anything downstream runs: a zero-byte file
/// can never contain a certificate, and failing here keeps the renderer and
/// decoder out of the picture entirely.
pub fn stage_upload(
    scratch: &ScratchContext,
    bytes: &[u8],
    original_filename: &str,
) -> Result<PathBuf, VerifyError> {
    if bytes.is_empty() {
        return Err(VerifyError::EmptyUpload {
            filename: original_filename.to_string(),
        });
    }

    let path = scratch.upload_path(original_filename);
    std::fs::write(&path, bytes).map_err(|source| VerifyError::UploadWriteFailed {
        filename: original_filename.to_string(),
        source,
    })?;

    debug!(
        request_id = %scratch.request_id(),
        path = %path.display(),
        bytes = bytes.len(),
        "Staged upload"
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_paginated_case_insensitively() {
        assert_eq!(classify_document("cert.pdf"), DocumentFormat::Paginated);
        assert_eq!(classify_document("CERT.PDF"), DocumentFormat::Paginated);
        assert_eq!(classify_document("archive.v2.Pdf"), DocumentFormat::Paginated);
    }

    #[test]
    fn everything_else_is_single_image() {
        assert_eq!(classify_document("scan.png"), DocumentFormat::SingleImage);
        assert_eq!(classify_document("scan.jpeg"), DocumentFormat::SingleImage);
        assert_eq!(classify_document("no_extension"), DocumentFormat::SingleImage);
        assert_eq!(classify_document(""), DocumentFormat::SingleImage);
        // The classifier trusts the name, not the content.
        assert_eq!(classify_document("actually_a.pdf.png"), DocumentFormat::SingleImage);
    }

    #[test]
    fn stage_upload_writes_bytes_into_scratch() {
        let scratch = ScratchContext::create(None).unwrap();
        let path = stage_upload(&scratch, b"%PDF-1.7", "cert.pdf").unwrap();
        assert!(path.starts_with(scratch.path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
        scratch.dispose();
    }

    #[test]
    fn stage_upload_rejects_empty_bytes() {
        let scratch = ScratchContext::create(None).unwrap();
        let err = stage_upload(&scratch, b"", "cert.pdf").unwrap_err();
        assert!(err.is_client_error());
        scratch.dispose();
    }
}
