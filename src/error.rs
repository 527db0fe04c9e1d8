//! Error types for the certiscan library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`VerifyError`] — **Fatal**: the verification request cannot produce a
//!   well-formed outcome at all (empty upload, scratch area unusable,
//!   internal fault). Returned as `Err(VerifyError)` from
//!   [`crate::verify::verify_bytes`].
//!
//! * [`RenderError`] — **Non-fatal**: the page renderer failed on this
//!   document. A corrupt or unsupported upload must never crash the request,
//!   so the orchestrator logs the failure, produces zero candidate pages,
//!   and the request resolves to a clean "nothing detected" outcome.
//!
//! Per-candidate decode failures are not errors at all — they are carried in
//! [`crate::pipeline::decode::DecodeAttempt`] so the scan loop can log them
//! and move to the next page.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the certiscan library.
///
/// Renderer failures use [`RenderError`] and are degraded to "no candidate
/// pages" by the orchestrator rather than propagated here.
#[derive(Debug, Error)]
pub enum VerifyError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The upload contained no bytes.
    #[error("Uploaded document '{filename}' is empty")]
    EmptyUpload { filename: String },

    /// The staged upload could not be written into the scratch area.
    #[error("Failed to stage upload '{filename}': {source}")]
    UploadWriteFailed {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    // ── Infrastructure errors ─────────────────────────────────────────────
    /// The per-request scratch directory could not be created.
    #[error("Failed to create scratch area under '{root}': {source}")]
    ScratchUnavailable {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VerifyError {
    /// Whether the caller is at fault (maps to a 4xx response) as opposed to
    /// an infrastructure or internal fault (maps to a 5xx response).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            VerifyError::EmptyUpload { .. } | VerifyError::InvalidConfig(_)
        )
    }
}

/// A coarse, all-or-nothing failure of the page renderer.
///
/// The rendering collaborator fails per document, not per page: a corrupt
/// file or unsupported encoding yields no pages at all (see
/// [`crate::pipeline::render`]).
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document could not be opened or parsed at all.
    #[error("Document could not be opened: {detail}")]
    OpenFailed { detail: String },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    PageFailed { page: usize, detail: String },

    /// A rendered page image could not be written to the scratch area.
    #[error("Failed to write page image '{path}': {detail}")]
    PageWriteFailed { path: PathBuf, detail: String },

    /// The blocking render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_upload_is_client_error() {
        let e = VerifyError::EmptyUpload {
            filename: "certificate.pdf".into(),
        };
        assert!(e.is_client_error());
        assert!(e.to_string().contains("certificate.pdf"));
    }

    #[test]
    fn scratch_failure_is_not_client_error() {
        let e = VerifyError::ScratchUnavailable {
            root: PathBuf::from("/var/tmp/certiscan"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!e.is_client_error());
        assert!(e.to_string().contains("/var/tmp/certiscan"));
    }

    #[test]
    fn render_error_display() {
        let e = RenderError::PageFailed {
            page: 2,
            detail: "bitmap allocation failed".into(),
        };
        assert!(e.to_string().contains("page 2"));
    }
}
