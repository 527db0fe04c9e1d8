//! Request-level result types: what one verification run produced.

use serde::{Deserialize, Serialize};

/// The result of verifying one uploaded document.
///
/// Returned by [`crate::verify::verify_bytes`] on every non-fatal path —
/// including "the pipeline ran and found nothing", which is a valid terminal
/// state, not an error. Check [`VerificationOutcome::detected`] to
/// distinguish the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Canonical short identifier extracted from the decoded payload, when a
    /// QR code was found.
    pub certificate_id: Option<String>,

    /// The raw string the QR code encoded (typically an issuer URL).
    pub payload: Option<String>,

    /// 1-based page the payload was decoded from.
    pub page: Option<usize>,

    /// Per-stage counters and timings for this request.
    pub stats: VerificationStats,
}

impl VerificationOutcome {
    /// Whether a QR code was decoded anywhere in the document.
    pub fn detected(&self) -> bool {
        self.payload.is_some()
    }
}

/// Counters and timings for one verification request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationStats {
    /// Pages produced by the renderer (0 for single-image uploads and for
    /// renderer failures).
    pub pages_rendered: usize,
    /// Decode attempts actually made; the scan stops at the first hit, so
    /// this can be smaller than the candidate count.
    pub decode_attempts: usize,
    /// Wall-clock time spent rasterising pages.
    pub render_duration_ms: u64,
    /// Wall-clock time spent in the decode scan.
    pub decode_duration_ms: u64,
    /// Total request time inside the pipeline.
    pub total_duration_ms: u64,
}

/// Extract the certificate identifier from a decoded payload.
///
/// The payload is usually an issuer link whose last path segment is the
/// certificate id (`https://issuer.example/certs/ABC123` → `ABC123`). A
/// payload with no `/`, or one whose final segment is empty (trailing
/// slash), is returned verbatim — an opaque identifier is its own id.
pub fn extract_certificate_id(payload: &str) -> String {
    match payload.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => payload.to_string(),
    }
}
