//! The verification pipeline entry point.
//!
//! ## Shape of a request
//!
//! One upload in, one [`VerificationOutcome`] out:
//!
//! 1. Stage the upload into a fresh per-request scratch area
//! 2. Classify by extension: paginated documents are rasterised to ordered
//!    page images; anything else is itself the only candidate
//! 3. Scan candidates strictly in page order, stopping at the first decoded
//!    payload
//! 4. Dispose the scratch area — unconditionally
//!
//! ## Failure philosophy
//!
//! Only faults that prevent producing a well-formed outcome at all surface
//! as `Err` (empty upload, unusable scratch area, internal error). A corrupt
//! document, a renderer crash, or a page that will not decode all resolve to
//! a clean `Ok` outcome with `detected() == false`: "verification completed,
//! nothing found" is a valid terminal state.
//!
//! ## Cleanup guarantee
//!
//! The scratch area is removed on the single exit path of [`verify_bytes`],
//! whatever the pipeline did. If the request future is cancelled mid-flight
//! (client disconnect), the [`ScratchContext`] drop does the same removal as
//! a backstop, so no artifact outlives its request either way.

use crate::config::VerifyConfig;
use crate::error::VerifyError;
use crate::outcome::{extract_certificate_id, VerificationOutcome, VerificationStats};
use crate::pipeline::decode::{scan_candidates, Candidate, QrDecoder, RqrrDecoder, ScanResult};
use crate::pipeline::intake::{classify_document, stage_upload, DocumentFormat};
use crate::pipeline::render::{render_pages, PageRenderer, PdfiumRenderer, RenderOptions};
use crate::scratch::ScratchContext;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Verify one uploaded document: locate and decode its embedded QR code.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `bytes`             — Raw upload as received
/// * `original_filename` — Declared filename; its extension drives dispatch
/// * `config`            — Pipeline configuration
///
/// # Returns
/// `Ok(VerificationOutcome)` whenever the pipeline ran to completion —
/// including when no QR code was found anywhere in the document.
///
/// # Errors
/// Returns `Err(VerifyError)` only for request-level faults: an empty
/// upload, an unusable scratch area, or an internal error. Renderer and
/// per-page decode failures never surface here.
pub async fn verify_bytes(
    bytes: &[u8],
    original_filename: &str,
    config: &VerifyConfig,
) -> Result<VerificationOutcome, VerifyError> {
    let scratch = ScratchContext::create(config.scratch_root.as_deref()).map_err(|source| {
        VerifyError::ScratchUnavailable {
            root: config
                .scratch_root
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            source,
        }
    })?;

    info!(
        request_id = %scratch.request_id(),
        filename = original_filename,
        bytes = bytes.len(),
        "Starting verification"
    );

    let result = run_pipeline(&scratch, bytes, original_filename, config).await;

    // Unconditional: success, nothing-found, and every error path all pass
    // through here. Dispose failures are logged, never propagated.
    scratch.dispose();

    result
}

/// The pipeline body, separated so cleanup wraps every exit path once.
async fn run_pipeline(
    scratch: &ScratchContext,
    bytes: &[u8],
    original_filename: &str,
    config: &VerifyConfig,
) -> Result<VerificationOutcome, VerifyError> {
    let total_start = Instant::now();
    let mut stats = VerificationStats::default();

    // ── Step 1: Stage the upload ─────────────────────────────────────────
    let upload_path = stage_upload(scratch, bytes, original_filename)?;
    let format = classify_document(original_filename);
    debug!(request_id = %scratch.request_id(), ?format, "Classified upload");

    // ── Step 2: Produce the candidate sequence ───────────────────────────
    let candidates: Vec<Candidate> = match format {
        DocumentFormat::Paginated => {
            let render_start = Instant::now();
            let rendered = render_pages(
                resolve_renderer(config),
                upload_path.clone(),
                scratch.path().to_path_buf(),
                RenderOptions {
                    dpi: config.dpi,
                    max_pixels: config.max_render_pixels,
                },
            )
            .await;
            stats.render_duration_ms = render_start.elapsed().as_millis() as u64;

            match rendered {
                Ok(pages) => {
                    stats.pages_rendered = pages.len();
                    info!(
                        request_id = %scratch.request_id(),
                        pages = pages.len(),
                        "Rendered document in {}ms",
                        stats.render_duration_ms
                    );
                    pages
                        .into_iter()
                        .map(|p| Candidate {
                            page: p.page,
                            path: p.path,
                        })
                        .collect()
                }
                // A malformed upload must never crash the request: no pages
                // means the scan below is exhausted immediately and the
                // request resolves to "nothing detected".
                Err(e) => {
                    warn!(
                        request_id = %scratch.request_id(),
                        error = %e,
                        "Page rendering failed; no candidate images"
                    );
                    Vec::new()
                }
            }
        }
        DocumentFormat::SingleImage => vec![Candidate {
            page: 1,
            path: upload_path.clone(),
        }],
    };

    // ── Step 3: Scan candidates in order, first hit wins ─────────────────
    let decode_start = Instant::now();
    let decoder = resolve_decoder(config);
    let upscale_factor = config.upscale_factor;
    let scan = tokio::task::spawn_blocking(move || {
        scan_candidates(&candidates, upscale_factor, decoder.as_ref())
    })
    .await
    .map_err(|e| VerifyError::Internal(format!("Decode task failed: {e}")))?;
    stats.decode_duration_ms = decode_start.elapsed().as_millis() as u64;

    // ── Step 4: Assemble the outcome ─────────────────────────────────────
    let outcome = match scan {
        ScanResult::Hit {
            page,
            payload,
            attempts,
        } => {
            stats.decode_attempts = attempts;
            stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
            info!(
                request_id = %scratch.request_id(),
                page,
                attempts,
                "Verification complete: QR code detected"
            );
            VerificationOutcome {
                certificate_id: Some(extract_certificate_id(&payload)),
                payload: Some(payload),
                page: Some(page),
                stats,
            }
        }
        ScanResult::Exhausted { attempts } => {
            stats.decode_attempts = attempts;
            stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
            info!(
                request_id = %scratch.request_id(),
                attempts,
                "Verification complete: no QR code detected"
            );
            VerificationOutcome {
                certificate_id: None,
                payload: None,
                page: None,
                stats,
            }
        }
    };

    Ok(outcome)
}

// ── Collaborator resolution ──────────────────────────────────────────────

/// Use the injected renderer when present, else the pdfium default.
fn resolve_renderer(config: &VerifyConfig) -> Arc<dyn PageRenderer> {
    config
        .renderer
        .clone()
        .unwrap_or_else(|| Arc::new(PdfiumRenderer))
}

/// Use the injected decoder when present, else the rqrr default.
fn resolve_decoder(config: &VerifyConfig) -> Arc<dyn QrDecoder> {
    config
        .decoder
        .clone()
        .unwrap_or_else(|| Arc::new(RqrrDecoder))
}
