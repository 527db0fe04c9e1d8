//! QR extraction: preprocess one candidate image and attempt a decode.
//!
//! ## Preprocessing
//!
//! Every candidate is upscaled (default 2×) and converted to greyscale
//! before the decoder sees it. QR finder patterns are located far more
//! reliably in high-contrast, higher-resolution input; the upscale must
//! happen *before* the decode, never after. The decoder itself consumes a
//! row-major, top-to-bottom RGBA buffer (4 bytes per pixel) — the channel
//! layout is part of the [`QrDecoder`] contract so alternative backends can
//! be dropped in without touching the preprocessing.
//!
//! ## Failure semantics
//!
//! A decode attempt can end three ways, and the distinction is typed rather
//! than swallowed: [`DecodeAttempt::Decoded`] carries the payload,
//! [`DecodeAttempt::NotFound`] is the clean no-code outcome, and
//! [`DecodeAttempt::Failed`] marks an unreadable or malformed candidate.
//! `Failed` is worth a warn-level log line, but for control flow it is
//! treated exactly like `NotFound` so the scan advances to the next page —
//! a bad page image must never abort the request.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// An internal fault inside the decoding collaborator.
///
/// Distinct from "no code found", which is a normal result, not an error.
#[derive(Debug, Error)]
pub enum DecoderError {
    /// The pixel buffer length does not match the declared dimensions.
    #[error("Pixel buffer does not match {width}x{height} RGBA dimensions")]
    BufferMismatch { width: u32, height: u32 },

    /// Backend-specific failure.
    #[error("Decoder failure: {0}")]
    Other(String),
}

/// A QR-decoding capability.
///
/// Contract: `pixels` is a row-major, top-to-bottom buffer of 4 bytes per
/// pixel in red-green-blue-alpha order, `width * height * 4` bytes long.
/// Returns the decoded payload of the first code the backend reports,
/// `None` when no code is found. Localisation runs over the full image —
/// no region-of-interest narrowing — and when multiple codes are present
/// only the first is used (a documented first-match policy, not an
/// exhaustive search).
pub trait QrDecoder: Send + Sync {
    fn decode_rgba(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<String>, DecoderError>;
}

/// The default decoder, backed by `rqrr`.
///
/// rqrr is a luminance decoder, so the RGBA buffer is folded to luma
/// internally using the usual Rec. 601 weights; the trait contract stays
/// RGBA so backends with native colour support need no adapter.
#[derive(Debug, Default)]
pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn decode_rgba(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<String>, DecoderError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(DecoderError::BufferMismatch { width, height });
        }

        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                let i = (y * width as usize + x) * 4;
                let (r, g, b) = (pixels[i] as u32, pixels[i + 1] as u32, pixels[i + 2] as u32);
                ((299 * r + 587 * g + 114 * b) / 1000) as u8
            });

        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_meta, content)) => return Ok(Some(content)),
                // A grid that localises but fails to decode is treated the
                // same as no code: move on to the next grid, if any.
                Err(e) => debug!(error = %e, "Located grid failed to decode"),
            }
        }

        Ok(None)
    }
}

/// A page image eligible for one decode attempt.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// 1-based page ordinal; defines attempt order.
    pub page: usize,
    /// Raster image on disk, inside the request's scratch area.
    pub path: PathBuf,
}

/// Outcome of running the decoder on one candidate image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeAttempt {
    /// A QR code was found and decoded to this payload.
    Decoded(String),
    /// The image was readable but contained no decodable code.
    NotFound,
    /// The candidate could not be processed (unreadable image, decoder
    /// fault). Logged, then treated as `NotFound` by the scan loop.
    Failed(String),
}

/// Result of scanning an ordered candidate sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    /// The first candidate (in order) whose decode succeeded.
    Hit {
        page: usize,
        payload: String,
        attempts: usize,
    },
    /// Every candidate was attempted; none produced a payload.
    Exhausted { attempts: usize },
}

/// Preprocess one candidate image and attempt QR extraction.
pub fn decode_candidate(
    path: &Path,
    upscale_factor: u32,
    decoder: &dyn QrDecoder,
) -> DecodeAttempt {
    let image = match image::open(path) {
        Ok(img) => img,
        Err(e) => return DecodeAttempt::Failed(format!("Unreadable image: {e}")),
    };

    // Upscale first, then greyscale: finder-pattern localisation wants the
    // extra resolution before any further processing.
    let factor = upscale_factor.max(1);
    let image = if factor > 1 {
        image.resize_exact(
            image.width() * factor,
            image.height() * factor,
            image::imageops::FilterType::Triangle,
        )
    } else {
        image
    };
    let rgba = image.grayscale().to_rgba8();
    let (width, height) = rgba.dimensions();

    match decoder.decode_rgba(rgba.as_raw(), width, height) {
        Ok(Some(payload)) if !payload.is_empty() => DecodeAttempt::Decoded(payload),
        Ok(_) => DecodeAttempt::NotFound,
        Err(e) => DecodeAttempt::Failed(e.to_string()),
    }
}

/// Try candidates strictly in order, stopping at the first decoded payload.
///
/// The first page that decodes wins; later candidates are never attempted.
/// If a document legitimately contains several codes, this picks the
/// earliest — a deliberate, documented policy. An empty candidate sequence
/// (e.g. renderer failure) yields `Exhausted { attempts: 0 }`.
pub fn scan_candidates(
    candidates: &[Candidate],
    upscale_factor: u32,
    decoder: &dyn QrDecoder,
) -> ScanResult {
    let mut attempts = 0;

    for candidate in candidates {
        attempts += 1;
        match decode_candidate(&candidate.path, upscale_factor, decoder) {
            DecodeAttempt::Decoded(payload) => {
                info!(page = candidate.page, "QR code decoded");
                return ScanResult::Hit {
                    page: candidate.page,
                    payload,
                    attempts,
                };
            }
            DecodeAttempt::NotFound => {
                debug!(page = candidate.page, "No QR code on page");
            }
            DecodeAttempt::Failed(reason) => {
                warn!(
                    page = candidate.page,
                    reason = %reason,
                    "Decode attempt failed; advancing to next candidate"
                );
            }
        }
    }

    ScanResult::Exhausted { attempts }
}
