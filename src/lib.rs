//! # certiscan
//!
//! Verify issued certificates by locating and decoding the QR code embedded
//! in an uploaded document (a single image or a multi-page PDF).
//!
//! ## Why this crate?
//!
//! A certificate PDF is just pixels as far as verification is concerned: the
//! proof of identity is a QR code printed somewhere on some page. This crate
//! rasterises each page at high DPI, preprocesses each candidate image for
//! robust finder-pattern localisation, and scans candidates strictly in page
//! order until one decodes — while guaranteeing that every temporary
//! artifact (the staged upload, every rendered page) is gone by the time the
//! request completes, on success, no-match, and error paths alike.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Intake   classify by extension, stage into per-request scratch
//!  ├─ 2. Render   rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Decode   2× upscale + greyscale, QR extraction via rqrr,
//!  │              first page that decodes wins
//!  └─ 4. Outcome  certificate id from the payload + per-stage stats,
//!                 scratch area disposed unconditionally
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use certiscan::{verify_bytes, VerifyConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("certificate.pdf")?;
//!     let config = VerifyConfig::default();
//!     let outcome = verify_bytes(&bytes, "certificate.pdf", &config).await?;
//!     match outcome.certificate_id {
//!         Some(id) => println!("certificate: {id}"),
//!         None => println!("no QR code detected"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | Enables the HTTP service (axum + tower-http + jsonwebtoken) and the `certiscan-server` binary |
//!
//! Disable `server` when using only the library:
//! ```toml
//! certiscan = { version = "0.3", default-features = false }
//! ```
//!
//! ## Collaborators
//!
//! Rendering and decoding are trait seams ([`PageRenderer`], [`QrDecoder`])
//! injectable through [`VerifyConfig`]; the defaults bind pdfium and rqrr.
//! Tests drive the full pipeline with fakes and no native library.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod scratch;
#[cfg(feature = "server")]
pub mod server;
pub mod verify;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{VerifyConfig, VerifyConfigBuilder};
pub use error::{RenderError, VerifyError};
pub use outcome::{extract_certificate_id, VerificationOutcome, VerificationStats};
pub use pipeline::decode::{DecodeAttempt, DecoderError, QrDecoder, RqrrDecoder, ScanResult};
pub use pipeline::intake::{classify_document, DocumentFormat};
pub use pipeline::render::{PageImage, PageRenderer, PdfiumRenderer, RenderOptions};
pub use scratch::ScratchContext;
pub use verify::verify_bytes;
