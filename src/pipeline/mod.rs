//! Pipeline stages for document verification.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! intake ──▶ render ──▶ decode
//! (classify)  (pdfium)   (rqrr)
//! ```
//!
//! 1. [`intake`] — classify the upload by extension and stage it into the
//!    request's scratch area
//! 2. [`render`] — rasterise every page of a paginated document to PNG;
//!    runs in `spawn_blocking` because pdfium is not async-safe
//! 3. [`decode`] — preprocess one candidate image (upscale, greyscale) and
//!    attempt QR extraction; the scan stops at the first hit

pub mod decode;
pub mod intake;
pub mod render;
