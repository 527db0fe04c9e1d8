//! Configuration types for document verification.
//!
//! All pipeline behaviour is controlled through [`VerifyConfig`], built via
//! its [`VerifyConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across requests, log them, and diff two
//! deployments to understand why their detection rates differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest; it is also the injection point for
//! the rendering and decoding collaborators, which tests replace with fakes.

use crate::error::VerifyError;
use crate::pipeline::decode::QrDecoder;
use crate::pipeline::render::PageRenderer;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one verification pipeline.
///
/// Built via [`VerifyConfig::builder()`] or using
/// [`VerifyConfig::default()`]. One config is shared by all requests; every
/// request still gets its own scratch directory underneath `scratch_root`.
///
/// # Example
/// ```rust
/// use certiscan::VerifyConfig;
///
/// let config = VerifyConfig::builder()
///     .dpi(300)
///     .upscale_factor(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct VerifyConfig {
    /// Rendering DPI used when rasterising each document page. Range: 72–1200. Default: 500.
    ///
    /// QR modules in a printed certificate are a few millimetres across;
    /// rendering at 500 DPI keeps each module several pixels wide so the
    /// finder patterns survive rasterisation. This is a quality/latency
    /// trade-off, not a correctness requirement: lower it for faster
    /// responses on large documents, raise it for certificates with very
    /// small codes.
    pub dpi: u32,

    /// Maximum rendered page dimension (width or height) in pixels. Default: 10 000.
    ///
    /// A safety cap independent of DPI. A 500-DPI render of an A0 poster
    /// would produce a ~16 000 × 23 000 px image and exhaust memory. This
    /// field caps either dimension, scaling the other proportionally.
    pub max_render_pixels: u32,

    /// Integer upscale factor applied to each candidate image before
    /// decoding. Range: 1–8. Default: 2.
    ///
    /// QR finder patterns are located more reliably in higher-resolution,
    /// high-contrast input, so the decode stage upscales *before* handing
    /// the buffer to the decoder. Tunable, but keep the upscale ahead of the
    /// decode, never after.
    pub upscale_factor: u32,

    /// Root directory under which per-request scratch directories are
    /// created. Default: the system temp directory.
    pub scratch_root: Option<PathBuf>,

    /// Page-rendering collaborator. Defaults to the pdfium-backed renderer.
    ///
    /// Inject a custom implementation to render other paginated formats or
    /// to drive the pipeline in tests without a pdfium library present.
    pub renderer: Option<Arc<dyn PageRenderer>>,

    /// QR-decoding collaborator. Defaults to the rqrr-backed decoder.
    pub decoder: Option<Arc<dyn QrDecoder>>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            dpi: 500,
            max_render_pixels: 10_000,
            upscale_factor: 2,
            scratch_root: None,
            renderer: None,
            decoder: None,
        }
    }
}

impl fmt::Debug for VerifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyConfig")
            .field("dpi", &self.dpi)
            .field("max_render_pixels", &self.max_render_pixels)
            .field("upscale_factor", &self.upscale_factor)
            .field("scratch_root", &self.scratch_root)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn PageRenderer>"))
            .field("decoder", &self.decoder.as_ref().map(|_| "<dyn QrDecoder>"))
            .finish()
    }
}

impl VerifyConfig {
    /// Create a new builder for `VerifyConfig`.
    pub fn builder() -> VerifyConfigBuilder {
        VerifyConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`VerifyConfig`].
#[derive(Debug)]
pub struct VerifyConfigBuilder {
    config: VerifyConfig,
}

impl VerifyConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 1200);
        self
    }

    pub fn max_render_pixels(mut self, px: u32) -> Self {
        self.config.max_render_pixels = px.max(500);
        self
    }

    pub fn upscale_factor(mut self, factor: u32) -> Self {
        self.config.upscale_factor = factor.clamp(1, 8);
        self
    }

    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(root.into());
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn decoder(mut self, decoder: Arc<dyn QrDecoder>) -> Self {
        self.config.decoder = Some(decoder);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<VerifyConfig, VerifyError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 1200 {
            return Err(VerifyError::InvalidConfig(format!(
                "DPI must be 72–1200, got {}",
                c.dpi
            )));
        }
        if c.upscale_factor == 0 {
            return Err(VerifyError::InvalidConfig(
                "Upscale factor must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
