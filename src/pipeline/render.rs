//! Page rendering: rasterise a paginated document to per-page PNGs.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. [`render_pages`] moves the work onto the blocking thread pool
//! so Tokio worker threads never stall during CPU-heavy rasterisation.
//!
//! ## Why a trait seam?
//!
//! The renderer is an external collaborator with a coarse failure mode: a
//! corrupt document yields no pages at all, never a partial sequence. Hiding
//! it behind [`PageRenderer`] keeps the orchestrator's contract ("ordered
//! pages, or nothing") independent of pdfium, and lets tests drive the full
//! pipeline without a native library present.
//!
//! ## Why cap pixels, not DPI?
//!
//! Page sizes vary wildly: an A0 poster at 500 DPI would produce a
//! 16,000 × 23,000 px image. `max_pixels` caps either dimension regardless
//! of physical page size, keeping memory bounded while the DPI default stays
//! high enough to preserve small QR modules.

use crate::error::RenderError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// One rendered page of a paginated document.
///
/// Page numbers are 1-based and ascending; the sequence order defines the
/// decode attempt order, which short-circuits on the first success.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based ordinal within the document.
    pub page: usize,
    /// Pixel width of the rendered image.
    pub width: u32,
    /// Pixel height of the rendered image.
    pub height: u32,
    /// Location of the PNG inside the request's scratch area.
    pub path: PathBuf,
}

/// Rendering knobs passed through to the collaborator.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Rasterisation DPI (72 points = 1 inch in PDF space).
    pub dpi: u32,
    /// Cap on either rendered dimension, in pixels.
    pub max_pixels: u32,
}

/// A document-rendering capability: paginated bytes on disk in, ordered page
/// images out.
///
/// Implementations fail coarsely — all pages or none. They write each page
/// image into `out_dir` (the request's scratch area, removed wholesale at
/// cleanup) and must preserve document page order in the returned sequence.
pub trait PageRenderer: Send + Sync {
    fn render(
        &self,
        document: &Path,
        out_dir: &Path,
        options: RenderOptions,
    ) -> Result<Vec<PageImage>, RenderError>;
}

/// Rasterise a paginated document on the blocking thread pool.
pub async fn render_pages(
    renderer: Arc<dyn PageRenderer>,
    document: PathBuf,
    out_dir: PathBuf,
    options: RenderOptions,
) -> Result<Vec<PageImage>, RenderError> {
    tokio::task::spawn_blocking(move || renderer.render(&document, &out_dir, options))
        .await
        .map_err(|e| RenderError::TaskFailed(e.to_string()))?
}

/// The default renderer: pdfium, bound to the system library.
///
/// Construction is cheap; pdfium is bound per render call inside the
/// blocking task, matching its thread-local binding model.
#[derive(Debug, Default)]
pub struct PdfiumRenderer;

impl PageRenderer for PdfiumRenderer {
    fn render(
        &self,
        document: &Path,
        out_dir: &Path,
        options: RenderOptions,
    ) -> Result<Vec<PageImage>, RenderError> {
        let pdfium = Pdfium::default();

        let document = pdfium
            .load_pdf_from_file(document, None)
            .map_err(|e| RenderError::OpenFailed {
                detail: format!("{e:?}"),
            })?;

        let pages = document.pages();
        let total = pages.len() as usize;
        info!("Document loaded: {} pages", total);

        // DPI expressed as a scale over the 72-points-per-inch page space,
        // with a hard pixel cap so oversized pages stay bounded.
        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(options.dpi as f32 / 72.0)
            .set_maximum_width(options.max_pixels as i32)
            .set_maximum_height(options.max_pixels as i32);

        let mut results = Vec::with_capacity(total);

        for (idx, page) in pages.iter().enumerate() {
            let page_num = idx + 1;

            let bitmap =
                page.render_with_config(&render_config)
                    .map_err(|e| RenderError::PageFailed {
                        page: page_num,
                        detail: format!("{e:?}"),
                    })?;

            let image: DynamicImage = bitmap.as_image();
            let (width, height) = (image.width(), image.height());
            let path = out_dir.join(format!("page-{page_num:04}.png"));

            image
                .save_with_format(&path, image::ImageFormat::Png)
                .map_err(|e| RenderError::PageWriteFailed {
                    path: path.clone(),
                    detail: e.to_string(),
                })?;

            debug!("Rendered page {page_num} → {width}x{height} px");

            results.push(PageImage {
                page: page_num,
                width,
                height,
                path,
            });
        }

        Ok(results)
    }
}
