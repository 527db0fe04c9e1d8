//! End-to-end pipeline tests driven through the collaborator seams.
//!
//! These tests exercise the full request lifecycle — staging, dispatch,
//! rendering, the ordered decode scan, outcome assembly, and cleanup —
//! with fake renderer/decoder implementations injected through
//! `VerifyConfig`, so no pdfium library and no real QR codes are needed.

use certiscan::{
    verify_bytes, DecoderError, PageImage, PageRenderer, QrDecoder, RenderError, RenderOptions,
    VerifyConfig,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test collaborators ───────────────────────────────────────────────────

/// Renders `pages` blank PNGs; page n is (10 + n) pixels wide so a decoder
/// can tell pages apart by the buffer dimensions alone.
struct FakeRenderer {
    pages: usize,
    renders: AtomicUsize,
}

impl FakeRenderer {
    fn new(pages: usize) -> Arc<Self> {
        Arc::new(Self {
            pages,
            renders: AtomicUsize::new(0),
        })
    }
}

impl PageRenderer for FakeRenderer {
    fn render(
        &self,
        _document: &Path,
        out_dir: &Path,
        _options: RenderOptions,
    ) -> Result<Vec<PageImage>, RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        (1..=self.pages)
            .map(|page| {
                let width = 10 + page as u32;
                let path = out_dir.join(format!("page-{page:04}.png"));
                let img = image::RgbaImage::from_pixel(
                    width,
                    10,
                    image::Rgba([255, 255, 255, 255]),
                );
                img.save_with_format(&path, image::ImageFormat::Png)
                    .map_err(|e| RenderError::PageWriteFailed {
                        path: path.clone(),
                        detail: e.to_string(),
                    })?;
                Ok(PageImage {
                    page,
                    width,
                    height: 10,
                    path,
                })
            })
            .collect()
    }
}

/// Fails the way a corrupt document does: coarsely, with no pages.
struct FailingRenderer {
    renders: AtomicUsize,
}

impl PageRenderer for FailingRenderer {
    fn render(
        &self,
        _document: &Path,
        _out_dir: &Path,
        _options: RenderOptions,
    ) -> Result<Vec<PageImage>, RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Err(RenderError::OpenFailed {
            detail: "synthetic corrupt document".into(),
        })
    }
}

/// Decodes successfully only when the image width matches `hit_width`,
/// counting every attempt.
struct ScriptedDecoder {
    hit_width: Option<u32>,
    payload: String,
    attempts: AtomicUsize,
}

impl ScriptedDecoder {
    fn hit(width: u32, payload: &str) -> Arc<Self> {
        Arc::new(Self {
            hit_width: Some(width),
            payload: payload.into(),
            attempts: AtomicUsize::new(0),
        })
    }

    fn miss() -> Arc<Self> {
        Arc::new(Self {
            hit_width: None,
            payload: String::new(),
            attempts: AtomicUsize::new(0),
        })
    }
}

impl QrDecoder for ScriptedDecoder {
    fn decode_rgba(
        &self,
        _pixels: &[u8],
        width: u32,
        _height: u32,
    ) -> Result<Option<String>, DecoderError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(match self.hit_width {
            Some(w) if w == width => Some(self.payload.clone()),
            _ => None,
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn assert_scratch_root_empty(root: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert!(
        leftovers.is_empty(),
        "artifacts leaked after request: {leftovers:?}"
    );
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn qr_on_page_two_short_circuits_the_scan() {
    let root = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::new(3);
    // Page 2 renders 12 px wide; decode with a 1× factor sees 12.
    let decoder = ScriptedDecoder::hit(12, "https://issuer.example/certs/ABC123");

    let config = VerifyConfig::builder()
        .upscale_factor(1)
        .scratch_root(root.path())
        .renderer(renderer.clone())
        .decoder(decoder.clone())
        .build()
        .unwrap();

    let outcome = verify_bytes(b"%PDF-1.7 fake", "diploma.pdf", &config)
        .await
        .expect("pipeline should complete");

    assert!(outcome.detected());
    assert_eq!(outcome.certificate_id.as_deref(), Some("ABC123"));
    assert_eq!(
        outcome.payload.as_deref(),
        Some("https://issuer.example/certs/ABC123")
    );
    assert_eq!(outcome.page, Some(2));
    assert_eq!(outcome.stats.pages_rendered, 3);

    // Page 3 must never be attempted once page 2 decoded.
    assert_eq!(outcome.stats.decode_attempts, 2);
    assert_eq!(decoder.attempts.load(Ordering::SeqCst), 2);

    assert_scratch_root_empty(root.path());
}

#[tokio::test]
async fn single_image_without_qr_is_a_clean_no_match() {
    let root = tempfile::tempdir().unwrap();
    let decoder = ScriptedDecoder::miss();

    let config = VerifyConfig::builder()
        .upscale_factor(1)
        .scratch_root(root.path())
        .decoder(decoder.clone())
        .build()
        .unwrap();

    let outcome = verify_bytes(&png_bytes(24, 24), "scan.png", &config)
        .await
        .expect("a QR-less image is not an error");

    assert!(!outcome.detected());
    assert!(outcome.certificate_id.is_none());
    assert_eq!(outcome.page, None);
    assert_eq!(outcome.stats.pages_rendered, 0);
    assert_eq!(outcome.stats.decode_attempts, 1);
    assert_eq!(decoder.attempts.load(Ordering::SeqCst), 1);

    assert_scratch_root_empty(root.path());
}

#[tokio::test]
async fn renderer_failure_degrades_to_no_candidates() {
    let root = tempfile::tempdir().unwrap();
    let renderer = Arc::new(FailingRenderer {
        renders: AtomicUsize::new(0),
    });
    let decoder = ScriptedDecoder::miss();

    let config = VerifyConfig::builder()
        .scratch_root(root.path())
        .renderer(renderer.clone())
        .decoder(decoder.clone())
        .build()
        .unwrap();

    let outcome = verify_bytes(b"not really a pdf", "broken.pdf", &config)
        .await
        .expect("a corrupt document must not fail the request");

    assert!(!outcome.detected());
    assert_eq!(outcome.stats.pages_rendered, 0);
    assert_eq!(outcome.stats.decode_attempts, 0);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
    assert_eq!(decoder.attempts.load(Ordering::SeqCst), 0);

    assert_scratch_root_empty(root.path());
}

#[tokio::test]
async fn empty_upload_is_rejected_before_any_stage_runs() {
    let root = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::new(3);
    let decoder = ScriptedDecoder::miss();

    let config = VerifyConfig::builder()
        .scratch_root(root.path())
        .renderer(renderer.clone())
        .decoder(decoder.clone())
        .build()
        .unwrap();

    let err = verify_bytes(b"", "diploma.pdf", &config)
        .await
        .expect_err("empty upload is a caller fault");

    assert!(err.is_client_error());
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 0);
    assert_eq!(decoder.attempts.load(Ordering::SeqCst), 0);

    // The scratch area created for the request is still removed.
    assert_scratch_root_empty(root.path());
}

#[tokio::test]
async fn artifacts_are_removed_after_a_successful_decode() {
    let root = tempfile::tempdir().unwrap();
    let config = VerifyConfig::builder()
        .upscale_factor(1)
        .scratch_root(root.path())
        .renderer(FakeRenderer::new(1))
        .decoder(ScriptedDecoder::hit(11, "CERT-42"))
        .build()
        .unwrap();

    let outcome = verify_bytes(b"%PDF-1.7 fake", "cert.pdf", &config)
        .await
        .unwrap();

    assert_eq!(outcome.certificate_id.as_deref(), Some("CERT-42"));
    assert_scratch_root_empty(root.path());
}

#[tokio::test]
async fn verification_is_idempotent_across_runs() {
    let root = tempfile::tempdir().unwrap();
    let config = VerifyConfig::builder()
        .upscale_factor(1)
        .scratch_root(root.path())
        .renderer(FakeRenderer::new(2))
        .decoder(ScriptedDecoder::hit(11, "https://issuer.example/certs/SAME"))
        .build()
        .unwrap();

    let first = verify_bytes(b"%PDF-1.7 fake", "cert.pdf", &config)
        .await
        .unwrap();
    let second = verify_bytes(b"%PDF-1.7 fake", "cert.pdf", &config)
        .await
        .unwrap();

    assert_eq!(first.certificate_id, second.certificate_id);
    assert_eq!(first.payload, second.payload);
    assert_eq!(first.page, second.page);
    assert_scratch_root_empty(root.path());
}

#[tokio::test]
async fn concurrent_requests_never_share_artifacts() {
    let root = tempfile::tempdir().unwrap();
    let config = VerifyConfig::builder()
        .upscale_factor(1)
        .scratch_root(root.path())
        .renderer(FakeRenderer::new(4))
        .decoder(ScriptedDecoder::miss())
        .build()
        .unwrap();

    let (a, b) = tokio::join!(
        verify_bytes(b"%PDF-1.7 a", "a.pdf", &config),
        verify_bytes(b"%PDF-1.7 b", "b.pdf", &config),
    );

    assert_eq!(a.unwrap().stats.decode_attempts, 4);
    assert_eq!(b.unwrap().stats.decode_attempts, 4);
    assert_scratch_root_empty(root.path());
}
