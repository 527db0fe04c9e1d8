//! HTTP service surface (feature `server`).
//!
//! A thin axum layer over the pipeline: one multipart upload endpoint that
//! runs the full verification, one JSON endpoint that validates an
//! already-decoded payload, and a bearer-credential seam supplying the
//! validating principal. All responses share the `{ success, msg, data }`
//! envelope; "no QR code found" is a 200 with `success:false`, reserving
//! 4xx/5xx for caller faults and infrastructure faults respectively.

pub mod auth;
pub mod routes;

use crate::config::VerifyConfig;
use auth::CredentialValidator;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Default request body cap: generous for scanned multi-page PDFs while
/// keeping a bound on buffering.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for all requests.
pub struct AppState {
    /// Pipeline configuration shared by every verification request.
    pub verify: VerifyConfig,
    /// The external authentication collaborator.
    pub validator: Arc<dyn CredentialValidator>,
    /// Request body cap applied to the upload endpoint.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(verify: VerifyConfig, validator: Arc<dyn CredentialValidator>) -> Self {
        Self {
            verify,
            validator,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/api/faculty/verify-document", post(routes::verify_document))
        .route(
            "/api/faculty/validate-certificate",
            post(routes::validate_certificate),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
