//! Route handlers and wire types.
//!
//! The response envelope mirrors the issuing side's API: `success` is the
//! verification verdict, not the HTTP transport verdict. A document that
//! contains no QR code yields `200 { success: false }`; 400 is reserved for
//! caller faults (no file, empty file) and 500 for infrastructure faults.

use super::auth::Principal;
use super::AppState;
use crate::outcome::extract_certificate_id;
use crate::verify::verify_bytes;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// The multipart field name carrying the uploaded document.
const DOCUMENT_FIELD: &str = "document";

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<VerifyData>,
}

#[derive(Debug, Serialize)]
pub struct VerifyData {
    #[serde(rename = "certificateId")]
    pub certificate_id: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "validatedBy")]
    pub validated_by: String,
    #[serde(rename = "parsedQr")]
    pub parsed_qr: Option<ParsedQr>,
}

/// Raw-payload echo included when a QR code was detected.
#[derive(Debug, Serialize)]
pub struct ParsedQr {
    pub raw: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub data: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────

/// `POST /api/faculty/verify-document` — run the full pipeline on one
/// multipart upload.
pub async fn verify_document(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    mut multipart: Multipart,
) -> (StatusCode, Json<VerifyResponse>) {
    let upload = match read_document_field(&mut multipart).await {
        Ok(upload) => upload,
        Err(msg) => return client_error(msg),
    };

    let Some((filename, bytes)) = upload else {
        return client_error("No document uploaded".into());
    };

    match verify_bytes(&bytes, &filename, &state.verify).await {
        Ok(outcome) => match (&outcome.payload, &outcome.certificate_id) {
            (Some(payload), Some(certificate_id)) => (
                StatusCode::OK,
                Json(VerifyResponse {
                    success: true,
                    msg: "QR code detected and certificate validated".into(),
                    data: Some(VerifyData {
                        certificate_id: Some(certificate_id.clone()),
                        link: Some(payload.clone()),
                        validated_by: principal.username,
                        parsed_qr: Some(ParsedQr {
                            raw: payload.clone(),
                        }),
                    }),
                }),
            ),
            _ => (
                StatusCode::OK,
                Json(VerifyResponse {
                    success: false,
                    msg: "Verification completed, but no QR code detected".into(),
                    data: Some(VerifyData {
                        certificate_id: None,
                        link: None,
                        validated_by: principal.username,
                        parsed_qr: None,
                    }),
                }),
            ),
        },
        Err(e) if e.is_client_error() => client_error(e.to_string()),
        Err(e) => {
            error!(error = %e, "Verification pipeline failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyResponse {
                    success: false,
                    msg: "Server error during verification".into(),
                    data: None,
                }),
            )
        }
    }
}

/// `POST /api/faculty/validate-certificate` — extract the certificate id
/// from an already-decoded payload (e.g. scanned client-side).
pub async fn validate_certificate(
    principal: Principal,
    Json(request): Json<ValidateRequest>,
) -> Json<VerifyResponse> {
    let Some(data) = request.data.filter(|d| !d.is_empty()) else {
        return Json(VerifyResponse {
            success: false,
            msg: "No QR data provided".into(),
            data: Some(VerifyData {
                certificate_id: None,
                link: None,
                validated_by: principal.username,
                parsed_qr: None,
            }),
        });
    };

    Json(VerifyResponse {
        success: true,
        msg: "Certificate is valid".into(),
        data: Some(VerifyData {
            certificate_id: Some(extract_certificate_id(&data)),
            link: Some(data.clone()),
            validated_by: principal.username,
            parsed_qr: Some(ParsedQr { raw: data }),
        }),
    })
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Pull the `document` field out of the multipart body.
///
/// `Ok(None)` means the body was well-formed but carried no such field;
/// `Err` means the body itself could not be read (caller fault either way).
async fn read_document_field(
    multipart: &mut Multipart,
) -> Result<Option<(String, Bytes)>, String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Malformed multipart body: {e}"))?
    {
        if field.name() != Some(DOCUMENT_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| format!("Failed to read uploaded document: {e}"))?;
        return Ok(Some((filename, bytes)));
    }
    Ok(None)
}

fn client_error(msg: String) -> (StatusCode, Json<VerifyResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(VerifyResponse {
            success: false,
            msg,
            data: None,
        }),
    )
}
