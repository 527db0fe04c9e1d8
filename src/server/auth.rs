//! Bearer-credential authentication: the external collaborator that turns a
//! token into a validating principal.
//!
//! Verification is authorization-sensitive — the response records *who*
//! validated the certificate — so every route requires a principal. The
//! validation mechanism itself is a seam: [`CredentialValidator`] is the
//! trait the extractor calls, and [`JwtValidator`] is the concrete
//! HS256-JWT implementation matching the issuing side's claims. Tests
//! inject their own validator rather than minting real tokens.

use super::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// The authenticated identity a credential resolves to.
#[derive(Debug, Clone)]
pub struct Principal {
    pub username: String,
}

/// Why a credential was rejected. Always maps to 401; the message is safe to
/// echo to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No authorization token provided")]
    MissingCredential,
    #[error("Authorization header is not a bearer token")]
    MalformedHeader,
    #[error("Token is not valid")]
    InvalidCredential,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "success": false, "msg": self.to_string() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Validate a bearer credential and yield the principal it identifies.
pub trait CredentialValidator: Send + Sync {
    fn validate(&self, credential: &str) -> Result<Principal, AuthError>;
}

/// Claims carried by the issuing side's tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub role: String,
    pub username: String,
    pub exp: usize,
}

/// HS256-JWT credential validator.
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl CredentialValidator for JwtValidator {
    fn validate(&self, credential: &str) -> Result<Principal, AuthError> {
        let data = decode::<Claims>(credential, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::InvalidCredential)?;
        Ok(Principal {
            username: data.claims.username,
        })
    }
}

impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingCredential)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MalformedHeader)?;

        state.validator.validate(token)
    }
}
