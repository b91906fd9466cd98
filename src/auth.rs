use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    routes::AppState,
};

type HmacSha256 = Hmac<Sha256>;

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
///
/// The raw token is kept alongside the resolved username because the
/// recommendation bridge forwards it verbatim to the external computation.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub token: String,
}

/// Issue a signed token for `username`.
///
/// Token issuance belongs to the auth collaborator (login/signup), not this
/// core; this helper exists for that collaborator and for tests.
pub fn sign_token(username: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(username.as_bytes());
    let tag = mac.finalize().into_bytes();
    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(username.as_bytes()),
        URL_SAFE_NO_PAD.encode(tag)
    )
}

/// Verify a signed token and return the username it names.
pub fn verify_token(token: &str, secret: &str) -> AppResult<String> {
    let (name_part, tag_part) = token
        .split_once('.')
        .ok_or_else(|| AppError::Unauthorized("Malformed token".to_string()))?;

    let name_bytes = URL_SAFE_NO_PAD
        .decode(name_part)
        .map_err(|_| AppError::Unauthorized("Malformed token".to_string()))?;
    let tag = URL_SAFE_NO_PAD
        .decode(tag_part)
        .map_err(|_| AppError::Unauthorized("Malformed token".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(&name_bytes);
    // Constant-time comparison
    mac.verify_slice(&tag)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    String::from_utf8(name_bytes).map_err(|_| AppError::Unauthorized("Malformed token".to_string()))
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Token not provided".to_string()))?
            .to_string();

        let username = verify_token(&token, &state.token_secret)?;

        Ok(AuthUser { username, token })
    }
}
