//! Authentication middleware.
//!
//! Two independent gates:
//!
//! - [`api_key_middleware`]: the request carries a stored API key, either as
//!   the `api_key` query parameter or as the `api_key` field of a JSON body.
//!   Grants resource access scoped to that key.
//! - [`token_middleware`]: the `x-access-token` header carries a valid,
//!   unexpired token. Grants access as the user named in the token.
//!
//! Each gate injects its context into the request extensions and rejects
//! with HTTP 401 before the handler runs.

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    db::DbPool,
    error::AppError,
    models::api_key::ApiKeyParam,
    services::{auth_service, token::TokenKeys},
};

/// Header carrying the bearer token.
pub const TOKEN_HEADER: &str = "x-access-token";

/// Largest body buffered while looking for an API key.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Attached to requests that passed the API key gate.
#[derive(Debug, Clone)]
pub struct ApiKeyContext {
    /// The validated key; every query filters on it
    pub api_key: String,

    /// Email the key was issued to
    pub email: String,
}

/// Attached to requests that passed the token gate.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub api_key: String,
    pub email: String,
}

/// API key gate.
///
/// # Flow
///
/// 1. Read `api_key` from the query string
/// 2. Otherwise buffer the body and read `api_key` from it as JSON
/// 3. Look the key up in `apikeys`
/// 4. If found: inject `ApiKeyContext`, rebuild the request and continue
/// 5. If not: 401 "Valid API key"
///
/// A body over [`MAX_BODY_BYTES`] is a 413.
pub async fn api_key_middleware(
    State(pool): State<DbPool>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    let mut api_key = Query::<ApiKeyParam>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(param)| param.api_key);

    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| AppError::PayloadTooLarge(MAX_BODY_BYTES))?;

    if api_key.is_none() && !bytes.is_empty() {
        api_key = serde_json::from_slice::<ApiKeyParam>(&bytes)
            .ok()
            .and_then(|param| param.api_key);
    }

    let api_key = api_key
        .filter(|key| !key.is_empty())
        .ok_or(AppError::InvalidApiKey)?;

    let record = auth_service::find_api_key(&pool, &api_key)
        .await?
        .ok_or(AppError::InvalidApiKey)?;

    parts.extensions.insert(ApiKeyContext {
        api_key: record.key,
        email: record.email,
    });

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Token gate.
///
/// - Header missing: 401 "No token"
/// - Bad signature, expired or malformed: 401 "Failed authentication"
pub async fn token_middleware(
    State(tokens): State<Arc<TokenKeys>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingToken)?;

    let claims = tokens.verify(token)?;

    request.extensions_mut().insert(AuthUser {
        api_key: claims.api_key,
        email: claims.email,
    });

    Ok(next.run(request).await)
}
