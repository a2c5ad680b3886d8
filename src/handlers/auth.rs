//! Authentication HTTP handlers.
//!
//! - GET /api_key?email= - Issue (or return) the API key for an email
//! - POST /register - Register a user under the request's API key
//! - POST /login - Exchange credentials for a token

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    db::DbPool,
    error::AppError,
    handlers::{AppJson, AppQuery},
    middleware::auth::ApiKeyContext,
    models::{
        Data,
        api_key::{ApiKeyQuery, ApiKeyResponse},
        user::{Credentials, LoginResponse, RegisterResponse},
    },
    services::{auth_service, token::TokenKeys},
};

/// Issue an API key.
///
/// # Endpoint
///
/// `GET /api_key?email=someone@example.com`
///
/// # Response
///
/// - **Success (200 OK)**: `{ "data": { "key": "..." } }`, with a `message`
///   when the email already had a key
/// - **Error (401)**: email missing or malformed, including a query string
///   that does not decode (such as a repeated `email`)
pub async fn get_api_key(
    State(pool): State<DbPool>,
    query: Result<AppQuery<ApiKeyQuery>, AppError>,
) -> Result<Json<Data<ApiKeyResponse>>, AppError> {
    let email = query.ok().and_then(|AppQuery(query)| query.email);
    let key = auth_service::issue_or_fetch_api_key(&pool, email.as_deref()).await?;

    Ok(Json(Data::new(key)))
}

/// Register a user.
///
/// # Request Body
///
/// ```json
/// {
///   "api_key": "...",
///   "email": "user@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**
/// - **Error (401)**: email or password missing
/// - **Error (409)**: email already registered for this key
pub async fn register(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
    AppJson(credentials): AppJson<Credentials>,
) -> Result<(StatusCode, Json<Data<RegisterResponse>>), AppError> {
    auth_service::register(&pool, &auth.api_key, &credentials).await?;
    tracing::debug!(key_owner = %auth.email, "Registration under API key");

    Ok((
        StatusCode::CREATED,
        Json(Data::new(RegisterResponse {
            message: "User successfully registered.",
        })),
    ))
}

/// Log in.
///
/// # Response (200)
///
/// ```json
/// {
///   "data": {
///     "type": "success",
///     "message": "User logged in",
///     "user": { "api_key": "...", "email": "user@example.com" },
///     "token": "eyJ..."
///   }
/// }
/// ```
///
/// 401 when credentials are missing, the user is unknown or the password is
/// wrong.
pub async fn login(
    State(pool): State<DbPool>,
    State(tokens): State<Arc<TokenKeys>>,
    Extension(auth): Extension<ApiKeyContext>,
    AppJson(credentials): AppJson<Credentials>,
) -> Result<Json<Data<LoginResponse>>, AppError> {
    let response = auth_service::login(&pool, &tokens, &auth.api_key, &credentials).await?;

    Ok(Json(Data::new(response)))
}
