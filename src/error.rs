//! Error types and HTTP error response handling.
//!
//! Every failure becomes a JSON envelope:
//!
//! ```json
//! {
//!   "errors": {
//!     "status": 401,
//!     "source": "/login",
//!     "title": "Wrong password",
//!     "detail": "Password is incorrect."
//!   }
//! }
//! ```
//!
//! `source` is the request path. Handlers do not know it, so the response
//! carries an [`ErrorBody`] extension that
//! [`crate::middleware::envelope::attach_error_source`] completes.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Application-wide error type.
///
/// Each variant maps to one HTTP status and one envelope title.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed. Returns 500.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing or comparison failed. Returns 500.
    #[error("bcrypt error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Signing a token failed. Returns 500.
    #[error("Token error: {0}")]
    TokenIssue(#[from] jsonwebtoken::errors::Error),

    /// Blocking task (password hashing) panicked or was cancelled. Returns 500.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Every generated API key collided with an existing one. Returns 500.
    #[error("No unique API key after {0} attempts")]
    KeyGenerationExhausted(usize),

    /// Email missing or malformed when requesting an API key. Returns 401.
    #[error("A valid email address is required to obtain an API key.")]
    InvalidEmail,

    /// API key missing or unknown. Returns 401.
    #[error("No valid API key provided.")]
    InvalidApiKey,

    /// Email or password absent from a register/login body. Returns 401.
    #[error("Email or password missing in request")]
    MissingCredentials,

    /// No user for the given API key and email. Returns 401.
    #[error("User with provided email not found.")]
    UserNotFound,

    /// Password does not match the stored hash. Returns 401.
    #[error("Password is incorrect.")]
    WrongPassword,

    /// `x-access-token` header absent. Returns 401.
    #[error("No token provided in request headers")]
    MissingToken,

    /// Token signature invalid, token expired or malformed. Returns 401.
    ///
    /// The String carries the decoder's reason.
    #[error("{0}")]
    InvalidToken(String),

    /// A user with this email is already registered for the API key. Returns 409.
    #[error("User with provided email is already registered.")]
    UserExists,

    /// Request body or parameters are invalid. Returns 400.
    ///
    /// The String contains details about what was invalid.
    #[error("{0}")]
    InvalidRequest(String),

    /// Body exceeds the buffering limit of the API key gate. Returns 413.
    #[error("Request body exceeds {0} bytes.")]
    PayloadTooLarge(usize),
}

impl AppError {
    /// HTTP status and envelope title for this error.
    fn status_and_title(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::Hashing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "bcrypt error"),
            AppError::TokenIssue(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Token error"),
            AppError::Task(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
            AppError::KeyGenerationExhausted(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "API key error")
            }
            AppError::InvalidEmail => (StatusCode::UNAUTHORIZED, "Valid email"),
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Valid API key"),
            AppError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Email or password missing")
            }
            AppError::UserNotFound => (StatusCode::UNAUTHORIZED, "User not found"),
            AppError::WrongPassword => (StatusCode::UNAUTHORIZED, "Wrong password"),
            AppError::MissingToken => (StatusCode::UNAUTHORIZED, "No token"),
            AppError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "Failed authentication"),
            AppError::UserExists => (StatusCode::CONFLICT, "User already exists"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large"),
        }
    }
}

/// Malformed JSON bodies are reported through the regular envelope.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Inner object of the error envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub source: Option<String>,
    pub title: &'static str,
    pub detail: String,
}

/// `{ "errors": ... }` wrapper.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub errors: ErrorBody,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title) = self.status_and_title();

        // Internal failures are logged in full but not echoed to the client
        let detail = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            status: status.as_u16(),
            source: None,
            title,
            detail,
        };

        let mut response = (
            status,
            Json(ErrorEnvelope {
                errors: body.clone(),
            }),
        )
            .into_response();
        response.extensions_mut().insert(body);
        response
    }
}
