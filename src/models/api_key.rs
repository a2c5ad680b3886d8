//! API Key model.
//!
//! An API key is an opaque random token handed out per email address. Every
//! resource row is scoped by the key that created it.

use serde::{Deserialize, Serialize};

/// Represents a row of the `apikeys` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    /// The key itself (32 lowercase hex characters)
    pub key: String,

    /// Owner of the key; one key per email
    pub email: String,
}

/// Query string of `GET /api_key`.
#[derive(Debug, Deserialize)]
pub struct ApiKeyQuery {
    pub email: Option<String>,
}

/// Payload returned by `GET /api_key`.
///
/// `message` is only present when the email already had a key.
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,

    pub key: String,
}

/// Where a gated request may carry its key: query string or JSON body.
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeyParam {
    pub api_key: Option<String>,
}
