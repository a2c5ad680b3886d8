//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the caller's API key and email. They are
//! not persisted; validity is signature plus expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Tokens expire this many hours after issuance.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub api_key: String,
    pub email: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Signing and verification keys derived from the server secret.
///
/// Built once at startup and shared read-only between requests.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token for `api_key`/`email`, valid for [`TOKEN_LIFETIME_HOURS`].
    pub fn issue(&self, api_key: &str, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            api_key: api_key.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
        };

        tracing::debug!(email, "Issuing token");

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Check signature and expiry, returning the payload.
    ///
    /// Any decoding failure maps to [`AppError::InvalidToken`] with the
    /// decoder's reason as detail.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| AppError::InvalidToken(err.to_string()))
    }
}
