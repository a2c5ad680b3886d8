//! User model and register/login payloads.

use serde::{Deserialize, Serialize};

/// Represents a row of the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub api_key: String,
    pub email: String,

    /// bcrypt hash, never serialized
    pub password: String,
}

/// Body of `POST /register` and `POST /login`.
///
/// Both fields are optional at the type level so a missing field can be
/// reported with the dedicated error rather than a JSON rejection.
#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Email and password, both non-empty, or `None`.
    pub fn require(&self) -> Option<(&str, &str)> {
        let email = self.email.as_deref().filter(|e| !e.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((email, password))
    }
}

/// Identity carried by a token.
#[derive(Debug, Clone, Serialize)]
pub struct UserIdentity {
    pub api_key: String,
    pub email: String,
}

/// Payload of a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: &'static str,
    pub user: UserIdentity,
    pub token: String,
}

/// Payload of a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
}
