//! Authentication service: API keys, registration and login.
//!
//! # API Keys
//!
//! A key is 16 random bytes, hex encoded. One key exists per email address;
//! asking again for the same email returns the stored key.
//!
//! # Passwords
//!
//! Stored as bcrypt hashes (cost 10). Hashing and verification run on the
//! blocking thread pool so they never stall the async workers.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        api_key::{ApiKey, ApiKeyResponse},
        user::{Credentials, LoginResponse, User, UserIdentity},
    },
    services::token::TokenKeys,
};

/// bcrypt work factor for stored passwords.
pub const BCRYPT_COST: u32 = 10;

/// Give up after this many colliding keys in a row.
pub const MAX_KEY_ATTEMPTS: usize = 5;

/// Return the API key for `email`, creating one on first request.
///
/// # Errors
///
/// - `InvalidEmail`: email absent or malformed
/// - `KeyGenerationExhausted`: every candidate key collided
/// - `Database`: Database error occurred
pub async fn issue_or_fetch_api_key(
    pool: &DbPool,
    email: Option<&str>,
) -> Result<ApiKeyResponse, AppError> {
    let email = email
        .filter(|e| validate_email(e))
        .ok_or(AppError::InvalidEmail)?;

    if let Some(existing) = key_for_email(pool, email).await? {
        tracing::debug!(email, "Returning existing API key");
        return Ok(already_issued(existing));
    }

    let key = unique_api_key(pool, generate_api_key).await?;

    // A concurrent request for the same email may have inserted first
    let inserted = sqlx::query(
        "INSERT INTO apikeys (key, email) VALUES (?, ?) ON CONFLICT(email) DO NOTHING",
    )
    .bind(&key)
    .bind(email)
    .execute(pool)
    .await?
    .rows_affected();

    if inserted == 0 {
        let existing = key_for_email(pool, email)
            .await?
            .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
        tracing::debug!(email, "API key issued concurrently, returning it");
        return Ok(already_issued(existing));
    }

    tracing::info!(email, "Issued new API key");

    Ok(ApiKeyResponse { message: None, key })
}

fn already_issued(key: String) -> ApiKeyResponse {
    ApiKeyResponse {
        message: Some("Email address already used for api key."),
        key,
    }
}

async fn key_for_email(pool: &DbPool, email: &str) -> Result<Option<String>, AppError> {
    Ok(sqlx::query_scalar("SELECT key FROM apikeys WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?)
}

/// Draw keys from `generate` until one is not yet stored, at most
/// [`MAX_KEY_ATTEMPTS`] times.
async fn unique_api_key(
    pool: &DbPool,
    mut generate: impl FnMut() -> String,
) -> Result<String, AppError> {
    for attempt in 1..=MAX_KEY_ATTEMPTS {
        let candidate = generate();

        if !api_key_exists(pool, &candidate).await? {
            return Ok(candidate);
        }

        tracing::warn!(attempt, "Generated API key collided, retrying");
    }

    Err(AppError::KeyGenerationExhausted(MAX_KEY_ATTEMPTS))
}

/// Whether `key` is a stored API key.
pub async fn api_key_exists(pool: &DbPool, key: &str) -> Result<bool, AppError> {
    let found: Option<String> = sqlx::query_scalar("SELECT key FROM apikeys WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(found.is_some())
}

/// Look up a stored API key record.
pub async fn find_api_key(pool: &DbPool, key: &str) -> Result<Option<ApiKey>, AppError> {
    Ok(
        sqlx::query_as::<_, ApiKey>("SELECT key, email FROM apikeys WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?,
    )
}

/// Register a user under `api_key`.
///
/// # Errors
///
/// - `MissingCredentials`: email or password absent (checked before hashing)
/// - `UserExists`: email already registered for this key
/// - `Hashing` / `Database`: internal failures
pub async fn register(
    pool: &DbPool,
    api_key: &str,
    credentials: &Credentials,
) -> Result<(), AppError> {
    let (email, password) = credentials.require().ok_or(AppError::MissingCredentials)?;

    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST)).await??;

    let result = sqlx::query("INSERT INTO users (api_key, email, password) VALUES (?, ?, ?)")
        .bind(api_key)
        .bind(email)
        .bind(&hash)
        .execute(pool)
        .await;

    match result {
        Ok(_) => {
            tracing::info!(email, "User registered");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(AppError::UserExists)
        }
        Err(err) => Err(err.into()),
    }
}

/// Verify a user's password and issue a token.
///
/// # Errors
///
/// - `MissingCredentials`: email or password absent
/// - `UserNotFound`: no user for this key and email
/// - `WrongPassword`: password does not match
pub async fn login(
    pool: &DbPool,
    keys: &TokenKeys,
    api_key: &str,
    credentials: &Credentials,
) -> Result<LoginResponse, AppError> {
    let (email, password) = credentials.require().ok_or(AppError::MissingCredentials)?;

    let user = sqlx::query_as::<_, User>(
        "SELECT api_key, email, password FROM users WHERE api_key = ? AND email = ?",
    )
    .bind(api_key)
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::UserNotFound)?;

    let password = password.to_string();
    let stored = user.password.clone();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &stored)).await??;

    if !matches {
        tracing::warn!(email, "Login with wrong password");
        return Err(AppError::WrongPassword);
    }

    let token = keys.issue(&user.api_key, &user.email)?;

    Ok(LoginResponse {
        kind: "success",
        message: "User logged in",
        user: UserIdentity {
            api_key: user.api_key,
            email: user.email,
        },
        token,
    })
}

/// 16 random bytes as 32 lowercase hex characters.
fn generate_api_key() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

/// Characters allowed in the local part besides ASCII alphanumerics.
const LOCAL_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";

/// Syntactic email check.
///
/// # Rules
///
/// - Exactly one `@`
/// - Local part: 1-64 characters from the atom set, dots allowed but not
///   leading, trailing or doubled
/// - Domain: at most 255 characters, at least two dot-separated labels of
///   alphanumerics and inner hyphens (63 characters at most each); the last
///   label starts with a letter and is at least two characters long
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > 64 || domain.len() > 255 {
        return false;
    }

    let local_ok = local
        .split('.')
        .all(|atom| {
            !atom.is_empty()
                && atom
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || LOCAL_SPECIALS.contains(c))
        });
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld = labels[labels.len() - 1];
    let tld_ok = tld.len() >= 2 && tld.starts_with(|c: char| c.is_ascii_alphabetic());

    labels_ok && tld_ok
}
