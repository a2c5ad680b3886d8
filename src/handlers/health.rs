//! Service status for monitoring.
//!
//! - GET /health - Schema version and number of issued API keys

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{db::DbPool, error::AppError, models::Data};

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,

    /// Latest applied migration, `None` before the first migration ran
    pub schema_version: Option<i64>,

    /// Keys handed out so far
    pub api_keys: i64,

    pub checked_at: DateTime<Utc>,
}

/// Report the store's state.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "data": {
///     "status": "ok",
///     "schema_version": 20250101000002,
///     "api_keys": 3,
///     "checked_at": "2025-12-21T19:00:00Z"
///   }
/// }
/// ```
///
/// If the store is unreachable the standard 500 error envelope is returned.
pub async fn health_check(
    State(pool): State<DbPool>,
) -> Result<Json<Data<ServiceStatus>>, AppError> {
    let schema_version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(&pool)
            .await?;

    let api_keys: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM apikeys")
        .fetch_one(&pool)
        .await?;

    Ok(Json(Data::new(ServiceStatus {
        status: "ok",
        schema_version,
        api_keys,
        checked_at: Utc::now(),
    })))
}
