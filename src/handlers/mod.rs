//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives request data (JSON body, path, auth context)
//! 2. Calls a service
//! 3. Wraps the result in the `{ "data": ... }` envelope with a status code

/// API key issuance, registration and login
pub mod auth;
/// Health check
pub mod health;
/// Invoice endpoints (token gated)
pub mod invoices;
/// Order endpoints
pub mod orders;
/// Product endpoints
pub mod products;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::{error::AppError, models::Data};

/// JSON body extractor whose rejections use the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string extractor whose rejections use the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Path extractor whose rejections use the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Parse an identifier taken from the URL path.
///
/// Anything but a positive integer is a 400.
pub fn parse_id(raw: &str, resource: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            AppError::InvalidRequest(format!(
                "Required attribute {resource} id is not an integer."
            ))
        })
}

/// `{ "data": item }` when found, an empty `{}` otherwise.
///
/// Both are 200; a missing row is not treated as an error for single-item
/// reads.
pub fn found_or_empty<T: Serialize>(item: Option<T>) -> Response {
    match item {
        Some(item) => Json(Data::new(item)).into_response(),
        None => Json(json!({})).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("1", "product").unwrap(), 1);
        assert_eq!(parse_id("42", "invoice").unwrap(), 42);

        for raw in ["", "abc", "1.5", "0", "-2", "1abc"] {
            assert!(
                matches!(parse_id(raw, "product"), Err(AppError::InvalidRequest(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_found_or_empty() {
        let empty = found_or_empty::<i64>(None);
        assert_eq!(empty.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(empty.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"{}");

        let found = found_or_empty(Some(7));
        let bytes = axum::body::to_bytes(found.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"data":7}"#);
    }
}
