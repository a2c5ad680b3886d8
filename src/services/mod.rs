//! Business logic services.
//!
//! Services own the SQL. Handlers extract request data, call a service and
//! wrap the result in an envelope.

pub mod auth_service;
pub mod invoice_service;
pub mod order_service;
pub mod product_service;
pub mod token;

use crate::error::AppError;

/// Unwrap a required body attribute or fail with 400 naming it.
pub fn require<T>(value: Option<T>, attribute: &str) -> Result<T, AppError> {
    value.ok_or_else(|| {
        AppError::InvalidRequest(format!("Required attribute {attribute} is missing."))
    })
}
