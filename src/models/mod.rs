//! Data models representing database entities and API payloads.

/// API key model
pub mod api_key;
/// Invoice model, joined with its order
pub mod invoice;
/// Customer order model
pub mod order;
/// Product model
pub mod product;
/// Registered user model
pub mod user;

use serde::Serialize;

/// Success envelope: `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
