//! Product model and request body.

use serde::{Deserialize, Serialize};

/// Represents a product row, without its owning API key.
///
/// Product ids are chosen by the client (an article number) and are unique
/// per API key.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub specifiers: Option<String>,
    pub stock: i64,
    pub location: Option<String>,
    pub price: Option<f64>,
}

/// Body of `POST`, `PUT` and `DELETE /product`.
///
/// `POST` requires `id` and `name`; `PUT` and `DELETE` require `id`. On
/// update, absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct ProductBody {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub specifiers: Option<String>,
    pub stock: Option<i64>,
    pub location: Option<String>,
    pub price: Option<f64>,
}
