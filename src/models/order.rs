//! Customer order model and request body.

use serde::{Deserialize, Serialize};

/// Status assigned to orders created without one ("new").
pub const DEFAULT_STATUS_ID: i64 = 100;

/// Represents an order row, without its owning API key.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Order {
    /// Assigned by the store on insert
    pub id: i64,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub customer_zip: Option<String>,
    pub customer_city: Option<String>,
    pub customer_country: Option<String>,
    pub status_id: i64,
}

/// Body of `POST`, `PUT` and `DELETE /order`.
///
/// `POST` requires `customer_name`; `PUT` and `DELETE` require `id`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderBody {
    pub id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub customer_zip: Option<String>,
    pub customer_city: Option<String>,
    pub customer_country: Option<String>,
    pub status_id: Option<i64>,
}
