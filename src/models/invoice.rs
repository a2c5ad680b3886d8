//! Invoice model and request body.
//!
//! # Price Storage
//!
//! `total_price` is stored in minor units (cents) and exposed as a decimal
//! amount: 1050 in the table is `10.5` in responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days between creation and due date when no due date is given.
pub const DEFAULT_PAYMENT_TERM_DAYS: i64 = 30;

/// An invoice joined with the customer fields of its order.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Invoice {
    pub id: i64,
    pub creation_date: NaiveDate,
    pub due_date: NaiveDate,
    pub order_id: i64,
    pub name: String,
    pub address: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,

    /// Decimal amount (stored cents / 100)
    pub total_price: f64,
}

/// Body of `POST`, `PUT` and `DELETE /invoice`.
///
/// `POST` requires `order_id` and `total_price`; `PUT` and `DELETE` require
/// `id`. Dates use the `YYYY-MM-DD` format.
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceBody {
    pub id: Option<i64>,
    pub order_id: Option<i64>,
    pub total_price: Option<f64>,
    pub creation_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

/// Convert a decimal amount to minor units, rounding to the nearest cent.
///
/// `None` for negative, non-finite or amounts too large for an `i64`.
pub fn to_minor_units(amount: f64) -> Option<i64> {
    let cents = (amount * 100.0).round();
    (cents.is_finite() && cents >= 0.0 && cents < i64::MAX as f64).then_some(cents as i64)
}
