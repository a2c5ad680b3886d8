//! Invoice HTTP handlers.
//!
//! Invoices require both an API key and a token. Rows are scoped by the API
//! key inside the verified token, so a token only ever reaches the invoices
//! of the account it was issued for.
//!
//! - GET /invoices
//! - GET /invoice/{id}
//! - POST /invoice
//! - PUT /invoice
//! - DELETE /invoice

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::Response,
};

use crate::{
    db::DbPool,
    error::AppError,
    handlers::{AppJson, AppPath, found_or_empty, parse_id},
    middleware::auth::AuthUser,
    models::{
        Data,
        invoice::{Invoice, InvoiceBody},
    },
    services::invoice_service,
};

pub async fn list_invoices(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Data<Vec<Invoice>>>, AppError> {
    let invoices = invoice_service::list_invoices(&pool, &user.api_key).await?;

    Ok(Json(Data::new(invoices)))
}

pub async fn get_invoice(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    AppPath(raw_id): AppPath<String>,
) -> Result<Response, AppError> {
    let invoice_id = parse_id(&raw_id, "invoice")?;
    let invoice = invoice_service::get_invoice(&pool, &user.api_key, invoice_id).await?;

    Ok(found_or_empty(invoice))
}

/// Create an invoice.
///
/// # Request Body
///
/// ```json
/// {
///   "api_key": "...",
///   "order_id": 1,
///   "total_price": 1234.5,
///   "creation_date": "2024-03-01",
///   "due_date": "2024-03-31"
/// }
/// ```
///
/// # Response (201)
///
/// The invoice re-read through its order, so customer fields are included:
///
/// ```json
/// {
///   "data": {
///     "id": 1,
///     "creation_date": "2024-03-01",
///     "due_date": "2024-03-31",
///     "order_id": 1,
///     "name": "Ada Lovelace",
///     "address": null,
///     "zip": null,
///     "city": "London",
///     "country": null,
///     "total_price": 1234.5
///   }
/// }
/// ```
pub async fn create_invoice(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    AppJson(body): AppJson<InvoiceBody>,
) -> Result<(StatusCode, Json<Data<Invoice>>), AppError> {
    let invoice = invoice_service::create_invoice(&pool, &user.api_key, body).await?;
    tracing::debug!(email = %user.email, invoice_id = invoice.id, "Invoice issued by user");

    Ok((StatusCode::CREATED, Json(Data::new(invoice))))
}

pub async fn update_invoice(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    AppJson(body): AppJson<InvoiceBody>,
) -> Result<StatusCode, AppError> {
    invoice_service::update_invoice(&pool, &user.api_key, body).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_invoice(
    State(pool): State<DbPool>,
    Extension(user): Extension<AuthUser>,
    AppJson(body): AppJson<InvoiceBody>,
) -> Result<StatusCode, AppError> {
    invoice_service::delete_invoice(&pool, &user.api_key, body.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
