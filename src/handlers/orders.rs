//! Order HTTP handlers.
//!
//! - GET /orders - List the key's orders
//! - GET /order/{id} - Get one order (`{}` if absent)
//! - POST /order - Create an order
//! - PUT /order - Update an order
//! - DELETE /order - Delete an order and its invoices

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
    middleware::auth::ApiKeyContext,
    models::{
        Data,
        order::{Order, OrderBody},
    },
    services::order_service,
};

pub async fn list_orders(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
) -> Result<Json<Data<Vec<Order>>>, AppError> {
    let orders = order_service::list_orders(&pool, &auth.api_key).await?;

    Ok(Json(Data::new(orders)))
}

pub async fn get_order(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
    AppPath(raw_id): AppPath<String>,
) -> Result<Response, AppError> {
    let order_id = parse_id(&raw_id, "order")?;
    let order = order_service::get_order(&pool, &auth.api_key, order_id).await?;

    Ok(found_or_empty(order))
}

/// Create an order.
///
/// # Request Body
///
/// ```json
/// {
///   "api_key": "...",
///   "customer_name": "Ada Lovelace",
///   "customer_city": "London",
///   "status_id": 100
/// }
/// ```
///
/// Returns 201 with the stored order, including its assigned `id`.
pub async fn create_order(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
    AppJson(body): AppJson<OrderBody>,
) -> Result<(StatusCode, Json<Data<Order>>), AppError> {
    let order = order_service::create_order(&pool, &auth.api_key, body).await?;

    Ok((StatusCode::CREATED, Json(Data::new(order))))
}

pub async fn update_order(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
    AppJson(body): AppJson<OrderBody>,
) -> Result<StatusCode, AppError> {
    order_service::update_order(&pool, &auth.api_key, body).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_order(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
    AppJson(body): AppJson<OrderBody>,
) -> Result<StatusCode, AppError> {
    order_service::delete_order(&pool, &auth.api_key, body.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
