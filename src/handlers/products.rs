//! Product HTTP handlers.
//!
//! All routes sit behind the API key gate and only see the key's products:
//! - GET /products - List products
//! - GET /product/{id} - Get one product (`{}` if absent)
//! - POST /product - Create a product
//! - PUT /product - Update a product
//! - DELETE /product - Delete a product

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
        product::{Product, ProductBody},
    },
    services::product_service,
};

pub async fn list_products(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
) -> Result<Json<Data<Vec<Product>>>, AppError> {
    let products = product_service::list_products(&pool, &auth.api_key).await?;

    Ok(Json(Data::new(products)))
}

/// Get a product by id.
///
/// - **200**: `{ "data": { ... } }`, or `{}` when the key has no such product
/// - **400**: id is not a positive integer
pub async fn get_product(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
    AppPath(raw_id): AppPath<String>,
) -> Result<Response, AppError> {
    let product_id = parse_id(&raw_id, "product")?;
    let product = product_service::get_product(&pool, &auth.api_key, product_id).await?;

    Ok(found_or_empty(product))
}

/// Create a product.
///
/// # Request Body
///
/// ```json
/// {
///   "api_key": "...",
///   "id": 1,
///   "name": "Screw",
///   "description": "Mighty fine screw.",
///   "stock": 100,
///   "price": 2.5
/// }
/// ```
///
/// Returns 201 with the stored product; 400 if `id` or `name` is missing.
pub async fn create_product(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
    AppJson(body): AppJson<ProductBody>,
) -> Result<(StatusCode, Json<Data<Product>>), AppError> {
    let product = product_service::create_product(&pool, &auth.api_key, body).await?;

    Ok((StatusCode::CREATED, Json(Data::new(product))))
}

/// Update a product. 204 on success, 400 without `id`.
pub async fn update_product(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
    AppJson(body): AppJson<ProductBody>,
) -> Result<StatusCode, AppError> {
    product_service::update_product(&pool, &auth.api_key, body).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a product. 204 on success, 400 without `id`.
pub async fn delete_product(
    State(pool): State<DbPool>,
    Extension(auth): Extension<ApiKeyContext>,
    AppJson(body): AppJson<ProductBody>,
) -> Result<StatusCode, AppError> {
    product_service::delete_product(&pool, &auth.api_key, body.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
