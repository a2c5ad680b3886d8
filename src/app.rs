//! HTTP router assembly.
//!
//! Route groups and their gates:
//!
//! - Public: `/health`, `/api_key`
//! - API key: `/register`, `/login`, products, orders
//! - API key + token: invoices

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, health, invoices, orders, products},
    middleware::{auth as gates, envelope},
    state::AppState,
};

pub fn build_router(state: AppState) -> Router {
    // Token gated, scoped by the key inside the token
    let invoice_routes = Router::new()
        .route("/invoices", get(invoices::list_invoices))
        .route("/invoice/{id}", get(invoices::get_invoice))
        .route(
            "/invoice",
            post(invoices::create_invoice)
                .put(invoices::update_invoice)
                .delete(invoices::delete_invoice),
        )
        .route_layer(from_fn_with_state(state.clone(), gates::token_middleware));

    // API key gated; wraps the invoice routes as well
    let key_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/products", get(products::list_products))
        .route("/product/{id}", get(products::get_product))
        .route(
            "/product",
            post(products::create_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/orders", get(orders::list_orders))
        .route("/order/{id}", get(orders::get_order))
        .route(
            "/order",
            post(orders::create_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .merge(invoice_routes)
        .route_layer(from_fn_with_state(state.clone(), gates::api_key_middleware));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api_key", get(auth::get_api_key))
        .merge(key_routes)
        // Outermost of the app layers so gate rejections get a source too
        .layer(from_fn(envelope::attach_error_source))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
