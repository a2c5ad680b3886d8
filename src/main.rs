//! Back-office API - Main Application Entry Point
//!
//! A REST API for a small shop back office: clients obtain an API key, register
//! users, log in for a token and manage products, orders and invoices scoped to
//! their key.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: SQLite with sqlx (async queries)
//! - **Authentication**: API keys for resource access, bcrypt passwords and
//!   HS256 JWTs (`x-access-token`) for user access
//! - **Format**: JSON `{ data }` / `{ errors }` envelopes
//!
//! # Startup Flow
//!
//! 1. Load configuration and the JWT secret
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod app;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Configuration is fixed from here on
    let config = config::Config::from_env()?;
    let jwt_secret = config.jwt_secret()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let app = app::build_router(state::AppState::new(pool, &jwt_secret));

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
