//! Shared application state.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{db::DbPool, services::token::TokenKeys};

/// State handed to every handler and middleware.
///
/// Built once in `main` before the listener binds; never mutated after.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(pool: DbPool, jwt_secret: &str) -> Self {
        Self {
            pool,
            tokens: Arc::new(TokenKeys::new(jwt_secret)),
        }
    }
}

/// Lets handlers that only touch the database extract `State<DbPool>`.
impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<TokenKeys> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
