//! HTTP middleware components.
//!
//! Middleware run before route handlers. They can:
//! - Authenticate requests and short-circuit unauthorized ones
//! - Decorate responses (error envelope source)

/// API key and token gates
pub mod auth;
/// Error envelope completion
pub mod envelope;
