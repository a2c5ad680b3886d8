//! Completes error envelopes with the request path.

use axum::{
    Json,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{ErrorBody, ErrorEnvelope};

/// Fill `errors.source` with the request path.
///
/// Must wrap every route, including the auth gates, so it sees the errors
/// they produce.
pub async fn attach_error_source(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ErrorBody>() {
        Some(mut errors) => {
            errors.source = Some(path);
            (response.status(), Json(ErrorEnvelope { errors })).into_response()
        }
        None => response,
    }
}
