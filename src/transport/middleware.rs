use std::any::Any;

use axum::{
    http::{Method, header},
    response::{IntoResponse, Response},
};
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tracing::error;

use crate::common::GatewayError;

/// Any origin, no credentials. Every `OPTIONS` request is answered here
/// with an empty 200 and never reaches a route.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::USER_AGENT])
}

/// Turns a panicking handler into a 500 with the usual error body. The
/// connection and every other request carry on.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    error!("Request handler panicked: {}", message);

    GatewayError::Internal.into_response()
}
