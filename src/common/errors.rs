use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{common::types::MediaKind, sources::SourceError};

/// JSON error body returned by every endpoint: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Request-level failures.
///
/// Variants before [`GatewayError::StreamFailure`] can only happen before the
/// response head is sent and always become a JSON error response. The rest
/// only occur once bytes are flowing; the connection is cut instead.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Missing or malformed `url` query parameter.
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("{0}")]
    Backend(#[source] SourceError),

    #[error("No suitable {0} format found")]
    NoSuitableFormat(MediaKind),

    #[error("{0}")]
    StreamOpen(#[source] SourceError),

    #[error("Stream timeout: No data received")]
    StallTimeout,

    #[error("Stream ended: No data received")]
    EmptyStream,

    #[error("{0}")]
    StreamFailure(#[source] SourceError),

    #[error("Client disconnected")]
    ClientDisconnect,

    #[error("Internal server error")]
    Internal,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
