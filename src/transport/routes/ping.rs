use axum::http::StatusCode;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// GET /
pub async fn ping() -> StatusCode {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    tracing::info!("Ping at {}", now);
    StatusCode::OK
}
