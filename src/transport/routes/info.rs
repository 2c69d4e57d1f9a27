use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use super::{UrlQuery, requested_url};
use crate::{
    common::GatewayError,
    metadata::{self, InfoResponse},
    server::AppState,
};

/// GET /info?url=...
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UrlQuery>, QueryRejection>,
) -> Result<Json<InfoResponse>, GatewayError> {
    let url = requested_url(query);
    tracing::info!("GET /info: {:?}", url);

    let extractor = state.extractor.as_ref();
    let url = metadata::validate_url(extractor, url.as_deref())?;
    let info = metadata::get_info(extractor, url)
        .await
        .inspect_err(|e| tracing::warn!("GET /info {}: {}", url, e))?;

    tracing::debug!("GET /info {}: \"{}\"", url, info.title);
    Ok(Json(info))
}
