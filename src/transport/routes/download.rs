use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
};

use super::{UrlQuery, requested_url};
use crate::{
    common::{GatewayError, types::MediaKind},
    metadata, relay,
    server::AppState,
};

/// GET /mp3?url=...
pub async fn download_mp3(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UrlQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    download(&state, requested_url(query), MediaKind::Audio).await
}

/// GET /mp4?url=...
pub async fn download_mp4(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UrlQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    download(&state, requested_url(query), MediaKind::Video).await
}

async fn download(
    state: &AppState,
    url: Option<String>,
    kind: MediaKind,
) -> Result<Response, GatewayError> {
    tracing::info!("GET /{}: {:?}", kind.extension(), url);

    let extractor = state.extractor.as_ref();
    let url = metadata::validate_url(extractor, url.as_deref())?;
    let info = metadata::fetch_info(extractor, url)
        .await
        .inspect_err(|e| tracing::warn!("GET /{} {}: {}", kind.extension(), url, e))?;

    let format = relay::select_format(&info.formats, kind)
        .inspect_err(|e| tracing::warn!("GET /{} {}: {}", kind.extension(), url, e))?;

    let first_chunk_timeout = Duration::from_secs(state.config.relay.first_chunk_timeout_secs);
    Ok(relay::relay(extractor, format, kind, &info.title, first_chunk_timeout).await)
}
