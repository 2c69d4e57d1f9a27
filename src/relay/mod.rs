//! Streaming relay: pipes one upstream media stream into one download response.

pub mod filename;
pub mod format;
pub mod session;

use std::time::Duration;

use axum::response::{IntoResponse, Response};
use tokio::time::Instant;

pub use filename::{content_disposition, sanitize_title};
pub use format::select_format;
pub use session::{RelaySession, RelayState};

use crate::{
    common::types::MediaKind,
    sources::{FormatDescriptor, MediaExtractor},
};

/// Opens `format`, waits for its first chunk, and returns either the
/// committed streaming response or a JSON error response.
///
/// The response head is only produced once upstream has delivered data, so
/// every failure up to that point still gets a proper error body. Opening
/// and the first chunk share one `first_chunk_timeout` budget.
pub async fn relay(
    extractor: &dyn MediaExtractor,
    format: &FormatDescriptor,
    kind: MediaKind,
    title: &str,
    first_chunk_timeout: Duration,
) -> Response {
    let deadline = Instant::now() + first_chunk_timeout;
    let mut session = RelaySession::new(kind, title);

    if let Err(e) = session.open(extractor, format, deadline).await {
        return e.into_response();
    }

    match session.await_first_chunk(deadline).await {
        Ok(first) => session.commit(first),
        Err(e) => e.into_response(),
    }
}
