use std::{
    pin::Pin,
    task::{Context, Poll, ready},
};

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, trace, warn};

use super::filename::{content_disposition, sanitize_title};
use crate::{
    common::{GatewayError, types::{MediaKind, SessionId}},
    sources::{BoxedUpstream, FormatDescriptor, MediaExtractor},
};

/// Lifecycle of one relay. Ordered: transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelayState {
    Idle,
    StreamOpened,
    HeadersCommitted,
    Relaying,
    Completed,
    Failed,
}

impl RelayState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Binds one upstream byte stream to one download response.
///
/// The session owns the upstream exclusively. Whatever ends the session
/// (end of data, upstream error, timeout, or the response being dropped
/// because the client went away) releases the upstream exactly once.
pub struct RelaySession {
    id: SessionId,
    kind: MediaKind,
    filename: String,
    state: RelayState,
    committed: bool,
    upstream: Option<BoxedUpstream>,
    bytes_relayed: u64,
}

impl RelaySession {
    pub fn new(kind: MediaKind, title: &str) -> Self {
        Self {
            id: SessionId::generate(),
            kind,
            filename: sanitize_title(title),
            state: RelayState::Idle,
            committed: false,
            upstream: None,
            bytes_relayed: 0,
        }
    }

    fn transition(&mut self, next: RelayState) -> bool {
        if self.state.is_terminal() || next <= self.state {
            return false;
        }
        trace!("[{}] {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
        true
    }

    /// Opens the upstream. A backend that has not answered by `deadline`
    /// counts as a stall.
    pub async fn open(
        &mut self,
        extractor: &dyn MediaExtractor,
        format: &FormatDescriptor,
        deadline: Instant,
    ) -> Result<(), GatewayError> {
        if self.state != RelayState::Idle {
            return Err(GatewayError::Internal);
        }

        let Ok(opened) = timeout_at(deadline, extractor.open_stream(format)).await else {
            let err = GatewayError::StallTimeout;
            self.fail(&err);
            return Err(err);
        };

        match opened {
            Ok(upstream) => {
                self.upstream = Some(upstream);
                self.transition(RelayState::StreamOpened);
                debug!(
                    "[{}] opened {} stream via {} (itag={:?} container={} audio_bitrate={:?})",
                    self.id,
                    self.kind,
                    extractor.name(),
                    format.itag,
                    format.container,
                    format.audio_bitrate
                );
                Ok(())
            }
            Err(e) => {
                let err = GatewayError::StreamOpen(e);
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Waits for the first non-empty chunk until `deadline`. Once data flows
    /// no per-chunk timeout applies.
    pub async fn await_first_chunk(&mut self, deadline: Instant) -> Result<Bytes, GatewayError> {
        let Some(upstream) = self.upstream.as_mut() else {
            return Err(GatewayError::Internal);
        };

        let outcome = timeout_at(deadline, async {
            loop {
                match upstream.next().await {
                    Some(Ok(chunk)) if chunk.is_empty() => continue,
                    other => break other,
                }
            }
        })
        .await;

        let err = match outcome {
            Ok(Some(Ok(chunk))) => return Ok(chunk),
            Ok(Some(Err(e))) => GatewayError::StreamFailure(e),
            Ok(None) => GatewayError::EmptyStream,
            Err(_) => GatewayError::StallTimeout,
        };
        self.fail(&err);
        Err(err)
    }

    /// Sends the response head and hands the session to the response body.
    /// `first` is written before anything else read from upstream.
    pub fn commit(mut self, first: Bytes) -> Response {
        if !self.transition(RelayState::HeadersCommitted) {
            let err = GatewayError::Internal;
            self.fail(&err);
            return err.into_response();
        }
        self.committed = true;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.kind.content_type()),
        );
        if let Ok(v) = HeaderValue::from_str(&content_disposition(&self.filename, self.kind)) {
            headers.insert(header::CONTENT_DISPOSITION, v);
        }

        info!(
            "[{}] committed {} download \"{}.{}\"",
            self.id,
            self.kind,
            self.filename,
            self.kind.extension()
        );

        let body = Body::from_stream(RelayBody {
            pending: Some(first),
            session: self,
        });
        (StatusCode::OK, headers, body).into_response()
    }

    fn complete(&mut self) {
        if self.transition(RelayState::Completed) {
            info!(
                "[{}] completed after {} bytes",
                self.id, self.bytes_relayed
            );
        }
        self.release();
    }

    fn fail(&mut self, cause: &GatewayError) {
        let committed = self.committed;
        if self.transition(RelayState::Failed) {
            if committed {
                warn!(
                    "[{}] aborted after {} bytes: {}",
                    self.id, self.bytes_relayed, cause
                );
            } else {
                warn!("[{}] failed before commit: {}", self.id, cause);
            }
        }
        self.release();
    }

    /// Closes the upstream if still held. Safe to call any number of times.
    fn release(&mut self) {
        if let Some(mut upstream) = self.upstream.take() {
            if let Err(e) = upstream.close() {
                debug!("[{}] upstream close: {}", self.id, e);
            }
        }
    }
}

impl Drop for RelaySession {
    fn drop(&mut self) {
        // dropped before reaching a terminal state: the request future or
        // the response body was discarded by the server
        if !self.state.is_terminal() {
            self.fail(&GatewayError::ClientDisconnect);
        }
        self.release();
    }
}

/// Response body of a committed session. Polled only as fast as the client
/// accepts data, so upstream reads follow downstream demand.
struct RelayBody {
    pending: Option<Bytes>,
    session: RelaySession,
}

impl Stream for RelayBody {
    type Item = Result<Bytes, GatewayError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        if let Some(first) = this.pending.take() {
            this.session.bytes_relayed += first.len() as u64;
            this.session.transition(RelayState::Relaying);
            return Poll::Ready(Some(Ok(first)));
        }

        if this.session.state.is_terminal() {
            return Poll::Ready(None);
        }
        let Some(upstream) = this.session.upstream.as_mut() else {
            return Poll::Ready(None);
        };

        match ready!(upstream.poll_next_unpin(cx)) {
            Some(Ok(chunk)) => {
                this.session.bytes_relayed += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Err(e)) => {
                // headers are out: the error ends the body and hyper drops the connection
                let err = GatewayError::StreamFailure(e);
                this.session.fail(&err);
                Poll::Ready(Some(Err(err)))
            }
            None => {
                this.session.complete();
                Poll::Ready(None)
            }
        }
    }
}
