use std::{
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::{
    Stream, StreamExt, TryStreamExt,
    stream::{self, BoxStream},
};
use reqwest::{Client, Response, StatusCode, header};
use tracing::{debug, trace};

use crate::sources::{SourceError, Upstream};

/// Sequential ranged download of one locator.
///
/// Media hosts throttle long single responses, so a known-length body is
/// fetched as consecutive `Range` segments of `chunk_size` bytes. Segments
/// are requested lazily: the next request is only sent once the consumer has
/// drained the previous one, which keeps the read rate tied to the client.
pub struct SegmentedStream {
    inner: Option<BoxStream<'static, Result<Bytes, SourceError>>>,
}

impl SegmentedStream {
    /// Sends the first request eagerly so that refusals (403, 404, DNS...)
    /// surface here rather than mid-stream.
    pub async fn open(
        client: Client,
        url: &str,
        user_agent: Option<&str>,
        content_length: Option<u64>,
        chunk_size: u64,
    ) -> Result<Self, SourceError> {
        let chunk_size = chunk_size.max(1);
        let total = content_length.filter(|&len| len > 0);
        let user_agent = user_agent.map(str::to_string);

        let first_range = total.map(|total| segment(0, chunk_size, total));
        let first = fetch(&client, url, user_agent.as_deref(), first_range).await?;

        // A plain 200 means the host ignored the range and is sending everything.
        let ranged = first.status() == StatusCode::PARTIAL_CONTENT;

        debug!(
            "Opened upstream: status={} total={:?} ranged={} chunk_size={}",
            first.status(),
            total,
            ranged,
            chunk_size
        );

        let head = first.bytes_stream().map_err(SourceError::from);
        let rest = match (total, first_range) {
            (Some(total), Some((_, end))) if ranged && end + 1 < total => remaining_segments(
                client,
                url.to_string(),
                user_agent,
                end + 1,
                total,
                chunk_size,
            )
            .boxed(),
            _ => stream::empty().boxed(),
        };

        Ok(Self {
            inner: Some(head.chain(rest).boxed()),
        })
    }
}

impl Stream for SegmentedStream {
    type Item = Result<Bytes, SourceError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut() {
            Some(inner) => inner.poll_next_unpin(cx),
            None => Poll::Ready(None),
        }
    }
}

impl Upstream for SegmentedStream {
    fn close(&mut self) -> Result<(), SourceError> {
        // dropping the boxed stream drops the in-flight response and its connection
        match self.inner.take() {
            Some(_) => Ok(()),
            None => Err(SourceError::Closed),
        }
    }
}

/// Inclusive byte range of the segment starting at `offset`.
fn segment(offset: u64, chunk_size: u64, total: u64) -> (u64, u64) {
    (offset, (offset + chunk_size).min(total) - 1)
}

fn remaining_segments(
    client: Client,
    url: String,
    user_agent: Option<String>,
    start: u64,
    total: u64,
    chunk_size: u64,
) -> impl Stream<Item = Result<Bytes, SourceError>> + Send + 'static {
    stream::try_unfold(start, move |offset| {
        let client = client.clone();
        let url = url.clone();
        let user_agent = user_agent.clone();
        async move {
            if offset >= total {
                return Ok::<_, SourceError>(None);
            }

            let range = segment(offset, chunk_size, total);
            let res = fetch(&client, &url, user_agent.as_deref(), Some(range)).await?;
            if res.status() != StatusCode::PARTIAL_CONTENT {
                return Err(SourceError::Upstream(format!(
                    "Upstream ignored range request for bytes {}-{}",
                    range.0, range.1
                )));
            }

            Ok(Some((
                res.bytes_stream().map_err(SourceError::from),
                range.1 + 1,
            )))
        }
    })
    .try_flatten()
}

async fn fetch(
    client: &Client,
    url: &str,
    user_agent: Option<&str>,
    range: Option<(u64, u64)>,
) -> Result<Response, SourceError> {
    let mut req = client.get(url).header(header::ACCEPT, "*/*");
    if let Some(ua) = user_agent {
        req = req.header(header::USER_AGENT, ua);
    }
    if let Some((start, end)) = range {
        req = req.header(header::RANGE, format!("bytes={}-{}", start, end));
    }

    let res = req.send().await?;
    trace!("Upstream segment {:?} -> {}", range, res.status());

    if !res.status().is_success() {
        return Err(SourceError::Status(res.status()));
    }
    Ok(res)
}
