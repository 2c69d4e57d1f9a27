//! Test doubles for the extraction backend.

use std::{
    collections::VecDeque,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::sources::{
    BoxedUpstream, FormatDescriptor, MediaExtractor, MediaInfo, SourceError, Thumbnail, Upstream,
};

#[derive(Debug, Clone)]
pub enum Step {
    Chunk(Bytes),
    Fail(&'static str),
    /// Never yields again.
    Stall,
}

pub fn chunk(data: &'static [u8]) -> Step {
    Step::Chunk(Bytes::from_static(data))
}

/// Counts closes across every stream handed out by one extractor.
#[derive(Debug, Clone, Default)]
pub struct CloseProbe {
    closes: Arc<AtomicUsize>,
    double_closes: Arc<AtomicUsize>,
}

impl CloseProbe {
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn double_closes(&self) -> usize {
        self.double_closes.load(Ordering::SeqCst)
    }
}

pub struct MockUpstream {
    steps: VecDeque<Step>,
    probe: CloseProbe,
    closed: bool,
}

impl MockUpstream {
    pub fn new(steps: Vec<Step>, probe: CloseProbe) -> Self {
        Self {
            steps: steps.into(),
            probe,
            closed: false,
        }
    }
}

impl Stream for MockUpstream {
    type Item = Result<Bytes, SourceError>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.closed {
            return Poll::Ready(None);
        }
        if matches!(self.steps.front(), Some(Step::Stall)) {
            return Poll::Pending;
        }
        match self.steps.pop_front() {
            Some(Step::Chunk(bytes)) => Poll::Ready(Some(Ok(bytes))),
            Some(Step::Fail(message)) => {
                Poll::Ready(Some(Err(SourceError::Upstream(message.to_string()))))
            }
            Some(Step::Stall) | None => Poll::Ready(None),
        }
    }
}

impl Upstream for MockUpstream {
    fn close(&mut self) -> Result<(), SourceError> {
        if self.closed {
            self.probe.double_closes.fetch_add(1, Ordering::SeqCst);
            return Err(SourceError::Closed);
        }
        self.closed = true;
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn format(has_audio: bool, has_video: bool, audio_bitrate: Option<u32>, url: &str) -> FormatDescriptor {
    FormatDescriptor {
        itag: None,
        container: if has_video { "mp4" } else { "webm" }.to_string(),
        mime_type: String::new(),
        has_audio,
        has_video,
        audio_bitrate,
        content_length: None,
        url: url.to_string(),
    }
}

pub fn thumbnails(count: usize) -> Vec<Thumbnail> {
    (0..count)
        .map(|i| Thumbnail {
            url: format!("https://img.test/{}.jpg", i),
            width: None,
            height: None,
        })
        .collect()
}

/// Accepts `https://media.test/...` URLs and replays a fixed script.
pub struct MockExtractor {
    pub info: Result<MediaInfo, &'static str>,
    pub steps: Vec<Step>,
    pub open_error: Option<&'static str>,
    /// `Some(None)` never finishes opening.
    pub open_delay: Option<Option<Duration>>,
    pub probe: CloseProbe,
    opened: AtomicUsize,
}

impl MockExtractor {
    pub fn new(info: MediaInfo, steps: Vec<Step>) -> Self {
        Self {
            info: Ok(info),
            steps,
            open_error: None,
            open_delay: None,
            probe: CloseProbe::default(),
            opened: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &'static str) -> Self {
        Self {
            info: Err(message),
            ..Self::new(MediaInfo::default(), Vec::new())
        }
    }

    pub fn with_open_error(mut self, message: &'static str) -> Self {
        self.open_error = Some(message);
        self
    }

    /// Delays `open_stream`; `None` makes it hang forever.
    pub fn with_open_delay(mut self, delay: Option<Duration>) -> Self {
        self.open_delay = Some(delay);
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    fn validate_url(&self, url: &str) -> bool {
        url.starts_with("https://media.test/")
    }

    async fn get_info(&self, _url: &str) -> Result<MediaInfo, SourceError> {
        self.info
            .clone()
            .map_err(|message| SourceError::Unplayable(message.to_string()))
    }

    async fn open_stream(&self, _format: &FormatDescriptor) -> Result<BoxedUpstream, SourceError> {
        match self.open_delay {
            Some(Some(delay)) => tokio::time::sleep(delay).await,
            Some(None) => std::future::pending::<()>().await,
            None => {}
        }
        if let Some(message) = self.open_error {
            return Err(SourceError::Upstream(message.to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockUpstream::new(self.steps.clone(), self.probe.clone())))
    }
}
