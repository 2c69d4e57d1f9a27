//! Extraction backends.
//!
//! A backend turns a page URL into [`MediaInfo`] and opens byte streams for
//! the formats it lists. Everything above this module treats it as a black
//! box behind [`MediaExtractor`].

pub mod http;
pub mod youtube;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::Serialize;

pub use youtube::YouTubeExtractor;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream responded with status {0}")]
    Status(reqwest::StatusCode),

    /// The backend refused the item (private, removed, region-locked...).
    #[error("{0}")]
    Unplayable(String),

    #[error("Malformed backend response: {0}")]
    Malformed(String),

    #[error("Unsupported source: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Stream already closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One available encoding of a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDescriptor {
    pub itag: Option<i64>,
    /// Container kind, e.g. `mp4` or `webm`.
    pub container: String,
    pub mime_type: String,
    pub has_audio: bool,
    pub has_video: bool,
    /// Audio bitrate in kbps when the backend reports it.
    pub audio_bitrate: Option<u32>,
    pub content_length: Option<u64>,
    /// Direct byte-stream locator. Empty when the backend could not resolve one.
    pub url: String,
}

impl FormatDescriptor {
    pub fn is_relayable(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Everything the gateway needs to know about one media item.
#[derive(Debug, Clone, Default)]
pub struct MediaInfo {
    pub title: String,
    /// Thumbnail candidates in the order the backend lists them.
    pub thumbnails: Vec<Thumbnail>,
    pub formats: Vec<FormatDescriptor>,
}

/// An opened upstream byte stream.
///
/// `close` releases the underlying connection. Callers must invoke it at
/// most once; implementations may reject a second call.
pub trait Upstream: Stream<Item = Result<Bytes, SourceError>> + Send + Unpin {
    fn close(&mut self) -> Result<(), SourceError>;
}

pub type BoxedUpstream = Box<dyn Upstream>;

#[async_trait]
pub trait MediaExtractor: Send + Sync {
    fn name(&self) -> &str;

    /// Cheap, offline check that `url` looks like something this backend serves.
    fn validate_url(&self, url: &str) -> bool;

    async fn get_info(&self, url: &str) -> Result<MediaInfo, SourceError>;

    async fn open_stream(&self, format: &FormatDescriptor) -> Result<BoxedUpstream, SourceError>;
}
