pub mod client;
pub mod models;
pub mod url;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use self::{client::InnertubeClient, url::extract_video_id};
use crate::{
    common::http::HttpClient,
    configs::{RelayConfig, YouTubeConfig},
    sources::{
        BoxedUpstream, FormatDescriptor, MediaExtractor, MediaInfo, SourceError,
        http::SegmentedStream,
    },
};

pub struct YouTubeExtractor {
    http: reqwest::Client,
    innertube: InnertubeClient,
    stream_user_agent: String,
    chunk_size: u64,
}

impl YouTubeExtractor {
    pub fn new(config: &YouTubeConfig, relay: &RelayConfig) -> Result<Self, SourceError> {
        let http = HttpClient::new(config.user_agent.as_deref())?;
        let innertube = InnertubeClient::new(
            http.clone(),
            Duration::from_secs(config.request_timeout_secs),
        );

        Ok(Self {
            http,
            innertube,
            stream_user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| client::USER_AGENT.to_string()),
            chunk_size: relay.chunk_size,
        })
    }
}

#[async_trait]
impl MediaExtractor for YouTubeExtractor {
    fn name(&self) -> &str {
        "youtube"
    }

    fn validate_url(&self, url: &str) -> bool {
        extract_video_id(url).is_some()
    }

    async fn get_info(&self, url: &str) -> Result<MediaInfo, SourceError> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| SourceError::Unsupported(format!("No video id in '{}'", url)))?;

        let info = self.innertube.player(&video_id).await?.into_media_info()?;
        debug!(
            "Resolved {}: title={:?} thumbnails={} formats={} ({} relayable)",
            video_id,
            info.title,
            info.thumbnails.len(),
            info.formats.len(),
            info.formats.iter().filter(|f| f.is_relayable()).count()
        );
        Ok(info)
    }

    async fn open_stream(&self, format: &FormatDescriptor) -> Result<BoxedUpstream, SourceError> {
        if !format.is_relayable() {
            return Err(SourceError::Unsupported(
                "Format has no stream locator".to_string(),
            ));
        }

        let stream = SegmentedStream::open(
            self.http.clone(),
            &format.url,
            Some(self.stream_user_agent.as_str()),
            format.content_length,
            self.chunk_size,
        )
        .await?;
        Ok(Box::new(stream))
    }
}
