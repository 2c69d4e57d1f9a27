//! Innertube `player` response, reduced to the fields the gateway reads.

use serde::Deserialize;

use crate::sources::{FormatDescriptor, MediaInfo, SourceError, Thumbnail};

/// Audio bitrate (kbps) of the legacy muxed itags, which do not report one.
const MUXED_AUDIO_BITRATES: &[(i64, u32)] = &[(17, 24), (18, 96), (22, 192), (37, 192), (59, 128)];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub playability_status: Option<PlayabilityStatus>,
    pub video_details: Option<VideoDetails>,
    pub streaming_data: Option<StreamingData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayabilityStatus {
    pub status: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub video_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub thumbnail: ThumbnailSet,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThumbnailSet {
    #[serde(default)]
    pub thumbnails: Vec<RawThumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct RawThumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingData {
    #[serde(default)]
    pub formats: Vec<RawFormat>,
    #[serde(default)]
    pub adaptive_formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFormat {
    pub itag: i64,
    /// Absent when the format is cipher-protected.
    pub url: Option<String>,
    pub mime_type: String,
    pub bitrate: Option<u64>,
    pub average_bitrate: Option<u64>,
    pub audio_quality: Option<String>,
    pub audio_channels: Option<u32>,
    pub content_length: Option<String>,
}

impl PlayerResponse {
    pub fn into_media_info(self) -> Result<MediaInfo, SourceError> {
        if let Some(status) = self.playability_status {
            if status.status != "OK" {
                return Err(SourceError::Unplayable(status.reason.unwrap_or_else(|| {
                    format!("Video is not playable (status={})", status.status)
                })));
            }
        }

        let details = self
            .video_details
            .ok_or_else(|| SourceError::Malformed("missing videoDetails".to_string()))?;

        let formats = self
            .streaming_data
            .map(|data| {
                data.formats
                    .into_iter()
                    .chain(data.adaptive_formats)
                    .map(FormatDescriptor::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(MediaInfo {
            title: details.title,
            thumbnails: details
                .thumbnail
                .thumbnails
                .into_iter()
                .map(|t| Thumbnail {
                    url: t.url,
                    width: t.width,
                    height: t.height,
                })
                .collect(),
            formats,
        })
    }
}

impl From<RawFormat> for FormatDescriptor {
    fn from(raw: RawFormat) -> Self {
        let essence = raw
            .mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let container = essence
            .split_once('/')
            .map(|(_, sub)| sub.to_string())
            .unwrap_or_default();

        let has_video = essence.starts_with("video/");
        let has_audio = essence.starts_with("audio/")
            || raw.audio_quality.is_some()
            || raw.audio_channels.is_some();

        let audio_bitrate = if has_audio && !has_video {
            raw.average_bitrate
                .or(raw.bitrate)
                .map(|bps| ((bps + 500) / 1000) as u32)
        } else if has_audio {
            MUXED_AUDIO_BITRATES
                .iter()
                .find(|(itag, _)| *itag == raw.itag)
                .map(|(_, kbps)| *kbps)
        } else {
            None
        };

        Self {
            itag: Some(raw.itag),
            container,
            mime_type: raw.mime_type,
            has_audio,
            has_video,
            audio_bitrate,
            content_length: raw.content_length.and_then(|s| s.parse().ok()),
            url: raw.url.unwrap_or_default(),
        }
    }
}
