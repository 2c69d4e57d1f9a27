use std::time::Duration;

use serde_json::{Value, json};

use super::models::PlayerResponse;
use crate::sources::SourceError;

pub const INNERTUBE_API: &str = "https://youtubei.googleapis.com";

const CLIENT_NAME: &str = "ANDROID_VR";
const CLIENT_ID: &str = "28";
const CLIENT_VERSION: &str = "1.61.48";
/// Media locators handed out to this client expect the same user agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8 Pro Build/UQ1A.240205.002; wv) \
     AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 \
     Chrome/121.0.6167.164 Mobile Safari/537.36 YouTubeVR/1.61.48 (gzip)";

/// Innertube client posing as the Android VR app, which receives plain
/// (non-ciphered) stream URLs.
pub struct InnertubeClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl InnertubeClient {
    pub fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    fn build_context(&self) -> Value {
        json!({
            "client": {
                "clientName": CLIENT_NAME,
                "clientVersion": CLIENT_VERSION,
                "userAgent": USER_AGENT,
                "androidSdkVersion": 34,
                "deviceMake": "Google",
                "deviceModel": "Pixel 8 Pro",
                "osName": "Android",
                "osVersion": "14",
                "hl": "en",
                "gl": "US"
            },
            "user": { "lockedSafetyMode": false },
            "request": { "useSsl": true }
        })
    }

    pub async fn player(&self, video_id: &str) -> Result<PlayerResponse, SourceError> {
        let body = json!({
            "context": self.build_context(),
            "videoId": video_id,
            "contentCheckOk": true,
            "racyCheckOk": true
        });

        let url = format!("{}/youtubei/v1/player?prettyPrint=false", INNERTUBE_API);

        let res = self
            .http
            .post(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header("X-YouTube-Client-Name", CLIENT_ID)
            .header("X-YouTube-Client-Version", CLIENT_VERSION)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!("Innertube player request for {} returned {}", video_id, status);
            return Err(SourceError::Status(status));
        }

        res.json::<PlayerResponse>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }
}
