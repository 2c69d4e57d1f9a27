use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Overrides the user agent sent to media hosts.
    pub user_agent: Option<String>,
    /// Timeout for the metadata (player) request.
    pub request_timeout_secs: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            request_timeout_secs: 15,
        }
    }
}
