use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Ceiling on an idle response body, long enough for large transfers.
    pub connection_timeout_secs: u64,
    /// Terminate the process after logging an uncaught panic.
    pub exit_on_panic: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3500,
            connection_timeout_secs: 30 * 60,
            exit_on_panic: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RelayConfig {
    /// How long an opened upstream may stay silent before the first chunk.
    pub first_chunk_timeout_secs: u64,
    /// Size of each ranged request made against the upstream locator.
    pub chunk_size: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            first_chunk_timeout_secs: 30,
            chunk_size: 10 * 1024 * 1024,
        }
    }
}
