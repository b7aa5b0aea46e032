use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Client settings, usually read from the `[client]` section of a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Endpoint id of the storage service.
    pub service: String,
    /// Instance auth token returned by `create`.
    #[serde(default)]
    pub token: Option<String>,
    /// Upload frames buffered ahead of the service.
    #[serde(default = "default_upload_capacity")]
    pub upload_channel_capacity: usize,
    /// Events buffered per watch before the stream is throttled.
    #[serde(default = "default_watch_capacity")]
    pub watch_channel_capacity: usize,
    #[serde(default = "default_download_capacity")]
    pub download_channel_capacity: usize,
    /// How long a refused upload waits for the service to explain itself.
    #[serde(default = "default_upload_response_timeout_secs")]
    pub upload_response_timeout_secs: u64,
}

fn default_upload_capacity() -> usize {
    8
}

fn default_watch_capacity() -> usize {
    16
}

fn default_download_capacity() -> usize {
    8
}

fn default_upload_response_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            token: None,
            upload_channel_capacity: default_upload_capacity(),
            watch_channel_capacity: default_watch_capacity(),
            download_channel_capacity: default_download_capacity(),
            upload_response_timeout_secs: default_upload_response_timeout_secs(),
        }
    }

    pub fn upload_response_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_response_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(String::new())
    }
}
