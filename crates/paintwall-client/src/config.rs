//! Client configuration.

use paintwall_core::BrushStyle;
use std::time::Duration;

/// Default server base URL.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3030";

/// Default interval between snapshot fetches in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Environment variable naming the server base URL.
pub const SERVER_VAR: &str = "PAINTWALL_SERVER";

/// Client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the stroke server, without the `/strokes` path.
    pub server_url: String,
    /// Time between snapshot fetches.
    pub poll_interval: Duration,
    /// Brush applied to new events.
    pub style: BrushStyle,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            style: BrushStyle::default(),
        }
    }
}

impl ClientConfig {
    /// Default settings pointed at `server_url`.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    /// Resolve the server URL from an explicit argument, then the
    /// environment, then the default.
    pub fn resolve(arg: Option<String>, env: Option<String>) -> Self {
        let server_url = arg
            .or(env)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        Self::new(server_url)
    }
}
