//! Server configuration.

use paintwall_core::DEFAULT_MAX_STROKES;
use std::net::{AddrParseError, SocketAddr};
use std::num::ParseIntError;
use thiserror::Error;

/// Environment variable holding the listen address.
pub const ADDR_VAR: &str = "PAINTWALL_ADDR";

/// Environment variable holding the store capacity.
pub const MAX_STROKES_VAR: &str = "PAINTWALL_MAX_STROKES";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PAINTWALL_ADDR {value:?}: {source}")]
    InvalidAddr {
        value: String,
        source: AddrParseError,
    },
    #[error("Invalid PAINTWALL_MAX_STROKES {value:?}: {source}")]
    InvalidMaxStrokes {
        value: String,
        source: ParseIntError,
    },
    #[error("PAINTWALL_MAX_STROKES must be at least 1")]
    ZeroMaxStrokes,
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: SocketAddr,
    /// Number of events the store retains.
    pub max_strokes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3030)),
            max_strokes: DEFAULT_MAX_STROKES,
        }
    }
}

impl ServerConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from a variable lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ADDR_VAR) {
            let parsed = value.trim().parse();
            config.addr = parsed.map_err(|source| ConfigError::InvalidAddr { value, source })?;
        }

        if let Some(value) = lookup(MAX_STROKES_VAR) {
            let parsed = value.trim().parse::<usize>();
            let max_strokes =
                parsed.map_err(|source| ConfigError::InvalidMaxStrokes { value, source })?;
            if max_strokes == 0 {
                return Err(ConfigError::ZeroMaxStrokes);
            }
            config.max_strokes = max_strokes;
        }

        Ok(config)
    }
}
