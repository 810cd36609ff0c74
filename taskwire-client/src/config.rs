//! Client and connection configuration
//!
//! `WsConfig` covers the connection layer (endpoint, timeouts, reconnect
//! policy). `ClientConfig` wraps it with the API key and the default
//! response-wait timeout. All fields have the service's documented defaults,
//! so `ClientConfig::new(key)` is enough for most callers.

use std::time::Duration;

use taskwire_core::{Error, Result};

/// Default WebSocket endpoint of the task-processing service
pub const DEFAULT_ENDPOINT: &str = "wss://ws-api.taskwire.ai/v1";

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "TASKWIRE_API_KEY";

/// Connection-layer configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket endpoint URL
    pub url: String,
    /// Deadline for the initial dial
    pub connect_timeout: Duration,
    /// Interval between heartbeat pings
    pub ping_interval: Duration,
    /// Max silence on the read side before the connection is declared dead
    pub pong_timeout: Duration,
    /// Deadline for any single frame write
    pub write_timeout: Duration,
    /// First reconnect delay
    pub reconnect_delay: Duration,
    /// Cap on the doubled reconnect delay
    pub max_reconnect_delay: Duration,
    /// Whether a dropped connection is re-dialed automatically
    pub enable_auto_reconnect: bool,
    /// Write buffer size handed to the WebSocket stack
    pub write_buffer_size: usize,
    /// Max inbound message size accepted from the service
    pub max_message_size: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(30),
            ping_interval: Duration::from_secs(30),
            pong_timeout: Duration::from_secs(90),
            write_timeout: Duration::from_secs(10),
            reconnect_delay: Duration::from_secs(5),
            max_reconnect_delay: Duration::from_secs(60),
            enable_auto_reconnect: true,
            write_buffer_size: 4096,
            max_message_size: 16 * 1024 * 1024,
        }
    }
}

/// Client configuration: API key plus connection settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent in the authentication frame
    pub api_key: Option<String>,
    /// Connection-layer settings
    pub ws: WsConfig,
    /// Default deadline for waiting on responses
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ws: WsConfig::default(),
            request_timeout: Duration::from_secs(120),
        }
    }

    /// Configuration that reads the API key from the environment at connect time.
    pub fn from_env() -> Self {
        Self {
            api_key: None,
            ws: WsConfig::default(),
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.ws.url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_ws(mut self, ws: WsConfig) -> Self {
        self.ws = ws;
        self
    }

    /// Resolve the effective API key, falling back to the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::InvalidApiKey),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_defaults() {
        let ws = WsConfig::default();
        assert_eq!(ws.url, DEFAULT_ENDPOINT);
        assert_eq!(ws.connect_timeout, Duration::from_secs(30));
        assert_eq!(ws.ping_interval, Duration::from_secs(30));
        assert_eq!(ws.pong_timeout, Duration::from_secs(90));
        assert_eq!(ws.reconnect_delay, Duration::from_secs(5));
        assert_eq!(ws.max_reconnect_delay, Duration::from_secs(60));
        assert!(ws.enable_auto_reconnect);
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let config = ClientConfig::new("explicit-key");
        assert_eq!(config.resolve_api_key().unwrap(), "explicit-key");
    }

    #[test]
    fn test_empty_api_key_rejected() {
        // not set via env in this test process
        let config = ClientConfig {
            api_key: Some(String::new()),
            ws: WsConfig::default(),
            request_timeout: Duration::from_secs(120),
        };
        if std::env::var(API_KEY_ENV).is_err() {
            assert!(matches!(config.resolve_api_key(), Err(Error::InvalidApiKey)));
        }
    }

    #[test]
    fn test_builder_style_overrides() {
        let config = ClientConfig::new("k")
            .with_url("ws://localhost:9999")
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.ws.url, "ws://localhost:9999");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
