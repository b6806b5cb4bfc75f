//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::storage::PlayerStore;
use crate::stream::{StreamConfig, StreamHub};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The only owner of user records
    pub store: Arc<PlayerStore>,
    /// Open player-count streams
    pub streams: Arc<StreamHub>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState with the default stream interval
    pub fn new(store: Arc<PlayerStore>, config: ApiConfig) -> Self {
        Self::with_stream_config(store, config, StreamConfig::default())
    }

    /// Create AppState with custom stream configuration
    pub fn with_stream_config(
        store: Arc<PlayerStore>,
        config: ApiConfig,
        stream_config: StreamConfig,
    ) -> Self {
        Self {
            store,
            streams: Arc::new(StreamHub::new(stream_config)),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get open stream count
    pub fn stream_count(&self) -> usize {
        self.streams.connection_count()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory with the prebuilt HTML/JS/CSS pages
    pub static_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("public"),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addr() {
        assert_eq!(ApiConfig::default().addr(), "0.0.0.0:3000");
        assert_eq!(ApiConfig::new("127.0.0.1", 8080).addr(), "127.0.0.1:8080");
    }
}
