//! # Clicker Server
//!
//! Player-count backend for a browser clicker game.
//!
//! ## Features
//!
//! - **Store**: last report per user, mirrored to a JSON file on every write
//! - **Aggregate**: live sum of all player counts, polled or streamed
//! - **Stream**: server-sent events with one cancellable ticker per client
//! - **Pages**: serves the prebuilt game pages
//!
//! ## Modules
//!
//! - [`storage`]: User records and the JSON-backed store
//! - [`stream`]: Per-connection aggregate feeds
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clicker_server::api::{serve, ApiConfig, AppState};
//! use clicker_server::storage::{PlayerStore, StorageConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(PlayerStore::open(StorageConfig::new("./data")).await);
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(store, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod storage;
pub mod stream;

// Re-export top-level types for convenience
pub use storage::{
    PlayerCount, PlayerStore, StorageConfig, StorageError, StorageResult, Submission, UserRecord,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use stream::{AggregateFeed, StreamConfig, StreamHub};

pub use config::{
    ApiConfig as ConfigApiConfig, Config, ConfigError, LoggingConfig,
    StorageConfig as ConfigStorageConfig,
};
