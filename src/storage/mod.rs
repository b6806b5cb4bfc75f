//! Player Storage
//!
//! This module provides the record store behind the HTTP layer:
//!
//! - **types**: Core data structures (UserRecord, Submission, PlayerCount)
//! - **store**: The in-memory map and its JSON file mirror
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use clicker_server::storage::{PlayerStore, StorageConfig, Submission};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PlayerStore::open(StorageConfig::new("./data")).await;
//!
//!     store.submit(Submission::new("player-1", 3)).await?;
//!     store.submit(Submission::new("player-2", 5)).await?;
//!
//!     let snapshot = store.aggregate().await;
//!     assert_eq!(snapshot.current, 8);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod store;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use store::{PlayerStore, StorageConfig};
pub use types::{coerce_last_updated, coerce_player_count, PlayerCount, Submission, UserRecord};
