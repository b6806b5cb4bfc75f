//! Player Store
//!
//! In-memory map of `userId -> UserRecord`, mirrored to a single JSON file.
//!
//! - Write path: Submission → stamp → replace in map → rewrite file
//! - Read path: aggregate over the live map
//!
//! The file holds an array of `[userId, record]` pairs in first-submission
//! order. Thread-safe via Tokio's async RwLock.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::storage::error::StorageResult;
use crate::storage::types::{PlayerCount, Submission, UserRecord};

/// Configuration for the player store
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the user list file
    pub data_dir: PathBuf,
    /// Name of the user list file inside `data_dir`
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file_name: "userlist.json".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Get path to the user list file
    pub fn file_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

type RecordMap = IndexMap<String, UserRecord>;

/// The single owner of all user records
pub struct PlayerStore {
    config: StorageConfig,
    records: RwLock<RecordMap>,
}

impl PlayerStore {
    /// Create an empty store. Nothing is read from disk until [`load`](Self::load).
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            records: RwLock::new(IndexMap::new()),
        }
    }

    /// Create the data directory and load any prior state.
    ///
    /// Neither step is fatal: failures are logged and the store starts empty.
    pub async fn open(config: StorageConfig) -> Self {
        let store = Self::new(config);

        if let Err(e) = store.ensure_data_dir().await {
            tracing::error!(
                path = ?store.config.data_dir,
                error = %e,
                "Failed to create data directory"
            );
        }

        store.load().await;
        store
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Path of the backing file
    pub fn path(&self) -> PathBuf {
        self.config.file_path()
    }

    /// Create the data directory if it does not exist (idempotent)
    pub async fn ensure_data_dir(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.config.data_dir).await?;
        Ok(())
    }

    /// Replace the in-memory map with the file contents.
    ///
    /// A missing or unparsable file leaves the map empty. Returns the number
    /// of records loaded.
    pub async fn load(&self) -> usize {
        let path = self.path();

        let loaded = match tokio::fs::read(&path).await {
            Ok(bytes) => match decode(&bytes) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Failed to parse user list, starting empty");
                    IndexMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = ?path, "No existing user list, starting empty");
                IndexMap::new()
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to read user list, starting empty");
                IndexMap::new()
            }
        };

        let count = loaded.len();
        *self.records.write().await = loaded;

        if count > 0 {
            tracing::info!(records = count, path = ?path, "Loaded user list");
        }
        count
    }

    /// Overwrite the file with the full current map
    pub async fn save(&self) -> StorageResult<()> {
        let records = self.records.read().await;
        write_file(&self.path(), &records).await
    }

    /// Replace the record for `submission.user_id` and persist.
    ///
    /// The write lock is held across the file write, so concurrent
    /// submissions persist one at a time. If the write fails the in-memory
    /// record is kept and the error is returned.
    pub async fn submit(&self, submission: Submission) -> StorageResult<UserRecord> {
        let user_id = submission.user_id.clone();
        let record = UserRecord::from_submission(submission);

        let mut records = self.records.write().await;
        records.insert(user_id.clone(), record.clone());

        write_file(&self.path(), &records).await?;

        tracing::debug!(
            user_id = %user_id,
            player_count = record.player_count,
            records = records.len(),
            "Stored user record"
        );

        Ok(record)
    }

    /// Sum of all player counts
    pub async fn aggregate(&self) -> PlayerCount {
        let records = self.records.read().await;
        let sum = records
            .values()
            .fold(0u64, |acc, r| acc.saturating_add(r.player_count));
        PlayerCount::from_sum(sum)
    }

    /// Get the record for a user
    pub async fn get(&self, user_id: &str) -> Option<UserRecord> {
        let records = self.records.read().await;
        records.get(user_id).cloned()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

async fn write_file(path: &Path, records: &RecordMap) -> StorageResult<()> {
    let bytes = encode(records)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

fn encode(records: &RecordMap) -> StorageResult<Vec<u8>> {
    let pairs: Vec<(&String, &UserRecord)> = records.iter().collect();
    Ok(serde_json::to_vec_pretty(&pairs)?)
}

/// Later duplicates of an id win, at the position of the first.
///
/// Only a file that is not a JSON array fails as a whole; a malformed pair
/// is skipped so the rest of the list survives the next rewrite.
fn decode(bytes: &[u8]) -> StorageResult<RecordMap> {
    let entries: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;
    let mut records = RecordMap::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<(String, UserRecord)>(entry) {
            Ok((user_id, record)) => {
                records.insert(user_id, record);
            }
            Err(e) => tracing::warn!(index, error = %e, "Skipping malformed user list entry"),
        }
    }

    Ok(records)
}
