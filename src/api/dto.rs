//! Data Transfer Objects
//!
//! Response types for the API endpoints. Submission bodies are schemaless
//! and parsed by [`Submission::from_json`](crate::storage::Submission::from_json);
//! the aggregate snapshot is [`PlayerCount`](crate::storage::PlayerCount).

use serde::Serialize;

/// `POST /userlist` acknowledgment
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

impl SubmitResponse {
    pub fn saved() -> Self {
        Self {
            success: true,
            message: "User data saved successfully".to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, unhealthy
    pub status: String,
    /// Storage status: ok, error
    pub storage: String,
    /// Number of stored users
    pub users: usize,
    /// Open player-count streams
    pub streams: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
