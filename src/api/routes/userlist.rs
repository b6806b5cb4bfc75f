//! User List Routes
//!
//! - POST /userlist - Report a user's player count

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::SubmitResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::storage::Submission;

/// POST /userlist
///
/// Replace the caller's record. The body is schemaless apart from `userId`
/// (required string) and `playerCount` (coerced to a count).
pub async fn submit_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    let Json(body) = payload?;
    let submission = Submission::from_json(body)?;
    let user_id = submission.user_id.clone();

    let record = state.store.submit(submission).await?;

    tracing::info!(
        user_id = %user_id,
        player_count = record.player_count,
        "User data saved"
    );

    Ok(Json(SubmitResponse::saved()))
}
