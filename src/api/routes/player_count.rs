//! Player Count Routes
//!
//! - GET /player-count - Aggregate snapshot
//! - GET /player-count-stream - Aggregate snapshots as server-sent events

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    Json,
};
use futures_util::{Stream, StreamExt};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::storage::PlayerCount;

/// GET /player-count
pub async fn get_player_count(State(state): State<Arc<AppState>>) -> Json<PlayerCount> {
    Json(state.store.aggregate().await)
}

/// GET /player-count-stream
///
/// One `data: {"current":n,"total":n}` event on connect, then one per
/// stream interval. The feed's ticker is aborted when the client disconnects
/// and the response body is dropped.
pub async fn player_count_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let feed = state.streams.subscribe(Arc::clone(&state.store)).await;
    Sse::new(feed.map(|snapshot| Event::default().json_data(snapshot)))
}
