//! Clicker HTTP API
//!
//! HTTP layer for the player-count server, built with Axum.
//!
//! # Endpoints
//!
//! ## Players
//! - `POST /userlist` - Report a user's player count
//! - `GET /player-count` - Aggregate snapshot
//! - `GET /player-count-stream` - Aggregate snapshots as server-sent events
//!
//! ## Pages
//! - `GET /` - Game page
//! - `GET /fangdootle` - Alternate page
//! - anything else - files from the static directory
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use clicker_server::api::{serve, ApiConfig, AppState};
//! use clicker_server::storage::{PlayerStore, StorageConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(PlayerStore::open(StorageConfig::default()).await);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::stream::StreamHub;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let player_routes = Router::new()
        .route("/userlist", post(routes::userlist::submit_user))
        .route("/player-count", get(routes::player_count::get_player_count))
        .route(
            "/player-count-stream",
            get(routes::player_count::player_count_stream),
        );

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .merge(player_routes)
        .merge(routes::pages::page_routes(&static_dir))
        .nest("/health", health_routes)
        .fallback_service(routes::pages::asset_service(&static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let streams = Arc::clone(&state.streams);
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Clicker server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(streams))
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Clicker server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal, then end open streams so connections can drain
async fn shutdown_signal(streams: Arc<StreamHub>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
    streams.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{PlayerStore, StorageConfig};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    async fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let router = create_app_with_data_dir(dir.path().join("data"), &dir).await;
        (router, dir)
    }

    async fn create_app_with_data_dir(data_dir: PathBuf, dir: &tempfile::TempDir) -> Router {
        let store = Arc::new(PlayerStore::open(StorageConfig::new(data_dir)).await);
        let api_config = ApiConfig {
            static_dir: dir.path().join("public"),
            ..Default::default()
        };

        build_router(AppState::new(store, api_config))
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _dir) = create_test_app().await;

        let response = get(app, "/health/live").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let (app, _dir) = create_test_app().await;

        let response = get(app, "/health/ready").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_not_ready_without_data_dir() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let app = create_app_with_data_dir(blocker, &dir).await;

        let response = get(app.clone(), "/health/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = json_body(get(app, "/health").await).await;
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["storage"], "error");
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, _dir) = create_test_app().await;

        let response = get(app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"], "ok");
        assert_eq!(body["users"], 0);
        assert_eq!(body["streams"], 0);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["uptime_seconds"].is_u64());
    }

    #[tokio::test]
    async fn test_submit_invalid_json() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/userlist")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].is_string());
    }
}
