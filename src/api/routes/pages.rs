//! Static Pages
//!
//! - GET / - Game page (`index.html`)
//! - GET /fangdootle - Alternate page (`fangdootle.html`)
//!
//! Anything else unmatched is looked up in the static directory, so the
//! pages can pull their JS and CSS by relative path.

use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Routes for the two named pages
pub fn page_routes<S>(static_dir: &Path) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service(
            "/fangdootle",
            ServeFile::new(static_dir.join("fangdootle.html")),
        )
}

/// Fallback service for assets under the static directory
pub fn asset_service(static_dir: &Path) -> ServeDir {
    ServeDir::new(static_dir)
}
