// ==========================================
// Training Ingest - application layer
// ==========================================
// Router assembly and shared state.
// ==========================================

pub mod state;

pub use state::AppState;

use crate::api;
use axum::extract::DefaultBodyLimit;
use axum::Router;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .merge(api::import_routes())
        .merge(api::group_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
