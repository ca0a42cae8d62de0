// ==========================================
// Training Ingest - HTTP API layer
// ==========================================
// Thin axum handlers over the importer and the group repository.
// ==========================================

pub mod error;
pub mod group_api;
pub mod health;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use group_api::group_routes;
pub use health::health_routes;
pub use import_api::import_routes;
