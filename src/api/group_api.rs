// ==========================================
// Training Ingest - group endpoints
// ==========================================
// GET /grupos/search?search=&limit=   (select / autocomplete)
// GET /grupos/:cod_ficha
// GET /grupos/centro/:cod_centro
// PUT /grupos/:cod_ficha   (start_time, end_time, classroom_id)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::app::AppState;
use crate::domain::{CourseGroup, GroupOption, GroupUpdate};
use crate::repository::{GroupRepository, RepositoryResult};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Runs a repository call on a blocking worker with its own connection.
async fn with_repository<T, F>(db_path: String, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&GroupRepository) -> RepositoryResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let repo = GroupRepository::open(&db_path)?;
        op(&repo)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(ApiError::from)
}

#[derive(Debug, Deserialize)]
pub struct GroupSearchParams {
    #[serde(default)]
    pub search: String, // group code prefix or program name fragment
    pub limit: Option<u32>,
}

pub async fn search_groups(
    State(state): State<AppState>,
    Query(params): Query<GroupSearchParams>,
) -> ApiResult<Json<Vec<GroupOption>>> {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit debe estar entre 1 y {}",
            MAX_SEARCH_LIMIT
        )));
    }

    let options = with_repository(state.db_path(), move |repo| {
        repo.search_groups(&params.search, limit)
    })
    .await?;
    Ok(Json(options))
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(group_code): Path<i64>,
) -> ApiResult<Json<CourseGroup>> {
    with_repository(state.db_path(), move |repo| repo.find_group(group_code))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("grupo {}", group_code)))
}

pub async fn list_center_groups(
    State(state): State<AppState>,
    Path(center_code): Path<i64>,
) -> ApiResult<Json<Vec<CourseGroup>>> {
    let groups = with_repository(state.db_path(), move |repo| {
        repo.list_groups_by_center(center_code)
    })
    .await?;
    Ok(Json(groups))
}

pub async fn update_group(
    State(state): State<AppState>,
    Path(group_code): Path<i64>,
    Json(update): Json<GroupUpdate>,
) -> ApiResult<Json<CourseGroup>> {
    let group = with_repository(state.db_path(), move |repo| {
        repo.update_group(group_code, &update)
    })
    .await?;

    tracing::info!(group_code, "group schedule updated");
    Ok(Json(group))
}

pub fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/grupos/search", get(search_groups))
        .route("/grupos/:cod_ficha", get(get_group).put(update_group))
        .route("/grupos/centro/:cod_centro", get(list_center_groups))
}
