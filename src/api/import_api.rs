// ==========================================
// Training Ingest - upload endpoints
// ==========================================
// POST /files/upload-excel/       roster export
// POST /files/upload-df14-excel/  DF-14 duration/status export
// Both answer 200 with a summary, row failures included; only an
// unusable upload is an HTTP error.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::app::AppState;
use crate::domain::{DurationIngestSummary, RosterIngestSummary, UploadedFile};
use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};

/// Multipart field carrying the spreadsheet.
pub const FILE_FIELD: &str = "file";

/// Reads the `file` field; other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> ApiResult<UploadedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart inválido: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("no se pudo leer el archivo: {}", e)))?;

        tracing::info!(file_name = ?file_name, size = bytes.len(), "upload received");
        return Ok(UploadedFile::new(file_name, bytes.to_vec()));
    }

    Err(ApiError::BadRequest(format!(
        "falta el campo '{}' en el formulario",
        FILE_FIELD
    )))
}

/// POST /files/upload-excel/
pub async fn upload_roster(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<RosterIngestSummary>> {
    let upload = read_upload(multipart).await?;
    let summary = state.importer.ingest_roster(upload).await?;
    Ok(Json(summary))
}

/// POST /files/upload-df14-excel/
pub async fn upload_duration_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<DurationIngestSummary>> {
    let upload = read_upload(multipart).await?;
    let summary = state.importer.ingest_duration_report(upload).await?;
    Ok(Json(summary))
}

pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/files/upload-excel/", post(upload_roster))
        .route("/files/upload-df14-excel/", post(upload_duration_report))
}
