// ==========================================
// Training Ingest - API error types
// ==========================================
// Maps importer and repository errors to HTTP responses:
// {"error": {"code": ..., "message": ...}}
// Row-level ingestion failures never reach this type.
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 400: malformed request (no file field, unsupported extension)
    #[error("solicitud inválida: {0}")]
    BadRequest(String),

    /// 422: the file was received but its layout is unusable
    #[error("archivo no procesable: {0}")]
    Unprocessable(String),

    /// 404
    #[error("recurso no encontrado: {0}")]
    NotFound(String),

    /// 409: constraint violation on a direct update
    #[error("conflicto: {0}")]
    Conflict(String),

    #[error("error de base de datos: {0}")]
    DatabaseError(String),

    #[error("error interno: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE_FILE"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ApiError::Internal(_) | ApiError::Other(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnsupportedFormat(_) | ImportError::FileReadError(_) => {
                ApiError::BadRequest(err.to_string())
            }
            e if e.is_structural() => ApiError::Unprocessable(e.to_string()),
            ImportError::DatabaseConnectionError(msg) | ImportError::DatabaseQueryError(msg) => {
                ApiError::DatabaseError(msg)
            }
            ImportError::Other(e) => ApiError::Other(e),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } | RepositoryError::EmptyUpdate(_) => {
                ApiError::NotFound(err.to_string())
            }
            RepositoryError::UniqueConstraintViolation(_)
            | RepositoryError::ForeignKeyViolation(_) => ApiError::Conflict(err.to_string()),
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
            RepositoryError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_mapping() {
        let err = ApiError::from(ImportError::MissingColumns(vec!["FICHA".to_string()]));
        assert_eq!(err.parts().0, StatusCode::UNPROCESSABLE_ENTITY);

        let err = ApiError::from(ImportError::UnsupportedFormat("pdf".to_string()));
        assert_eq!(err.parts().0, StatusCode::BAD_REQUEST);

        let err = ApiError::from(ImportError::DatabaseConnectionError("x".to_string()));
        assert_eq!(err.parts().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_repository_error_mapping() {
        let err = ApiError::from(RepositoryError::EmptyUpdate("grupo 1".to_string()));
        assert_eq!(err.parts().0, StatusCode::NOT_FOUND);

        let err = ApiError::from(RepositoryError::ForeignKeyViolation("fk".to_string()));
        assert_eq!(err.parts().0, StatusCode::CONFLICT);
    }
}
