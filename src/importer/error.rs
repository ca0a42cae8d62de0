// ==========================================
// Training Ingest - importer error types
// ==========================================
// Structural errors (unreadable file, missing columns) abort the whole
// upload. Row-level write failures never use this type; they are
// collected as `RowError` data instead.
// ==========================================

use thiserror::Error;

/// Importer error type
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== file errors =====
    #[error("formato de archivo no soportado: {0} (solo .xlsx/.xls/.xlsm/.ods/.csv)")]
    UnsupportedFormat(String),

    #[error("fallo al leer el archivo: {0}")]
    FileReadError(String),

    #[error("fallo al interpretar el libro Excel: {0}")]
    ExcelParseError(String),

    #[error("fallo al interpretar el CSV: {0}")]
    CsvParseError(String),

    #[error("el libro no contiene hojas")]
    EmptyWorkbook,

    #[error("no se encontró la fila de encabezados (se omitieron {skipped} filas)")]
    HeaderRowMissing { skipped: usize },

    #[error("columnas requeridas ausentes en el archivo: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    // ===== database errors =====
    #[error("fallo de conexión a la base de datos: {0}")]
    DatabaseConnectionError(String),

    #[error("fallo de consulta en la base de datos: {0}")]
    DatabaseQueryError(String),

    // ===== generic =====
    #[error("error interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// Errors raised while reading the upload itself (fatal for the request).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ImportError::UnsupportedFormat(_)
                | ImportError::FileReadError(_)
                | ImportError::ExcelParseError(_)
                | ImportError::CsvParseError(_)
                | ImportError::EmptyWorkbook
                | ImportError::HeaderRowMissing { .. }
                | ImportError::MissingColumns(_)
        )
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => ImportError::DatabaseQueryError(msg),
            _ => ImportError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result alias
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_every_column() {
        let err = ImportError::MissingColumns(vec!["FICHA".to_string(), "CUPO".to_string()]);
        assert!(err.to_string().contains("FICHA, CUPO"));
        assert!(err.is_structural());
    }

    #[test]
    fn test_database_errors_are_not_structural() {
        let err = ImportError::DatabaseConnectionError("locked".to_string());
        assert!(!err.is_structural());
    }
}
