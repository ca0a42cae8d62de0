// ==========================================
// Training Ingest - repository error types
// ==========================================

use thiserror::Error;

/// Repository error type
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("registro no encontrado: {entity} {id}")]
    NotFound { entity: String, id: String },

    #[error("fallo de conexión a la base de datos: {0}")]
    DatabaseConnectionError(String),

    #[error("fallo de consulta en la base de datos: {0}")]
    DatabaseQueryError(String),

    #[error("violación de restricción única: {0}")]
    UniqueConstraintViolation(String),

    #[error("violación de llave foránea: {0}")]
    ForeignKeyViolation(String),

    #[error("actualización vacía: no se enviaron campos para {0}")]
    EmptyUpdate(String),

    #[error("error interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "registro".to_string(),
                id: "desconocido".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;
