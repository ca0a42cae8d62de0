// ==========================================
// Training Ingest - application state
// ==========================================
// Shared by every handler; cheap to clone.
// ==========================================

use crate::config::AppConfig;
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::{TrainingImporter, TrainingImporterImpl};
use crate::repository::{RepositoryError, RepositoryResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<AppConfig>,

    /// Roster / DF-14 ingestion
    pub importer: Arc<dyn TrainingImporter>,
}

impl AppState {
    /// Creates the state and makes sure the schema exists.
    ///
    /// # Parameters
    /// - config: resolved configuration (db path, limits)
    ///
    /// # Returns
    /// - Err: the database cannot be opened or the schema cannot be applied
    pub fn new(config: AppConfig) -> RepositoryResult<Self> {
        tracing::info!(db_path = %config.db_path, "initializing application state");

        let conn = open_sqlite_connection(&config.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        let importer = Arc::new(TrainingImporterImpl::new(config.db_path.clone()));
        Ok(Self::with_importer(config, importer))
    }

    /// State with an explicit importer (no schema setup).
    pub fn with_importer(config: AppConfig, importer: Arc<dyn TrainingImporter>) -> Self {
        Self {
            config: Arc::new(config),
            importer,
        }
    }

    pub fn db_path(&self) -> String {
        self.config.db_path.clone()
    }
}
