// ==========================================
// Training Ingest - core library
// ==========================================
// Roster and DF-14 spreadsheet ingestion into the training-program
// store (regions, centers, programs, groups, group statistics).
// Stack: axum + tokio + rusqlite + calamine
// ==========================================

// domain model
pub mod domain;

// data access
pub mod repository;

// spreadsheet ingestion
pub mod importer;

// runtime configuration
pub mod config;

// SQLite connection setup and schema
pub mod db;

pub mod logging;

// HTTP handlers
pub mod api;

// router and shared state
pub mod app;

pub use domain::{
    CourseGroup, DurationIngestSummary, GroupStatistics, GroupUpdate, Region,
    RosterIngestSummary, TrainingCenter, TrainingProgram, UploadedFile,
};
pub use importer::{TrainingImporter, TrainingImporterImpl};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "training-ingest";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
