// ==========================================
// Training Ingest - data repositories
// ==========================================
// Data access only; no ingestion rules beyond each statement's conflict
// policy. All queries are parameterized.
// ==========================================

pub mod error;
pub mod group_repo;
pub mod training_import_repo;
pub mod update_builder;

pub use error::{RepositoryError, RepositoryResult};
pub use group_repo::GroupRepository;
pub use training_import_repo::{UpsertStatement, WriteMode};
pub use update_builder::{GroupField, UpdateBuilder};
