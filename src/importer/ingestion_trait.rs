// ==========================================
// Training Ingest - importer traits
// ==========================================
// Interfaces of each pipeline stage (no implementations here).
// Pipeline: read -> normalize -> extract -> upsert
// ==========================================

use crate::domain::{
    CourseGroup, DurationIngestSummary, EnrollmentCounts, ProgramDuration, Region,
    RosterIngestSummary, SourcedRow, StatusCounts, TrainingCenter, TrainingProgram, UploadedFile,
};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::NormalizedTable;
use crate::importer::file_parser::RawTable;
use crate::importer::layout::FileLayout;
use async_trait::async_trait;

// ==========================================
// TrainingImporter
// ==========================================
// Entry points of the two upload endpoints.
// Implemented by: TrainingImporterImpl
#[async_trait]
pub trait TrainingImporter: Send + Sync {
    /// Ingests a roster export.
    ///
    /// # Returns
    /// - Ok(summary): per-entity counts, row errors and message; row and
    ///   orchestration failures are reported inside the summary
    /// - Err: the file itself could not be read (structural error)
    ///
    /// # Write order
    /// region -> center -> program -> group -> group statistics
    async fn ingest_roster(&self, upload: UploadedFile) -> ImportResult<RosterIngestSummary>;

    /// Ingests a DF-14 duration/status export.
    ///
    /// # Returns
    /// - Ok(summary): program hours updated, statistics written, row errors
    /// - Err: structural error
    async fn ingest_duration_report(
        &self,
        upload: UploadedFile,
    ) -> ImportResult<DurationIngestSummary>;
}

// ==========================================
// FileParser (stage 0)
// ==========================================
// Implemented by: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// Reads the first sheet into whitelisted string cells.
    ///
    /// # Errors
    /// - unreadable file, missing header row, whitelisted column missing
    fn parse_table(&self, bytes: &[u8], layout: &FileLayout) -> ImportResult<RawTable>;
}

// ==========================================
// FieldMapper (stage 1)
// ==========================================
// Implemented by: ColumnNormalizer
pub trait FieldMapper: Send + Sync {
    /// Renames, coerces, injects defaults and drops rows missing a
    /// required field. Never fails; invalid values become absent.
    fn normalize(&self, table: RawTable, layout: &FileLayout) -> NormalizedTable;
}

// ==========================================
// EntityExtractor (stage 2)
// ==========================================
// Implemented by: EntityExtractorImpl
pub trait EntityExtractor: Send + Sync {
    /// Distinct (code, name) pairs; rows lacking either are skipped.
    fn regions(&self, table: &NormalizedTable) -> Vec<SourcedRow<Region>>;

    /// Distinct (code, name, region) triples; rows lacking any are skipped.
    fn centers(&self, table: &NormalizedTable) -> Vec<SourcedRow<TrainingCenter>>;

    /// Distinct (code, version, name) triples with zero hours.
    fn programs(&self, table: &NormalizedTable) -> Vec<SourcedRow<TrainingProgram>>;

    /// One group per row; duplicate codes are kept (last write wins).
    fn groups(&self, table: &NormalizedTable) -> Vec<SourcedRow<CourseGroup>>;

    /// Roster demographic counts.
    ///
    /// # Returns
    /// - None: the layout carries no statistic columns
    /// - Some(rows): rows with at least one present count
    fn enrollment_counts(
        &self,
        table: &NormalizedTable,
        layout: &FileLayout,
    ) -> Option<Vec<SourcedRow<EnrollmentCounts>>>;

    /// DF-14 hours, one row per (code, version); rows without hours skipped.
    fn program_durations(&self, table: &NormalizedTable) -> Vec<SourcedRow<ProgramDuration>>;

    /// DF-14 status counts; same None/Some contract as `enrollment_counts`.
    fn status_counts(
        &self,
        table: &NormalizedTable,
        layout: &FileLayout,
    ) -> Option<Vec<SourcedRow<StatusCounts>>>;
}
