// ==========================================
// Training Ingest - domain layer
// ==========================================
// Entities and ingestion result types. No data access here.
// ==========================================

pub mod ingest;
pub mod training;

pub use ingest::{
    BatchOutcome, DurationIngestSummary, RosterIngestSummary, RowError, SourcedRow, UploadedFile,
    DURATION_CRITICAL_MESSAGE, DURATION_OK_MESSAGE, DURATION_PARTIAL_SUFFIX,
    ROSTER_CRITICAL_MESSAGE, ROSTER_OK_MESSAGE, ROSTER_PARTIAL_MESSAGE,
};
pub use training::{
    CourseGroup, EnrollmentCounts, GroupOption, GroupStatistics, GroupUpdate, ProgramDuration, Region,
    StatusCounts, TrainingCenter, TrainingProgram,
};
