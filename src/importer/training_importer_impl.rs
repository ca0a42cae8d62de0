// ==========================================
// Training Ingest - ingestion orchestrator
// ==========================================
// Flow: read -> normalize -> extract -> upsert (dependency order)
// Runs on a blocking worker with its own request-scoped connection.
// Structural errors fail the request; everything after the read is
// reported inside the summary.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{BatchOutcome, DurationIngestSummary, RosterIngestSummary, UploadedFile};
use crate::importer::entity_extractor::EntityExtractorImpl;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{ColumnNormalizer, NormalizedTable};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::ingestion_trait::{EntityExtractor, FieldMapper, TrainingImporter};
use crate::importer::layout::{FileLayout, DURATION_LAYOUT, ROSTER_LAYOUT};
use crate::importer::upsert_engine::{upsert_batch, BatchAborted};
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, Span};
use uuid::Uuid;

// ==========================================
// TrainingImporterImpl
// ==========================================
#[derive(Clone)]
pub struct TrainingImporterImpl {
    db_path: String,

    // pipeline stages
    file_parser: Arc<UniversalFileParser>,
    field_mapper: Arc<dyn FieldMapper>,
    extractor: Arc<dyn EntityExtractor>,
}

impl TrainingImporterImpl {
    /// Importer with the default stages.
    ///
    /// # Parameters
    /// - db_path: SQLite file opened once per upload
    pub fn new(db_path: impl Into<String>) -> Self {
        Self::with_stages(
            db_path,
            Arc::new(ColumnNormalizer::new()),
            Arc::new(EntityExtractorImpl),
        )
    }

    pub fn with_stages(
        db_path: impl Into<String>,
        field_mapper: Arc<dyn FieldMapper>,
        extractor: Arc<dyn EntityExtractor>,
    ) -> Self {
        Self {
            db_path: db_path.into(),
            file_parser: Arc::new(UniversalFileParser),
            field_mapper,
            extractor,
        }
    }

    /// Read + normalize; errors here are structural.
    fn load(&self, upload: &UploadedFile, layout: &FileLayout) -> ImportResult<NormalizedTable> {
        let raw = self
            .file_parser
            .parse(upload.file_name.as_deref(), &upload.bytes, layout)
            .map_err(|e| {
                error!(layout = layout.name, error = %e, "spreadsheet rejected");
                e
            })?;
        info!(layout = layout.name, rows = raw.len(), "spreadsheet read");

        Ok(self.field_mapper.normalize(raw, layout))
    }

    fn open_connection(&self) -> ImportResult<Connection> {
        open_sqlite_connection(&self.db_path)
            .map_err(|e| ImportError::DatabaseConnectionError(e.to_string()))
    }

    // ==========================================
    // Roster
    // ==========================================

    /// Synchronous roster run (blocking worker body).
    pub fn run_roster(&self, upload: &UploadedFile) -> ImportResult<RosterIngestSummary> {
        let started = Instant::now();
        let table = self.load(upload, &ROSTER_LAYOUT)?;

        let mut summary = RosterIngestSummary::default();
        let written = self
            .open_connection()
            .and_then(|conn| self.write_roster(&conn, &table, &mut summary));

        match written {
            Ok(()) => summary.finish(),
            Err(e) => {
                error!(error = %e, "roster ingestion aborted");
                summary.fail(e);
            }
        }

        info!(
            regions = summary.regions_processed,
            centers = summary.centers_processed,
            programs = summary.programs_processed,
            groups = summary.groups_processed,
            statistics = summary.statistics_processed,
            errors = summary.errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "roster ingestion finished"
        );
        Ok(summary)
    }

    fn write_roster(
        &self,
        conn: &Connection,
        table: &NormalizedTable,
        summary: &mut RosterIngestSummary,
    ) -> ImportResult<()> {
        let errors = &mut summary.errors;

        let regions = upsert_batch(conn, &self.extractor.regions(table));
        record(&mut summary.regions_processed, errors, regions)?;

        let centers = upsert_batch(conn, &self.extractor.centers(table));
        record(&mut summary.centers_processed, errors, centers)?;

        let programs = upsert_batch(conn, &self.extractor.programs(table));
        record(&mut summary.programs_processed, errors, programs)?;

        let groups = upsert_batch(conn, &self.extractor.groups(table));
        record(&mut summary.groups_processed, errors, groups)?;

        match self.extractor.enrollment_counts(table, &ROSTER_LAYOUT) {
            Some(rows) => {
                let stats = upsert_batch(conn, &rows);
                record(&mut summary.statistics_processed, errors, stats)?;
            }
            None => debug!("roster carries no statistic columns"),
        }

        Ok(())
    }

    // ==========================================
    // DF-14
    // ==========================================

    /// Synchronous DF-14 run (blocking worker body).
    pub fn run_duration_report(&self, upload: &UploadedFile) -> ImportResult<DurationIngestSummary> {
        let started = Instant::now();
        let table = self.load(upload, &DURATION_LAYOUT)?;

        let mut summary = DurationIngestSummary::default();
        let written = self
            .open_connection()
            .and_then(|conn| self.write_duration_report(&conn, &table, &mut summary));

        match written {
            Ok(()) => summary.finish(),
            Err(e) => {
                error!(error = %e, "DF-14 ingestion aborted");
                summary.fail(e);
            }
        }

        info!(
            programs = summary.programs_updated,
            statistics = summary.statistics_updated,
            errors = summary.errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "DF-14 ingestion finished"
        );
        Ok(summary)
    }

    fn write_duration_report(
        &self,
        conn: &Connection,
        table: &NormalizedTable,
        summary: &mut DurationIngestSummary,
    ) -> ImportResult<()> {
        let errors = &mut summary.errors;

        let durations = upsert_batch(conn, &self.extractor.program_durations(table));
        record(&mut summary.programs_updated, errors, durations)?;

        match self.extractor.status_counts(table, &DURATION_LAYOUT) {
            Some(rows) => {
                let stats = upsert_batch(conn, &rows);
                record(&mut summary.statistics_updated, errors, stats)?;
            }
            None => debug!("DF-14 report carries no status columns"),
        }

        Ok(())
    }
}

/// Moves a batch's success count and row errors into the summary, aborted
/// batches included; the abort error is passed on.
fn record(
    count: &mut usize,
    errors: &mut Vec<String>,
    batch: Result<BatchOutcome, BatchAborted>,
) -> ImportResult<()> {
    let (outcome, aborted) = match batch {
        Ok(outcome) => (outcome, None),
        Err(BatchAborted { partial, error }) => (partial, Some(error)),
    };

    errors.extend(outcome.error_messages());
    *count = outcome.succeeded();

    match aborted {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[async_trait]
impl TrainingImporter for TrainingImporterImpl {
    #[instrument(
        skip(self, upload),
        fields(batch_id = %Uuid::new_v4(), file_name = ?upload.file_name, bytes = upload.bytes.len())
    )]
    async fn ingest_roster(&self, upload: UploadedFile) -> ImportResult<RosterIngestSummary> {
        let importer = self.clone();
        let span = Span::current();

        tokio::task::spawn_blocking(move || span.in_scope(|| importer.run_roster(&upload)))
            .await
            .map_err(|e| ImportError::InternalError(format!("tarea de ingesta interrumpida: {}", e)))?
    }

    #[instrument(
        skip(self, upload),
        fields(batch_id = %Uuid::new_v4(), file_name = ?upload.file_name, bytes = upload.bytes.len())
    )]
    async fn ingest_duration_report(
        &self,
        upload: UploadedFile,
    ) -> ImportResult<DurationIngestSummary> {
        let importer = self.clone();
        let span = Span::current();

        tokio::task::spawn_blocking(move || span.in_scope(|| importer.run_duration_report(&upload)))
            .await
            .map_err(|e| ImportError::InternalError(format!("tarea de ingesta interrumpida: {}", e)))?
    }
}
