// ==========================================
// Training Ingest - import layer
// ==========================================
// Roster and DF-14 spreadsheets -> regions, centers, programs, groups
// and group statistics.
// Supports: Excel (.xlsx/.xls/.xlsm/.ods), CSV
// ==========================================

pub mod data_cleaner;
pub mod entity_extractor;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod ingestion_trait;
pub mod layout;
pub mod training_importer_impl;
pub mod upsert_engine;

pub use data_cleaner::DataCleaner;
pub use entity_extractor::EntityExtractorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ColumnNormalizer, FieldValue, NormalizedRow, NormalizedTable};
pub use file_parser::{CsvParser, ExcelParser, RawRecord, RawTable, UniversalFileParser};
pub use layout::{FileLayout, DURATION_LAYOUT, ROSTER_LAYOUT};
pub use training_importer_impl::TrainingImporterImpl;
pub use upsert_engine::{upsert_batch, BatchAborted};

pub use ingestion_trait::{EntityExtractor, FieldMapper, FileParser, TrainingImporter};
