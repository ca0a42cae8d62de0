// ==========================================
// Training Ingest - ingestion domain model
// ==========================================
// Upload payloads, per-batch outcomes and the response summaries of the
// two upload endpoints.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// UploadedFile - one uploaded spreadsheet
// ==========================================
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>, // client-supplied name, used to pick the reader
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: Option<String>, bytes: Vec<u8>) -> Self {
        Self { file_name, bytes }
    }
}

// ==========================================
// SourcedRow - projected record + source row number
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedRow<T> {
    pub row_number: usize, // 1-based spreadsheet row
    pub record: T,
}

impl<T> SourcedRow<T> {
    pub fn new(row_number: usize, record: T) -> Self {
        Self { row_number, record }
    }
}

// ==========================================
// RowError - one failed row write
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub entity: String,      // user-facing entity label
    pub natural_key: String, // e.g. "221101/2"
    pub row_number: usize,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error procesando {} {} (fila {}): {}",
            self.entity, self.natural_key, self.row_number, self.message
        )
    }
}

// ==========================================
// BatchOutcome - result of one upsert batch
// ==========================================
// inserted/updated classification is best effort; `succeeded()` is exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unmatched: usize, // update-only rows whose key does not exist
    pub errors: Vec<RowError>,
}

impl BatchOutcome {
    /// Rows written without error (inserted + updated).
    pub fn succeeded(&self) -> usize {
        self.inserted + self.updated
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

// ==========================================
// RosterIngestSummary - roster upload response
// ==========================================
pub const ROSTER_OK_MESSAGE: &str = "Carga completada exitosamente";
pub const ROSTER_PARTIAL_MESSAGE: &str = "Carga completada con errores";
pub const ROSTER_CRITICAL_MESSAGE: &str = "Error crítico en el procesamiento";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterIngestSummary {
    #[serde(rename = "regionales_procesadas")]
    pub regions_processed: usize,
    #[serde(rename = "centros_procesados")]
    pub centers_processed: usize,
    #[serde(rename = "programas_procesados")]
    pub programs_processed: usize,
    #[serde(rename = "grupos_procesados")]
    pub groups_processed: usize,
    #[serde(rename = "datos_grupo_procesados")]
    pub statistics_processed: usize,
    #[serde(rename = "errores")]
    pub errors: Vec<String>,
    #[serde(rename = "mensaje")]
    pub message: String,
}

impl RosterIngestSummary {
    /// Appends the orchestration-level failure and marks the run critical.
    pub fn fail(&mut self, cause: impl fmt::Display) {
        self.errors
            .push(format!("Error general en el procesamiento: {}", cause));
        self.message = ROSTER_CRITICAL_MESSAGE.to_string();
    }

    pub fn finish(&mut self) {
        self.message = if self.errors.is_empty() {
            ROSTER_OK_MESSAGE.to_string()
        } else {
            ROSTER_PARTIAL_MESSAGE.to_string()
        };
    }
}

// ==========================================
// DurationIngestSummary - DF-14 upload response
// ==========================================
pub const DURATION_OK_MESSAGE: &str = "Archivo DF-14 procesado y datos actualizados correctamente";
pub const DURATION_PARTIAL_SUFFIX: &str = " (con algunos errores)";
pub const DURATION_CRITICAL_MESSAGE: &str = "Error crítico procesando archivo DF-14";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationIngestSummary {
    #[serde(rename = "programas_actualizados")]
    pub programs_updated: usize,
    #[serde(rename = "datos_grupo_actualizados")]
    pub statistics_updated: usize,
    #[serde(rename = "errores")]
    pub errors: Vec<String>,
    #[serde(rename = "mensaje")]
    pub message: String,
}

impl DurationIngestSummary {
    pub fn fail(&mut self, cause: impl fmt::Display) {
        self.errors
            .push(format!("Error general procesando DF-14: {}", cause));
        self.message = DURATION_CRITICAL_MESSAGE.to_string();
    }

    pub fn finish(&mut self) {
        self.message = if self.errors.is_empty() {
            DURATION_OK_MESSAGE.to_string()
        } else {
            format!("{}{}", DURATION_OK_MESSAGE, DURATION_PARTIAL_SUFFIX)
        };
    }
}
