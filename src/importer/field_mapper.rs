// ==========================================
// Training Ingest - column normalization
// ==========================================
// Stage 1: whitelisted source headers -> internal fields.
// Coercion per FieldKind, time defaults, required-field filter.
// Invalid values become absent; they never raise.
// ==========================================

use crate::importer::data_cleaner::DataCleaner;
use crate::importer::file_parser::RawTable;
use crate::importer::ingestion_trait::FieldMapper;
use crate::importer::layout::{FieldKind, FileLayout};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;

/// Typed cell after coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Time(NaiveTime),
}

/// One normalized row keyed by internal field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRow {
    pub row_number: usize,
    pub values: HashMap<&'static str, FieldValue>,
}

impl NormalizedRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, field: &'static str, value: FieldValue) -> Self {
        self.values.insert(field, value);
        self
    }

    pub fn has(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.values.get(field) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        match self.values.get(field) {
            Some(FieldValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.values.get(field) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn time(&self, field: &str) -> Option<NaiveTime> {
        match self.values.get(field) {
            Some(FieldValue::Time(t)) => Some(*t),
            _ => None,
        }
    }
}

/// Stage-1 output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTable {
    pub rows: Vec<NormalizedRow>,
    pub dropped_rows: Vec<usize>, // source row numbers removed by the required filter
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// ColumnNormalizer
// ==========================================
pub struct ColumnNormalizer {
    cleaner: DataCleaner,
}

impl ColumnNormalizer {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    fn coerce(&self, raw: &str, kind: FieldKind) -> Option<FieldValue> {
        match kind {
            FieldKind::Text => self
                .cleaner
                .normalize_null(Some(raw))
                .map(FieldValue::Text),
            FieldKind::Integer => self
                .cleaner
                .parse_integer_lenient(raw)
                .map(FieldValue::Integer),
            FieldKind::Date => self.cleaner.parse_date_lenient(raw).map(FieldValue::Date),
        }
    }
}

impl Default for ColumnNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapper for ColumnNormalizer {
    fn normalize(&self, table: RawTable, layout: &FileLayout) -> NormalizedTable {
        let mut normalized = NormalizedTable::default();

        for record in table.records {
            let mut row = NormalizedRow::new(record.row_number);

            for spec in layout.columns {
                if let Some(value) = record.get(spec.source).and_then(|raw| self.coerce(raw, spec.kind)) {
                    row.values.insert(spec.field, value);
                }
            }

            for field in layout.time_defaults {
                row.values
                    .entry(*field)
                    .or_insert(FieldValue::Time(FileLayout::default_time()));
            }

            // dates are coerced before this check, so an unparsable
            // required date drops the row
            let missing: Vec<&str> = layout
                .required
                .iter()
                .copied()
                .filter(|f| !row.has(f))
                .collect();

            if missing.is_empty() {
                normalized.rows.push(row);
            } else {
                tracing::debug!(
                    layout = layout.name,
                    row = record.row_number,
                    missing = ?missing,
                    "row dropped: required field absent"
                );
                normalized.dropped_rows.push(record.row_number);
            }
        }

        tracing::info!(
            layout = layout.name,
            kept = normalized.rows.len(),
            dropped = normalized.dropped_rows.len(),
            "rows normalized"
        );

        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::file_parser::RawRecord;
    use crate::importer::layout::{fields, DURATION_LAYOUT, ROSTER_LAYOUT};

    fn raw(row_number: usize, cells: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            row_number,
            values: cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn roster_record(row_number: usize, start_date: &str) -> RawRecord {
        raw(
            row_number,
            &[
                ("IDENTIFICADOR_FICHA", "1000123"),
                ("CODIGO_CENTRO", "9121"),
                ("CODIGO_PROGRAMA", "221101"),
                ("VERSION_PROGRAMA", "2.0"),
                ("NOMBRE_PROGRAMA_FORMACION", "ADSO"),
                ("FECHA_INICIO_FICHA", start_date),
                ("FECHA_TERMINACION_FICHA", "2025-06-30"),
                ("ETAPA_FICHA", "LECTIVA"),
                ("NOMBRE_RESPONSABLE", "ANA PEREZ"),
                ("NOMBRE_MUNICIPIO_CURSO", "MEDELLIN"),
                ("TOTAL_APRENDICES", "30"),
                ("TOTAL_APRENDICES_ACTIVOS", "abc"),
            ],
        )
    }

    #[test]
    fn test_normalize_roster_row() {
        let table = RawTable {
            columns: vec![],
            records: vec![roster_record(6, "2024-01-15")],
        };

        let result = ColumnNormalizer::new().normalize(table, &ROSTER_LAYOUT);

        assert_eq!(result.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.row_number, 6);
        assert_eq!(row.int(fields::GROUP_CODE), Some(1000123));
        assert_eq!(row.int(fields::VERSION), Some(2));
        assert_eq!(
            row.date(fields::START_DATE),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(row.time(fields::START_TIME), Some(NaiveTime::MIN));
        assert_eq!(row.time(fields::END_TIME), Some(NaiveTime::MIN));
        assert_eq!(row.int(fields::TOTAL_COUNT), Some(30));
        // invalid optional value -> absent
        assert_eq!(row.int(fields::ACTIVE_TOTAL_COUNT), None);
        assert_eq!(row.text(fields::MODALITY), None);
    }

    #[test]
    fn test_unparsable_required_date_drops_row() {
        let table = RawTable {
            columns: vec![],
            records: vec![roster_record(6, "no es fecha"), roster_record(7, "15/01/2024")],
        };

        let result = ColumnNormalizer::new().normalize(table, &ROSTER_LAYOUT);

        assert_eq!(result.len(), 1);
        assert_eq!(result.rows[0].row_number, 7);
        assert_eq!(result.dropped_rows, vec![6]);
    }

    #[test]
    fn test_duration_row_without_key_is_dropped() {
        let table = RawTable {
            columns: vec![],
            records: vec![
                raw(6, &[("FICHA", "1"), ("CODIGO_PROGRAMA", "221101"), ("VERSION_PROGRAMA", "2")]),
                raw(7, &[("FICHA", "2"), ("CODIGO_PROGRAMA", "x"), ("VERSION_PROGRAMA", "2")]),
            ],
        };

        let result = ColumnNormalizer::new().normalize(table, &DURATION_LAYOUT);

        assert_eq!(result.len(), 1);
        assert_eq!(result.dropped_rows, vec![7]);
        // no time defaults for DF-14
        assert!(!result.rows[0].has(fields::START_TIME));
    }
}
