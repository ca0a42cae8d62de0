// ==========================================
// Training Ingest - spreadsheet readers
// ==========================================
// Stage 0: bytes -> whitelisted string cells.
// Excel (.xlsx/.xls/.xlsm/.ods) via calamine, CSV via csv.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::ingestion_trait::FileParser;
use crate::importer::layout::FileLayout;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;

// ==========================================
// RawTable - whitelisted, string-typed rows
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub row_number: usize,              // 1-based spreadsheet row
    pub values: HashMap<String, String>, // whitelisted header -> non-empty cell
}

impl RawRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>, // whitelist order
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Builds the table from absolute-indexed rows (row 0 = first sheet row).
///
/// The header is the first row at or after `header_skip_rows`. Every
/// whitelisted column must be present in it.
fn build_table<I>(rows: I, layout: &FileLayout) -> ImportResult<RawTable>
where
    I: IntoIterator<Item = (usize, Vec<String>)>,
{
    let mut rows = rows
        .into_iter()
        .filter(|(index, _)| *index >= layout.header_skip_rows);

    let (header_index, header) = rows.next().ok_or(ImportError::HeaderRowMissing {
        skipped: layout.header_skip_rows,
    })?;

    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    // whitelist -> column position
    let mut positions = Vec::with_capacity(layout.columns.len());
    let mut missing = Vec::new();
    for source in layout.source_columns() {
        match header.iter().position(|h| h == source) {
            Some(pos) => positions.push((source, pos)),
            None => missing.push(source.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for (index, cells) in rows {
        let mut values = HashMap::new();
        for (source, pos) in &positions {
            if let Some(cell) = cells.get(*pos) {
                let trimmed = cell.trim();
                if !trimmed.is_empty() {
                    values.insert(source.to_string(), trimmed.to_string());
                }
            }
        }

        // skip fully blank rows
        if values.is_empty() {
            continue;
        }

        records.push(RawRecord {
            row_number: index + 1,
            values,
        });
    }

    tracing::debug!(
        layout = layout.name,
        header_row = header_index + 1,
        rows = records.len(),
        "spreadsheet rows read"
    );

    Ok(RawTable {
        columns: layout.source_columns().map(str::to_string).collect(),
        records,
    })
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_table(&self, bytes: &[u8], layout: &FileLayout) -> ImportResult<RawTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // preamble rows are shorter than data rows
            .from_reader(bytes);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let index = record
                .position()
                .map(|p| p.line().saturating_sub(1) as usize)
                .unwrap_or(rows.len());
            rows.push((index, record.iter().map(str::to_string).collect()));
        }

        build_table(rows, layout)
    }
}

// ==========================================
// Excel Parser
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    /// Renders one cell the way the normalizer expects it.
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            Data::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{}", *f as i64)
                } else {
                    f.to_string()
                }
            }
            Data::Int(i) => i.to_string(),
            Data::Bool(b) => b.to_string(),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
                    ndt.date().format("%Y-%m-%d").to_string()
                }
                Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => dt.as_f64().to_string(),
            },
            Data::Error(_) => String::new(),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_table(&self, bytes: &[u8], layout: &FileLayout) -> ImportResult<RawTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // first sheet only
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ImportError::EmptyWorkbook)?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // the range starts at the first used cell, not necessarily A1
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let rows = range.rows().enumerate().map(|(offset, row)| {
            let mut cells = vec![String::new(); start_col as usize];
            cells.extend(row.iter().map(Self::cell_to_string));
            (start_row as usize + offset, cells)
        });

        build_table(rows, layout)
    }
}

// ==========================================
// Universal parser (container format from the file name)
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    fn extension(file_name: Option<&str>) -> String {
        file_name
            .and_then(|n| std::path::Path::new(n).extension())
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }

    pub fn parse(
        &self,
        file_name: Option<&str>,
        bytes: &[u8],
        layout: &FileLayout,
    ) -> ImportResult<RawTable> {
        let parser: &dyn FileParser = match Self::extension(file_name).as_str() {
            "csv" => &CsvParser,
            // uploads without a name are treated as Excel exports
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" | "" => &ExcelParser,
            other => return Err(ImportError::UnsupportedFormat(other.to_string())),
        };

        if bytes.is_empty() {
            return Err(ImportError::FileReadError("el archivo está vacío".to_string()));
        }

        parser.parse_table(bytes, layout)
    }
}
