// ==========================================
// Test helpers
// ==========================================
// Temporary databases and spreadsheet fixtures (CSV, same layout as
// the Excel exports: 4 preamble rows, header, data).
// ==========================================

#![allow(dead_code)]

use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use tempfile::NamedTempFile;
use training_ingest::db::{configure_sqlite_connection, init_schema};
use training_ingest::importer::{FileLayout, DURATION_LAYOUT, ROSTER_LAYOUT};
use training_ingest::UploadedFile;

/// Creates a temporary database with the schema applied.
///
/// # Returns
/// - NamedTempFile: keep it alive for the duration of the test
/// - String: database path
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

pub fn open(db_path: &str) -> Connection {
    let conn = Connection::open(db_path).unwrap();
    configure_sqlite_connection(&conn).unwrap();
    conn
}

pub fn count(db_path: &str, table: &str) -> i64 {
    open(db_path)
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}

/// One spreadsheet row: source header -> cell text.
pub type Row = HashMap<&'static str, String>;

/// Roster row of the reference scenario: group 1000123, center 9121,
/// program 221101 v2, region 51.
pub fn roster_row() -> Row {
    [
        ("IDENTIFICADOR_FICHA", "1000123"),
        ("CODIGO_CENTRO", "9121"),
        ("CODIGO_PROGRAMA", "221101"),
        ("VERSION_PROGRAMA", "2"),
        ("NOMBRE_PROGRAMA_FORMACION", "ANALISIS Y DESARROLLO DE SOFTWARE"),
        ("ESTADO_CURSO", "EN EJECUCION"),
        ("NIVEL_FORMACION", "TECNOLOGO"),
        ("NOMBRE_JORNADA", "DIURNA"),
        ("FECHA_INICIO_FICHA", "2024-01-15"),
        ("FECHA_TERMINACION_FICHA", "2025-06-30"),
        ("ETAPA_FICHA", "LECTIVA"),
        ("MODALIDAD_FORMACION", "PRESENCIAL"),
        ("NOMBRE_RESPONSABLE", "ANA PEREZ"),
        ("NOMBRE_EMPRESA", ""),
        ("NOMBRE_MUNICIPIO_CURSO", "MEDELLIN"),
        ("NOMBRE_PROGRAMA_ESPECIAL", ""),
        ("CODIGO_REGIONAL", "51"),
        ("NOMBRE_REGIONAL", "ANTIOQUIA"),
        ("NOMBRE_CENTRO", "CENTRO DE SERVICIOS Y GESTION EMPRESARIAL"),
        ("TOTAL_APRENDICES_MASCULINOS", "18"),
        ("TOTAL_APRENDICES_FEMENINOS", "12"),
        ("TOTAL_APRENDICES_NOBINARIO", "0"),
        ("TOTAL_APRENDICES", "30"),
        ("TOTAL_APRENDICES_ACTIVOS", "28"),
    ]
    .into_iter()
    .map(|(k, v)| (k, v.to_string()))
    .collect()
}

/// DF-14 row for the reference program.
pub fn duration_row() -> Row {
    let mut row: Row = [
        ("FICHA", "1000123"),
        ("CODIGO_PROGRAMA", "221101"),
        ("VERSION_PROGRAMA", "2"),
        ("DURACION_ETAPA_LECTIVA", "880"),
        ("DURACION_ETAPA_PRODUCTIVA", "440"),
    ]
    .into_iter()
    .map(|(k, v)| (k, v.to_string()))
    .collect();

    for header in DURATION_LAYOUT.source_columns().skip(5) {
        row.insert(header, String::new());
    }
    row.insert("CUPO", "30".to_string());
    row.insert("FORMACION", "25".to_string());
    row
}

/// Sets `header` to `value` and returns the row.
pub fn with(mut row: Row, header: &'static str, value: &str) -> Row {
    row.insert(header, value.to_string());
    row
}

/// Renders rows under the layout header, after 4 preamble lines.
pub fn spreadsheet_csv(layout: &FileLayout, rows: &[Row]) -> Vec<u8> {
    let headers: Vec<&str> = layout.source_columns().collect();
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());

    writer.write_record(["REPORTE DE FICHAS"]).unwrap();
    writer.write_record(["Generado: 2024-02-01"]).unwrap();
    writer.write_record(["Regional: TODAS"]).unwrap();
    writer.write_record(["Centro: TODOS"]).unwrap();
    writer.write_record(&headers).unwrap();

    for row in rows {
        let cells: Vec<&str> = headers
            .iter()
            .map(|h| row.get(*h).map(|s| s.as_str()).unwrap_or(""))
            .collect();
        writer.write_record(&cells).unwrap();
    }

    writer.into_inner().unwrap()
}

pub fn roster_upload(rows: &[Row]) -> UploadedFile {
    UploadedFile::new(
        Some("reporte_fichas.csv".to_string()),
        spreadsheet_csv(&ROSTER_LAYOUT, rows),
    )
}

pub fn duration_upload(rows: &[Row]) -> UploadedFile {
    UploadedFile::new(
        Some("df14.csv".to_string()),
        spreadsheet_csv(&DURATION_LAYOUT, rows),
    )
}
