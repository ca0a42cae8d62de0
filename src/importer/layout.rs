// ==========================================
// Training Ingest - fixed file layouts
// ==========================================
// One layout per file type: header offset, column whitelist, source ->
// internal field renames, coercion kind, required fields and time
// defaults. Layouts are fixed; nothing here is inferred from the file.
// ==========================================

use chrono::NaiveTime;

/// Internal field names shared by both layouts.
pub mod fields {
    pub const GROUP_CODE: &str = "group_code";
    pub const CENTER_CODE: &str = "center_code";
    pub const PROGRAM_CODE: &str = "program_code";
    pub const VERSION: &str = "version";
    pub const PROGRAM_NAME: &str = "program_name";
    pub const STATUS: &str = "status";
    pub const LEVEL_NAME: &str = "level_name";
    pub const SHIFT: &str = "shift";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const STAGE: &str = "stage";
    pub const MODALITY: &str = "modality";
    pub const RESPONSIBLE_PERSON: &str = "responsible_person";
    pub const COMPANY_NAME: &str = "company_name";
    pub const MUNICIPALITY: &str = "municipality";
    pub const SPECIAL_PROGRAM_NAME: &str = "special_program_name";
    pub const REGION_CODE: &str = "region_code";
    pub const REGION_NAME: &str = "region_name";
    pub const CENTER_NAME: &str = "center_name";
    pub const START_TIME: &str = "start_time";
    pub const END_TIME: &str = "end_time";

    // roster demographic aggregates
    pub const MALE_COUNT: &str = "male_count";
    pub const FEMALE_COUNT: &str = "female_count";
    pub const NONBINARY_COUNT: &str = "nonbinary_count";
    pub const TOTAL_COUNT: &str = "total_count";
    pub const ACTIVE_TOTAL_COUNT: &str = "active_total_count";

    // DF-14 durations
    pub const LECTURE_HOURS: &str = "lecture_hours";
    pub const PRACTICAL_HOURS: &str = "practical_hours";

    // DF-14 status counts
    pub const CAPACITY: &str = "capacity";
    pub const IN_TRANSIT: &str = "in_transit";
    pub const INDUCTION: &str = "induction";
    pub const IN_TRAINING: &str = "in_training";
    pub const CONDITIONED: &str = "conditioned";
    pub const DEFERRED: &str = "deferred";
    pub const VOLUNTARY_WITHDRAWAL: &str = "voluntary_withdrawal";
    pub const VIRTUAL_CANCELLATION: &str = "virtual_cancellation";
    pub const VIRTUAL_DROPOUT: &str = "virtual_dropout";
    pub const CANCELLED: &str = "cancelled";
    pub const PENDING_CERTIFICATION: &str = "pending_certification";
    pub const CERTIFIED: &str = "certified";
    pub const TRANSFERRED: &str = "transferred";
    pub const OTHER: &str = "other";
}

use fields::*;

/// How a column is coerced during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
}

/// Source header -> internal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub source: &'static str,
    pub field: &'static str,
    pub kind: FieldKind,
}

const fn text(source: &'static str, field: &'static str) -> ColumnSpec {
    ColumnSpec { source, field, kind: FieldKind::Text }
}

const fn integer(source: &'static str, field: &'static str) -> ColumnSpec {
    ColumnSpec { source, field, kind: FieldKind::Integer }
}

const fn date(source: &'static str, field: &'static str) -> ColumnSpec {
    ColumnSpec { source, field, kind: FieldKind::Date }
}

/// Fixed layout of one spreadsheet export.
#[derive(Debug, Clone, Copy)]
pub struct FileLayout {
    pub name: &'static str,
    pub header_skip_rows: usize,
    pub columns: &'static [ColumnSpec],
    pub required: &'static [&'static str],
    pub time_defaults: &'static [&'static str], // filled with 00:00:00
    pub statistic_fields: &'static [&'static str],
}

impl FileLayout {
    /// Whitelisted source headers, in layout order.
    pub fn source_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.source)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.columns.iter().any(|c| c.field == field)
    }

    /// Default time injected for `time_defaults`.
    pub fn default_time() -> NaiveTime {
        NaiveTime::MIN
    }
}

// ==========================================
// Roster export (enrollment per group)
// ==========================================
const ROSTER_COLUMNS: &[ColumnSpec] = &[
    integer("IDENTIFICADOR_FICHA", GROUP_CODE),
    integer("CODIGO_CENTRO", CENTER_CODE),
    integer("CODIGO_PROGRAMA", PROGRAM_CODE),
    integer("VERSION_PROGRAMA", VERSION),
    text("NOMBRE_PROGRAMA_FORMACION", PROGRAM_NAME),
    text("ESTADO_CURSO", STATUS),
    text("NIVEL_FORMACION", LEVEL_NAME),
    text("NOMBRE_JORNADA", SHIFT),
    date("FECHA_INICIO_FICHA", START_DATE),
    date("FECHA_TERMINACION_FICHA", END_DATE),
    text("ETAPA_FICHA", STAGE),
    text("MODALIDAD_FORMACION", MODALITY),
    text("NOMBRE_RESPONSABLE", RESPONSIBLE_PERSON),
    text("NOMBRE_EMPRESA", COMPANY_NAME),
    text("NOMBRE_MUNICIPIO_CURSO", MUNICIPALITY),
    text("NOMBRE_PROGRAMA_ESPECIAL", SPECIAL_PROGRAM_NAME),
    integer("CODIGO_REGIONAL", REGION_CODE),
    text("NOMBRE_REGIONAL", REGION_NAME),
    text("NOMBRE_CENTRO", CENTER_NAME),
    integer("TOTAL_APRENDICES_MASCULINOS", MALE_COUNT),
    integer("TOTAL_APRENDICES_FEMENINOS", FEMALE_COUNT),
    integer("TOTAL_APRENDICES_NOBINARIO", NONBINARY_COUNT),
    integer("TOTAL_APRENDICES", TOTAL_COUNT),
    integer("TOTAL_APRENDICES_ACTIVOS", ACTIVE_TOTAL_COUNT),
];

pub const ROSTER_LAYOUT: FileLayout = FileLayout {
    name: "roster",
    header_skip_rows: 4,
    columns: ROSTER_COLUMNS,
    required: &[
        GROUP_CODE,
        CENTER_CODE,
        PROGRAM_CODE,
        VERSION,
        PROGRAM_NAME,
        START_DATE,
        END_DATE,
        STAGE,
        RESPONSIBLE_PERSON,
        MUNICIPALITY,
    ],
    time_defaults: &[START_TIME, END_TIME],
    statistic_fields: &[
        MALE_COUNT,
        FEMALE_COUNT,
        NONBINARY_COUNT,
        TOTAL_COUNT,
        ACTIVE_TOTAL_COUNT,
    ],
};

// ==========================================
// DF-14 export (durations + status counts)
// ==========================================
const DURATION_COLUMNS: &[ColumnSpec] = &[
    integer("FICHA", GROUP_CODE),
    integer("CODIGO_PROGRAMA", PROGRAM_CODE),
    integer("VERSION_PROGRAMA", VERSION),
    integer("DURACION_ETAPA_LECTIVA", LECTURE_HOURS),
    integer("DURACION_ETAPA_PRODUCTIVA", PRACTICAL_HOURS),
    integer("CUPO", CAPACITY),
    integer("EN_TRANSITO", IN_TRANSIT),
    integer("INDUCCION", INDUCTION),
    integer("FORMACION", IN_TRAINING),
    integer("CONDICIONADO", CONDITIONED),
    integer("APLAZADO", DEFERRED),
    integer("RETIRO_VOLUNTARIO", VOLUNTARY_WITHDRAWAL),
    integer("CANCELAMIENTO_VIRT_COMP", VIRTUAL_CANCELLATION),
    integer("DESERCION_VIRT_COMP", VIRTUAL_DROPOUT),
    integer("CANCELADO", CANCELLED),
    integer("POR_CERTIFICAR", PENDING_CERTIFICATION),
    integer("CERTIFICADO", CERTIFIED),
    integer("TRASLADADO", TRANSFERRED),
    integer("OTRO", OTHER),
];

pub const DURATION_LAYOUT: FileLayout = FileLayout {
    name: "df14",
    header_skip_rows: 4,
    columns: DURATION_COLUMNS,
    required: &[GROUP_CODE, PROGRAM_CODE, VERSION],
    time_defaults: &[],
    statistic_fields: &[
        CAPACITY,
        IN_TRANSIT,
        INDUCTION,
        IN_TRAINING,
        CONDITIONED,
        DEFERRED,
        VOLUNTARY_WITHDRAWAL,
        VIRTUAL_CANCELLATION,
        VIRTUAL_DROPOUT,
        CANCELLED,
        PENDING_CERTIFICATION,
        CERTIFIED,
        TRANSFERRED,
        OTHER,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_layout_shape() {
        assert_eq!(ROSTER_LAYOUT.columns.len(), 24);
        assert_eq!(ROSTER_LAYOUT.header_skip_rows, 4);
        for field in ROSTER_LAYOUT.required {
            assert!(ROSTER_LAYOUT.has_field(field), "required field {} not mapped", field);
        }
    }

    #[test]
    fn test_duration_layout_shape() {
        assert_eq!(DURATION_LAYOUT.statistic_fields.len(), 14);
        assert_eq!(DURATION_LAYOUT.columns.len(), 19);
        for field in DURATION_LAYOUT.statistic_fields {
            assert!(DURATION_LAYOUT.has_field(field));
        }
    }

    #[test]
    fn test_source_headers_are_unique() {
        for layout in [ROSTER_LAYOUT, DURATION_LAYOUT] {
            let mut seen = std::collections::HashSet::new();
            for source in layout.source_columns() {
                assert!(seen.insert(source), "duplicate header {} in {}", source, layout.name);
            }
        }
    }
}
