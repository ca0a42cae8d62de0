// ==========================================
// Training Ingest - ingestion write statements
// ==========================================
// One statement per entity, keyed on its natural key. Conflict rules:
// - region / center: overwrite every non-key column
// - program (roster): insert with staged DF-14 hours (else zero),
//   conflict updates name only
// - group: overwrite ingested columns, classroom_id never written
// - statistics: each file writes its own column set only
// - program hours (DF-14): update-only, absent values keep stored ones;
//   unknown programs are staged in pending_program_duration
// ==========================================

use crate::domain::{
    CourseGroup, EnrollmentCounts, ProgramDuration, Region, StatusCounts, TrainingCenter,
    TrainingProgram,
};
use rusqlite::{params, Connection, OptionalExtension, Params};

/// How a statement treats a missing natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Missing key -> insert.
    Upsert,
    /// Missing key -> no-op, reported as unmatched.
    UpdateOnly,
}

/// Row-level write of one entity.
pub trait UpsertStatement {
    /// Label used in user-facing row errors.
    const ENTITY: &'static str;
    const MODE: WriteMode = WriteMode::Upsert;

    fn natural_key(&self) -> String;

    /// Whether the natural key is already stored.
    fn exists(&self, conn: &Connection) -> rusqlite::Result<bool>;

    /// Executes the write; returns the affected row count.
    fn write(&self, conn: &Connection) -> rusqlite::Result<usize>;
}

fn key_exists<P: Params>(conn: &Connection, sql: &str, params: P) -> rusqlite::Result<bool> {
    Ok(conn
        .query_row(sql, params, |_row| Ok(()))
        .optional()?
        .is_some())
}

// ==========================================
// Region
// ==========================================
impl UpsertStatement for Region {
    const ENTITY: &'static str = "regional";

    fn natural_key(&self) -> String {
        self.region_code.to_string()
    }

    fn exists(&self, conn: &Connection) -> rusqlite::Result<bool> {
        key_exists(
            conn,
            "SELECT 1 FROM region WHERE region_code = ?1",
            params![self.region_code],
        )
    }

    fn write(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO region (region_code, name) VALUES (?1, ?2)
            ON CONFLICT(region_code) DO UPDATE SET name = excluded.name
            "#,
            params![self.region_code, self.name],
        )
    }
}

// ==========================================
// TrainingCenter
// ==========================================
impl UpsertStatement for TrainingCenter {
    const ENTITY: &'static str = "centro";

    fn natural_key(&self) -> String {
        self.center_code.to_string()
    }

    fn exists(&self, conn: &Connection) -> rusqlite::Result<bool> {
        key_exists(
            conn,
            "SELECT 1 FROM training_center WHERE center_code = ?1",
            params![self.center_code],
        )
    }

    fn write(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO training_center (center_code, name, region_code) VALUES (?1, ?2, ?3)
            ON CONFLICT(center_code) DO UPDATE SET
                name = excluded.name,
                region_code = excluded.region_code
            "#,
            params![self.center_code, self.name, self.region_code],
        )
    }
}

// ==========================================
// TrainingProgram (roster)
// ==========================================
impl UpsertStatement for TrainingProgram {
    const ENTITY: &'static str = "programa";

    fn natural_key(&self) -> String {
        format!("{}/{}", self.program_code, self.version)
    }

    fn exists(&self, conn: &Connection) -> rusqlite::Result<bool> {
        key_exists(
            conn,
            "SELECT 1 FROM training_program WHERE program_code = ?1 AND version = ?2",
            params![self.program_code, self.version],
        )
    }

    fn write(&self, conn: &Connection) -> rusqlite::Result<usize> {
        // hours belong to the DF-14 report; a conflict never touches them
        let written = conn.execute(
            r#"
            INSERT INTO training_program (program_code, version, name, lecture_hours, practical_hours)
            SELECT ?1, ?2, ?3,
                COALESCE(p.lecture_hours, ?4),
                COALESCE(p.practical_hours, ?5)
            FROM (SELECT 1) AS seed
            LEFT JOIN pending_program_duration p
                ON p.program_code = ?1 AND p.version = ?2
            WHERE true
            ON CONFLICT(program_code, version) DO UPDATE SET name = excluded.name
            "#,
            params![
                self.program_code,
                self.version,
                self.name,
                self.lecture_hours,
                self.practical_hours
            ],
        )?;

        conn.execute(
            "DELETE FROM pending_program_duration WHERE program_code = ?1 AND version = ?2",
            params![self.program_code, self.version],
        )?;

        Ok(written)
    }
}

// ==========================================
// ProgramDuration (DF-14)
// ==========================================
impl UpsertStatement for ProgramDuration {
    const ENTITY: &'static str = "programa";
    const MODE: WriteMode = WriteMode::UpdateOnly;

    fn natural_key(&self) -> String {
        format!("{}/{}", self.program_code, self.version)
    }

    fn exists(&self, conn: &Connection) -> rusqlite::Result<bool> {
        key_exists(
            conn,
            "SELECT 1 FROM training_program WHERE program_code = ?1 AND version = ?2",
            params![self.program_code, self.version],
        )
    }

    /// Updates the stored program; an unknown program gets its hours
    /// staged instead and still reports 0 affected rows.
    fn write(&self, conn: &Connection) -> rusqlite::Result<usize> {
        let updated = conn.execute(
            r#"
            UPDATE training_program SET
                lecture_hours = COALESCE(?3, lecture_hours),
                practical_hours = COALESCE(?4, practical_hours)
            WHERE program_code = ?1 AND version = ?2
            "#,
            params![
                self.program_code,
                self.version,
                self.lecture_hours,
                self.practical_hours
            ],
        )?;

        if updated == 0 {
            conn.execute(
                r#"
                INSERT INTO pending_program_duration (program_code, version, lecture_hours, practical_hours)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(program_code, version) DO UPDATE SET
                    lecture_hours = COALESCE(excluded.lecture_hours, lecture_hours),
                    practical_hours = COALESCE(excluded.practical_hours, practical_hours)
                "#,
                params![
                    self.program_code,
                    self.version,
                    self.lecture_hours,
                    self.practical_hours
                ],
            )?;
        }

        Ok(updated)
    }
}

// ==========================================
// CourseGroup
// ==========================================
impl UpsertStatement for CourseGroup {
    const ENTITY: &'static str = "grupo";

    fn natural_key(&self) -> String {
        self.group_code.to_string()
    }

    fn exists(&self, conn: &Connection) -> rusqlite::Result<bool> {
        key_exists(
            conn,
            "SELECT 1 FROM course_group WHERE group_code = ?1",
            params![self.group_code],
        )
    }

    fn write(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO course_group (
                group_code, center_code, program_code, version, status, level_name,
                shift, start_date, end_date, stage, modality, responsible_person,
                company_name, municipality, special_program_name, start_time, end_time
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17
            )
            ON CONFLICT(group_code) DO UPDATE SET
                center_code = excluded.center_code,
                program_code = excluded.program_code,
                version = excluded.version,
                status = excluded.status,
                level_name = excluded.level_name,
                shift = excluded.shift,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                stage = excluded.stage,
                modality = excluded.modality,
                responsible_person = excluded.responsible_person,
                company_name = excluded.company_name,
                municipality = excluded.municipality,
                special_program_name = excluded.special_program_name,
                start_time = excluded.start_time,
                end_time = excluded.end_time
            "#,
            params![
                self.group_code,
                self.center_code,
                self.program_code,
                self.version,
                self.status,
                self.level_name,
                self.shift,
                self.start_date,
                self.end_date,
                self.stage,
                self.modality,
                self.responsible_person,
                self.company_name,
                self.municipality,
                self.special_program_name,
                self.start_time,
                self.end_time,
            ],
        )
    }
}

fn statistics_exist(conn: &Connection, group_code: i64) -> rusqlite::Result<bool> {
    key_exists(
        conn,
        "SELECT 1 FROM group_statistics WHERE group_code = ?1",
        params![group_code],
    )
}

// ==========================================
// EnrollmentCounts (roster statistics)
// ==========================================
impl UpsertStatement for EnrollmentCounts {
    const ENTITY: &'static str = "datos de grupo";

    fn natural_key(&self) -> String {
        self.group_code.to_string()
    }

    fn exists(&self, conn: &Connection) -> rusqlite::Result<bool> {
        statistics_exist(conn, self.group_code)
    }

    fn write(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO group_statistics (
                group_code, male_count, female_count, nonbinary_count,
                total_count, active_total_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(group_code) DO UPDATE SET
                male_count = excluded.male_count,
                female_count = excluded.female_count,
                nonbinary_count = excluded.nonbinary_count,
                total_count = excluded.total_count,
                active_total_count = excluded.active_total_count
            "#,
            params![
                self.group_code,
                self.male_count,
                self.female_count,
                self.nonbinary_count,
                self.total_count,
                self.active_total_count
            ],
        )
    }
}

// ==========================================
// StatusCounts (DF-14 statistics)
// ==========================================
impl UpsertStatement for StatusCounts {
    const ENTITY: &'static str = "datos de grupo";

    fn natural_key(&self) -> String {
        self.group_code.to_string()
    }

    fn exists(&self, conn: &Connection) -> rusqlite::Result<bool> {
        statistics_exist(conn, self.group_code)
    }

    fn write(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO group_statistics (
                group_code, capacity, in_transit, induction, in_training, conditioned,
                deferred, voluntary_withdrawal, virtual_cancellation, virtual_dropout,
                cancelled, pending_certification, certified, transferred, other
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(group_code) DO UPDATE SET
                capacity = excluded.capacity,
                in_transit = excluded.in_transit,
                induction = excluded.induction,
                in_training = excluded.in_training,
                conditioned = excluded.conditioned,
                deferred = excluded.deferred,
                voluntary_withdrawal = excluded.voluntary_withdrawal,
                virtual_cancellation = excluded.virtual_cancellation,
                virtual_dropout = excluded.virtual_dropout,
                cancelled = excluded.cancelled,
                pending_certification = excluded.pending_certification,
                certified = excluded.certified,
                transferred = excluded.transferred,
                other = excluded.other
            "#,
            params![
                self.group_code,
                self.capacity,
                self.in_transit,
                self.induction,
                self.in_training,
                self.conditioned,
                self.deferred,
                self.voluntary_withdrawal,
                self.virtual_cancellation,
                self.virtual_dropout,
                self.cancelled,
                self.pending_certification,
                self.certified,
                self.transferred,
                self.other,
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_program_conflict_keeps_hours() {
        let conn = setup();
        conn.execute(
            "INSERT INTO training_program VALUES (221101, 2, 'VIEJO', 880, 440)",
            [],
        )
        .unwrap();

        let program = TrainingProgram {
            program_code: 221101,
            version: 2,
            name: "NUEVO".to_string(),
            lecture_hours: 0,
            practical_hours: 0,
        };
        assert!(program.exists(&conn).unwrap());
        program.write(&conn).unwrap();

        let (name, lecture, practical): (String, i64, i64) = conn
            .query_row(
                "SELECT name, lecture_hours, practical_hours FROM training_program",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(name, "NUEVO");
        assert_eq!((lecture, practical), (880, 440));
    }

    #[test]
    fn test_duration_update_is_update_only_and_keeps_absent_hours() {
        let conn = setup();
        let missing = ProgramDuration {
            program_code: 1,
            version: 1,
            lecture_hours: Some(10),
            practical_hours: None,
        };
        assert_eq!(missing.write(&conn).unwrap(), 0);
        conn.execute("DELETE FROM pending_program_duration", []).unwrap();

        conn.execute("INSERT INTO training_program VALUES (1, 1, 'P', 0, 440)", [])
            .unwrap();
        assert_eq!(missing.write(&conn).unwrap(), 1);

        let hours: (i64, i64) = conn
            .query_row(
                "SELECT lecture_hours, practical_hours FROM training_program",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(hours, (10, 440));
    }

    #[test]
    fn test_statistics_column_sets_are_disjoint() {
        let conn = setup();
        StatusCounts {
            group_code: 7,
            capacity: Some(30),
            ..Default::default()
        }
        .write(&conn)
        .unwrap();
        EnrollmentCounts {
            group_code: 7,
            total_count: Some(25),
            ..Default::default()
        }
        .write(&conn)
        .unwrap();

        let (capacity, total, male): (Option<i64>, Option<i64>, Option<i64>) = conn
            .query_row(
                "SELECT capacity, total_count, male_count FROM group_statistics WHERE group_code = 7",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(capacity, Some(30));
        assert_eq!(total, Some(25));
        assert_eq!(male, None);
    }

    fn program_hours(conn: &Connection) -> (i64, i64) {
        conn.query_row(
            "SELECT lecture_hours, practical_hours FROM training_program WHERE program_code = 221101",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap()
    }

    fn pending_rows(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM pending_program_duration", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_unknown_program_hours_are_staged_then_consumed() {
        let conn = setup();
        let lecture = ProgramDuration {
            program_code: 221101,
            version: 2,
            lecture_hours: Some(880),
            practical_hours: None,
        };
        let practical = ProgramDuration {
            lecture_hours: None,
            practical_hours: Some(440),
            ..lecture.clone()
        };
        assert_eq!(lecture.write(&conn).unwrap(), 0);
        assert_eq!(practical.write(&conn).unwrap(), 0);
        assert_eq!(pending_rows(&conn), 1);

        let program = TrainingProgram {
            program_code: 221101,
            version: 2,
            name: "ADSO".to_string(),
            lecture_hours: 0,
            practical_hours: 0,
        };
        assert_eq!(program.write(&conn).unwrap(), 1);

        assert_eq!(program_hours(&conn), (880, 440));
        assert_eq!(pending_rows(&conn), 0);
    }

    #[test]
    fn test_new_program_without_staged_hours_starts_at_zero() {
        let conn = setup();
        TrainingProgram {
            program_code: 221101,
            version: 2,
            name: "ADSO".to_string(),
            lecture_hours: 0,
            practical_hours: 0,
        }
        .write(&conn)
        .unwrap();

        assert_eq!(program_hours(&conn), (0, 0));
    }
}
