// ==========================================
// Training Ingest - group read/update repository
// ==========================================
// Read side of the ingested entities plus the partial schedule update.
// Holds a request-scoped connection.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{
    CourseGroup, EnrollmentCounts, GroupOption, GroupStatistics, GroupUpdate, Region,
    StatusCounts, TrainingCenter, TrainingProgram,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::update_builder::UpdateBuilder;
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};

const GROUP_COLUMNS: &str = r#"
    group_code, center_code, program_code, version, status, level_name, shift,
    start_date, end_date, stage, modality, responsible_person, company_name,
    municipality, special_program_name, start_time, end_time, classroom_id
"#;

const OPTION_SELECT: &str = r#"
    SELECT g.group_code, g.status, g.shift, g.start_date, g.end_date, g.stage, p.name
    FROM course_group g
    LEFT JOIN training_program p
        ON p.program_code = g.program_code AND p.version = g.version
    WHERE g.status NOT IN ('CANCELADO', 'CERRADO')
"#;

/// Escapes LIKE wildcards; patterns use `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct GroupRepository {
    conn: Connection,
}

impl GroupRepository {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens a connection on `db_path` with the shared configuration.
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::new(conn))
    }

    fn map_group(row: &Row<'_>) -> rusqlite::Result<CourseGroup> {
        Ok(CourseGroup {
            group_code: row.get(0)?,
            center_code: row.get(1)?,
            program_code: row.get(2)?,
            version: row.get(3)?,
            status: row.get(4)?,
            level_name: row.get(5)?,
            shift: row.get(6)?,
            start_date: row.get(7)?,
            end_date: row.get(8)?,
            stage: row.get(9)?,
            modality: row.get(10)?,
            responsible_person: row.get(11)?,
            company_name: row.get(12)?,
            municipality: row.get(13)?,
            special_program_name: row.get(14)?,
            start_time: row.get(15)?,
            end_time: row.get(16)?,
            classroom_id: row.get(17)?,
        })
    }

    pub fn find_group(&self, group_code: i64) -> RepositoryResult<Option<CourseGroup>> {
        let sql = format!("SELECT {} FROM course_group WHERE group_code = ?1", GROUP_COLUMNS);
        let group = self
            .conn
            .query_row(&sql, params![group_code], Self::map_group)
            .optional()?;
        Ok(group)
    }

    /// Groups of one center ordered by group code (possibly empty).
    pub fn list_groups_by_center(&self, center_code: i64) -> RepositoryResult<Vec<CourseGroup>> {
        let sql = format!(
            "SELECT {} FROM course_group WHERE center_code = ?1 ORDER BY group_code",
            GROUP_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let groups = stmt
            .query_map(params![center_code], Self::map_group)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    /// Open groups (not cancelled or closed) for a select box.
    ///
    /// # Search modes
    /// - blank text: newest group codes first
    /// - digits only: group codes starting with the text, ascending
    /// - other text: program name contains the text (case-insensitive),
    ///   names starting with it first, then newest group codes
    pub fn search_groups(&self, text: &str, limit: u32) -> RepositoryResult<Vec<GroupOption>> {
        let text = text.trim();

        let (sql, args): (String, Vec<Value>) = if text.is_empty() {
            (
                format!("{} ORDER BY g.group_code DESC LIMIT ?1", OPTION_SELECT),
                vec![Value::Integer(i64::from(limit))],
            )
        } else if text.chars().all(|c| c.is_ascii_digit()) {
            (
                format!(
                    "{} AND CAST(g.group_code AS TEXT) LIKE ?1 || '%' \
                     ORDER BY g.group_code ASC LIMIT ?2",
                    OPTION_SELECT
                ),
                vec![Value::Text(text.to_string()), Value::Integer(i64::from(limit))],
            )
        } else {
            (
                format!(
                    "{} AND UPPER(p.name) LIKE '%' || UPPER(?1) || '%' ESCAPE '\\' \
                     ORDER BY CASE WHEN UPPER(p.name) LIKE UPPER(?1) || '%' ESCAPE '\\' THEN 1 ELSE 2 END, \
                     g.group_code DESC LIMIT ?2",
                    OPTION_SELECT
                ),
                vec![Value::Text(escape_like(text)), Value::Integer(i64::from(limit))],
            )
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let options = stmt
            .query_map(params_from_iter(args), |row| {
                Ok(GroupOption {
                    group_code: row.get(0)?,
                    status: row.get(1)?,
                    shift: row.get(2)?,
                    start_date: row.get(3)?,
                    end_date: row.get(4)?,
                    stage: row.get(5)?,
                    program_name: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(options)
    }

    /// Applies a partial schedule update and returns the stored group.
    ///
    /// # Errors
    /// - EmptyUpdate: no field present in the payload
    /// - NotFound: unknown group code
    pub fn update_group(
        &self,
        group_code: i64,
        update: &GroupUpdate,
    ) -> RepositoryResult<CourseGroup> {
        let (sql, values) = UpdateBuilder::for_group(update)
            .build(Value::Integer(group_code))
            .ok_or_else(|| RepositoryError::EmptyUpdate(format!("grupo {}", group_code)))?;

        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "grupo".to_string(),
                id: group_code.to_string(),
            });
        }

        self.find_group(group_code)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "grupo".to_string(),
                id: group_code.to_string(),
            })
    }

    pub fn find_region(&self, region_code: i64) -> RepositoryResult<Option<Region>> {
        let region = self
            .conn
            .query_row(
                "SELECT region_code, name FROM region WHERE region_code = ?1",
                params![region_code],
                |row| {
                    Ok(Region {
                        region_code: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(region)
    }

    pub fn find_center(&self, center_code: i64) -> RepositoryResult<Option<TrainingCenter>> {
        let center = self
            .conn
            .query_row(
                "SELECT center_code, name, region_code FROM training_center WHERE center_code = ?1",
                params![center_code],
                |row| {
                    Ok(TrainingCenter {
                        center_code: row.get(0)?,
                        name: row.get(1)?,
                        region_code: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(center)
    }

    pub fn find_program(
        &self,
        program_code: i64,
        version: i64,
    ) -> RepositoryResult<Option<TrainingProgram>> {
        let program = self
            .conn
            .query_row(
                r#"
                SELECT program_code, version, name, lecture_hours, practical_hours
                FROM training_program WHERE program_code = ?1 AND version = ?2
                "#,
                params![program_code, version],
                |row| {
                    Ok(TrainingProgram {
                        program_code: row.get(0)?,
                        version: row.get(1)?,
                        name: row.get(2)?,
                        lecture_hours: row.get(3)?,
                        practical_hours: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(program)
    }

    pub fn find_group_statistics(
        &self,
        group_code: i64,
    ) -> RepositoryResult<Option<GroupStatistics>> {
        let stats = self
            .conn
            .query_row(
                r#"
                SELECT group_code, male_count, female_count, nonbinary_count, total_count,
                       active_total_count, capacity, in_transit, induction, in_training,
                       conditioned, deferred, voluntary_withdrawal, virtual_cancellation,
                       virtual_dropout, cancelled, pending_certification, certified,
                       transferred, other
                FROM group_statistics WHERE group_code = ?1
                "#,
                params![group_code],
                |row| {
                    let group_code: i64 = row.get(0)?;
                    Ok(GroupStatistics {
                        enrollment: EnrollmentCounts {
                            group_code,
                            male_count: row.get(1)?,
                            female_count: row.get(2)?,
                            nonbinary_count: row.get(3)?,
                            total_count: row.get(4)?,
                            active_total_count: row.get(5)?,
                        },
                        status: StatusCounts {
                            group_code,
                            capacity: row.get(6)?,
                            in_transit: row.get(7)?,
                            induction: row.get(8)?,
                            in_training: row.get(9)?,
                            conditioned: row.get(10)?,
                            deferred: row.get(11)?,
                            voluntary_withdrawal: row.get(12)?,
                            virtual_cancellation: row.get(13)?,
                            virtual_dropout: row.get(14)?,
                            cancelled: row.get(15)?,
                            pending_certification: row.get(16)?,
                            certified: row.get(17)?,
                            transferred: row.get(18)?,
                            other: row.get(19)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(stats)
    }
}
