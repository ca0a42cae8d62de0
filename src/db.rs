// ==========================================
// Training Ingest - SQLite connection setup
// ==========================================
// Every connection gets the same PRAGMAs (foreign keys are per
// connection in SQLite) and the same busy timeout. Slow statements are
// reported through rusqlite's profile hook.
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version written by `migrations/schema_v1.sql`
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = include_str!("../migrations/schema_v1.sql");

/// 0 disables slow-statement logging.
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(200);

/// Sets the slow-statement threshold for connections opened afterwards.
pub fn set_slow_sql_threshold_ms(ms: u64) {
    SLOW_SQL_THRESHOLD_MS.store(ms, Ordering::Relaxed);
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.trim().replace('\n', " ");
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s,
    }
}

fn slow_sql_callback(sql: &str, duration: Duration) {
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    let ms = duration.as_millis() as u64;
    if threshold > 0 && ms >= threshold {
        tracing::warn!(
            target: "training_ingest::sql",
            elapsed_ms = ms,
            threshold_ms = threshold,
            sql = %truncate_sql(sql, 420),
            "slow SQL statement"
        );
    }
}

/// Applies the shared PRAGMAs.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Opens a connection with the shared configuration and the slow-SQL hook.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    if SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed) > 0 {
        conn.profile(Some(slow_sql_callback));
    }
    Ok(conn)
}

/// Creates missing tables and records the schema version. Idempotent.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_V1)?;

    let version = read_schema_version(conn)?;
    if version != Some(CURRENT_SCHEMA_VERSION) {
        tracing::warn!(
            found = ?version,
            expected = CURRENT_SCHEMA_VERSION,
            "schema_version mismatch"
        );
    }
    Ok(())
}

/// Reads schema_version (None when the table does not exist).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_truncate_sql() {
        assert_eq!(truncate_sql("SELECT\n1", 100), "SELECT 1");
        assert_eq!(truncate_sql("SELECT 1", 3), "SEL…");
    }
}
