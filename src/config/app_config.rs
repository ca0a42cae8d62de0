// ==========================================
// Training Ingest - runtime configuration
// ==========================================
// Environment variables, each with a default:
// - TRAINING_INGEST_DB_PATH        SQLite file (default: user data dir)
// - TRAINING_INGEST_BIND_ADDR      listen address (default: 127.0.0.1:8000)
// - TRAINING_INGEST_MAX_UPLOAD_MB  upload body limit (default: 20)
// - TRAINING_INGEST_SLOW_SQL_MS    slow SQL warn threshold, 0 = off (default: 200)
// ==========================================

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "TRAINING_INGEST_DB_PATH";
pub const ENV_BIND_ADDR: &str = "TRAINING_INGEST_BIND_ADDR";
pub const ENV_MAX_UPLOAD_MB: &str = "TRAINING_INGEST_MAX_UPLOAD_MB";
pub const ENV_SLOW_SQL_MS: &str = "TRAINING_INGEST_SLOW_SQL_MS";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;
pub const DEFAULT_SLOW_SQL_MS: u64 = 200;

const DB_FILE_NAME: &str = "training_ingest.db";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    pub slow_sql_ms: u64,
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves every setting through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = get(ENV_DB_PATH).unwrap_or_else(default_db_path);

        let bind_addr = match get(ENV_BIND_ADDR) {
            Some(v) => v.parse::<SocketAddr>().map_err(|e| ConfigError::InvalidValue {
                key: ENV_BIND_ADDR,
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 8000)),
        };

        let max_upload_mb = parse_number(ENV_MAX_UPLOAD_MB, get(ENV_MAX_UPLOAD_MB), DEFAULT_MAX_UPLOAD_MB)?;
        if max_upload_mb == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_MAX_UPLOAD_MB,
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let slow_sql_ms = parse_number(ENV_SLOW_SQL_MS, get(ENV_SLOW_SQL_MS), DEFAULT_SLOW_SQL_MS)?;

        Ok(Self {
            db_path,
            bind_addr,
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            slow_sql_ms,
        })
    }
}

fn parse_number<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key,
            value: v.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Default SQLite location under the user data directory.
///
/// Falls back to the working directory when no data directory exists.
pub fn default_db_path() -> String {
    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("training-ingest-dev");
        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("training-ingest");

        // best effort: on failure SQLite reports the real error at open time
        std::fs::create_dir_all(&dir).ok();
        path = dir.join(DB_FILE_NAME);
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_DB_PATH, "/tmp/t.db")])).unwrap();

        assert_eq!(config.db_path, "/tmp/t.db");
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_MB * 1024 * 1024);
        assert_eq!(config.slow_sql_ms, DEFAULT_SLOW_SQL_MS);
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/t.db"),
            (ENV_BIND_ADDR, "0.0.0.0:9000"),
            (ENV_MAX_UPLOAD_MB, " 5 "),
            (ENV_SLOW_SQL_MS, ""),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.slow_sql_ms, DEFAULT_SLOW_SQL_MS);
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_BIND_ADDR, "nope")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_BIND_ADDR, .. }));

        let err = AppConfig::from_lookup(lookup(&[(ENV_MAX_UPLOAD_MB, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_MAX_UPLOAD_MB, .. }));

        let err = AppConfig::from_lookup(lookup(&[(ENV_SLOW_SQL_MS, "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_SLOW_SQL_MS, .. }));
    }
}
