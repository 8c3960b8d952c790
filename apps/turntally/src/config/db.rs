use std::env;

use crate::error::AppError;

/// Which database backend the session store talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl DbKind {
    /// Pick a backend from the environment: an explicit
    /// `TURNTALLY_DATABASE_URL` wins, then `TURNTALLY_SQLITE_PATH`,
    /// otherwise an in-memory SQLite database.
    pub fn from_env() -> Self {
        if env::var("TURNTALLY_DATABASE_URL").is_ok() {
            DbKind::Postgres
        } else if env::var("TURNTALLY_SQLITE_PATH").is_ok() {
            DbKind::SqliteFile
        } else {
            DbKind::SqliteMemory
        }
    }
}

/// Builds a database URL for the given backend from environment variables.
pub fn db_url(kind: DbKind) -> Result<String, AppError> {
    match kind {
        DbKind::Postgres => {
            let url = must_var("TURNTALLY_DATABASE_URL")?;
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(AppError::config(
                    "TURNTALLY_DATABASE_URL must be a postgres:// or postgresql:// URL",
                ));
            }
            Ok(url)
        }
        DbKind::SqliteFile => {
            let path = must_var("TURNTALLY_SQLITE_PATH")?;
            Ok(format!("sqlite://{path}?mode=rwc"))
        }
        DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
    }
}

/// Get required environment variable or return error
fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}

#[cfg(test)]
mod tests {
    use std::env;

    use serial_test::serial;

    use super::{db_url, DbKind};

    fn clear_env() {
        env::remove_var("TURNTALLY_DATABASE_URL");
        env::remove_var("TURNTALLY_SQLITE_PATH");
    }

    #[test]
    #[serial]
    fn test_kind_defaults_to_memory() {
        clear_env();
        assert_eq!(DbKind::from_env(), DbKind::SqliteMemory);
        assert_eq!(db_url(DbKind::SqliteMemory).unwrap(), "sqlite::memory:");
    }

    #[test]
    #[serial]
    fn test_sqlite_file_url() {
        clear_env();
        env::set_var("TURNTALLY_SQLITE_PATH", "/tmp/tally.db");
        assert_eq!(DbKind::from_env(), DbKind::SqliteFile);
        assert_eq!(
            db_url(DbKind::SqliteFile).unwrap(),
            "sqlite:///tmp/tally.db?mode=rwc"
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_postgres_url_must_have_scheme() {
        clear_env();
        env::set_var("TURNTALLY_DATABASE_URL", "mysql://nope");
        let err = db_url(DbKind::Postgres).unwrap_err();
        assert!(err.to_string().contains("postgres"));
        env::set_var("TURNTALLY_DATABASE_URL", "postgresql://u:p@localhost:5432/tally");
        assert_eq!(
            db_url(DbKind::Postgres).unwrap(),
            "postgresql://u:p@localhost:5432/tally"
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_env_var() {
        clear_env();
        let err = db_url(DbKind::SqliteFile).unwrap_err();
        assert!(err.to_string().contains("TURNTALLY_SQLITE_PATH"));
    }
}
