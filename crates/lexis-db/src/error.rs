use rusqlite::ErrorCode;

/// Failures surfaced by the storage layer.
///
/// `Validation`, `NotFound` and `Conflict` carry user-facing messages; the
/// API maps them to 400, 404 and 400 respectively.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("database lock poisoned: {0}")]
    LockPoisoned(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, msg) if err.code == ErrorCode::ConstraintViolation => {
                DbError::Conflict(msg.clone().unwrap_or_else(|| err.to_string()))
            }
            _ => DbError::Sqlite(e),
        }
    }
}

impl DbError {
    pub fn not_found(what: &str, key: impl std::fmt::Display) -> Self {
        DbError::NotFound(format!("{what} '{key}' not found"))
    }
}
