/// Database row types that have no direct API counterpart.
/// Public entities live in lexis-types; these stay internal to storage workflows.
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lexis_types::models::User;
use rusqlite::Row;
use rusqlite::types::Type;

/// A user together with the stored password hash. Never serialized.
pub struct UserRow {
    pub user: User,
    pub password: String,
}

/// Minimal word projection used by slug repair.
#[derive(Debug, Clone)]
pub struct SlugRow {
    pub id: i64,
    pub word: String,
    pub language: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Word identity plus language, enough to validate a translation edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordRef {
    pub id: i64,
    pub language_id: i64,
}

/// Read a TEXT column into one of the string-backed enums.
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
