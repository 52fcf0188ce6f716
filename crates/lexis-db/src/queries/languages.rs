use lexis_types::models::Language;
use rusqlite::Connection;
use tracing::info;

use super::{OptionalExt, required};
use crate::slug::normalize;
use crate::{Database, DbError, DbResult};

pub const MAX_CODE_LEN: usize = 10;

impl Database {
    pub fn list_languages(&self) -> DbResult<Vec<Language>> {
        self.with_conn(query_languages)
    }

    pub fn create_language(&self, code: &str, name: &str) -> DbResult<Language> {
        let code = required(code, "Language code")?;
        let name = required(name, "Language name")?;
        if code.chars().count() > MAX_CODE_LEN {
            return Err(DbError::Validation(format!(
                "Language code cannot be longer than {MAX_CODE_LEN} characters"
            )));
        }
        if normalize(code) != code {
            return Err(DbError::Validation(
                "Language code may only contain lowercase letters, digits, '-' and '_'".into(),
            ));
        }

        self.with_tx(|tx| {
            if find_language(tx, code)?.is_some() {
                return Err(DbError::Conflict(format!(
                    "Language with code \"{code}\" already exists"
                )));
            }
            tx.execute(
                "INSERT INTO languages (code, name) VALUES (?1, ?2)",
                (code, name),
            )?;
            info!("Language {} added", code);
            Ok(Language {
                id: tx.last_insert_rowid(),
                code: code.to_string(),
                name: name.to_string(),
            })
        })
    }
}

/// All languages ordered by code. This is the denominator of every
/// completeness figure.
pub(crate) fn query_languages(conn: &Connection) -> DbResult<Vec<Language>> {
    let mut stmt = conn.prepare("SELECT id, code, name FROM languages ORDER BY code")?;
    let rows = stmt
        .query_map([], language_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn find_language(conn: &Connection, code: &str) -> DbResult<Option<Language>> {
    conn.query_row(
        "SELECT id, code, name FROM languages WHERE code = ?1",
        [code],
        language_from_row,
    )
    .optional()
}

pub(crate) fn require_language(conn: &Connection, code: &str) -> DbResult<Language> {
    find_language(conn, code)?.ok_or_else(|| DbError::not_found("Language", code))
}

fn language_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Language> {
    Ok(Language {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
    })
}
