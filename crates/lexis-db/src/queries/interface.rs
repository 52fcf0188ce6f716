use std::collections::BTreeMap;

use lexis_types::api::InterfaceGrid;
use rusqlite::{Connection, params};
use tracing::debug;

use super::languages::{query_languages, require_language};
use crate::{Database, DbError, DbResult};

impl Database {
    /// Every interface key with its value in every language. Missing cells
    /// are empty strings.
    pub fn interface_grid(&self) -> DbResult<InterfaceGrid> {
        self.with_conn(|conn| {
            let languages = query_languages(conn)?;
            let mut keys: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

            for key in query_keys(conn)? {
                let row = languages
                    .iter()
                    .map(|l| (l.code.clone(), String::new()))
                    .collect();
                keys.insert(key, row);
            }

            let mut stmt = conn.prepare(
                "SELECT it.key, l.code, it.value
                 FROM interface_translations it JOIN languages l ON l.id = it.language_id",
            )?;
            let cells = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            for (key, code, value) in cells {
                keys.entry(key).or_default().insert(code, value);
            }

            Ok(InterfaceGrid { languages, keys })
        })
    }

    /// Save every submitted cell, empty values included. Returns the number
    /// of cells written.
    pub fn update_interface(
        &self,
        values: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> DbResult<u32> {
        self.with_tx(|tx| {
            let mut saved = 0;
            for (key, cells) in values {
                let key = key.trim();
                if key.is_empty() {
                    return Err(DbError::Validation("Interface key cannot be empty".into()));
                }
                for (code, value) in cells {
                    let language = require_language(tx, code)?;
                    upsert_value(tx, language.id, key, value.trim())?;
                    saved += 1;
                }
            }
            debug!("Saved {} interface strings", saved);
            Ok(saved)
        })
    }
}

/// Distinct keys across all languages, sorted.
pub(crate) fn query_keys(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT key FROM interface_translations ORDER BY key")?;
    let keys = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(keys)
}

pub(crate) fn upsert_value(
    conn: &Connection,
    language_id: i64,
    key: &str,
    value: &str,
) -> DbResult<()> {
    conn.execute(
        "INSERT INTO interface_translations (language_id, key, value) VALUES (?1, ?2, ?3)
         ON CONFLICT(language_id, key) DO UPDATE SET value = excluded.value",
        params![language_id, key, value],
    )?;
    Ok(())
}
