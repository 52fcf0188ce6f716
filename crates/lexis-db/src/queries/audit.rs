use chrono::{DateTime, Utc};
use lexis_types::api::WordHistoryResponse;
use lexis_types::models::{ChangeAction, ChangeLogEntry, ChangeType, HistoryEntry, Word};
use rusqlite::{Connection, params};

use super::words::require_word_by_slug;
use crate::models::parse_column;
use crate::{Database, DbResult};

/// One row of the append-only change log.
pub(crate) struct ChangeRecord<'a> {
    pub word_id: i64,
    pub user_id: Option<i64>,
    pub action: ChangeAction,
    pub old_value: Option<&'a str>,
    pub new_value: Option<&'a str>,
    pub comment: &'a str,
    pub change_type: ChangeType,
}

impl Database {
    pub fn word_history(&self, slug: &str) -> DbResult<WordHistoryResponse> {
        self.with_conn(|conn| {
            let word = require_word_by_slug(conn, slug)?;
            Ok(WordHistoryResponse {
                changes: query_changes(conn, word.id)?,
                snapshots: query_snapshots(conn, word.id)?,
            })
        })
    }
}

pub(crate) fn log_change(conn: &Connection, record: &ChangeRecord<'_>) -> DbResult<()> {
    conn.execute(
        "INSERT INTO word_change_logs
             (word_id, user_id, action, old_value, new_value, comment, change_type, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.word_id,
            record.user_id,
            record.action.as_str(),
            record.old_value,
            record.new_value,
            record.comment,
            record.change_type.as_str(),
            Utc::now(),
        ],
    )?;
    Ok(())
}

/// Store the full state of `word` (with its tag ids) after a write.
pub(crate) fn snapshot(conn: &Connection, word: &Word, actor: Option<i64>) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT tag_id FROM word_tags WHERE word_id = ?1 ORDER BY tag_id")?;
    let tags = stmt
        .query_map([word.id], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut data = serde_json::to_value(word)?;
    data["tags"] = serde_json::json!(tags);

    conn.execute(
        "INSERT INTO word_history (word_id, data, changed_by, changed_at) VALUES (?1, ?2, ?3, ?4)",
        params![word.id, data.to_string(), actor, Utc::now()],
    )?;
    Ok(())
}

/// Newest first.
pub(crate) fn query_changes(conn: &Connection, word_id: i64) -> DbResult<Vec<ChangeLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, word_id, user_id, action, old_value, new_value, comment, change_type, timestamp
         FROM word_change_logs
         WHERE word_id = ?1
         ORDER BY timestamp DESC, id DESC",
    )?;
    let rows = stmt
        .query_map([word_id], |row| {
            Ok(ChangeLogEntry {
                id: row.get(0)?,
                word_id: row.get(1)?,
                user_id: row.get(2)?,
                action: parse_column(row, 3)?,
                old_value: row.get(4)?,
                new_value: row.get(5)?,
                comment: row.get(6)?,
                change_type: parse_column(row, 7)?,
                timestamp: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Newest first.
pub(crate) fn query_snapshots(conn: &Connection, word_id: i64) -> DbResult<Vec<HistoryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, word_id, data, changed_by, changed_at
         FROM word_history
         WHERE word_id = ?1
         ORDER BY changed_at DESC, id DESC",
    )?;
    let rows = stmt
        .query_map([word_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<i64>>(3)?,
                row.get::<_, DateTime<Utc>>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, word_id, data, changed_by, changed_at)| {
            Ok(HistoryEntry {
                id,
                word_id,
                data: serde_json::from_str(&data)?,
                changed_by,
                changed_at,
            })
        })
        .collect()
}
