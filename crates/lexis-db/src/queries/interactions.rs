use chrono::Utc;
use lexis_types::api::WordSummary;
use lexis_types::models::{Example, SearchRecord};
use rusqlite::{Connection, params};

use super::OptionalExt;
use super::words::{require_live_word, summary_from_row};
use crate::{Database, DbError, DbResult};

pub const RECENT_SEARCH_LIMIT: u32 = 20;

impl Database {
    pub fn add_example(&self, slug: &str, text: &str, author: Option<i64>) -> DbResult<Example> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DbError::Validation("Example text cannot be empty".into()));
        }
        self.with_tx(|tx| {
            let word = require_live_word(tx, slug)?;
            let now = Utc::now();
            tx.execute(
                "INSERT INTO examples (word_id, text, author_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![word.id, text, author, now],
            )?;
            Ok(Example {
                id: tx.last_insert_rowid(),
                word_id: word.id,
                text: text.to_string(),
                author_id: author,
                created_at: now,
            })
        })
    }

    /// Returns whether the word is a favourite after the toggle.
    pub fn toggle_favourite(&self, user_id: i64, slug: &str) -> DbResult<bool> {
        self.with_tx(|tx| {
            let word = require_live_word(tx, slug)?;
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM favourites WHERE user_id = ?1 AND word_id = ?2",
                    [user_id, word.id],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(id) = existing {
                tx.execute("DELETE FROM favourites WHERE id = ?1", [id])?;
                Ok(false)
            } else {
                tx.execute(
                    "INSERT INTO favourites (user_id, word_id, added_at) VALUES (?1, ?2, ?3)",
                    params![user_id, word.id, Utc::now()],
                )?;
                Ok(true)
            }
        })
    }

    /// Record a like or dislike, replacing the user's previous vote.
    pub fn set_like(&self, user_id: i64, slug: &str, is_like: bool) -> DbResult<(u64, u64)> {
        self.with_tx(|tx| {
            let word = require_live_word(tx, slug)?;
            tx.execute(
                "INSERT INTO word_likes (user_id, word_id, is_like, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, word_id) DO UPDATE SET is_like = excluded.is_like",
                params![user_id, word.id, is_like, Utc::now()],
            )?;
            like_counts(tx, word.id)
        })
    }

    /// Favourite words that are still live, most recently added first.
    pub fn favourites(&self, user_id: i64) -> DbResult<Vec<WordSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT w.id, w.word, w.slug, l.code, c.code, w.status, w.difficulty, w.created_at
                 FROM favourites f
                 JOIN words w ON w.id = f.word_id
                 JOIN languages l ON l.id = w.language_id
                 LEFT JOIN categories c ON c.id = w.category_id
                 WHERE f.user_id = ?1 AND w.is_deleted = 0
                 ORDER BY f.added_at DESC, f.id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], summary_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn record_search(&self, user_id: i64, query: &str) -> DbResult<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO search_history (user_id, query, searched_at) VALUES (?1, ?2, ?3)",
                params![user_id, query, Utc::now()],
            )?;
            Ok(())
        })
    }

    pub fn recent_searches(&self, user_id: i64) -> DbResult<Vec<SearchRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT query, searched_at FROM search_history
                 WHERE user_id = ?1
                 ORDER BY searched_at DESC, id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![user_id, RECENT_SEARCH_LIMIT], |row| {
                    Ok(SearchRecord {
                        query: row.get(0)?,
                        searched_at: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

/// `(likes, dislikes)` of a word.
pub(crate) fn like_counts(conn: &Connection, word_id: i64) -> DbResult<(u64, u64)> {
    let (likes, dislikes): (i64, i64) = conn.query_row(
        "SELECT COALESCE(SUM(is_like = 1), 0), COALESCE(SUM(is_like = 0), 0)
         FROM word_likes WHERE word_id = ?1",
        [word_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok((likes as u64, dislikes as u64))
}

pub(crate) fn query_examples(conn: &Connection, word_id: i64) -> DbResult<Vec<Example>> {
    let mut stmt = conn.prepare(
        "SELECT id, word_id, text, author_id, created_at
         FROM examples WHERE word_id = ?1
         ORDER BY created_at, id",
    )?;
    let rows = stmt
        .query_map([word_id], |row| {
            Ok(Example {
                id: row.get(0)?,
                word_id: row.get(1)?,
                text: row.get(2)?,
                author_id: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
