use rusqlite::{Connection, params};

use crate::models::WordRef;
use crate::{DbError, DbResult};

pub const MAX_WORD_LEN: usize = 100;
pub const MAX_NOTE_LEN: usize = 100;

/// Field-level checks that need no storage access.
pub fn check_word_fields(word: &str, meaning: &str) -> DbResult<()> {
    let word = word.trim();
    if word.is_empty() {
        return Err(DbError::Validation("Word text cannot be empty".into()));
    }
    if word.chars().count() > MAX_WORD_LEN {
        return Err(DbError::Validation(format!(
            "Word text cannot be longer than {MAX_WORD_LEN} characters"
        )));
    }
    if meaning.trim().is_empty() {
        return Err(DbError::Validation("Meaning cannot be empty".into()));
    }
    Ok(())
}

/// Full word check: fields plus (text, language) uniqueness, ignoring
/// `exclude_id` so an edit does not collide with itself.
pub fn validate_word(
    conn: &Connection,
    word: &str,
    meaning: &str,
    language_id: i64,
    exclude_id: Option<i64>,
) -> DbResult<()> {
    check_word_fields(word, meaning)?;

    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM words WHERE word = ?1 AND language_id = ?2 AND id IS NOT ?3)",
        params![word.trim(), language_id, exclude_id],
        |row| row.get(0),
    )?;
    if taken {
        let language: String = conn.query_row(
            "SELECT name FROM languages WHERE id = ?1",
            [language_id],
            |row| row.get(0),
        )?;
        return Err(DbError::Validation(format!(
            "Word \"{}\" already exists in language {language}",
            word.trim()
        )));
    }
    Ok(())
}

/// A word cannot translate to itself or to a word of its own language.
pub fn validate_edge(from: WordRef, to: WordRef) -> DbResult<()> {
    if from.id == to.id {
        return Err(DbError::Validation(
            "A word cannot be a translation of itself".into(),
        ));
    }
    if from.language_id == to.language_id {
        return Err(DbError::Validation(
            "Cannot translate a word into its own language".into(),
        ));
    }
    Ok(())
}

pub fn check_note(note: &str) -> DbResult<()> {
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(DbError::Validation(format!(
            "Note cannot be longer than {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(())
}
