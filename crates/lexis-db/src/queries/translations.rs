use std::collections::BTreeMap;

use chrono::Utc;
use lexis_types::api::{
    BulkTranslateItem, CreateTranslationRequest, SuggestionSource, TranslateOutcome,
    TranslationSuggestion, UpdateTranslationRequest,
};
use lexis_types::models::{ChangeType, Language, TranslationEdge, Word, WordStatus};
use rusqlite::{Connection, params};
use tracing::{debug, info};

use super::OptionalExt;
use super::languages::require_language;
use super::words::{
    NewWord, find_word, find_word_by_text, insert_word, require_live_word, require_word,
};
use crate::graph::edge_from_row;
use crate::models::WordRef;
use crate::validation::{check_note, validate_edge};
use crate::{Database, DbError, DbResult};

/// Display order given to edges created by the translation tools.
const TOOL_EDGE_ORDER: i64 = 1;

/// Leading characters a `[SIMILAR]` suggestion must share with the source.
const SIMILAR_PREFIX_CHARS: usize = 3;

impl Database {
    pub fn create_translation(
        &self,
        from_slug: &str,
        request: &CreateTranslationRequest,
    ) -> DbResult<TranslationEdge> {
        check_note(&request.note)?;
        if request.order < 0 {
            return Err(DbError::Validation("Order cannot be negative".into()));
        }

        self.with_tx(|tx| {
            let from = require_live_word(tx, from_slug)?;
            let to = require_word(tx, request.to_word_id)?;
            if to.is_deleted {
                return Err(DbError::not_found("Word", request.to_word_id));
            }
            validate_edge(word_ref(&from), word_ref(&to))?;
            if find_edge(tx, from.id, to.id)?.is_some() {
                return Err(DbError::Conflict(format!(
                    "\"{}\" already has the translation \"{}\"",
                    from.word, to.word
                )));
            }

            let status = request.status.unwrap_or(WordStatus::Approved);
            let id = insert_edge(tx, &from, &to, request.note.trim(), request.order, status)?;
            require_edge(tx, id)
        })
    }

    pub fn update_translation(
        &self,
        id: i64,
        request: &UpdateTranslationRequest,
    ) -> DbResult<TranslationEdge> {
        if let Some(note) = &request.note {
            check_note(note)?;
        }
        if request.order.is_some_and(|o| o < 0) {
            return Err(DbError::Validation("Order cannot be negative".into()));
        }

        self.with_tx(|tx| {
            let edge = require_edge(tx, id)?;
            tx.execute(
                "UPDATE translations SET note = ?1, sort_order = ?2, status = ?3 WHERE id = ?4",
                params![
                    request.note.as_deref().map(str::trim).unwrap_or(edge.note.as_str()),
                    request.order.unwrap_or(edge.order),
                    request.status.unwrap_or(edge.status).as_str(),
                    id,
                ],
            )?;
            require_edge(tx, id)
        })
    }

    pub fn delete_translation(&self, id: i64) -> DbResult<()> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM translations WHERE id = ?1", [id])?;
            if removed == 0 {
                return Err(DbError::not_found("Translation", id));
            }
            Ok(())
        })
    }

    /// Translate one word into several languages at once.
    ///
    /// `translations` maps a language code to the translated text. Blank
    /// texts and the source word's own language are skipped.
    pub fn multi_translate(
        &self,
        slug: &str,
        translations: &BTreeMap<String, String>,
        actor: Option<i64>,
    ) -> DbResult<TranslateOutcome> {
        self.with_tx(|tx| {
            let source = require_live_word(tx, slug)?;
            let mut outcome = TranslateOutcome::default();
            for (code, text) in translations {
                if text.trim().is_empty() {
                    continue;
                }
                let language = require_language(tx, code.trim())?;
                translate_into(tx, &source, &language, text, actor, &mut outcome)?;
            }
            info!(
                "Multi-translation of {}: {} words, {} new edges, {} already present",
                source.slug,
                outcome.created_words,
                outcome.created_translations,
                outcome.existing_translations
            );
            Ok(outcome)
        })
    }

    /// Many `(word, language, text)` triples in one transaction.
    pub fn bulk_translate(
        &self,
        items: &[BulkTranslateItem],
        actor: Option<i64>,
    ) -> DbResult<TranslateOutcome> {
        self.with_tx(|tx| {
            let mut outcome = TranslateOutcome::default();
            for item in items {
                if item.text.trim().is_empty() {
                    continue;
                }
                let source = require_word(tx, item.word_id)?;
                if source.is_deleted {
                    return Err(DbError::not_found("Word", item.word_id));
                }
                let language = require_language(tx, item.language.trim())?;
                translate_into(tx, &source, &language, &item.text, actor, &mut outcome)?;
            }
            info!(
                "Bulk translation: {} words, {} new edges, {} already present",
                outcome.created_words, outcome.created_translations, outcome.existing_translations
            );
            Ok(outcome)
        })
    }

    /// Prefill texts for the translation tools, one per (word, language).
    ///
    /// Read-only. Unknown and deleted word ids are skipped, as is a target
    /// language equal to the word's own.
    pub fn suggest_translations(
        &self,
        word_ids: &[i64],
        languages: &[String],
    ) -> DbResult<Vec<TranslationSuggestion>> {
        self.with_conn(|conn| {
            let languages = languages
                .iter()
                .map(|code| require_language(conn, code.trim()))
                .collect::<DbResult<Vec<_>>>()?;

            let mut suggestions = Vec::new();
            for &word_id in word_ids {
                let Some(word) = find_word(conn, word_id)?.filter(|w| !w.is_deleted) else {
                    continue;
                };
                for language in languages.iter().filter(|l| l.id != word.language_id) {
                    let (text, source) = suggest_one(conn, &word, language)?;
                    suggestions.push(TranslationSuggestion {
                        word_id,
                        language: language.code.clone(),
                        text,
                        source,
                    });
                }
            }
            Ok(suggestions)
        })
    }
}

/// First approved translation, else a similar target word, else a stand-in.
fn suggest_one(
    conn: &Connection,
    word: &Word,
    language: &Language,
) -> DbResult<(String, SuggestionSource)> {
    let approved: Option<String> = conn
        .query_row(
            "SELECT w.word
             FROM translations t JOIN words w ON w.id = t.to_word_id
             WHERE t.from_word_id = ?1 AND w.language_id = ?2
               AND t.status = 'approved' AND w.is_deleted = 0
             ORDER BY t.sort_order, t.id
             LIMIT 1",
            params![word.id, language.id],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(text) = approved {
        return Ok((text, SuggestionSource::Approved));
    }

    let prefix: String = word
        .word
        .chars()
        .take(SIMILAR_PREFIX_CHARS)
        .collect::<String>()
        .to_lowercase();
    let similar: Option<String> = conn
        .query_row(
            "SELECT word FROM words
             WHERE language_id = ?1 AND is_deleted = 0 AND instr(unicode_lower(word), ?2) > 0
             ORDER BY id
             LIMIT 1",
            params![language.id, prefix],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(text) = similar {
        return Ok((format!("[SIMILAR] {text}"), SuggestionSource::Similar));
    }

    Ok((
        format!("[AUTO] {} ({})", word.word, language.code),
        SuggestionSource::Auto,
    ))
}

fn word_ref(word: &Word) -> WordRef {
    WordRef {
        id: word.id,
        language_id: word.language_id,
    }
}

/// Find or create the target word, then create a pending edge from `source`
/// to it unless one already exists.
fn translate_into(
    conn: &Connection,
    source: &Word,
    language: &Language,
    text: &str,
    actor: Option<i64>,
    outcome: &mut TranslateOutcome,
) -> DbResult<()> {
    if language.id == source.language_id {
        return Ok(());
    }
    let text = text.trim();

    let target = match find_word_by_text(conn, text, language.id)? {
        Some(word) => word,
        None => {
            let new = NewWord {
                word: text,
                meaning: &source.meaning,
                language,
                category_id: source.category_id,
                tags: &[],
                status: WordStatus::Pending,
                difficulty: Default::default(),
                pronunciation: "",
                created_by: actor,
            };
            let word = insert_word(conn, &new, ChangeType::Auto, "Created by translation tool")?;
            outcome.created_words += 1;
            word
        }
    };
    validate_edge(word_ref(source), word_ref(&target))?;

    // An existing edge keeps its moderation status and order.
    match find_edge(conn, source.id, target.id)? {
        Some(_) => outcome.existing_translations += 1,
        None => {
            insert_edge(conn, source, &target, "", TOOL_EDGE_ORDER, WordStatus::Pending)?;
            outcome.created_translations += 1;
        }
    }
    Ok(())
}

fn insert_edge(
    conn: &Connection,
    from: &Word,
    to: &Word,
    note: &str,
    order: i64,
    status: WordStatus,
) -> DbResult<i64> {
    conn.execute(
        "INSERT INTO translations (from_word_id, to_word_id, note, sort_order, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![from.id, to.id, note, order, status.as_str(), Utc::now()],
    )?;
    debug!("Translation {} -> {} added", from.slug, to.slug);
    Ok(conn.last_insert_rowid())
}

const EDGE_SELECT: &str =
    "SELECT id, from_word_id, to_word_id, note, sort_order, status, created_at FROM translations";

fn find_edge(conn: &Connection, from: i64, to: i64) -> DbResult<Option<TranslationEdge>> {
    conn.query_row(
        &format!("{EDGE_SELECT} WHERE from_word_id = ?1 AND to_word_id = ?2"),
        [from, to],
        edge_from_row,
    )
    .optional()
}

fn require_edge(conn: &Connection, id: i64) -> DbResult<TranslationEdge> {
    conn.query_row(&format!("{EDGE_SELECT} WHERE id = ?1"), [id], edge_from_row)
        .optional()?
        .ok_or_else(|| DbError::not_found("Translation", id))
}
