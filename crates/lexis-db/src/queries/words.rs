use chrono::Utc;
use lexis_types::api::{
    CheckTranslationsResponse, ExistingTranslation, Page, SimilarWord, Suggestion, TagLabel,
    TranslationView, WordDetailResponse, WordPayload, WordSummary, WordTranslationsDashboard,
    WordTranslationsQuery,
};
use lexis_types::models::{
    ChangeAction, ChangeType, Difficulty, Language, Word, WordStatus,
};
use rusqlite::{Connection, ToSql, params};
use tracing::{debug, info};

use super::audit::{self, ChangeRecord};
use super::entities::{self, CATEGORY, TAG};
use super::interactions::{like_counts, query_examples};
use super::languages::require_language;
use super::{OptionalExt, required};
use crate::filter::{PAGE_SIZE, WordFilter, page_window, parse_page};
use crate::graph::TranslationGraph;
use crate::models::{SlugRow, parse_column};
use crate::slug::{self, SlugFix, WordSlugs};
use crate::validation::validate_word;
use crate::{Database, DbError, DbResult};

const WORD_SELECT: &str = "SELECT w.id, w.word, w.slug, w.language_id, l.code, w.meaning,
            w.category_id, c.code, w.status, w.difficulty, w.pronunciation,
            w.is_deleted, w.created_by, w.created_at, w.updated_at
     FROM words w
     JOIN languages l ON l.id = w.language_id
     LEFT JOIN categories c ON c.id = w.category_id";

const SUMMARY_COLUMNS: &str =
    "SELECT w.id, w.word, w.slug, l.code, c.code, w.status, w.difficulty, w.created_at";

const SUGGESTION_LIMIT: u32 = 10;
const SIMILAR_LIMIT: u32 = 5;

/// Everything needed to insert a word. Workflows that create words on the
/// fly (multi-translation) build this directly.
pub(crate) struct NewWord<'a> {
    pub word: &'a str,
    pub meaning: &'a str,
    pub language: &'a Language,
    pub category_id: Option<i64>,
    pub tags: &'a [i64],
    pub status: WordStatus,
    pub difficulty: Difficulty,
    pub pronunciation: &'a str,
    pub created_by: Option<i64>,
}

/// Old and new status of a moderated word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub old: WordStatus,
    pub new: WordStatus,
}

impl Database {
    // -- Writes --

    pub fn create_word(&self, payload: &WordPayload, actor: Option<i64>) -> DbResult<Word> {
        self.with_tx(|tx| {
            let language = require_language(tx, payload.language.trim())?;
            let new = NewWord {
                word: &payload.word,
                meaning: &payload.meaning,
                language: &language,
                category_id: payload.category_id,
                tags: &payload.tags,
                status: payload.status.unwrap_or_default(),
                difficulty: payload.difficulty.unwrap_or_default(),
                pronunciation: &payload.pronunciation,
                created_by: actor,
            };
            insert_word(tx, &new, ChangeType::Manual, "Word created")
        })
    }

    /// Edit an existing word. The slug is kept even when the text changes.
    pub fn update_word(
        &self,
        slug: &str,
        payload: &WordPayload,
        actor: Option<i64>,
    ) -> DbResult<Word> {
        self.with_tx(|tx| {
            let existing = require_live_word(tx, slug)?;
            let language = require_language(tx, payload.language.trim())?;
            validate_word(
                tx,
                &payload.word,
                &payload.meaning,
                language.id,
                Some(existing.id),
            )?;
            ensure_category(tx, payload.category_id)?;
            if language.id != existing.language_id {
                ensure_language_change_allowed(tx, existing.id, language.id)?;
            }

            tx.execute(
                "UPDATE words
                 SET word = ?1, language_id = ?2, meaning = ?3, category_id = ?4, status = ?5,
                     difficulty = ?6, pronunciation = ?7, updated_at = ?8
                 WHERE id = ?9",
                params![
                    payload.word.trim(),
                    language.id,
                    payload.meaning,
                    payload.category_id,
                    payload.status.unwrap_or(existing.status).as_str(),
                    payload.difficulty.unwrap_or(existing.difficulty).as_str(),
                    payload.pronunciation.trim(),
                    Utc::now(),
                    existing.id,
                ],
            )?;
            set_word_tags(tx, existing.id, &payload.tags)?;

            let updated = require_word(tx, existing.id)?;
            audit::log_change(
                tx,
                &ChangeRecord {
                    word_id: updated.id,
                    user_id: actor,
                    action: ChangeAction::Updated,
                    old_value: Some(existing.word.as_str()),
                    new_value: Some(updated.word.as_str()),
                    comment: "Word edited",
                    change_type: ChangeType::Manual,
                },
            )?;
            audit::snapshot(tx, &updated, actor)?;
            debug!("Word {} updated", updated.slug);
            Ok(updated)
        })
    }

    pub fn soft_delete_word(&self, slug: &str, actor: Option<i64>) -> DbResult<()> {
        self.with_tx(|tx| {
            let word = require_live_word(tx, slug)?;
            tx.execute(
                "UPDATE words SET is_deleted = 1, updated_at = ?1 WHERE id = ?2",
                params![Utc::now(), word.id],
            )?;
            audit::log_change(
                tx,
                &ChangeRecord {
                    word_id: word.id,
                    user_id: actor,
                    action: ChangeAction::Deleted,
                    old_value: Some(word.word.as_str()),
                    new_value: None,
                    comment: "Word deleted",
                    change_type: ChangeType::Manual,
                },
            )?;
            let deleted = require_word(tx, word.id)?;
            audit::snapshot(tx, &deleted, actor)?;
            info!("Word {} soft-deleted", word.slug);
            Ok(())
        })
    }

    /// Moderate a word. `status` is the raw request value.
    pub fn change_status(
        &self,
        slug: &str,
        status: &str,
        actor: Option<i64>,
    ) -> DbResult<StatusChange> {
        let new: WordStatus = status
            .trim()
            .parse()
            .map_err(|_| DbError::Validation("Invalid status".into()))?;

        self.with_tx(|tx| {
            let word = require_live_word(tx, slug)?;
            let old = word.status;
            tx.execute(
                "UPDATE words SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![new.as_str(), Utc::now(), word.id],
            )?;

            let comment = format!("Status changed from {} to {}", old.label(), new.label());
            audit::log_change(
                tx,
                &ChangeRecord {
                    word_id: word.id,
                    user_id: actor,
                    action: ChangeAction::StatusChanged,
                    old_value: Some(old.as_str()),
                    new_value: Some(new.as_str()),
                    comment: &comment,
                    change_type: ChangeType::Manual,
                },
            )?;
            let updated = require_word(tx, word.id)?;
            audit::snapshot(tx, &updated, actor)?;
            Ok(StatusChange { old, new })
        })
    }

    /// Regenerate the slugs of every word that shares its slug with an
    /// older word. With `dry_run` nothing is written.
    pub fn repair_slugs(&self, dry_run: bool) -> DbResult<Vec<SlugFix>> {
        self.with_tx(|tx| {
            let mut stmt = tx.prepare(
                "SELECT w.id, w.word, l.code, w.slug, w.created_at
                 FROM words w JOIN languages l ON l.id = w.language_id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(SlugRow {
                        id: row.get(0)?,
                        word: row.get(1)?,
                        language: row.get(2)?,
                        slug: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let fixes = slug::plan_repairs(&rows);
            if !dry_run {
                for fix in &fixes {
                    tx.execute(
                        "UPDATE words SET slug = ?1, updated_at = ?2 WHERE id = ?3",
                        params![fix.new_slug, Utc::now(), fix.id],
                    )?;
                    info!("Slug of word {} changed: {} -> {}", fix.id, fix.old_slug, fix.new_slug);
                }
            }
            Ok(fixes)
        })
    }

    // -- Reads --

    pub fn get_word_by_slug(&self, slug: &str) -> DbResult<Option<Word>> {
        self.with_conn(|conn| find_word_by_slug(conn, slug))
    }

    pub fn list_words(&self, filter: &WordFilter, page: u32) -> DbResult<Page<WordSummary>> {
        self.with_conn(|conn| query_word_page(conn, filter, page))
    }

    pub fn count_words(&self, filter: &WordFilter) -> DbResult<u64> {
        self.with_conn(|conn| count_matching(conn, filter))
    }

    /// Word page plus the detail a reader sees. Unpublished words are only
    /// visible to elevated users.
    pub fn word_detail(
        &self,
        slug: &str,
        elevated: bool,
        display_language: &str,
    ) -> DbResult<WordDetailResponse> {
        self.with_conn(|conn| {
            let word = require_live_word(conn, slug)?;
            if !elevated && !word.is_published() {
                return Err(DbError::not_found("Word", slug));
            }

            let graph = TranslationGraph::load_around(conn, &[word.id])?;
            let mut translations = Vec::new();
            for edge in graph.outgoing(word.id) {
                let Some(target) = find_word(conn, edge.to_word_id)? else {
                    continue;
                };
                let visible = if elevated {
                    !target.is_deleted
                } else {
                    edge.status == WordStatus::Approved && target.is_published()
                };
                if visible {
                    translations.push(TranslationView {
                        id: edge.id,
                        to_word_id: target.id,
                        word: target.word,
                        slug: target.slug,
                        language: target.language,
                        meaning: target.meaning,
                        note: edge.note.clone(),
                        order: edge.order,
                        status: edge.status,
                    });
                }
            }

            let (likes, dislikes) = like_counts(conn, word.id)?;
            Ok(WordDetailResponse {
                tags: query_tag_labels(conn, word.id, display_language)?,
                examples: query_examples(conn, word.id)?,
                translations,
                likes,
                dislikes,
                word,
            })
        })
    }

    /// Autocomplete over every non-deleted word.
    pub fn suggest_words(&self, query: &str, language: Option<&str>) -> DbResult<Vec<Suggestion>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT w.id, w.word, w.meaning, l.code, COALESCE(c.code, '')
                 FROM words w
                 JOIN languages l ON l.id = w.language_id
                 LEFT JOIN categories c ON c.id = w.category_id
                 WHERE w.is_deleted = 0
                   AND instr(unicode_lower(w.word), ?1) > 0
                   AND (?2 IS NULL OR l.code = ?2)
                 ORDER BY unicode_lower(w.word), w.id
                 LIMIT ?3",
            )?;
            let rows = stmt
                .query_map(params![needle, language, SUGGESTION_LIMIT], |row| {
                    Ok(Suggestion {
                        id: row.get(0)?,
                        word: row.get(1)?,
                        meaning: row.get(2)?,
                        language: row.get(3)?,
                        category: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Does `word` exist in `language` (case-insensitive)? If so, list its
    /// translations; otherwise offer up to five similar words.
    pub fn check_translations(&self, word: &str, language: &str) -> DbResult<CheckTranslationsResponse> {
        let word = required(word, "Word")?;
        let language = required(language, "Language")?;
        let needle = word.to_lowercase();

        self.with_conn(|conn| {
            let exact: Option<(i64, String)> = conn
                .query_row(
                    "SELECT w.id, w.slug
                     FROM words w JOIN languages l ON l.id = w.language_id
                     WHERE w.is_deleted = 0 AND l.code = ?1 AND unicode_lower(w.word) = ?2
                     ORDER BY w.id
                     LIMIT 1",
                    params![language, needle],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            if let Some((id, slug)) = exact {
                let mut stmt = conn.prepare(
                    "SELECT l.code, w.word
                     FROM translations t
                     JOIN words w ON w.id = t.to_word_id
                     JOIN languages l ON l.id = w.language_id
                     WHERE t.from_word_id = ?1 AND w.is_deleted = 0
                     ORDER BY t.sort_order, t.id",
                )?;
                let translations = stmt
                    .query_map([id], |row| {
                        Ok(ExistingTranslation {
                            language: row.get(0)?,
                            word: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(CheckTranslationsResponse {
                    exists: true,
                    word_id: Some(id),
                    slug: Some(slug),
                    translations,
                    similar_words: Vec::new(),
                });
            }

            let mut stmt = conn.prepare(
                "SELECT w.word, w.slug
                 FROM words w JOIN languages l ON l.id = w.language_id
                 WHERE w.is_deleted = 0 AND l.code = ?1 AND instr(unicode_lower(w.word), ?2) > 0
                 ORDER BY unicode_lower(w.word), w.id
                 LIMIT ?3",
            )?;
            let similar_words = stmt
                .query_map(params![language, needle, SIMILAR_LIMIT], |row| {
                    Ok(SimilarWord {
                        word: row.get(0)?,
                        slug: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(CheckTranslationsResponse {
                exists: false,
                word_id: None,
                slug: None,
                translations: Vec::new(),
                similar_words,
            })
        })
    }

    /// Editor view: which words still lack an approved translation.
    pub fn word_translations_dashboard(
        &self,
        query: &WordTranslationsQuery,
    ) -> DbResult<WordTranslationsDashboard> {
        let mut base = WordFilter::all_non_deleted();
        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            base = base.search(q);
        }
        if let Some(lang) = query.source_lang.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            base = base.language(lang);
        }
        if let Some(id) = query.category.as_deref().and_then(|c| c.trim().parse().ok()) {
            base = base.category(id);
        }
        let listed = match query.status.as_deref().map(str::trim) {
            Some("translated") => base.clone().translated(true),
            Some("untranslated") => base.clone().translated(false),
            _ => base.clone(),
        };
        let page = parse_page(query.page.as_deref());

        self.with_conn(|conn| {
            let total_words = count_matching(conn, &base)?;
            let translated_words = count_matching(conn, &base.clone().translated(true))?;
            Ok(WordTranslationsDashboard {
                words: query_word_page(conn, &listed, page)?,
                total_words,
                translated_words,
                untranslated_words: total_words - translated_words,
            })
        })
    }
}

// -- Shared helpers --

pub(crate) fn word_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        id: row.get(0)?,
        word: row.get(1)?,
        slug: row.get(2)?,
        language_id: row.get(3)?,
        language: row.get(4)?,
        meaning: row.get(5)?,
        category_id: row.get(6)?,
        category: row.get(7)?,
        status: parse_column(row, 8)?,
        difficulty: parse_column(row, 9)?,
        pronunciation: row.get(10)?,
        is_deleted: row.get(11)?,
        created_by: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

pub(crate) fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WordSummary> {
    Ok(WordSummary {
        id: row.get(0)?,
        word: row.get(1)?,
        slug: row.get(2)?,
        language: row.get(3)?,
        category: row.get(4)?,
        status: parse_column(row, 5)?,
        difficulty: parse_column(row, 6)?,
        created_at: row.get(7)?,
    })
}

pub(crate) fn find_word(conn: &Connection, id: i64) -> DbResult<Option<Word>> {
    conn.query_row(&format!("{WORD_SELECT} WHERE w.id = ?1"), [id], word_from_row)
        .optional()
}

pub(crate) fn find_word_by_slug(conn: &Connection, slug: &str) -> DbResult<Option<Word>> {
    conn.query_row(&format!("{WORD_SELECT} WHERE w.slug = ?1"), [slug], word_from_row)
        .optional()
}

/// Find a word by its (text, language) key, deleted or not.
pub(crate) fn find_word_by_text(
    conn: &Connection,
    text: &str,
    language_id: i64,
) -> DbResult<Option<Word>> {
    conn.query_row(
        &format!("{WORD_SELECT} WHERE w.word = ?1 AND w.language_id = ?2"),
        params![text, language_id],
        word_from_row,
    )
    .optional()
}

pub(crate) fn require_word(conn: &Connection, id: i64) -> DbResult<Word> {
    find_word(conn, id)?.ok_or_else(|| DbError::not_found("Word", id))
}

pub(crate) fn require_word_by_slug(conn: &Connection, slug: &str) -> DbResult<Word> {
    find_word_by_slug(conn, slug)?.ok_or_else(|| DbError::not_found("Word", slug))
}

/// Like `require_word_by_slug`, but soft-deleted words count as missing.
pub(crate) fn require_live_word(conn: &Connection, slug: &str) -> DbResult<Word> {
    match find_word_by_slug(conn, slug)? {
        Some(word) if !word.is_deleted => Ok(word),
        _ => Err(DbError::not_found("Word", slug)),
    }
}

/// Validate, assign a slug, insert, tag and audit a new word.
pub(crate) fn insert_word(
    conn: &Connection,
    new: &NewWord<'_>,
    change_type: ChangeType,
    comment: &str,
) -> DbResult<Word> {
    validate_word(conn, new.word, new.meaning, new.language.id, None)?;
    ensure_category(conn, new.category_id)?;

    let text = new.word.trim();
    let slug = slug::assign_slug(
        None,
        text,
        &new.language.code,
        None,
        &WordSlugs {
            conn,
            exclude_id: None,
        },
    )?;
    let now = Utc::now();
    conn.execute(
        "INSERT INTO words
             (word, slug, language_id, meaning, category_id, status, difficulty,
              pronunciation, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            text,
            slug,
            new.language.id,
            new.meaning,
            new.category_id,
            new.status.as_str(),
            new.difficulty.as_str(),
            new.pronunciation.trim(),
            new.created_by,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    set_word_tags(conn, id, new.tags)?;

    let word = require_word(conn, id)?;
    audit::log_change(
        conn,
        &ChangeRecord {
            word_id: id,
            user_id: new.created_by,
            action: ChangeAction::Created,
            old_value: None,
            new_value: Some(word.word.as_str()),
            comment,
            change_type,
        },
    )?;
    audit::snapshot(conn, &word, new.created_by)?;
    debug!("Word {} created with slug {}", word.word, word.slug);
    Ok(word)
}

fn ensure_category(conn: &Connection, category_id: Option<i64>) -> DbResult<()> {
    match category_id {
        Some(id) if !entities::entity_exists(conn, CATEGORY, id)? => {
            Err(DbError::not_found("Category", id))
        }
        _ => Ok(()),
    }
}

/// Replace the tag set of a word.
fn set_word_tags(conn: &Connection, word_id: i64, tags: &[i64]) -> DbResult<()> {
    conn.execute("DELETE FROM word_tags WHERE word_id = ?1", [word_id])?;
    for &tag_id in tags {
        if !entities::entity_exists(conn, TAG, tag_id)? {
            return Err(DbError::not_found("Tag", tag_id));
        }
        conn.execute(
            "INSERT OR IGNORE INTO word_tags (word_id, tag_id) VALUES (?1, ?2)",
            [word_id, tag_id],
        )?;
    }
    Ok(())
}

/// Moving a word to another language must not make any of its translation
/// edges connect two words of one language.
fn ensure_language_change_allowed(
    conn: &Connection,
    word_id: i64,
    new_language_id: i64,
) -> DbResult<()> {
    let graph = TranslationGraph::load_around(conn, &[word_id])?;
    for neighbour in graph.neighbours(word_id) {
        let language_id: i64 = conn.query_row(
            "SELECT language_id FROM words WHERE id = ?1",
            [neighbour],
            |row| row.get(0),
        )?;
        if language_id == new_language_id {
            return Err(DbError::Validation(
                "Cannot change the language: the word has a translation in that language".into(),
            ));
        }
    }
    Ok(())
}

fn count_matching(conn: &Connection, filter: &WordFilter) -> DbResult<u64> {
    let (from, params) = filter.to_sql();
    let refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let total: i64 = conn.query_row(&format!("SELECT COUNT(*) {from}"), refs.as_slice(), |row| {
        row.get(0)
    })?;
    Ok(total as u64)
}

pub(crate) fn query_word_page(
    conn: &Connection,
    filter: &WordFilter,
    page: u32,
) -> DbResult<Page<WordSummary>> {
    let total = count_matching(conn, filter)?;
    let window = page_window(total, page, PAGE_SIZE);

    let (from, params) = filter.to_sql();
    let limit = window.limit as i64;
    let offset = window.offset as i64;
    let mut refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
    refs.push(&limit);
    refs.push(&offset);

    let sql = format!(
        "{SUMMARY_COLUMNS} {from} {order} LIMIT ? OFFSET ?",
        order = filter.order_by()
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(refs.as_slice(), summary_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page {
        items,
        page: window.page,
        num_pages: window.num_pages,
        page_size: PAGE_SIZE,
        total,
    })
}

fn query_tag_labels(
    conn: &Connection,
    word_id: i64,
    display_language: &str,
) -> DbResult<Vec<TagLabel>> {
    let mut stmt = conn.prepare("SELECT tag_id FROM word_tags WHERE word_id = ?1")?;
    let tag_ids = stmt
        .query_map([word_id], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut labels = Vec::with_capacity(tag_ids.len());
    for id in tag_ids {
        let tag = entities::require_entity(conn, TAG, id, display_language)?;
        labels.push(TagLabel {
            id: tag.id,
            code: tag.code,
            name: tag.name,
            display_mode: tag.display_mode,
        });
    }
    labels.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(labels)
}
