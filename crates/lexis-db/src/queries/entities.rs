//! Storage shared by categories and tags: both are a coded entity with a
//! slug and one localized name per language.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use lexis_types::api::{EntityTranslations, LocalizedText};
use lexis_types::models::DisplayMode;
use rusqlite::{Connection, params};
use tracing::debug;

use super::languages::{find_language, query_languages};
use super::{OptionalExt, required};
use crate::models::parse_column;
use crate::slug::{EntitySlugs, EntityTable, entity_slug};
use crate::{DbError, DbResult};

/// Table layout of one entity kind.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntitySchema {
    pub label: &'static str,
    pub table: &'static str,
    pub translations: &'static str,
    pub fk: &'static str,
    pub has_description: bool,
    pub has_display_mode: bool,
    /// `FROM ... WHERE` selecting the words that use entity `e`.
    pub usage: &'static str,
    pub slugs: EntityTable,
}

pub(crate) const CATEGORY: EntitySchema = EntitySchema {
    label: "Category",
    table: "categories",
    translations: "category_translations",
    fk: "category_id",
    has_description: true,
    has_display_mode: false,
    usage: "FROM words w WHERE w.category_id = e.id",
    slugs: EntityTable::Categories,
};

pub(crate) const TAG: EntitySchema = EntitySchema {
    label: "Tag",
    table: "tags",
    translations: "tag_translations",
    fk: "tag_id",
    has_description: false,
    has_display_mode: true,
    usage: "FROM word_tags wt JOIN words w ON w.id = wt.word_id WHERE wt.tag_id = e.id",
    slugs: EntityTable::Tags,
};

/// A category or tag as listed by the API.
#[derive(Debug, Clone)]
pub(crate) struct EntityRow {
    pub id: i64,
    pub code: String,
    pub slug: String,
    pub display_mode: DisplayMode,
    /// Name in the display language, else the first translation, else the code.
    pub name: String,
    /// Published words only.
    pub word_count: u64,
}

pub(crate) fn query_entities(
    conn: &Connection,
    schema: EntitySchema,
    display_language: &str,
    only_id: Option<i64>,
) -> DbResult<Vec<EntityRow>> {
    let display_mode = if schema.has_display_mode {
        "e.display_mode"
    } else {
        "'visible'"
    };
    let sql = format!(
        "SELECT e.id, e.code, e.slug, {display_mode},
                COALESCE(
                    (SELECT tr.name FROM {tr} tr JOIN languages dl ON dl.id = tr.language_id
                     WHERE tr.{fk} = e.id AND dl.code = ?1),
                    (SELECT tr.name FROM {tr} tr WHERE tr.{fk} = e.id ORDER BY tr.id LIMIT 1),
                    e.code),
                (SELECT COUNT(*) {usage} AND w.status = 'approved' AND w.is_deleted = 0)
         FROM {table} e
         WHERE ?2 IS NULL OR e.id = ?2
         ORDER BY e.code",
        tr = schema.translations,
        fk = schema.fk,
        usage = schema.usage,
        table = schema.table,
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![display_language, only_id], |row| {
            Ok(EntityRow {
                id: row.get(0)?,
                code: row.get(1)?,
                slug: row.get(2)?,
                display_mode: parse_column(row, 3)?,
                name: row.get(4)?,
                word_count: row.get::<_, i64>(5)? as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn require_entity(
    conn: &Connection,
    schema: EntitySchema,
    id: i64,
    display_language: &str,
) -> DbResult<EntityRow> {
    query_entities(conn, schema, display_language, Some(id))?
        .into_iter()
        .next()
        .ok_or_else(|| DbError::not_found(schema.label, id))
}

fn find_code(conn: &Connection, schema: EntitySchema, id: i64) -> DbResult<Option<String>> {
    conn.query_row(
        &format!("SELECT code FROM {} WHERE id = ?1", schema.table),
        [id],
        |row| row.get(0),
    )
    .optional()
}

fn require_code(conn: &Connection, schema: EntitySchema, id: i64) -> DbResult<String> {
    find_code(conn, schema, id)?.ok_or_else(|| DbError::not_found(schema.label, id))
}

fn ensure_code_free(
    conn: &Connection,
    schema: EntitySchema,
    code: &str,
    exclude_id: Option<i64>,
) -> DbResult<()> {
    let taken: bool = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE code = ?1 AND id IS NOT ?2)",
            schema.table
        ),
        params![code, exclude_id],
        |row| row.get(0),
    )?;
    if taken {
        return Err(DbError::Conflict(format!(
            "{} with code \"{code}\" already exists",
            schema.label
        )));
    }
    Ok(())
}

pub(crate) fn entity_exists(conn: &Connection, schema: EntitySchema, id: i64) -> DbResult<bool> {
    Ok(find_code(conn, schema, id)?.is_some())
}

/// Insert the entity and seed a translation with `name` in every language.
pub(crate) fn create_entity(
    conn: &Connection,
    schema: EntitySchema,
    code: &str,
    name: &str,
    description: &str,
    display_mode: DisplayMode,
) -> DbResult<i64> {
    let code = required(code, "Code")?;
    let name = required(name, "Name")?;
    ensure_code_free(conn, schema, code, None)?;

    let slug = entity_slug(
        code,
        schema.slugs,
        &EntitySlugs {
            conn,
            table: schema.slugs,
            exclude_id: None,
        },
    )?;
    let now = Utc::now();
    if schema.has_display_mode {
        conn.execute(
            &format!(
                "INSERT INTO {} (code, slug, display_mode, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                schema.table
            ),
            params![code, slug, display_mode.as_str(), now],
        )?;
    } else {
        conn.execute(
            &format!(
                "INSERT INTO {} (code, slug, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                schema.table
            ),
            params![code, slug, now],
        )?;
    }
    let id = conn.last_insert_rowid();

    for language in query_languages(conn)? {
        upsert_translation(conn, schema, id, language.id, name, description.trim())?;
    }

    debug!("{} {} created with slug {}", schema.label, code, slug);
    Ok(id)
}

/// Rename the code and, when `name` is given, every translation's name.
pub(crate) fn update_entity(
    conn: &Connection,
    schema: EntitySchema,
    id: i64,
    code: &str,
    name: &str,
    display_mode: Option<DisplayMode>,
) -> DbResult<()> {
    require_code(conn, schema, id)?;
    let code = required(code, "Code")?;
    ensure_code_free(conn, schema, code, Some(id))?;

    conn.execute(
        &format!(
            "UPDATE {} SET code = ?1, updated_at = ?2 WHERE id = ?3",
            schema.table
        ),
        params![code, Utc::now(), id],
    )?;
    if let Some(mode) = display_mode.filter(|_| schema.has_display_mode) {
        set_display_mode(conn, schema, id, mode)?;
    }

    let name = name.trim();
    if !name.is_empty() {
        conn.execute(
            &format!(
                "UPDATE {} SET name = ?1 WHERE {} = ?2",
                schema.translations, schema.fk
            ),
            params![name, id],
        )?;
    }
    Ok(())
}

/// Refuses while non-deleted words still use the entity.
pub(crate) fn delete_entity(conn: &Connection, schema: EntitySchema, id: i64) -> DbResult<()> {
    let code = require_code(conn, schema, id)?;
    let in_use: i64 = conn.query_row(
        &format!(
            "SELECT (SELECT COUNT(*) {} AND w.is_deleted = 0) FROM {} e WHERE e.id = ?1",
            schema.usage, schema.table
        ),
        [id],
        |row| row.get(0),
    )?;
    if in_use > 0 {
        return Err(DbError::Validation(format!(
            "Cannot delete {} \"{code}\": it is used by {in_use} word(s)",
            schema.label.to_lowercase()
        )));
    }

    conn.execute(&format!("DELETE FROM {} WHERE id = ?1", schema.table), [id])?;
    debug!("{} {} deleted", schema.label, code);
    Ok(())
}

fn set_display_mode(
    conn: &Connection,
    schema: EntitySchema,
    id: i64,
    mode: DisplayMode,
) -> DbResult<()> {
    conn.execute(
        &format!(
            "UPDATE {} SET display_mode = ?1, updated_at = ?2 WHERE id = ?3",
            schema.table
        ),
        params![mode.as_str(), Utc::now(), id],
    )?;
    Ok(())
}

pub(crate) fn upsert_translation(
    conn: &Connection,
    schema: EntitySchema,
    entity_id: i64,
    language_id: i64,
    name: &str,
    description: &str,
) -> DbResult<()> {
    if schema.has_description {
        conn.execute(
            &format!(
                "INSERT INTO {tr} ({fk}, language_id, name, description) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT({fk}, language_id)
                 DO UPDATE SET name = excluded.name, description = excluded.description",
                tr = schema.translations,
                fk = schema.fk
            ),
            params![entity_id, language_id, name, description],
        )?;
    } else {
        conn.execute(
            &format!(
                "INSERT INTO {tr} ({fk}, language_id, name) VALUES (?1, ?2, ?3)
                 ON CONFLICT({fk}, language_id) DO UPDATE SET name = excluded.name",
                tr = schema.translations,
                fk = schema.fk
            ),
            params![entity_id, language_id, name],
        )?;
    }
    Ok(())
}

pub(crate) fn entity_translations(
    conn: &Connection,
    schema: EntitySchema,
    id: i64,
) -> DbResult<EntityTranslations> {
    let code = require_code(conn, schema, id)?;
    let description = if schema.has_description {
        "tr.description"
    } else {
        "''"
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT l.code, tr.name, {description}
         FROM {tr} tr JOIN languages l ON l.id = tr.language_id
         WHERE tr.{fk} = ?1",
        tr = schema.translations,
        fk = schema.fk
    ))?;
    let translations = stmt
        .query_map([id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                LocalizedText {
                    name: row.get(1)?,
                    description: row.get(2)?,
                },
            ))
        })?
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    let display_mode = if schema.has_display_mode {
        Some(conn.query_row(
            &format!("SELECT display_mode FROM {} WHERE id = ?1", schema.table),
            [id],
            |row| parse_column::<DisplayMode>(row, 0),
        )?)
    } else {
        None
    };

    Ok(EntityTranslations {
        id,
        code,
        languages: query_languages(conn)?,
        translations,
        display_mode,
    })
}

/// Upsert every non-blank name; a blank name removes that language's row.
pub(crate) fn update_entity_translations(
    conn: &Connection,
    schema: EntitySchema,
    id: i64,
    values: &BTreeMap<String, LocalizedText>,
    display_mode: Option<DisplayMode>,
) -> DbResult<()> {
    require_code(conn, schema, id)?;

    for (code, text) in values {
        let language =
            find_language(conn, code)?.ok_or_else(|| DbError::not_found("Language", code))?;
        let name = text.name.trim();
        if name.is_empty() {
            conn.execute(
                &format!(
                    "DELETE FROM {} WHERE {} = ?1 AND language_id = ?2",
                    schema.translations, schema.fk
                ),
                params![id, language.id],
            )?;
        } else {
            upsert_translation(conn, schema, id, language.id, name, text.description.trim())?;
        }
    }

    if let Some(mode) = display_mode.filter(|_| schema.has_display_mode) {
        set_display_mode(conn, schema, id, mode)?;
    }
    Ok(())
}

/// `(id, code)` of every entity of this kind, ordered by code.
pub(crate) fn query_codes(conn: &Connection, schema: EntitySchema) -> DbResult<Vec<(i64, String)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, code FROM {} ORDER BY code",
        schema.table
    ))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Language ids that have a translation row for entity `id`.
pub(crate) fn translated_languages(
    conn: &Connection,
    schema: EntitySchema,
    id: i64,
) -> DbResult<HashSet<i64>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT language_id FROM {} WHERE {} = ?1",
        schema.translations, schema.fk
    ))?;
    let ids = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<Result<HashSet<i64>, _>>()?;
    Ok(ids)
}

/// Parse an optional display mode string from a request.
pub(crate) fn parse_display_mode(raw: Option<&str>) -> DbResult<Option<DisplayMode>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => text
            .parse()
            .map(Some)
            .map_err(|e: lexis_types::models::ParseEnumError| DbError::Validation(e.to_string())),
        None => Ok(None),
    }
}
