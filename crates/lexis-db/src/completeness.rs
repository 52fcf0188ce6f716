//! How completely categories, tags and interface strings are translated.
//!
//! The denominator is always the full language table, read once per call on
//! the same connection as the numerators. Entity figures are whole
//! percentages; per-language rollups keep one decimal.

use std::collections::HashSet;
use std::str::FromStr;

use lexis_types::api::{EntityCompleteness, KeyCompleteness, LanguageProgress, TranslationDashboard};
use lexis_types::models::{Language, ParseEnumError};
use rusqlite::{Connection, params};
use tracing::info;

use crate::queries::entities::{self, CATEGORY, EntitySchema, TAG};
use crate::queries::interface::{query_keys, upsert_value};
use crate::queries::languages::query_languages;
use crate::{Database, DbError, DbResult};

/// `translated / total` as a whole percentage. Zero languages means 0%.
pub fn entity_percentage(translated: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (translated as f64 / total as f64 * 100.0).round() as u32
}

/// `translated / total` as a percentage rounded to one decimal.
pub fn rollup_percentage(translated: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (translated as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Codes of the languages absent from `present`, in `languages` order.
pub fn missing_languages(languages: &[Language], present: &HashSet<i64>) -> Vec<String> {
    languages
        .iter()
        .filter(|l| !present.contains(&l.id))
        .map(|l| l.code.clone())
        .collect()
}

/// Stand-in text for an untranslated entity or key, easy to search for later.
pub fn placeholder(language: &str, code: &str) -> String {
    format!("[{language}] {code}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Category,
    Tag,
}

impl EntityKind {
    fn schema(self) -> EntitySchema {
        match self {
            EntityKind::Category => CATEGORY,
            EntityKind::Tag => TAG,
        }
    }
}

impl FromStr for EntityKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(EntityKind::Category),
            "tag" => Ok(EntityKind::Tag),
            other => Err(ParseEnumError {
                kind: "entity type",
                value: other.to_string(),
            }),
        }
    }
}

/// What a bulk fill covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillTarget {
    Categories,
    Tags,
    Interface,
}

impl FromStr for FillTarget {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "categories" => Ok(FillTarget::Categories),
            "tags" => Ok(FillTarget::Tags),
            "interface" => Ok(FillTarget::Interface),
            other => Err(ParseEnumError {
                kind: "fill target",
                value: other.to_string(),
            }),
        }
    }
}

impl Database {
    pub fn translation_dashboard(&self) -> DbResult<TranslationDashboard> {
        self.with_conn(|conn| {
            let languages = query_languages(conn)?;
            let categories = entity_stats(conn, CATEGORY, &languages)?;
            let tags = entity_stats(conn, TAG, &languages)?;
            let interface_keys = key_stats(conn, &languages)?;

            let fully = |stats: &[EntityCompleteness]| {
                stats
                    .iter()
                    .filter(|s| s.total > 0 && s.translated == s.total)
                    .count() as u32
            };
            let untranslated = |stats: &[EntityCompleteness]| {
                stats.iter().filter(|s| s.translated == 0).count() as u32
            };

            Ok(TranslationDashboard {
                total_categories: categories.len() as u32,
                total_tags: tags.len() as u32,
                total_languages: languages.len() as u32,
                fully_translated_categories: fully(categories.as_slice()),
                fully_translated_tags: fully(tags.as_slice()),
                untranslated_categories: untranslated(categories.as_slice()),
                untranslated_tags: untranslated(tags.as_slice()),
                languages,
                categories,
                tags,
                interface_keys,
            })
        })
    }

    /// Per-language share of category and tag names that exist.
    pub fn language_progress(&self) -> DbResult<Vec<LanguageProgress>> {
        self.with_conn(|conn| {
            let languages = query_languages(conn)?;
            let total_items = count(conn, "SELECT COUNT(*) FROM categories", None)?
                + count(conn, "SELECT COUNT(*) FROM tags", None)?;

            let mut progress = Vec::with_capacity(languages.len());
            for language in languages {
                let categories = count(
                    conn,
                    "SELECT COUNT(*) FROM category_translations WHERE language_id = ?1",
                    Some(language.id),
                )?;
                let tags = count(
                    conn,
                    "SELECT COUNT(*) FROM tag_translations WHERE language_id = ?1",
                    Some(language.id),
                )?;
                let interface = count(
                    conn,
                    "SELECT COUNT(*) FROM interface_translations
                     WHERE language_id = ?1 AND value <> ''",
                    Some(language.id),
                )?;
                let total_translations = categories + tags;
                progress.push(LanguageProgress {
                    code: language.code,
                    name: language.name,
                    category_translations: categories,
                    tag_translations: tags,
                    interface_translations: interface,
                    total_items,
                    total_translations,
                    percentage: rollup_percentage(total_translations, total_items),
                });
            }
            Ok(progress)
        })
    }

    pub fn entity_completeness(&self, kind: EntityKind, id: i64) -> DbResult<EntityCompleteness> {
        self.with_conn(|conn| {
            let languages = query_languages(conn)?;
            let code = entities::query_codes(conn, kind.schema())?
                .into_iter()
                .find(|(entity_id, _)| *entity_id == id)
                .map(|(_, code)| code)
                .ok_or_else(|| DbError::not_found(kind.schema().label, id))?;
            completeness_of(conn, kind.schema(), id, code, &languages)
        })
    }

    /// Placeholder names for one category or tag in every language it lacks.
    pub fn fill_missing(&self, kind: EntityKind, id: i64) -> DbResult<u32> {
        self.with_tx(|tx| {
            let schema = kind.schema();
            let languages = query_languages(tx)?;
            let code = entities::query_codes(tx, schema)?
                .into_iter()
                .find(|(entity_id, _)| *entity_id == id)
                .map(|(_, code)| code)
                .ok_or_else(|| DbError::not_found(schema.label, id))?;
            let created = fill_entity(tx, schema, id, &code, &languages)?;
            info!("Filled {} placeholder(s) for {} {}", created, schema.label, code);
            Ok(created)
        })
    }

    /// Placeholders for every gap of one kind, in a single transaction.
    pub fn bulk_fill(&self, target: FillTarget) -> DbResult<u32> {
        self.with_tx(|tx| {
            let languages = query_languages(tx)?;
            let created = match target {
                FillTarget::Categories => fill_all(tx, CATEGORY, &languages)?,
                FillTarget::Tags => fill_all(tx, TAG, &languages)?,
                FillTarget::Interface => {
                    let mut created = 0;
                    for key in query_keys(tx)? {
                        let present = translated_key_languages(tx, &key)?;
                        for language in languages.iter().filter(|l| !present.contains(&l.id)) {
                            upsert_value(tx, language.id, &key, &placeholder(&language.code, &key))?;
                            created += 1;
                        }
                    }
                    created
                }
            };
            info!("Bulk fill of {:?} created {} placeholder(s)", target, created);
            Ok(created)
        })
    }
}

fn count(conn: &Connection, sql: &str, id: Option<i64>) -> DbResult<u32> {
    let n: i64 = match id {
        Some(id) => conn.query_row(sql, [id], |row| row.get(0))?,
        None => conn.query_row(sql, [], |row| row.get(0))?,
    };
    Ok(n as u32)
}

fn completeness_of(
    conn: &Connection,
    schema: EntitySchema,
    id: i64,
    code: String,
    languages: &[Language],
) -> DbResult<EntityCompleteness> {
    let present = entities::translated_languages(conn, schema, id)?;
    let missing = missing_languages(languages, &present);
    let total = languages.len() as u32;
    let translated = total - missing.len() as u32;
    Ok(EntityCompleteness {
        id,
        code,
        total,
        translated,
        percentage: entity_percentage(translated, total),
        missing,
    })
}

fn entity_stats(
    conn: &Connection,
    schema: EntitySchema,
    languages: &[Language],
) -> DbResult<Vec<EntityCompleteness>> {
    entities::query_codes(conn, schema)?
        .into_iter()
        .map(|(id, code)| completeness_of(conn, schema, id, code, languages))
        .collect()
}

/// Languages with a non-empty value for `key`.
fn translated_key_languages(conn: &Connection, key: &str) -> DbResult<HashSet<i64>> {
    let mut stmt = conn.prepare(
        "SELECT language_id FROM interface_translations WHERE key = ?1 AND value <> ''",
    )?;
    let ids = stmt
        .query_map(params![key], |row| row.get(0))?
        .collect::<Result<HashSet<i64>, _>>()?;
    Ok(ids)
}

fn key_stats(conn: &Connection, languages: &[Language]) -> DbResult<Vec<KeyCompleteness>> {
    let total = languages.len() as u32;
    query_keys(conn)?
        .into_iter()
        .map(|key| {
            let present = translated_key_languages(conn, &key)?;
            let missing = missing_languages(languages, &present);
            let translated = total - missing.len() as u32;
            Ok(KeyCompleteness {
                key,
                total,
                translated,
                percentage: entity_percentage(translated, total),
                missing,
            })
        })
        .collect()
}

fn fill_entity(
    conn: &Connection,
    schema: EntitySchema,
    id: i64,
    code: &str,
    languages: &[Language],
) -> DbResult<u32> {
    let present = entities::translated_languages(conn, schema, id)?;
    let mut created = 0;
    for language in languages.iter().filter(|l| !present.contains(&l.id)) {
        entities::upsert_translation(
            conn,
            schema,
            id,
            language.id,
            &placeholder(&language.code, code),
            "",
        )?;
        created += 1;
    }
    Ok(created)
}

fn fill_all(conn: &Connection, schema: EntitySchema, languages: &[Language]) -> DbResult<u32> {
    let mut created = 0;
    for (id, code) in entities::query_codes(conn, schema)? {
        created += fill_entity(conn, schema, id, &code, languages)?;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(id: i64, code: &str) -> Language {
        Language {
            id,
            code: code.to_string(),
            name: code.to_uppercase(),
        }
    }

    #[test]
    fn percentages_round_consistently() {
        assert_eq!(entity_percentage(0, 0), 0);
        assert_eq!(entity_percentage(0, 4), 0);
        assert_eq!(entity_percentage(1, 3), 33);
        assert_eq!(entity_percentage(2, 3), 67);
        assert_eq!(entity_percentage(4, 4), 100);

        assert_eq!(rollup_percentage(0, 0), 0.0);
        assert_eq!(rollup_percentage(1, 3), 33.3);
        assert_eq!(rollup_percentage(2, 3), 66.7);
    }

    #[test]
    fn missing_is_the_set_difference() {
        let languages = vec![lang(1, "en"), lang(2, "kk"), lang(3, "ru")];
        let present: HashSet<i64> = [2].into_iter().collect();
        assert_eq!(missing_languages(&languages, &present), vec!["en", "ru"]);
    }

    #[test]
    fn placeholder_is_bracketed() {
        assert_eq!(placeholder("en", "animals"), "[en] animals");
    }

    #[test]
    fn targets_parse() {
        assert_eq!("tag".parse::<EntityKind>().unwrap(), EntityKind::Tag);
        assert_eq!("interface".parse::<FillTarget>().unwrap(), FillTarget::Interface);
        assert!("words".parse::<FillTarget>().is_err());
    }
}
