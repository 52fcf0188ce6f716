//! URL-safe identifiers for words, categories and tags.
//!
//! Word slugs look like `<base>-<lang>` where `<base>` is the transliterated,
//! lowercased word text. Collisions are resolved with a counter, then a
//! timestamp, then a timestamp plus a random number, so generation always
//! yields a slug. The only error that can come back is the registry's own
//! (a failed existence query).

use std::collections::HashSet;
use std::convert::Infallible;

use chrono::Utc;
use rand::Rng;
use rusqlite::{Connection, params};

use crate::models::SlugRow;

pub const MAX_WORD_SLUG_LEN: usize = 150;
pub const MAX_ENTITY_SLUG_LEN: usize = 100;
pub const MAX_COUNTER_ATTEMPTS: u32 = 100;

/// Answers "is this slug already used by some other row?".
pub trait SlugRegistry {
    type Error;

    fn is_taken(&self, slug: &str) -> Result<bool, Self::Error>;
}

impl SlugRegistry for HashSet<String> {
    type Error = Infallible;

    fn is_taken(&self, slug: &str) -> Result<bool, Infallible> {
        Ok(self.contains(slug))
    }
}

/// Slugs of the `words` table, ignoring the row being saved.
pub struct WordSlugs<'a> {
    pub conn: &'a Connection,
    pub exclude_id: Option<i64>,
}

impl SlugRegistry for WordSlugs<'_> {
    type Error = rusqlite::Error;

    fn is_taken(&self, slug: &str) -> rusqlite::Result<bool> {
        self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM words WHERE slug = ?1 AND id IS NOT ?2)",
            params![slug, self.exclude_id],
            |row| row.get(0),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityTable {
    Categories,
    Tags,
}

impl EntityTable {
    fn table(self) -> &'static str {
        match self {
            EntityTable::Categories => "categories",
            EntityTable::Tags => "tags",
        }
    }

    /// Base used when a code has nothing left after normalization.
    pub fn fallback(self) -> &'static str {
        match self {
            EntityTable::Categories => "category",
            EntityTable::Tags => "tag",
        }
    }
}

/// Slugs of the categories or tags table, ignoring the row being saved.
pub struct EntitySlugs<'a> {
    pub conn: &'a Connection,
    pub table: EntityTable,
    pub exclude_id: Option<i64>,
}

impl SlugRegistry for EntitySlugs<'_> {
    type Error = rusqlite::Error;

    fn is_taken(&self, slug: &str) -> rusqlite::Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE slug = ?1 AND id IS NOT ?2)",
            self.table.table()
        );
        self.conn
            .query_row(&sql, params![slug, self.exclude_id], |row| row.get(0))
    }
}

/// Transliterate to ASCII and reduce to `[a-z0-9_-]`, with runs of
/// whitespace and hyphens collapsed to one hyphen.
pub fn normalize(text: &str) -> String {
    let ascii = deunicode::deunicode_with_tofu(text, "");
    let mut out = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for ch in ascii.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch);
        } else if ch == '-' || ch.is_whitespace() {
            pending_hyphen = true;
        }
    }

    out.trim_matches(|c| c == '-' || c == '_').to_string()
}

struct SlugShape {
    base: String,
    suffix: String,
    fallback: String,
    max_len: usize,
}

impl SlugShape {
    /// `base + suffix + extra`, cutting the base so the whole fits `max_len`.
    fn compose(&self, extra: &str) -> String {
        let tail = self.suffix.len() + extra.len();
        if tail < self.max_len {
            let room = self.max_len - tail;
            let base = if self.base.len() > room {
                self.base
                    .get(..room)
                    .unwrap_or(&self.base)
                    .trim_end_matches(['-', '_'])
            } else {
                self.base.as_str()
            };
            if !base.is_empty() {
                return format!("{base}{}{extra}", self.suffix);
            }
        }

        let mut slug = format!("{}{}", self.fallback, self.suffix);
        slug.truncate(self.max_len);
        slug
    }

    fn resolve<R: SlugRegistry>(
        &self,
        registry: &R,
        now: i64,
        rng: &mut impl Rng,
    ) -> Result<String, R::Error> {
        let candidate = self.compose("");
        if !registry.is_taken(&candidate)? {
            return Ok(candidate);
        }

        for counter in 1..=MAX_COUNTER_ATTEMPTS {
            let candidate = self.compose(&format!("-{counter}"));
            if !registry.is_taken(&candidate)? {
                return Ok(candidate);
            }
        }

        let stamped = self.compose(&format!("-{now}"));
        if !registry.is_taken(&stamped)? {
            return Ok(stamped);
        }

        let salt: u32 = rng.random_range(1000..=9999);
        Ok(self.compose(&format!("-{now}-{salt}")))
    }
}

fn word_shape(text: &str, language: &str, id: Option<i64>) -> SlugShape {
    let fallback = match id {
        Some(id) => format!("word-{id}"),
        None => "word-new".to_string(),
    };
    let mut base = normalize(text);
    if base.is_empty() {
        base = fallback.clone();
    }
    let language = normalize(language);
    SlugShape {
        base,
        suffix: if language.is_empty() {
            String::new()
        } else {
            format!("-{language}")
        },
        fallback,
        max_len: MAX_WORD_SLUG_LEN,
    }
}

/// Fresh slug for a word, unique within `registry`.
pub fn word_slug<R: SlugRegistry>(
    text: &str,
    language: &str,
    id: Option<i64>,
    registry: &R,
) -> Result<String, R::Error> {
    word_shape(text, language, id).resolve(registry, Utc::now().timestamp(), &mut rand::rng())
}

/// Keeps an already assigned slug, otherwise generates one.
pub fn assign_slug<R: SlugRegistry>(
    current: Option<&str>,
    text: &str,
    language: &str,
    id: Option<i64>,
    registry: &R,
) -> Result<String, R::Error> {
    match current {
        Some(slug) if !slug.is_empty() => Ok(slug.to_string()),
        _ => word_slug(text, language, id, registry),
    }
}

/// Slug for a category or tag code: no language suffix, at most 100 chars.
pub fn entity_slug<R: SlugRegistry>(
    code: &str,
    table: EntityTable,
    registry: &R,
) -> Result<String, R::Error> {
    let fallback = table.fallback().to_string();
    let mut base = normalize(code);
    if base.is_empty() {
        base = fallback.clone();
    }
    let shape = SlugShape {
        base,
        suffix: String::new(),
        fallback,
        max_len: MAX_ENTITY_SLUG_LEN,
    };
    shape.resolve(registry, Utc::now().timestamp(), &mut rand::rng())
}

/// A duplicate slug and its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugFix {
    pub id: i64,
    pub word: String,
    pub language: String,
    pub old_slug: String,
    pub new_slug: String,
}

/// Plan the repair of duplicate slugs.
///
/// Rows are grouped by slug and ordered by creation time; the oldest row of
/// each group keeps its slug and every later row gets a regenerated one that
/// is unique against all slugs seen so far.
pub fn plan_repairs(rows: &[SlugRow]) -> Vec<SlugFix> {
    let mut ordered: Vec<&SlugRow> = rows.iter().collect();
    ordered.sort_by(|a, b| {
        a.slug
            .cmp(&b.slug)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    let mut taken: HashSet<String> = rows.iter().map(|r| r.slug.clone()).collect();
    let now = Utc::now().timestamp();
    let mut rng = rand::rng();
    let mut fixes = Vec::new();
    let mut previous: Option<&str> = None;

    for row in ordered {
        if previous == Some(row.slug.as_str()) {
            let new_slug = match word_shape(&row.word, &row.language, Some(row.id))
                .resolve(&taken, now, &mut rng)
            {
                Ok(slug) => slug,
                Err(never) => match never {},
            };
            taken.insert(new_slug.clone());
            fixes.push(SlugFix {
                id: row.id,
                word: row.word.clone(),
                language: row.language.clone(),
                old_slug: row.slug.clone(),
                new_slug,
            });
        }
        previous = Some(row.slug.as_str());
    }

    fixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn taken(slugs: &[&str]) -> HashSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_transliterates_and_collapses() {
        assert_eq!(normalize("дом"), "dom");
        assert_eq!(normalize("  Hello,  World -- again "), "hello-world-again");
        assert_eq!(normalize("__don't__"), "dont");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn cyrillic_word_gets_language_suffix() {
        let slug = word_slug("дом", "ru", None, &HashSet::new()).unwrap();
        assert_eq!(slug, "dom-ru");
    }

    #[test]
    fn collision_appends_counter() {
        let slug = word_slug("Дом", "ru", None, &taken(&["dom-ru"])).unwrap();
        assert_eq!(slug, "dom-ru-1");

        let slug = word_slug("дом", "ru", None, &taken(&["dom-ru", "dom-ru-1"])).unwrap();
        assert_eq!(slug, "dom-ru-2");
    }

    #[test]
    fn language_suffix_is_normalized() {
        let none = HashSet::new();
        assert_eq!(word_slug("casa", "pt BR", None, &none).unwrap(), "casa-pt-br");
        assert_eq!(word_slug("cat", "EN", None, &none).unwrap(), "cat-en");
        assert_eq!(word_slug("cat", "a/b?c", None, &none).unwrap(), "cat-abc");
    }

    #[test]
    fn empty_base_falls_back_to_id() {
        assert_eq!(word_slug("!!!", "en", Some(7), &HashSet::new()).unwrap(), "word-7-en");
        assert_eq!(word_slug("", "en", None, &HashSet::new()).unwrap(), "word-new-en");
    }

    #[test]
    fn long_text_keeps_language_and_counter() {
        let text = "a".repeat(300);
        let slug = word_slug(&text, "en", None, &HashSet::new()).unwrap();
        assert_eq!(slug.len(), MAX_WORD_SLUG_LEN);
        assert!(slug.ends_with("-en"));

        let slug = word_slug(&text, "en", None, &taken(&[slug.as_str()])).unwrap();
        assert!(slug.len() <= MAX_WORD_SLUG_LEN);
        assert!(slug.ends_with("-en-1"));
    }

    #[test]
    fn exhausted_counters_fall_back_to_timestamp_then_random() {
        let mut used = taken(&["x-en"]);
        for counter in 1..=MAX_COUNTER_ATTEMPTS {
            used.insert(format!("x-en-{counter}"));
        }
        let shape = word_shape("x", "en", None);
        let mut rng = rand::rng();

        let slug = shape.resolve(&used, 1_700_000_000, &mut rng).unwrap();
        assert_eq!(slug, "x-en-1700000000");

        used.insert(slug);
        let slug = shape.resolve(&used, 1_700_000_000, &mut rng).unwrap();
        let salt: u32 = slug
            .strip_prefix("x-en-1700000000-")
            .unwrap()
            .parse()
            .unwrap();
        assert!((1000..=9999).contains(&salt));
    }

    #[test]
    fn assign_keeps_existing_slug() {
        let slug = assign_slug(Some("custom-ru"), "дом", "ru", Some(1), &taken(&["custom-ru"]));
        assert_eq!(slug.unwrap(), "custom-ru");

        let slug = assign_slug(None, "дом", "ru", Some(1), &HashSet::new());
        assert_eq!(slug.unwrap(), "dom-ru");
    }

    #[test]
    fn entity_slug_has_no_language_suffix() {
        let slug = entity_slug("Wild Animals", EntityTable::Categories, &HashSet::new()).unwrap();
        assert_eq!(slug, "wild-animals");

        let slug = entity_slug("wild animals", EntityTable::Categories, &taken(&["wild-animals"]));
        assert_eq!(slug.unwrap(), "wild-animals-1");

        let slug = entity_slug("???", EntityTable::Tags, &HashSet::new()).unwrap();
        assert_eq!(slug, "tag");
    }

    #[test]
    fn repair_keeps_oldest_and_renames_the_rest() {
        let at = |secs| Utc.timestamp_opt(secs, 0).unwrap();
        let row = |id, word: &str, slug: &str, created| SlugRow {
            id,
            word: word.to_string(),
            language: "ru".to_string(),
            slug: slug.to_string(),
            created_at: at(created),
        };
        let rows = vec![
            row(3, "ДОМ", "dom-ru", 300),
            row(1, "дом", "dom-ru", 100),
            row(2, "Дом", "dom-ru", 200),
            row(4, "кот", "kot-ru", 100),
        ];

        let fixes = plan_repairs(&rows);
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[0].id, 2);
        assert_eq!(fixes[0].new_slug, "dom-ru-1");
        assert_eq!(fixes[1].id, 3);
        assert_eq!(fixes[1].new_slug, "dom-ru-2");
    }

    #[test]
    fn repair_of_unique_slugs_is_empty() {
        let rows = vec![SlugRow {
            id: 1,
            word: "cat".into(),
            language: "en".into(),
            slug: "cat-en".into(),
            created_at: Utc::now(),
        }];
        assert!(plan_repairs(&rows).is_empty());
    }
}
