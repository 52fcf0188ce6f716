//! Composable word-listing predicates and page arithmetic.

use chrono::{DateTime, Duration, Utc};
use lexis_types::api::WordListQuery;
use lexis_types::models::Difficulty;
use rusqlite::ToSql;

pub const PAGE_SIZE: u32 = 20;
pub const DEFAULT_RECENT_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Approved and not soft-deleted.
    #[default]
    Published,
    /// Every word that is not soft-deleted. Elevated users only.
    AllNonDeleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Word,
    Category,
    CreatedAt,
}

/// AND-combined word predicates. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct WordFilter {
    pub visibility: Visibility,
    pub language: Option<String>,
    pub category_id: Option<i64>,
    pub tag: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub search: Option<String>,
    /// Has (or lacks) an approved outgoing translation.
    pub translated: Option<bool>,
    pub created_after: Option<DateTime<Utc>>,
    pub sort: SortKey,
    pub descending: bool,
}

impl WordFilter {
    pub fn published() -> Self {
        Self::default()
    }

    pub fn all_non_deleted() -> Self {
        Self {
            visibility: Visibility::AllNonDeleted,
            ..Self::default()
        }
    }

    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.language = Some(code.into());
        self
    }

    pub fn category(mut self, id: i64) -> Self {
        self.category_id = Some(id);
        self
    }

    pub fn tag(mut self, code: impl Into<String>) -> Self {
        self.tag = Some(code.into());
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn translated(mut self, translated: bool) -> Self {
        self.translated = Some(translated);
        self
    }

    pub fn recent_days(mut self, days: i64) -> Self {
        self.created_after = Some(Utc::now() - Duration::days(days));
        self
    }

    pub fn sort_by(mut self, key: SortKey, descending: bool) -> Self {
        self.sort = key;
        self.descending = descending;
        self
    }

    /// Build a filter from raw query-string values. Malformed values are
    /// ignored rather than rejected.
    pub fn from_query(query: &WordListQuery, elevated: bool) -> Self {
        let mut filter = if elevated {
            Self::all_non_deleted()
        } else {
            Self::published()
        };

        if let Some(q) = non_blank(&query.q) {
            filter = filter.search(q);
        }
        if let Some(lang) = non_blank(&query.lang) {
            filter = filter.language(lang);
        }
        if let Some(id) = non_blank(&query.category).and_then(|c| c.parse().ok()) {
            filter = filter.category(id);
        }
        if let Some(tag) = non_blank(&query.tag) {
            filter = filter.tag(tag);
        }
        if let Some(level) = non_blank(&query.difficulty).and_then(|d| d.parse().ok()) {
            filter = filter.difficulty(level);
        }
        if let Some(flag) = non_blank(&query.translated).and_then(parse_flag) {
            filter = filter.translated(flag);
        }
        if let Some(days) = query.recent_days.as_deref() {
            let days = days
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|d| *d > 0)
                .unwrap_or(DEFAULT_RECENT_DAYS);
            filter = filter.recent_days(days);
        }

        let sort = match non_blank(&query.sort) {
            Some("category") => SortKey::Category,
            Some("created_at") | Some("date") => SortKey::CreatedAt,
            _ => SortKey::Word,
        };
        let descending = matches!(non_blank(&query.order), Some("desc"));
        filter.sort_by(sort, descending)
    }

    /// `FROM ... WHERE ...` for the `words w` / `languages l` /
    /// `categories c` join, with its positional parameters.
    pub fn to_sql(&self) -> (String, Vec<Box<dyn ToSql>>) {
        let mut sql = String::from(
            "FROM words w
             JOIN languages l ON l.id = w.language_id
             LEFT JOIN categories c ON c.id = w.category_id
             WHERE w.is_deleted = 0",
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if self.visibility == Visibility::Published {
            sql.push_str(" AND w.status = 'approved'");
        }
        if let Some(code) = &self.language {
            sql.push_str(" AND l.code = ?");
            params.push(Box::new(code.clone()));
        }
        if let Some(id) = self.category_id {
            sql.push_str(" AND w.category_id = ?");
            params.push(Box::new(id));
        }
        if let Some(code) = &self.tag {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM word_tags wt JOIN tags t ON t.id = wt.tag_id
                              WHERE wt.word_id = w.id AND t.code = ?)",
            );
            params.push(Box::new(code.clone()));
        }
        if let Some(level) = self.difficulty {
            sql.push_str(" AND w.difficulty = ?");
            params.push(Box::new(level.as_str()));
        }
        if let Some(text) = &self.search {
            let needle = text.to_lowercase();
            sql.push_str(
                " AND (instr(unicode_lower(w.word), ?) > 0 OR instr(unicode_lower(w.meaning), ?) > 0)",
            );
            params.push(Box::new(needle.clone()));
            params.push(Box::new(needle));
        }
        if let Some(translated) = self.translated {
            sql.push_str(if translated { " AND EXISTS" } else { " AND NOT EXISTS" });
            sql.push_str(
                " (SELECT 1 FROM translations tr
                   WHERE tr.from_word_id = w.id AND tr.status = 'approved')",
            );
        }
        if let Some(after) = self.created_after {
            sql.push_str(" AND w.created_at >= ?");
            params.push(Box::new(after));
        }

        (sql, params)
    }

    pub fn order_by(&self) -> String {
        let dir = if self.descending { "DESC" } else { "ASC" };
        match self.sort {
            SortKey::Word => format!("ORDER BY unicode_lower(w.word) {dir}, w.word {dir}, w.id {dir}"),
            SortKey::Category => format!(
                "ORDER BY c.code {dir}, unicode_lower(w.word) {dir}, w.id {dir}"
            ),
            SortKey::CreatedAt => format!("ORDER BY w.created_at {dir}, w.id {dir}"),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Requested page number: missing, non-numeric or < 1 means page 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|r| r.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .map(|p| p.min(u32::MAX as i64) as u32)
        .unwrap_or(1)
}

/// Resolved slice of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub num_pages: u32,
    pub offset: u64,
    pub limit: u32,
}

/// Clamp `requested` into `1..=num_pages`. An empty listing still has one page.
pub fn page_window(total: u64, requested: u32, page_size: u32) -> PageWindow {
    let num_pages = total.div_ceil(page_size as u64).max(1);
    let num_pages = u32::try_from(num_pages).unwrap_or(u32::MAX);
    let page = requested.clamp(1, num_pages);
    PageWindow {
        page,
        num_pages,
        offset: (page as u64 - 1) * page_size as u64,
        limit: page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_parsing_falls_back_to_first() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-4")), 1);
        assert_eq!(parse_page(Some(" 3 ")), 3);
    }

    #[test]
    fn window_clamps_to_last_page() {
        let w = page_window(45, 9, PAGE_SIZE);
        assert_eq!(w.num_pages, 3);
        assert_eq!(w.page, 3);
        assert_eq!(w.offset, 40);

        let empty = page_window(0, 5, PAGE_SIZE);
        assert_eq!(empty.num_pages, 1);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.offset, 0);
    }

    #[test]
    fn query_values_degrade_to_no_filter() {
        let query = WordListQuery {
            q: Some("  ".into()),
            category: Some("animals".into()),
            difficulty: Some("impossible".into()),
            translated: Some("maybe".into()),
            ..Default::default()
        };
        let filter = WordFilter::from_query(&query, false);
        assert_eq!(filter.visibility, Visibility::Published);
        assert!(filter.search.is_none());
        assert!(filter.category_id.is_none());
        assert!(filter.difficulty.is_none());
        assert!(filter.translated.is_none());
        assert_eq!(filter.sort, SortKey::Word);
    }

    #[test]
    fn query_values_map_to_predicates() {
        let query = WordListQuery {
            q: Some("Cat".into()),
            lang: Some("en".into()),
            category: Some("4".into()),
            difficulty: Some("easy".into()),
            translated: Some("no".into()),
            recent_days: Some("x".into()),
            sort: Some("created_at".into()),
            order: Some("desc".into()),
            ..Default::default()
        };
        let filter = WordFilter::from_query(&query, true);
        assert_eq!(filter.visibility, Visibility::AllNonDeleted);
        assert_eq!(filter.search.as_deref(), Some("Cat"));
        assert_eq!(filter.language.as_deref(), Some("en"));
        assert_eq!(filter.category_id, Some(4));
        assert_eq!(filter.difficulty, Some(Difficulty::Easy));
        assert_eq!(filter.translated, Some(false));
        assert!(filter.created_after.is_some());
        assert_eq!(filter.sort, SortKey::CreatedAt);
        assert!(filter.descending);
    }

    #[test]
    fn sql_has_one_param_per_placeholder() {
        let filter = WordFilter::published()
            .language("en")
            .tag("noun")
            .search("cat")
            .translated(true)
            .recent_days(7);
        let (sql, params) = filter.to_sql();
        assert_eq!(sql.matches('?').count(), params.len());
        assert!(sql.contains("w.status = 'approved'"));
        assert!(sql.contains("unicode_lower(w.meaning)"));
    }
}
