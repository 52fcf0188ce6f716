use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    ChangeLogEntry, Difficulty, DisplayMode, Example, HistoryEntry, Language, Word, WordStatus,
};

// -- JWT Claims --

/// Bearer token claims. `elevated` is true for staff and moderators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub elevated: bool,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub preferred_language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub user_id: i64,
    pub username: String,
    pub elevated: bool,
    pub token: String,
}

// -- Generic --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SiteInfo {
    pub header: String,
    pub title: String,
    pub index_title: String,
}

/// One page of a listing. Pages are 1-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub num_pages: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

// -- Languages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLanguageRequest {
    pub code: String,
    pub name: String,
}

// -- Words --

/// Raw query string of the word listing. Values stay strings so that
/// malformed input degrades to "no filter" instead of a rejected request.
#[derive(Debug, Default, Deserialize)]
pub struct WordListQuery {
    pub q: Option<String>,
    pub lang: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub difficulty: Option<String>,
    /// `yes` / `no`: has an approved outgoing translation.
    pub translated: Option<String>,
    pub recent_days: Option<String>,
    /// `word` (default), `category`, `created_at`.
    pub sort: Option<String>,
    /// `asc` (default) or `desc`.
    pub order: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordSummary {
    pub id: i64,
    pub word: String,
    pub slug: String,
    pub language: String,
    pub category: Option<String>,
    pub status: WordStatus,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
}

/// Body of word create and edit requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WordPayload {
    pub word: String,
    pub meaning: String,
    /// Language code.
    pub language: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub status: Option<WordStatus>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub pronunciation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagLabel {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub display_mode: DisplayMode,
}

/// An outgoing translation edge joined with its target word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationView {
    pub id: i64,
    pub to_word_id: i64,
    pub word: String,
    pub slug: String,
    pub language: String,
    pub meaning: String,
    pub note: String,
    pub order: i64,
    pub status: WordStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WordDetailResponse {
    pub word: Word,
    pub tags: Vec<TagLabel>,
    pub translations: Vec<TranslationView>,
    pub examples: Vec<Example>,
    pub likes: u64,
    pub dislikes: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusChangeRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusChangeResponse {
    pub success: bool,
    pub new_status: WordStatus,
    pub new_status_display: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WordHistoryResponse {
    pub changes: Vec<ChangeLogEntry>,
    pub snapshots: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExampleRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LikeRequest {
    pub is_like: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub likes: u64,
    pub dislikes: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavouriteResponse {
    pub favourited: bool,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub q: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: i64,
    pub word: String,
    pub meaning: String,
    pub language: String,
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckTranslationsQuery {
    pub word: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExistingTranslation {
    pub language: String,
    pub word: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarWord {
    pub word: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckTranslationsResponse {
    pub exists: bool,
    pub word_id: Option<i64>,
    pub slug: Option<String>,
    pub translations: Vec<ExistingTranslation>,
    pub similar_words: Vec<SimilarWord>,
}

// -- Translation edges --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTranslationRequest {
    pub to_word_id: i64,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub status: Option<WordStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTranslationRequest {
    pub note: Option<String>,
    pub order: Option<i64>,
    pub status: Option<WordStatus>,
}

/// Target language code -> translated text.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiTranslateRequest {
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkTranslateItem {
    pub word_id: i64,
    pub language: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkTranslateRequest {
    pub items: Vec<BulkTranslateItem>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateOutcome {
    pub created_words: u32,
    pub created_translations: u32,
    /// Edges that were already there and were left unchanged.
    pub existing_translations: u32,
}

/// Words to prefill in the bulk translation tool.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuggestTranslationsRequest {
    pub word_ids: Vec<i64>,
    pub target_languages: Vec<String>,
}

/// Where a prefilled text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// An approved translation already in the graph.
    Approved,
    /// A target-language word sharing the first letters, marked `[SIMILAR]`.
    Similar,
    /// Nothing found: an `[AUTO]` stand-in.
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSuggestion {
    pub word_id: i64,
    pub language: String,
    pub text: String,
    pub source: SuggestionSource,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestTranslationsResponse {
    pub suggestions: Vec<TranslationSuggestion>,
}

#[derive(Debug, Deserialize)]
pub struct WordTranslationsQuery {
    pub q: Option<String>,
    pub source_lang: Option<String>,
    pub category: Option<String>,
    /// `translated` or `untranslated`.
    pub status: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WordTranslationsDashboard {
    pub words: Page<WordSummary>,
    pub total_words: u64,
    pub translated_words: u64,
    pub untranslated_words: u64,
}

// -- Categories & tags --

/// `?lang=` selects the language of display names.
#[derive(Debug, Default, Deserialize)]
pub struct DisplayQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub code: String,
    pub slug: String,
    pub name: String,
    pub word_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_mode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: i64,
    pub code: String,
    pub slug: String,
    pub name: String,
    pub display_mode: DisplayMode,
    pub word_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Per-language names of one category or tag, keyed by language code.
#[derive(Debug, Serialize, Deserialize)]
pub struct EntityTranslations {
    pub id: i64,
    pub code: String,
    pub languages: Vec<Language>,
    pub translations: BTreeMap<String, LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<DisplayMode>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEntityTranslationsRequest {
    pub translations: BTreeMap<String, LocalizedText>,
    #[serde(default)]
    pub display_mode: Option<String>,
}

/// key -> language code -> value. Missing cells are empty strings.
#[derive(Debug, Serialize, Deserialize)]
pub struct InterfaceGrid {
    pub languages: Vec<Language>,
    pub keys: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateInterfaceRequest {
    pub values: BTreeMap<String, BTreeMap<String, String>>,
}

// -- Completeness --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCompleteness {
    pub id: i64,
    pub code: String,
    pub total: u32,
    pub translated: u32,
    pub percentage: u32,
    pub missing: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyCompleteness {
    pub key: String,
    pub total: u32,
    pub translated: u32,
    pub percentage: u32,
    pub missing: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationDashboard {
    pub languages: Vec<Language>,
    pub categories: Vec<EntityCompleteness>,
    pub tags: Vec<EntityCompleteness>,
    pub interface_keys: Vec<KeyCompleteness>,
    pub total_categories: u32,
    pub total_tags: u32,
    pub total_languages: u32,
    pub fully_translated_categories: u32,
    pub fully_translated_tags: u32,
    pub untranslated_categories: u32,
    pub untranslated_tags: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageProgress {
    pub code: String,
    pub name: String,
    pub category_translations: u32,
    pub tag_translations: u32,
    pub interface_translations: u32,
    pub total_items: u32,
    pub total_translations: u32,
    pub percentage: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FillMissingRequest {
    /// `category` or `tag`.
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkFillRequest {
    /// `categories`, `tags` or `interface`.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FillResponse {
    pub success: bool,
    pub created_count: u32,
    pub message: String,
}
