use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A string did not name a known variant of one of the dictionary enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a lowercase string-backed enum with `as_str`, `Display` and `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal, $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }

            /// Human-readable label for dashboards and messages.
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Editorial state shared by words and translation edges.
    #[derive(Default)]
    WordStatus, "status" {
        #[default]
        Pending => "pending", "Pending review",
        Approved => "approved", "Published",
        Rejected => "rejected", "Rejected",
    }
}

string_enum! {
    #[derive(Default)]
    Difficulty, "difficulty" {
        #[default]
        None => "none", "No level",
        Hidden => "hidden", "Not shown",
        Easy => "easy", "Easy",
        Medium => "medium", "Medium",
        Hard => "hard", "Hard",
    }
}

string_enum! {
    #[derive(Default)]
    DisplayMode, "display mode" {
        #[default]
        Visible => "visible", "Visible",
        Hidden => "hidden", "Hidden",
    }
}

string_enum! {
    ChangeAction, "change action" {
        Created => "created", "Created",
        Updated => "updated", "Updated",
        Deleted => "deleted", "Deleted",
        StatusChanged => "status_changed", "Status changed",
    }
}

string_enum! {
    ChangeType, "change type" {
        Manual => "manual", "Manual",
        Auto => "auto", "Automatic",
        Import => "import", "Import",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub code: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub code: String,
    pub slug: String,
    pub display_mode: DisplayMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A lexical entry in one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub word: String,
    pub slug: String,
    pub language_id: i64,
    pub language: String,
    pub meaning: String,
    pub category_id: Option<i64>,
    pub category: Option<String>,
    pub status: WordStatus,
    pub difficulty: Difficulty,
    pub pronunciation: String,
    pub is_deleted: bool,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Word {
    /// Approved and not soft-deleted.
    pub fn is_published(&self) -> bool {
        self.status == WordStatus::Approved && !self.is_deleted
    }
}

/// Directed translation edge `from_word -> to_word`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationEdge {
    pub id: i64,
    pub from_word_id: i64,
    pub to_word_id: i64,
    pub note: String,
    pub order: i64,
    pub status: WordStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    pub id: i64,
    pub word_id: i64,
    pub text: String,
    pub author_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub id: i64,
    pub word_id: i64,
    pub user_id: Option<i64>,
    pub action: ChangeAction,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub comment: String,
    pub change_type: ChangeType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub word_id: i64,
    pub data: serde_json::Value,
    pub changed_by: Option<i64>,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub query: String,
    pub searched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
    pub is_moderator: bool,
    pub preferred_language: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Staff and moderators see unpublished words and may edit content.
    pub fn is_elevated(&self) -> bool {
        self.is_staff || self.is_moderator
    }
}
