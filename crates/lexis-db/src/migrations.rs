use rusqlite::Connection;
use tracing::info;

use crate::DbResult;

pub fn run(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS languages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            code        TEXT NOT NULL UNIQUE CHECK (length(code) BETWEEN 1 AND 10),
            name        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id                      INTEGER PRIMARY KEY AUTOINCREMENT,
            username                TEXT NOT NULL UNIQUE,
            password                TEXT NOT NULL,
            is_staff                INTEGER NOT NULL DEFAULT 0,
            is_moderator            INTEGER NOT NULL DEFAULT 0,
            preferred_language_id   INTEGER REFERENCES languages(id) ON DELETE SET NULL,
            created_at              TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            code        TEXT NOT NULL UNIQUE,
            slug        TEXT NOT NULL UNIQUE CHECK (length(slug) <= 100),
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS category_translations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            language_id INTEGER NOT NULL REFERENCES languages(id) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            UNIQUE(category_id, language_id)
        );

        CREATE TABLE IF NOT EXISTS tags (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            code         TEXT NOT NULL UNIQUE,
            slug         TEXT NOT NULL UNIQUE CHECK (length(slug) <= 100),
            display_mode TEXT NOT NULL DEFAULT 'visible'
                         CHECK (display_mode IN ('visible', 'hidden')),
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tag_translations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_id      INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            language_id INTEGER NOT NULL REFERENCES languages(id) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            UNIQUE(tag_id, language_id)
        );

        CREATE TABLE IF NOT EXISTS words (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            word            TEXT NOT NULL,
            slug            TEXT NOT NULL UNIQUE CHECK (length(slug) BETWEEN 1 AND 150),
            language_id     INTEGER NOT NULL REFERENCES languages(id) ON DELETE CASCADE,
            meaning         TEXT NOT NULL,
            category_id     INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            status          TEXT NOT NULL DEFAULT 'pending'
                            CHECK (status IN ('pending', 'approved', 'rejected')),
            difficulty      TEXT NOT NULL DEFAULT 'none'
                            CHECK (difficulty IN ('none', 'hidden', 'easy', 'medium', 'hard')),
            pronunciation   TEXT NOT NULL DEFAULT '',
            is_deleted      INTEGER NOT NULL DEFAULT 0,
            created_by      INTEGER REFERENCES users(id) ON DELETE SET NULL,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL,
            UNIQUE(word, language_id)
        );

        CREATE INDEX IF NOT EXISTS idx_words_language ON words(language_id);
        CREATE INDEX IF NOT EXISTS idx_words_status ON words(status);
        CREATE INDEX IF NOT EXISTS idx_words_created ON words(created_at);
        CREATE INDEX IF NOT EXISTS idx_words_category ON words(category_id);
        CREATE INDEX IF NOT EXISTS idx_words_difficulty ON words(difficulty);

        CREATE TABLE IF NOT EXISTS word_tags (
            word_id     INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            tag_id      INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (word_id, tag_id)
        );

        CREATE INDEX IF NOT EXISTS idx_word_tags_tag ON word_tags(tag_id);

        CREATE TABLE IF NOT EXISTS translations (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            from_word_id    INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            to_word_id      INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            note            TEXT NOT NULL DEFAULT '',
            sort_order      INTEGER NOT NULL DEFAULT 0 CHECK (sort_order >= 0),
            status          TEXT NOT NULL DEFAULT 'approved'
                            CHECK (status IN ('pending', 'approved', 'rejected')),
            created_at      TEXT NOT NULL,
            UNIQUE(from_word_id, to_word_id),
            CHECK (from_word_id <> to_word_id)
        );

        CREATE INDEX IF NOT EXISTS idx_translations_to ON translations(to_word_id);

        -- Endpoints of a translation never share a language.
        CREATE TRIGGER IF NOT EXISTS trg_translations_language_insert
        BEFORE INSERT ON translations
        WHEN (SELECT language_id FROM words WHERE id = NEW.from_word_id)
           = (SELECT language_id FROM words WHERE id = NEW.to_word_id)
        BEGIN
            SELECT RAISE(ABORT, 'translation endpoints share a language');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_translations_language_update
        BEFORE UPDATE OF from_word_id, to_word_id ON translations
        WHEN (SELECT language_id FROM words WHERE id = NEW.from_word_id)
           = (SELECT language_id FROM words WHERE id = NEW.to_word_id)
        BEGIN
            SELECT RAISE(ABORT, 'translation endpoints share a language');
        END;

        CREATE TABLE IF NOT EXISTS examples (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            word_id     INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            text        TEXT NOT NULL,
            author_id   INTEGER REFERENCES users(id) ON DELETE SET NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_examples_word ON examples(word_id);

        CREATE TABLE IF NOT EXISTS favourites (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            word_id     INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            added_at    TEXT NOT NULL,
            UNIQUE(user_id, word_id)
        );

        CREATE TABLE IF NOT EXISTS word_likes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            word_id     INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            is_like     INTEGER NOT NULL,
            created_at  TEXT NOT NULL,
            UNIQUE(user_id, word_id)
        );

        CREATE TABLE IF NOT EXISTS search_history (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            query       TEXT NOT NULL,
            searched_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_search_history_user
            ON search_history(user_id, searched_at);

        CREATE TABLE IF NOT EXISTS word_change_logs (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            word_id     INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            user_id     INTEGER REFERENCES users(id) ON DELETE SET NULL,
            action      TEXT NOT NULL,
            old_value   TEXT,
            new_value   TEXT,
            comment     TEXT NOT NULL DEFAULT '',
            change_type TEXT NOT NULL DEFAULT 'manual',
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_change_logs_word
            ON word_change_logs(word_id, timestamp);

        CREATE TABLE IF NOT EXISTS word_history (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            word_id     INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            data        TEXT NOT NULL,
            changed_by  INTEGER REFERENCES users(id) ON DELETE SET NULL,
            changed_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_word_history_word
            ON word_history(word_id, changed_at);

        CREATE TABLE IF NOT EXISTS interface_translations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            language_id INTEGER NOT NULL REFERENCES languages(id) ON DELETE CASCADE,
            key         TEXT NOT NULL,
            value       TEXT NOT NULL DEFAULT '',
            UNIQUE(language_id, key)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
