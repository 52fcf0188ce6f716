use chrono::Utc;
use lexis_types::models::User;
use rusqlite::{Connection, params};
use tracing::info;

use super::OptionalExt;
use super::languages::require_language;
use crate::models::UserRow;
use crate::{Database, DbError, DbResult};

const USER_SELECT: &str = "SELECT u.id, u.username, u.is_staff, u.is_moderator, l.code, u.created_at, u.password
     FROM users u
     LEFT JOIN languages l ON l.id = u.preferred_language_id";

impl Database {
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        preferred_language: Option<&str>,
    ) -> DbResult<User> {
        self.with_tx(|tx| {
            let taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
                [username],
                |row| row.get(0),
            )?;
            if taken {
                return Err(DbError::Conflict("Username already taken".into()));
            }

            let language_id = match preferred_language {
                Some(code) => Some(require_language(tx, code)?.id),
                None => None,
            };
            tx.execute(
                "INSERT INTO users (username, password, preferred_language_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![username, password_hash, language_id, Utc::now()],
            )?;
            let id = tx.last_insert_rowid();
            query_user(tx, "u.id = ?1", id)?
                .map(|row| row.user)
                .ok_or_else(|| DbError::not_found("User", id))
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "u.username = ?1", username))
    }

    /// Grant or revoke the staff and moderator flags.
    pub fn set_user_roles(&self, username: &str, staff: bool, moderator: bool) -> DbResult<User> {
        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE users SET is_staff = ?1, is_moderator = ?2 WHERE username = ?3",
                params![staff, moderator, username],
            )?;
            if changed == 0 {
                return Err(DbError::not_found("User", username));
            }
            info!("Roles of {} set: staff={} moderator={}", username, staff, moderator);
            query_user(tx, "u.username = ?1", username)?
                .map(|row| row.user)
                .ok_or_else(|| DbError::not_found("User", username))
        })
    }
}

fn query_user<P: rusqlite::ToSql>(
    conn: &Connection,
    condition: &str,
    key: P,
) -> DbResult<Option<UserRow>> {
    let sql = format!("{USER_SELECT} WHERE {condition}");
    conn.query_row(&sql, [key], |row| {
        Ok(UserRow {
            user: User {
                id: row.get(0)?,
                username: row.get(1)?,
                is_staff: row.get(2)?,
                is_moderator: row.get(3)?,
                preferred_language: row.get(4)?,
                created_at: row.get(5)?,
            },
            password: row.get(6)?,
        })
    })
    .optional()
}
