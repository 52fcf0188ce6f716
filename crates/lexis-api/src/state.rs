use std::sync::Arc;

use lexis_db::{Database, DbResult};
use tracing::error;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Lifetime of issued tokens.
    pub token_days: i64,
    /// Language of category and tag display names when the request names none.
    pub default_language: String,
}

impl AppStateInner {
    pub fn display_language(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.default_language)
            .to_string()
    }
}

/// Run a blocking database call off the async runtime.
pub async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from)
}
