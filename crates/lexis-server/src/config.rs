//! Process configuration, read once at startup from `LEXIS_*` environment
//! variables (a `.env` file is loaded first when present).

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me",
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

pub const DEFAULT_DB_PATH: &str = "lexis.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_days: i64,
    pub default_language: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys fall back to defaults, except
    /// the JWT secret which is required.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("LEXIS_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("LEXIS_JWT_SECRET is unset or still a placeholder");
        }

        let port: u16 = match lookup("LEXIS_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("LEXIS_PORT has malformed value {raw:?}"))?,
            None => 3000,
        };
        let token_days: i64 = match lookup("LEXIS_TOKEN_DAYS") {
            Some(raw) => raw
                .parse()
                .ok()
                .filter(|days: &i64| *days > 0)
                .with_context(|| format!("LEXIS_TOKEN_DAYS has malformed value {raw:?}"))?,
            None => 30,
        };

        Ok(Config {
            db_path: lookup("LEXIS_DB_PATH")
                .unwrap_or_else(|| DEFAULT_DB_PATH.into())
                .into(),
            host: lookup("LEXIS_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt_secret,
            token_days,
            default_language: lookup("LEXIS_DEFAULT_LANGUAGE").unwrap_or_else(|| "ru".into()),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Database location for tools that need nothing else.
pub fn db_path_from_env() -> PathBuf {
    std::env::var("LEXIS_DB_PATH")
        .unwrap_or_else(|_| DEFAULT_DB_PATH.into())
        .into()
}
