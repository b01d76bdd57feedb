//! # configs
//!
//! Layered runtime settings. Later sources win:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`, then `config/local.toml` (both optional)
//! 3. `ANONBOARD__SECTION__KEY` environment variables (see [`load_dotenv`])
//! 4. the legacy `PORT` and `DB` variables (`DB` selects postgres)

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub password: PasswordSettings,
    pub board: BoardSettings,
    pub web: WebSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub backend: DatabaseBackend,
    /// Required for the postgres backend.
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

/// Argon2id cost parameters for delete-password hashing.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardSettings {
    /// Threads shown on a board listing.
    pub thread_limit: usize,
    /// Replies shown under each thread on a board listing.
    pub reply_preview: usize,
    pub deleted_placeholder: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSettings {
    pub views_dir: String,
    pub public_dir: String,
    pub cors_any_origin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

/// Loads `.env` from the working directory or its parents into the process
/// environment. Returns the file's path when one was found.
///
/// Call before [`Settings::load`]; variables already set are left alone.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Like [`load_dotenv`], for an explicit file.
pub fn load_dotenv_from(path: &Path) -> Option<PathBuf> {
    dotenvy::from_path(path).ok().map(|_| path.to_path_buf())
}

impl Settings {
    /// Loads settings from `./config` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        // A bare `DB` connection string implies the postgres backend.
        let legacy_db = std::env::var("DB").ok();
        let settings: Settings = defaults()?
            .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false))
            .add_source(File::with_name(&dir.join("local").to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("ANONBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("database.url", legacy_db.clone())?
            .set_override_option("database.backend", legacy_db.map(|_| "postgres"))?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.thread_limit == 0 {
            return Err(ConfigError::Invalid(
                "board.thread_limit must be at least 1".into(),
            ));
        }
        if self.database.backend == DatabaseBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Invalid(
                "database.url is required for the postgres backend".into(),
            ));
        }
        if self.password.memory_kib < 8 * self.password.parallelism {
            return Err(ConfigError::Invalid(
                "password.memory_kib must be at least 8 * password.parallelism".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Built-in defaults: every key has a value before any file is read.
fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("database.backend", "memory")?
        .set_default("database.max_connections", 5)?
        .set_default("password.memory_kib", 19456)?
        .set_default("password.iterations", 2)?
        .set_default("password.parallelism", 1)?
        .set_default("board.thread_limit", 10)?
        .set_default("board.reply_preview", 3)?
        .set_default("board.deleted_placeholder", "[deleted]")?
        .set_default("web.views_dir", "views")?
        .set_default("web.public_dir", "public")?
        .set_default("web.cors_any_origin", true)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)
}
