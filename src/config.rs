//! Environment-driven configuration.
//!
//! Values come from the process environment; a `.env` file in the working
//! directory fills in anything the environment leaves unset.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | unset |
//! | `TASKQUEST_POOL_SIZE` | `8` |
//! | `TASKQUEST_XP_COMPLETION_REWARD` | `10` |
//! | `TASKQUEST_XP_OVERDUE_PENALTY` | `5` |
//! | `TASKQUEST_MAX_COMMIT_ATTEMPTS` | `3` |

use crate::progress::domain::{Xp, XpRules};
use crate::task::services::DEFAULT_MAX_COMMIT_ATTEMPTS;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Default size of the database connection pool.
pub const DEFAULT_POOL_SIZE: u32 = 8;

const DATABASE_URL: &str = "DATABASE_URL";
const POOL_SIZE: &str = "TASKQUEST_POOL_SIZE";
const COMPLETION_REWARD: &str = "TASKQUEST_XP_COMPLETION_REWARD";
const OVERDUE_PENALTY: &str = "TASKQUEST_XP_OVERDUE_PENALTY";
const MAX_COMMIT_ATTEMPTS: &str = "TASKQUEST_MAX_COMMIT_ATTEMPTS";

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A variable holds a value that does not parse.
    #[error("invalid value for {variable}: {value}")]
    InvalidValue {
        /// Variable name.
        variable: &'static str,
        /// Offending value.
        value: String,
    },
    /// A count that must be positive is zero.
    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),
    /// `DATABASE_URL` is required but missing.
    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// An env file could not be read or parsed.
    #[error("failed to read env file: {0}")]
    EnvFile(String),
}

/// Application configuration.
///
/// Use [`AppConfig::builder`] to construct one in code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_size: u32,
    /// XP reward and penalty amounts.
    pub xp_rules: XpRules,
    /// Attempts per task operation before a commit conflict surfaces.
    pub max_commit_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            pool_size: DEFAULT_POOL_SIZE,
            xp_rules: XpRules::default(),
            max_commit_attempts: DEFAULT_MAX_COMMIT_ATTEMPTS,
        }
    }
}

impl AppConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Creates a configuration from process environment variables.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    /// Unset variables take their defaults; blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a value does not parse or a count
    /// is zero.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a configuration from the environment and the env file at
    /// `path`, without modifying the process environment.
    ///
    /// Process variables take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EnvFile`] when the file cannot be read
    /// or parsed, and the errors of [`AppConfig::from_lookup`] otherwise.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigurationError> {
        let file_vars = dotenvy::from_path_iter(path)
            .map_err(|err| ConfigurationError::EnvFile(err.to_string()))?
            .collect::<Result<HashMap<String, String>, _>>()
            .map_err(|err| ConfigurationError::EnvFile(err.to_string()))?;
        Self::from_lookup(|name| env::var(name).ok().or_else(|| file_vars.get(name).cloned()))
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a value does not parse or a count
    /// is zero.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut builder = Self::builder();
        if let Some(url) = read(DATABASE_URL) {
            builder = builder.database_url(url);
        }
        if let Some(size) = parse(POOL_SIZE, read(POOL_SIZE))? {
            builder = builder.pool_size(size);
        }
        if let Some(reward) = parse(COMPLETION_REWARD, read(COMPLETION_REWARD))? {
            builder = builder.completion_reward(Xp::new(reward));
        }
        if let Some(penalty) = parse(OVERDUE_PENALTY, read(OVERDUE_PENALTY))? {
            builder = builder.overdue_penalty(Xp::new(penalty));
        }
        if let Some(attempts) = parse(MAX_COMMIT_ATTEMPTS, read(MAX_COMMIT_ATTEMPTS))? {
            builder = builder.max_commit_attempts(attempts);
        }
        builder.build()
    }

    /// Returns the database URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingDatabaseUrl`] when unset.
    pub fn require_database_url(&self) -> Result<&str, ConfigurationError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)
    }
}

fn parse<T: FromStr>(
    variable: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigurationError> {
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| ConfigurationError::InvalidValue {
                    variable,
                    value: raw.clone(),
                })
        })
        .transpose()
}

/// Builder for [`AppConfig`].
#[derive(Debug, Clone, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Sets the database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    /// Sets the connection pool size.
    #[must_use]
    pub const fn pool_size(mut self, size: u32) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Sets the XP granted per completed task.
    #[must_use]
    pub const fn completion_reward(mut self, reward: Xp) -> Self {
        self.config.xp_rules.completion_reward = reward;
        self
    }

    /// Sets the XP deducted when a task becomes overdue.
    #[must_use]
    pub const fn overdue_penalty(mut self, penalty: Xp) -> Self {
        self.config.xp_rules.overdue_penalty = penalty;
        self
    }

    /// Sets the commit attempt limit.
    #[must_use]
    pub const fn max_commit_attempts(mut self, attempts: u32) -> Self {
        self.config.max_commit_attempts = attempts;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MustBePositive`] when the pool size or
    /// attempt limit is zero.
    pub fn build(self) -> Result<AppConfig, ConfigurationError> {
        if self.config.pool_size == 0 {
            return Err(ConfigurationError::MustBePositive(POOL_SIZE));
        }
        if self.config.max_commit_attempts == 0 {
            return Err(ConfigurationError::MustBePositive(MAX_COMMIT_ATTEMPTS));
        }
        Ok(self.config)
    }
}
