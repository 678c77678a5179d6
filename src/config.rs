//! Connection settings read from the process environment.
//!
//! Every setting is optional; a missing variable falls back to the default
//! used by the local test database.

use std::{env, fmt};

use sqlx::postgres::PgConnectOptions;

use crate::errors::{DbError, DbResult};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_DATABASE: &str = "testdb";
pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_PASSWORD: &str = "password";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_APPLICATION_NAME: &str = "userdb";

/// Settings for a single Postgres session.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// `POSTGRES_HOST`
    pub host: String,
    /// `POSTGRES_DB`
    pub database: String,
    /// `POSTGRES_USER`
    pub user: String,
    /// `POSTGRES_PASSWORD`
    pub password: String,
    /// `POSTGRES_PORT`
    pub port: u16,
    /// `POSTGRES_APPLICATION_NAME`, reported in `pg_stat_activity`
    pub application_name: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            port: DEFAULT_PORT,
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
        }
    }
}

impl DbConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`DbError::InvalidPort`] if `POSTGRES_PORT` is set but is not a valid port.
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unset variables take their defaults. String values are used verbatim,
    /// so an empty `POSTGRES_PASSWORD` means an empty password.
    /// `POSTGRES_PORT` is trimmed of surrounding whitespace before parsing.
    pub fn from_lookup<F>(lookup: F) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = match lookup("POSTGRES_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|source| DbError::InvalidPort { value, source })?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("POSTGRES_HOST").unwrap_or(defaults.host),
            database: lookup("POSTGRES_DB").unwrap_or(defaults.database),
            user: lookup("POSTGRES_USER").unwrap_or(defaults.user),
            password: lookup("POSTGRES_PASSWORD").unwrap_or(defaults.password),
            port,
            application_name: lookup("POSTGRES_APPLICATION_NAME")
                .unwrap_or(defaults.application_name),
        })
    }

    /// Returns a copy pointing at another database on the same server.
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..self.clone()
        }
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .application_name(&self.application_name)
    }
}

// Keeps the password out of logs and `tracing::instrument` fields.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .field("port", &self.port)
            .field("application_name", &self.application_name)
            .finish()
    }
}
