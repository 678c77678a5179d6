//! Database connection utilities.
//!
//! Opens one Postgres session per call. There is no pool and no retry: a
//! failure is handed straight back to the caller.

use sqlx::{Connection, PgConnection};

use crate::config::DbConfig;
use crate::errors::{DbError, DbResult};

/// Opens a Postgres session using the given settings.
///
/// # Errors
/// Returns [`DbError::Connect`] wrapping the client error if the session cannot be
/// established.
#[tracing::instrument(
    name = "db.connect",
    skip(config),
    fields(host = %config.host, port = config.port, database = %config.database, user = %config.user)
)]
pub async fn connect(config: &DbConfig) -> DbResult<PgConnection> {
    match PgConnection::connect_with(&config.connect_options()).await {
        Ok(conn) => {
            tracing::debug!("Postgres session established");
            Ok(conn)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Postgres");
            Err(DbError::Connect(e))
        }
    }
}

/// Opens a Postgres session configured from the `POSTGRES_*` environment variables.
///
/// # Errors
/// Returns [`DbError::InvalidPort`] for a malformed `POSTGRES_PORT`, otherwise the
/// errors of [`connect`].
pub async fn get_db_connection() -> DbResult<PgConnection> {
    let config = DbConfig::from_env()?;
    connect(&config).await
}
