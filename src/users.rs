//! Read access to the `users` table.

use sqlx::{Connection, Executor};

use crate::config::DbConfig;
use crate::db::connect;
use crate::errors::{DbError, DbResult};
use crate::models::UserRecord;

/// The only statement this crate issues. No `ORDER BY`: row order is whatever
/// the server returns.
pub const USERS_QUERY: &str = "SELECT * FROM users;";

/// Fetches every row of the `users` table over a fresh session.
///
/// The statement goes over the simple query protocol, so values arrive in
/// their text form and columns of any type can be read. The session is
/// closed before returning, whether or not the fetch succeeded. Rows are
/// converted only after the session is gone.
///
/// # Errors
/// - [`DbError::Connect`] if the session cannot be opened
/// - [`DbError::Query`] if the statement fails (missing table, permissions, ...)
/// - [`DbError::Decode`] / [`DbError::UnsupportedType`] if a column cannot be represented
#[tracing::instrument(
    name = "users.fetch_all",
    skip(config),
    fields(host = %config.host, database = %config.database, row_count = tracing::field::Empty)
)]
pub async fn fetch_users(config: &DbConfig) -> DbResult<Vec<UserRecord>> {
    let mut conn = connect(config).await?;

    let fetched = (&mut conn).fetch_all(USERS_QUERY).await;

    // A close error after a good fetch only loses the goodbye message; the
    // socket is dropped either way.
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "Failed to close Postgres session cleanly");
    }

    let rows = fetched.map_err(|e| {
        tracing::error!(error = %e, query = USERS_QUERY, "Failed to fetch users");
        DbError::Query(e)
    })?;

    let users = rows
        .iter()
        .map(UserRecord::try_from)
        .collect::<DbResult<Vec<_>>>()?;

    tracing::Span::current().record("row_count", users.len());
    tracing::info!(user_count = users.len(), "Fetched users");
    Ok(users)
}

/// Fetches every row of the `users` table using the `POSTGRES_*` environment variables.
pub async fn get_users() -> DbResult<Vec<UserRecord>> {
    let config = DbConfig::from_env()?;
    fetch_users(&config).await
}
