//! Error type shared by the connection factory and the query helper.

use thiserror::Error;

/// Errors that can occur while connecting to Postgres or reading the `users` table.
#[derive(Debug, Error)]
pub enum DbError {
    /// `POSTGRES_PORT` could not be parsed as a TCP port.
    #[error("invalid POSTGRES_PORT {value:?}: {source}")]
    InvalidPort {
        /// The raw value read from the environment
        value: String,
        source: std::num::ParseIntError,
    },

    /// The session could not be established (bad host, credentials, network).
    #[error("failed to connect to Postgres: {0}")]
    Connect(#[source] sqlx::Error),

    /// The statement was rejected or the rows could not be fetched.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// A column value could not be decoded into its Rust representation.
    #[error("failed to decode column `{column}`: {source}")]
    Decode {
        column: String,
        source: sqlx::Error,
    },

    /// The column's Postgres type has no JSON mapping.
    #[error("column `{column}` has unsupported type {type_name}")]
    UnsupportedType { column: String, type_name: String },
}

pub type DbResult<T> = Result<T, DbError>;
