//! Library entry point for userdb.
//!
//! A small Postgres helper: open a session from `POSTGRES_*` environment
//! variables and read every row of the `users` table.

pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod users;

pub use config::DbConfig;
pub use db::*;
pub use errors::{DbError, DbResult};
pub use logging::*;
pub use models::UserRecord;
pub use users::*;
