//! Environment-driven connection factory tests.
//!
//! This binary is the only one that mutates the process environment, and it
//! does so from a single test so no other test observes the changes.

use userdb::{DbError, get_db_connection, get_users};

#[tokio::test]
async fn test_env_factory_fails_against_closed_port() {
    // Only the port is overridden; every other setting keeps its default or
    // whatever the environment already provides.
    unsafe {
        std::env::set_var("POSTGRES_PORT", "1");
    }
    let result = get_db_connection().await;
    assert!(
        matches!(result, Err(DbError::Connect(_))),
        "expected a connect error, got {:?}",
        result.map(|_| "a live session")
    );

    let err = get_users().await.expect_err("no server on port 1");
    assert!(matches!(err, DbError::Connect(_)), "got {err:?}");

    unsafe {
        std::env::set_var("POSTGRES_PORT", "not-a-port");
    }
    let err = get_db_connection()
        .await
        .expect_err("port should be rejected");
    match err {
        DbError::InvalidPort { value, .. } => assert_eq!(value, "not-a-port"),
        other => panic!("unexpected error: {other:?}"),
    }

    unsafe {
        std::env::remove_var("POSTGRES_PORT");
    }
}
