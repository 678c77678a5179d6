//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::time::Duration;

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection};
use userdb::{DbConfig, get_subscriber, init_subscriber};
use uuid::Uuid;

// Logs are discarded unless TEST_LOG is set, e.g. `TEST_LOG=1 cargo test | bunyan`.
static TRACING: Lazy<()> = Lazy::new(|| {
    let name = "userdb-test".to_string();
    let filter = "info".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber(name, filter, std::io::stdout));
    } else {
        init_subscriber(get_subscriber(name, filter, std::io::sink));
    }
});

/// Loads `.env`, reads `POSTGRES_*` and tags the session with a name unique to this test.
pub fn test_config() -> DbConfig {
    Lazy::force(&TRACING);
    dotenv::dotenv().ok();
    let mut config = DbConfig::from_env().expect("POSTGRES_* variables should be valid");
    config.application_name = format!("userdb-test-{}", Uuid::new_v4().simple());
    config
}

/// Settings for a server that refuses connections.
pub fn unreachable_config() -> DbConfig {
    Lazy::force(&TRACING);
    DbConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        ..DbConfig::default()
    }
}

/// Number of sessions on the server reporting `application_name`.
pub async fn open_sessions(config: &DbConfig, application_name: &str) -> anyhow::Result<i64> {
    let probe = DbConfig {
        application_name: "userdb-probe".to_string(),
        ..config.clone()
    };
    let mut conn = PgConnection::connect_with(&probe.connect_options()).await?;
    let count: i64 =
        sqlx::query_scalar("SELECT count(*) FROM pg_stat_activity WHERE application_name = $1")
            .bind(application_name)
            .fetch_one(&mut conn)
            .await?;
    conn.close().await?;
    Ok(count)
}

/// Polls until no session named `application_name` is left; backends exit
/// asynchronously after the client hangs up.
pub async fn assert_no_open_sessions(config: &DbConfig, application_name: &str) {
    let mut remaining = -1;
    for _ in 0..40 {
        remaining = open_sessions(config, application_name)
            .await
            .expect("probe connection should succeed");
        if remaining == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("{remaining} session(s) named {application_name} still open");
}
