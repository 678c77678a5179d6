//! Structured logging setup.
//!
//! Builds a tracing subscriber that emits Bunyan-formatted JSON lines. `log`
//! records from dependencies are bridged into tracing so that sqlx's own
//! statement logging lands in the same stream.

use tracing::Subscriber;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

/// Composes a subscriber writing JSON logs for `name` into `sink`.
///
/// `RUST_LOG` takes precedence over `env_filter` when it is set.
///
/// # Example
/// ```rust
/// let subscriber = userdb::get_subscriber("userdb".into(), "info".into(), std::io::sink);
/// userdb::init_subscriber(subscriber);
/// ```
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs `subscriber` as the global default and redirects `log` records to it.
///
/// Must be called at most once per process. A second call leaves the first
/// subscriber in place and logs a warning through it.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    // Already installed by an earlier call; records keep flowing to the first subscriber.
    let _ = LogTracer::init();
    if let Err(e) = set_global_default(subscriber) {
        tracing::warn!(error = %e, "Tracing subscriber already set");
    }
}
