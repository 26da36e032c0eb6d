use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Installs the global subscriber with an `info` default.
pub fn init_logging() {
    init_logging_with("info");
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_directive`.
///
/// Calling this twice in one process is a no-op for the second call, so
/// every integration test binary can install it without coordinating.
pub fn init_logging_with(default_directive: &str) {
    let filter: EnvFilter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let formatting_layer = fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(true)
        .compact();

    let subscriber = Registry::default().with(filter).with(formatting_layer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!(target: "rchan::logging", "global subscriber already installed");
    }
}
