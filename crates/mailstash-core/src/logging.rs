//! Tracing subscriber setup for applications embedding the store.

use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the fmt subscriber without installing it.
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` is used (see
/// [`StoreConfig::log_filter`](crate::StoreConfig::log_filter)).
pub fn subscriber(default_filter: &str) -> impl Subscriber + Send + Sync + use<> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
}

/// Install [`subscriber`] as the global default.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    subscriber(default_filter).try_init().is_ok()
}
