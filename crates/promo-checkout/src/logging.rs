//! # Logging
//!
//! Subscriber setup for hosts that do not bring their own.

use tracing::Subscriber;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,promo=debug";

/// Builds the fmt subscriber filtered by `RUST_LOG`, or `default_filter`
/// when that is unset or unparseable.
pub fn subscriber(default_filter: &str) -> impl Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).finish()
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=promo_core=trace` - Show group aggregation traces
/// - Default: `default_filter`
///
/// Returns `false` when a global subscriber was already installed, which
/// leaves the existing one in place.
pub fn init_tracing(default_filter: &str) -> bool {
    subscriber(default_filter).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_init_tracing_twice_is_safe() {
        init_tracing(DEFAULT_FILTER);
        assert!(!init_tracing(DEFAULT_FILTER));
    }

    #[test]
    fn test_default_filter_limits_levels() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        tracing::subscriber::with_default(subscriber("warn"), || {
            assert!(tracing::enabled!(target: "somecrate", Level::WARN));
            assert!(!tracing::enabled!(target: "somecrate", Level::INFO));
            assert!(!tracing::enabled!(target: "somecrate", Level::TRACE));
        });
    }
}
