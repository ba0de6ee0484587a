//! Tracing subscriber setup for the `ragline` binary and integration harnesses.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::config::LogFormat;

/// Build the filter: `RUST_LOG` wins over the configured level, and an
/// unparsable level falls back to `info`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber.
///
/// Calling this twice is harmless; the second install is ignored so tests can
/// call it freely.
pub fn init_tracing(level: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(build_filter(level));

    let result = match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
