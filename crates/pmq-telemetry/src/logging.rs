//! Structured logging initialization.

use crate::error::TelemetryResult;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging.
///
/// JSON output when `RUST_ENV=production` or `PMQ_LOG_JSON=1`, compact
/// human-readable output otherwise. The filter comes from `RUST_LOG` with an
/// `info,pmq=debug` fallback.
pub fn init_logging() -> TelemetryResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,pmq=debug"));

    let json_output = std::env::var("RUST_ENV").map(|v| v == "production").unwrap_or(false)
        || std::env::var("PMQ_LOG_JSON").map(|v| v == "1").unwrap_or(false);

    if json_output {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(true))
            .init();
    }

    Ok(())
}
