//! Tracing initialisation for suite binaries.
//!
//! Progress lines go through `tracing`; the pipeline's contract output
//! (abort diagnostics, success marker) stays on plain stdout. Call
//! [`init_tracing`] once at program start; later calls are silently
//! ignored since the global subscriber can only be set once.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// * `json` — emit newline-delimited JSON log lines.
/// * `verbose` — default to `DEBUG` instead of `INFO` when `RUST_LOG`
///   is not set. `RUST_LOG` always wins when present.
pub fn init_tracing(json: bool, verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}
