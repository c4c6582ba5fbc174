//! Tracing initialisation (fmt subscriber with env-filter).
//!
//! Log verbosity is controlled via `RUST_LOG`, defaulting to `info`:
//!
//! ```bash
//! RUST_LOG=trailbook=debug,tower_http=debug trailbook
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Safe to call once at startup; returns an error if a global subscriber
/// is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
