//! Tracing subscriber setup for the CLI

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Install a global `fmt` subscriber filtered by `RUST_LOG`
///
/// # Errors
/// [`TryInitError`] if a global subscriber is already installed.
pub fn init_tracing(json: bool) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().finish().try_init()
    } else {
        builder.finish().try_init()
    }
}
