//! Logging initialization.
//!
//! Installs a `tracing` subscriber writing human-readable output to stderr.
//! Verbosity is controlled through `RUST_LOG` (default: `info` for this
//! crate, `warn` for dependencies).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber. Safe to call once at startup;
/// subsequent calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,proposalgen=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
