//! Logging setup.
//!
//! volpipe logs through `tracing`: pipeline assembly at `info`, per-traversal
//! negotiation at `debug`, per-volume detail at `trace`. Nothing is printed
//! until the host installs a subscriber, either its own or the one from
//! [`init`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,volpipe=debug";

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// Subscriber for tests: captured by the test harness, `trace` for this crate.
pub fn init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("warn,volpipe=trace"))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
