//! End-to-End Test Support for the Oracle Monitor
//!
//! Mock oracle nodes that speak the node wire protocol over loopback TCP,
//! plus small helpers shared by the scenario tests in `tests/`.

pub mod fixtures;

pub use fixtures::*;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once per test binary; `RUST_LOG` controls output
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}
