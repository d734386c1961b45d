//! Structured logging setup.
//!
//! Hosts call [`init`] once at startup; tests call [`init_for_tests`], which
//! is idempotent and routes output through the test writer.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static TEST_LOGGING: OnceCell<()> = OnceCell::new();

/// Install a global `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` when another subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
}

/// Initialize logging for unit and integration tests.
///
/// Level precedence: `TEST_LOG`, then `RUST_LOG`, then `warn`.
pub fn init_for_tests() {
    TEST_LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
