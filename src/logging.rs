//! Log subscriber setup.
//!
//! Logs go to stderr; stdout is reserved for solution JSON.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// The filter is read from `RUST_LOG` (default `info`), e.g.
/// `RUST_LOG=u_fulfill=debug` or `RUST_LOG=u_fulfill::mip=info`.
///
/// ```no_run
/// u_fulfill::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Debug-level subscriber that writes through the test harness.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
