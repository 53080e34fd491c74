//! Logging setup
//!
//! Events go to stderr so JSON/YAML/CSV on stdout stays machine-readable.
//! `RUST_LOG` takes precedence over the `--verbose` flag.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter for a verbosity count from the command line
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "tolstack=debug",
        _ => "tolstack=trace",
    }
}

/// Install the global subscriber
///
/// # Example
/// ```no_run
/// tolstack::logging::init(1);
/// ```
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 0)
        .without_time()
        .try_init();
}

/// Subscriber for unit tests, captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
