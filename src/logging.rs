//! Diagnostic logging to stderr.
//!
//! stdout is reserved for command output and the `run` protocol, so all
//! tracing output goes to stderr. `RUST_LOG` takes precedence over the
//! `--verbose` flag.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "stickies=warn";
const VERBOSE_FILTER: &str = "stickies=debug";

pub fn init(verbose: bool) {
    let fallback = if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
