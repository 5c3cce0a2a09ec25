//! Process-wide log setup for the binary.

use tracing_subscriber::EnvFilter;

/// Initialize tracing once, writing to stderr so stdout stays free for
/// command output and the JSON-RPC stream.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose.
/// Later calls are no-ops.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
